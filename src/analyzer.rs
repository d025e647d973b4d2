use crate::error::{AppError, Result};
use crate::instruments::Instrument;
use crate::portfolio::{allocate, AllocationRequest, AllocationResult};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// What an observer sees at any point: exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    Pending,
    Ready(AllocationResult),
}

/// Runs the allocator behind a fixed "thinking" delay. A busy latch rejects
/// re-triggering while a run is outstanding; there is no cancellation, retry
/// or timeout.
#[derive(Debug, Clone)]
pub struct Analyzer {
    delay: Duration,
    state: Arc<Mutex<AnalysisState>>,
}

impl Analyzer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: Arc::new(Mutex::new(AnalysisState::Idle)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AnalysisState> {
        // A poisoned latch still holds a valid state value.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self) -> Result<()> {
        let mut state = self.lock();
        if *state == AnalysisState::Pending {
            log::warn!("[ANALYZE] Trigger ignored: analysis already running");
            return Err(AppError::AnalysisInProgress);
        }
        *state = AnalysisState::Pending;
        Ok(())
    }

    async fn compute(
        delay: Duration,
        state: Arc<Mutex<AnalysisState>>,
        request: AllocationRequest,
        pool: Vec<Instrument>,
    ) -> AllocationResult {
        tokio::time::sleep(delay).await;
        let result = allocate(&request, &pool);
        log::info!(
            "[ANALYZE] Analysis ready: {} positions, {:.1}% allocated",
            result.lines.len(),
            result.total_mass()
        );
        *state.lock().unwrap_or_else(|e| e.into_inner()) = AnalysisState::Ready(result.clone());
        result
    }

    /// Fire-and-forget. Poll [`Analyzer::state`] for the outcome.
    /// Must be called from within a tokio runtime.
    pub fn trigger(&self, request: AllocationRequest, pool: Vec<Instrument>) -> Result<()> {
        self.begin()?;
        log::info!("[ANALYZE] Analysis started for {} profile", request.risk_profile);
        let handle = tokio::spawn(Self::compute(self.delay, Arc::clone(&self.state), request, pool));
        tokio::spawn(Self::settle(Arc::clone(&self.state), handle));
        Ok(())
    }

    /// Trigger and wait for the result.
    pub async fn run(&self, request: AllocationRequest, pool: Vec<Instrument>) -> Result<AllocationResult> {
        self.begin()?;
        log::info!("[ANALYZE] Analysis started for {} profile", request.risk_profile);
        let handle = tokio::spawn(Self::compute(self.delay, Arc::clone(&self.state), request, pool));
        Self::settle(Arc::clone(&self.state), handle).await
    }

    /// Wait for a compute task. If it panicked or was aborted, the latch is
    /// put back to `Idle` so the next trigger is accepted.
    async fn settle<T>(state: Arc<Mutex<AnalysisState>>, handle: JoinHandle<T>) -> Result<T> {
        match handle.await {
            Ok(value) => Ok(value),
            Err(e) => {
                log::error!("[ANALYZE] Analysis task ended abnormally: {}", e);
                *state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = AnalysisState::Idle;
                Err(AppError::AnalysisFailed(e.to_string()))
            }
        }
    }

    pub fn state(&self) -> AnalysisState {
        self.lock().clone()
    }

    pub fn is_busy(&self) -> bool {
        *self.lock() == AnalysisState::Pending
    }

    /// Discard a ready result ("new analysis" or closing the panel).
    /// An outstanding run is left alone.
    pub fn reset(&self) {
        let mut state = self.lock();
        if let AnalysisState::Ready(_) = *state {
            *state = AnalysisState::Idle;
        }
    }
}
