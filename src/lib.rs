//! InvestSmart: profile-driven portfolio allocation demo.
//!
//! The allocator in [`portfolio`] is the only decision logic; the other
//! modules provide its inputs (catalog, profile store, quiz) and format its
//! output for display.

pub mod analyzer;
pub mod config;
pub mod currency;
pub mod error;
pub mod instruments;
pub mod investor;
pub mod news;
pub mod notifications;
pub mod plans;
pub mod portfolio;
pub mod quiz;
pub mod store;

pub use analyzer::{AnalysisState, Analyzer};
pub use currency::Currency;
pub use error::{AppError, Result};
pub use instruments::{Instrument, InstrumentKind, InstrumentTypeFilter, Recommendation, RiskTier};
pub use investor::{RiskProfile, UserProfile};
pub use portfolio::{allocate, AllocationLine, AllocationRequest, AllocationResult, RiskLabel};
