use thiserror::Error;

/// Errors surfaced by the library. The allocator itself is total and never
/// produces one of these; they come from the boundaries around it.
#[derive(Error, Debug)]
pub enum AppError {
    /// Requested capital was empty, unparsable, non-finite, zero or negative.
    #[error("Invalid amount '{0}': please enter a positive number")]
    InvalidAmount(String),

    /// An onboarding field is out of range.
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Unknown risk profile '{0}' (expected conservative, moderate or aggressive)")]
    UnknownRiskProfile(String),

    #[error("Unknown investment type '{0}' (expected all, stocks, bonds, crypto or funds)")]
    UnknownInstrumentType(String),

    #[error("Unknown currency '{0}' (expected BRL, USD or EUR)")]
    UnknownCurrency(String),

    /// The triggering control is latched while an analysis is outstanding.
    #[error("An analysis is already running")]
    AnalysisInProgress,

    /// The analysis task ended without a result; the latch has been released.
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Question {question} has no option {option}")]
    QuizOptionOutOfRange { question: usize, option: usize },

    #[error("The quiz has not been completed yet")]
    QuizIncomplete,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, AppError>;
