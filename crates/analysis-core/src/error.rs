use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Undefined ratio: {0}")]
    UndefinedRatio(String),

    #[error("No applicable factors: {0}")]
    NoApplicableFactors(String),

    #[error("Unrecognized key: {0}")]
    UnrecognizedKey(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
