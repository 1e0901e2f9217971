//! Domain error types.

use chrono::NaiveDate;

/// Rejected portfolio transition. The engine never triggers these because it
/// only calls `buy` when flat and `sell` when long, but the portfolio checks
/// its own state regardless.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot buy: a position is already open")]
    AlreadyLong,

    #[error("cannot sell: no open position")]
    NoPosition,

    #[error("insufficient cash: need {required:.2}, have {available:.2}")]
    InsufficientCash { required: f64, available: f64 },

    #[error("invalid order: {reason}")]
    InvalidOrder { reason: String },
}

/// Malformed price series.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("dates not strictly increasing at row {index}: {previous} then {current}")]
    UnorderedDates {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },
}

/// Top-level error type for stratbench.
#[derive(Debug, thiserror::Error)]
pub enum StratbenchError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error("{strategy} is missing required input fields: {}", fields.join(", "))]
    MissingInput {
        strategy: String,
        fields: Vec<String>,
    },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StratbenchError> for std::process::ExitCode {
    fn from(err: &StratbenchError) -> Self {
        let code: u8 = match err {
            StratbenchError::Io(_) | StratbenchError::Transition(_) => 1,
            StratbenchError::ConfigParse { .. }
            | StratbenchError::ConfigMissing { .. }
            | StratbenchError::ConfigInvalid { .. } => 2,
            StratbenchError::Data { .. } | StratbenchError::Series(_) => 3,
            StratbenchError::MissingInput { .. } => 4,
            StratbenchError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
