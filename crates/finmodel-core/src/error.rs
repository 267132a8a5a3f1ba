use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinModelError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid horizon of {horizon} periods: {reason}")]
    InvalidHorizon { horizon: u32, reason: String },

    #[error("Capex item '{item}' acquired on {date}, after the model horizon ends on {horizon_end}")]
    OutOfHorizonCapex {
        item: String,
        date: NaiveDate,
        horizon_end: NaiveDate,
    },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FinModelError {
    fn from(e: serde_json::Error) -> Self {
        FinModelError::SerializationError(e.to_string())
    }
}
