pub mod error;
pub mod types;

pub mod assumptions;
pub mod calendar;
pub mod engine;
pub mod projection;
pub mod schedules;
pub mod statements;

pub use assumptions::Assumptions;
pub use engine::{calculate, calculate_with_envelope, OutputBundle};
pub use error::FinModelError;
pub use statements::validator::validate;
pub use types::*;

/// Standard result type for all finmodel operations
pub type FinModelResult<T> = Result<T, FinModelError>;
