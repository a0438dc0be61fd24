use thiserror::Error;

pub type EvalResult<T> = std::result::Result<T, EvalError>;

/// Failures of the evaluation harness. A memory fault is not one of these: it
/// is the modeled `Outcome::Abort`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("evaluation ran out of fuel after {limit} steps")]
    OutOfFuel { limit: u64 },
}
