use thiserror::Error;

/// Construction-time failures. The monitor itself has no fatal runtime error
/// class: anomalies on the bus degrade to dropped frames or withheld values.
#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
