use thiserror::Error;

/// Failures of the batch layer.
///
/// Only [`Error::OracleUnavailable`] and [`Error::ThreadPool`] ever abort a run; a failed
/// per-geometry oracle call is reported as [`Error::Oracle`] and merely counted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("canonical-identifier oracle is unavailable: {details}")]
    OracleUnavailable { details: String },

    #[error("oracle call failed: {details}")]
    Oracle { details: String },

    #[error("failed to start worker pool: {details}")]
    ThreadPool { details: String },
}

impl Error {
    pub fn oracle_unavailable(details: impl Into<String>) -> Self {
        Self::OracleUnavailable {
            details: details.into(),
        }
    }

    pub fn oracle(details: impl Into<String>) -> Self {
        Self::Oracle {
            details: details.into(),
        }
    }

    pub fn thread_pool(details: impl Into<String>) -> Self {
        Self::ThreadPool {
            details: details.into(),
        }
    }
}
