//! Error types for the reception core
//!
//! Every error here is a recoverable advisory: the operator corrects the
//! input and retries. There is no fatal path.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Import header row matched neither recognized schema. The roster is
    /// left untouched.
    #[error("{detail}")]
    Schema { detail: String },

    /// A required field is missing or a reference does not resolve.
    #[error("{0}")]
    Validation(String),

    /// The action would exceed (or already exceeds) a program's seat limit.
    #[error("{program}の定員を超えています（{count}/{max}人）")]
    Capacity {
        program: String,
        count: usize,
        max: usize,
    },

    /// Malformed desk configuration.
    #[error("desk configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for the three operator-facing categories that a front-desk UI
    /// surfaces as a transient notification.
    pub fn is_advisory(&self) -> bool {
        matches!(
            self,
            Error::Schema { .. } | Error::Validation(_) | Error::Capacity { .. }
        )
    }
}
