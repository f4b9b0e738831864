//! Error type shared by the enrichment core.
//!
//! Both kinds are caller errors detected before any result is produced, so a
//! failing batch never yields partial output.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichmentError {
    /// Structural problem with the inputs (length mismatch, zero-sized universe,
    /// inconsistent distribution parameters).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An index falls outside `[0, universe_size)`.
    #[error("{what} index {index} is out of range for universe of size {universe_size}")]
    OutOfRange {
        what: &'static str,
        index: String,
        universe_size: usize,
    },
}

impl EnrichmentError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        EnrichmentError::InvalidArgument(msg.into())
    }

    pub(crate) fn out_of_range(
        what: &'static str,
        index: impl std::fmt::Display,
        universe_size: usize,
    ) -> Self {
        EnrichmentError::OutOfRange {
            what,
            index: index.to_string(),
            universe_size,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, EnrichmentError::InvalidArgument(_))
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, EnrichmentError::OutOfRange { .. })
    }
}

pub type Result<T> = std::result::Result<T, EnrichmentError>;
