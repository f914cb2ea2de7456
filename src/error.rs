//! # Evaluation Errors
//!
//! Typed failure taxonomy for title evaluation. Variants are grouped by who
//! can act on them: `InvalidTitle` is a caller fault, `Configuration` is a
//! deployment fault, and the remaining three are transient upstream faults
//! that a retry or the lenient fallback can absorb.

use thiserror::Error;

/// Everything that can go wrong while evaluating a title.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The submitted title cannot be scored (empty, too short, no real words).
    #[error("invalid title: {0}")]
    InvalidTitle(String),

    /// The deployment is missing something the requested engine needs,
    /// typically the API credential.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The completion provider failed: transport error, timeout, non-success
    /// status, or an empty candidate list. `status` is set when an HTTP
    /// status was actually received.
    #[error("upstream error{}: {message}", fmt_status(.status))]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    /// The provider reply contained no extractable JSON object.
    #[error("parse error: {0}")]
    Parse(String),

    /// The provider reply parsed as JSON but lacks required fields or has
    /// wrong types.
    #[error("schema error: {0}")]
    Schema(String),
}

impl EvalError {
    /// Faults where retrying, or degrading to the heuristic engine, makes sense.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Upstream { .. } | Self::Parse(_) | Self::Schema(_)
        )
    }

    /// Faults caused by the submitted input rather than the service.
    pub fn is_input_fault(&self) -> bool {
        matches!(self, Self::InvalidTitle(_))
    }
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}
