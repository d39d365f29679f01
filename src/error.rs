//! Error types raised by the router itself.
//!
//! Handler failures are never wrapped: they travel to the dispatch caller as
//! the `anyhow::Error` the handler returned. The types here cover the two
//! failures the router produces on its own behalf.

use std::fmt;

/// Registration error
///
/// Returned by the registration surface (`Router::add`, `Router::use_middleware`, ...)
/// when a path template cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The template is not a valid path template
    InvalidTemplate {
        /// The offending template
        template: String,
        /// Why it was rejected
        reason: String,
    },
}

impl RouterError {
    pub(crate) fn invalid(template: &str, reason: impl Into<String>) -> Self {
        RouterError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::InvalidTemplate { template, reason } => {
                write!(f, "invalid path template '{}': {}", template, reason)
            }
        }
    }
}

impl std::error::Error for RouterError {}

/// Failure raised while running an execution chain
///
/// Surfaced to the dispatch caller inside an `anyhow::Error`; use
/// `err.downcast_ref::<DispatchError>()` to tell it apart from handler errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// A `Next` continuation was run a second time
    ///
    /// `position` is the index of the chain link the continuation points at.
    NextCalledTwice {
        /// Link index the continuation would have run
        position: usize,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NextCalledTwice { position } => {
                write!(
                    f,
                    "next() called more than once for chain position {}",
                    position
                )
            }
        }
    }
}

impl std::error::Error for DispatchError {}
