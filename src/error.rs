//! Fatal errors.
//!
//! A fatal error aborts the operation that raised it (a bind, a setup, or a
//! single field write) and nothing else. Non-fatal conditions are
//! [`Warning`](crate::diagnostics::Warning)s instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The root id does not resolve to a node in the rendering target.
    #[error("no element with id \"{id}\" exists in the rendering target")]
    Lookup { id: String },

    /// Presence/absence markers are misused; setup was aborted.
    #[error("conditional rendering aborted: {reason}")]
    MarkerConflict { reason: String },

    /// `setAttrs` was given something other than a plain mapping.
    #[error("\"{found}\" is an invalid value for \"setAttrs\", expected a plain mapping")]
    InvalidBulkValue { found: &'static str },

    /// A non-callable, non-null value was assigned to an event field.
    #[error("\"{found}\" is an invalid handler for the \"{event}\" event, expected a function")]
    InvalidEventHandler { event: String, found: &'static str },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
