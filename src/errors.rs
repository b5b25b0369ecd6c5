//! Submodule defining the errors used across the crate.

use crate::sql::{ParseError, RewriteError};

/// Errors that can occur while parsing or regenerating schema statements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The statement text was rejected.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The statement cannot be recreated after the column changes.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}
