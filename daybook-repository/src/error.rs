//! Error types for the repository layer.

use daybook_store::StoreError;
use thiserror::Error;

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Errors a repository surfaces to its callers.
///
/// "Not found" is never an error here: lookups return `None` or `false`.
/// Malformed stored records are logged and treated as absent. What remains
/// is the store itself failing.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store was unreachable or rejected the round trip.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
