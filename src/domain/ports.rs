//! Port traits implemented by database adapters.

use async_trait::async_trait;

use super::errors::SqliteError;
use super::models::Directive;

/// Capability to apply engine tuning directives to a live connection.
///
/// Implementations apply one directive per call and must not reorder or
/// batch them.
#[async_trait]
pub trait DirectiveExecutor: Send + Sync {
    /// Apply a single directive, failing with the engine's error.
    async fn apply(&self, directive: &Directive) -> Result<(), SqliteError>;
}
