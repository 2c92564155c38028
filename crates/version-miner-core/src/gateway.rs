//! Repository data gateway.
//!
//! The pipeline talks to the source control host only through
//! [`RepoGateway`]. [`GitHubGateway`](crate::github::GitHubGateway) is the
//! production implementation; [`MemoryGateway`](crate::fakes::MemoryGateway)
//! backs the tests.

use async_trait::async_trait;

use crate::error::GatewayError;

/// Result type for gateway operations
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Existence checks and raw file retrieval against a hosting API.
///
/// Existence checks answer `Ok(false)` for a resource the host reports as
/// absent; any other failure is an error. `file_content` reports an absent
/// file as [`GatewayError::NotFound`].
#[async_trait]
pub trait RepoGateway: Send + Sync {
    async fn owner_exists(&self, owner: &str) -> GatewayResult<bool>;

    async fn repo_exists(&self, owner: &str, repo: &str) -> GatewayResult<bool>;

    async fn branch_exists(&self, owner: &str, repo: &str, branch: &str) -> GatewayResult<bool>;

    /// Raw contents of `path` on `branch`.
    async fn file_content(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> GatewayResult<String>;
}
