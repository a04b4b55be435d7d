//! Remote access to the project-management service.

pub mod taiga;

use crate::data::{SprintId, Status, StatusId, Story};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::time::Duration;
use thiserror::Error;

/// Shared HTTP client for all API requests to enable connection pooling
pub static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(5)
        .build()
        .expect("Failed to create HTTP client")
});

/// Failure of a remote call. The board collapses every variant into one
/// generic user-facing message; the variant only matters for the log.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Transport or body-decoding failure from the HTTP client
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The server answered with an unexpected status code
    #[error("server returned HTTP {status}")]
    Server { status: u16 },
}

/// Collaborator contract of the board: the status columns of the current
/// scope, and one page of stories at a time.
#[async_trait]
pub trait StoriesRepository: Send + Sync {
    /// Fetch the status columns. `sprint` restricts the scope where the
    /// backend distinguishes sprint boards from the backlog.
    async fn get_statuses(&self, sprint: Option<SprintId>)
        -> Result<Vec<Status>, RepositoryError>;

    /// Fetch one page of stories for a status. Pages start at 1; an empty
    /// page means the status has no further pages.
    async fn get_stories(
        &self,
        status: StatusId,
        page: u32,
        sprint: Option<SprintId>,
    ) -> Result<Vec<Story>, RepositoryError>;
}
