pub mod client;
pub mod types;

pub use client::PandaScoreClient;
pub use types::RawMatch;

use anyhow::Result;
use async_trait::async_trait;

/// Trait the reconciliation engine polls matches through. Lets tests drive
/// the engine with canned provider data.
#[async_trait]
pub trait MatchProvider: Send + Sync {
    /// Next scheduled matches, capped at `limit`.
    async fn fetch_upcoming(&self, limit: usize) -> Result<Vec<RawMatch>>;

    /// All matches currently live.
    async fn fetch_running(&self) -> Result<Vec<RawMatch>>;

    /// A single match looked up by provider id; `None` when not found.
    async fn fetch_by_id(&self, id: i64) -> Result<Option<RawMatch>>;
}
