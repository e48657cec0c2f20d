use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::types::RawMatch;
use super::MatchProvider;

/// Match data provider backed by the PandaScore LoL API.
/// Docs: <https://developers.pandascore.co/>
#[derive(Clone)]
pub struct PandaScoreClient {
    http: Client,
    api_key: Option<String>,
    /// Base URL for overriding in tests
    base_url: String,
}

impl PandaScoreClient {
    pub fn new(api_key: Option<String>, base_url: Option<&str>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(PandaScoreClient {
            http,
            api_key,
            base_url: base_url
                .unwrap_or("https://api.pandascore.co/lol")
                .to_string(),
        })
    }

    /// Returns the bearer token, or `None` when no credential is configured.
    /// Every fetch short-circuits to an empty result in that case.
    fn credential(&self) -> Option<&str> {
        if self.api_key.is_none() {
            warn!("PANDASCORE_API_KEY not set, skipping provider call");
        }
        self.api_key.as_deref()
    }

    async fn get_matches(&self, url: &str, token: &str) -> Result<Vec<RawMatch>> {
        debug!("Fetching matches from {}", url);
        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .context("PandaScore request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("PandaScore API error: {}", resp.status());
        }

        resp.json::<Vec<RawMatch>>()
            .await
            .context("Failed to parse PandaScore response")
    }
}

#[async_trait]
impl MatchProvider for PandaScoreClient {
    async fn fetch_upcoming(&self, limit: usize) -> Result<Vec<RawMatch>> {
        let Some(token) = self.credential() else {
            return Ok(vec![]);
        };
        let url = format!("{}/matches/upcoming?per_page={}", self.base_url, limit);
        let matches = self.get_matches(&url, token).await?;
        info!("Fetched {} upcoming matches", matches.len());
        Ok(matches)
    }

    async fn fetch_running(&self) -> Result<Vec<RawMatch>> {
        let Some(token) = self.credential() else {
            return Ok(vec![]);
        };
        let url = format!("{}/matches/running", self.base_url);
        let matches = self.get_matches(&url, token).await?;
        info!("Fetched {} running matches", matches.len());
        Ok(matches)
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<RawMatch>> {
        let Some(token) = self.credential() else {
            return Ok(None);
        };
        // The API has no /matches/{id} route; filter[id] returns a list even
        // for an exact-id lookup, so take the first element.
        let url = format!("{}/matches?filter[id]={}", self.base_url, id);
        debug!("Fetching match {} from {}", id, url);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("PandaScore by-id request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("PandaScore API error: {}", resp.status());
        }

        let mut matches: Vec<RawMatch> = resp
            .json()
            .await
            .context("Failed to parse PandaScore response")?;

        if matches.is_empty() {
            warn!("Match {} not found by id lookup", id);
            return Ok(None);
        }
        Ok(Some(matches.remove(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_returns_empty() {
        // base_url points nowhere reachable; without a key no call is made
        let client = PandaScoreClient::new(None, Some("http://127.0.0.1:0")).unwrap();
        assert!(client.fetch_upcoming(5).await.unwrap().is_empty());
        assert!(client.fetch_running().await.unwrap().is_empty());
        assert!(client.fetch_by_id(1).await.unwrap().is_none());
    }
}
