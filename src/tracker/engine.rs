use std::sync::{Arc, Mutex};

use chrono::Utc;
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::pandascore::{MatchProvider, RawMatch};
use crate::store::CacheStore;
use crate::tracker::{normalize::normalize, MatchStatus, TrackedSet};

/// Owns the in-memory tracked set and reconciles it against the provider.
///
/// Refresh and update cycles (scheduled or manually triggered) run under a
/// single async cycle lock, so at most one cycle mutates the set at a time.
/// HTTP readers take cheap snapshots under the state mutex.
pub struct TrackerEngine {
    provider: Arc<dyn MatchProvider>,
    store: CacheStore,
    tz: Tz,
    limit: usize,
    state: Mutex<TrackedSet>,
    cycle: tokio::sync::Mutex<()>,
}

impl TrackerEngine {
    pub fn new(
        provider: Arc<dyn MatchProvider>,
        store: CacheStore,
        tz: Tz,
        limit: usize,
    ) -> Self {
        TrackerEngine {
            provider,
            store,
            tz,
            limit,
            state: Mutex::new(TrackedSet::default()),
            cycle: tokio::sync::Mutex::new(()),
        }
    }

    /// Startup path: restore the cached set, or run an immediate refresh when
    /// nothing usable was persisted.
    pub async fn load_or_refresh(&self) {
        match self.store.load() {
            Ok(Some(set)) if !set.matches.is_empty() => {
                info!("Cache loaded: {} tracked matches", set.matches.len());
                *self.state.lock().unwrap() = set;
                return;
            }
            Ok(_) => info!("No cached matches, fetching initial list"),
            Err(e) => warn!("Failed to load cache, starting empty: {:#}", e),
        }
        self.refresh().await;
    }

    /// Replace the tracked set with the provider's upcoming list. An empty
    /// fetch (provider failure included) leaves the existing set untouched.
    /// Returns the tracked-match count after the cycle.
    pub async fn refresh(&self) -> usize {
        let _cycle = self.cycle.lock().await;
        info!("Refreshing tracked match list...");

        let raw_matches = match self.provider.fetch_upcoming(self.limit).await {
            Ok(m) => m,
            Err(e) => {
                warn!("Upcoming fetch failed: {:#}", e);
                vec![]
            }
        };

        if raw_matches.is_empty() {
            warn!("No upcoming matches returned, keeping current list");
            return self.state.lock().unwrap().matches.len();
        }

        let matches: Vec<_> = raw_matches
            .iter()
            .take(self.limit)
            .map(|m| normalize(m, self.tz))
            .collect();
        let count = matches.len();

        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.matches = matches;
            state.last_refresh = Some(self.now_local());
            state.clone()
        };
        self.persist_set(&snapshot);

        info!("Tracked list refreshed: {} matches", count);
        count
    }

    /// Reconcile scores and statuses of the tracked set in place.
    ///
    /// The running feed is the cheap fast path: one call covers every live
    /// match. A by-id fetch happens only for slots whose stored status was
    /// `running` but which dropped out of the feed (typically just finished),
    /// so the expensive path is bounded by matches leaving the feed, not by
    /// the tracked count. Slot order never changes. Returns the number of
    /// slots rewritten.
    pub async fn update_scores(&self) -> usize {
        let _cycle = self.cycle.lock().await;

        // Plan the cycle from a consistent view of the set.
        let tracked: Vec<(Option<i64>, Option<MatchStatus>)> = {
            let state = self.state.lock().unwrap();
            if state.matches.is_empty() {
                info!("No tracked matches, nothing to update");
                return 0;
            }
            state
                .matches
                .iter()
                .map(|m| (m.id, m.status.clone()))
                .collect()
        };
        info!("Updating scores for {} tracked matches...", tracked.len());

        let running = match self.provider.fetch_running().await {
            Ok(m) => m,
            Err(e) => {
                warn!("Running fetch failed: {:#}", e);
                vec![]
            }
        };
        if running.is_empty()
            && tracked
                .iter()
                .any(|(_, s)| *s == Some(MatchStatus::Running))
        {
            info!("No live matches in feed, checking matches that were running");
        }

        let running_by_id: std::collections::HashMap<i64, &RawMatch> = running
            .iter()
            .filter_map(|m| Some((m.id?, m)))
            .collect();

        // Fresh data per slot index; slots without fresh data stay as they are.
        let mut replacements: Vec<(usize, RawMatch)> = Vec::new();
        for (i, (id, status)) in tracked.iter().enumerate() {
            let Some(id) = *id else { continue };

            if let Some(fresh) = running_by_id.get(&id) {
                replacements.push((i, (*fresh).clone()));
            } else if *status == Some(MatchStatus::Running) {
                // Dropped out of the running feed, most likely just finished.
                info!("Match {} left the running feed, fetching directly", id);
                match self.provider.fetch_by_id(id).await {
                    Ok(Some(fresh)) => replacements.push((i, fresh)),
                    Ok(None) => warn!("Match {} not found, leaving slot unchanged", id),
                    Err(e) => warn!("Direct fetch for match {} failed: {:#}", id, e),
                }
            }
        }

        let updated = replacements.len();
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            for (i, fresh) in replacements {
                let new = normalize(&fresh, self.tz);
                if let Some(slot) = state.matches.get_mut(i) {
                    if slot.status != new.status {
                        info!(
                            "Match {:?}: {:?} -> {:?}",
                            slot.id, slot.status, new.status
                        );
                    }
                    *slot = new;
                }
            }
            state.last_refresh = Some(self.now_local());
            state.clone()
        };
        self.persist_set(&snapshot);

        if updated > 0 {
            info!("{} matches updated", updated);
        } else {
            info!("No matches needed updating");
        }
        updated
    }

    /// Read-only copy of the current tracked set for HTTP handlers.
    pub fn snapshot(&self) -> TrackedSet {
        self.state.lock().unwrap().clone()
    }

    /// Persist the current state; used on shutdown.
    pub fn persist(&self) {
        let snapshot = self.snapshot();
        self.persist_set(&snapshot);
    }

    fn persist_set(&self, set: &TrackedSet) {
        // In-memory state stays authoritative if the write fails.
        if let Err(e) = self.store.save(set) {
            warn!("Failed to persist tracked set: {:#}", e);
        }
    }

    fn now_local(&self) -> String {
        Utc::now().with_timezone(&self.tz).to_rfc3339()
    }
}
