use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::tracker::engine::TrackerEngine;

/// Spawn the two recurring jobs against the engine:
/// score updates on a fixed interval and a daily list refresh at a fixed
/// local hour. Each job awaits its cycle before sleeping again, so a slow
/// provider call never piles up overlapping runs, and `Skip` coalesces any
/// ticks missed while the process was paused.
pub fn start_scheduler(
    engine: Arc<TrackerEngine>,
    tz: Tz,
    refresh_hour: u32,
    update_interval: Duration,
) {
    let update_engine = Arc::clone(&engine);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(update_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick fires immediately; startup already loaded or
        // refreshed the set, so wait a full period.
        interval.tick().await;
        loop {
            interval.tick().await;
            update_engine.update_scores().await;
        }
    });

    tokio::spawn(async move {
        loop {
            let now = Utc::now().with_timezone(&tz);
            let next = next_refresh_at(now, refresh_hour);
            let wait = (next - now)
                .to_std()
                .unwrap_or(Duration::from_secs(60));
            info!("Next list refresh scheduled for {}", next.to_rfc3339());
            tokio::time::sleep(wait).await;
            engine.refresh().await;
        }
    });

    info!(
        "Scheduler started (updates every {:?}, refresh daily at {:02}:00)",
        update_interval, refresh_hour
    );
}

/// Next strictly-future occurrence of `hour`:00 local time. Skips forward a
/// day when that wall-clock time does not exist (DST gap).
fn next_refresh_at(now: DateTime<Tz>, hour: u32) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut day = now.date_naive();
    loop {
        let local = day.and_hms_opt(hour, 0, 0).expect("valid refresh hour");
        if let Some(candidate) = tz.from_local_datetime(&local).earliest() {
            if candidate > now {
                return candidate;
            }
        }
        day = day.succ_opt().expect("date in supported range");
    }
}
