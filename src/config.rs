use anyhow::Result;
use chrono_tz::Tz;
use clap::Parser;

/// LoL esports match tracker and widget API
#[derive(Parser, Debug, Clone)]
#[command(name = "lol-tracker", version, about)]
pub struct Config {
    /// PandaScore API key (without it, provider calls are skipped)
    #[arg(long, env = "PANDASCORE_API_KEY")]
    pub pandascore_api_key: Option<String>,

    /// API listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    pub listen_addr: String,

    /// SQLite cache path
    #[arg(long, env = "CACHE_PATH", default_value = "matches_cache.db")]
    pub cache_path: String,

    /// Timezone for displayed match times
    #[arg(long, env = "LOCAL_TZ", default_value = "Europe/Zurich")]
    pub local_tz: String,

    /// How many upcoming matches to track
    #[arg(long, env = "TRACKED_LIMIT", default_value = "5")]
    pub tracked_limit: usize,

    /// Score update interval in minutes
    #[arg(long, env = "UPDATE_INTERVAL_MINS", default_value = "10")]
    pub update_interval_mins: u64,

    /// Local hour (0-23) of the daily list refresh
    #[arg(long, env = "REFRESH_HOUR", default_value = "6")]
    pub refresh_hour: u32,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.timezone()?;
        if self.tracked_limit == 0 {
            anyhow::bail!("tracked_limit must be at least 1");
        }
        if self.update_interval_mins == 0 {
            anyhow::bail!("update_interval_mins must be at least 1");
        }
        if self.refresh_hour > 23 {
            anyhow::bail!("refresh_hour must be between 0 and 23");
        }
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.local_tz
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown timezone: {}", self.local_tz))
    }
}
