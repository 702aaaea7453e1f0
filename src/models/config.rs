//! Review-period configuration.
//!
//! The window is an admin-owned singleton stored alongside the other
//! records, but engine operations never reach for it implicitly: every
//! operation that needs the window takes the loaded config as an explicit
//! parameter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;

/// Inclusive date window inside which review slots may be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReviewPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> anyhow::Result<Self> {
        if end < start {
            anyhow::bail!("review period end {} precedes start {}", end, start);
        }
        Ok(Self { start, end })
    }
}

/// Global engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Review window; `None` until the admin sets it.
    #[serde(default)]
    pub review_period: Option<ReviewPeriod>,
    /// Upper bound on team membership, enforced by the CRUD layer.
    #[serde(default = "default_max_team_size")]
    pub max_team_size: usize,
}

fn default_max_team_size() -> usize {
    4
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            review_period: None,
            max_team_size: default_max_team_size(),
        }
    }
}

impl ReviewConfig {
    /// Parse a TOML document of the form:
    ///
    /// ```toml
    /// max_team_size = 4
    ///
    /// [review_period]
    /// start = "2026-03-02"
    /// end = "2026-03-13"
    /// ```
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let config: ReviewConfig = toml::from_str(raw)?;
        if let Some(period) = &config.review_period {
            // Re-run the window ordering check; serde does not enforce it.
            ReviewPeriod::new(period.start, period.end)?;
        }
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `REVIEW_PERIOD_START` (optional): window start, `YYYY-MM-DD`
    /// - `REVIEW_PERIOD_END` (optional): window end, `YYYY-MM-DD`
    /// - `MAX_TEAM_SIZE` (optional, default: 4)
    ///
    /// Both period variables must be present for the window to be set;
    /// a lone variable is rejected rather than half-applied.
    pub fn from_env() -> anyhow::Result<Self> {
        let start = env::var("REVIEW_PERIOD_START").ok();
        let end = env::var("REVIEW_PERIOD_END").ok();

        let review_period = match (start, end) {
            (Some(start), Some(end)) => {
                let start = NaiveDate::parse_from_str(&start, "%Y-%m-%d")
                    .map_err(|e| anyhow::anyhow!("Invalid REVIEW_PERIOD_START: {}", e))?;
                let end = NaiveDate::parse_from_str(&end, "%Y-%m-%d")
                    .map_err(|e| anyhow::anyhow!("Invalid REVIEW_PERIOD_END: {}", e))?;
                Some(ReviewPeriod::new(start, end)?)
            }
            (None, None) => None,
            _ => anyhow::bail!(
                "REVIEW_PERIOD_START and REVIEW_PERIOD_END must be set together"
            ),
        };

        let max_team_size = match env::var("MAX_TEAM_SIZE") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_TEAM_SIZE must be a positive integer"))?,
            Err(_) => default_max_team_size(),
        };

        Ok(Self {
            review_period,
            max_team_size,
        })
    }
}
