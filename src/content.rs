//! # Content Records
//!
//! The dataset unit: one published finance video with its engagement
//! counters, as produced by the collector. Records are loaded once at
//! startup and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One published video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub title: String,
    pub channel: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    /// Missing in older collector runs; treated as zero.
    #[serde(default)]
    pub duration_seconds: u64,
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ContentRecord {
    /// Engagement rate in percent: `(likes + comments) / views * 100`,
    /// rounded to two decimals. Zero-view records rate 0.0 rather than NaN.
    pub fn engagement_rate(&self) -> f64 {
        if self.views == 0 {
            return 0.0;
        }
        round2((self.likes + self.comments) as f64 / self.views as f64 * 100.0)
    }
}

/// Round to two decimal places.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
