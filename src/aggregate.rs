//! # Aggregation
//!
//! Pure derived metrics over the in-memory dataset: engagement ranking,
//! per-channel view averages, a duration histogram, and dataset summary
//! stats. Every function is a deterministic pass over the input slice;
//! no I/O, no state.

use serde::Serialize;
use thiserror::Error;

use crate::content::{round2, ContentRecord};

/// Returned by [`summary_stats`] when the dataset is empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot summarize an empty dataset")]
pub struct EmptyInput;

/// One row of the engagement ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementEntry {
    pub title: String,
    pub channel: String,
    pub views: u64,
    pub engagement: f64,
}

/// Mean views for one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelAverage {
    pub channel: String,
    pub average_views: u64,
    pub videos: usize,
}

/// One half-open duration interval with a chart label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationBucket {
    pub label: String,
    pub count: usize,
}

/// Dataset-level summary for the stats endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_videos: usize,
    pub average_views: f64,
    pub average_duration_seconds: f64,
    pub max_engagement: f64,
}

/// Interior bucket boundaries (seconds) for the default duration chart:
/// 0-5, 5-10, 10-15 and 15+ minutes.
pub const DEFAULT_DURATION_CUTS: [u64; 3] = [300, 600, 900];

/// Rank all records by engagement rate, descending. The sort is stable, so
/// records with equal rates keep their dataset order.
pub fn engagement_ranking(records: &[ContentRecord]) -> Vec<EngagementEntry> {
    let mut out: Vec<EngagementEntry> = records
        .iter()
        .map(|r| EngagementEntry {
            title: r.title.clone(),
            channel: r.channel.clone(),
            views: r.views,
            engagement: r.engagement_rate(),
        })
        .collect();
    out.sort_by(|a, b| b.engagement.total_cmp(&a.engagement));
    out
}

/// Mean views per channel, descending, truncated to `top_n`. Equal means are
/// ordered by channel name so chart output is reproducible.
pub fn average_views_by_channel(records: &[ContentRecord], top_n: usize) -> Vec<ChannelAverage> {
    use std::collections::HashMap;

    let mut sums: HashMap<&str, (u64, usize)> = HashMap::new();
    for r in records {
        let entry = sums.entry(r.channel.as_str()).or_insert((0, 0));
        entry.0 += r.views;
        entry.1 += 1;
    }

    let mut out: Vec<ChannelAverage> = sums
        .into_iter()
        .map(|(channel, (total, n))| ChannelAverage {
            channel: channel.to_string(),
            average_views: (total as f64 / n as f64).round() as u64,
            videos: n,
        })
        .collect();
    out.sort_by(|a, b| {
        b.average_views
            .cmp(&a.average_views)
            .then_with(|| a.channel.cmp(&b.channel))
    });
    out.truncate(top_n);
    out
}

/// Histogram over half-open duration intervals. `cuts` lists the interior
/// boundaries in ascending seconds: `[c1, c2]` produces the buckets
/// `[0,c1) [c1,c2) [c2,inf)`. Counts always sum to `records.len()`.
pub fn duration_histogram(records: &[ContentRecord], cuts: &[u64]) -> Vec<DurationBucket> {
    let mut buckets: Vec<DurationBucket> = Vec::with_capacity(cuts.len() + 1);
    let mut lower = 0u64;
    for &cut in cuts {
        buckets.push(DurationBucket {
            label: format!("{}-{} min", lower / 60, cut / 60),
            count: 0,
        });
        lower = cut;
    }
    buckets.push(DurationBucket {
        label: format!("{}+ min", lower / 60),
        count: 0,
    });

    for r in records {
        let idx = cuts
            .iter()
            .position(|&cut| r.duration_seconds < cut)
            .unwrap_or(cuts.len());
        buckets[idx].count += 1;
    }
    buckets
}

/// Dataset summary. Fails on an empty slice instead of producing NaN means.
pub fn summary_stats(records: &[ContentRecord]) -> Result<SummaryStats, EmptyInput> {
    if records.is_empty() {
        return Err(EmptyInput);
    }
    let n = records.len() as f64;
    let total_views: u64 = records.iter().map(|r| r.views).sum();
    let total_duration: u64 = records.iter().map(|r| r.duration_seconds).sum();
    let max_engagement = records
        .iter()
        .map(|r| r.engagement_rate())
        .fold(0.0_f64, f64::max);

    Ok(SummaryStats {
        total_videos: records.len(),
        average_views: round2(total_views as f64 / n),
        average_duration_seconds: round2(total_duration as f64 / n),
        max_engagement,
    })
}
