//! Candidate scoring for preferred-asset conflicts.
//!
//! Every candidate gets an additive score: a large bonus when its file is
//! present on disk, a source tier, a plugin tier and, under
//! [`RecencyPolicy::Legacy`], a small timestamp-derived jitter. Ranking then
//! orders by total score and applies the policy's tie-break.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AssetSource, MediaAsset, PluginTier};

pub const EXISTENCE_BONUS: i64 = 1000;
const LEGACY_JITTER_BUCKETS: u64 = 10;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

impl AssetSource {
    /// Embedded beats plugin beats core beats anything unrecognized.
    pub fn weight(&self) -> i64 {
        match self {
            AssetSource::Embedded => 100,
            AssetSource::Plugin => 90,
            AssetSource::Core => 80,
            AssetSource::Other(_) => 70,
        }
    }
}

impl PluginTier {
    pub fn weight(&self) -> i64 {
        match self {
            PluginTier::MusicbrainzEnricher => 20,
            PluginTier::CoreEnrichment => 15,
            PluginTier::Other => 10,
        }
    }
}

/// How candidates with otherwise equal profiles are told apart.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum RecencyPolicy {
    /// Equal scores fall back to the newest parsed `created_at`, then the
    /// lowest identifier.
    #[default]
    Timestamp,
    /// Adds a 0..=9 jitter hashed from the raw `created_at` string; equal
    /// totals keep the first candidate in input order.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub file_exists: bool,
    pub existence: i64,
    pub source: i64,
    pub plugin: i64,
    pub recency: i64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i64 {
        self.existence + self.source + self.plugin + self.recency
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub asset: MediaAsset,
    pub score: ScoreBreakdown,
}

impl ScoredCandidate {
    pub fn total(&self) -> i64 {
        self.score.total()
    }
}

pub fn score_asset(asset: &MediaAsset, file_exists: bool, policy: RecencyPolicy) -> ScoreBreakdown {
    let recency = match policy {
        RecencyPolicy::Timestamp => 0,
        RecencyPolicy::Legacy => legacy_jitter(asset.created_at.as_deref()),
    };
    ScoreBreakdown {
        file_exists,
        existence: if file_exists { EXISTENCE_BONUS } else { 0 },
        source: asset.source_kind().weight(),
        plugin: asset.plugin_tier().weight(),
        recency,
    }
}

/// FNV-1a over the timestamp bytes, reduced to a single digit.
///
/// Not monotonic in time: two timestamps a second apart can land anywhere
/// in the range. Missing or blank timestamps contribute nothing.
pub fn legacy_jitter(created_at: Option<&str>) -> i64 {
    let Some(raw) = created_at.filter(|s| !s.is_empty()) else {
        return 0;
    };
    let hash = raw.bytes().fold(FNV_OFFSET_BASIS, |acc, byte| {
        (acc ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    });
    (hash % LEGACY_JITTER_BUCKETS) as i64
}

/// Parses the timestamp shapes SQLite catalogs store in `created_at`.
/// Values without an offset are taken as UTC.
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

fn compare_recency(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    let a_ts = a.asset.created_at.as_deref().and_then(parse_created_at);
    let b_ts = b.asset.created_at.as_deref().and_then(parse_created_at);
    // `None` sorts below any parsed timestamp.
    b_ts.cmp(&a_ts)
}

/// Orders candidates best first. The sort is stable, so `Legacy` keeps the
/// caller's order among equal totals.
pub fn rank_candidates(
    mut candidates: Vec<ScoredCandidate>,
    policy: RecencyPolicy,
) -> Vec<ScoredCandidate> {
    match policy {
        RecencyPolicy::Legacy => {
            candidates.sort_by(|a, b| b.total().cmp(&a.total()));
        }
        RecencyPolicy::Timestamp => {
            candidates.sort_by(|a, b| {
                b.total()
                    .cmp(&a.total())
                    .then_with(|| compare_recency(a, b))
                    .then_with(|| a.asset.id.cmp(&b.asset.id))
            });
        }
    }
    candidates
}

pub fn select_winner(
    candidates: Vec<ScoredCandidate>,
    policy: RecencyPolicy,
) -> Option<ScoredCandidate> {
    rank_candidates(candidates, policy).into_iter().next()
}
