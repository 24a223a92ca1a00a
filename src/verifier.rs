use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::{model::ConflictGroup, scanner::scan_conflicts, AppError, AppResult};

const OPERATION: &str = "verify";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetStatistics {
    pub total: i64,
    pub preferred: i64,
    pub non_preferred: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Groups that still hold more than one preferred row.
    pub remaining: Vec<ConflictGroup>,
    pub statistics: AssetStatistics,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.remaining.is_empty()
    }
}

pub async fn asset_statistics(pool: &SqlitePool) -> AppResult<AssetStatistics> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media_assets")
        .fetch_one(pool)
        .await
        .map_err(|err| {
            AppError::from(err)
                .with_context("operation", OPERATION)
                .with_context("step", "count_total")
        })?;
    let preferred: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media_assets WHERE preferred = 1")
        .fetch_one(pool)
        .await
        .map_err(|err| {
            AppError::from(err)
                .with_context("operation", OPERATION)
                .with_context("step", "count_preferred")
        })?;
    Ok(AssetStatistics {
        total,
        preferred,
        non_preferred: total - preferred,
    })
}

/// Re-scans for conflicts and gathers row counts. Never writes.
pub async fn verify(pool: &SqlitePool) -> AppResult<VerificationReport> {
    let remaining = scan_conflicts(pool).await?;
    let statistics = asset_statistics(pool).await?;

    for group in &remaining {
        error!(
            target: "assetfix",
            event = "conflict_unresolved",
            group = %group.key,
            preferred_count = group.preferred_count
        );
    }
    info!(
        target: "assetfix",
        event = "verify_complete",
        remaining = remaining.len(),
        total = statistics.total,
        preferred = statistics.preferred,
        non_preferred = statistics.non_preferred
    );

    Ok(VerificationReport {
        remaining,
        statistics,
    })
}
