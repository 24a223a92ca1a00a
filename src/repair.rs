use std::time::Instant;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::{
    resolver::{resolve_group, GroupOutcome, GroupResolution, ResolveOptions},
    scanner::scan_conflicts,
    scoring::RecencyPolicy,
    storage::AssetStore,
    verifier::{asset_statistics, verify, AssetStatistics, VerificationReport},
    AppError, AppResult,
};

pub const UNRESOLVED_CODE: &str = "REPAIR/UNRESOLVED";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairOptions {
    pub recency: RecencyPolicy,
    pub dry_run: bool,
}

impl From<RepairOptions> for ResolveOptions {
    fn from(options: RepairOptions) -> Self {
        ResolveOptions {
            recency: options.recency,
            dry_run: options.dry_run,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    Completed,
    DryRun,
    Unresolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairSummary {
    pub status: RepairStatus,
    pub dry_run: bool,
    pub recency: RecencyPolicy,
    pub conflicts_found: usize,
    pub conflicts_fixed: usize,
    pub skipped: usize,
    pub groups: Vec<GroupResolution>,
    pub before: AssetStatistics,
    pub verification: VerificationReport,
    pub elapsed_ms: u64,
}

impl RepairSummary {
    /// Fails when conflicts survived a real run.
    pub fn ensure_resolved(&self) -> AppResult<()> {
        if self.status != RepairStatus::Unresolved {
            return Ok(());
        }
        let groups = self
            .verification
            .remaining
            .iter()
            .map(|group| group.key.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(AppError::new(
            UNRESOLVED_CODE,
            format!(
                "{} conflicts remain after repair",
                self.verification.remaining.len()
            ),
        )
        .with_context("groups", groups))
    }
}

/// One full pass: scan, resolve every conflicting group in scan order, verify.
pub async fn run_repair(
    pool: &SqlitePool,
    store: &dyn AssetStore,
    options: RepairOptions,
) -> AppResult<RepairSummary> {
    let started = Instant::now();
    let before = asset_statistics(pool).await?;
    let conflicts = scan_conflicts(pool).await?;
    info!(
        target: "assetfix",
        event = "scan_complete",
        conflicts = conflicts.len(),
        dry_run = options.dry_run
    );

    let mut groups = Vec::with_capacity(conflicts.len());
    for conflict in &conflicts {
        info!(
            target: "assetfix",
            event = "group_start",
            group = %conflict.key,
            preferred_count = conflict.preferred_count
        );
        groups.push(resolve_group(pool, store, conflict, options.into()).await?);
    }

    let conflicts_fixed = groups
        .iter()
        .filter(|g| g.outcome == GroupOutcome::Resolved)
        .count();
    let skipped = groups
        .iter()
        .filter(|g| g.outcome == GroupOutcome::NoCandidates)
        .count();

    let verification = verify(pool).await?;
    let status = if options.dry_run {
        RepairStatus::DryRun
    } else if verification.is_clean() {
        RepairStatus::Completed
    } else {
        RepairStatus::Unresolved
    };

    Ok(RepairSummary {
        status,
        dry_run: options.dry_run,
        recency: options.recency,
        conflicts_found: conflicts.len(),
        conflicts_fixed,
        skipped,
        groups,
        before,
        verification,
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}
