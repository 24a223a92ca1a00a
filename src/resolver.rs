use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::{
    model::{ConflictGroup, ConflictKey, MediaAsset},
    scoring::{rank_candidates, score_asset, RecencyPolicy, ScoredCandidate},
    storage::AssetStore,
    AppError, AppResult,
};

const OPERATION: &str = "resolve_group";

const CANDIDATES_SQL: &str = "\
    SELECT CAST(id AS TEXT) AS id, entity_type, CAST(entity_id AS TEXT) AS entity_id, \
           type AS asset_type, path, COALESCE(source, '') AS source, plugin_id, \
           CAST(created_at AS TEXT) AS created_at, preferred \
    FROM media_assets \
    WHERE entity_type = ? AND CAST(entity_id AS TEXT) = ? AND type = ? AND preferred = 1 \
    ORDER BY created_at DESC, id ASC";

// Keys and ids come back from the reads as text; compare as text so rows
// stored as integers in untyped columns still match.
const DEMOTE_SQL: &str = "\
    UPDATE media_assets SET preferred = 0 \
    WHERE entity_type = ? AND CAST(entity_id AS TEXT) = ? AND type = ?";

const PROMOTE_SQL: &str = "UPDATE media_assets SET preferred = 1 WHERE CAST(id AS TEXT) = ?";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub recency: RecencyPolicy,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOutcome {
    Resolved,
    WouldResolve,
    NoCandidates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResolution {
    pub key: ConflictKey,
    /// Preferred rows the scanner counted for this key.
    pub preferred_count: i64,
    pub outcome: GroupOutcome,
    /// Best first.
    pub candidates: Vec<ScoredCandidate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_files: Vec<String>,
    pub demoted: u64,
}

impl GroupResolution {
    pub fn winner(&self) -> Option<&ScoredCandidate> {
        match self.outcome {
            GroupOutcome::NoCandidates => None,
            _ => self.candidates.first(),
        }
    }
}

fn step_error(err: sqlx::Error, step: &str, key: &ConflictKey) -> AppError {
    AppError::from(err)
        .with_context("operation", OPERATION)
        .with_context("step", step)
        .with_context("entity_type", key.entity_type.clone())
        .with_context("entity_id", key.entity_id.clone())
        .with_context("asset_type", key.asset_type.clone())
}

async fn load_candidates(
    conn: &mut SqliteConnection,
    key: &ConflictKey,
) -> AppResult<Vec<MediaAsset>> {
    sqlx::query_as::<_, MediaAsset>(CANDIDATES_SQL)
        .bind(&key.entity_type)
        .bind(&key.entity_id)
        .bind(&key.asset_type)
        .fetch_all(conn)
        .await
        .map_err(|err| step_error(err, "load_candidates", key))
}

/// Scores a group's preferred rows and leaves only the winner preferred.
///
/// The candidate read, the bulk demote and the winner promote share one
/// transaction, so the group is never observed with zero preferred rows.
/// A dry run scores and ranks but rolls back before writing.
pub async fn resolve_group(
    pool: &SqlitePool,
    store: &dyn AssetStore,
    group: &ConflictGroup,
    options: ResolveOptions,
) -> AppResult<GroupResolution> {
    let key = &group.key;
    let mut tx = pool
        .begin()
        .await
        .map_err(|err| step_error(err, "begin_tx", key))?;

    let assets = load_candidates(&mut tx, key).await?;

    let mut missing_files = Vec::new();
    let scored: Vec<ScoredCandidate> = assets
        .into_iter()
        .map(|asset| {
            let exists = store.exists(&asset.path);
            if !exists {
                warn!(
                    target: "assetfix",
                    event = "asset_file_missing",
                    asset_id = %asset.id,
                    path = %asset.path,
                    "file referenced by the database does not exist"
                );
                missing_files.push(asset.path.clone());
            }
            let score = score_asset(&asset, exists, options.recency);
            ScoredCandidate { asset, score }
        })
        .collect();

    let ranked = rank_candidates(scored, options.recency);
    let Some(winner) = ranked.first() else {
        warn!(target: "assetfix", event = "group_no_candidates", group = %key);
        tx.rollback()
            .await
            .map_err(|err| step_error(err, "rollback", key))?;
        return Ok(GroupResolution {
            key: key.clone(),
            preferred_count: group.preferred_count,
            outcome: GroupOutcome::NoCandidates,
            candidates: Vec::new(),
            missing_files,
            demoted: 0,
        });
    };

    for candidate in &ranked {
        debug!(
            target: "assetfix",
            event = "candidate_scored",
            group = %key,
            asset_id = %candidate.asset.id,
            existence = candidate.score.existence,
            source = candidate.score.source,
            plugin = candidate.score.plugin,
            recency = candidate.score.recency,
            total = candidate.total()
        );
    }

    let winner_id = winner.asset.id.clone();

    if options.dry_run {
        tx.rollback()
            .await
            .map_err(|err| step_error(err, "rollback", key))?;
        info!(
            target: "assetfix",
            event = "group_would_resolve",
            group = %key,
            winner_id = %winner_id,
            score = winner.total()
        );
        return Ok(GroupResolution {
            key: key.clone(),
            preferred_count: group.preferred_count,
            outcome: GroupOutcome::WouldResolve,
            candidates: ranked,
            missing_files,
            demoted: 0,
        });
    }

    let demoted = sqlx::query(DEMOTE_SQL)
        .bind(&key.entity_type)
        .bind(&key.entity_id)
        .bind(&key.asset_type)
        .execute(&mut *tx)
        .await
        .map_err(|err| step_error(err, "demote", key))?
        .rows_affected();

    sqlx::query(PROMOTE_SQL)
        .bind(&winner_id)
        .execute(&mut *tx)
        .await
        .map_err(|err| {
            step_error(err, "promote", key).with_context("asset_id", winner_id.clone())
        })?;

    tx.commit()
        .await
        .map_err(|err| step_error(err, "commit_tx", key))?;

    info!(
        target: "assetfix",
        event = "group_resolved",
        group = %key,
        winner_id = %winner_id,
        path = %winner.asset.path,
        source = %winner.asset.source,
        plugin_id = winner.asset.plugin_id.as_deref().unwrap_or("-"),
        score = winner.total(),
        candidates = ranked.len(),
        demoted
    );

    Ok(GroupResolution {
        key: key.clone(),
        preferred_count: group.preferred_count,
        outcome: GroupOutcome::Resolved,
        candidates: ranked,
        missing_files,
        demoted,
    })
}
