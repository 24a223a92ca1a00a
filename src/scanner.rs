use sqlx::{Executor, Sqlite};

use crate::{model::ConflictGroup, AppError, AppResult};

const OPERATION: &str = "scan_conflicts";

/// Groups holding more than one preferred row. Shared with the verifier so
/// both passes see the same shape.
pub const CONFLICT_SCAN_SQL: &str = "\
    SELECT entity_type, CAST(entity_id AS TEXT) AS entity_id, type AS asset_type, \
           COUNT(*) AS preferred_count \
    FROM media_assets \
    WHERE preferred = 1 \
    GROUP BY entity_type, entity_id, type \
    HAVING COUNT(*) > 1 \
    ORDER BY entity_type, type, entity_id";

/// Read-only; callable on a pool, a connection or an open transaction.
pub async fn scan_conflicts<'e, E>(executor: E) -> AppResult<Vec<ConflictGroup>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, ConflictGroup>(CONFLICT_SCAN_SQL)
        .fetch_all(executor)
        .await
        .map_err(|err| {
            AppError::from(err)
                .with_context("operation", OPERATION)
                .with_context("step", "query_groups")
        })
}
