#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::path::Path;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub const MEDIA_ASSETS_SCHEMA: &str = "CREATE TABLE media_assets (
    id TEXT PRIMARY KEY,
    entity_type TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    type TEXT NOT NULL,
    source TEXT NOT NULL,
    plugin_id TEXT,
    path TEXT NOT NULL,
    format TEXT NOT NULL DEFAULT 'image/jpeg',
    preferred BOOLEAN NOT NULL DEFAULT 0,
    created_at DATETIME,
    updated_at DATETIME
)";

pub async fn temp_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect sqlite::memory:");
    sqlx::query(MEDIA_ASSETS_SCHEMA)
        .execute(&pool)
        .await
        .unwrap();
    pool
}

#[derive(Debug, Clone)]
pub struct AssetFixture {
    pub id: &'static str,
    pub entity_type: &'static str,
    pub entity_id: &'static str,
    pub asset_type: &'static str,
    pub source: &'static str,
    pub plugin_id: Option<&'static str>,
    pub path: &'static str,
    pub preferred: bool,
    pub created_at: Option<&'static str>,
}

impl AssetFixture {
    pub fn cover(id: &'static str, source: &'static str, path: &'static str) -> Self {
        AssetFixture {
            id,
            entity_type: "album",
            entity_id: "album-1",
            asset_type: "cover",
            source,
            plugin_id: None,
            path,
            preferred: true,
            created_at: Some("2024-01-01 00:00:00+00:00"),
        }
    }

    pub fn entity(mut self, entity_type: &'static str, entity_id: &'static str) -> Self {
        self.entity_type = entity_type;
        self.entity_id = entity_id;
        self
    }

    pub fn plugin(mut self, plugin_id: &'static str) -> Self {
        self.plugin_id = Some(plugin_id);
        self
    }

    pub fn created(mut self, created_at: &'static str) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn not_preferred(mut self) -> Self {
        self.preferred = false;
        self
    }
}

pub async fn insert_asset(pool: &SqlitePool, asset: &AssetFixture) {
    sqlx::query(
        "INSERT INTO media_assets (id, entity_type, entity_id, type, source, plugin_id, path, preferred, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(asset.id)
    .bind(asset.entity_type)
    .bind(asset.entity_id)
    .bind(asset.asset_type)
    .bind(asset.source)
    .bind(asset.plugin_id)
    .bind(asset.path)
    .bind(asset.preferred)
    .bind(asset.created_at)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn insert_assets(pool: &SqlitePool, assets: &[AssetFixture]) {
    for asset in assets {
        insert_asset(pool, asset).await;
    }
}

pub fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"asset").unwrap();
}

pub async fn preferred_ids(pool: &SqlitePool) -> Vec<String> {
    sqlx::query_scalar("SELECT id FROM media_assets WHERE preferred = 1 ORDER BY id")
        .fetch_all(pool)
        .await
        .unwrap()
}
