use std::path::Path;

use anyhow::Result;
use assert_cmd::Command;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tempfile::tempdir;

mod util;

use util::{insert_assets, preferred_ids, touch, AssetFixture, MEDIA_ASSETS_SCHEMA};

async fn file_pool(db_path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    Ok(pool)
}

async fn seed_catalog(data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir.join("assets"))?;
    touch(&data_dir.join("assets"), "covers/core.jpg");

    let pool = file_pool(&data_dir.join("viewra.db")).await?;
    sqlx::query(MEDIA_ASSETS_SCHEMA).execute(&pool).await?;
    insert_assets(
        &pool,
        &[
            AssetFixture::cover("core", "core", "covers/core.jpg"),
            AssetFixture::cover("embedded", "embedded", "covers/embedded.jpg")
                .plugin("musicbrainz_enricher"),
        ],
    )
    .await;
    pool.close().await;
    Ok(())
}

#[test]
fn missing_database_is_a_quiet_early_return() -> Result<()> {
    let tmp = tempdir()?;
    let output = Command::cargo_bin("assetfix")?
        .arg("--data-dir")
        .arg(tmp.path())
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Database not found"), "stdout: {stdout}");
    Ok(())
}

#[test]
fn missing_assets_dir_is_a_quiet_early_return() -> Result<()> {
    let tmp = tempdir()?;
    std::fs::write(tmp.path().join("viewra.db"), b"")?;
    let output = Command::cargo_bin("assetfix")?
        .env("ASSETFIX_DATA_DIR", tmp.path())
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Assets directory not found"), "stdout: {stdout}");
    Ok(())
}

#[tokio::test]
async fn run_fixes_conflicts_and_prints_report() -> Result<()> {
    let tmp = tempdir()?;
    seed_catalog(tmp.path()).await?;

    let output = Command::cargo_bin("assetfix")?
        .arg("--data-dir")
        .arg(tmp.path())
        .output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Found 1 entity+type combinations"));
    assert!(stdout.contains("Warning: File does not exist: covers/embedded.jpg"));
    assert!(stdout.contains("Set preferred: covers/core.jpg (source: core, plugin: -)"));
    assert!(stdout.contains("Conflicts fixed: 1"));
    assert!(stdout.contains("All conflicts resolved!"));
    assert!(stdout.contains("Total assets: 2"));

    let pool = file_pool(&tmp.path().join("viewra.db")).await?;
    assert_eq!(preferred_ids(&pool).await, vec!["core".to_string()]);
    pool.close().await;
    Ok(())
}

#[tokio::test]
async fn json_dry_run_leaves_catalog_untouched() -> Result<()> {
    let tmp = tempdir()?;
    seed_catalog(tmp.path()).await?;

    let output = Command::cargo_bin("assetfix")?
        .arg("--data-dir")
        .arg(tmp.path())
        .args(["--dry-run", "--json", "--recency", "legacy"])
        .output()?;
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(summary["status"], "dry_run");
    assert_eq!(summary["recency"], "legacy");
    assert_eq!(summary["conflicts_found"], 1);
    assert_eq!(summary["groups"][0]["outcome"], "would_resolve");
    assert_eq!(summary["groups"][0]["candidates"][0]["asset"]["id"], "core");

    let pool = file_pool(&tmp.path().join("viewra.db")).await?;
    assert_eq!(
        preferred_ids(&pool).await,
        vec!["core".to_string(), "embedded".to_string()]
    );
    pool.close().await;
    Ok(())
}
