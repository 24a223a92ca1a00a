use std::path::{Path, PathBuf};

use crate::{AppError, AppResult};

/// Overrides the conventional data directory when set.
pub const DATA_DIR_ENV: &str = "ASSETFIX_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "viewra-data";
pub const DB_FILE_NAME: &str = "viewra.db";
pub const ASSETS_DIR_NAME: &str = "assets";

pub const DB_NOT_FOUND_CODE: &str = "CONFIG/DB_NOT_FOUND";
pub const ASSETS_NOT_FOUND_CODE: &str = "CONFIG/ASSETS_NOT_FOUND";

#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub data_dir: Option<PathBuf>,
    pub db: Option<PathBuf>,
    pub assets: Option<PathBuf>,
}

/// Where the catalog database and the asset storage root live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairConfig {
    pub db_path: PathBuf,
    pub assets_dir: PathBuf,
}

impl RepairConfig {
    pub fn from_data_dir(data_dir: &Path) -> Self {
        RepairConfig {
            db_path: data_dir.join(DB_FILE_NAME),
            assets_dir: data_dir.join(ASSETS_DIR_NAME),
        }
    }

    /// Explicit paths win, then `ASSETFIX_DATA_DIR`, then `./viewra-data`.
    pub fn resolve(overrides: PathOverrides) -> AppResult<Self> {
        let env_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        let cwd = std::env::current_dir()
            .map_err(|err| AppError::from(err).with_context("operation", "resolve_config"))?;
        Ok(Self::resolve_with(overrides, env_dir, &cwd))
    }

    pub fn resolve_with(overrides: PathOverrides, env_dir: Option<PathBuf>, cwd: &Path) -> Self {
        let data_dir = overrides
            .data_dir
            .or(env_dir)
            .unwrap_or_else(|| cwd.join(DEFAULT_DATA_DIR));
        let defaults = Self::from_data_dir(&data_dir);
        RepairConfig {
            db_path: overrides.db.unwrap_or(defaults.db_path),
            assets_dir: overrides.assets.unwrap_or(defaults.assets_dir),
        }
    }

    pub fn check_prerequisites(&self) -> AppResult<()> {
        if !self.db_path.is_file() {
            return Err(AppError::new(
                DB_NOT_FOUND_CODE,
                format!("Database not found: {}", self.db_path.display()),
            )
            .with_context("path", self.db_path.display().to_string()));
        }
        if !self.assets_dir.is_dir() {
            return Err(AppError::new(
                ASSETS_NOT_FOUND_CODE,
                format!("Assets directory not found: {}", self.assets_dir.display()),
            )
            .with_context("path", self.assets_dir.display().to_string()));
        }
        Ok(())
    }
}

/// Missing prerequisites end the run quietly rather than as a failure.
pub fn is_missing_prerequisite(err: &AppError) -> bool {
    matches!(err.code(), DB_NOT_FOUND_CODE | ASSETS_NOT_FOUND_CODE)
}
