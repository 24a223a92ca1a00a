use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Composite key that must own at most one preferred asset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, FromRow)]
pub struct ConflictKey {
    pub entity_type: String,
    pub entity_id: String,
    pub asset_type: String,
}

impl ConflictKey {
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        asset_type: impl Into<String>,
    ) -> Self {
        ConflictKey {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            asset_type: asset_type.into(),
        }
    }
}

impl fmt::Display for ConflictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} type={}",
            self.entity_type, self.entity_id, self.asset_type
        )
    }
}

/// A key whose preferred count exceeds one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ConflictGroup {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub key: ConflictKey,
    pub preferred_count: i64,
}

/// One row of `media_assets`, restricted to the columns the repair pass reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MediaAsset {
    pub id: String,
    pub entity_type: String,
    pub entity_id: String,
    pub asset_type: String,
    /// Relative to the asset storage root.
    pub path: String,
    pub source: String,
    pub plugin_id: Option<String>,
    pub created_at: Option<String>,
    pub preferred: bool,
}

impl MediaAsset {
    pub fn source_kind(&self) -> AssetSource {
        AssetSource::parse(&self.source)
    }

    pub fn plugin_tier(&self) -> PluginTier {
        PluginTier::parse(self.plugin_id.as_deref())
    }
}

/// Where an asset came from. Unrecognized tags keep their raw value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetSource {
    Embedded,
    Plugin,
    Core,
    Other(String),
}

impl AssetSource {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "embedded" => AssetSource::Embedded,
            "plugin" => AssetSource::Plugin,
            "core" => AssetSource::Core,
            other => AssetSource::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AssetSource::Embedded => "embedded",
            AssetSource::Plugin => "plugin",
            AssetSource::Core => "core",
            AssetSource::Other(raw) => raw,
        }
    }
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trust tier of the enrichment plugin that produced an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginTier {
    MusicbrainzEnricher,
    CoreEnrichment,
    Other,
}

impl PluginTier {
    pub const MUSICBRAINZ_ENRICHER: &'static str = "musicbrainz_enricher";
    pub const CORE_ENRICHMENT: &'static str = "core_enrichment";

    pub fn parse(plugin_id: Option<&str>) -> Self {
        match plugin_id {
            Some(Self::MUSICBRAINZ_ENRICHER) => PluginTier::MusicbrainzEnricher,
            Some(Self::CORE_ENRICHMENT) => PluginTier::CoreEnrichment,
            _ => PluginTier::Other,
        }
    }
}
