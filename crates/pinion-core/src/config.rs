//! Configuration schema for pinion.toml
//!
//! Carries the policy knobs the engine must not hard-code: the updater
//! annotation key, the manifest file extension, and the replica fan-out
//! rule for production rollouts outside the primary region.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Root configuration structure for pinion.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinConfig {
    /// Pod-template annotation holding the image/repo mapping.
    #[serde(default = "default_annotation_key")]
    pub annotation_key: String,

    /// File extension selected by the manifest scanner.
    #[serde(default = "default_manifest_extension")]
    pub manifest_extension: String,

    /// Path fragment identifying manifests in the primary region.
    #[serde(default = "default_primary_region_marker")]
    pub primary_region_marker: String,

    /// Replica multiplier for prod manifests outside the primary region.
    #[serde(default = "default_prod_replica_factor")]
    pub prod_replica_factor: u32,
}

fn default_annotation_key() -> String {
    "atomist.updater".to_string()
}

fn default_manifest_extension() -> String {
    "json".to_string()
}

fn default_primary_region_marker() -> String {
    "/us-east1".to_string()
}

fn default_prod_replica_factor() -> u32 {
    3
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            annotation_key: default_annotation_key(),
            manifest_extension: default_manifest_extension(),
            primary_region_marker: default_primary_region_marker(),
            prod_replica_factor: default_prod_replica_factor(),
        }
    }
}

impl PinConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields. A missing file yields the full default config.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}
