//! Replica target policy for rewritten manifests.

use std::path::Path;

use crate::config::PinConfig;
use crate::types::Environment;

/// Region/environment-based replica fan-out rule.
///
/// Production rollouts outside the primary region are intentionally
/// scaled wider for capacity headroom. Both the region marker and the
/// factor are policy constants carried in configuration, not derived.
#[derive(Debug, Clone)]
pub struct ReplicaPolicy {
    primary_region_marker: String,
    prod_replica_factor: u32,
}

impl ReplicaPolicy {
    pub fn new(primary_region_marker: impl Into<String>, prod_replica_factor: u32) -> Self {
        Self {
            primary_region_marker: primary_region_marker.into(),
            prod_replica_factor,
        }
    }

    pub fn from_config(config: &PinConfig) -> Self {
        Self::new(&config.primary_region_marker, config.prod_replica_factor)
    }

    /// Intended replica count for a rollout of `declared` replicas.
    ///
    /// Prod manifests whose path does not denote the primary region get
    /// `declared * factor`; everything else keeps the declared count.
    pub fn target_replicas(
        &self,
        declared: u32,
        environment: Environment,
        manifest_path: &Path,
    ) -> u32 {
        if environment == Environment::Prod && !self.is_primary_region(manifest_path) {
            declared * self.prod_replica_factor
        } else {
            declared
        }
    }

    fn is_primary_region(&self, manifest_path: &Path) -> bool {
        manifest_path
            .to_string_lossy()
            .contains(&self.primary_region_marker)
    }
}

impl Default for ReplicaPolicy {
    fn default() -> Self {
        Self::from_config(&PinConfig::default())
    }
}
