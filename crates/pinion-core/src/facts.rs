//! Durable deployment-target facts and the external stores they live in.
//!
//! A `DeploymentTarget` is emitted once per rewritten container and is
//! never mutated afterwards; later rewrites of the same deployment
//! supersede it with a fresh fact. The stores themselves (event/fact
//! store, image metadata index) belong to the surrounding delivery
//! framework and are reached through the traits below.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Environment;

/// The intended image and replica count for one environment after a rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTarget {
    /// `metadata.name` of the rewritten Deployment.
    pub deployment_name: String,
    /// New image reference, including tag.
    pub image_tag: String,
    /// Intended replica count after the region policy applies.
    pub target_replicas: u32,
    /// Commit SHA the new image was built from.
    pub sha: String,
    /// Commit SHA of the image being replaced.
    pub previous_sha: String,
    /// Environment the rollout targets.
    pub environment: Environment,
    /// When the target was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Image-metadata lookup: resolve an image tag to its originating commit.
#[async_trait]
pub trait ImageLookup: Send + Sync {
    /// Commit SHA for the image built with `image_tag`, if any is known.
    async fn commit_for_tag(&self, image_tag: &str) -> anyhow::Result<Option<String>>;
}

/// External event/fact store holding published deployment targets.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Publish one deployment-target fact.
    async fn publish(&self, target: &DeploymentTarget) -> anyhow::Result<()>;

    /// Fetch the recorded target for `(environment, sha, image_tag)`.
    async fn find_target(
        &self,
        environment: Environment,
        sha: &str,
        image_tag: &str,
    ) -> anyhow::Result<Option<DeploymentTarget>>;
}
