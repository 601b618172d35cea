//! Rewrite pipeline: scan a project, pin images, record deployment targets.
//!
//! The file write and the fact publication are deliberately not
//! transactional; the pipeline is safe to re-run because a manifest
//! already at the target version produces a clean rewrite and no fact.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::{error, info};

use crate::config::PinConfig;
use crate::error::PinError;
use crate::facts::{DeploymentTarget, FactStore, ImageLookup};
use crate::manifest::{ManifestDocument, RewriteOutcome, rewrite_manifest, scan_manifests};
use crate::replicas::ReplicaPolicy;
use crate::types::UpdateRequest;

/// Summary of one pipeline run over a project tree.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    /// Manifest files written back with a new image pin.
    pub files_changed: Vec<PathBuf>,
    /// Deployment-target facts published, one per rewritten container.
    pub facts_published: usize,
    /// Commit message for the out-of-scope source-control layer.
    pub commit_message: String,
}

impl UpdateReport {
    pub fn dirty(&self) -> bool {
        !self.files_changed.is_empty()
    }
}

/// Scans manifests, pins images, and records deployment targets.
pub struct SpecUpdater {
    images: Arc<dyn ImageLookup>,
    facts: Arc<dyn FactStore>,
    config: PinConfig,
}

impl SpecUpdater {
    pub fn new(images: Arc<dyn ImageLookup>, facts: Arc<dyn FactStore>, config: PinConfig) -> Self {
        Self {
            images,
            facts,
            config,
        }
    }

    /// Pin every matching Deployment under `root` to the requested version.
    ///
    /// Failures are contained at file granularity: a manifest whose new
    /// image tag has no known commit SHA is logged and skipped without
    /// being written, and the remaining files are still processed.
    pub async fn update_project(
        &self,
        root: &Path,
        request: &UpdateRequest,
    ) -> anyhow::Result<UpdateReport> {
        let policy = ReplicaPolicy::from_config(&self.config);
        let mut report = UpdateReport {
            files_changed: Vec::new(),
            facts_published: 0,
            commit_message: format!(
                "Update {}/{} to {}",
                request.owner, request.repo, request.version
            ),
        };

        for mut doc in scan_manifests(root, &self.config)? {
            let outcome = rewrite_manifest(&mut doc, request, &self.config);
            if !outcome.dirty() {
                continue;
            }

            match self.record_rewrite(&doc, &outcome, request, &policy).await {
                Ok(published) => {
                    report.files_changed.push(doc.path().to_path_buf());
                    report.facts_published += published;
                    info!(
                        path = %doc.path().display(),
                        slug = %request.slug(),
                        version = %request.version,
                        "Updated manifest"
                    );
                }
                Err(err) if is_image_not_found(&err) => {
                    // Without a resolvable SHA pair the target would be
                    // meaningless, so this file is left untouched on disk.
                    error!(path = %doc.path().display(), %err, "Skipping rewrite");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(report)
    }

    /// Resolve SHAs, persist the manifest, and publish one fact per
    /// rewritten container. SHA resolution happens before the file write
    /// so an unresolvable image never leaves a half-updated tree.
    async fn record_rewrite(
        &self,
        doc: &ManifestDocument,
        outcome: &RewriteOutcome,
        request: &UpdateRequest,
        policy: &ReplicaPolicy,
    ) -> anyhow::Result<usize> {
        let declared = doc.replicas().unwrap_or(1);
        let target_replicas = policy.target_replicas(declared, request.environment, doc.path());
        let deployment_name = doc.name().unwrap_or_default().to_string();

        let mut targets = Vec::with_capacity(outcome.rewrites.len());
        for rewrite in &outcome.rewrites {
            let previous_sha = self.resolve_sha(&rewrite.previous_image).await?;
            let sha = self.resolve_sha(&rewrite.current_image).await?;
            targets.push(DeploymentTarget {
                deployment_name: deployment_name.clone(),
                image_tag: rewrite.current_image.clone(),
                target_replicas,
                sha,
                previous_sha,
                environment: request.environment,
                timestamp: Utc::now(),
            });
        }

        doc.write_back()?;

        for target in &targets {
            self.facts
                .publish(target)
                .await
                .with_context(|| format!("Failed to publish deployment target for {}", target.image_tag))?;
        }

        Ok(targets.len())
    }

    async fn resolve_sha(&self, image_tag: &str) -> anyhow::Result<String> {
        match self.images.commit_for_tag(image_tag).await? {
            Some(sha) => Ok(sha),
            None => Err(PinError::ImageNotFound {
                image_tag: image_tag.to_string(),
            }
            .into()),
        }
    }
}

fn is_image_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<PinError>(),
        Some(PinError::ImageNotFound { .. })
    )
}
