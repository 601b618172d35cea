//! Image pin rewriter.
//!
//! Rewrites the image reference of every container whose repository
//! prefix matches the manifest's updater annotation, pinning it to the
//! requested version. Containers with a different prefix, and all
//! unrelated manifest content, are left untouched.

use serde_json::Value;
use tracing::{info, warn};

use crate::config::PinConfig;
use crate::types::UpdateRequest;

use super::{AnnotationMapping, ManifestDocument};

/// One container whose image reference was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRewrite {
    pub container_name: Option<String>,
    pub previous_image: String,
    pub current_image: String,
}

/// Result of rewriting one manifest.
#[derive(Debug, Clone, Default)]
pub struct RewriteOutcome {
    /// Rewrites in container order; empty when the manifest was left clean.
    pub rewrites: Vec<ContainerRewrite>,
}

impl RewriteOutcome {
    pub fn dirty(&self) -> bool {
        !self.rewrites.is_empty()
    }

    /// Image reference replaced in the last rewritten container.
    pub fn previous_image(&self) -> Option<&str> {
        self.rewrites.last().map(|r| r.previous_image.as_str())
    }

    /// Image reference now pinned in the last rewritten container.
    pub fn current_image(&self) -> Option<&str> {
        self.rewrites.last().map(|r| r.current_image.as_str())
    }
}

/// Pin matching container images in `doc` to the requested version.
///
/// Mutates the document in place and returns the accumulated per-container
/// rewrites. The document is only worth persisting when the outcome is
/// dirty; re-running with the same version yields a clean outcome.
pub fn rewrite_manifest(
    doc: &mut ManifestDocument,
    request: &UpdateRequest,
    config: &PinConfig,
) -> RewriteOutcome {
    let mut outcome = RewriteOutcome::default();

    if !doc.is_deployment() {
        return outcome;
    }

    let raw = match doc.pod_annotation(&config.annotation_key) {
        Some(raw) => raw,
        // No mapping means this container group is not managed by us.
        None => return outcome,
    };

    let mapping = match AnnotationMapping::parse(raw) {
        Ok(mapping) => mapping,
        Err(err) => {
            // Manifests are untrusted external files; skip, never crash.
            warn!(path = %doc.path().display(), %err, "Skipping manifest with malformed updater annotation");
            return outcome;
        }
    };

    if !mapping.matches_repo(&request.owner, &request.repo) {
        return outcome;
    }

    let path = doc.path().to_path_buf();
    let Some(containers) = doc.containers_mut() else {
        return outcome;
    };

    for container in containers.iter_mut() {
        let Some(image) = container.get("image").and_then(|v| v.as_str()) else {
            continue;
        };
        let mut parts = image.splitn(2, ':');
        let repo_with_name = parts.next().unwrap_or_default();
        let tag = parts.next();

        if repo_with_name != mapping.image_repo_prefix {
            continue;
        }
        if tag == Some(request.version.as_str()) {
            // Already pinned; keeps the whole pipeline safely re-runnable.
            continue;
        }

        let previous_image = image.to_string();
        let current_image = format!("{}:{}", repo_with_name, request.version);
        let container_name = container
            .get("name")
            .and_then(|v| v.as_str())
            .map(String::from);

        if let Some(slot) = container.get_mut("image") {
            *slot = Value::String(current_image.clone());
        }
        outcome.rewrites.push(ContainerRewrite {
            container_name,
            previous_image,
            current_image,
        });
    }

    if outcome.dirty() {
        info!(
            path = %path.display(),
            version = %request.version,
            containers = outcome.rewrites.len(),
            "Pinned manifest to new image version"
        );
    }

    outcome
}
