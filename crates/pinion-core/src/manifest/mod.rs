//! Kubernetes-style manifest document model.
//!
//! Manifests are community-authored JSON and can carry arbitrary content
//! beyond the handful of fields this engine reads. The document wraps the
//! raw `serde_json::Value` and exposes typed accessors for just those
//! fields; everything else is preserved opaquely and re-serialized
//! unchanged so committed files do not pick up diff noise.

pub mod annotation;
pub mod rewrite;
pub mod scanner;

pub use annotation::AnnotationMapping;
pub use rewrite::{ContainerRewrite, RewriteOutcome, rewrite_manifest};
pub use scanner::scan_manifests;

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::Value;

use crate::error::PinError;

/// Manifest kind this engine rewrites.
pub const DEPLOYMENT_KIND: &str = "Deployment";

/// One parsed manifest file.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    path: PathBuf,
    value: Value,
}

impl ManifestDocument {
    /// Parse a manifest from a file on disk.
    pub fn from_path(path: &Path) -> Result<Self, PinError> {
        let content = std::fs::read_to_string(path).map_err(|err| PinError::ManifestParse {
            path: path.to_path_buf(),
            source: serde_json::Error::io(err),
        })?;
        Self::from_str(path, &content)
    }

    /// Parse a manifest from already-loaded content.
    pub fn from_str(path: &Path, content: &str) -> Result<Self, PinError> {
        let value = serde_json::from_str(content).map_err(|source| PinError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            value,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The manifest's `kind` tag, if present.
    pub fn kind(&self) -> Option<&str> {
        self.value.get("kind")?.as_str()
    }

    pub fn is_deployment(&self) -> bool {
        self.kind() == Some(DEPLOYMENT_KIND)
    }

    /// `metadata.name`.
    pub fn name(&self) -> Option<&str> {
        self.value.get("metadata")?.get("name")?.as_str()
    }

    /// Declared `spec.replicas`.
    pub fn replicas(&self) -> Option<u32> {
        let replicas = self.value.get("spec")?.get("replicas")?.as_u64()?;
        u32::try_from(replicas).ok()
    }

    /// Look up one pod-template annotation by key.
    pub fn pod_annotation(&self, key: &str) -> Option<&str> {
        self.value
            .get("spec")?
            .get("template")?
            .get("metadata")?
            .get("annotations")?
            .get(key)?
            .as_str()
    }

    /// Pod-template container list, mutable for image rewrites.
    pub fn containers_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.value
            .get_mut("spec")?
            .get_mut("template")?
            .get_mut("spec")?
            .get_mut("containers")?
            .as_array_mut()
    }

    /// Serialize back to the committed on-disk shape (pretty JSON).
    pub fn to_pretty_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(&self.value).context("Failed to serialize manifest")
    }

    /// Write the (possibly mutated) document back to its file.
    pub fn write_back(&self) -> anyhow::Result<()> {
        let content = self.to_pretty_json()?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write manifest: {}", self.path.display()))?;
        Ok(())
    }

    /// Raw JSON value, for assertions on opaque content.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use serde_json::json;

    /// A Deployment manifest in the shape the engine expects, with some
    /// unrelated fields that must survive a rewrite untouched.
    pub fn deployment_json(image: &str, replicas: u32) -> String {
        serde_json::to_string_pretty(&json!({
            "kind": "Deployment",
            "apiVersion": "extensions/v1beta1",
            "metadata": {
                "name": "widget",
                "labels": { "app": "widget" }
            },
            "spec": {
                "replicas": replicas,
                "template": {
                    "metadata": {
                        "annotations": {
                            "atomist.updater": "{acme/widget atomisthq/widget}"
                        }
                    },
                    "spec": {
                        "containers": [
                            {
                                "name": "widget",
                                "image": image,
                                "resources": { "limits": { "memory": "512Mi" } }
                            }
                        ]
                    }
                }
            }
        }))
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_accessors() {
        let content = test_fixtures::deployment_json("acme/widget:1.0.0", 2);
        let doc = ManifestDocument::from_str(Path::new("80-widget.json"), &content).unwrap();
        assert!(doc.is_deployment());
        assert_eq!(doc.name(), Some("widget"));
        assert_eq!(doc.replicas(), Some(2));
        assert_eq!(
            doc.pod_annotation("atomist.updater"),
            Some("{acme/widget atomisthq/widget}")
        );
    }

    #[test]
    fn test_non_deployment_kind() {
        let doc =
            ManifestDocument::from_str(Path::new("svc.json"), r#"{"kind":"Service"}"#).unwrap();
        assert!(!doc.is_deployment());
        assert_eq!(doc.replicas(), None);
        assert_eq!(doc.pod_annotation("atomist.updater"), None);
    }

    #[test]
    fn test_parse_failure_is_typed() {
        let err = ManifestDocument::from_str(Path::new("bad.json"), "{not json").unwrap_err();
        assert!(matches!(err, PinError::ManifestParse { .. }));
    }
}
