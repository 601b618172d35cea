//! Manifest scanner: walk a project tree for JSON manifest files.

use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

use crate::config::PinConfig;

use super::ManifestDocument;

/// Recursively collect parsed manifests under `root`.
///
/// Entries are visited in lexicographic order so scans are deterministic.
/// Files that fail to parse are logged and skipped; manifests are
/// independently authored and one malformed file must not abort the scan
/// of its siblings.
pub fn scan_manifests(root: &Path, config: &PinConfig) -> anyhow::Result<Vec<ManifestDocument>> {
    let mut manifests = Vec::new();
    scan_dir(root, config, &mut manifests)?;
    Ok(manifests)
}

fn scan_dir(
    dir: &Path,
    config: &PinConfig,
    manifests: &mut Vec<ManifestDocument>,
) -> anyhow::Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut sorted_entries: Vec<_> = entries
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read directory entries: {}", dir.display()))?;
    sorted_entries.sort_by_key(|e| e.file_name());

    for entry in sorted_entries {
        let path = entry.path();
        let ty = entry
            .file_type()
            .with_context(|| format!("Failed to stat file: {}", path.display()))?;

        if ty.is_dir() {
            scan_dir(&path, config, manifests)?;
        } else if ty.is_file() && has_extension(&path, &config.manifest_extension) {
            debug!(path = %path.display(), "Processing manifest file");
            match ManifestDocument::from_path(&path) {
                Ok(doc) => manifests.push(doc),
                Err(err) => {
                    warn!(path = %path.display(), %err, "Skipping unparseable manifest");
                }
            }
        }
    }

    Ok(())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}
