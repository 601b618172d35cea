//! Typed error taxonomy for the pinning and correlation flows.
//!
//! Most failures here are contained at file or observation granularity:
//! a malformed annotation or unparseable manifest skips that one file,
//! and a missing goal is an expected race. Only [`PinError::ImageNotFound`]
//! aborts the rewrite it belongs to, because a deployment target without
//! a resolvable commit SHA is meaningless.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PinError {
    /// The `atomist.updater` annotation did not have the
    /// `{<image-repo-prefix> <owner>/<repo>}` shape.
    #[error("malformed updater annotation: {annotation:?}")]
    MalformedAnnotation { annotation: String },

    /// A manifest file could not be parsed as JSON.
    #[error("failed to parse manifest {}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No image metadata matched the given tag, so no commit SHA can be
    /// attached to the deployment target.
    #[error("no image found for tag {image_tag:?}")]
    ImageNotFound { image_tag: String },

    /// An environment value outside the closed staging/prod set.
    #[error("unknown environment {0:?}")]
    UnknownEnvironment(String),
}
