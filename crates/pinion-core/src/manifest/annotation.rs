//! Parser for the inline updater annotation.
//!
//! The annotation value has the compact form
//! `{<image-repo-prefix> <owner>/<repo>}`, e.g.
//! `{acme/widget atomisthq/widget}`. It maps a container image repository
//! to the source repository whose version bumps should rewrite it.

use crate::error::PinError;

/// Parsed image-repository to source-repository mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationMapping {
    /// Image reference up to (not including) the `:tag` suffix.
    pub image_repo_prefix: String,
    /// Source repository in `owner/repo` form.
    pub owner_repo: String,
}

impl AnnotationMapping {
    /// Parse an annotation value.
    ///
    /// Strips the enclosing braces and splits on whitespace; anything
    /// other than exactly two tokens is malformed. Absence of the
    /// annotation is the caller's concern (skip, not an error).
    pub fn parse(raw: &str) -> Result<Self, PinError> {
        let stripped = raw.trim().trim_start_matches('{').trim_end_matches('}');
        let tokens: Vec<&str> = stripped.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(PinError::MalformedAnnotation {
                annotation: raw.to_string(),
            });
        }
        Ok(Self {
            image_repo_prefix: tokens[0].to_string(),
            owner_repo: tokens[1].to_string(),
        })
    }

    /// Whether this mapping belongs to the given source repository.
    pub fn matches_repo(&self, owner: &str, repo: &str) -> bool {
        self.owner_repo == format!("{}/{}", owner, repo)
    }
}
