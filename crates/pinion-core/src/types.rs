//! Shared core types used across the rewrite and correlation flows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PinError;

/// Deployment environment a manifest or pod belongs to.
///
/// A closed enumeration rather than a raw string so that unrecognized
/// environment values surface as errors instead of silently skipping
/// goal routing and replica policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Pre-production environment.
    Staging,
    /// Production environment.
    Prod,
}

impl Environment {
    /// Wire spelling used in manifests, facts, and pod events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Staging => "staging",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staging" => Ok(Environment::Staging),
            "prod" => Ok(Environment::Prod),
            other => Err(PinError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Request to pin every matching manifest in a project to a new image version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Repository owner (e.g., "atomisthq").
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Image version to pin to (the `:tag` suffix without the repo part).
    pub version: String,
    /// Environment the rollout targets.
    pub environment: Environment,
}

impl UpdateRequest {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        version: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            version: version.into(),
            environment,
        }
    }

    /// The `owner/repo` slug this request applies to.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
