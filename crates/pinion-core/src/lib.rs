//! Pinion Core Library
//!
//! Provides the deployment-target tracking and manifest image-pinning
//! engine: rewriting Kubernetes Deployment manifests to pin new image
//! versions, recording the intended replica target as a durable fact,
//! and correlating running-pod observations against that target to
//! drive deploy-goal state.

pub mod config;
pub mod error;
pub mod facts;
pub mod goals;
pub mod manifest;
pub mod progress;
pub mod recorder;
pub mod replicas;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Core vocabulary
    pub use crate::error::PinError;
    pub use crate::types::{Environment, UpdateRequest};

    // Configuration
    pub use crate::config::PinConfig;

    // Manifests
    pub use crate::manifest::{
        AnnotationMapping, ContainerRewrite, ManifestDocument, RewriteOutcome, rewrite_manifest,
        scan_manifests,
    };

    // Replica policy
    pub use crate::replicas::ReplicaPolicy;

    // Facts and collaborators
    pub use crate::facts::{DeploymentTarget, FactStore, ImageLookup};

    // Goals
    pub use crate::goals::{DeliveryGoal, GoalKind, GoalState, GoalStore, GoalUpdate};

    // Services
    pub use crate::progress::{
        CorrelationOutcome, PodRecord, ProgressCorrelator, RunningPodObservation,
    };
    pub use crate::recorder::{SpecUpdater, UpdateReport};
}
