//! Delivery-goal surface consumed by the correlator.
//!
//! Goals are owned by the surrounding delivery machine; this engine only
//! ever locates an existing goal by commit and environment and writes a
//! new state/description to it. It never creates or deletes goals.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::Environment;

/// Delivery-goal lifecycle states.
///
/// Only `InProcess` and `Success` are ever written by this engine; the
/// remaining states belong to the out-of-scope goal graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalState {
    Planned,
    Requested,
    InProcess,
    WaitingForApproval,
    Success,
    Failure,
}

/// Which deploy goal an observation routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalKind {
    StagingDeploy,
    ProdDeploy,
}

impl GoalKind {
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Staging => GoalKind::StagingDeploy,
            Environment::Prod => GoalKind::ProdDeploy,
        }
    }

    /// Description while the rollout is still scaling up.
    pub fn working_description(&self) -> &'static str {
        match self {
            GoalKind::StagingDeploy => "Deploying to staging...",
            GoalKind::ProdDeploy => "Deploying to prod...",
        }
    }

    /// Description once the rollout is considered done.
    pub fn success_description(&self) -> &'static str {
        match self {
            GoalKind::StagingDeploy => "Deployed to staging",
            GoalKind::ProdDeploy => "Deployed to prod",
        }
    }

    /// Description shown when the goal gates on approval after converging.
    pub fn waiting_for_approval_description(&self) -> &'static str {
        match self {
            GoalKind::StagingDeploy => "Promote to prod",
            GoalKind::ProdDeploy => "Rollout complete",
        }
    }
}

/// A delivery goal located in the external goal store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryGoal {
    /// Goal name as known to the delivery machine.
    pub name: String,
    /// Commit the goal is attached to.
    pub commit_sha: String,
    /// Environment the goal deploys to.
    pub environment: Environment,
    /// Progress-log or dashboard URL carried through updates unchanged.
    pub url: Option<String>,
}

/// State/description update applied to a located goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalUpdate {
    pub state: GoalState,
    pub description: String,
    pub url: Option<String>,
}

/// External goal store lookup and update operations.
#[async_trait]
pub trait GoalStore: Send + Sync {
    /// Locate the in-flight goal of `kind` for `commit_sha`, if any.
    async fn find_goal(
        &self,
        commit_sha: &str,
        kind: GoalKind,
    ) -> anyhow::Result<Option<DeliveryGoal>>;

    /// Write a new state to a previously located goal.
    async fn update_goal(&self, goal: &DeliveryGoal, update: GoalUpdate) -> anyhow::Result<()>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_routing() {
        assert_eq!(
            GoalKind::for_environment(Environment::Staging),
            GoalKind::StagingDeploy
        );
        assert_eq!(
            GoalKind::for_environment(Environment::Prod),
            GoalKind::ProdDeploy
        );
    }

    #[test]
    fn test_goal_state_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&GoalState::InProcess).unwrap(),
            "\"in_process\""
        );
        assert_eq!(
            serde_json::to_string(&GoalState::Success).unwrap(),
            "\"success\""
        );
    }
}
