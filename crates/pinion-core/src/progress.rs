//! Deployment progress correlator.
//!
//! Consumes "pod running" observations, matches them against the
//! recorded deployment target for that environment/commit/image, and
//! drives the deploy goal's state accordingly. Observations are
//! idempotent: replaying one writes the goal to the same state again,
//! so duplicate or out-of-order delivery is harmless.

use std::sync::Arc;

use tracing::info;

use crate::facts::FactStore;
use crate::goals::{GoalKind, GoalState, GoalStore, GoalUpdate};
use crate::types::Environment;

/// One running pod, as reported by the event transport.
#[derive(Debug, Clone)]
pub struct PodRecord {
    pub name: String,
    pub environment: Environment,
}

/// A single "pod running" notification, reduced to what correlation needs.
#[derive(Debug, Clone)]
pub struct RunningPodObservation {
    pub environment: Environment,
    /// Container image reference, including tag.
    pub image_name: String,
    /// Commit SHA the running image was built from.
    pub image_commit_sha: String,
    /// Pods currently running this image in the same environment.
    pub current_replicas: u32,
}

impl RunningPodObservation {
    pub fn new(
        environment: Environment,
        image_name: impl Into<String>,
        image_commit_sha: impl Into<String>,
        current_replicas: u32,
    ) -> Self {
        Self {
            environment,
            image_name: image_name.into(),
            image_commit_sha: image_commit_sha.into(),
            current_replicas,
        }
    }

    /// Build an observation from the full pod roster for an image,
    /// counting only pods in the observation's own environment.
    pub fn from_roster(
        environment: Environment,
        image_name: impl Into<String>,
        image_commit_sha: impl Into<String>,
        roster: &[PodRecord],
    ) -> Self {
        let current_replicas = roster
            .iter()
            .filter(|pod| pod.environment == environment)
            .count() as u32;
        Self::new(environment, image_name, image_commit_sha, current_replicas)
    }
}

/// What one correlation step concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationOutcome {
    /// No deploy goal exists yet for this commit/environment; pods can
    /// report before the goal is created, so this is a logged no-op.
    NoGoal,
    /// Goal found but no recorded deployment target; absence of a target
    /// means no replica gate applies and the goal succeeds immediately.
    ImmediateSuccess,
    /// Rollout still scaling toward the recorded target.
    Scaling { current: u32, target: u32 },
    /// Current pod count reached (or passed) the recorded target.
    Converged { current: u32, target: u32 },
}

/// Correlates pod observations with recorded targets and updates goals.
pub struct ProgressCorrelator {
    goals: Arc<dyn GoalStore>,
    facts: Arc<dyn FactStore>,
}

impl ProgressCorrelator {
    pub fn new(goals: Arc<dyn GoalStore>, facts: Arc<dyn FactStore>) -> Self {
        Self { goals, facts }
    }

    /// Process one observation and update the matching deploy goal.
    pub async fn observe(
        &self,
        observation: &RunningPodObservation,
    ) -> anyhow::Result<CorrelationOutcome> {
        let kind = GoalKind::for_environment(observation.environment);

        let goal = match self
            .goals
            .find_goal(&observation.image_commit_sha, kind)
            .await
        {
            Ok(Some(goal)) => goal,
            Ok(None) => {
                info!(
                    environment = %observation.environment,
                    sha = %observation.image_commit_sha,
                    "No deploy goal found for running pod"
                );
                return Ok(CorrelationOutcome::NoGoal);
            }
            Err(err) => {
                // Expected race: pods can report before the goal exists.
                info!(
                    environment = %observation.environment,
                    sha = %observation.image_commit_sha,
                    %err,
                    "Deploy goal lookup failed for running pod"
                );
                return Ok(CorrelationOutcome::NoGoal);
            }
        };

        let target = self
            .facts
            .find_target(
                observation.environment,
                &observation.image_commit_sha,
                &observation.image_name,
            )
            .await?;

        let Some(target) = target else {
            self.goals
                .update_goal(
                    &goal,
                    GoalUpdate {
                        state: GoalState::Success,
                        description: kind.success_description().to_string(),
                        url: goal.url.clone(),
                    },
                )
                .await?;
            info!(goal = %goal.name, "No deployment target recorded; marking deploy goal successful");
            return Ok(CorrelationOutcome::ImmediateSuccess);
        };

        let current = observation.current_replicas;
        let wanted = target.target_replicas;
        info!(current, target = wanted, "Correlating pod count against deployment target");

        let (state, description, outcome) = if current >= wanted {
            (
                GoalState::Success,
                format!(
                    "{} ({}/{})",
                    kind.waiting_for_approval_description(),
                    current,
                    wanted
                ),
                CorrelationOutcome::Converged {
                    current,
                    target: wanted,
                },
            )
        } else {
            (
                GoalState::InProcess,
                format!("{} ({}/{})", kind.working_description(), current, wanted),
                CorrelationOutcome::Scaling {
                    current,
                    target: wanted,
                },
            )
        };

        self.goals
            .update_goal(
                &goal,
                GoalUpdate {
                    state,
                    description,
                    url: goal.url.clone(),
                },
            )
            .await?;
        info!(goal = %goal.name, ?state, "Updated deploy goal");

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::DeploymentTarget;
    use crate::facts::tests_support::FakeFactStore;
    use crate::goals::DeliveryGoal;
    use crate::goals::tests_support::FakeGoalStore;
    use chrono::Utc;

    fn staging_goal() -> DeliveryGoal {
        DeliveryGoal {
            name: "deploy-to-staging".to_string(),
            commit_sha: "abc123".to_string(),
            environment: Environment::Staging,
            url: Some("https://goals.example/abc123".to_string()),
        }
    }

    fn staging_target(target_replicas: u32) -> DeploymentTarget {
        DeploymentTarget {
            deployment_name: "widget".to_string(),
            image_tag: "acme/widget:1.2.3".to_string(),
            target_replicas,
            sha: "abc123".to_string(),
            previous_sha: "def456".to_string(),
            environment: Environment::Staging,
            timestamp: Utc::now(),
        }
    }

    fn observation(current: u32) -> RunningPodObservation {
        RunningPodObservation::new(Environment::Staging, "acme/widget:1.2.3", "abc123", current)
    }

    fn correlator(
        goals: Arc<FakeGoalStore>,
        facts: Arc<FakeFactStore>,
    ) -> ProgressCorrelator {
        ProgressCorrelator::new(goals, facts)
    }

    #[tokio::test]
    async fn test_scaling_sets_in_process_with_counts() {
        let goals = Arc::new(
            FakeGoalStore::new().with_goal(GoalKind::StagingDeploy, staging_goal()),
        );
        let facts = Arc::new(FakeFactStore::new().with_target(staging_target(5)));

        let outcome = correlator(goals.clone(), facts)
            .observe(&observation(2))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CorrelationOutcome::Scaling {
                current: 2,
                target: 5
            }
        );
        let updates = goals.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1.state, GoalState::InProcess);
        assert!(updates[0].1.description.contains("(2/5)"));
    }

    #[tokio::test]
    async fn test_converged_sets_success() {
        let goals = Arc::new(
            FakeGoalStore::new().with_goal(GoalKind::StagingDeploy, staging_goal()),
        );
        let facts = Arc::new(FakeFactStore::new().with_target(staging_target(5)));

        let outcome = correlator(goals.clone(), facts)
            .observe(&observation(5))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CorrelationOutcome::Converged {
                current: 5,
                target: 5
            }
        );
        let updates = goals.updates();
        assert_eq!(updates[0].1.state, GoalState::Success);
        assert!(updates[0].1.description.contains("(5/5)"));
    }

    #[tokio::test]
    async fn test_missing_target_is_immediate_success() {
        let goals = Arc::new(
            FakeGoalStore::new().with_goal(GoalKind::StagingDeploy, staging_goal()),
        );
        let facts = Arc::new(FakeFactStore::new());

        let outcome = correlator(goals.clone(), facts)
            .observe(&observation(0))
            .await
            .unwrap();

        assert_eq!(outcome, CorrelationOutcome::ImmediateSuccess);
        let updates = goals.updates();
        assert_eq!(updates[0].1.state, GoalState::Success);
        assert_eq!(updates[0].1.description, "Deployed to staging");
    }

    #[tokio::test]
    async fn test_missing_goal_is_logged_noop() {
        let goals = Arc::new(FakeGoalStore::new());
        let facts = Arc::new(FakeFactStore::new().with_target(staging_target(5)));

        let outcome = correlator(goals.clone(), facts)
            .observe(&observation(2))
            .await
            .unwrap();

        assert_eq!(outcome, CorrelationOutcome::NoGoal);
        assert!(goals.updates().is_empty());
    }

    #[tokio::test]
    async fn test_goal_lookup_failure_is_contained() {
        let goals = Arc::new(FakeGoalStore::new().failing_lookup());
        let facts = Arc::new(FakeFactStore::new());

        let outcome = correlator(goals.clone(), facts)
            .observe(&observation(2))
            .await
            .unwrap();

        assert_eq!(outcome, CorrelationOutcome::NoGoal);
        assert!(goals.updates().is_empty());
    }

    #[tokio::test]
    async fn test_goal_url_is_passed_through() {
        let goals = Arc::new(
            FakeGoalStore::new().with_goal(GoalKind::StagingDeploy, staging_goal()),
        );
        let facts = Arc::new(FakeFactStore::new().with_target(staging_target(5)));

        correlator(goals.clone(), facts)
            .observe(&observation(5))
            .await
            .unwrap();

        assert_eq!(
            goals.updates()[0].1.url.as_deref(),
            Some("https://goals.example/abc123")
        );
    }

    #[tokio::test]
    async fn test_replayed_observation_is_idempotent() {
        let goals = Arc::new(
            FakeGoalStore::new().with_goal(GoalKind::StagingDeploy, staging_goal()),
        );
        let facts = Arc::new(FakeFactStore::new().with_target(staging_target(5)));
        let correlator = correlator(goals.clone(), facts);

        correlator.observe(&observation(5)).await.unwrap();
        correlator.observe(&observation(5)).await.unwrap();

        let updates = goals.updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].1, updates[1].1);
    }

    #[test]
    fn test_from_roster_counts_same_environment_only() {
        let roster = vec![
            PodRecord {
                name: "widget-1".to_string(),
                environment: Environment::Staging,
            },
            PodRecord {
                name: "widget-2".to_string(),
                environment: Environment::Staging,
            },
            PodRecord {
                name: "widget-prod-1".to_string(),
                environment: Environment::Prod,
            },
        ];
        let obs = RunningPodObservation::from_roster(
            Environment::Staging,
            "acme/widget:1.2.3",
            "abc123",
            &roster,
        );
        assert_eq!(obs.current_replicas, 2);
    }
}
