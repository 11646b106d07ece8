//! One-shot deferred follow-up.
//!
//! No cancellation handle exists: the status check at fire time is the
//! cancellation mechanism. Each `schedule` call fires at most once.

use std::sync::Arc;
use std::time::Duration;

use crate::models::EmergencyCase;

use super::Orchestrator;

/// Whether a deferred follow-up should run when it fires: the case must
/// still exist and must not have reached a terminal status in the interim.
pub fn should_fire(case: Option<&EmergencyCase>) -> bool {
    case.map_or(false, |c| !c.status.is_terminal())
}

#[derive(Clone)]
pub struct FollowUpScheduler {
    orchestrator: Arc<Orchestrator>,
}

impl FollowUpScheduler {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Arrange a single deferred follow-up for `case_code` after `delay`.
    /// Requires a running Tokio runtime; the stage itself runs on a
    /// blocking thread.
    pub fn schedule(&self, case_code: String, delay: Duration) {
        let orchestrator = Arc::clone(&self.orchestrator);
        tracing::debug!(case_code = %case_code, delay_secs = delay.as_secs(), "Follow-up scheduled");

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let joined = tokio::task::spawn_blocking(move || {
                let case = orchestrator.store().get_by_code(&case_code);
                if should_fire(case.as_ref()) {
                    if let Some(case) = case {
                        orchestrator.run_follow_up(&case);
                    }
                } else {
                    tracing::debug!(
                        case_code = %case_code,
                        "Deferred follow-up skipped, case terminal or gone"
                    );
                }
            })
            .await;
            if let Err(e) = joined {
                tracing::warn!(error = %e, "Deferred follow-up task failed");
            }
        });
    }
}
