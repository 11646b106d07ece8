//! Facade tying intake, the pipeline, and the external case operations
//! together. This is the surface an HTTP layer or CLI would call into.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::catalog::ServiceDirectory;
use crate::config;
use crate::intelligence::Classifier;
use crate::metrics::{self, DashboardMetrics};
use crate::models::{
    CaseStatus, CaseUpdate, EmergencyCase, NewCase, NewCaseUpdate, StageName, UpdateKind,
};
use crate::notify::{self, SmsGateway};
use crate::pipeline::{follow_up, FollowUpScheduler, Orchestrator};
use crate::state;
use crate::store::CaseStore;

pub struct EmergencyService {
    store: Arc<dyn CaseStore>,
    directory: Arc<ServiceDirectory>,
    sms: Arc<dyn SmsGateway>,
    orchestrator: Arc<Orchestrator>,
    scheduler: FollowUpScheduler,
    follow_up_delay: Duration,
}

impl EmergencyService {
    pub fn new(
        store: Arc<dyn CaseStore>,
        classifier: Arc<dyn Classifier>,
        directory: Arc<ServiceDirectory>,
        sms: Arc<dyn SmsGateway>,
    ) -> Self {
        Self::with_follow_up_delay(
            store,
            classifier,
            directory,
            sms,
            Duration::from_secs(config::FOLLOW_UP_DELAY_MINUTES * 60),
        )
    }

    /// Same as [`EmergencyService::new`] with an explicit deferred
    /// follow-up delay.
    pub fn with_follow_up_delay(
        store: Arc<dyn CaseStore>,
        classifier: Arc<dyn Classifier>,
        directory: Arc<ServiceDirectory>,
        sms: Arc<dyn SmsGateway>,
        follow_up_delay: Duration,
    ) -> Self {
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::clone(&store),
            classifier,
            Arc::clone(&directory),
            Arc::clone(&sms),
        ));
        Self {
            store,
            directory,
            sms,
            scheduler: FollowUpScheduler::new(Arc::clone(&orchestrator)),
            orchestrator,
            follow_up_delay,
        }
    }

    /// Register a report and kick off its pipeline in the background.
    /// Returns the created case immediately; requires a running Tokio
    /// runtime for the background run and the deferred follow-up. The
    /// deferred follow-up is scheduled when the initial run finishes, so
    /// its delay counts from that point, not from intake.
    pub fn submit(&self, new_case: NewCase) -> EmergencyCase {
        let case = self.store.create_case(new_case);
        tracing::info!(
            case_code = %case.case_code,
            category = case.category.as_str(),
            "Case registered"
        );

        if case.degraded_mode {
            self.try_send(&case.phone_number, &notify::status_update(&case), &case.case_code);
        }

        let orchestrator = Arc::clone(&self.orchestrator);
        let scheduler = self.scheduler.clone();
        let id = case.id;
        let case_code = case.case_code.clone();
        let delay = self.follow_up_delay;
        tokio::spawn(async move {
            let run = tokio::task::spawn_blocking(move || orchestrator.run_pipeline(id)).await;
            if let Err(e) = run {
                tracing::warn!(case_code = %case_code, error = %e, "Pipeline task failed");
                return;
            }
            scheduler.schedule(case_code, delay);
        });
        case
    }

    pub fn get(&self, id: Uuid) -> Option<EmergencyCase> {
        self.store.get(id)
    }

    pub fn get_by_code(&self, case_code: &str) -> Option<EmergencyCase> {
        self.store.get_by_code(case_code)
    }

    pub fn list_all(&self) -> Vec<EmergencyCase> {
        self.store.list_all()
    }

    pub fn list_active(&self) -> Vec<EmergencyCase> {
        self.store.list_active()
    }

    pub fn case_updates(&self, case_code: &str) -> Vec<CaseUpdate> {
        self.store.updates_for(case_code)
    }

    /// Mark a case resolved out of band, with an audit entry and a status
    /// text to the reporter.
    pub fn resolve_case(&self, case_code: &str, notes: Option<&str>) -> Option<EmergencyCase> {
        let case = self.store.get_by_code(case_code)?;
        let resolved = self.store.update(case.id, state::set_status(CaseStatus::Resolved))?;

        let message = match notes {
            Some(notes) => format!("Case resolved. {notes}"),
            None => "Case resolved.".to_string(),
        };
        self.store.append_update(NewCaseUpdate::new(
            case_code,
            UpdateKind::FollowUp,
            StageName::FollowUp,
            message,
        ));
        self.try_send(&resolved.phone_number, &notify::status_update(&resolved), case_code);

        tracing::info!(case_code = %case_code, "Case resolved externally");
        Some(resolved)
    }

    /// Manual status correction. Bypasses the transition graph on purpose.
    pub fn update_status(&self, case_code: &str, status: CaseStatus) -> Option<EmergencyCase> {
        let case = self.store.get_by_code(case_code)?;
        tracing::info!(
            case_code = %case_code,
            from = case.status.as_str(),
            to = status.as_str(),
            "Manual status override"
        );
        self.store.update(case.id, state::set_status(status))
    }

    /// Compose and record an elapsed-time progress reminder; texted to the
    /// reporter in degraded mode.
    pub fn progress_reminder(&self, case_code: &str) -> Option<String> {
        let case = self.store.get_by_code(case_code)?;
        let message = follow_up::progress_reminder(&case, chrono::Utc::now());

        self.store.append_update(NewCaseUpdate::new(
            case_code,
            UpdateKind::FollowUp,
            StageName::FollowUp,
            message.clone(),
        ));
        if case.degraded_mode {
            self.try_send(&case.phone_number, &message, case_code);
        }
        Some(message)
    }

    /// Alert an emergency contact about a registered case.
    pub fn send_contact_digest(&self, case_code: &str, contact_number: &str) -> bool {
        let Some(case) = self.store.get_by_code(case_code) else {
            return false;
        };
        self.try_send(contact_number, &notify::contact_digest(&case), case_code);
        true
    }

    pub fn metrics(&self) -> DashboardMetrics {
        metrics::compute(
            &self.store.list_all(),
            self.directory.facilities.capacity_summary(),
        )
    }

    fn try_send(&self, phone_number: &str, message: &str, case_code: &str) {
        if let Err(e) = self.sms.send_text(phone_number, message) {
            tracing::warn!(case_code = %case_code, error = %e, "SMS dispatch failed");
        }
    }
}
