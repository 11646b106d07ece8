//! Runs the four stages for one case, in order, against the latest record.
//!
//! Each stage re-reads the case before acting because the previous stage
//! has mutated it. Persistence, audit updates, and outbound texts all
//! happen here so the stages stay side-effect free.

use std::sync::Arc;

use uuid::Uuid;

use crate::catalog::ServiceDirectory;
use crate::intelligence::Classifier;
use crate::models::{EmergencyCase, NewCaseUpdate, Priority, StageName, UpdateKind};
use crate::notify::{self, SmsGateway};
use crate::state;
use crate::store::CaseStore;

use super::{booking, follow_up, guidance, triage, Disposition, StageOutcome};

pub struct Orchestrator {
    store: Arc<dyn CaseStore>,
    classifier: Arc<dyn Classifier>,
    directory: Arc<ServiceDirectory>,
    sms: Arc<dyn SmsGateway>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn CaseStore>,
        classifier: Arc<dyn Classifier>,
        directory: Arc<ServiceDirectory>,
        sms: Arc<dyn SmsGateway>,
    ) -> Self {
        Self {
            store,
            classifier,
            directory,
            sms,
        }
    }

    pub fn store(&self) -> &Arc<dyn CaseStore> {
        &self.store
    }

    /// Full pipeline for one case. Never fails: every stage either
    /// completes or falls back, and the case always leaves `submitted`.
    pub fn run_pipeline(&self, case_id: Uuid) {
        let Some(case) = self.store.get(case_id) else {
            tracing::warn!(%case_id, "Pipeline started for unknown case");
            return;
        };
        tracing::info!(case_code = %case.case_code, "Pipeline started");

        let outcome = triage::run(self.classifier.as_ref(), &case);
        self.apply(&case, outcome, UpdateKind::Triage, StageName::Triage);

        let Some(case) = self.store.get(case_id) else { return };
        let outcome = guidance::run(self.classifier.as_ref(), &self.directory, &case);
        self.apply(&case, outcome, UpdateKind::Guidance, StageName::Guidance);

        let Some(case) = self.store.get(case_id) else { return };
        if follow_up::resolves_after_guidance(&case) {
            tracing::info!(
                case_code = %case.case_code,
                category = case.category.as_str(),
                "Booking skipped, category resolves after guidance"
            );
        } else {
            let outcome = booking::run(&case);
            let updated = self.apply(&case, outcome, UpdateKind::Booking, StageName::Booking);
            if let Some(updated) = updated {
                self.notify_booking(&updated);
            }
        }

        let Some(case) = self.store.get(case_id) else { return };
        self.run_follow_up(&case);
        tracing::info!(case_code = %case.case_code, "Pipeline finished");
    }

    /// Follow-up stage alone; also invoked by the deferred scheduler.
    /// A case that reached a terminal status in the interim gets nothing,
    /// not even an audit update.
    pub fn run_follow_up(&self, case: &EmergencyCase) {
        if case.status.is_terminal() {
            tracing::debug!(
                case_code = %case.case_code,
                status = case.status.as_str(),
                "Follow-up skipped on terminal case"
            );
            return;
        }
        let outcome = follow_up::run(self.classifier.as_ref(), case);
        let updated = self.apply(case, outcome, UpdateKind::FollowUp, StageName::FollowUp);
        if let Some(updated) = updated {
            self.notify_status(&updated);
        }
    }

    /// Persist a stage outcome and append its audit update. Returns the
    /// case as stored after the mutation.
    fn apply(
        &self,
        case: &EmergencyCase,
        outcome: StageOutcome,
        kind: UpdateKind,
        stage: StageName,
    ) -> Option<EmergencyCase> {
        let updated = match state::advance(case, outcome.patch) {
            Some(patch) => self.store.update(case.id, patch),
            None => self.store.get(case.id),
        };

        let update = NewCaseUpdate::new(&case.case_code, kind, stage, outcome.message.clone())
            .with_secondary(outcome.message_secondary.clone());
        self.store.append_update(update);

        match &outcome.disposition {
            Disposition::Completed => tracing::info!(
                case_code = %case.case_code,
                stage = stage.as_str(),
                "Stage completed"
            ),
            Disposition::Fallback(reason) => tracing::warn!(
                case_code = %case.case_code,
                stage = stage.as_str(),
                reason = %reason,
                "Stage completed via fallback"
            ),
        }
        updated
    }

    /// Booking confirmation text, sent only for degraded-mode or critical
    /// cases. Delivery failure is logged and swallowed.
    fn notify_booking(&self, case: &EmergencyCase) {
        if !self.should_text(case) {
            return;
        }
        if let Some(booking) = &case.booking {
            let body = notify::appointment_confirmation(case, booking);
            if let Err(e) = self.sms.send_text(&case.phone_number, &body) {
                tracing::warn!(case_code = %case.case_code, error = %e, "Booking SMS failed");
            }
        }
    }

    fn notify_status(&self, case: &EmergencyCase) {
        if !self.should_text(case) {
            return;
        }
        let body = notify::status_update(case);
        if let Err(e) = self.sms.send_text(&case.phone_number, &body) {
            tracing::warn!(case_code = %case.case_code, error = %e, "Status SMS failed");
        }
    }

    fn should_text(&self, case: &EmergencyCase) -> bool {
        case.degraded_mode || case.priority() == Priority::Critical
    }
}
