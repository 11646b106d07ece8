//! Follow-up stage: close out or summarize.
//!
//! Some categories are fully served the moment a service is engaged; the
//! stage resolves those outright. Everything else gets a status summary,
//! from the classifier when it cooperates and from the local narrative
//! otherwise.

use chrono::{DateTime, Utc};

use crate::intelligence::Classifier;
use crate::models::{CasePatch, CaseStatus, EmergencyCase, EmergencyCategory, Priority};

use super::{narrative, StageOutcome};

/// Categories whose cases are complete once a service is engaged: criminal
/// and public-safety incidents (the post takes over), and low-priority
/// municipal issues. These skip booking entirely.
pub fn resolves_after_guidance(case: &EmergencyCase) -> bool {
    match case.category {
        EmergencyCategory::Crime | EmergencyCategory::PublicSafety => true,
        EmergencyCategory::Urban => case.priority() == Priority::Low,
        _ => false,
    }
}

pub fn run(classifier: &dyn Classifier, case: &EmergencyCase) -> StageOutcome {
    if resolves_after_guidance(case) {
        let message = format!(
            "{} has been engaged and your report is now closed. Reference {} if you \
             need to follow up; contact: {}.",
            case.service_name(),
            case.case_code,
            case.service_contact()
        );
        let patch = CasePatch {
            status: Some(CaseStatus::Resolved),
            ..Default::default()
        };
        return with_secondary(StageOutcome::completed(patch, message), case);
    }

    match classifier.summarize_status(case) {
        Ok(summary) => with_secondary(StageOutcome::completed(CasePatch::default(), summary), case),
        Err(e) => {
            tracing::warn!(
                case_code = %case.case_code,
                error = %e,
                "Summary generation unavailable, using local narrative"
            );
            with_secondary(
                StageOutcome::fallback(
                    CasePatch::default(),
                    narrative::status_narrative(case),
                    e.to_string(),
                ),
                case,
            )
        }
    }
}

/// Elapsed-time-aware reminder for a case still in flight.
pub fn progress_reminder(case: &EmergencyCase, now: DateTime<Utc>) -> String {
    let elapsed_minutes = (now - case.created_at).num_minutes().max(0);
    let elapsed = if elapsed_minutes < 60 {
        format!("{elapsed_minutes} minutes")
    } else {
        format!("{} hours", elapsed_minutes / 60)
    };
    format!(
        "Case {} update: {} since your report. Current status: {}. {} remains your \
         point of contact ({}).",
        case.case_code,
        elapsed,
        case.status.as_str().replace('_', " "),
        case.service_name(),
        case.service_contact()
    )
}

fn with_secondary(outcome: StageOutcome, case: &EmergencyCase) -> StageOutcome {
    let helpline = case.category.helpline();
    outcome.with_urdu(case.language, format!("مزید مدد کے لیے {helpline} پر کال کریں"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::{FailingClassifier, MockClassifier, TriageAssessment};
    use crate::models::{AssignedService, Language, TriageResult, UrgencyLevel};
    use uuid::Uuid;

    fn case(category: EmergencyCategory, priority: Priority) -> EmergencyCase {
        let now = Utc::now();
        EmergencyCase {
            id: Uuid::new_v4(),
            case_code: "C-2026-0500".into(),
            category,
            description: "test".into(),
            location: "Karachi".into(),
            coordinates: None,
            phone_number: "+923001234567".into(),
            urgency: UrgencyLevel::High,
            status: CaseStatus::Assigned,
            triage: Some(TriageResult {
                priority,
                assessment: "assessed".into(),
                confidence: 0.9,
            }),
            assigned_service: Some(AssignedService {
                service_id: "police_001".into(),
                service_name: "Karachi City Police Station".into(),
                service_type: "law_enforcement".into(),
                contact_number: "021-99261000".into(),
                address: "City Center".into(),
                distance_km: Some(2.0),
            }),
            booking: None,
            language: Language::En,
            degraded_mode: false,
            created_at: now,
            updated_at: now,
            triaged_at: Some(now),
            assigned_at: Some(now),
            booked_at: None,
            resolved_at: None,
        }
    }

    fn mock() -> MockClassifier {
        MockClassifier::returning(TriageAssessment::conservative(
            EmergencyCategory::Medical,
            UrgencyLevel::High,
        ))
    }

    #[test]
    fn crime_resolves_after_guidance() {
        assert!(resolves_after_guidance(&case(EmergencyCategory::Crime, Priority::High)));
        assert!(resolves_after_guidance(&case(
            EmergencyCategory::PublicSafety,
            Priority::Critical
        )));
    }

    #[test]
    fn urban_resolves_only_at_low_priority() {
        assert!(resolves_after_guidance(&case(EmergencyCategory::Urban, Priority::Low)));
        assert!(!resolves_after_guidance(&case(EmergencyCategory::Urban, Priority::High)));
    }

    #[test]
    fn medical_never_resolves_after_guidance() {
        assert!(!resolves_after_guidance(&case(
            EmergencyCategory::Medical,
            Priority::Low
        )));
    }

    #[test]
    fn crime_follow_up_closes_the_case() {
        let outcome = run(&mock(), &case(EmergencyCategory::Crime, Priority::High));
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.patch.status, Some(CaseStatus::Resolved));
        assert!(outcome.message.contains("closed"));
    }

    #[test]
    fn summary_comes_from_classifier_when_available() {
        let outcome = run(&mock(), &case(EmergencyCategory::Medical, Priority::High));
        assert!(!outcome.is_fallback());
        assert!(outcome.patch.status.is_none());
        assert_eq!(outcome.message, "Your case is being handled.");
    }

    #[test]
    fn summary_failure_falls_back_to_narrative() {
        let c = case(EmergencyCategory::Medical, Priority::High);
        let outcome = run(&FailingClassifier, &c);
        assert!(outcome.is_fallback());
        assert!(outcome.message.contains("Karachi City Police Station"));
        assert!(outcome.patch.status.is_none());
    }

    #[test]
    fn urdu_cases_carry_a_secondary_rendering() {
        let mut c = case(EmergencyCategory::Medical, Priority::High);
        c.language = Language::Ur;
        let outcome = run(&mock(), &c);
        assert!(outcome.message_secondary.is_some());
    }

    #[test]
    fn reminder_reports_elapsed_time() {
        let mut c = case(EmergencyCategory::Medical, Priority::High);
        c.created_at = Utc::now() - chrono::Duration::minutes(90);
        let text = progress_reminder(&c, Utc::now());
        assert!(text.contains("1 hours"));
        assert!(text.contains("C-2026-0500"));
    }
}
