//! Triage stage: classify the report and set the case priority.

use crate::intelligence::{Classifier, TriageAssessment};
use crate::models::{CasePatch, CaseStatus, EmergencyCase, TriageResult};

use super::StageOutcome;

pub fn run(classifier: &dyn Classifier, case: &EmergencyCase) -> StageOutcome {
    match classifier.classify(&case.description, case.category, case.urgency) {
        Ok(verdict) => {
            let message = format!(
                "Triage complete: {} priority (confidence {:.0}%). {}",
                verdict.priority.as_str(),
                f64::from(verdict.confidence) * 100.0,
                verdict.assessment
            );
            let urdu = format!("ٹرائیج مکمل۔ ترجیح: {}", verdict.priority.as_str());
            StageOutcome::completed(patch_from(&verdict, true), message)
                .with_urdu(case.language, urdu)
        }
        Err(e) => {
            tracing::warn!(
                case_code = %case.case_code,
                error = %e,
                "Classifier unavailable, applying conservative triage"
            );
            let verdict = TriageAssessment::conservative(case.category, case.urgency);
            let message = format!(
                "Automated triage is unavailable. Your case is queued at medium priority \
                 for manual review. For immediate help call {}.",
                case.category.helpline()
            );
            // Reported category/urgency stand; only the triage result changes.
            StageOutcome::fallback(patch_from(&verdict, false), message, e.to_string())
        }
    }
}

fn patch_from(verdict: &TriageAssessment, reclassify: bool) -> CasePatch {
    CasePatch {
        status: Some(CaseStatus::Triaged),
        category: reclassify.then_some(verdict.category),
        urgency: reclassify.then_some(verdict.urgency),
        triage: Some(TriageResult {
            priority: verdict.priority,
            assessment: verdict.assessment.clone(),
            confidence: verdict.confidence,
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::{FailingClassifier, MockClassifier};
    use crate::models::{EmergencyCategory, Language, Priority, UrgencyLevel};
    use chrono::Utc;
    use uuid::Uuid;

    fn case() -> EmergencyCase {
        let now = Utc::now();
        EmergencyCase {
            id: Uuid::new_v4(),
            case_code: "C-2026-0100".into(),
            category: EmergencyCategory::Medical,
            description: "Unconscious person, not breathing".into(),
            location: "Karachi".into(),
            coordinates: None,
            phone_number: "+923001234567".into(),
            urgency: UrgencyLevel::Critical,
            status: CaseStatus::Submitted,
            triage: None,
            assigned_service: None,
            booking: None,
            language: Language::En,
            degraded_mode: false,
            created_at: now,
            updated_at: now,
            triaged_at: None,
            assigned_at: None,
            booked_at: None,
            resolved_at: None,
        }
    }

    #[test]
    fn successful_classification_sets_triage_and_reclassifies() {
        let classifier = MockClassifier::returning(TriageAssessment {
            category: EmergencyCategory::Medical,
            urgency: UrgencyLevel::Critical,
            priority: Priority::Critical,
            assessment: "Cardiac arrest indicators.".into(),
            confidence: 0.95,
        });

        let outcome = run(&classifier, &case());
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.patch.status, Some(CaseStatus::Triaged));
        assert_eq!(
            outcome.patch.triage.as_ref().unwrap().priority,
            Priority::Critical
        );
        assert_eq!(outcome.patch.category, Some(EmergencyCategory::Medical));
        assert!(outcome.message.contains("critical priority"));
    }

    #[test]
    fn classifier_failure_falls_back_to_medium() {
        let outcome = run(&FailingClassifier, &case());
        assert!(outcome.is_fallback());
        assert_eq!(outcome.patch.status, Some(CaseStatus::Triaged));
        let triage = outcome.patch.triage.as_ref().unwrap();
        assert_eq!(triage.priority, Priority::Medium);
        assert_eq!(triage.confidence, 0.5);
        // Reported category stands, no reclassification on fallback.
        assert!(outcome.patch.category.is_none());
        assert!(outcome.message.contains("1122"));
    }

    #[test]
    fn urdu_cases_carry_a_secondary_rendering() {
        let classifier = MockClassifier::returning(TriageAssessment {
            category: EmergencyCategory::Medical,
            urgency: UrgencyLevel::Critical,
            priority: Priority::Critical,
            assessment: "Cardiac arrest indicators.".into(),
            confidence: 0.95,
        });
        let mut c = case();
        c.language = Language::Ur;

        let outcome = run(&classifier, &c);
        let secondary = outcome.message_secondary.as_deref().unwrap();
        assert!(secondary.contains("critical"));

        c.language = Language::En;
        assert!(run(&classifier, &c).message_secondary.is_none());
    }
}
