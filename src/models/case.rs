use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinates;
use crate::models::enums::{CaseStatus, EmergencyCategory, Language, Priority, UrgencyLevel};

/// The central case record. Created by intake, mutated exclusively by stage
/// transitions inside the orchestrator or by explicit external requests,
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyCase {
    pub id: Uuid,
    /// Human-facing code, `C-<year>-<4-digit sequence>`. Unique, never reused.
    pub case_code: String,
    pub category: EmergencyCategory,
    pub description: String,
    /// Free-text location label from the reporter.
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub phone_number: String,
    pub urgency: UrgencyLevel,
    pub status: CaseStatus,
    pub triage: Option<TriageResult>,
    pub assigned_service: Option<AssignedService>,
    pub booking: Option<BookingDetails>,
    pub language: Language,
    /// SMS-only operation for low-connectivity reporters.
    pub degraded_mode: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub triaged_at: Option<DateTime<Utc>>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub booked_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl EmergencyCase {
    /// Effective triage priority; medium until triage has run.
    pub fn priority(&self) -> Priority {
        self.triage.as_ref().map(|t| t.priority).unwrap_or(Priority::Medium)
    }

    /// Contact number of the assigned service, or the category helpline.
    pub fn service_contact(&self) -> &str {
        self.assigned_service
            .as_ref()
            .map(|s| s.contact_number.as_str())
            .unwrap_or_else(|| self.category.helpline())
    }

    /// Display name of the assigned service.
    pub fn service_name(&self) -> &str {
        self.assigned_service
            .as_ref()
            .map(|s| s.service_name.as_str())
            .unwrap_or("Emergency Services")
    }
}

/// Outcome of the triage stage, embedded in the case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageResult {
    pub priority: Priority,
    pub assessment: String,
    pub confidence: f32,
}

/// Outcome of the guidance stage: the matched service, normalized across
/// the three catalogs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedService {
    pub service_id: String,
    pub service_name: String,
    pub service_type: String,
    pub contact_number: String,
    pub address: String,
    /// Unset when the match came from a text search or a fallback.
    pub distance_km: Option<f64>,
}

/// Outcome of the booking stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetails {
    pub appointment_time: String,
    pub confirmation_code: String,
    pub instructions: String,
}

/// Intake payload for a new case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCase {
    pub category: EmergencyCategory,
    pub description: String,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub phone_number: String,
    pub urgency: UrgencyLevel,
    pub language: Language,
    pub degraded_mode: bool,
}

/// Partial update applied by `CaseStore::update`. Unset fields are left
/// untouched; `updated_at` is stamped by the store.
#[derive(Debug, Clone, Default)]
pub struct CasePatch {
    pub status: Option<CaseStatus>,
    pub category: Option<EmergencyCategory>,
    pub urgency: Option<UrgencyLevel>,
    pub triage: Option<TriageResult>,
    pub assigned_service: Option<AssignedService>,
    pub booking: Option<BookingDetails>,
    pub triaged_at: Option<DateTime<Utc>>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub booked_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_case() -> EmergencyCase {
        let now = Utc::now();
        EmergencyCase {
            id: Uuid::new_v4(),
            case_code: "C-2026-0001".into(),
            category: EmergencyCategory::Medical,
            description: "Chest pain and shortness of breath".into(),
            location: "Clifton, Karachi".into(),
            coordinates: Some(Coordinates::new(24.8138, 67.0299)),
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
    fn priority_defaults_to_medium_before_triage() {
        let case = sample_case();
        assert_eq!(case.priority(), Priority::Medium);
    }

    #[test]
    fn priority_follows_triage_result() {
        let mut case = sample_case();
        case.triage = Some(TriageResult {
            priority: Priority::Critical,
            assessment: "Life-threatening".into(),
            confidence: 0.93,
        });
        assert_eq!(case.priority(), Priority::Critical);
    }

    #[test]
    fn service_contact_falls_back_to_helpline() {
        let mut case = sample_case();
        assert_eq!(case.service_contact(), "1122");
        case.category = EmergencyCategory::Crime;
        assert_eq!(case.service_contact(), "15");

        case.assigned_service = Some(AssignedService {
            service_id: "hosp_1".into(),
            service_name: "Aga Khan University Hospital".into(),
            service_type: "Medical Emergency".into(),
            contact_number: "021-111-911-911".into(),
            address: "Stadium Road".into(),
            distance_km: Some(3.4),
        });
        assert_eq!(case.service_contact(), "021-111-911-911");
    }

    #[test]
    fn case_serializes_with_nested_results() {
        let mut case = sample_case();
        case.booking = Some(BookingDetails {
            appointment_time: "Emergency - Immediate".into(),
            confirmation_code: "C-2026-0001-123456-AB12".into(),
            instructions: "Go directly to Emergency Department".into(),
        });
        let json = serde_json::to_string(&case).unwrap();
        assert!(json.contains("\"case_code\":\"C-2026-0001\""));
        assert!(json.contains("confirmation_code"));
    }
}
