use serde::{Deserialize, Serialize};

use crate::models::{EmergencyCategory, Priority, UrgencyLevel};

/// Classifier verdict on a raw report. The reported category and urgency
/// are inputs; the classifier may override both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageAssessment {
    pub category: EmergencyCategory,
    pub urgency: UrgencyLevel,
    pub priority: Priority,
    /// Short operator-facing rationale.
    pub assessment: String,
    /// Classifier self-reported confidence, 0.0 to 1.0.
    pub confidence: f32,
}

impl TriageAssessment {
    /// Conservative verdict used when classification is unavailable: keep
    /// what the reporter said, assume medium priority.
    pub fn conservative(category: EmergencyCategory, urgency: UrgencyLevel) -> Self {
        Self {
            category,
            urgency,
            priority: Priority::Medium,
            assessment: "Automated assessment unavailable. Case queued for manual review."
                .to_string(),
            confidence: 0.5,
        }
    }
}

/// Guidance collaborator verdict: a service-type label for the assignment
/// plus a short dispatcher-facing rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecommendation {
    pub service_type: String,
    pub reasoning: String,
}

/// Raw classifier JSON payload, before enum validation. Fields that fail
/// to parse collapse to the reported values, never to an error.
#[derive(Debug, Deserialize)]
pub(crate) struct RawAssessment {
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub priority: Option<String>,
    pub assessment: Option<String>,
    pub confidence: Option<f32>,
}

/// Raw recommendation payload. The model is asked for camelCase keys.
#[derive(Debug, Deserialize)]
pub(crate) struct RawRecommendation {
    #[serde(rename = "serviceType")]
    pub service_type: Option<String>,
    pub reasoning: Option<String>,
}
