//! External classification collaborator.
//!
//! The pipeline never depends on a concrete model API: stages hold a
//! `Box<dyn Classifier>` and treat every error as a signal to fall back
//! locally. The Gemini client is the production implementation; the mocks
//! here exist so pipeline tests can script both outcomes.

pub mod gemini;
pub mod types;

pub use gemini::GeminiClient;
pub use types::{ServiceRecommendation, TriageAssessment};

use thiserror::Error;

use crate::models::{EmergencyCase, EmergencyCategory, UrgencyLevel};

#[derive(Error, Debug)]
pub enum IntelligenceError {
    #[error("Cannot reach classifier endpoint: {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Classifier returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse classifier response: {0}")]
    ResponseParsing(String),

    #[error("Classifier not configured (missing API key)")]
    NotConfigured,
}

/// Report classification, service recommendation, and status
/// summarization.
pub trait Classifier: Send + Sync {
    /// Assess a raw report: category, urgency, priority, rationale.
    fn classify(
        &self,
        description: &str,
        reported_category: EmergencyCategory,
        reported_urgency: UrgencyLevel,
    ) -> Result<TriageAssessment, IntelligenceError>;

    /// Recommend a service-type label for the guidance stage, given the
    /// triaged case and the display names of the candidates in range.
    fn recommend_service(
        &self,
        case: &EmergencyCase,
        candidates: &[String],
    ) -> Result<ServiceRecommendation, IntelligenceError>;

    /// One-paragraph reporter-facing summary of where the case stands.
    fn summarize_status(&self, case: &EmergencyCase) -> Result<String, IntelligenceError>;
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Scripted classifier returning a fixed verdict.
pub struct MockClassifier {
    pub verdict: TriageAssessment,
    pub recommendation: ServiceRecommendation,
    pub summary: String,
}

impl MockClassifier {
    pub fn returning(verdict: TriageAssessment) -> Self {
        Self {
            verdict,
            recommendation: ServiceRecommendation {
                service_type: "Emergency Response".to_string(),
                reasoning: "Scripted recommendation.".to_string(),
            },
            summary: "Your case is being handled.".to_string(),
        }
    }
}

impl Classifier for MockClassifier {
    fn classify(
        &self,
        _description: &str,
        _reported_category: EmergencyCategory,
        _reported_urgency: UrgencyLevel,
    ) -> Result<TriageAssessment, IntelligenceError> {
        Ok(self.verdict.clone())
    }

    fn recommend_service(
        &self,
        _case: &EmergencyCase,
        _candidates: &[String],
    ) -> Result<ServiceRecommendation, IntelligenceError> {
        Ok(self.recommendation.clone())
    }

    fn summarize_status(&self, _case: &EmergencyCase) -> Result<String, IntelligenceError> {
        Ok(self.summary.clone())
    }
}

/// Classifier that always fails, for exercising fallback paths.
pub struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn classify(
        &self,
        _description: &str,
        _reported_category: EmergencyCategory,
        _reported_urgency: UrgencyLevel,
    ) -> Result<TriageAssessment, IntelligenceError> {
        Err(IntelligenceError::Connection("scripted outage".into()))
    }

    fn recommend_service(
        &self,
        _case: &EmergencyCase,
        _candidates: &[String],
    ) -> Result<ServiceRecommendation, IntelligenceError> {
        Err(IntelligenceError::Connection("scripted outage".into()))
    }

    fn summarize_status(&self, _case: &EmergencyCase) -> Result<String, IntelligenceError> {
        Err(IntelligenceError::Connection("scripted outage".into()))
    }
}
