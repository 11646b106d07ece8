//! Gemini HTTP client.
//!
//! Blocking client; stages run on blocking threads, so no async plumbing
//! leaks into the pipeline. Responses are requested as JSON and validated
//! field by field, with unparsable enum values collapsing back to what the
//! reporter declared.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::{RawAssessment, RawRecommendation};
use super::{Classifier, IntelligenceError, ServiceRecommendation, TriageAssessment};
use crate::models::{EmergencyCase, EmergencyCategory, Priority, UrgencyLevel};

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, IntelligenceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| IntelligenceError::Http(e.to_string()))?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    /// Client configured from `GEMINI_API_KEY` / `GEMINI_MODEL`.
    pub fn from_env() -> Result<Self, IntelligenceError> {
        let api_key =
            std::env::var("GEMINI_API_KEY").map_err(|_| IntelligenceError::NotConfigured)?;
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(&api_key, &model, 30)
    }

    fn generate(&self, prompt: &str) -> Result<String, IntelligenceError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 512,
            },
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                IntelligenceError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                IntelligenceError::Http(format!("Request timed out after {}s", self.timeout_secs))
            } else {
                IntelligenceError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(IntelligenceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| IntelligenceError::ResponseParsing(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| IntelligenceError::ResponseParsing("empty candidate list".into()))
    }
}

impl Classifier for GeminiClient {
    fn classify(
        &self,
        description: &str,
        reported_category: EmergencyCategory,
        reported_urgency: UrgencyLevel,
    ) -> Result<TriageAssessment, IntelligenceError> {
        let prompt = classify_prompt(description, reported_category, reported_urgency);
        let text = self.generate(&prompt)?;
        parse_assessment(&text, reported_category, reported_urgency)
    }

    fn recommend_service(
        &self,
        case: &EmergencyCase,
        candidates: &[String],
    ) -> Result<ServiceRecommendation, IntelligenceError> {
        let prompt = recommend_prompt(case, candidates);
        let text = self.generate(&prompt)?;
        parse_recommendation(&text)
    }

    fn summarize_status(&self, case: &EmergencyCase) -> Result<String, IntelligenceError> {
        let prompt = summary_prompt(case);
        let text = self.generate(&prompt)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(IntelligenceError::ResponseParsing("empty summary".into()));
        }
        Ok(trimmed.to_string())
    }
}

fn classify_prompt(
    description: &str,
    category: EmergencyCategory,
    urgency: UrgencyLevel,
) -> String {
    format!(
        "You are an emergency dispatch triage assistant. Assess this report.\n\
         Report: {description}\n\
         Reporter-declared category: {}\n\
         Reporter-declared urgency: {}\n\
         Respond with only a JSON object:\n\
         {{\"category\": one of [medical, crime, fire, flood, earthquake, urban, public_safety, unknown],\n\
         \"urgency\": one of [critical, high, medium, unknown],\n\
         \"priority\": one of [critical, high, medium, low],\n\
         \"assessment\": one sentence for the dispatcher,\n\
         \"confidence\": number between 0 and 1}}",
        category.as_str(),
        urgency.as_str()
    )
}

fn recommend_prompt(case: &EmergencyCase, candidates: &[String]) -> String {
    format!(
        "You are an emergency dispatch guidance assistant. Recommend the most \
         appropriate service type for this case.\n\
         Category: {}\n\
         Priority: {}\n\
         Assessment: {}\n\
         Candidate services: {}\n\
         Respond with only a JSON object:\n\
         {{\"serviceType\": short label for the kind of service to engage,\n\
         \"reasoning\": one sentence for the dispatcher}}",
        case.category.as_str(),
        case.priority().as_str(),
        case.triage
            .as_ref()
            .map_or("not assessed", |t| t.assessment.as_str()),
        candidates.join("; ")
    )
}

fn summary_prompt(case: &EmergencyCase) -> String {
    format!(
        "Write one short reassuring paragraph (max 3 sentences) updating the reporter \
         of emergency case {} (category {}, status {}). Assigned service: {} ({}). \
         Plain language, no markdown.",
        case.case_code,
        case.category.as_str(),
        case.status.as_str(),
        case.service_name(),
        case.service_contact()
    )
}

/// Parse the model's JSON verdict. The payload sometimes arrives wrapped in
/// a markdown fence; strip it before parsing. Enum fields that do not parse
/// fall back to the reported values.
fn parse_assessment(
    text: &str,
    reported_category: EmergencyCategory,
    reported_urgency: UrgencyLevel,
) -> Result<TriageAssessment, IntelligenceError> {
    let json = strip_fence(text);
    let raw: RawAssessment = serde_json::from_str(json)
        .map_err(|e| IntelligenceError::ResponseParsing(e.to_string()))?;

    let category = raw
        .category
        .as_deref()
        .and_then(|s| EmergencyCategory::from_str(s).ok())
        .unwrap_or(reported_category);
    let urgency = raw
        .urgency
        .as_deref()
        .and_then(|s| UrgencyLevel::from_str(s).ok())
        .unwrap_or(reported_urgency);
    let priority = raw
        .priority
        .as_deref()
        .and_then(|s| Priority::from_str(s).ok())
        .unwrap_or(Priority::Medium);

    Ok(TriageAssessment {
        category,
        urgency,
        priority,
        assessment: raw
            .assessment
            .unwrap_or_else(|| "Assessment completed.".to_string()),
        confidence: raw.confidence.unwrap_or(0.5).clamp(0.0, 1.0),
    })
}

/// Parse the recommendation JSON. A missing or empty service type is an
/// error; the guidance stage then keeps its static category routing.
fn parse_recommendation(text: &str) -> Result<ServiceRecommendation, IntelligenceError> {
    let raw: RawRecommendation = serde_json::from_str(strip_fence(text))
        .map_err(|e| IntelligenceError::ResponseParsing(e.to_string()))?;

    let service_type = raw
        .service_type
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| IntelligenceError::ResponseParsing("missing serviceType".into()))?;

    Ok(ServiceRecommendation {
        service_type,
        reasoning: raw.reasoning.unwrap_or_default(),
    })
}

fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json_verdict() {
        let text = r#"{"category":"medical","urgency":"critical","priority":"critical","assessment":"Cardiac symptoms, dispatch now.","confidence":0.92}"#;
        let verdict =
            parse_assessment(text, EmergencyCategory::Unknown, UrgencyLevel::Unknown).unwrap();
        assert_eq!(verdict.category, EmergencyCategory::Medical);
        assert_eq!(verdict.priority, Priority::Critical);
        assert!((verdict.confidence - 0.92).abs() < 1e-6);
    }

    #[test]
    fn parses_fenced_json_verdict() {
        let text = "```json\n{\"category\":\"fire\",\"priority\":\"high\"}\n```";
        let verdict =
            parse_assessment(text, EmergencyCategory::Unknown, UrgencyLevel::High).unwrap();
        assert_eq!(verdict.category, EmergencyCategory::Fire);
        assert_eq!(verdict.urgency, UrgencyLevel::High);
        assert_eq!(verdict.priority, Priority::High);
    }

    #[test]
    fn unknown_enum_values_fall_back_to_reported() {
        let text = r#"{"category":"volcano","urgency":"apocalyptic","priority":"top"}"#;
        let verdict =
            parse_assessment(text, EmergencyCategory::Flood, UrgencyLevel::High).unwrap();
        assert_eq!(verdict.category, EmergencyCategory::Flood);
        assert_eq!(verdict.urgency, UrgencyLevel::High);
        assert_eq!(verdict.priority, Priority::Medium);
    }

    #[test]
    fn non_json_payload_errors() {
        assert!(
            parse_assessment("on my way", EmergencyCategory::Unknown, UrgencyLevel::Unknown)
                .is_err()
        );
    }

    #[test]
    fn parses_fenced_recommendation() {
        let text =
            "```json\n{\"serviceType\":\"Cardiac Emergency\",\"reasoning\":\"Chest pain with ventilator need.\"}\n```";
        let rec = parse_recommendation(text).unwrap();
        assert_eq!(rec.service_type, "Cardiac Emergency");
        assert!(rec.reasoning.contains("Chest pain"));
    }

    #[test]
    fn recommendation_without_service_type_errors() {
        assert!(parse_recommendation(r#"{"reasoning":"no label"}"#).is_err());
        assert!(parse_recommendation(r#"{"serviceType":"  "}"#).is_err());
    }

    #[test]
    fn confidence_is_clamped() {
        let text = r#"{"confidence": 7.5}"#;
        let verdict =
            parse_assessment(text, EmergencyCategory::Urban, UrgencyLevel::Medium).unwrap();
        assert_eq!(verdict.confidence, 1.0);
    }
}
