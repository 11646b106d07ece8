use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::enums::{StageName, UpdateKind};

/// Immutable audit-log entry, appended exactly once per stage invocation
/// (fallback paths included). Ordered newest-first for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseUpdate {
    pub id: Uuid,
    pub case_code: String,
    pub kind: UpdateKind,
    pub message: String,
    /// Optional secondary-language rendering (Urdu).
    pub message_secondary: Option<String>,
    pub stage: StageName,
    pub created_at: DateTime<Utc>,
}

/// Payload for appending a new audit entry.
#[derive(Debug, Clone)]
pub struct NewCaseUpdate {
    pub case_code: String,
    pub kind: UpdateKind,
    pub message: String,
    pub message_secondary: Option<String>,
    pub stage: StageName,
}

impl NewCaseUpdate {
    pub fn new(case_code: &str, kind: UpdateKind, stage: StageName, message: String) -> Self {
        Self {
            case_code: case_code.to_string(),
            kind,
            message,
            message_secondary: None,
            stage,
        }
    }

    pub fn with_secondary(mut self, secondary: Option<String>) -> Self {
        self.message_secondary = secondary;
        self
    }
}
