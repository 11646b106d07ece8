use crate::models::{CasePatch, Language};

/// How a stage concluded. Fallbacks are first-class results, not errors;
/// the reason is logged and quoted in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Completed,
    Fallback(String),
}

/// What a stage hands back to the orchestrator: the case mutation to
/// persist, the audit message for the reporter, and how it went.
#[derive(Debug)]
pub struct StageOutcome {
    pub patch: CasePatch,
    pub message: String,
    pub message_secondary: Option<String>,
    pub disposition: Disposition,
}

impl StageOutcome {
    pub fn completed(patch: CasePatch, message: impl Into<String>) -> Self {
        Self {
            patch,
            message: message.into(),
            message_secondary: None,
            disposition: Disposition::Completed,
        }
    }

    pub fn fallback(
        patch: CasePatch,
        message: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            patch,
            message: message.into(),
            message_secondary: None,
            disposition: Disposition::Fallback(reason.into()),
        }
    }

    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.message_secondary = Some(secondary.into());
        self
    }

    /// Attach `line` as the secondary rendering for Urdu-language cases;
    /// a no-op otherwise.
    pub fn with_urdu(self, language: Language, line: String) -> Self {
        match language {
            Language::Ur => self.with_secondary(line),
            Language::En => self,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.disposition, Disposition::Fallback(_))
    }
}
