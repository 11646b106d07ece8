use crate::models::ModelError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(EmergencyCategory {
    Medical => "medical",
    Crime => "crime",
    Fire => "fire",
    Flood => "flood",
    Earthquake => "earthquake",
    Urban => "urban",
    PublicSafety => "public_safety",
    Unknown => "unknown",
});

str_enum!(UrgencyLevel {
    Critical => "critical",
    High => "high",
    Medium => "medium",
    Unknown => "unknown",
});

str_enum!(Priority {
    Critical => "critical",
    High => "high",
    Medium => "medium",
    Low => "low",
});

str_enum!(CaseStatus {
    Submitted => "submitted",
    Triaged => "triaged",
    Assigned => "assigned",
    InProgress => "in_progress",
    Resolved => "resolved",
    Cancelled => "cancelled",
});

str_enum!(UpdateKind {
    Triage => "triage",
    Guidance => "guidance",
    Booking => "booking",
    FollowUp => "follow_up",
});

str_enum!(StageName {
    Triage => "triage_agent",
    Guidance => "guidance_agent",
    Booking => "booking_agent",
    FollowUp => "follow_up_agent",
});

str_enum!(Language {
    En => "en",
    Ur => "ur",
});

str_enum!(ServiceKind {
    MedicalFacility => "medical_facility",
    LawEnforcement => "law_enforcement",
    ReliefShelter => "relief_shelter",
});

impl CaseStatus {
    /// Terminal statuses accept no further pipeline transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Cancelled)
    }
}

impl ServiceKind {
    /// Human-facing label used in case updates.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MedicalFacility => "Hospital",
            Self::LawEnforcement => "Police Station",
            Self::ReliefShelter => "Relief Center",
        }
    }
}

impl EmergencyCategory {
    /// Which catalog serves this emergency category.
    pub fn service_kind(&self) -> ServiceKind {
        match self {
            Self::Medical | Self::Urban | Self::Unknown => ServiceKind::MedicalFacility,
            Self::Crime | Self::PublicSafety => ServiceKind::LawEnforcement,
            Self::Fire | Self::Flood | Self::Earthquake => ServiceKind::ReliefShelter,
        }
    }

    /// Helpline quoted in fallback messaging for this category.
    pub fn helpline(&self) -> &'static str {
        match self {
            Self::Crime | Self::PublicSafety => crate::config::POLICE_HELPLINE,
            Self::Fire => crate::config::FIRE_HELPLINE,
            _ => crate::config::RESCUE_HELPLINE,
        }
    }
}
