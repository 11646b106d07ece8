//! Outbound text messaging.
//!
//! Delivery is behind a trait so the core never knows whether a real SMS
//! provider is wired in. Message bodies are built by pure functions and
//! tested as such; delivery failures are logged by callers and never block
//! pipeline progress.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{BookingDetails, CaseStatus, EmergencyCase};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("SMS provider rejected the message: {0}")]
    Rejected(String),

    #[error("SMS provider unreachable: {0}")]
    Unreachable(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReceipt {
    pub message_id: String,
    pub sent_at: chrono::DateTime<Utc>,
}

pub trait SmsGateway: Send + Sync {
    fn send_text(&self, phone_number: &str, message: &str) -> Result<DeliveryReceipt, NotifyError>;
}

/// Logs the message instead of delivering it. The production gateway slot
/// until a provider is integrated.
pub struct SimulatedGateway;

impl SmsGateway for SimulatedGateway {
    fn send_text(&self, phone_number: &str, message: &str) -> Result<DeliveryReceipt, NotifyError> {
        tracing::info!(
            phone = %phone_number,
            chars = message.len(),
            "Simulated SMS dispatch"
        );
        tracing::debug!(body = %message, "Simulated SMS body");
        Ok(DeliveryReceipt {
            message_id: Uuid::new_v4().to_string(),
            sent_at: Utc::now(),
        })
    }
}

// ---------------------------------------------------------------------------
// Message builders
// ---------------------------------------------------------------------------

/// Digest sent to an emergency contact when a case is registered.
pub fn contact_digest(case: &EmergencyCase) -> String {
    format!(
        "EMERGENCY ALERT: A {} emergency has been reported by {} at {}. \
         Case {}. Assigned service: {} ({}). This is an automated alert.",
        case.category.as_str().replace('_', " "),
        case.phone_number,
        if case.location.is_empty() {
            "an unknown location"
        } else {
            &case.location
        },
        case.case_code,
        case.service_name(),
        case.service_contact()
    )
}

/// Short status text for the reporter.
pub fn status_update(case: &EmergencyCase) -> String {
    let line = match case.status {
        CaseStatus::Submitted => "Your report has been received and is being assessed.",
        CaseStatus::Triaged => "Your report has been assessed and is being matched to a service.",
        CaseStatus::Assigned => "A service has been assigned to your case.",
        CaseStatus::InProgress => "Your case is in progress. Help is on the way.",
        CaseStatus::Resolved => "Your case has been resolved. Stay safe.",
        CaseStatus::Cancelled => "Your case has been cancelled.",
    };
    format!(
        "Case {}: {} For assistance call {} ({}).",
        case.case_code,
        line,
        case.service_name(),
        case.service_contact()
    )
}

/// Appointment confirmation for the reporter.
pub fn appointment_confirmation(case: &EmergencyCase, booking: &BookingDetails) -> String {
    format!(
        "Case {}: appointment confirmed at {}. Time: {}. Confirmation code: {}. {}",
        case.case_code,
        case.service_name(),
        booking.appointment_time,
        booking.confirmation_code,
        booking.instructions
    )
}
