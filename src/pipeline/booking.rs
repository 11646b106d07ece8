//! Booking stage: appointment descriptor, confirmation code, instructions.
//!
//! Everything here is computed locally from the case record; the only
//! failure mode is the missing-assignment precondition, which produces a
//! fallback booking instead of an error.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::models::{BookingDetails, CasePatch, CaseStatus, EmergencyCase, Priority};

use super::StageOutcome;

pub fn run(case: &EmergencyCase) -> StageOutcome {
    let Some(assigned) = case.assigned_service.as_ref() else {
        // Guidance always assigns at least the fallback service, so this is
        // a contract violation by the caller.
        tracing::warn!(
            case_code = %case.case_code,
            "Booking invoked without an assigned service"
        );
        let booking = BookingDetails {
            appointment_time: "Contact the facility directly".into(),
            confirmation_code: case.case_code.clone(),
            instructions: format!(
                "Call {} to arrange assistance.",
                case.category.helpline()
            ),
        };
        let message = format!(
            "Booking could not be completed automatically. Call {} to arrange \
             assistance. Reference: {}.",
            case.category.helpline(),
            case.case_code
        );
        return StageOutcome::fallback(patch_from(booking), message, "no assigned service")
            .with_urdu(
                case.language,
                "دستی بکنگ درکار۔ اپوائنٹمنٹ کے لیے ہسپتال سے رابطہ کریں۔".to_string(),
            );
    };

    let now = Utc::now();
    let (appointment_time, _target) = appointment_descriptor(case.priority(), now);
    let booking = BookingDetails {
        appointment_time: appointment_time.clone(),
        confirmation_code: confirmation_code(&case.case_code, now),
        instructions: build_instructions(case, &assigned.service_name),
    };
    let message = format!(
        "Appointment booked at {}: {}. Confirmation code {}.",
        assigned.service_name, booking.appointment_time, booking.confirmation_code
    );
    let urdu = format!(
        "اپوائنٹمنٹ بک: {} - {}",
        assigned.service_name, booking.appointment_time
    );
    StageOutcome::completed(patch_from(booking), message).with_urdu(case.language, urdu)
}

fn patch_from(booking: BookingDetails) -> CasePatch {
    CasePatch {
        status: Some(CaseStatus::InProgress),
        booking: Some(booking),
        ..Default::default()
    }
}

/// Appointment descriptor plus the concrete target time it encodes. The
/// descriptor is derived from priority alone.
pub fn appointment_descriptor(priority: Priority, now: DateTime<Utc>) -> (String, DateTime<Utc>) {
    match priority {
        Priority::Critical => {
            let target = now + Duration::minutes(15);
            (
                format!(
                    "Emergency - Immediate (within 15 minutes, by {})",
                    target.format("%H:%M")
                ),
                target,
            )
        }
        Priority::High => {
            let target = now + Duration::hours(1);
            (
                format!("Today {} (within 1 hour)", target.format("%H:%M")),
                target,
            )
        }
        Priority::Medium => {
            let target = now + Duration::hours(4);
            (
                format!("Today {} (within 4 hours)", target.format("%H:%M")),
                target,
            )
        }
        Priority::Low => {
            let target = (now + Duration::days(1))
                .date_naive()
                .and_hms_opt(9, 0, 0)
                .map(|t| t.and_utc())
                .unwrap_or(now + Duration::days(1));
            ("Tomorrow 9:00 AM".to_string(), target)
        }
    }
}

/// `<case-code>-<last 6 digits of unix millis>-<4 random uppercase>`.
pub fn confirmation_code(case_code: &str, now: DateTime<Utc>) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!(
        "{}-{:06}-{}",
        case_code,
        now.timestamp_millis().rem_euclid(1_000_000),
        suffix
    )
}

fn build_instructions(case: &EmergencyCase, service_name: &str) -> String {
    let mut items: Vec<&str> = vec![
        "Keep your case code at hand",
        "Carry identification if possible",
    ];

    items.push(match case.category {
        crate::models::EmergencyCategory::Medical => {
            "Bring current medications and any medical records"
        }
        crate::models::EmergencyCategory::Fire
        | crate::models::EmergencyCategory::Flood
        | crate::models::EmergencyCategory::Earthquake => {
            "Follow the marked evacuation route and stay clear of damaged structures"
        }
        crate::models::EmergencyCategory::Crime
        | crate::models::EmergencyCategory::PublicSafety => {
            "Do not disturb the scene and stay reachable for the responding officers"
        }
        _ => "Stay reachable on the number you reported from",
    });

    items.push(match case.priority() {
        Priority::Critical => "Go directly to the emergency entrance",
        Priority::High => "Report to reception on arrival",
        _ => "Arrive a few minutes before your slot",
    });

    let facility = format!("Facility: {service_name}");
    let mut joined = items.join(". ");
    joined.push_str(". ");
    joined.push_str(&facility);
    joined
}
