//! Locally composed status narratives, used when the classifier cannot
//! produce a summary and for category-specific follow-up wording.

use crate::models::{EmergencyCase, EmergencyCategory};

/// Human-readable status narrative for the reporter.
pub fn status_narrative(case: &EmergencyCase) -> String {
    let service = case.service_name();
    let contact = case.service_contact();
    let appointment = case
        .booking
        .as_ref()
        .map(|b| b.appointment_time.as_str())
        .unwrap_or("to be confirmed");

    match case.category {
        EmergencyCategory::Medical => format!(
            "Your medical case is with {service}. Appointment: {appointment}. \
             If symptoms worsen before then, call {contact} immediately."
        ),
        EmergencyCategory::Fire => format!(
            "Fire response is coordinated through {service}. Keep clear of the affected \
             area and await instructions. Emergency contact: {contact}."
        ),
        EmergencyCategory::Flood => format!(
            "Flood relief is arranged through {service}. Move to higher ground and follow \
             the evacuation guidance. Shelter contact: {contact}. Arrival window: {appointment}."
        ),
        EmergencyCategory::Earthquake => format!(
            "Earthquake relief is arranged through {service}. Stay away from damaged \
             structures. Shelter contact: {contact}. Arrival window: {appointment}."
        ),
        _ => format!(
            "Your case is being handled by {service}. Appointment: {appointment}. \
             For any urgent development call {contact}."
        ),
    }
}
