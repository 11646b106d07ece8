//! Operations dashboard metrics, computed on demand from the case store
//! and the facility catalog. Nothing here is incremental; the case volume
//! this serves is small enough to recount every time.

use serde::Serialize;

use crate::catalog::facility::CapacitySummary;
use crate::models::{EmergencyCase, Priority};

#[derive(Debug, Clone, Serialize)]
pub struct TriageMetrics {
    pub total_cases: usize,
    pub critical: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GuidanceMetrics {
    pub assigned: usize,
    /// Assignments that came from a real catalog match, not the national
    /// fallback service.
    pub matched: usize,
    pub average_distance_km: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingMetrics {
    pub booked: usize,
    /// Immediate emergency slots.
    pub emergency: usize,
    pub confirmed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowUpMetrics {
    pub resolved: usize,
    pub resolution_rate_pct: f64,
    pub average_response_minutes: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub triage: TriageMetrics,
    pub guidance: GuidanceMetrics,
    pub booking: BookingMetrics,
    pub follow_up: FollowUpMetrics,
    pub capacity: CapacitySummary,
}

pub fn compute(cases: &[EmergencyCase], capacity: CapacitySummary) -> DashboardMetrics {
    let triaged: Vec<_> = cases.iter().filter_map(|c| c.triage.as_ref()).collect();
    let triage = TriageMetrics {
        total_cases: cases.len(),
        critical: triaged.iter().filter(|t| t.priority == Priority::Critical).count(),
        high: triaged.iter().filter(|t| t.priority == Priority::High).count(),
    };

    let assignments: Vec<_> = cases
        .iter()
        .filter_map(|c| c.assigned_service.as_ref())
        .collect();
    let distances: Vec<f64> = assignments
        .iter()
        .filter(|a| a.service_id != "emergency_fallback")
        .filter_map(|a| a.distance_km)
        .collect();
    let guidance = GuidanceMetrics {
        assigned: assignments.len(),
        matched: assignments
            .iter()
            .filter(|a| a.service_id != "emergency_fallback")
            .count(),
        average_distance_km: if distances.is_empty() {
            None
        } else {
            Some(distances.iter().sum::<f64>() / distances.len() as f64)
        },
    };

    let bookings: Vec<_> = cases.iter().filter_map(|c| c.booking.as_ref()).collect();
    let booking = BookingMetrics {
        booked: bookings.len(),
        emergency: bookings
            .iter()
            .filter(|b| b.appointment_time.contains("Immediate"))
            .count(),
        confirmed: bookings
            .iter()
            .filter(|b| !b.confirmation_code.is_empty())
            .count(),
    };

    let response_minutes: Vec<f64> = cases
        .iter()
        .filter_map(|c| c.resolved_at.map(|r| (r - c.created_at).num_seconds() as f64 / 60.0))
        .collect();
    let resolved = response_minutes.len();
    let follow_up = FollowUpMetrics {
        resolved,
        resolution_rate_pct: if cases.is_empty() {
            0.0
        } else {
            resolved as f64 / cases.len() as f64 * 100.0
        },
        average_response_minutes: if response_minutes.is_empty() {
            None
        } else {
            Some(response_minutes.iter().sum::<f64>() / resolved as f64)
        },
    };

    DashboardMetrics {
        triage,
        guidance,
        booking,
        follow_up,
        capacity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;
    use crate::models::{
        AssignedService, BookingDetails, CaseStatus, EmergencyCategory, Language,
        TriageResult, UrgencyLevel,
    };
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn capacity() -> CapacitySummary {
        CapacitySummary {
            total_beds: 1000,
            available_beds: 100,
            total_ventilators: 40,
            utilization_pct: 90.0,
        }
    }

    fn case(n: u32) -> EmergencyCase {
        let now = Utc::now();
        EmergencyCase {
            id: Uuid::new_v4(),
            case_code: format!("C-2026-{n:04}"),
            category: EmergencyCategory::Medical,
            description: "test".into(),
            location: "Karachi".into(),
            coordinates: Some(Coordinates::new(24.86, 67.01)),
            phone_number: "+923001234567".into(),
            urgency: UrgencyLevel::High,
            status: CaseStatus::InProgress,
            triage: Some(TriageResult {
                priority: Priority::High,
                assessment: "assessed".into(),
                confidence: 0.9,
            }),
            assigned_service: Some(AssignedService {
                service_id: "hosp_1".into(),
                service_name: "Hospital".into(),
                service_type: "medical_facility".into(),
                contact_number: "021".into(),
                address: "Rd".into(),
                distance_km: Some(4.0),
            }),
            booking: Some(BookingDetails {
                appointment_time: "Today 14:00 (within 1 hour)".into(),
                confirmation_code: "X".into(),
                instructions: "".into(),
            }),
            language: Language::En,
            degraded_mode: false,
            created_at: now,
            updated_at: now,
            triaged_at: Some(now),
            assigned_at: Some(now),
            booked_at: Some(now),
            resolved_at: None,
        }
    }

    #[test]
    fn empty_store_yields_zeroes() {
        let m = compute(&[], capacity());
        assert_eq!(m.triage.total_cases, 0);
        assert_eq!(m.follow_up.resolution_rate_pct, 0.0);
        assert!(m.guidance.average_distance_km.is_none());
        assert!(m.follow_up.average_response_minutes.is_none());
    }

    #[test]
    fn counts_priorities_and_assignments() {
        let mut a = case(1);
        a.triage.as_mut().unwrap().priority = Priority::Critical;
        a.booking.as_mut().unwrap().appointment_time =
            "Emergency - Immediate (within 15 minutes, by 12:00)".into();
        let mut b = case(2);
        b.assigned_service.as_mut().unwrap().service_id = "emergency_fallback".into();
        b.assigned_service.as_mut().unwrap().distance_km = Some(0.0);
        let c = case(3);

        let m = compute(&[a, b, c], capacity());
        assert_eq!(m.triage.total_cases, 3);
        assert_eq!(m.triage.critical, 1);
        assert_eq!(m.triage.high, 2);
        assert_eq!(m.guidance.assigned, 3);
        assert_eq!(m.guidance.matched, 2);
        // Fallback distance excluded from the average.
        assert_eq!(m.guidance.average_distance_km, Some(4.0));
        assert_eq!(m.booking.emergency, 1);
        assert_eq!(m.booking.confirmed, 3);
    }

    #[test]
    fn resolution_rate_and_response_time() {
        let mut a = case(1);
        a.status = CaseStatus::Resolved;
        a.created_at = Utc::now() - Duration::minutes(30);
        a.resolved_at = Some(Utc::now());
        let b = case(2);

        let m = compute(&[a, b], capacity());
        assert_eq!(m.follow_up.resolved, 1);
        assert_eq!(m.follow_up.resolution_rate_pct, 50.0);
        let avg = m.follow_up.average_response_minutes.unwrap();
        assert!((avg - 30.0).abs() < 1.0);
    }
}
