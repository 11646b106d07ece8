//! Guidance stage: match the case to a concrete service.
//!
//! With coordinates the match is a proximity search over the category's
//! catalog; without them the free-text location label is scanned for a
//! known city and the search degrades to a text match. A case that matches
//! nothing still gets the national fallback service, never no assignment.
//! The classifier is consulted for a service-type label over the candidate
//! pool; when it is unavailable the static category routing stands.

use crate::catalog::ServiceDirectory;
use crate::config;
use crate::geo;
use crate::intelligence::Classifier;
use crate::models::{
    AssignedService, CasePatch, CaseStatus, EmergencyCase, Priority, ServiceKind,
};
use crate::selection::{select_best, to_assignment, Candidate};

use super::StageOutcome;

pub fn run(
    classifier: &dyn Classifier,
    directory: &ServiceDirectory,
    case: &EmergencyCase,
) -> StageOutcome {
    let kind = case.category.service_kind();
    let priority = case.priority();

    match match_service(directory, case, kind, priority) {
        Some((mut assignment, candidate_names)) => {
            match classifier.recommend_service(case, &candidate_names) {
                Ok(rec) => {
                    tracing::debug!(
                        case_code = %case.case_code,
                        service_type = %rec.service_type,
                        reasoning = %rec.reasoning,
                        "Service recommendation applied"
                    );
                    assignment.service_type = rec.service_type;
                }
                Err(e) => {
                    tracing::warn!(
                        case_code = %case.case_code,
                        error = %e,
                        "Service recommendation unavailable, keeping category routing"
                    );
                }
            }

            let distance = assignment
                .distance_km
                .map(geo::format_distance)
                .unwrap_or_else(|| "distance unknown".to_string());
            let message = format!(
                "{} assigned: {} ({}). Contact: {}. {}",
                kind.label(),
                assignment.service_name,
                distance,
                assignment.contact_number,
                assignment.address
            );
            let urdu = format!("سروس تفویض: {}", assignment.service_name);
            StageOutcome::completed(patch_from(assignment), message)
                .with_urdu(case.language, urdu)
        }
        None => {
            tracing::warn!(
                case_code = %case.case_code,
                kind = kind.as_str(),
                "No service candidates, assigning national fallback"
            );
            let helpline = case.category.helpline();
            let message = format!(
                "No {} could be matched near your location. Call the emergency helpline \
                 {} for immediate assistance.",
                kind.label().to_lowercase(),
                helpline
            );
            let urdu = format!(
                "عمومی ایمرجنسی سروسز کو تفویض۔ فوری مدد کے لیے {helpline} کال کریں۔"
            );
            StageOutcome::fallback(
                patch_from(fallback_service(kind)),
                message,
                "no candidates in range",
            )
            .with_urdu(case.language, urdu)
        }
    }
}

fn patch_from(assignment: AssignedService) -> CasePatch {
    CasePatch {
        status: Some(CaseStatus::Assigned),
        assigned_service: Some(assignment),
        ..Default::default()
    }
}

/// National rescue number, used when every catalog search comes back empty.
fn fallback_service(kind: ServiceKind) -> AssignedService {
    AssignedService {
        service_id: "emergency_fallback".into(),
        service_name: format!("Emergency Services ({})", config::RESCUE_HELPLINE),
        service_type: kind.as_str().into(),
        contact_number: config::RESCUE_HELPLINE.into(),
        address: "Nationwide".into(),
        distance_km: Some(0.0),
    }
}

/// The matched assignment plus the display names of every candidate that
/// was in range, for the recommendation prompt.
fn match_service(
    directory: &ServiceDirectory,
    case: &EmergencyCase,
    kind: ServiceKind,
    priority: Priority,
) -> Option<(AssignedService, Vec<String>)> {
    let origin = case.coordinates;
    let helpline = case.category.helpline();
    let max = config::GUIDANCE_MAX_CANDIDATES;
    let max_km = config::GUIDANCE_MAX_DISTANCE_KM;

    match kind {
        ServiceKind::MedicalFacility => {
            let candidates = match origin {
                Some(from) => directory.facilities.find_nearest(from, max, max_km),
                None => text_search_facilities(directory, &case.location, max),
            };
            pick(&candidates, priority, helpline)
        }
        ServiceKind::LawEnforcement => {
            let crime_type = detect_crime_type(&case.description);
            let candidates = match origin {
                Some(from) => directory.police.find_nearest(from, max, max_km, crime_type),
                None => match detect_city(&case.location) {
                    Some(city) => directory.police.find_by_city(city, max),
                    None => Vec::new(),
                },
            };
            pick(&candidates, priority, helpline)
        }
        ServiceKind::ReliefShelter => {
            let candidates = match origin {
                Some(from) => {
                    directory
                        .relief
                        .find_nearest(from, max, max_km, Some(case.category.as_str()))
                }
                None => match detect_city(&case.location) {
                    Some(city) => directory.relief.find_by_city(city, max),
                    // Last resort: any open shelter with real capacity.
                    None => directory
                        .relief
                        .find_by_capacity(config::RELIEF_FALLBACK_MIN_CAPACITY, max),
                },
            };
            pick(&candidates, priority, helpline)
        }
    }
}

fn pick<C: Candidate>(
    candidates: &[crate::catalog::Scored<C>],
    priority: Priority,
    helpline: &str,
) -> Option<(AssignedService, Vec<String>)> {
    let selected = select_best(candidates, priority)?;
    let names = candidates
        .iter()
        .map(|s| s.record.display_name().to_string())
        .collect();
    Some((to_assignment(selected, helpline), names))
}

fn text_search_facilities(
    directory: &ServiceDirectory,
    location: &str,
    max: usize,
) -> Vec<crate::catalog::Scored<crate::catalog::MedicalFacility>> {
    if let Some(city) = detect_city(location) {
        let hits = directory.facilities.find_by_name(city, None, max);
        if !hits.is_empty() {
            return hits;
        }
    }
    directory.facilities.find_by_specialty("hospital", None, max)
}

/// Scan a free-text location label for a known city name.
fn detect_city(location: &str) -> Option<&'static str> {
    let lowered = location.to_lowercase();
    config::KNOWN_CITIES
        .iter()
        .find(|city| lowered.contains(*city))
        .copied()
}

/// Scan the report text for a crime keyword that maps to post
/// specializations. `None` means every active post is a candidate.
fn detect_crime_type(description: &str) -> Option<&'static str> {
    const KEYWORDS: &[&str] = &[
        "theft",
        "burglary",
        "robbery",
        "violence",
        "fraud",
        "cybercrime",
        "domestic",
    ];
    let lowered = description.to_lowercase();
    KEYWORDS.iter().find(|k| lowered.contains(*k)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::source::StaticSource;
    use crate::catalog::{FacilityCatalog, PoliceCatalog, ReliefCatalog};
    use crate::geo::Coordinates;
    use crate::intelligence::{
        FailingClassifier, MockClassifier, ServiceRecommendation, TriageAssessment,
    };
    use crate::models::{EmergencyCategory, Language, TriageResult, UrgencyLevel};
    use chrono::Utc;
    use uuid::Uuid;

    const FACILITIES: &str = "\
osm_id,name,lat,long,amenity,speciality,addr_full,contact_number,beds,beds_available,ventilators_available
1,Near General Hospital Karachi,24.8700,67.0100,hospital,emergency,Shahrah-e-Faisal,021-1111111,400,20,0
2,Mid Cardiac Hospital,24.8900,67.0400,hospital,cardiology,Stadium Road,021-2222222,300,15,8
3,Far District Hospital,24.9400,67.0700,hospital,general,University Road,021-3333333,200,30,0
";

    const RELIEF: &str = "\
record_id,city,area,incident_type,shelter_name,shelter_capacity,shelter_lat,shelter_long,camp_status,relief_contact_phone,rescue_hotline
r1,Karachi,Korangi,Flood,Korangi Relief Camp,500,24.8300,67.1300,Open,0311-1111111,1122
";

    fn directory() -> ServiceDirectory {
        ServiceDirectory::new(
            FacilityCatalog::new(Box::new(StaticSource::from_csv(FACILITIES))),
            PoliceCatalog::builtin(),
            ReliefCatalog::new(Box::new(StaticSource::from_csv(RELIEF))),
        )
    }

    fn case(category: EmergencyCategory, priority: Priority) -> EmergencyCase {
        let now = Utc::now();
        EmergencyCase {
            id: Uuid::new_v4(),
            case_code: "C-2026-0200".into(),
            category,
            description: "help needed".into(),
            location: "Karachi".into(),
            coordinates: Some(Coordinates::new(24.8607, 67.0011)),
            phone_number: "+923001234567".into(),
            urgency: UrgencyLevel::High,
            status: CaseStatus::Triaged,
            triage: Some(TriageResult {
                priority,
                assessment: "assessed".into(),
                confidence: 0.9,
            }),
            assigned_service: None,
            booking: None,
            language: Language::En,
            degraded_mode: false,
            created_at: now,
            updated_at: now,
            triaged_at: Some(now),
            assigned_at: None,
            booked_at: None,
            resolved_at: None,
        }
    }

    #[test]
    fn critical_medical_prefers_ventilated_over_nearer() {
        let dir = directory();
        let c = case(EmergencyCategory::Medical, Priority::Critical);
        let outcome = run(&FailingClassifier, &dir, &c);

        assert!(!outcome.is_fallback());
        let assigned = outcome.patch.assigned_service.as_ref().unwrap();
        assert_eq!(assigned.service_name, "Mid Cardiac Hospital");
        assert_eq!(outcome.patch.status, Some(CaseStatus::Assigned));
    }

    #[test]
    fn high_medical_takes_nearest_with_beds() {
        let dir = directory();
        let c = case(EmergencyCategory::Medical, Priority::High);
        let outcome = run(&FailingClassifier, &dir, &c);
        let assigned = outcome.patch.assigned_service.as_ref().unwrap();
        assert_eq!(assigned.service_name, "Near General Hospital Karachi");
    }

    #[test]
    fn crime_routes_to_police_catalog() {
        let dir = directory();
        let mut c = case(EmergencyCategory::Crime, Priority::High);
        c.description = "armed robbery in progress".into();
        let outcome = run(&FailingClassifier, &dir, &c);
        let assigned = outcome.patch.assigned_service.as_ref().unwrap();
        // Recommendation unavailable, so the static routing label stands.
        assert_eq!(assigned.service_type, "law_enforcement");
        assert!(assigned.service_name.contains("Police"));
    }

    #[test]
    fn recommendation_overrides_the_service_type_label() {
        let dir = directory();
        let mut classifier = MockClassifier::returning(TriageAssessment::conservative(
            EmergencyCategory::Medical,
            UrgencyLevel::High,
        ));
        classifier.recommendation = ServiceRecommendation {
            service_type: "Cardiac Emergency".into(),
            reasoning: "Ventilator support likely needed.".into(),
        };

        let c = case(EmergencyCategory::Medical, Priority::Critical);
        let outcome = run(&classifier, &dir, &c);
        let assigned = outcome.patch.assigned_service.as_ref().unwrap();
        assert_eq!(assigned.service_type, "Cardiac Emergency");
        assert_eq!(assigned.service_name, "Mid Cardiac Hospital");
    }

    #[test]
    fn flood_without_coordinates_uses_city_detection() {
        let dir = directory();
        let mut c = case(EmergencyCategory::Flood, Priority::High);
        c.coordinates = None;
        c.location = "near Korangi, Karachi".into();
        let outcome = run(&FailingClassifier, &dir, &c);
        let assigned = outcome.patch.assigned_service.as_ref().unwrap();
        assert_eq!(assigned.service_name, "Korangi Relief Camp");
        assert!(assigned.distance_km.is_none());
    }

    #[test]
    fn empty_catalogs_assign_national_fallback() {
        let dir = ServiceDirectory::new(
            FacilityCatalog::new(Box::new(StaticSource::from_csv(""))),
            PoliceCatalog::from_records(Vec::new()),
            ReliefCatalog::new(Box::new(StaticSource::from_csv(""))),
        );
        let c = case(EmergencyCategory::Medical, Priority::Critical);
        let outcome = run(&FailingClassifier, &dir, &c);

        assert!(outcome.is_fallback());
        let assigned = outcome.patch.assigned_service.as_ref().unwrap();
        assert_eq!(assigned.service_id, "emergency_fallback");
        assert_eq!(assigned.contact_number, "1122");
        // The fallback still advances the case.
        assert_eq!(outcome.patch.status, Some(CaseStatus::Assigned));
    }

    #[test]
    fn urdu_cases_carry_a_secondary_rendering_on_both_paths() {
        let dir = directory();
        let mut c = case(EmergencyCategory::Medical, Priority::High);
        c.language = Language::Ur;
        let outcome = run(&FailingClassifier, &dir, &c);
        let secondary = outcome.message_secondary.as_deref().unwrap();
        assert!(secondary.contains("Near General Hospital Karachi"));

        let empty = ServiceDirectory::new(
            FacilityCatalog::new(Box::new(StaticSource::from_csv(""))),
            PoliceCatalog::from_records(Vec::new()),
            ReliefCatalog::new(Box::new(StaticSource::from_csv(""))),
        );
        let outcome = run(&FailingClassifier, &empty, &c);
        assert!(outcome.is_fallback());
        assert!(outcome.message_secondary.as_deref().unwrap().contains("1122"));
    }

    #[test]
    fn city_detection_is_case_insensitive() {
        assert_eq!(detect_city("Gulberg, LAHORE"), Some("lahore"));
        assert_eq!(detect_city("somewhere remote"), None);
    }

    #[test]
    fn crime_keyword_detection() {
        assert_eq!(detect_crime_type("my car was stolen, theft!"), Some("theft"));
        assert_eq!(detect_crime_type("something happened"), None);
    }
}
