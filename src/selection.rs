//! Service selection policy.
//!
//! Candidates arrive nearest-first from a catalog query; the policy picks
//! one according to the case priority. Capacity rules narrow the pool, but
//! an empty narrowed pool falls back to the full candidate list so a case
//! always gets an assignment when any candidate exists.

use crate::catalog::Scored;
use crate::models::{AssignedService, Priority, ServiceKind};

/// What a selectable service record must expose. Capacity accessors default
/// to "unknown", which the policy treats as eligible.
pub trait Candidate {
    fn kind(&self) -> ServiceKind;
    fn id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn contact(&self) -> Option<&str>;
    fn address_label(&self) -> Option<&str>;

    fn beds_available(&self) -> Option<u32> {
        None
    }

    fn ventilators(&self) -> Option<u32> {
        None
    }

    fn is_operational(&self) -> bool {
        true
    }

    fn is_open(&self) -> bool {
        true
    }

    fn capacity(&self) -> Option<u32> {
        None
    }
}

fn is_eligible<C: Candidate>(candidate: &C, priority: Priority) -> bool {
    match candidate.kind() {
        // Bed availability gates non-critical medical cases; a critical case
        // takes the nearest facility regardless.
        ServiceKind::MedicalFacility => {
            priority == Priority::Critical
                || candidate.beds_available().map_or(true, |beds| beds > 0)
        }
        ServiceKind::LawEnforcement => candidate.is_operational(),
        ServiceKind::ReliefShelter => candidate.is_open(),
    }
}

/// Pick the best candidate for the given priority.
///
/// Non-critical: nearest eligible candidate. Critical medical: nearest
/// facility with ventilators on hand, then nearest eligible. Critical
/// relief: largest-capacity open shelter. When the eligibility rules
/// empty the pool, the nearest raw candidate wins.
pub fn select_best<'a, C: Candidate>(
    candidates: &'a [Scored<C>],
    priority: Priority,
) -> Option<&'a Scored<C>> {
    let first = candidates.first()?;

    let pool: Vec<&Scored<C>> = candidates
        .iter()
        .filter(|s| is_eligible(&s.record, priority))
        .collect();
    if pool.is_empty() {
        return Some(first);
    }

    if priority == Priority::Critical {
        match first.record.kind() {
            ServiceKind::MedicalFacility => {
                if let Some(ventilated) = pool
                    .iter()
                    .find(|s| s.record.ventilators().map_or(false, |v| v > 0))
                    .copied()
                {
                    return Some(ventilated);
                }
            }
            ServiceKind::ReliefShelter => {
                return pool
                    .into_iter()
                    .max_by_key(|s| s.record.capacity().unwrap_or(0));
            }
            ServiceKind::LawEnforcement => {}
        }
    }

    pool.into_iter().next()
}

/// Materialize a selection into the case's assignment record. Missing
/// contact details fall back to the category helpline supplied by the
/// caller.
pub fn to_assignment<C: Candidate>(
    scored: &Scored<C>,
    fallback_contact: &str,
) -> AssignedService {
    let record = &scored.record;
    AssignedService {
        service_id: record.id().to_string(),
        service_name: record.display_name().to_string(),
        service_type: record.kind().as_str().to_string(),
        contact_number: record
            .contact()
            .unwrap_or(fallback_contact)
            .to_string(),
        address: record
            .address_label()
            .unwrap_or("Address not available")
            .to_string(),
        distance_km: scored.distance_km,
    }
}
