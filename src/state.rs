//! Case status transitions.
//!
//! The pipeline only ever moves a case forward; `cancelled` is reachable
//! from any non-terminal status as an out-of-band escape. Operator status
//! corrections bypass the graph through [`set_status`], which is a
//! deliberately looser contract than [`advance`].

use chrono::Utc;

use crate::models::{CasePatch, CaseStatus, EmergencyCase};

/// Statuses legally reachable from `from` through the pipeline.
pub fn allowed_transitions(from: CaseStatus) -> &'static [CaseStatus] {
    match from {
        CaseStatus::Submitted => &[CaseStatus::Triaged, CaseStatus::Cancelled],
        CaseStatus::Triaged => &[
            CaseStatus::Assigned,
            CaseStatus::Resolved,
            CaseStatus::Cancelled,
        ],
        CaseStatus::Assigned => &[
            CaseStatus::InProgress,
            CaseStatus::Resolved,
            CaseStatus::Cancelled,
        ],
        CaseStatus::InProgress => &[CaseStatus::Resolved, CaseStatus::Cancelled],
        CaseStatus::Resolved | CaseStatus::Cancelled => &[],
    }
}

pub fn can_transition(from: CaseStatus, to: CaseStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Apply a stage payload to a case, enforcing the transition graph.
///
/// Returns the patch to persist, with the completion timestamp for the new
/// status stamped in. Returns `None` without error when the case is already
/// terminal or the requested status is not reachable; such calls only log.
/// A patch that carries no status change passes through untouched.
pub fn advance(case: &EmergencyCase, mut patch: CasePatch) -> Option<CasePatch> {
    if case.status.is_terminal() {
        tracing::debug!(
            case_code = %case.case_code,
            status = case.status.as_str(),
            "Ignoring advance on terminal case"
        );
        return None;
    }

    if let Some(to) = patch.status {
        if !can_transition(case.status, to) {
            tracing::warn!(
                case_code = %case.case_code,
                from = case.status.as_str(),
                to = to.as_str(),
                "Ignoring illegal status transition"
            );
            return None;
        }
        let now = Utc::now();
        match to {
            CaseStatus::Triaged => patch.triaged_at = Some(now),
            CaseStatus::Assigned => patch.assigned_at = Some(now),
            CaseStatus::InProgress => patch.booked_at = Some(now),
            CaseStatus::Resolved => patch.resolved_at = Some(now),
            CaseStatus::Submitted | CaseStatus::Cancelled => {}
        }
    }

    Some(patch)
}

/// Direct status override for external correction requests. No graph check;
/// the resolution timestamp is still stamped when the target is terminal
/// resolution.
pub fn set_status(to: CaseStatus) -> CasePatch {
    let mut patch = CasePatch {
        status: Some(to),
        ..Default::default()
    };
    if to == CaseStatus::Resolved {
        patch.resolved_at = Some(Utc::now());
    }
    patch
}
