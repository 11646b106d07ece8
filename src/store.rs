//! Case persistence seam.
//!
//! The core depends only on the operation shapes below, not on any storage
//! technology. `MemStore` is the behavioral reference: a process-local map,
//! sufficient for the orchestration core and for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::models::{
    CasePatch, CaseStatus, CaseUpdate, EmergencyCase, NewCase, NewCaseUpdate,
};

pub trait CaseStore: Send + Sync {
    /// Create a case with a fresh id and case code, status `submitted`.
    fn create_case(&self, new_case: NewCase) -> EmergencyCase;
    fn get(&self, id: Uuid) -> Option<EmergencyCase>;
    fn get_by_code(&self, case_code: &str) -> Option<EmergencyCase>;
    /// Merge a patch into the case and stamp `updated_at`. Returns the
    /// updated record, or `None` when the id is unknown.
    fn update(&self, id: Uuid, patch: CasePatch) -> Option<EmergencyCase>;
    /// All cases, newest first.
    fn list_all(&self) -> Vec<EmergencyCase>;
    /// Non-terminal cases, newest first.
    fn list_active(&self) -> Vec<EmergencyCase>;
    /// Append an immutable audit entry.
    fn append_update(&self, update: NewCaseUpdate) -> CaseUpdate;
    /// Audit entries for one case, newest first.
    fn updates_for(&self, case_code: &str) -> Vec<CaseUpdate>;
}

/// In-memory store. Case codes come from a monotonic per-process counter
/// and are never reused.
#[derive(Default)]
pub struct MemStore {
    cases: RwLock<HashMap<Uuid, EmergencyCase>>,
    updates: RwLock<Vec<CaseUpdate>>,
    case_counter: AtomicU32,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_case_code(&self) -> String {
        let seq = self.case_counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("C-{}-{:04}", Utc::now().year(), seq)
    }
}

impl CaseStore for MemStore {
    fn create_case(&self, new_case: NewCase) -> EmergencyCase {
        let now = Utc::now();
        let case = EmergencyCase {
            id: Uuid::new_v4(),
            case_code: self.next_case_code(),
            category: new_case.category,
            description: new_case.description,
            location: new_case.location,
            coordinates: new_case.coordinates,
            phone_number: new_case.phone_number,
            urgency: new_case.urgency,
            status: CaseStatus::Submitted,
            triage: None,
            assigned_service: None,
            booking: None,
            language: new_case.language,
            degraded_mode: new_case.degraded_mode,
            created_at: now,
            updated_at: now,
            triaged_at: None,
            assigned_at: None,
            booked_at: None,
            resolved_at: None,
        };

        self.cases
            .write()
            .expect("case map poisoned")
            .insert(case.id, case.clone());
        case
    }

    fn get(&self, id: Uuid) -> Option<EmergencyCase> {
        self.cases.read().expect("case map poisoned").get(&id).cloned()
    }

    fn get_by_code(&self, case_code: &str) -> Option<EmergencyCase> {
        self.cases
            .read()
            .expect("case map poisoned")
            .values()
            .find(|c| c.case_code == case_code)
            .cloned()
    }

    fn update(&self, id: Uuid, patch: CasePatch) -> Option<EmergencyCase> {
        let mut cases = self.cases.write().expect("case map poisoned");
        let case = cases.get_mut(&id)?;

        if let Some(status) = patch.status {
            case.status = status;
        }
        if let Some(category) = patch.category {
            case.category = category;
        }
        if let Some(urgency) = patch.urgency {
            case.urgency = urgency;
        }
        if let Some(triage) = patch.triage {
            case.triage = Some(triage);
        }
        if let Some(service) = patch.assigned_service {
            case.assigned_service = Some(service);
        }
        if let Some(booking) = patch.booking {
            case.booking = Some(booking);
        }
        if let Some(at) = patch.triaged_at {
            case.triaged_at = Some(at);
        }
        if let Some(at) = patch.assigned_at {
            case.assigned_at = Some(at);
        }
        if let Some(at) = patch.booked_at {
            case.booked_at = Some(at);
        }
        if let Some(at) = patch.resolved_at {
            case.resolved_at = Some(at);
        }
        case.updated_at = Utc::now();

        Some(case.clone())
    }

    fn list_all(&self) -> Vec<EmergencyCase> {
        let mut cases: Vec<_> = self
            .cases
            .read()
            .expect("case map poisoned")
            .values()
            .cloned()
            .collect();
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        cases
    }

    fn list_active(&self) -> Vec<EmergencyCase> {
        let mut cases: Vec<_> = self
            .cases
            .read()
            .expect("case map poisoned")
            .values()
            .filter(|c| !c.status.is_terminal())
            .cloned()
            .collect();
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        cases
    }

    fn append_update(&self, update: NewCaseUpdate) -> CaseUpdate {
        let entry = CaseUpdate {
            id: Uuid::new_v4(),
            case_code: update.case_code,
            kind: update.kind,
            message: update.message,
            message_secondary: update.message_secondary,
            stage: update.stage,
            created_at: Utc::now(),
        };
        self.updates
            .write()
            .expect("update log poisoned")
            .push(entry.clone());
        entry
    }

    fn updates_for(&self, case_code: &str) -> Vec<CaseUpdate> {
        let mut entries: Vec<_> = self
            .updates
            .read()
            .expect("update log poisoned")
            .iter()
            .filter(|u| u.case_code == case_code)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries
    }
}
