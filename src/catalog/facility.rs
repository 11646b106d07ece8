//! Medical facility catalog, ingested from an OSM-derived hospital feed
//! enriched with bed and ventilator counts.

use serde::{Deserialize, Serialize};

use super::source::{Row, TabularSource};
use super::{Catalog, Scored};
use crate::geo::Coordinates;
use crate::selection::Candidate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalFacility {
    pub id: String,
    pub osm_id: Option<String>,
    pub name: String,
    /// `None` when the feed's lat/long cells fail to parse; such records
    /// stay reachable through text search but never through distance search.
    pub coords: Option<Coordinates>,
    pub amenity: Option<String>,
    pub speciality: Option<String>,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub beds: Option<u32>,
    pub beds_available: Option<u32>,
    pub ventilators: Option<u32>,
    pub operator_type: Option<String>,
}

impl MedicalFacility {
    /// Typed parse of one feed row. Rows without a name or coordinate cells
    /// are rejected outright.
    fn from_row(row: &Row<'_>) -> Option<Self> {
        let name = row.get("name")?.to_string();
        let lat_cell = row.get("lat")?;
        let lng_cell = row.get("long")?;

        let coords = match (lat_cell.parse::<f64>(), lng_cell.parse::<f64>()) {
            (Ok(lat), Ok(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        };

        let osm_id = row.get("osm_id").map(str::to_string);
        Some(Self {
            id: format!("hosp_{}", osm_id.as_deref().unwrap_or(&name.to_lowercase().replace(' ', "_"))),
            osm_id,
            name,
            coords,
            amenity: row.get("amenity").map(str::to_string),
            speciality: row.get("speciality").map(str::to_string),
            address: row.get("addr_full").map(str::to_string),
            contact_number: row.get("contact_number").map(str::to_string),
            beds: row.parse("beds"),
            beds_available: row.parse("beds_available"),
            ventilators: row.parse("ventilators_available"),
            operator_type: row.get("operator_type").map(str::to_string),
        })
    }

    fn matches_keyword(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.speciality
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(&needle))
            || self
                .amenity
                .as_deref()
                .is_some_and(|a| a.to_lowercase().contains(&needle))
            || self.name.to_lowercase().contains(&needle)
    }
}

impl Candidate for MedicalFacility {
    fn kind(&self) -> crate::models::ServiceKind {
        crate::models::ServiceKind::MedicalFacility
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn contact(&self) -> Option<&str> {
        self.contact_number.as_deref()
    }

    fn address_label(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn beds_available(&self) -> Option<u32> {
        self.beds_available
    }

    fn ventilators(&self) -> Option<u32> {
        self.ventilators
    }
}

/// Facility aggregate capacity, for the operations dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct CapacitySummary {
    pub total_beds: u32,
    pub available_beds: u32,
    pub total_ventilators: u32,
    /// Occupied share of all reported beds, 0–100.
    pub utilization_pct: f64,
}

pub struct FacilityCatalog {
    inner: Catalog<MedicalFacility>,
}

impl FacilityCatalog {
    pub fn new(source: Box<dyn TabularSource>) -> Self {
        Self {
            inner: Catalog::new("facilities", move || {
                let table = source.fetch()?;
                Ok(table.rows().filter_map(|r| MedicalFacility::from_row(&r)).collect())
            }),
        }
    }

    /// Catalog over pre-built records, bypassing the feed. Test seam.
    pub fn from_records(records: Vec<MedicalFacility>) -> Self {
        Self {
            inner: Catalog::new("facilities", move || Ok(records.clone())),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Nearest facilities within `max_distance_km`, nearest first.
    pub fn find_nearest(
        &self,
        origin: Coordinates,
        max_results: usize,
        max_distance_km: f64,
    ) -> Vec<Scored<MedicalFacility>> {
        self.inner
            .find(Some(origin), |_| true, max_results, max_distance_km, |f| f.coords)
    }

    /// Specialty/keyword match over speciality, amenity, and name; ranked
    /// by proximity when an origin is known.
    pub fn find_by_specialty(
        &self,
        specialty: &str,
        origin: Option<Coordinates>,
        max_results: usize,
    ) -> Vec<Scored<MedicalFacility>> {
        self.inner
            .find_ranked(origin, |f| f.matches_keyword(specialty), max_results, |f| f.coords)
    }

    /// Name/address substring match.
    pub fn find_by_name(
        &self,
        query: &str,
        origin: Option<Coordinates>,
        max_results: usize,
    ) -> Vec<Scored<MedicalFacility>> {
        let needle = query.to_lowercase();
        self.inner.find_ranked(
            origin,
            |f| {
                f.name.to_lowercase().contains(&needle)
                    || f.address
                        .as_deref()
                        .is_some_and(|a| a.to_lowercase().contains(&needle))
            },
            max_results,
            |f| f.coords,
        )
    }

    pub fn capacity_summary(&self) -> CapacitySummary {
        let records = self.inner.records();
        let total_beds: u32 = records.iter().filter_map(|f| f.beds).sum();
        let available_beds: u32 = records.iter().filter_map(|f| f.beds_available).sum();
        let total_ventilators: u32 = records.iter().filter_map(|f| f.ventilators).sum();
        let utilization_pct = if total_beds > 0 {
            f64::from(total_beds - available_beds.min(total_beds)) / f64::from(total_beds) * 100.0
        } else {
            0.0
        };

        CapacitySummary {
            total_beds,
            available_beds,
            total_ventilators,
            utilization_pct,
        }
    }
}
