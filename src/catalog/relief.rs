//! Disaster-relief shelter catalog, ingested from the relief resources feed.

use serde::{Deserialize, Serialize};

use super::source::{Row, TabularSource};
use super::{Catalog, Scored};
use crate::geo::Coordinates;
use crate::models::ServiceKind;
use crate::selection::Candidate;

/// Camp occupancy status. Unknown feed values read as `Open`; a shelter is
/// only excluded when the feed positively says it cannot take people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampStatus {
    Open,
    Full,
    Closed,
}

impl CampStatus {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("full") => Self::Full,
            Some(v) if v.eq_ignore_ascii_case("closed") => Self::Closed,
            _ => Self::Open,
        }
    }

    pub fn accepts_people(&self) -> bool {
        *self == Self::Open
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliefShelter {
    pub id: String,
    pub record_id: Option<String>,
    pub city: String,
    pub area: Option<String>,
    /// Incident the shelter is provisioned for (Fire, Flood, ...).
    pub incident_type: Option<String>,
    pub shelter_name: String,
    pub capacity: Option<u32>,
    pub coords: Option<Coordinates>,
    pub camp_status: CampStatus,
    pub evacuation_route: Option<String>,
    pub route_notes: Option<String>,
    pub contact_phone: String,
    pub rescue_hotline: String,
    pub water_stock: Option<u32>,
    pub food_stock: Option<u32>,
    pub medical_kits: Option<u32>,
}

impl ReliefShelter {
    /// Typed parse of one feed row; requires a shelter name, a city, and
    /// coordinate cells.
    fn from_row(row: &Row<'_>) -> Option<Self> {
        let shelter_name = row.get("shelter_name")?.to_string();
        let city = row.get("city")?.to_string();
        let lat_cell = row.get("shelter_lat")?;
        let lng_cell = row.get("shelter_long")?;

        let coords = match (lat_cell.parse::<f64>(), lng_cell.parse::<f64>()) {
            (Ok(lat), Ok(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        };

        let record_id = row.get("record_id").map(str::to_string);
        let rescue_hotline = row
            .get("rescue_hotline")
            .unwrap_or(crate::config::RESCUE_HELPLINE)
            .to_string();
        Some(Self {
            id: format!(
                "relief_{}",
                record_id.as_deref().unwrap_or(&shelter_name.to_lowercase().replace(' ', "_"))
            ),
            record_id,
            city,
            area: row.get("area").map(str::to_string),
            incident_type: row.get("incident_type").map(str::to_string),
            shelter_name,
            capacity: row.parse("shelter_capacity"),
            coords,
            camp_status: CampStatus::parse(row.get("camp_status")),
            evacuation_route: row.get("safe_evacuation_route").map(str::to_string),
            route_notes: row.get("route_notes").map(str::to_string),
            contact_phone: row
                .get("relief_contact_phone")
                .map(str::to_string)
                .unwrap_or_else(|| rescue_hotline.clone()),
            rescue_hotline,
            water_stock: row.parse("water_stock_bottles"),
            food_stock: row.parse("food_stock_packs"),
            medical_kits: row.parse("medical_kits"),
        })
    }
}

impl Candidate for ReliefShelter {
    fn kind(&self) -> ServiceKind {
        ServiceKind::ReliefShelter
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.shelter_name
    }

    fn contact(&self) -> Option<&str> {
        Some(&self.contact_phone)
    }

    fn address_label(&self) -> Option<&str> {
        self.area.as_deref()
    }

    fn is_open(&self) -> bool {
        self.camp_status.accepts_people()
    }

    fn capacity(&self) -> Option<u32> {
        self.capacity
    }
}

/// Incident-type → shelter provisioning match. Categories outside the map
/// match every shelter.
fn incident_keywords(emergency_type: &str) -> Option<&'static [&'static str]> {
    Some(match emergency_type.to_lowercase().as_str() {
        "fire" => &["Fire"],
        "flood" => &["Flood"],
        "earthquake" => &["Earthquake"],
        "storm" => &["Storm"],
        "heatwave" => &["Heatwave"],
        _ => return None,
    })
}

pub struct ReliefCatalog {
    inner: Catalog<ReliefShelter>,
}

impl ReliefCatalog {
    pub fn new(source: Box<dyn TabularSource>) -> Self {
        Self {
            inner: Catalog::new("relief", move || {
                let table = source.fetch()?;
                Ok(table.rows().filter_map(|r| ReliefShelter::from_row(&r)).collect())
            }),
        }
    }

    pub fn from_records(records: Vec<ReliefShelter>) -> Self {
        Self {
            inner: Catalog::new("relief", move || Ok(records.clone())),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Nearest shelters, optionally narrowed to the incident type.
    pub fn find_nearest(
        &self,
        origin: Coordinates,
        max_results: usize,
        max_distance_km: f64,
        emergency_type: Option<&str>,
    ) -> Vec<Scored<ReliefShelter>> {
        let wanted = emergency_type.and_then(incident_keywords);
        self.inner.find(
            Some(origin),
            |s| {
                wanted.map_or(true, |keywords| {
                    keywords.iter().any(|k| {
                        s.incident_type
                            .as_deref()
                            .is_some_and(|t| t.to_lowercase().contains(&k.to_lowercase()))
                    })
                })
            },
            max_results,
            max_distance_km,
            |s| s.coords,
        )
    }

    /// Shelters in a city, feed order.
    pub fn find_by_city(&self, city: &str, max_results: usize) -> Vec<Scored<ReliefShelter>> {
        let needle = city.to_lowercase();
        self.inner.find(
            None,
            |s| s.city.to_lowercase().contains(&needle),
            max_results,
            f64::INFINITY,
            |s| s.coords,
        )
    }

    /// Open shelters of at least `min_capacity`, largest first.
    pub fn find_by_capacity(
        &self,
        min_capacity: u32,
        max_results: usize,
    ) -> Vec<Scored<ReliefShelter>> {
        let mut hits = self.inner.find(
            None,
            |s| {
                s.camp_status.accepts_people()
                    && s.capacity.is_some_and(|c| c >= min_capacity)
            },
            usize::MAX,
            f64::INFINITY,
            |s| s.coords,
        );
        hits.sort_by(|a, b| {
            b.record
                .capacity
                .unwrap_or(0)
                .cmp(&a.record.capacity.unwrap_or(0))
        });
        hits.truncate(max_results);
        hits
    }
}
