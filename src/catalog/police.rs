//! Law-enforcement post catalog.
//!
//! Ships with a built-in dataset covering the major cities; the catalog
//! machinery is the same as the feed-backed ones so a real feed can be
//! swapped in later.

use serde::{Deserialize, Serialize};

use super::{Catalog, Scored};
use crate::geo::Coordinates;
use crate::models::ServiceKind;
use crate::selection::Candidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalStatus {
    Active,
    Busy,
    Unavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LawEnforcementPost {
    pub id: String,
    pub station_name: String,
    pub city: String,
    pub area: String,
    pub coords: Option<Coordinates>,
    pub contact_number: String,
    pub helpline: String,
    pub specializations: Vec<String>,
    pub status: OperationalStatus,
}

impl Candidate for LawEnforcementPost {
    fn kind(&self) -> ServiceKind {
        ServiceKind::LawEnforcement
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.station_name
    }

    fn contact(&self) -> Option<&str> {
        Some(&self.contact_number)
    }

    fn address_label(&self) -> Option<&str> {
        Some(&self.area)
    }

    fn is_operational(&self) -> bool {
        self.status == OperationalStatus::Active
    }
}

/// Crime-category → relevant specializations. Categories outside this map
/// (including the generic "crime") match every active post.
fn crime_specializations(crime_type: &str) -> Option<&'static [&'static str]> {
    Some(match crime_type.to_lowercase().as_str() {
        "theft" => &["Theft", "Burglary", "General Crime"],
        "burglary" => &["Burglary", "Theft", "General Crime"],
        "robbery" => &["Robbery", "Violence", "General Crime"],
        "violence" => &["Violence", "Domestic Violence", "General Crime"],
        "fraud" => &["Fraud", "White Collar Crime", "Cyber Crime"],
        "cybercrime" => &["Cyber Crime", "Fraud", "White Collar Crime"],
        "domestic" => &["Domestic Violence", "Violence", "General Crime"],
        _ => return None,
    })
}

pub struct PoliceCatalog {
    inner: Catalog<LawEnforcementPost>,
}

impl PoliceCatalog {
    /// The embedded national dataset.
    pub fn builtin() -> Self {
        Self::from_records(builtin_posts())
    }

    pub fn from_records(records: Vec<LawEnforcementPost>) -> Self {
        Self {
            inner: Catalog::new("police", move || Ok(records.clone())),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Nearest active posts, optionally narrowed to posts whose
    /// specializations cover the given crime type.
    pub fn find_nearest(
        &self,
        origin: Coordinates,
        max_results: usize,
        max_distance_km: f64,
        crime_type: Option<&str>,
    ) -> Vec<Scored<LawEnforcementPost>> {
        let wanted = crime_type.and_then(crime_specializations);
        self.inner.find(
            Some(origin),
            |p| {
                p.status == OperationalStatus::Active
                    && wanted.map_or(true, |specs| {
                        specs.iter().any(|spec| {
                            p.specializations
                                .iter()
                                .any(|s| s.to_lowercase().contains(&spec.to_lowercase()))
                        })
                    })
            },
            max_results,
            max_distance_km,
            |p| p.coords,
        )
    }

    /// Active posts in a city, feed order.
    pub fn find_by_city(&self, city: &str, max_results: usize) -> Vec<Scored<LawEnforcementPost>> {
        let needle = city.to_lowercase();
        self.inner.find(
            None,
            |p| p.status == OperationalStatus::Active && p.city.to_lowercase().contains(&needle),
            max_results,
            f64::INFINITY,
            |p| p.coords,
        )
    }

    /// Active posts declaring a specialization.
    pub fn find_by_specialization(
        &self,
        specialization: &str,
        max_results: usize,
    ) -> Vec<Scored<LawEnforcementPost>> {
        let needle = specialization.to_lowercase();
        self.inner.find(
            None,
            |p| {
                p.status == OperationalStatus::Active
                    && p.specializations
                        .iter()
                        .any(|s| s.to_lowercase().contains(&needle))
            },
            max_results,
            f64::INFINITY,
            |p| p.coords,
        )
    }
}

fn post(
    id: &str,
    station_name: &str,
    city: &str,
    area: &str,
    lat: f64,
    lng: f64,
    contact_number: &str,
    specializations: &[&str],
) -> LawEnforcementPost {
    LawEnforcementPost {
        id: id.into(),
        station_name: station_name.into(),
        city: city.into(),
        area: area.into(),
        coords: Some(Coordinates::new(lat, lng)),
        contact_number: contact_number.into(),
        helpline: crate::config::POLICE_HELPLINE.into(),
        specializations: specializations.iter().map(|s| s.to_string()).collect(),
        status: OperationalStatus::Active,
    }
}

fn builtin_posts() -> Vec<LawEnforcementPost> {
    vec![
        post(
            "police_001",
            "Karachi City Police Station",
            "Karachi",
            "City Center",
            24.8607,
            67.0011,
            "021-99261000",
            &["General Crime", "Theft", "Burglary", "Violence"],
        ),
        post(
            "police_002",
            "Clifton Police Station",
            "Karachi",
            "Clifton",
            24.8138,
            67.0299,
            "021-35830039",
            &["Crime Investigation", "Fraud", "Cyber Crime"],
        ),
        post(
            "police_003",
            "Gulshan-e-Iqbal Police Station",
            "Karachi",
            "Gulshan-e-Iqbal",
            24.9207,
            67.0982,
            "021-34964320",
            &["General Crime", "Domestic Violence", "Robbery"],
        ),
        post(
            "police_004",
            "Lahore Central Police Station",
            "Lahore",
            "City Center",
            31.5804,
            74.3587,
            "042-99201045",
            &["General Crime", "Traffic", "Public Safety"],
        ),
        post(
            "police_005",
            "Model Town Police Station",
            "Lahore",
            "Model Town",
            31.4802,
            74.3441,
            "042-35165040",
            &["Crime Investigation", "White Collar Crime"],
        ),
        post(
            "police_006",
            "Gulberg Police Station",
            "Lahore",
            "Gulberg",
            31.5052,
            74.3441,
            "042-35714304",
            &["General Crime", "Theft", "Business Crime"],
        ),
        post(
            "police_007",
            "Islamabad Central Police Station",
            "Islamabad",
            "Blue Area",
            33.7077,
            73.0563,
            "051-9252314",
            &["General Crime", "VIP Security", "Federal Crime"],
        ),
        post(
            "police_008",
            "Shalimar Police Station",
            "Islamabad",
            "Shalimar",
            33.6844,
            73.0479,
            "051-4435404",
            &["Crime Investigation", "Robbery", "Violence"],
        ),
        post(
            "police_009",
            "Peshawar City Police Station",
            "Peshawar",
            "City Center",
            34.0151,
            71.5249,
            "091-9213444",
            &["General Crime", "Terrorism Prevention", "Border Security"],
        ),
        post(
            "police_010",
            "University Town Police Station",
            "Peshawar",
            "University Town",
            34.0048,
            71.5611,
            "091-9216789",
            &["Student Safety", "Academic Crime", "General Crime"],
        ),
        post(
            "police_011",
            "Multan City Police Station",
            "Multan",
            "City Center",
            30.1575,
            71.5249,
            "061-9201234",
            &["General Crime", "Rural Crime", "Agriculture Crime"],
        ),
        post(
            "police_012",
            "Quetta Central Police Station",
            "Quetta",
            "City Center",
            30.1798,
            66.9750,
            "081-2414142",
            &["General Crime", "Tribal Affairs", "Border Security"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_dataset_covers_six_cities() {
        let catalog = PoliceCatalog::builtin();
        assert_eq!(catalog.len(), 12);
        for city in ["Karachi", "Lahore", "Islamabad", "Peshawar", "Multan", "Quetta"] {
            assert!(!catalog.find_by_city(city, 5).is_empty(), "no posts in {city}");
        }
    }

    #[test]
    fn nearest_search_sorts_by_distance() {
        let catalog = PoliceCatalog::builtin();
        let clifton = Coordinates::new(24.8138, 67.0299);
        let hits = catalog.find_nearest(clifton, 5, 30.0, None);

        assert!(!hits.is_empty());
        assert_eq!(hits[0].record.id, "police_002");
        for pair in hits.windows(2) {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }
    }

    #[test]
    fn crime_type_narrows_to_specializations() {
        let catalog = PoliceCatalog::builtin();
        let karachi = Coordinates::new(24.8607, 67.0011);

        let fraud = catalog.find_nearest(karachi, 5, 30.0, Some("fraud"));
        assert!(!fraud.is_empty());
        assert!(fraud.iter().all(|h| h
            .record
            .specializations
            .iter()
            .any(|s| ["Fraud", "White Collar Crime", "Cyber Crime"]
                .iter()
                .any(|w| s.contains(w)))));
    }

    #[test]
    fn unknown_crime_type_matches_all_active() {
        let catalog = PoliceCatalog::builtin();
        let karachi = Coordinates::new(24.8607, 67.0011);
        let generic = catalog.find_nearest(karachi, 10, 30.0, Some("crime"));
        let unfiltered = catalog.find_nearest(karachi, 10, 30.0, None);
        assert_eq!(generic.len(), unfiltered.len());
    }

    #[test]
    fn inactive_posts_are_excluded() {
        let mut records = builtin_posts();
        records[0].status = OperationalStatus::Unavailable;
        let catalog = PoliceCatalog::from_records(records);

        let karachi = Coordinates::new(24.8607, 67.0011);
        let hits = catalog.find_nearest(karachi, 10, 30.0, None);
        assert!(hits.iter().all(|h| h.record.id != "police_001"));
    }

    #[test]
    fn specialization_search() {
        let catalog = PoliceCatalog::builtin();
        let hits = catalog.find_by_specialization("General Crime", 20);
        assert!(hits.len() >= 5);
    }
}
