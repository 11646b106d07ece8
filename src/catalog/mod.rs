//! Read-mostly service catalogs.
//!
//! Three catalogs share one query shape (nearest-first search with a
//! predicate, result cap, and distance cap) over different record types.
//! Loading is lazy and happens at most once per catalog; an ingestion
//! failure leaves the catalog empty and marked loaded so later queries do
//! not retry a broken source.

pub mod facility;
pub mod police;
pub mod relief;
pub mod source;

pub use facility::{FacilityCatalog, MedicalFacility};
pub use police::{LawEnforcementPost, PoliceCatalog};
pub use relief::{ReliefCatalog, ReliefShelter};
pub use source::{CsvFileSource, Row, StaticSource, Table, TabularSource};

use std::sync::OnceLock;

use thiserror::Error;

use crate::geo::{self, Coordinates};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error reading catalog source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog source unavailable: {0}")]
    Unavailable(String),
}

/// A catalog record annotated with the distance from the query origin.
/// `distance_km` is `None` for text-match results.
#[derive(Debug, Clone)]
pub struct Scored<R> {
    pub record: R,
    pub distance_km: Option<f64>,
}

/// Lazily-populated, load-once record collection.
///
/// The loader runs on first access under `OnceLock`, so concurrent first
/// queries observe either nothing (and wait) or the fully ingested set,
/// never a partial catalog.
pub struct Catalog<R> {
    label: &'static str,
    loader: Box<dyn Fn() -> Result<Vec<R>, CatalogError> + Send + Sync>,
    records: OnceLock<Vec<R>>,
}

impl<R: Clone> Catalog<R> {
    pub fn new(
        label: &'static str,
        loader: impl Fn() -> Result<Vec<R>, CatalogError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            label,
            loader: Box::new(loader),
            records: OnceLock::new(),
        }
    }

    /// All records, triggering the one-time ingestion if needed.
    pub fn records(&self) -> &[R] {
        self.records.get_or_init(|| match (self.loader)() {
            Ok(records) => {
                tracing::info!(catalog = self.label, count = records.len(), "Catalog loaded");
                records
            }
            Err(e) => {
                tracing::warn!(
                    catalog = self.label,
                    error = %e,
                    "Catalog ingestion failed, continuing with an empty catalog"
                );
                Vec::new()
            }
        })
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Core query.
    ///
    /// With an origin: distance-annotate every record whose coordinates are
    /// known, drop those beyond `max_distance_km`, sort ascending by
    /// distance, truncate. Without an origin: apply the predicate only and
    /// leave distances unset.
    pub fn find(
        &self,
        origin: Option<Coordinates>,
        filter: impl Fn(&R) -> bool,
        max_results: usize,
        max_distance_km: f64,
        coords_of: impl Fn(&R) -> Option<Coordinates>,
    ) -> Vec<Scored<R>> {
        match origin {
            Some(from) => {
                let mut scored: Vec<Scored<R>> = self
                    .records()
                    .iter()
                    .filter(|r| filter(r))
                    .filter_map(|r| {
                        let to = coords_of(r)?;
                        let d = geo::distance_between(from, to);
                        (d <= max_distance_km).then(|| Scored {
                            record: r.clone(),
                            distance_km: Some(d),
                        })
                    })
                    .collect();
                scored.sort_by(|a, b| {
                    a.distance_km
                        .partial_cmp(&b.distance_km)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                scored.truncate(max_results);
                scored
            }
            None => self
                .records()
                .iter()
                .filter(|r| filter(r))
                .take(max_results)
                .map(|r| Scored {
                    record: r.clone(),
                    distance_km: None,
                })
                .collect(),
        }
    }

    /// Predicate search with optional proximity ranking and no distance cap.
    ///
    /// Records without usable coordinates sort last instead of being
    /// dropped, since the match came from text, not geometry.
    pub fn find_ranked(
        &self,
        origin: Option<Coordinates>,
        filter: impl Fn(&R) -> bool,
        max_results: usize,
        coords_of: impl Fn(&R) -> Option<Coordinates>,
    ) -> Vec<Scored<R>> {
        let mut scored: Vec<Scored<R>> = self
            .records()
            .iter()
            .filter(|r| filter(r))
            .map(|r| Scored {
                distance_km: origin
                    .and_then(|from| coords_of(r).map(|to| geo::distance_between(from, to))),
                record: r.clone(),
            })
            .collect();

        if origin.is_some() {
            scored.sort_by(|a, b| {
                let da = a.distance_km.unwrap_or(f64::INFINITY);
                let db = b.distance_km.unwrap_or(f64::INFINITY);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        scored.truncate(max_results);
        scored
    }
}

/// The three catalogs the guidance stage queries, owned as one injected
/// value rather than ambient globals.
pub struct ServiceDirectory {
    pub facilities: FacilityCatalog,
    pub police: PoliceCatalog,
    pub relief: ReliefCatalog,
}

impl ServiceDirectory {
    pub fn new(facilities: FacilityCatalog, police: PoliceCatalog, relief: ReliefCatalog) -> Self {
        Self {
            facilities,
            police,
            relief,
        }
    }

    /// Directory backed by CSV files for facilities and shelters plus the
    /// built-in law-enforcement dataset.
    pub fn from_csv_files(
        facilities_csv: impl Into<std::path::PathBuf>,
        relief_csv: impl Into<std::path::PathBuf>,
    ) -> Self {
        Self {
            facilities: FacilityCatalog::new(Box::new(CsvFileSource::new(facilities_csv))),
            police: PoliceCatalog::builtin(),
            relief: ReliefCatalog::new(Box::new(CsvFileSource::new(relief_csv))),
        }
    }
}
