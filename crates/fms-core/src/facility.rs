//! Facility records and the lookup collaborator.
//!
//! Facilities are addressed by their 12 character simulator ICAO:
//! kind (1) + region (2) + airport (4) + ident (5), space padded.

use crate::error::LookupError;
use crate::geodesy::LatLon;
use crate::procedures::{compare_runways, Approach, Arrival, Departure, RunwayRecord};
use crate::waypoint::{AirportInfo, Waypoint, WaypointInfo};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Raw facility data as returned by the facility database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityRecord {
    pub icao: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub departures: Vec<Departure>,
    #[serde(default)]
    pub arrivals: Vec<Arrival>,
    #[serde(default)]
    pub approaches: Vec<Approach>,
    #[serde(default)]
    pub runways: Vec<RunwayRecord>,
}

impl FacilityRecord {
    pub fn new(icao: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            icao: icao.into(),
            lat,
            lon,
            departures: Vec::new(),
            arrivals: Vec::new(),
            approaches: Vec::new(),
            runways: Vec::new(),
        }
    }

    pub fn ident(&self) -> &str {
        icao_ident(&self.icao)
    }

    pub fn coordinates(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

/// Build a padded simulator ICAO.
pub fn format_icao(kind: char, region: &str, airport: &str, ident: &str) -> String {
    format!("{kind}{region:<2}{airport:<4}{ident:<5}")
}

/// Display identifier of an ICAO (characters 7..12, trimmed).
///
/// Identifiers shorter than the padded layout are taken whole.
pub fn icao_ident(icao: &str) -> &str {
    if icao.len() > 7 {
        let end = icao.len().min(12);
        icao.get(7..end).map(str::trim).unwrap_or_else(|| icao.trim())
    } else {
        icao.trim()
    }
}

/// Kind prefix of an ICAO: `A` airport, `V` VOR, `N` NDB, `W` intersection.
pub fn icao_kind(icao: &str) -> Option<char> {
    icao.chars().next()
}

impl Waypoint {
    /// Map a raw facility record into a typed waypoint.
    pub fn from_facility(facility: FacilityRecord) -> Waypoint {
        let ident = facility.ident().to_string();
        let coordinates = facility.coordinates();

        let info = match icao_kind(&facility.icao) {
            Some('A') => WaypointInfo::Airport(airport_info(facility.clone())),
            Some('V') => WaypointInfo::Vor { coordinates },
            Some('N') => WaypointInfo::Ndb { coordinates },
            Some('W') => WaypointInfo::Intersection { coordinates },
            _ => WaypointInfo::User { coordinates },
        };

        Waypoint::new(ident, info).with_icao(facility.icao)
    }
}

fn airport_info(facility: FacilityRecord) -> AirportInfo {
    let coordinates = facility.coordinates();
    let FacilityRecord {
        mut departures,
        mut arrivals,
        mut approaches,
        runways,
        ..
    } = facility;

    for approach in &mut approaches {
        for transition in &mut approach.transitions {
            if let Some(first) = transition.legs.first() {
                transition.name = icao_ident(&first.fix_icao).to_string();
            }
        }
    }
    for departure in &mut departures {
        for transition in &mut departure.runway_transitions {
            transition.name = transition.generated_name();
        }
    }
    for arrival in &mut arrivals {
        for transition in &mut arrival.runway_transitions {
            transition.name = transition.generated_name();
        }
    }

    let mut one_way_runways: Vec<_> = runways
        .iter()
        .flat_map(RunwayRecord::split_if_two_ways)
        .collect();
    one_way_runways.sort_by(compare_runways);

    AirportInfo {
        coordinates,
        departures,
        arrivals,
        approaches,
        runways,
        one_way_runways,
    }
}

/// Facility database lookup.
#[async_trait]
pub trait FacilityLoader: Send + Sync {
    /// Resolve a simulator ICAO into its raw facility record.
    async fn get_facility(&self, icao: &str) -> Result<FacilityRecord, LookupError>;
}

/// Resolve an ICAO straight into a waypoint.
pub async fn resolve_waypoint<L>(loader: &L, icao: &str) -> Result<Waypoint, LookupError>
where
    L: FacilityLoader + ?Sized,
{
    loader.get_facility(icao).await.map(Waypoint::from_facility)
}

/// Facility database held in memory, keyed by full ICAO.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFacilities {
    facilities: HashMap<String, FacilityRecord>,
}

impl InMemoryFacilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of facility records.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<FacilityRecord> = serde_json::from_str(json)?;
        Ok(records.into_iter().collect())
    }

    pub fn insert(&mut self, facility: FacilityRecord) {
        self.facilities.insert(facility.icao.clone(), facility);
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

impl FromIterator<FacilityRecord> for InMemoryFacilities {
    fn from_iter<T: IntoIterator<Item = FacilityRecord>>(iter: T) -> Self {
        let mut facilities = Self::new();
        for record in iter {
            facilities.insert(record);
        }
        facilities
    }
}

#[async_trait]
impl FacilityLoader for InMemoryFacilities {
    async fn get_facility(&self, icao: &str) -> Result<FacilityRecord, LookupError> {
        self.facilities
            .get(icao)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(icao.to_string()))
    }
}

/// Bounds every lookup of the wrapped loader.
#[derive(Debug, Clone)]
pub struct TimeoutLoader<L> {
    inner: L,
    timeout: Duration,
}

impl<L> TimeoutLoader<L> {
    pub fn new(inner: L, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

#[async_trait]
impl<L: FacilityLoader> FacilityLoader for TimeoutLoader<L> {
    async fn get_facility(&self, icao: &str) -> Result<FacilityRecord, LookupError> {
        tokio::time::timeout(self.timeout, self.inner.get_facility(icao))
            .await
            .map_err(|_| LookupError::Timeout {
                icao: icao.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            })?
    }
}
