//! Waypoint model for the flight plan.

use crate::geodesy::LatLon;
use crate::procedures::{Approach, Arrival, Departure, OneWayRunway, RunwayRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single entry of a flight plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub ident: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icao: Option<String>,
    pub info: WaypointInfo,
    /// Course into this waypoint from the previous one, degrees true.
    #[serde(default)]
    pub bearing_in_fp: f64,
    /// Leg length from the previous waypoint, NM.
    #[serde(default)]
    pub distance_in_fp: f64,
    /// Distance from the start of the plan, NM.
    #[serde(default)]
    pub cumulative_distance_in_fp: f64,
}

/// Per-kind payload. The serialized `type` tag doubles as the waypoint kind
/// code used by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WaypointInfo {
    #[serde(rename = "A")]
    Airport(AirportInfo),
    #[serde(rename = "W")]
    Intersection { coordinates: LatLon },
    #[serde(rename = "V")]
    Vor { coordinates: LatLon },
    #[serde(rename = "N")]
    Ndb { coordinates: LatLon },
    /// A facility whose ICAO prefix is none of the above.
    #[serde(rename = "U")]
    User { coordinates: LatLon },
    #[serde(rename = "D")]
    Discontinuity,
    #[serde(rename = "VEC")]
    Vectors,
    #[serde(rename = "ALT")]
    AltitudeTurn(AltitudeTurnInfo),
    #[serde(rename = "R")]
    RadiusFix(RadiusFixInfo),
    #[serde(rename = "BD")]
    BearingDistance(BearingDistanceInfo),
}

/// Kind tag without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaypointKind {
    Airport,
    Intersection,
    Vor,
    Ndb,
    User,
    Discontinuity,
    Vectors,
    AltitudeTurn,
    RadiusFix,
    BearingDistance,
}

impl WaypointKind {
    pub fn tag(self) -> &'static str {
        match self {
            WaypointKind::Airport => "A",
            WaypointKind::Intersection => "W",
            WaypointKind::Vor => "V",
            WaypointKind::Ndb => "N",
            WaypointKind::User => "U",
            WaypointKind::Discontinuity => "D",
            WaypointKind::Vectors => "VEC",
            WaypointKind::AltitudeTurn => "ALT",
            WaypointKind::RadiusFix => "R",
            WaypointKind::BearingDistance => "BD",
        }
    }

    /// Marker kinds are instructions rather than places.
    pub fn is_marker(self) -> bool {
        matches!(
            self,
            WaypointKind::Discontinuity
                | WaypointKind::Vectors
                | WaypointKind::AltitudeTurn
                | WaypointKind::RadiusFix
                | WaypointKind::BearingDistance
        )
    }
}

impl fmt::Display for WaypointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportInfo {
    pub coordinates: LatLon,
    #[serde(default)]
    pub departures: Vec<Departure>,
    #[serde(default)]
    pub arrivals: Vec<Arrival>,
    #[serde(default)]
    pub approaches: Vec<Approach>,
    #[serde(default)]
    pub runways: Vec<RunwayRecord>,
    /// Sorted by number, then side.
    #[serde(default)]
    pub one_way_runways: Vec<OneWayRunway>,
}

impl AirportInfo {
    pub fn new(coordinates: LatLon) -> Self {
        Self {
            coordinates,
            departures: Vec::new(),
            arrivals: Vec::new(),
            approaches: Vec::new(),
            runways: Vec::new(),
            one_way_runways: Vec::new(),
        }
    }
}

/// Altitude constraint with optional inbound/outbound tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltitudeTurnInfo {
    /// Feet.
    pub altitude: f64,
    #[serde(default)]
    pub inbound_track: Option<f64>,
    #[serde(default)]
    pub outbound_track: Option<f64>,
}

/// The fix a derived waypoint was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixReference {
    pub ident: String,
    pub coordinates: LatLon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusFixInfo {
    /// NM around the reference fix.
    pub radius: f64,
    pub reference_fix: FixReference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BearingDistanceInfo {
    /// Degrees from the reference fix.
    pub bearing: f64,
    /// NM from the reference fix.
    pub distance: f64,
    pub reference_fix: FixReference,
    pub coordinates: LatLon,
}

impl WaypointInfo {
    pub fn kind(&self) -> WaypointKind {
        match self {
            WaypointInfo::Airport(_) => WaypointKind::Airport,
            WaypointInfo::Intersection { .. } => WaypointKind::Intersection,
            WaypointInfo::Vor { .. } => WaypointKind::Vor,
            WaypointInfo::Ndb { .. } => WaypointKind::Ndb,
            WaypointInfo::User { .. } => WaypointKind::User,
            WaypointInfo::Discontinuity => WaypointKind::Discontinuity,
            WaypointInfo::Vectors => WaypointKind::Vectors,
            WaypointInfo::AltitudeTurn(_) => WaypointKind::AltitudeTurn,
            WaypointInfo::RadiusFix(_) => WaypointKind::RadiusFix,
            WaypointInfo::BearingDistance(_) => WaypointKind::BearingDistance,
        }
    }

    /// Position usable for distance computations, if the kind has one.
    pub fn coordinates(&self) -> Option<LatLon> {
        match self {
            WaypointInfo::Airport(airport) => Some(airport.coordinates),
            WaypointInfo::Intersection { coordinates }
            | WaypointInfo::Vor { coordinates }
            | WaypointInfo::Ndb { coordinates }
            | WaypointInfo::User { coordinates } => Some(*coordinates),
            WaypointInfo::BearingDistance(info) => Some(info.coordinates),
            WaypointInfo::Discontinuity
            | WaypointInfo::Vectors
            | WaypointInfo::AltitudeTurn(_)
            | WaypointInfo::RadiusFix(_) => None,
        }
    }
}

impl Waypoint {
    pub fn new(ident: impl Into<String>, info: WaypointInfo) -> Self {
        Self {
            ident: ident.into(),
            icao: None,
            info,
            bearing_in_fp: 0.0,
            distance_in_fp: 0.0,
            cumulative_distance_in_fp: 0.0,
        }
    }

    /// Attach the facility ICAO this waypoint was resolved from.
    pub fn with_icao(mut self, icao: impl Into<String>) -> Self {
        self.icao = Some(icao.into());
        self
    }

    /// A computed fix with only an identifier and a position.
    pub fn intersection(ident: impl Into<String>, coordinates: LatLon) -> Self {
        Self::new(ident, WaypointInfo::Intersection { coordinates })
    }

    pub fn airport(ident: impl Into<String>, info: AirportInfo) -> Self {
        Self::new(ident, WaypointInfo::Airport(info))
    }

    pub fn discontinuity() -> Self {
        Self::new("", WaypointInfo::Discontinuity)
    }

    pub fn vectors() -> Self {
        Self::new("", WaypointInfo::Vectors)
    }

    pub fn kind(&self) -> WaypointKind {
        self.info.kind()
    }

    pub fn is_airport(&self) -> bool {
        self.kind() == WaypointKind::Airport
    }

    pub fn coordinates(&self) -> Option<LatLon> {
        self.info.coordinates()
    }

    pub fn airport_info(&self) -> Option<&AirportInfo> {
        match &self.info {
            WaypointInfo::Airport(airport) => Some(airport),
            _ => None,
        }
    }

    /// Facility ICAO, or `None` when the waypoint was computed.
    pub fn facility_icao(&self) -> Option<&str> {
        self.icao.as_deref().filter(|icao| !icao.trim().is_empty())
    }

    /// Reference for derived waypoints; `None` if this waypoint has no position.
    pub fn as_fix_reference(&self) -> Option<FixReference> {
        self.coordinates().map(|coordinates| FixReference {
            ident: self.ident.clone(),
            coordinates,
        })
    }

    pub(crate) fn clear_leg_data(&mut self) {
        self.bearing_in_fp = 0.0;
        self.distance_in_fp = 0.0;
        self.cumulative_distance_in_fp = 0.0;
    }
}
