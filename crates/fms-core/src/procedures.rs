//! Published terminal procedure data as delivered by the facility database.

use crate::geodesy::{normalize_heading, LatLon};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Leg path terminator, numbered the way the simulator's facility data
/// numbers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum LegType {
    /// AF - arc to a fix
    ArcToFix,
    /// CA - course to an altitude
    CourseToAltitude,
    /// CD - course to a DME distance
    CourseToDme,
    /// CF - course to a fix
    CourseToFix,
    /// CI - course to intercept the next leg
    CourseToIntercept,
    /// CR - course to a radial
    CourseToRadial,
    /// DF - direct to a fix
    DirectToFix,
    /// FA - fix to an altitude
    FixToAltitude,
    /// FC - track from a fix for a distance
    FixForDistance,
    /// FD - track from a fix to a DME distance
    FixToDme,
    /// FM - from a fix to a manual termination
    FixToManual,
    /// HA - hold to an altitude
    HoldToAltitude,
    /// HF - hold, single circuit terminating at the fix
    HoldToFix,
    /// HM - hold to a manual termination
    HoldToManual,
    /// IF - initial fix
    InitialFix,
    /// PI - procedure turn
    ProcedureTurn,
    /// RF - constant radius arc
    RadiusToFix,
    /// TF - track to a fix
    TrackToFix,
    /// VA - heading to an altitude
    HeadingToAltitude,
    /// VD - heading to a DME distance
    HeadingToDme,
    /// VI - heading to intercept the next leg
    HeadingToIntercept,
    /// VM - heading to a manual termination
    HeadingToManual,
    /// VR - heading to a radial
    HeadingToRadial,
    Unknown(u8),
}

impl LegType {
    pub fn code(self) -> u8 {
        match self {
            LegType::ArcToFix => 1,
            LegType::CourseToAltitude => 2,
            LegType::CourseToDme => 3,
            LegType::CourseToFix => 4,
            LegType::CourseToIntercept => 5,
            LegType::CourseToRadial => 6,
            LegType::DirectToFix => 7,
            LegType::FixToAltitude => 8,
            LegType::FixForDistance => 9,
            LegType::FixToDme => 10,
            LegType::FixToManual => 11,
            LegType::HoldToAltitude => 12,
            LegType::HoldToFix => 13,
            LegType::HoldToManual => 14,
            LegType::InitialFix => 15,
            LegType::ProcedureTurn => 16,
            LegType::RadiusToFix => 17,
            LegType::TrackToFix => 18,
            LegType::HeadingToAltitude => 19,
            LegType::HeadingToDme => 20,
            LegType::HeadingToIntercept => 21,
            LegType::HeadingToManual => 22,
            LegType::HeadingToRadial => 23,
            LegType::Unknown(code) => code,
        }
    }
}

impl From<u8> for LegType {
    fn from(code: u8) -> Self {
        match code {
            1 => LegType::ArcToFix,
            2 => LegType::CourseToAltitude,
            3 => LegType::CourseToDme,
            4 => LegType::CourseToFix,
            5 => LegType::CourseToIntercept,
            6 => LegType::CourseToRadial,
            7 => LegType::DirectToFix,
            8 => LegType::FixToAltitude,
            9 => LegType::FixForDistance,
            10 => LegType::FixToDme,
            11 => LegType::FixToManual,
            12 => LegType::HoldToAltitude,
            13 => LegType::HoldToFix,
            14 => LegType::HoldToManual,
            15 => LegType::InitialFix,
            16 => LegType::ProcedureTurn,
            17 => LegType::RadiusToFix,
            18 => LegType::TrackToFix,
            19 => LegType::HeadingToAltitude,
            20 => LegType::HeadingToDme,
            21 => LegType::HeadingToIntercept,
            22 => LegType::HeadingToManual,
            23 => LegType::HeadingToRadial,
            other => LegType::Unknown(other),
        }
    }
}

impl From<LegType> for u8 {
    fn from(leg_type: LegType) -> Self {
        leg_type.code()
    }
}

/// One leg of a published procedure.
///
/// `distance` and `rho` are meters; `course` and `theta` are degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureLeg {
    #[serde(rename = "type")]
    pub leg_type: LegType,
    #[serde(default)]
    pub fix_icao: String,
    #[serde(default)]
    pub origin_icao: String,
    #[serde(default)]
    pub alt_desc: u8,
    #[serde(default)]
    pub altitude1: f64,
    #[serde(default)]
    pub altitude2: f64,
    #[serde(default)]
    pub course: f64,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub rho: f64,
    #[serde(default)]
    pub theta: f64,
}

impl ProcedureLeg {
    pub fn new(leg_type: LegType) -> Self {
        Self {
            leg_type,
            fix_icao: String::new(),
            origin_icao: String::new(),
            alt_desc: 0,
            altitude1: 0.0,
            altitude2: 0.0,
            course: 0.0,
            distance: 0.0,
            rho: 0.0,
            theta: 0.0,
        }
    }

    pub fn has_fix(&self) -> bool {
        !self.fix_icao.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunwayTransition {
    pub runway_number: u32,
    /// 0 none, 1 left, 2 right, 3 center
    #[serde(default)]
    pub runway_designation: u8,
    #[serde(default)]
    pub legs: Vec<ProcedureLeg>,
    /// Display name, e.g. `RW4L`. Filled in when the facility is mapped.
    #[serde(default)]
    pub name: String,
}

impl RunwayTransition {
    pub fn generated_name(&self) -> String {
        let suffix = match self.runway_designation {
            1 => "L",
            2 => "R",
            3 => "C",
            _ => "",
        };
        format!("RW{}{}", self.runway_number, suffix)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrouteTransition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub legs: Vec<ProcedureLeg>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    pub name: String,
    #[serde(default)]
    pub runway_transitions: Vec<RunwayTransition>,
    #[serde(default)]
    pub common_legs: Vec<ProcedureLeg>,
    #[serde(default)]
    pub en_route_transitions: Vec<EnrouteTransition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrival {
    pub name: String,
    #[serde(default)]
    pub runway_transitions: Vec<RunwayTransition>,
    #[serde(default)]
    pub common_legs: Vec<ProcedureLeg>,
    #[serde(default)]
    pub en_route_transitions: Vec<EnrouteTransition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproachTransition {
    /// Named after the first fix of the transition when the facility is mapped.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub legs: Vec<ProcedureLeg>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approach {
    pub name: String,
    #[serde(default)]
    pub runway: String,
    #[serde(default)]
    pub transitions: Vec<ApproachTransition>,
    #[serde(default)]
    pub final_legs: Vec<ProcedureLeg>,
}

/// A runway as stored in the facility database, covering both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunwayRecord {
    /// Both ends, e.g. `04L-22R`.
    pub designation: String,
    /// Heading of the first end in degrees.
    pub direction: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters.
    #[serde(default)]
    pub length: f64,
}

/// A single landing/takeoff direction of a runway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneWayRunway {
    pub designation: String,
    pub direction: f64,
    pub coordinates: LatLon,
    pub length: f64,
}

impl RunwayRecord {
    /// Split a two-ended runway into its one-way directions.
    pub fn split_if_two_ways(&self) -> Vec<OneWayRunway> {
        let coordinates = LatLon::new(self.latitude, self.longitude);
        let mut ends = self.designation.split('-').map(str::trim).filter(|d| !d.is_empty());

        let mut runways = Vec::with_capacity(2);
        if let Some(primary) = ends.next() {
            runways.push(OneWayRunway {
                designation: primary.to_string(),
                direction: normalize_heading(self.direction),
                coordinates,
                length: self.length,
            });
        }
        if let Some(secondary) = ends.next() {
            runways.push(OneWayRunway {
                designation: secondary.to_string(),
                direction: normalize_heading(self.direction + 180.0),
                coordinates,
                length: self.length,
            });
        }
        runways
    }
}

fn runway_number(designation: &str) -> u32 {
    designation
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

fn runway_side_rank(designation: &str) -> u8 {
    if designation.contains('L') {
        1
    } else if designation.contains('C') {
        2
    } else if designation.contains('R') {
        3
    } else {
        0
    }
}

/// Order runways by number, then plain < L < C < R.
pub fn compare_runways(a: &OneWayRunway, b: &OneWayRunway) -> Ordering {
    runway_number(&a.designation)
        .cmp(&runway_number(&b.designation))
        .then_with(|| runway_side_rank(&a.designation).cmp(&runway_side_rank(&b.designation)))
}
