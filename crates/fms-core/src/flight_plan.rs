//! Ordered waypoint container with segment bookkeeping.
//!
//! The plan is a single `Vec<Waypoint>` partitioned by four start indices:
//! `departure_start <= enroute_start <= arrival_start <= approach_start <= len`.
//! The origin airport (when present) sits before the departure segment and the
//! destination airport (when present) after the approach segment.

use crate::error::PlanError;
use crate::geodesy::{
    bearing_distance_to_coordinates, great_circle_distance, great_circle_heading,
    normalize_heading, LatLon,
};
use crate::waypoint::{
    AltitudeTurnInfo, BearingDistanceInfo, RadiusFixInfo, Waypoint, WaypointInfo,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four contiguous windows of a plan, in flying order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    Departure,
    Enroute,
    Arrival,
    Approach,
}

impl SegmentType {
    pub const ALL: [SegmentType; 4] = [
        SegmentType::Departure,
        SegmentType::Enroute,
        SegmentType::Arrival,
        SegmentType::Approach,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SegmentType::Departure => "departure",
            SegmentType::Enroute => "enroute",
            SegmentType::Arrival => "arrival",
            SegmentType::Approach => "approach",
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Selected procedures, as indices into the origin/destination catalogs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureDetails {
    pub departure_index: Option<usize>,
    pub departure_runway_index: Option<usize>,
    pub departure_transition_index: Option<usize>,
    pub arrival_index: Option<usize>,
    pub arrival_transition_index: Option<usize>,
    pub arrival_runway_index: Option<usize>,
    pub approach_index: Option<usize>,
    pub approach_transition_index: Option<usize>,
}

impl ProcedureDetails {
    pub fn approach_selected(&self) -> bool {
        self.approach_index.is_some()
    }

    fn clear_departure(&mut self) {
        self.departure_index = None;
        self.departure_runway_index = None;
        self.departure_transition_index = None;
    }

    fn clear_arrival_and_approach(&mut self) {
        self.arrival_index = None;
        self.arrival_transition_index = None;
        self.arrival_runway_index = None;
        self.approach_index = None;
        self.approach_transition_index = None;
    }
}

/// Direct-to override state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectTo {
    pub is_active: bool,
    /// Selects `waypoint_index` over the external `waypoint`.
    pub waypoint_is_in_flight_plan: bool,
    pub waypoint_index: usize,
    /// External target, when not part of the plan.
    pub waypoint: Option<Waypoint>,
    /// Position the direct-to was started from.
    pub origin: Option<Waypoint>,
}

impl DirectTo {
    /// Fly direct to a waypoint outside the plan.
    pub fn activate_from_waypoint(&mut self, waypoint: Waypoint, origin: Waypoint) {
        self.is_active = true;
        self.waypoint_is_in_flight_plan = false;
        self.waypoint = Some(waypoint);
        self.origin = Some(origin);
    }

    /// Fly direct to a waypoint already in the plan.
    pub fn activate_from_index(&mut self, index: usize) {
        self.is_active = true;
        self.waypoint_is_in_flight_plan = true;
        self.waypoint_index = index;
    }

    pub fn cancel(&mut self) {
        self.is_active = false;
        self.waypoint_is_in_flight_plan = false;
        self.waypoint = None;
        self.origin = None;
    }

    fn in_plan_target(&self) -> Option<usize> {
        (self.is_active && self.waypoint_is_in_flight_plan).then_some(self.waypoint_index)
    }
}

/// Borrowed window into a plan. `offset` is the plan index of the first entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightPlanSegment<'a> {
    pub offset: usize,
    pub waypoints: &'a [Waypoint],
}

impl<'a> FlightPlanSegment<'a> {
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// One past the last plan index covered by the segment.
    pub fn end(&self) -> usize {
        self.offset + self.waypoints.len()
    }

    /// Waypoints paired with their plan index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a Waypoint)> + 'a {
        let offset = self.offset;
        self.waypoints
            .iter()
            .enumerate()
            .map(move |(i, waypoint)| (offset + i, waypoint))
    }
}

/// Deserializing repairs boundaries and recomputes leg data, so a decoded
/// plan holds the same invariants as one built through edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FlightPlanRecord")]
pub struct FlightPlan {
    waypoints: Vec<Waypoint>,
    has_origin: bool,
    has_destination: bool,
    departure_start: usize,
    enroute_start: usize,
    arrival_start: usize,
    approach_start: usize,
    active_waypoint_index: usize,
    /// Feet.
    pub cruise_altitude: f64,
    procedure_details: ProcedureDetails,
    direct_to: DirectTo,
}

/// Wire form of a plan, trusted only after `normalize`.
#[derive(Deserialize, Default)]
#[serde(default)]
struct FlightPlanRecord {
    waypoints: Vec<Waypoint>,
    has_origin: bool,
    has_destination: bool,
    departure_start: usize,
    enroute_start: usize,
    arrival_start: usize,
    approach_start: usize,
    active_waypoint_index: usize,
    cruise_altitude: f64,
    procedure_details: ProcedureDetails,
    direct_to: DirectTo,
}

impl From<FlightPlanRecord> for FlightPlan {
    fn from(record: FlightPlanRecord) -> Self {
        let mut plan = FlightPlan {
            waypoints: record.waypoints,
            has_origin: record.has_origin,
            has_destination: record.has_destination,
            departure_start: record.departure_start,
            enroute_start: record.enroute_start,
            arrival_start: record.arrival_start,
            approach_start: record.approach_start,
            active_waypoint_index: record.active_waypoint_index,
            cruise_altitude: record.cruise_altitude,
            procedure_details: record.procedure_details,
            direct_to: record.direct_to,
        };
        plan.normalize();
        plan.reflow();
        plan
    }
}

impl FlightPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn procedure_details(&self) -> &ProcedureDetails {
        &self.procedure_details
    }

    /// Edit the procedure selection. Leg data is recomputed afterwards since
    /// selecting an approach changes how the final legs are measured.
    pub fn update_procedure_details(&mut self, update: impl FnOnce(&mut ProcedureDetails)) {
        update(&mut self.procedure_details);
        self.reflow();
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn get_waypoint(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    pub fn has_origin(&self) -> bool {
        self.has_origin
    }

    pub fn has_destination(&self) -> bool {
        self.has_destination
    }

    pub fn origin(&self) -> Option<&Waypoint> {
        self.waypoints.first().filter(|_| self.has_origin)
    }

    pub fn destination(&self) -> Option<&Waypoint> {
        self.waypoints.last().filter(|_| self.has_destination)
    }

    pub fn departure_start(&self) -> usize {
        self.departure_start
    }

    pub fn enroute_start(&self) -> usize {
        self.enroute_start
    }

    pub fn arrival_start(&self) -> usize {
        self.arrival_start
    }

    pub fn approach_start(&self) -> usize {
        self.approach_start
    }

    pub fn active_waypoint_index(&self) -> usize {
        self.active_waypoint_index
    }

    pub fn active_waypoint(&self) -> Option<&Waypoint> {
        self.waypoints.get(self.active_waypoint_index)
    }

    /// Out of range indices clamp to the last waypoint.
    pub fn set_active_waypoint_index(&mut self, index: usize) {
        self.active_waypoint_index = index.min(self.waypoints.len().saturating_sub(1));
    }

    pub fn direct_to(&self) -> &DirectTo {
        &self.direct_to
    }

    /// Returns `false` and leaves direct-to untouched if `index` is not in the plan.
    pub fn activate_direct_to_index(&mut self, index: usize) -> bool {
        if index >= self.waypoints.len() {
            return false;
        }
        self.direct_to.activate_from_index(index);
        true
    }

    pub fn activate_direct_to_waypoint(&mut self, waypoint: Waypoint, origin: Waypoint) {
        self.direct_to.activate_from_waypoint(waypoint, origin);
    }

    pub fn cancel_direct_to(&mut self) {
        self.direct_to.cancel();
    }

    /// `[start, end)` plan indices of a segment.
    pub fn segment_bounds(&self, segment: SegmentType) -> (usize, usize) {
        match segment {
            SegmentType::Departure => (self.departure_start, self.enroute_start),
            SegmentType::Enroute => (self.enroute_start, self.arrival_start),
            SegmentType::Arrival => (self.arrival_start, self.approach_start),
            SegmentType::Approach => {
                let end = self.waypoints.len() - usize::from(self.has_destination);
                (self.approach_start, end.max(self.approach_start))
            }
        }
    }

    pub fn segment(&self, segment: SegmentType) -> FlightPlanSegment<'_> {
        let (start, end) = self.segment_bounds(segment);
        FlightPlanSegment {
            offset: start,
            waypoints: &self.waypoints[start..end],
        }
    }

    pub fn departure(&self) -> FlightPlanSegment<'_> {
        self.segment(SegmentType::Departure)
    }

    pub fn enroute(&self) -> FlightPlanSegment<'_> {
        self.segment(SegmentType::Enroute)
    }

    pub fn arrival(&self) -> FlightPlanSegment<'_> {
        self.segment(SegmentType::Arrival)
    }

    pub fn approach(&self) -> FlightPlanSegment<'_> {
        self.segment(SegmentType::Approach)
    }

    /// Segment holding `index`; `None` for the origin, the destination, and
    /// indices outside the plan.
    pub fn segment_of(&self, index: usize) -> Option<SegmentType> {
        let len = self.waypoints.len();
        if index >= len
            || (self.has_origin && index == 0)
            || (self.has_destination && index == len - 1)
        {
            return None;
        }
        SegmentType::ALL.into_iter().find(|segment| {
            let (start, end) = self.segment_bounds(*segment);
            (start..end).contains(&index)
        })
    }

    /// Insert a waypoint, or append when `index` is `None` or past the end.
    ///
    /// An airport at index 0 becomes the origin; an airport appended as the
    /// new last waypoint becomes the destination. Anything else pushes every
    /// enroute/arrival/approach start at or after `index` up by one.
    pub fn add_waypoint(&mut self, waypoint: Waypoint, index: Option<usize>) {
        let was_empty = self.waypoints.is_empty();
        let is_airport = waypoint.is_airport();

        let index = match index {
            Some(index) if index < self.waypoints.len() => {
                self.waypoints.insert(index, waypoint);
                index
            }
            _ => {
                self.waypoints.push(waypoint);
                self.waypoints.len() - 1
            }
        };
        let len = self.waypoints.len();

        if index == 0 && is_airport {
            self.has_origin = true;
            self.departure_start = 1;
            self.enroute_start = (self.enroute_start + 1).max(self.departure_start);
            self.arrival_start = (self.arrival_start + 1).max(self.enroute_start);
            self.approach_start = (self.approach_start + 1).max(self.arrival_start);
        } else if index == len - 1 && len > 1 && is_airport {
            self.has_destination = true;
        } else {
            for boundary in [
                &mut self.enroute_start,
                &mut self.arrival_start,
                &mut self.approach_start,
            ] {
                if index <= *boundary {
                    *boundary += 1;
                }
            }
        }

        self.shift_indexes_up(index, was_empty);
        self.normalize();
        self.reflow();
    }

    /// Insert a waypoint into a specific segment.
    ///
    /// `index` is clamped into the segment. Origin/destination detection does
    /// not apply. Returns the plan index the waypoint landed at.
    pub fn add_waypoint_to_segment(
        &mut self,
        segment: SegmentType,
        waypoint: Waypoint,
        index: usize,
    ) -> usize {
        let was_empty = self.waypoints.is_empty();
        let (start, end) = self.segment_bounds(segment);
        let index = index.clamp(start, end);
        self.waypoints.insert(index, waypoint);

        let boundaries = [
            (SegmentType::Departure, &mut self.departure_start),
            (SegmentType::Enroute, &mut self.enroute_start),
            (SegmentType::Arrival, &mut self.arrival_start),
            (SegmentType::Approach, &mut self.approach_start),
        ];
        for (owner, boundary) in boundaries {
            let moves = if owner <= segment {
                *boundary > index
            } else {
                *boundary >= index
            };
            if moves {
                *boundary += 1;
            }
        }

        self.shift_indexes_up(index, was_empty);
        self.normalize();
        self.reflow();
        index
    }

    /// Remove a waypoint, or the last one when `index` is `None` or past the
    /// end. Returns `None` on an empty plan.
    pub fn remove_waypoint(&mut self, index: Option<usize>) -> Option<Waypoint> {
        let len = self.waypoints.len();
        if len == 0 {
            return None;
        }
        let index = match index {
            Some(index) if index < len => index,
            _ => len - 1,
        };
        let waypoint = self.waypoints.remove(index);

        if index == 0 && waypoint.is_airport() && self.has_origin {
            self.has_origin = false;
            self.departure_start = 0;
        } else if index == len - 1 && len > 1 && waypoint.is_airport() && self.has_destination {
            self.has_destination = false;
        }

        for boundary in [
            &mut self.departure_start,
            &mut self.enroute_start,
            &mut self.arrival_start,
            &mut self.approach_start,
        ] {
            if *boundary > index {
                *boundary -= 1;
            }
        }

        if index < self.active_waypoint_index {
            self.active_waypoint_index -= 1;
        }
        match self.direct_to.in_plan_target() {
            Some(target) if index < target => self.direct_to.waypoint_index -= 1,
            Some(target) if index == target => self.direct_to.cancel(),
            _ => {}
        }

        self.normalize();
        self.reflow();
        Some(waypoint)
    }

    /// Replace the origin airport. Departure selections are cleared.
    pub fn set_origin(&mut self, airport: Waypoint) -> Result<(), PlanError> {
        if !airport.is_airport() {
            return Err(PlanError::NotAnAirport(airport.ident));
        }
        self.procedure_details.clear_departure();
        if self.has_origin {
            self.remove_waypoint(Some(0));
        }
        self.add_waypoint(airport, Some(0));
        Ok(())
    }

    /// Replace the destination airport. Arrival and approach selections are
    /// cleared. The plan must already hold at least one waypoint.
    pub fn set_destination(&mut self, airport: Waypoint) -> Result<(), PlanError> {
        if !airport.is_airport() {
            return Err(PlanError::NotAnAirport(airport.ident));
        }
        self.procedure_details.clear_arrival_and_approach();
        if self.has_destination {
            self.remove_waypoint(None);
        }
        if self.waypoints.is_empty() {
            return Err(PlanError::EmptyPlan);
        }
        self.add_waypoint(airport, None);
        Ok(())
    }

    pub fn add_discontinuity(&mut self, index: Option<usize>) {
        self.add_waypoint(Waypoint::discontinuity(), index);
    }

    pub fn add_vectors(&mut self, index: Option<usize>) {
        self.add_waypoint(Waypoint::vectors(), index);
    }

    /// Add a fix defined by bearing and distance from a reference waypoint.
    ///
    /// # Arguments
    /// * `bearing` - Degrees true from the reference
    /// * `distance` - NM from the reference
    /// * `reference` - Positioned waypoint the fix is measured from
    /// * `index` - Insertion index, `None` to append
    pub fn add_bearing_and_distance(
        &mut self,
        bearing: f64,
        distance: f64,
        reference: &Waypoint,
        index: Option<usize>,
    ) -> Result<(), PlanError> {
        let reference_fix = reference
            .as_fix_reference()
            .ok_or_else(|| PlanError::UnpositionedReference(reference.ident.clone()))?;
        let coordinates =
            bearing_distance_to_coordinates(reference_fix.coordinates, bearing, distance);
        let ident = format!(
            "{}{:03}{}",
            reference_fix.ident,
            normalize_heading(bearing).trunc() as i64,
            distance.trunc() as i64
        );

        let info = WaypointInfo::BearingDistance(BearingDistanceInfo {
            bearing,
            distance,
            reference_fix,
            coordinates,
        });
        self.add_waypoint(Waypoint::new(ident, info), index);
        Ok(())
    }

    pub fn add_altitude_turn(
        &mut self,
        altitude: f64,
        inbound_track: Option<f64>,
        outbound_track: Option<f64>,
        index: Option<usize>,
    ) {
        let info = WaypointInfo::AltitudeTurn(AltitudeTurnInfo {
            altitude,
            inbound_track,
            outbound_track,
        });
        self.add_waypoint(Waypoint::new("", info), index);
    }

    /// Add a radius (NM) about a positioned reference fix.
    pub fn add_radius(
        &mut self,
        radius: f64,
        reference: &Waypoint,
        index: Option<usize>,
    ) -> Result<(), PlanError> {
        let reference_fix = reference
            .as_fix_reference()
            .ok_or_else(|| PlanError::UnpositionedReference(reference.ident.clone()))?;

        let info = WaypointInfo::RadiusFix(RadiusFixInfo {
            radius,
            reference_fix,
        });
        self.add_waypoint(Waypoint::new("", info), index);
        Ok(())
    }

    /// Recompute bearing, leg distance and cumulative distance for every
    /// waypoint.
    pub fn reflow(&mut self) {
        let len = self.waypoints.len();
        let approach_anchor = self.procedure_details.approach_selected() && len >= 3;
        let mut cumulative = 0.0;

        for i in 0..len {
            if i == 0 {
                self.waypoints[0].clear_leg_data();
                continue;
            }

            // The final approach leg ends at the destination, not at whatever
            // marker closes the approach.
            let target = if approach_anchor && i == len - 2 {
                self.waypoints[len - 1].coordinates()
            } else {
                self.waypoints[i].coordinates()
            };
            let previous = if approach_anchor && i == len - 1 {
                self.position_at_or_before(len - 3)
            } else {
                self.position_at_or_before(i - 1)
            };

            let (bearing, distance) = match (previous, target) {
                (Some(from), Some(to)) => {
                    (great_circle_heading(from, to), great_circle_distance(from, to))
                }
                _ => (0.0, 0.0),
            };
            cumulative += distance;

            let waypoint = &mut self.waypoints[i];
            waypoint.bearing_in_fp = bearing;
            waypoint.distance_in_fp = distance;
            waypoint.cumulative_distance_in_fp = cumulative;
        }
    }

    fn position_at_or_before(&self, index: usize) -> Option<LatLon> {
        self.waypoints[..=index]
            .iter()
            .rev()
            .find_map(Waypoint::coordinates)
    }

    /// Reset to the empty plan. Calling it again changes nothing.
    pub fn clear_plan(&mut self) {
        *self = Self::default();
    }

    pub fn copy(&self) -> FlightPlan {
        self.clone()
    }

    /// Reverse the waypoint order.
    ///
    /// Segment starts are rebuilt from waypoint kinds: a leading airport is
    /// the origin, a trailing airport the destination, everything in between
    /// is enroute. Procedure selections no longer apply and are cleared.
    pub fn reverse(&mut self) {
        self.waypoints.reverse();
        let len = self.waypoints.len();

        self.procedure_details = ProcedureDetails::default();
        self.has_origin = self.waypoints.first().is_some_and(Waypoint::is_airport);
        self.has_destination = len > 1 && self.waypoints.last().is_some_and(Waypoint::is_airport);

        self.departure_start = usize::from(self.has_origin);
        self.enroute_start = self.departure_start;
        self.arrival_start = (len - usize::from(self.has_destination)).max(self.enroute_start);
        self.approach_start = self.arrival_start;

        if len > 0 {
            self.active_waypoint_index = (len - self.active_waypoint_index).min(len - 1);
        }
        if let Some(target) = self.direct_to.in_plan_target() {
            self.direct_to.waypoint_index = len.saturating_sub(target + 1);
        }

        self.normalize();
        self.reflow();
    }

    /// Serialization-safe snapshot of the whole plan.
    pub fn copy_sanitized(&self) -> Result<serde_json::Value, PlanError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Rebuild a plan from `copy_sanitized` output.
    pub fn from_sanitized(value: serde_json::Value) -> Result<FlightPlan, PlanError> {
        Ok(serde_json::from_value(value)?)
    }

    fn shift_indexes_up(&mut self, index: usize, was_empty: bool) {
        if !was_empty && index <= self.active_waypoint_index {
            self.active_waypoint_index += 1;
        }
        if matches!(self.direct_to.in_plan_target(), Some(target) if index <= target) {
            self.direct_to.waypoint_index += 1;
        }
    }

    /// Restore ordering and range invariants after an edit.
    fn normalize(&mut self) {
        let len = self.waypoints.len();

        if !self.waypoints.first().is_some_and(Waypoint::is_airport) {
            self.has_origin = false;
        }
        if len < 2 || !self.waypoints.last().is_some_and(Waypoint::is_airport) {
            self.has_destination = false;
        }

        // origin and destination stay outside every segment
        let limit = len - usize::from(self.has_destination);
        self.departure_start = self
            .departure_start
            .max(usize::from(self.has_origin))
            .min(limit);
        self.enroute_start = self.enroute_start.clamp(self.departure_start, limit);
        self.arrival_start = self.arrival_start.clamp(self.enroute_start, limit);
        self.approach_start = self.approach_start.clamp(self.arrival_start, limit);

        self.active_waypoint_index = self.active_waypoint_index.min(len.saturating_sub(1));
        if matches!(self.direct_to.in_plan_target(), Some(target) if target >= len) {
            self.direct_to.cancel();
        }
    }
}
