//! Procedure assembly.
//!
//! Rebuilds the departure, arrival or approach segment of a plan from the
//! procedures selected in its `ProcedureDetails`, and resolves airports and
//! fixes by ICAO.

use crate::error::PlanError;
use crate::facility::{resolve_waypoint, FacilityLoader};
use crate::flight_plan::{FlightPlan, ProcedureDetails, SegmentType};
use crate::legs::LegsProcedure;
use crate::procedures::ProcedureLeg;
use crate::waypoint::{AirportInfo, Waypoint};

impl FlightPlan {
    /// Replace the departure segment with the selected departure.
    ///
    /// Legs are flown from the origin: runway transition, common legs, then
    /// the enroute transition.
    pub async fn build_departure<L>(&mut self, loader: &L) -> Result<(), PlanError>
    where
        L: FacilityLoader + ?Sized,
    {
        let origin = self.origin().cloned().ok_or(PlanError::NoOrigin)?;
        let legs = departure_legs(airport_info(&origin)?, self.procedure_details())?;
        self.rebuild_segment(SegmentType::Departure, legs, origin, loader)
            .await
    }

    /// Replace the arrival segment with the selected arrival.
    ///
    /// Legs are flown from the destination: enroute transition, common legs,
    /// then the runway transition.
    pub async fn build_arrival<L>(&mut self, loader: &L) -> Result<(), PlanError>
    where
        L: FacilityLoader + ?Sized,
    {
        let destination = self.destination().cloned().ok_or(PlanError::NoDestination)?;
        let legs = arrival_legs(airport_info(&destination)?, self.procedure_details())?;
        self.rebuild_segment(SegmentType::Arrival, legs, destination, loader)
            .await
    }

    /// Replace the approach segment with the selected approach: transition
    /// legs, then final legs.
    pub async fn build_approach<L>(&mut self, loader: &L) -> Result<(), PlanError>
    where
        L: FacilityLoader + ?Sized,
    {
        let destination = self.destination().cloned().ok_or(PlanError::NoDestination)?;
        let legs = approach_legs(airport_info(&destination)?, self.procedure_details())?;
        self.rebuild_segment(SegmentType::Approach, legs, destination, loader)
            .await
    }

    /// Resolve an airport and make it the origin.
    pub async fn set_origin_by_icao<L>(&mut self, loader: &L, icao: &str) -> Result<(), PlanError>
    where
        L: FacilityLoader + ?Sized,
    {
        let airport = resolve_waypoint(loader, icao).await?;
        let ident = airport.ident.clone();
        self.set_origin(airport)?;
        tracing::info!(origin = %ident, "origin set");
        Ok(())
    }

    /// Resolve an airport and make it the destination.
    pub async fn set_destination_by_icao<L>(
        &mut self,
        loader: &L,
        icao: &str,
    ) -> Result<(), PlanError>
    where
        L: FacilityLoader + ?Sized,
    {
        let airport = resolve_waypoint(loader, icao).await?;
        let ident = airport.ident.clone();
        self.set_destination(airport)?;
        tracing::info!(destination = %ident, "destination set");
        Ok(())
    }

    /// Resolve any facility and insert it with `add_waypoint` rules.
    pub async fn add_waypoint_by_icao<L>(
        &mut self,
        loader: &L,
        icao: &str,
        index: Option<usize>,
    ) -> Result<(), PlanError>
    where
        L: FacilityLoader + ?Sized,
    {
        let waypoint = resolve_waypoint(loader, icao).await?;
        self.add_waypoint(waypoint, index);
        Ok(())
    }

    /// Clear a segment, then insert decoded waypoints at successive indices
    /// from its start. A failed decode leaves the segment partially rebuilt.
    async fn rebuild_segment<L>(
        &mut self,
        segment: SegmentType,
        legs: Vec<ProcedureLeg>,
        anchor: Waypoint,
        loader: &L,
    ) -> Result<(), PlanError>
    where
        L: FacilityLoader + ?Sized,
    {
        let (start, end) = self.segment_bounds(segment);
        for _ in start..end {
            self.remove_waypoint(Some(start));
        }

        let leg_count = legs.len();
        let mut procedure = LegsProcedure::new(legs, anchor, loader);
        let mut index = start;
        while procedure.has_next() {
            if let Some(waypoint) = procedure.next_waypoint().await? {
                index = self.add_waypoint_to_segment(segment, waypoint, index) + 1;
            }
        }
        // reflow even when nothing was removed or inserted
        self.reflow();

        tracing::info!(
            segment = %segment,
            removed = end - start,
            legs = leg_count,
            inserted = index - start,
            "procedure segment rebuilt"
        );
        Ok(())
    }
}

fn airport_info(anchor: &Waypoint) -> Result<&AirportInfo, PlanError> {
    anchor
        .airport_info()
        .ok_or_else(|| PlanError::NotAnAirport(anchor.ident.clone()))
}

fn select<'a, T>(items: &'a [T], index: usize, group: &'static str) -> Result<&'a T, PlanError> {
    items
        .get(index)
        .ok_or(PlanError::ProcedureIndex { group, index })
}

fn departure_legs(
    airport: &AirportInfo,
    details: &ProcedureDetails,
) -> Result<Vec<ProcedureLeg>, PlanError> {
    let Some(departure_index) = details.departure_index else {
        return Ok(Vec::new());
    };
    let departure = select(&airport.departures, departure_index, "departure")?;

    let mut legs = Vec::new();
    if let Some(index) = details.departure_runway_index {
        let runway = select(&departure.runway_transitions, index, "departure runway")?;
        legs.extend_from_slice(&runway.legs);
    }
    legs.extend_from_slice(&departure.common_legs);
    if let Some(index) = details.departure_transition_index {
        let transition = select(&departure.en_route_transitions, index, "departure transition")?;
        legs.extend_from_slice(&transition.legs);
    }
    Ok(legs)
}

fn arrival_legs(
    airport: &AirportInfo,
    details: &ProcedureDetails,
) -> Result<Vec<ProcedureLeg>, PlanError> {
    let Some(arrival_index) = details.arrival_index else {
        return Ok(Vec::new());
    };
    let arrival = select(&airport.arrivals, arrival_index, "arrival")?;

    let mut legs = Vec::new();
    if let Some(index) = details.arrival_transition_index {
        let transition = select(&arrival.en_route_transitions, index, "arrival transition")?;
        legs.extend_from_slice(&transition.legs);
    }
    legs.extend_from_slice(&arrival.common_legs);
    if let Some(index) = details.arrival_runway_index {
        let runway = select(&arrival.runway_transitions, index, "arrival runway")?;
        legs.extend_from_slice(&runway.legs);
    }
    Ok(legs)
}

fn approach_legs(
    airport: &AirportInfo,
    details: &ProcedureDetails,
) -> Result<Vec<ProcedureLeg>, PlanError> {
    let Some(approach_index) = details.approach_index else {
        return Ok(Vec::new());
    };
    let approach = select(&airport.approaches, approach_index, "approach")?;

    let mut legs = Vec::new();
    if let Some(index) = details.approach_transition_index {
        let transition = select(&approach.transitions, index, "approach transition")?;
        legs.extend_from_slice(&transition.legs);
    }
    legs.extend_from_slice(&approach.final_legs);
    Ok(legs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::InMemoryFacilities;
    use crate::geodesy::{great_circle_distance, LatLon};
    use crate::procedures::{
        Approach, ApproachTransition, Arrival, Departure, EnrouteTransition, LegType,
        RunwayTransition,
    };

    fn tagged(leg_type: LegType, tag: &str) -> ProcedureLeg {
        let mut leg = ProcedureLeg::new(leg_type);
        leg.fix_icao = tag.to_string();
        leg
    }

    fn tags(legs: &[ProcedureLeg]) -> Vec<&str> {
        legs.iter().map(|leg| leg.fix_icao.as_str()).collect()
    }

    fn catalog() -> AirportInfo {
        let mut airport = AirportInfo::new(LatLon::new(40.64, -73.78));
        airport.departures.push(Departure {
            name: "DEEZZ5".to_string(),
            runway_transitions: vec![RunwayTransition {
                runway_number: 4,
                runway_designation: 1,
                legs: vec![tagged(LegType::InitialFix, "rw1"), tagged(LegType::TrackToFix, "rw2")],
                name: "RW4L".to_string(),
            }],
            common_legs: vec![tagged(LegType::TrackToFix, "common")],
            en_route_transitions: vec![EnrouteTransition {
                name: "CANDR".to_string(),
                legs: vec![tagged(LegType::TrackToFix, "enroute")],
            }],
        });
        airport.arrivals.push(Arrival {
            name: "PARCH3".to_string(),
            runway_transitions: vec![RunwayTransition {
                runway_number: 31,
                runway_designation: 0,
                legs: vec![tagged(LegType::TrackToFix, "runway")],
                name: "RW31".to_string(),
            }],
            common_legs: vec![tagged(LegType::TrackToFix, "common")],
            en_route_transitions: vec![EnrouteTransition {
                name: "CCC".to_string(),
                legs: vec![tagged(LegType::InitialFix, "enroute")],
            }],
        });
        airport.approaches.push(Approach {
            name: "ILS 04L".to_string(),
            runway: "04L".to_string(),
            transitions: vec![ApproachTransition {
                name: "ZALPO".to_string(),
                legs: vec![tagged(LegType::InitialFix, "transition")],
            }],
            final_legs: vec![tagged(LegType::TrackToFix, "final")],
        });
        airport
    }

    #[test]
    fn departure_leg_order() {
        let details = ProcedureDetails {
            departure_index: Some(0),
            departure_runway_index: Some(0),
            departure_transition_index: Some(0),
            ..Default::default()
        };
        let legs = departure_legs(&catalog(), &details).unwrap();
        assert_eq!(tags(&legs), vec!["rw1", "rw2", "common", "enroute"]);
    }

    #[test]
    fn arrival_leg_order_is_mirrored() {
        let details = ProcedureDetails {
            arrival_index: Some(0),
            arrival_transition_index: Some(0),
            arrival_runway_index: Some(0),
            ..Default::default()
        };
        let legs = arrival_legs(&catalog(), &details).unwrap();
        assert_eq!(tags(&legs), vec!["enroute", "common", "runway"]);
    }

    #[test]
    fn approach_transition_precedes_final_legs() {
        let details = ProcedureDetails {
            approach_index: Some(0),
            approach_transition_index: Some(0),
            ..Default::default()
        };
        let legs = approach_legs(&catalog(), &details).unwrap();
        assert_eq!(tags(&legs), vec!["transition", "final"]);
    }

    #[test]
    fn unselected_groups_are_omitted() {
        let airport = catalog();
        let details = ProcedureDetails {
            departure_index: Some(0),
            approach_index: Some(0),
            ..Default::default()
        };
        assert_eq!(tags(&departure_legs(&airport, &details).unwrap()), vec!["common"]);
        assert_eq!(tags(&approach_legs(&airport, &details).unwrap()), vec!["final"]);
        assert!(arrival_legs(&airport, &details).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_selection_is_reported() {
        let details = ProcedureDetails {
            arrival_index: Some(0),
            arrival_runway_index: Some(3),
            ..Default::default()
        };
        let err = arrival_legs(&catalog(), &details).unwrap_err();
        assert!(matches!(
            err,
            PlanError::ProcedureIndex { group: "arrival runway", index: 3 }
        ));
    }

    #[tokio::test]
    async fn empty_approach_build_measures_to_destination() {
        let merit = LatLon::new(41.38, -73.14);
        let kbos = LatLon::new(42.36, -71.01);
        let mut destination = AirportInfo::new(kbos);
        destination.approaches.push(Approach {
            name: "VOR 04R".to_string(),
            runway: "04R".to_string(),
            transitions: Vec::new(),
            final_legs: vec![ProcedureLeg::new(LegType::CourseToAltitude)],
        });

        let mut plan = FlightPlan::new();
        plan.add_waypoint(Waypoint::airport("KJFK", AirportInfo::new(LatLon::new(40.64, -73.78))), None);
        plan.add_waypoint(Waypoint::airport("KBOS", destination), None);
        plan.add_waypoint_to_segment(SegmentType::Enroute, Waypoint::intersection("MERIT", merit), 1);
        plan.add_vectors(Some(2));
        assert_eq!(plan.waypoints()[2].distance_in_fp, 0.0);

        plan.update_procedure_details(|d| d.approach_index = Some(0));
        plan.build_approach(&InMemoryFacilities::new()).await.unwrap();

        assert_eq!(plan.len(), 4);
        let expected = great_circle_distance(merit, kbos);
        assert!((plan.waypoints()[2].distance_in_fp - expected).abs() < 1e-9);
        assert!((plan.waypoints()[3].distance_in_fp - expected).abs() < 1e-9);
    }
}
