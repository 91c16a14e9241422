//! Plain-text and JSON rendering of a flight plan.

use fms_core::{FlightPlan, PlanError};
use std::fmt::Write;

/// Where a waypoint sits in the plan: `origin`, `destination`, or its segment.
pub fn segment_label(plan: &FlightPlan, index: usize) -> &'static str {
    if plan.has_origin() && index == 0 {
        return "origin";
    }
    if plan.has_destination() && index + 1 == plan.len() {
        return "destination";
    }
    plan.segment_of(index).map_or("-", |segment| segment.name())
}

/// Waypoint table with leg and cumulative distances.
pub fn render_table(plan: &FlightPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<11}  {:<8}  {:<4}  {:>7}  {:>8}  {:>9}",
        "#", "SEGMENT", "IDENT", "KIND", "BRG", "LEG NM", "TOTAL NM"
    );

    for (index, waypoint) in plan.waypoints().iter().enumerate() {
        let marker = if index == plan.active_waypoint_index() { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker}{:>2}  {:<11}  {:<8}  {:<4}  {:>7.1}  {:>8.1}  {:>9.1}",
            index,
            segment_label(plan, index),
            waypoint.ident,
            waypoint.kind(),
            waypoint.bearing_in_fp,
            waypoint.distance_in_fp,
            waypoint.cumulative_distance_in_fp,
        );
    }

    let total = plan
        .waypoints()
        .last()
        .map_or(0.0, |waypoint| waypoint.cumulative_distance_in_fp);
    let _ = writeln!(out, "{} waypoints, {:.1} NM", plan.len(), total);
    out
}

/// Sanitized plan as pretty JSON.
pub fn render_json(plan: &FlightPlan) -> Result<String, PlanError> {
    let value = plan.copy_sanitized()?;
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fms_core::{format_icao, FacilityRecord, LatLon, SegmentType, Waypoint};

    fn plan() -> FlightPlan {
        let mut plan = FlightPlan::new();
        plan.add_waypoint(
            Waypoint::from_facility(FacilityRecord::new(format_icao('A', "", "", "KJFK"), 40.64, -73.78)),
            None,
        );
        plan.add_waypoint(
            Waypoint::from_facility(FacilityRecord::new(format_icao('A', "", "", "KBOS"), 42.36, -71.01)),
            None,
        );
        plan.add_waypoint_to_segment(
            SegmentType::Enroute,
            Waypoint::intersection("MERIT", LatLon::new(41.38, -73.14)),
            1,
        );
        plan
    }

    #[test]
    fn labels_origin_destination_and_segments() {
        let plan = plan();
        assert_eq!(segment_label(&plan, 0), "origin");
        assert_eq!(segment_label(&plan, 1), "enroute");
        assert_eq!(segment_label(&plan, 2), "destination");
        assert_eq!(segment_label(&plan, 9), "-");
    }

    #[test]
    fn table_lists_every_waypoint() {
        let table = render_table(&plan());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with('>'));
        assert!(lines[2].contains("MERIT"));
        assert!(lines[3].contains("destination"));
        assert!(lines[4].starts_with("3 waypoints"));
    }

    #[test]
    fn json_reconstructs() {
        let plan = plan();
        let json = render_json(&plan).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rebuilt = FlightPlan::from_sanitized(value).unwrap();

        assert_eq!(rebuilt.len(), 3);
        assert_eq!(rebuilt.enroute_start(), plan.enroute_start());
        assert!(rebuilt.has_destination());
    }
}
