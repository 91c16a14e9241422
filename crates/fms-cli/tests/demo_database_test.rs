//! Builds a full plan against the bundled demo facility database.

use fms_cli::report;
use fms_core::{format_icao, resolve_waypoint, FlightPlan, InMemoryFacilities, SegmentType};

const DEMO_DATABASE: &str = include_str!("../../../demos/facilities.json");

/// Every procedure in the demo database decodes into the expected route.
#[tokio::test]
async fn test_demo_database_builds_full_route() {
    let facilities = InMemoryFacilities::from_json(DEMO_DATABASE).unwrap();
    let mut plan = FlightPlan::new();

    plan.set_origin_by_icao(&facilities, &format_icao('A', "", "", "KJFK"))
        .await
        .unwrap();
    plan.set_destination_by_icao(&facilities, &format_icao('A', "", "", "KBOS"))
        .await
        .unwrap();
    let put = resolve_waypoint(&facilities, &format_icao('V', "K6", "", "PUT"))
        .await
        .unwrap();
    let at = plan.arrival_start();
    plan.add_waypoint_to_segment(SegmentType::Enroute, put, at);

    plan.update_procedure_details(|d| {
        d.departure_index = Some(0);
        d.departure_runway_index = Some(0);
        d.departure_transition_index = Some(0);
        d.arrival_index = Some(0);
        d.arrival_runway_index = Some(0);
        d.approach_index = Some(0);
        d.approach_transition_index = Some(0);
    });

    plan.build_departure(&facilities).await.unwrap();
    plan.build_arrival(&facilities).await.unwrap();
    plan.build_approach(&facilities).await.unwrap();

    let idents: Vec<&str> = plan.waypoints().iter().map(|w| w.ident.as_str()).collect();
    assert_eq!(
        idents,
        vec!["KJFK", "JFK3", "DEEZZ", "CANDR", "MERIT", "PUT", "ROBUC", "BOS5", "JOBEE", "BOSOX", "KBOS"]
    );
    assert_eq!(plan.enroute_start(), 5);
    assert_eq!(plan.arrival_start(), 6);
    assert_eq!(plan.approach_start(), 8);

    let table = report::render_table(&plan);
    assert!(table.contains("approach"));
    assert!(table.lines().last().unwrap().starts_with("11 waypoints"));
}

/// The demo airports carry sorted one-way runway ends.
#[tokio::test]
async fn test_demo_airports_split_runways() {
    let facilities = InMemoryFacilities::from_json(DEMO_DATABASE).unwrap();
    let kjfk = resolve_waypoint(&facilities, &format_icao('A', "", "", "KJFK"))
        .await
        .unwrap();

    let runways: Vec<&str> = kjfk
        .airport_info()
        .unwrap()
        .one_way_runways
        .iter()
        .map(|runway| runway.designation.as_str())
        .collect();
    assert_eq!(runways, vec!["04L", "13R", "22R", "31L"]);
}
