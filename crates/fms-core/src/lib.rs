pub mod assembly;
pub mod error;
pub mod facility;
pub mod flight_plan;
pub mod geodesy;
pub mod legs;
pub mod mirror;
pub mod procedures;
pub mod waypoint;

pub use error::{LookupError, MirrorError, PlanError};
pub use facility::{
    format_icao, icao_ident, icao_kind, resolve_waypoint, FacilityLoader, FacilityRecord,
    InMemoryFacilities, TimeoutLoader,
};
pub use flight_plan::{DirectTo, FlightPlan, FlightPlanSegment, ProcedureDetails, SegmentType};
pub use geodesy::{great_circle_distance, great_circle_heading, LatLon};
pub use legs::LegsProcedure;
pub use mirror::{MirroredWaypoint, PlanMirror, RecordingMirror};
pub use procedures::{
    Approach, ApproachTransition, Arrival, Departure, EnrouteTransition, LegType, OneWayRunway,
    ProcedureLeg, RunwayRecord, RunwayTransition,
};
pub use waypoint::{AirportInfo, Waypoint, WaypointInfo, WaypointKind};
