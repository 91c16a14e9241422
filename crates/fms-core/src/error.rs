//! Error types for facility lookup, plan building and simulator sync.

/// A facility could not be resolved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("facility not found: {0}")]
    NotFound(String),

    #[error("facility lookup for {icao} timed out after {timeout_ms}ms")]
    Timeout { icao: String, timeout_ms: u64 },

    #[error("facility lookup failed: {0}")]
    Backend(String),
}

/// Errors raised while building or exchanging a flight plan.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("flight plan has no origin airport")]
    NoOrigin,

    #[error("flight plan has no destination airport")]
    NoDestination,

    #[error("flight plan is empty")]
    EmptyPlan,

    #[error("{group} index {index} is out of range")]
    ProcedureIndex { group: &'static str, index: usize },

    #[error("waypoint {0} has no coordinates to reference")]
    UnpositionedReference(String),

    #[error("{0} is not an airport")]
    NotAnAirport(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The simulator refused a mirror update.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MirrorError {
    #[error("simulator rejected {operation}: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },
}
