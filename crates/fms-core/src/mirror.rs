//! Outbound mirror of the plan into the simulator's own flight plan store.
//!
//! The mirror only ever receives state; nothing is read back from it.

use crate::error::MirrorError;
use crate::flight_plan::FlightPlan;
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Index-addressed waypoint store owned by the simulator.
#[async_trait]
pub trait PlanMirror: Send + Sync {
    async fn clear(&self) -> Result<(), MirrorError>;

    /// Insert a database facility at `index`.
    async fn add_waypoint_by_identifier(&self, icao: &str, index: usize) -> Result<(), MirrorError>;

    /// Insert a free position at `index`.
    async fn add_user_waypoint(
        &self,
        lat: f64,
        lon: f64,
        index: usize,
        ident: &str,
    ) -> Result<(), MirrorError>;

    async fn delete_waypoint(&self, index: usize) -> Result<(), MirrorError>;

    async fn set_active_waypoint(&self, index: usize) -> Result<(), MirrorError>;
}

impl FlightPlan {
    /// Push the whole plan to the mirror.
    ///
    /// Facilities go by ICAO, other positioned waypoints as user waypoints.
    /// Markers without a position have no mirror counterpart and are skipped,
    /// so the active index is remapped onto the mirror's numbering. Returns
    /// the number of mirrored waypoints.
    pub async fn sync_to_mirror<M>(&self, mirror: &M) -> Result<usize, MirrorError>
    where
        M: PlanMirror + ?Sized,
    {
        mirror.clear().await?;

        let mut mirrored = 0;
        let mut active = None;
        for (index, waypoint) in self.waypoints().iter().enumerate() {
            if index == self.active_waypoint_index() {
                active = Some(mirrored);
            }

            if let Some(icao) = waypoint.facility_icao() {
                mirror.add_waypoint_by_identifier(icao, mirrored).await?;
            } else if let Some(position) = waypoint.coordinates() {
                mirror
                    .add_user_waypoint(position.lat, position.lon, mirrored, &waypoint.ident)
                    .await?;
            } else {
                tracing::warn!(index, kind = %waypoint.kind(), "waypoint has no mirror form, skipping");
                continue;
            }
            mirrored += 1;
        }

        let active = active.unwrap_or(0).min(mirrored.saturating_sub(1));
        mirror.set_active_waypoint(active).await?;

        tracing::debug!(mirrored, active, "flight plan mirrored");
        Ok(mirrored)
    }
}

/// A waypoint as the mirror stores it.
#[derive(Debug, Clone, PartialEq)]
pub enum MirroredWaypoint {
    Facility { icao: String },
    User { lat: f64, lon: f64, ident: String },
}

#[derive(Debug, Default)]
struct MirrorState {
    waypoints: Vec<MirroredWaypoint>,
    active: usize,
}

/// In-memory mirror that records what it is sent.
#[derive(Debug, Default)]
pub struct RecordingMirror {
    state: Mutex<MirrorState>,
}

impl RecordingMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waypoints(&self) -> Vec<MirroredWaypoint> {
        self.lock().waypoints.clone()
    }

    pub fn active_waypoint(&self) -> usize {
        self.lock().active
    }

    fn lock(&self) -> MutexGuard<'_, MirrorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, index: usize, waypoint: MirroredWaypoint) {
        let mut state = self.lock();
        let index = index.min(state.waypoints.len());
        state.waypoints.insert(index, waypoint);
    }
}

#[async_trait]
impl PlanMirror for RecordingMirror {
    async fn clear(&self) -> Result<(), MirrorError> {
        let mut state = self.lock();
        state.waypoints.clear();
        state.active = 0;
        Ok(())
    }

    async fn add_waypoint_by_identifier(&self, icao: &str, index: usize) -> Result<(), MirrorError> {
        self.insert(
            index,
            MirroredWaypoint::Facility {
                icao: icao.to_string(),
            },
        );
        Ok(())
    }

    async fn add_user_waypoint(
        &self,
        lat: f64,
        lon: f64,
        index: usize,
        ident: &str,
    ) -> Result<(), MirrorError> {
        self.insert(
            index,
            MirroredWaypoint::User {
                lat,
                lon,
                ident: ident.to_string(),
            },
        );
        Ok(())
    }

    async fn delete_waypoint(&self, index: usize) -> Result<(), MirrorError> {
        let mut state = self.lock();
        if index >= state.waypoints.len() {
            return Err(MirrorError::Rejected {
                operation: "delete_waypoint",
                reason: format!("no waypoint at index {index}"),
            });
        }
        state.waypoints.remove(index);
        Ok(())
    }

    async fn set_active_waypoint(&self, index: usize) -> Result<(), MirrorError> {
        let mut state = self.lock();
        if index > 0 && index >= state.waypoints.len() {
            return Err(MirrorError::Rejected {
                operation: "set_active_waypoint",
                reason: format!("no waypoint at index {index}"),
            });
        }
        state.active = index;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::{format_icao, FacilityRecord};
    use crate::flight_plan::SegmentType;
    use crate::geodesy::LatLon;
    use crate::waypoint::Waypoint;

    fn sample_plan() -> FlightPlan {
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
            Waypoint::intersection("KJFK10", LatLon::new(40.8, -73.6)),
            1,
        );
        plan.add_vectors(Some(2));
        plan.add_waypoint_to_segment(
            SegmentType::Enroute,
            Waypoint::from_facility(FacilityRecord::new(format_icao('V', "K6", "", "PUT"), 41.96, -71.84)),
            3,
        );
        plan
    }

    #[tokio::test]
    async fn pushes_facilities_and_user_waypoints_in_order() {
        let plan = sample_plan();
        let mirror = RecordingMirror::new();

        let count = plan.sync_to_mirror(&mirror).await.unwrap();

        assert_eq!(count, 4);
        assert_eq!(
            mirror.waypoints(),
            vec![
                MirroredWaypoint::Facility { icao: "A      KJFK ".to_string() },
                MirroredWaypoint::User { lat: 40.8, lon: -73.6, ident: "KJFK10".to_string() },
                MirroredWaypoint::Facility { icao: "VK6    PUT  ".to_string() },
                MirroredWaypoint::Facility { icao: "A      KBOS ".to_string() },
            ]
        );
    }

    #[tokio::test]
    async fn active_index_skips_unmirrored_markers() {
        let mut plan = sample_plan();
        let mirror = RecordingMirror::new();

        // PUT sits behind the vectors marker in the plan.
        plan.set_active_waypoint_index(3);
        plan.sync_to_mirror(&mirror).await.unwrap();
        assert_eq!(mirror.active_waypoint(), 2);

        // An active marker maps to the next mirrored waypoint.
        plan.set_active_waypoint_index(2);
        plan.sync_to_mirror(&mirror).await.unwrap();
        assert_eq!(mirror.active_waypoint(), 2);
    }

    #[tokio::test]
    async fn resync_replaces_previous_state() {
        let mut plan = sample_plan();
        let mirror = RecordingMirror::new();
        plan.sync_to_mirror(&mirror).await.unwrap();

        plan.clear_plan();
        let count = plan.sync_to_mirror(&mirror).await.unwrap();

        assert_eq!(count, 0);
        assert!(mirror.waypoints().is_empty());
        assert_eq!(mirror.active_waypoint(), 0);
    }

    #[tokio::test]
    async fn recording_mirror_rejects_bad_delete() {
        let mirror = RecordingMirror::new();
        mirror.add_waypoint_by_identifier("A      KJFK ", 5).await.unwrap();
        assert_eq!(mirror.waypoints().len(), 1);

        assert!(mirror.delete_waypoint(1).await.is_err());
        mirror.delete_waypoint(0).await.unwrap();
        assert!(mirror.waypoints().is_empty());
    }
}
