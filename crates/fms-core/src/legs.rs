//! Procedure leg decoding.
//!
//! Turns the abstract legs of a published procedure into concrete waypoints,
//! one at a time, starting from a reference waypoint (usually the origin or
//! destination airport).

use crate::error::PlanError;
use crate::facility::{icao_ident, FacilityLoader, FacilityRecord};
use crate::geodesy::{
    bearing_distance_to_coordinates, course_intersection, distance_along_course_to_range,
    great_circle_distance, meters_to_nm, LatLon,
};
use crate::procedures::{LegType, ProcedureLeg};
use crate::waypoint::Waypoint;

/// Lazy decoder over a list of procedure legs.
///
/// Each decoded waypoint becomes the previous fix for the next leg. Legs of
/// unsupported types are skipped. To restart, build a new decoder.
pub struct LegsProcedure<'a, L: ?Sized> {
    legs: Vec<ProcedureLeg>,
    previous_fix: Waypoint,
    current_index: usize,
    loader: &'a L,
}

impl<'a, L> LegsProcedure<'a, L>
where
    L: FacilityLoader + ?Sized,
{
    /// # Arguments
    /// * `legs` - Procedure legs in flying order
    /// * `starting_point` - Fix the first leg is flown from
    /// * `loader` - Facility lookup used for fixes and leg origins
    pub fn new(legs: Vec<ProcedureLeg>, starting_point: Waypoint, loader: &'a L) -> Self {
        Self {
            legs,
            previous_fix: starting_point,
            current_index: 0,
            loader,
        }
    }

    /// Whether any legs remain. Trailing unsupported legs count, so
    /// `next_waypoint` may still return `None` after this says `true`.
    pub fn has_next(&self) -> bool {
        self.current_index < self.legs.len()
    }

    /// Decode the next supported leg into a waypoint.
    pub async fn next_waypoint(&mut self) -> Result<Option<Waypoint>, PlanError> {
        while self.current_index < self.legs.len() {
            let index = self.current_index;
            self.current_index += 1;

            let leg = &self.legs[index];
            let mapped = match leg.leg_type {
                LegType::CourseToDme => Some(self.map_heading_until_distance_from_origin(leg).await?),
                LegType::CourseToFix => Some(self.map_origin_radial_for_distance(leg).await?),
                LegType::CourseToIntercept => match self.legs.get(index + 1) {
                    Some(next_leg) => Some(self.map_heading_to_intercept(leg, next_leg).await?),
                    None => {
                        tracing::warn!(course = leg.course, "intercept leg has no leg to intercept, skipping");
                        None
                    }
                },
                LegType::FixForDistance => Some(self.map_bearing_and_distance_from_origin(leg).await?),
                LegType::InitialFix | LegType::RadiusToFix | LegType::TrackToFix => {
                    Some(self.map_exact_fix(leg).await?)
                }
                other => {
                    tracing::debug!(leg_type = other.code(), "skipping unsupported leg");
                    None
                }
            };

            if let Some(waypoint) = mapped {
                self.previous_fix = waypoint.clone();
                return Ok(Some(waypoint));
            }
        }

        Ok(None)
    }

    fn previous_position(&self) -> Result<LatLon, PlanError> {
        self.previous_fix
            .coordinates()
            .ok_or_else(|| PlanError::UnpositionedReference(self.previous_fix.ident.clone()))
    }

    async fn origin(&self, leg: &ProcedureLeg) -> Result<FacilityRecord, PlanError> {
        Ok(self.loader.get_facility(&leg.origin_icao).await?)
    }

    /// CD: fly the course until the range to the origin reaches the leg distance.
    async fn map_heading_until_distance_from_origin(
        &self,
        leg: &ProcedureLeg,
    ) -> Result<Waypoint, PlanError> {
        let origin = self.origin(leg).await?;
        let from = self.previous_position()?;

        let range_nm = meters_to_nm(leg.distance);
        let leg_distance =
            distance_along_course_to_range(from, leg.course, origin.coordinates(), range_nm);
        let coordinates = bearing_distance_to_coordinates(from, leg.course, leg_distance);

        Ok(Waypoint::intersection(
            format!("{}{}", origin.ident(), range_nm.trunc() as i64),
            coordinates,
        ))
    }

    /// FC: project from the origin facility itself.
    async fn map_bearing_and_distance_from_origin(
        &self,
        leg: &ProcedureLeg,
    ) -> Result<Waypoint, PlanError> {
        let origin = self.origin(leg).await?;
        let distance_nm = meters_to_nm(leg.distance);
        let coordinates =
            bearing_distance_to_coordinates(origin.coordinates(), leg.course, distance_nm);

        Ok(Waypoint::intersection(
            format!("{}{}", origin.ident(), distance_nm.trunc() as i64),
            coordinates,
        ))
    }

    /// CF: an explicit fix wins; otherwise project from the previous fix.
    async fn map_origin_radial_for_distance(
        &self,
        leg: &ProcedureLeg,
    ) -> Result<Waypoint, PlanError> {
        if leg.has_fix() {
            return self.map_exact_fix(leg).await;
        }

        let origin = self.origin(leg).await?;
        let from = self.previous_position()?;
        let coordinates =
            bearing_distance_to_coordinates(from, leg.course, meters_to_nm(leg.distance));
        let distance_from_origin = great_circle_distance(origin.coordinates(), coordinates);

        Ok(Waypoint::intersection(
            format!("{}{}", origin.ident(), distance_from_origin.trunc() as i64),
            coordinates,
        ))
    }

    /// CI: fly the course until it meets the next leg's course through its origin.
    async fn map_heading_to_intercept(
        &self,
        leg: &ProcedureLeg,
        next_leg: &ProcedureLeg,
    ) -> Result<Waypoint, PlanError> {
        let next_origin = self.origin(next_leg).await?;
        let from = self.previous_position()?;

        let coordinates = match course_intersection(
            from,
            leg.course,
            next_origin.coordinates(),
            next_leg.course,
        ) {
            Some(distance) => bearing_distance_to_coordinates(from, leg.course, distance),
            None => {
                tracing::warn!(
                    course = leg.course,
                    next_course = next_leg.course,
                    "intercept courses never meet, holding previous fix position"
                );
                from
            }
        };

        Ok(Waypoint::intersection(
            format!("T{}{}", leg.course, next_origin.ident()),
            coordinates,
        ))
    }

    /// IF/RF/TF: resolve the fix, falling back to theta/rho from the origin.
    async fn map_exact_fix(&self, leg: &ProcedureLeg) -> Result<Waypoint, PlanError> {
        if leg.has_fix() {
            match self.loader.get_facility(&leg.fix_icao).await {
                Ok(facility) => return Ok(Waypoint::from_facility(facility)),
                Err(err) => {
                    tracing::debug!(
                        fix = icao_ident(&leg.fix_icao),
                        error = %err,
                        "fix lookup failed, using theta/rho from origin"
                    );
                }
            }
        }

        let origin = self.origin(leg).await?;
        let rho_nm = meters_to_nm(leg.rho);
        let coordinates = bearing_distance_to_coordinates(origin.coordinates(), leg.theta, rho_nm);

        Ok(Waypoint::intersection(
            format!("{}{}", origin.ident(), rho_nm.trunc() as i64),
            coordinates,
        ))
    }
}
