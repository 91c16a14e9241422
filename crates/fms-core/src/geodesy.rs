//! Great-circle math for flight plan legs.
//!
//! Distances are nautical miles, angles are degrees true unless a name says
//! otherwise.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mean earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

pub const METERS_PER_NM: f64 = 1852.0;

const EPSILON: f64 = 1e-12;

/// A position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Convert a procedure distance in meters to nautical miles.
pub fn meters_to_nm(meters: f64) -> f64 {
    meters / METERS_PER_NM
}

/// Normalize a heading into `[0, 360)`.
pub fn normalize_heading(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Central angle between two positions in radians (haversine).
pub fn angular_distance(from: LatLon, to: LatLon) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let dphi = (to.lat - from.lat).to_radians();
    let dlambda = (to.lon - from.lon).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Great-circle distance between two positions in nautical miles.
pub fn great_circle_distance(from: LatLon, to: LatLon) -> f64 {
    angular_distance(from, to) * EARTH_RADIUS_NM
}

/// Initial great-circle course from `from` to `to` in radians, 0 = north,
/// π/2 = east, range (-π, π].
fn initial_course_rad(from: LatLon, to: LatLon) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let delta_lambda = (to.lon - from.lon).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y)
}

/// Initial great-circle heading from `from` to `to`, degrees in `[0, 360)`.
pub fn great_circle_heading(from: LatLon, to: LatLon) -> f64 {
    normalize_heading(initial_course_rad(from, to).to_degrees())
}

/// Project a position along a bearing for a distance.
///
/// # Arguments
/// * `from` - Starting position
/// * `bearing_deg` - Course in degrees true
/// * `distance_nm` - Distance in nautical miles
pub fn bearing_distance_to_coordinates(from: LatLon, bearing_deg: f64, distance_nm: f64) -> LatLon {
    if distance_nm.abs() <= f64::EPSILON {
        return from;
    }

    let lat1 = from.lat.to_radians();
    let lon1 = from.lon.to_radians();
    let bearing_rad = bearing_deg.to_radians();
    let angular_distance = distance_nm / EARTH_RADIUS_NM;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 = (lon2 + PI).rem_euclid(2.0 * PI) - PI;

    LatLon::new(lat2.to_degrees(), lon2.to_degrees())
}

fn wrap_pi(rad: f64) -> f64 {
    (rad + PI).rem_euclid(2.0 * PI) - PI
}

/// Distance from `p` along `course_p` to where it crosses the great circle
/// through `q` on `course_q`.
///
/// The great circle through `q` is followed in whichever direction meets the
/// course from `p` ahead of it. Returns `None` when the two tracks are the
/// same circle or do not cross within a quarter circle ahead of `p`.
pub fn course_intersection(p: LatLon, course_p: f64, q: LatLon, course_q: f64) -> Option<f64> {
    let delta12 = angular_distance(p, q);
    if delta12 < EPSILON {
        return Some(0.0);
    }

    let theta12 = initial_course_rad(p, q);
    let theta21 = initial_course_rad(q, p);
    let theta13 = course_p.to_radians();

    [course_q, course_q + 180.0].into_iter().find_map(|candidate| {
        let theta23 = candidate.to_radians();
        let alpha1 = wrap_pi(theta13 - theta12);
        let alpha2 = wrap_pi(theta21 - theta23);

        let (sin1, sin2) = (alpha1.sin(), alpha2.sin());
        if sin1.abs() < EPSILON && sin2.abs() < EPSILON {
            return None;
        }
        if sin1 * sin2 < 0.0 {
            return None;
        }

        let cos_alpha3 =
            -alpha1.cos() * alpha2.cos() + sin1 * sin2 * delta12.cos();
        let alpha3 = cos_alpha3.clamp(-1.0, 1.0).acos();
        let delta13 = (delta12.sin() * sin1 * sin2)
            .atan2(alpha2.cos() + alpha1.cos() * alpha3.cos());

        // the antipodal crossing is never a procedure intercept
        (0.0..PI / 2.0)
            .contains(&delta13)
            .then_some(delta13 * EARTH_RADIUS_NM)
    })
}

/// Distance along `course` from `from` at which the range to `center`
/// first equals `range_nm`.
///
/// Solves the spherical triangle `from`, `center`, target using the cosine
/// rule `cos R = cos d cos x + sin d sin x cos A`. Only crossings within
/// half a great circle ahead count. When there is none, the distance of
/// closest approach ahead is returned, which is 0 when the range is already
/// opening.
pub fn distance_along_course_to_range(
    from: LatLon,
    course: f64,
    center: LatLon,
    range_nm: f64,
) -> f64 {
    let d = angular_distance(from, center);
    let angle = initial_course_rad(from, center) - course.to_radians();
    let target = range_nm / EARTH_RADIUS_NM;

    let a = d.cos();
    let b = d.sin() * angle.cos();
    let magnitude = a.hypot(b);
    if magnitude < EPSILON {
        return 0.0;
    }

    let phase = b.atan2(a);
    let spread = (target.cos() / magnitude).clamp(-1.0, 1.0).acos();

    let crossing = [phase - spread, phase + spread]
        .into_iter()
        .map(|root| if root.abs() < EPSILON { 0.0 } else { root.rem_euclid(2.0 * PI) })
        .filter(|root| *root < PI)
        .fold(f64::INFINITY, f64::min);

    if crossing.is_finite() {
        crossing * EARTH_RADIUS_NM
    } else {
        // range is minimal at x = phase
        phase.max(0.0) * EARTH_RADIUS_NM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NM_PER_DEG: f64 = EARTH_RADIUS_NM * PI / 180.0;

    #[test]
    fn test_distance_one_degree_latitude() {
        let dist = great_circle_distance(LatLon::new(0.0, 0.0), LatLon::new(1.0, 0.0));
        assert!((dist - NM_PER_DEG).abs() < 1e-6);
        assert!((dist - 60.04).abs() < 0.01);
    }

    #[test]
    fn test_distance_same_point() {
        let p = LatLon::new(40.6413, -73.7781);
        assert!(great_circle_distance(p, p) < 1e-9);
    }

    #[test]
    fn heading_cardinal_directions() {
        let origin = LatLon::new(0.0, 0.0);
        assert!((great_circle_heading(origin, LatLon::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((great_circle_heading(origin, LatLon::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((great_circle_heading(origin, LatLon::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((great_circle_heading(origin, LatLon::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn projection_matches_distance_and_heading() {
        let start = LatLon::new(40.6413, -73.7781);
        let projected = bearing_distance_to_coordinates(start, 63.0, 25.0);

        assert!((great_circle_distance(start, projected) - 25.0).abs() < 1e-6);
        assert!((great_circle_heading(start, projected) - 63.0).abs() < 1e-6);
    }

    #[test]
    fn projection_wraps_antimeridian() {
        let projected = bearing_distance_to_coordinates(LatLon::new(0.0, 179.5), 90.0, NM_PER_DEG);
        assert!((projected.lon - -179.5).abs() < 1e-6);
    }

    #[test]
    fn intersection_of_east_course_and_meridian() {
        // East along the equator meets the meridian through (1, 1) at (0, 1).
        let p = LatLon::new(0.0, 0.0);
        let q = LatLon::new(1.0, 1.0);

        let dist = course_intersection(p, 90.0, q, 180.0).expect("tracks cross");
        assert!((dist - NM_PER_DEG).abs() < 1e-6);

        // Opposite direction along the same circle gives the same crossing.
        let reverse = course_intersection(p, 90.0, q, 0.0).expect("tracks cross");
        assert!((reverse - dist).abs() < 1e-9);
    }

    #[test]
    fn intersection_behind_is_rejected() {
        // Heading west from the origin never meets the meridian at lon 1 ahead.
        let p = LatLon::new(0.0, 0.0);
        let q = LatLon::new(1.0, 1.0);
        assert!(course_intersection(p, 270.0, q, 180.0).is_none());
    }

    #[test]
    fn range_from_center_outbound() {
        let center = LatLon::new(0.0, 0.0);
        let x = distance_along_course_to_range(center, 90.0, center, 10.0);
        assert!((x - 10.0).abs() < 1e-6);
    }

    #[test]
    fn range_inside_circle_flying_away() {
        let center = LatLon::new(0.0, 0.0);
        let start = LatLon::new(0.0, 0.5);
        let x = distance_along_course_to_range(start, 90.0, center, NM_PER_DEG);
        assert!((x - 0.5 * NM_PER_DEG).abs() < 1e-6);
    }

    #[test]
    fn range_outside_circle_takes_first_crossing() {
        let center = LatLon::new(0.0, 0.0);
        let start = LatLon::new(0.0, 2.0);
        let x = distance_along_course_to_range(start, 270.0, center, NM_PER_DEG);
        assert!((x - NM_PER_DEG).abs() < 1e-6);
    }

    #[test]
    fn range_outside_circle_flying_away_stays_put() {
        let center = LatLon::new(0.0, 0.0);
        let start = LatLon::new(0.0, 0.2);
        let x = distance_along_course_to_range(start, 90.0, center, 5.0);
        assert_eq!(x, 0.0);
    }

    #[test]
    fn range_never_reached_returns_closest_approach() {
        // Passing north of the center at 1 degree never gets within 10 NM.
        let center = LatLon::new(0.0, 0.0);
        let start = LatLon::new(1.0, -2.0);
        let x = distance_along_course_to_range(start, 90.0, center, 10.0);
        assert!((x - 2.0 * NM_PER_DEG).abs() < 0.5);
    }

    #[test]
    fn normalize_heading_wraps() {
        assert_eq!(normalize_heading(-90.0), 270.0);
        assert_eq!(normalize_heading(720.0), 0.0);
        assert!((normalize_heading(359.5) - 359.5).abs() < 1e-12);
    }
}
