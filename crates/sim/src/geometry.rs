use glam::DVec2;
use std::f64::consts::{PI, TAU};

/// Shortest signed equivalent of `angle`, in (-PI, PI].
pub fn normalize_relative_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a > PI {
        a - TAU
    } else {
        a
    }
}

/// Equivalent of `angle` in [0, 2*PI).
pub fn normalize_absolute_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid may round up to exactly TAU for tiny negative inputs
    if a >= TAU {
        0.0
    } else {
        a
    }
}

pub fn absolute_bearing(self_heading: f64, relative_bearing: f64) -> f64 {
    self_heading + relative_bearing
}

/// Signed component of a target's velocity perpendicular to the line of
/// sight. Positive means the target drifts clockwise around the observer.
pub fn lateral_velocity(target_velocity: f64, target_heading: f64, absolute_bearing: f64) -> f64 {
    target_velocity * (target_heading - absolute_bearing).sin()
}

/// Point reached by travelling `distance` from `origin` along compass
/// `heading` (0 = north, clockwise).
pub fn project(origin: DVec2, heading: f64, distance: f64) -> DVec2 {
    origin + DVec2::new(heading.sin(), heading.cos()) * distance
}

/// Compass heading from `from` to `to`.
pub fn bearing_to(from: DVec2, to: DVec2) -> f64 {
    let d = to - from;
    normalize_absolute_angle(f64::atan2(d.x, d.y))
}
