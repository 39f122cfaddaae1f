//! Slice geometry for wheel renderers.
//!
//! Angles are in degrees, measured clockwise from the pointer. A slice's
//! arc here is exactly the arc [`compute_rotation`] aims for, so a renderer
//! drawing with these helpers always agrees with the engine about where a
//! spin lands.
//!
//! [`compute_rotation`]: crate::outcome::compute_rotation

use serde::{Deserialize, Serialize};

use crate::constants::FULL_TURN_DEGREES;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct SliceArc {
    pub start_degrees: f64,
    pub end_degrees: f64,
    pub mid_degrees: f64,
}

pub fn slice_angle(slice_count: usize) -> f64 {
    FULL_TURN_DEGREES / slice_count as f64
}

pub fn slice_arc(index: usize, slice_count: usize) -> SliceArc {
    let angle = slice_angle(slice_count);
    let start_degrees = index as f64 * angle;
    SliceArc {
        start_degrees,
        end_degrees: start_degrees + angle,
        mid_degrees: start_degrees + angle / 2.0,
    }
}

/// Clip-path polygon for a slice on a 100x100 box: centre, then the two arc
/// endpoints, as percentages.
pub fn slice_polygon(index: usize, slice_count: usize) -> [(f64, f64); 3] {
    let arc = slice_arc(index, slice_count);
    let point = |degrees: f64| {
        let radians = degrees.to_radians();
        (50.0 + 50.0 * radians.sin(), 50.0 - 50.0 * radians.cos())
    };
    [(50.0, 50.0), point(arc.start_degrees), point(arc.end_degrees)]
}

pub fn clip_path(index: usize, slice_count: usize) -> String {
    let points = slice_polygon(index, slice_count)
        .iter()
        .map(|(x, y)| format!("{:.3}% {:.3}%", x, y))
        .collect::<Vec<_>>()
        .join(", ");
    format!("polygon({})", points)
}

/// The slice resting under the pointer after the wheel turns clockwise by
/// `rotation_degrees`.
pub fn slice_under_pointer(rotation_degrees: f64, slice_count: usize) -> usize {
    let settled = (FULL_TURN_DEGREES - rotation_degrees.rem_euclid(FULL_TURN_DEGREES)) % FULL_TURN_DEGREES;
    let index = (settled / slice_angle(slice_count)).floor() as usize;
    index.min(slice_count - 1)
}
