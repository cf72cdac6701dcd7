//! Piecewise-linear evaluation of sparse automation curves.

use crate::profile::CurvePoint;

/// Value returned for a curve without any points.
pub const NEUTRAL_VALUE: f64 = 0.5;

/// Evaluates `points` at `progress`.
///
/// Points are visited in the order given, without sorting. The first adjacent
/// pair whose time span contains `progress` is used; if none does, the first
/// and last points form the bracket. Zero-width brackets yield the lower
/// value. The result is not clamped.
pub fn interpolate(points: &[CurvePoint], progress: f64) -> f64 {
    let (first, last) = match points {
        [] => return NEUTRAL_VALUE,
        [only] => return only.value,
        [first, .., last] => (first, last),
    };

    let (lower, upper) = points
        .windows(2)
        .find(|pair| pair[0].time <= progress && progress <= pair[1].time)
        .map(|pair| (&pair[0], &pair[1]))
        .unwrap_or((first, last));

    let span = upper.time - lower.time;
    if span == 0.0 {
        return lower.value;
    }

    let t = (progress - lower.time) / span;
    lower.value + (upper.value - lower.value) * t
}
