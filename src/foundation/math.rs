use crate::foundation::core::TimeWindow;

/// Fractions closer than this are treated as the same split point.
pub(crate) const FRACTION_EPSILON: f64 = 1e-9;

/// Linearly interpolated time at fractional path position `f` of a segment.
pub fn interpolate_time(t0: f64, t1: f64, f: f64) -> f64 {
    t0 + (t1 - t0) * f
}

/// Fraction at which the ramp `t0 -> t1` reaches `t`, when that happens strictly inside `(0, 1)`.
pub fn crossing_fraction(t0: f64, t1: f64, t: f64) -> Option<f64> {
    let dt = t1 - t0;
    if !dt.is_finite() || dt == 0.0 || !t.is_finite() {
        return None;
    }
    let f = (t - t0) / dt;
    (f > FRACTION_EPSILON && f < 1.0 - FRACTION_EPSILON).then_some(f)
}

/// Closed sub-interval of `[0, 1]` whose interpolated time lies inside `window`.
///
/// Returns `None` when the window is inverted, when either timestamp is not finite, or when the
/// segment never enters the window.
pub fn visible_fraction_range(t0: f64, t1: f64, window: TimeWindow) -> Option<(f64, f64)> {
    if window.is_inverted() || !t0.is_finite() || !t1.is_finite() {
        return None;
    }
    let (start, end) = (window.start as f64, window.end as f64);

    if t0 == t1 {
        return window.contains(t0).then_some((0.0, 1.0));
    }

    let f_start = (start - t0) / (t1 - t0);
    let f_end = (end - t0) / (t1 - t0);
    let lo = f_start.min(f_end).max(0.0);
    let hi = f_start.max(f_end).min(1.0);
    (lo <= hi).then_some((lo, hi))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
