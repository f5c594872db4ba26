/// Clamp to `[0, 1]`, mapping NaN to 0.
pub(crate) fn clamp01(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// `clamp01((v - start) / span)`, with a zero span acting as a step at `start`.
pub(crate) fn unit_progress(v: f64, start: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return if v >= start { 1.0 } else { 0.0 };
    }
    clamp01((v - start) / span)
}
