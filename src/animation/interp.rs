use crate::animation::ease::Ease;
use crate::foundation::error::{ReactionError, ReactionResult};

/// Piecewise interpolation of `values` over `times` at `t`.
///
/// Queries clamp to the first and last value; there is no extrapolation. Inside a segment the
/// normalized progress is remapped through `ease` before the linear blend. Knots return their own
/// value exactly.
pub fn interpolate(t: f64, times: &[f64], values: &[f64], ease: Ease) -> ReactionResult<f64> {
    check_keyframes(times, values)?;
    if !t.is_finite() {
        return Err(ReactionError::animation(format!("query time must be finite, got {t}")));
    }
    Ok(sample(t, times, values, ease))
}

fn check_keyframes(times: &[f64], values: &[f64]) -> ReactionResult<()> {
    if times.len() != values.len() {
        return Err(ReactionError::animation(format!(
            "keyframe length mismatch: {} times, {} values",
            times.len(),
            values.len()
        )));
    }
    if times.is_empty() {
        return Err(ReactionError::animation("keyframes must not be empty"));
    }
    if times.iter().any(|k| !k.is_finite()) {
        return Err(ReactionError::animation("keyframe times must be finite"));
    }
    Ok(())
}

// Callers guarantee equal, non-empty lengths and finite times. A NaN query pins to the first value.
fn sample(t: f64, times: &[f64], values: &[f64], ease: Ease) -> f64 {
    let last = times.len() - 1;
    if t.is_nan() || t <= times[0] {
        return values[0];
    }
    if t >= times[last] {
        return values[last];
    }

    // First knot strictly after `t`; exists because `t < times[last]`.
    let hi = times.partition_point(|&k| k <= t).clamp(1, last);
    let lo = hi - 1;
    let (t0, t1) = (times[lo], times[hi]);
    let (v0, v1) = (values[lo], values[hi]);
    if t == t0 {
        return v0;
    }
    let span = t1 - t0;
    if span <= 0.0 {
        return v1;
    }
    let f = ease.apply((t - t0) / span);
    v0 + (v1 - v0) * f
}

/// Validated keyframe track.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframes {
    times: Vec<f64>,
    values: Vec<f64>,
    ease: Ease,
}

impl Keyframes {
    pub fn new(times: Vec<f64>, values: Vec<f64>, ease: Ease) -> ReactionResult<Self> {
        check_keyframes(&times, &values)?;
        if times.windows(2).any(|w| w[1] < w[0]) {
            return Err(ReactionError::animation("keyframe times must be non-decreasing"));
        }
        Ok(Self {
            times,
            values,
            ease,
        })
    }

    pub fn ease(&self) -> Ease {
        self.ease
    }

    pub fn sample(&self, t: f64) -> f64 {
        sample(t, &self.times, &self.values, self.ease)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/interp.rs"]
mod tests;
