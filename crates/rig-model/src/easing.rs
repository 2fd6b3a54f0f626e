//! Easing curves.
//!
//! A curve maps normalized progress `t ∈ [0, 1]` to eased progress. Named
//! curves cover the usual shapes; `Keyframed` curves are cubic Hermite
//! splines authored as keys with in/out tangents, evaluated with clamping
//! outside the first and last key.

use serde::{Deserialize, Serialize};

/// An easing curve.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingCurve {
    /// `f(t) = t`.
    #[default]
    Linear,
    /// Quadratic ease-in.
    EaseIn,
    /// Quadratic ease-out.
    EaseOut,
    /// Cubic Hermite with flat tangents at both ends (smoothstep).
    EaseInOut,
    /// Piecewise quadratic ease-in-out.
    QuadInOut,
    /// Hermite spline through authored keys.
    Keyframed { keys: Vec<CurveKey> },
}

/// A single key on a keyframed curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
    /// Slope arriving at this key.
    #[serde(default)]
    pub in_tangent: f32,
    /// Slope leaving this key.
    #[serde(default)]
    pub out_tangent: f32,
}

impl CurveKey {
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }

    pub fn with_tangents(mut self, in_tangent: f32, out_tangent: f32) -> Self {
        self.in_tangent = in_tangent;
        self.out_tangent = out_tangent;
        self
    }
}

impl EasingCurve {
    /// Build a keyframed curve. Keys are sorted by time; non-finite keys are dropped.
    pub fn keyframed(keys: impl IntoIterator<Item = CurveKey>) -> Self {
        let mut keys: Vec<CurveKey> = keys
            .into_iter()
            .filter(|k| k.time.is_finite() && k.value.is_finite())
            .collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self::Keyframed { keys }
    }

    /// Map progress to eased progress.
    ///
    /// Named curves clamp `t` to `[0, 1]`. A keyframed curve without keys
    /// behaves like `Linear`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t };
        match self {
            EasingCurve::Linear => t.clamp(0.0, 1.0),
            EasingCurve::EaseIn => {
                let t = t.clamp(0.0, 1.0);
                t * t
            }
            EasingCurve::EaseOut => {
                let t = t.clamp(0.0, 1.0);
                1.0 - (1.0 - t) * (1.0 - t)
            }
            EasingCurve::EaseInOut => {
                let t = t.clamp(0.0, 1.0);
                t * t * (3.0 - 2.0 * t)
            }
            EasingCurve::QuadInOut => {
                let t = t.clamp(0.0, 1.0);
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingCurve::Keyframed { keys } => evaluate_keys(keys, t),
        }
    }
}

fn evaluate_keys(keys: &[CurveKey], t: f32) -> f32 {
    let (first, last) = match (keys.first(), keys.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return t.clamp(0.0, 1.0),
    };

    if t <= first.time {
        return first.value;
    }
    if t >= last.time {
        return last.value;
    }

    let idx = keys
        .windows(2)
        .position(|w| t >= w[0].time && t <= w[1].time)
        .unwrap_or(0);
    let k0 = keys[idx];
    let k1 = keys[(idx + 1).min(keys.len() - 1)];

    let span = k1.time - k0.time;
    if span <= f32::EPSILON {
        return k1.value;
    }

    let s = (t - k0.time) / span;
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    h00 * k0.value + h10 * span * k0.out_tangent + h01 * k1.value + h11 * span * k1.in_tangent
}
