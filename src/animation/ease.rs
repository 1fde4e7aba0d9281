/// Remapping applied to a segment's normalized progress before blending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    #[default]
    Linear,
    /// Smoothstep: `t^2 (3 - 2t)`.
    InOutQuad,
    /// Half cosine: `0.5 - 0.5 cos(t pi)`.
    InOutSine,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InOutQuad => t * t * (3.0 - 2.0 * t),
            Self::InOutSine => 0.5 - 0.5 * (t * std::f64::consts::PI).cos(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
