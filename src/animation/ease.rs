use crate::foundation::error::FolioError;

/// Easing curves used to shape normalized progress.
///
/// The `powerN` aliases follow the common motion-library convention where
/// `power1` is quadratic, `power2` cubic and `power3` quartic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Identity.
    Linear,
    /// Quadratic ease-in (`power1.in`).
    InQuad,
    /// Quadratic ease-out (`power1.out`).
    OutQuad,
    /// Quadratic ease-in-out (`power1.inOut`).
    InOutQuad,
    /// Cubic ease-in (`power2.in`).
    InCubic,
    /// Cubic ease-out (`power2.out`).
    OutCubic,
    /// Cubic ease-in-out (`power2.inOut`).
    InOutCubic,
    /// Quartic ease-out (`power3.out`).
    OutQuart,
    /// Quartic ease-in-out (`power3.inOut`).
    InOutQuart,
}

impl Ease {
    /// Apply this easing function to normalized progress `t`, clamped to `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::OutQuart => 1.0 - (1.0 - t).powi(4),
            Self::InOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(4) / 2.0)
                }
            }
        }
    }
}

impl std::str::FromStr for Ease {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ease = match s.trim() {
            "linear" | "none" => Self::Linear,
            "power1.in" => Self::InQuad,
            "power1.out" | "power1" => Self::OutQuad,
            "power1.inOut" => Self::InOutQuad,
            "power2.in" => Self::InCubic,
            "power2.out" | "power2" => Self::OutCubic,
            "power2.inOut" => Self::InOutCubic,
            "power3.out" | "power3" => Self::OutQuart,
            "power3.inOut" => Self::InOutQuart,
            other => {
                return Err(FolioError::validation(format!("unknown ease '{other}'")));
            }
        };
        Ok(ease)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
