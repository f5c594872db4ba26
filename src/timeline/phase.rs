use std::f64::consts::TAU;

use crate::animation::ease::Ease;
use crate::foundation::math::{clamp01, lerp, unit_progress};

/// Radius of the logo ring, px.
pub const RING_RADIUS: f64 = 27.0;
/// Stroke length of the logo ring.
pub const RING_CIRCUMFERENCE: f64 = TAU * RING_RADIUS;

/// The scrubbed phases of a timeline item, in start order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// The logo ring is stroked in.
    CircleDraw,
    /// The logo fades and scales up.
    LogoFade,
    /// The connector line grows down to the next item.
    LineGrow,
}

impl PhaseKind {
    /// Every phase, in start order.
    pub const ALL: [PhaseKind; 3] = [Self::CircleDraw, Self::LogoFade, Self::LineGrow];

    /// Offset, duration and easing of this phase.
    pub const fn spec(self) -> PhaseSpec {
        match self {
            Self::CircleDraw => PhaseSpec {
                offset: 0.0,
                duration: 0.4,
                ease: Ease::InOutCubic,
            },
            Self::LogoFade => PhaseSpec {
                offset: 0.2,
                duration: 0.3,
                ease: Ease::OutCubic,
            },
            // Runs to the exit trigger so the whole scrub range stays live.
            Self::LineGrow => PhaseSpec {
                offset: 0.3,
                duration: 0.7,
                ease: Ease::OutCubic,
            },
        }
    }
}

/// Sub-range of the item's local progress consumed by one phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseSpec {
    /// Local progress at which the phase starts.
    pub offset: f64,
    /// Share of local progress the phase spans.
    pub duration: f64,
    /// Curve applied to the phase's own progress.
    pub ease: Ease,
}

impl PhaseSpec {
    /// Linear progress of the phase for local progress `p`.
    pub fn progress(self, p: f64) -> f64 {
        unit_progress(p, self.offset, self.duration)
    }

    /// Eased progress of the phase for local progress `p`.
    pub fn eased(self, p: f64) -> f64 {
        self.ease.apply(self.progress(p))
    }
}

/// Visual state of one item, derived from its local progress alone.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PhaseVisuals {
    /// Progress in `[0, 1]` per phase, in [`PhaseKind::ALL`] order.
    pub progress: [f64; 3],
    /// Stroke dash offset of the logo ring: full circumference is undrawn.
    pub ring_dash_offset: f64,
    /// Logo opacity.
    pub logo_opacity: f64,
    /// Logo scale, 0.8 to 1.
    pub logo_scale: f64,
    /// Vertical scale of the connector line.
    pub line_scale_y: f64,
}

impl PhaseVisuals {
    /// Visuals for local progress `p`, clamped to `[0, 1]`.
    pub fn at(p: f64) -> Self {
        let p = clamp01(p);
        let progress = PhaseKind::ALL.map(|k| k.spec().progress(p));
        let ring = PhaseKind::CircleDraw.spec().eased(p);
        let logo = PhaseKind::LogoFade.spec().eased(p);
        let line = PhaseKind::LineGrow.spec().eased(p);
        Self {
            progress,
            ring_dash_offset: RING_CIRCUMFERENCE * (1.0 - ring),
            logo_opacity: logo,
            logo_scale: lerp(0.8, 1.0, logo),
            line_scale_y: line,
        }
    }

    /// Linear progress of one phase.
    pub fn phase(&self, kind: PhaseKind) -> f64 {
        match kind {
            PhaseKind::CircleDraw => self.progress[0],
            PhaseKind::LogoFade => self.progress[1],
            PhaseKind::LineGrow => self.progress[2],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/phase.rs"]
mod tests;
