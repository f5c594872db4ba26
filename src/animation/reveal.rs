use crate::animation::ease::Ease;
use crate::foundation::core::{Millis, Vec2};
use crate::foundation::math::{lerp, unit_progress};

/// Visual pose interpolated by a [`Reveal`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RevealPose {
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Offset in CSS pixels.
    pub translate: Vec2,
    /// Horizontal offset as a percentage of the element's own width.
    pub x_percent: f64,
}

impl RevealPose {
    /// Fully shown, no offset.
    pub const REST: RevealPose = RevealPose {
        opacity: 1.0,
        translate: Vec2::ZERO,
        x_percent: 0.0,
    };

    fn lerp(self, to: RevealPose, t: f64) -> Self {
        Self {
            opacity: lerp(self.opacity, to.opacity, t),
            translate: Vec2::new(
                lerp(self.translate.x, to.translate.x, t),
                lerp(self.translate.y, to.translate.y, t),
            ),
            x_percent: lerp(self.x_percent, to.x_percent, t),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Where a [`Reveal`] starts and ends, and how long it takes.
pub struct RevealSpec {
    /// Pose before the reveal starts.
    pub from: RevealPose,
    /// Pose once the reveal has settled.
    pub to: RevealPose,
    /// Tween length after the delay.
    pub duration_ms: u64,
    /// Wait between the trigger and the first frame of motion.
    pub delay_ms: u64,
    /// Curve applied to linear progress.
    pub ease: Ease,
}

impl RevealSpec {
    /// Text block under a timeline entry: fades up by 20px.
    pub fn rise_text() -> Self {
        Self {
            from: RevealPose {
                opacity: 0.0,
                translate: Vec2::new(0.0, 20.0),
                x_percent: 0.0,
            },
            to: RevealPose::REST,
            duration_ms: 500,
            delay_ms: 0,
            ease: Ease::OutCubic,
        }
    }

    /// Review card sliding in from its own left edge.
    pub fn slide_card() -> Self {
        Self {
            from: RevealPose {
                opacity: 0.0,
                translate: Vec2::ZERO,
                x_percent: -100.0,
            },
            to: RevealPose::REST,
            duration_ms: 1000,
            delay_ms: 0,
            ease: Ease::InOutCubic,
        }
    }

    /// Counter tile entrance, staggered 100ms per index.
    pub fn counter_tile(index: usize) -> Self {
        Self {
            from: RevealPose {
                opacity: 0.0,
                translate: Vec2::new(0.0, 30.0),
                x_percent: 0.0,
            },
            to: RevealPose::REST,
            duration_ms: 600,
            delay_ms: 100 * index as u64,
            ease: Ease::OutCubic,
        }
    }
}

/// One-shot, wall-clock driven tween.
///
/// Once [`Reveal::trigger`] latches, later triggers are ignored; scrolling away
/// never rewinds it.
#[derive(Clone, Debug)]
pub struct Reveal {
    spec: RevealSpec,
    started_at: Option<Millis>,
}

impl Reveal {
    /// Untriggered reveal, held at `spec.from`.
    pub fn new(spec: RevealSpec) -> Self {
        Self {
            spec,
            started_at: None,
        }
    }

    /// The reveal's parameters.
    pub fn spec(&self) -> &RevealSpec {
        &self.spec
    }

    /// Latch at `now`. Returns whether this call performed the transition.
    pub fn trigger(&mut self, now: Millis) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    /// Whether the reveal has latched.
    pub fn is_triggered(&self) -> bool {
        self.started_at.is_some()
    }

    /// Linear progress at `now`, 0 before the trigger and during the delay.
    pub fn progress(&self, now: Millis) -> f64 {
        let Some(start) = self.started_at else {
            return 0.0;
        };
        let begin = start.saturating_add(self.spec.delay_ms);
        if now < begin {
            return 0.0;
        }
        unit_progress(
            now.since(begin) as f64,
            0.0,
            self.spec.duration_ms as f64,
        )
    }

    /// Whether the tween has reached `spec.to`.
    pub fn is_settled(&self, now: Millis) -> bool {
        self.progress(now) >= 1.0
    }

    /// Eased pose at `now`.
    pub fn sample(&self, now: Millis) -> RevealPose {
        let eased = self.spec.ease.apply(self.progress(now));
        self.spec.from.lerp(self.spec.to, eased)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/reveal.rs"]
mod tests;
