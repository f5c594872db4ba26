use std::cell::Cell;
use std::rc::Rc;

use crate::foundation::core::{Point, Rect};

/// Offset added so the glow's bright edge leads the pointer.
pub const GLOW_LEAD_DEG: f64 = 60.0;

/// Angle, in degrees, of `pointer` around the centre of `card`, normalised to
/// `[0, 360)` and then shifted by [`GLOW_LEAD_DEG`].
pub fn glow_angle(pointer: Point, card: Rect) -> f64 {
    let d = pointer - card.center();
    let deg = d.y.atan2(d.x).to_degrees();
    (deg + 360.0) % 360.0 + GLOW_LEAD_DEG
}

/// Single numeric channel shared by a pointer tracker (writer) and a glow
/// effect (reader). The most recent write wins; there is no other ordering.
#[derive(Clone, Debug, Default)]
pub struct GlowChannel {
    angle: Rc<Cell<Option<f64>>>,
    writes: Rc<Cell<u64>>,
}

impl GlowChannel {
    /// Channel with no angle written yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer move over `card`. Returns the angle written.
    pub fn track(&self, pointer: Point, card: Rect) -> f64 {
        let angle = glow_angle(pointer, card);
        self.write(angle);
        angle
    }

    /// Store `angle_deg`, replacing any earlier value.
    pub fn write(&self, angle_deg: f64) {
        self.angle.set(Some(angle_deg));
        self.writes.set(self.writes.get() + 1);
    }

    /// Most recently written angle.
    pub fn read(&self) -> Option<f64> {
        self.angle.get()
    }

    /// Number of writes so far.
    pub fn writes(&self) -> u64 {
        self.writes.get()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/glow.rs"]
mod tests;
