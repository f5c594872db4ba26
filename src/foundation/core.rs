use crate::foundation::error::{FolioError, FolioResult};

pub use kurbo::{Point, Rect, Vec2};

/// Opaque handle to a laid-out page element.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ElementId(pub u64);

/// Monotonic host time in milliseconds.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Millis(pub u64);

impl Millis {
    /// `self + ms`, saturating at `u64::MAX`.
    pub fn saturating_add(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed since `earlier`, 0 if it lies in the future.
    pub fn since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// As fractional seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

/// Scrollable window onto the document, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Document offset of the top edge.
    pub scroll_y: f64,
    /// Visible width.
    pub width: f64,
    /// Visible height.
    pub height: f64,
}

impl Viewport {
    /// Unscrolled viewport. Both sides must be positive.
    pub fn new(width: f64, height: f64) -> FolioResult<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(FolioError::validation("Viewport size must be > 0"));
        }
        Ok(Self {
            scroll_y: 0.0,
            width,
            height,
        })
    }

    /// Same size scrolled to `scroll_y`, clamped at 0.
    pub fn with_scroll(self, scroll_y: f64) -> Self {
        Self {
            scroll_y: scroll_y.max(0.0),
            ..self
        }
    }

    /// Visible region in document coordinates.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, self.scroll_y, self.width, self.scroll_y + self.height)
    }

    /// Visible region grown by `margin_px` on every side.
    pub fn expanded(self, margin_px: f64) -> Rect {
        self.rect().inflate(margin_px, margin_px)
    }
}

/// Straight (non-premultiplied) colour with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
}

impl Rgb {
    /// Parse `#rrggbb`.
    pub fn from_hex(s: &str) -> FolioResult<Self> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| FolioError::validation(format!("colour '{s}' must start with '#'")))?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(FolioError::validation(format!(
                "colour '{s}' must have 6 hex digits"
            )));
        }
        let channel = |i: usize| -> FolioResult<f64> {
            let v = u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| FolioError::validation(format!("colour '{s}': {e}")))?;
            Ok(f64::from(v) / 255.0)
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// From 8-bit channels.
    pub const fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Move `alpha` of the way toward `target`.
    pub fn lerp(self, target: Rgb, alpha: f64) -> Self {
        let a = alpha.clamp(0.0, 1.0);
        Self {
            r: self.r + (target.r - self.r) * a,
            g: self.g + (target.g - self.g) * a,
            b: self.b + (target.b - self.b) * a,
        }
    }

    /// `#rrggbb`, channels rounded to 8 bits.
    pub fn to_hex(self) -> String {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", q(self.r), q(self.g), q(self.b))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
