use std::str::FromStr;

use crate::foundation::core::{Rect, Viewport};
use crate::foundation::error::{FolioError, FolioResult};

/// Scroll position at which a point of an element meets a line of the viewport,
/// written `"<element edge> <viewport line>"`, e.g. `"top 85%"` or
/// `"center 40%"`.
///
/// Each half is `top`, `center`, `bottom` or a percentage of the respective
/// height.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TriggerSpec {
    /// Fraction of the element's height, from its top.
    pub element: f64,
    /// Fraction of the viewport's height, from its top.
    pub viewport: f64,
}

impl TriggerSpec {
    /// Trigger from element and viewport fractions.
    pub const fn new(element: f64, viewport: f64) -> Self {
        Self { element, viewport }
    }

    /// Absolute scroll offset at which the trigger is crossed.
    pub fn resolve(self, element: Rect, viewport: Viewport) -> f64 {
        element.y0 + self.element * element.height() - self.viewport * viewport.height
    }
}

fn parse_anchor(token: &str) -> FolioResult<f64> {
    match token {
        "top" => Ok(0.0),
        "center" => Ok(0.5),
        "bottom" => Ok(1.0),
        _ => {
            let pct = token.strip_suffix('%').ok_or_else(|| {
                FolioError::validation(format!("trigger anchor '{token}' is not a keyword or percentage"))
            })?;
            let v: f64 = pct
                .parse()
                .map_err(|e| FolioError::validation(format!("trigger anchor '{token}': {e}")))?;
            if !v.is_finite() {
                return Err(FolioError::validation(format!(
                    "trigger anchor '{token}' must be finite"
                )));
            }
            Ok(v / 100.0)
        }
    }
}

fn format_anchor(v: f64) -> String {
    if v == 0.0 {
        "top".to_owned()
    } else if v == 0.5 {
        "center".to_owned()
    } else if v == 1.0 {
        "bottom".to_owned()
    } else {
        format!("{}%", v * 100.0)
    }
}

impl FromStr for TriggerSpec {
    type Err = FolioError;

    fn from_str(s: &str) -> FolioResult<Self> {
        let mut parts = s.split_whitespace();
        let (Some(element), viewport, None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(FolioError::validation(format!(
                "trigger '{s}' must be '<element> [<viewport>]'"
            )));
        };
        Ok(Self {
            element: parse_anchor(element)?,
            // A lone anchor applies to both, as scroll triggers do.
            viewport: parse_anchor(viewport.unwrap_or(element))?,
        })
    }
}

impl TryFrom<String> for TriggerSpec {
    type Error = FolioError;

    fn try_from(s: String) -> FolioResult<Self> {
        s.parse()
    }
}

impl From<TriggerSpec> for String {
    fn from(t: TriggerSpec) -> Self {
        format!("{} {}", format_anchor(t.element), format_anchor(t.viewport))
    }
}

impl std::fmt::Display for TriggerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from(*self))
    }
}

/// Entry of a timeline item, `"top 85%"`.
pub const ITEM_ENTRY: TriggerSpec = TriggerSpec::new(0.0, 0.85);
/// Exit of a timeline item, `"center 40%"`.
pub const ITEM_EXIT: TriggerSpec = TriggerSpec::new(0.5, 0.40);
/// Start of an item's text reveal, `"top 85%"`.
pub const CONTENT_START: TriggerSpec = TriggerSpec::new(0.0, 0.85);
/// Start of an item's card slide, `"top 80%"`.
pub const CARD_START: TriggerSpec = TriggerSpec::new(0.0, 0.80);

#[cfg(test)]
#[path = "../../tests/unit/timeline/trigger.rs"]
mod tests;
