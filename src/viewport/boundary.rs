use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::foundation::error::{FolioError, FolioResult};

/// Static visual substituted for a failed subtree.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fallback {
    /// Still image.
    Image {
        /// Image URL.
        src: String,
        /// Alternative text.
        alt: String,
    },
    /// Single glyph.
    Icon {
        /// The glyph.
        glyph: String,
    },
    /// Text panel.
    Panel {
        /// Heading.
        title: String,
        /// Explanation under the heading.
        detail: String,
    },
}

impl Fallback {
    /// Image fallback.
    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::Image {
            src: src.into(),
            alt: alt.into(),
        }
    }

    /// Icon fallback.
    pub fn icon(glyph: impl Into<String>) -> Self {
        Self::Icon {
            glyph: glyph.into(),
        }
    }
}

impl Default for Fallback {
    fn default() -> Self {
        Self::Panel {
            title: "3D content unavailable".to_owned(),
            detail: "Interactive element couldn't load".to_owned(),
        }
    }
}

/// Outcome of rendering through a [`FaultBoundary`].
#[derive(Clone, Debug, PartialEq)]
pub enum RenderResult<T> {
    /// The subtree rendered.
    Rendering(T),
    /// The boundary has captured a fault and shows this instead.
    Failed(Fallback),
}

impl<T> RenderResult<T> {
    /// Whether the boundary substituted its fallback.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The rendered value, if any.
    pub fn rendering(self) -> Option<T> {
        match self {
            Self::Rendering(t) => Some(t),
            Self::Failed(_) => None,
        }
    }
}

#[derive(Debug)]
struct BoundaryState {
    label: String,
    fallback: Fallback,
    fault: Option<String>,
    captured: u32,
}

/// Contains faults raised by the subtree it wraps.
///
/// The first captured fault is terminal: every later render returns the
/// fallback without invoking the subtree again. Children report asynchronous
/// faults through a [`FaultChannel`] handed down by the owner.
#[derive(Clone, Debug)]
pub struct FaultBoundary {
    state: Rc<RefCell<BoundaryState>>,
}

impl FaultBoundary {
    /// Boundary with an optional fallback; `None` uses the default panel.
    pub fn new(label: impl Into<String>, fallback: Option<Fallback>) -> Self {
        Self {
            state: Rc::new(RefCell::new(BoundaryState {
                label: label.into(),
                fallback: fallback.unwrap_or_default(),
                fault: None,
                captured: 0,
            })),
        }
    }

    /// Handle children use to report asynchronous faults.
    pub fn channel(&self) -> FaultChannel {
        FaultChannel {
            state: Rc::downgrade(&self.state),
        }
    }

    /// Name used in logs.
    pub fn label(&self) -> String {
        self.state.borrow().label.clone()
    }

    /// Content shown once the boundary has failed.
    pub fn fallback(&self) -> Fallback {
        self.state.borrow().fallback.clone()
    }

    /// Whether a fault has been captured.
    pub fn has_failed(&self) -> bool {
        self.state.borrow().fault.is_some()
    }

    /// Message of the first captured fault.
    pub fn fault(&self) -> Option<String> {
        self.state.borrow().fault.clone()
    }

    /// Number of faults delivered, including ones after the first.
    pub fn captured(&self) -> u32 {
        self.state.borrow().captured
    }

    /// Render the subtree, substituting the fallback on error.
    pub fn render<T>(&self, build: impl FnOnce() -> FolioResult<T>) -> RenderResult<T> {
        if self.has_failed() {
            return RenderResult::Failed(self.fallback());
        }
        match build() {
            Ok(t) => RenderResult::Rendering(t),
            Err(err) => {
                capture(&self.state, err);
                RenderResult::Failed(self.fallback())
            }
        }
    }

    /// Record a fault raised outside `render`.
    pub fn capture(&self, err: FolioError) {
        capture(&self.state, err);
    }
}

fn capture(state: &Rc<RefCell<BoundaryState>>, err: FolioError) {
    let mut st = state.borrow_mut();
    st.captured += 1;
    if st.fault.is_some() {
        tracing::debug!(boundary = %st.label, error = %err, "fault after boundary already failed");
        return;
    }
    tracing::error!(boundary = %st.label, error = %err, "fault boundary caught an error");
    st.fault = Some(err.to_string());
}

/// Child-side handle for reporting faults to the owning boundary.
#[derive(Clone, Debug)]
pub struct FaultChannel {
    state: Weak<RefCell<BoundaryState>>,
}

impl FaultChannel {
    /// A channel with no boundary behind it: faults are logged and dropped.
    pub fn detached() -> Self {
        Self { state: Weak::new() }
    }

    /// Deliver `err`. Returns whether a boundary received it.
    pub fn report(&self, err: FolioError) -> bool {
        match self.state.upgrade() {
            Some(state) => {
                capture(&state, err);
                true
            }
            None => {
                tracing::warn!(error = %err, "fault reported with no boundary attached");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/boundary.rs"]
mod tests;
