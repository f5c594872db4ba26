use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::foundation::core::{ElementId, Rect, Viewport};
use crate::foundation::error::{FolioError, FolioResult};

/// Observation tuning: how far the viewport is grown and how much of the target
/// must be inside it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ObserveOptions {
    /// Pixels added to every side of the viewport.
    pub root_margin_px: f64,
    /// Minimum visible fraction that counts as intersecting.
    pub threshold: f64,
}

impl ObserveOptions {
    /// Validated options. Margin must be non-negative, threshold in `[0, 1]`.
    pub fn new(root_margin_px: f64, threshold: f64) -> FolioResult<Self> {
        if !(root_margin_px >= 0.0) {
            return Err(FolioError::validation("root margin must be >= 0"));
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(FolioError::validation("threshold must be in [0, 1]"));
        }
        Ok(Self {
            root_margin_px,
            threshold,
        })
    }
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            root_margin_px: 200.0,
            threshold: 0.01,
        }
    }
}

/// One intersection change delivered to an observer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct IntersectionEntry {
    /// Observed element.
    pub target: ElementId,
    /// Whether the element now meets the threshold.
    pub is_intersecting: bool,
    /// Visible fraction of the target's area, in `[0, 1]`.
    pub ratio: f64,
}

/// What the hub should do with a subscription after delivering an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObserverAction {
    /// Keep observing.
    Keep,
    /// Drop the subscription.
    Disconnect,
}

/// Token returned by [`ObserverHub::observe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObservationHandle(u64);

type ObserverCallback = Rc<RefCell<dyn FnMut(&IntersectionEntry) -> ObserverAction>>;

struct Subscription {
    target: ElementId,
    options: ObserveOptions,
    callback: ObserverCallback,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    subs: BTreeMap<u64, Subscription>,
    layout: HashMap<ElementId, Rect>,
    viewport: Option<Viewport>,
    delivered: u64,
    released: u64,
}

/// Compute the entry for `target` against `viewport` grown by the margin.
pub fn intersect(
    target_id: ElementId,
    target: Rect,
    viewport: Viewport,
    options: ObserveOptions,
) -> IntersectionEntry {
    let root = viewport.expanded(options.root_margin_px);
    let overlap = target.intersect(root);
    let overlaps = overlap.width() >= 0.0
        && overlap.height() >= 0.0
        && target.x0 <= root.x1
        && target.x1 >= root.x0
        && target.y0 <= root.y1
        && target.y1 >= root.y0;
    let area = target.area();
    let ratio = if !overlaps {
        0.0
    } else if area <= 0.0 {
        1.0
    } else {
        (overlap.area() / area).clamp(0.0, 1.0)
    };
    IntersectionEntry {
        target: target_id,
        is_intersecting: overlaps && ratio >= options.threshold,
        ratio,
    }
}

/// Host-side registry of intersection subscriptions.
///
/// Layout and viewport changes are pushed in; [`ObserverHub::notify`] then
/// delivers one entry per live subscription. Delivery is deliberately
/// redundant: the same entry may be seen many times and subscribers must
/// tolerate that.
#[derive(Clone, Default)]
pub struct ObserverHub {
    inner: Rc<RefCell<HubInner>>,
}

impl ObserverHub {
    /// Hub with no layout and no viewport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `callback` to intersection changes of `target`.
    pub fn observe(
        &self,
        target: ElementId,
        options: ObserveOptions,
        callback: impl FnMut(&IntersectionEntry) -> ObserverAction + 'static,
    ) -> ObservationHandle {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let callback: ObserverCallback = Rc::new(RefCell::new(callback));
        inner.subs.insert(
            id,
            Subscription {
                target,
                options,
                callback,
            },
        );
        ObservationHandle(id)
    }

    /// Release a subscription. Returns whether it was still live.
    pub fn disconnect(&self, handle: ObservationHandle) -> bool {
        let mut inner = self.inner.borrow_mut();
        let removed = inner.subs.remove(&handle.0).is_some();
        if removed {
            inner.released += 1;
        }
        removed
    }

    /// Place `element` at `rect` in page coordinates.
    pub fn set_layout(&self, element: ElementId, rect: Rect) {
        self.inner.borrow_mut().layout.insert(element, rect);
    }

    /// Forget the layout of `element`.
    pub fn remove_layout(&self, element: ElementId) {
        self.inner.borrow_mut().layout.remove(&element);
    }

    /// Layout rect of `element`, if known.
    pub fn layout_of(&self, element: ElementId) -> Option<Rect> {
        self.inner.borrow().layout.get(&element).copied()
    }

    /// Move or resize the viewport.
    pub fn set_viewport(&self, viewport: Viewport) {
        self.inner.borrow_mut().viewport = Some(viewport);
    }

    /// Current viewport, if set.
    pub fn viewport(&self) -> Option<Viewport> {
        self.inner.borrow().viewport
    }

    /// Number of live subscriptions.
    pub fn active_subscriptions(&self) -> usize {
        self.inner.borrow().subs.len()
    }

    /// Entries delivered since creation.
    pub fn delivered(&self) -> u64 {
        self.inner.borrow().delivered
    }

    /// Subscriptions released since creation, by disconnect or by callback.
    pub fn released(&self) -> u64 {
        self.inner.borrow().released
    }

    /// Deliver the current intersection state to every live subscription.
    /// Returns the number of entries delivered.
    pub fn notify(&self) -> usize {
        let batch: Vec<(u64, IntersectionEntry, ObserverCallback)> = {
            let inner = self.inner.borrow();
            let Some(viewport) = inner.viewport else {
                return 0;
            };
            inner
                .subs
                .iter()
                .filter_map(|(&id, sub)| {
                    let rect = inner.layout.get(&sub.target)?;
                    let entry = intersect(sub.target, *rect, viewport, sub.options);
                    Some((id, entry, Rc::clone(&sub.callback)))
                })
                .collect()
        };

        let mut delivered = 0;
        for (id, entry, callback) in batch {
            // An earlier callback in this batch may have released this one.
            if !self.inner.borrow().subs.contains_key(&id) {
                continue;
            }
            self.inner.borrow_mut().delivered += 1;
            delivered += 1;
            let action = {
                let mut cb = callback.borrow_mut();
                (&mut *cb)(&entry)
            };
            if action == ObserverAction::Disconnect {
                self.disconnect(ObservationHandle(id));
            }
        }
        delivered
    }
}

impl std::fmt::Debug for ObserverHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ObserverHub")
            .field("subscriptions", &inner.subs.len())
            .field("elements", &inner.layout.len())
            .field("viewport", &inner.viewport)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visibility/observer.rs"]
mod tests;
