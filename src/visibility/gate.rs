use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::core::ElementId;
use crate::visibility::observer::{
    IntersectionEntry, ObservationHandle, ObserveOptions, ObserverAction, ObserverHub,
};

/// Latch state of a single gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct VisibilityRecord {
    /// Element being watched, once attached.
    pub target: Option<ElementId>,
    /// Set once the target has intersected. Never cleared.
    pub triggered: bool,
}

type TriggerListener = Box<dyn FnOnce()>;

struct GateState {
    record: VisibilityRecord,
    handle: Option<ObservationHandle>,
    listeners: Vec<TriggerListener>,
    disposed: bool,
}

/// One-way visibility latch over an [`ObserverHub`] subscription.
///
/// The latch flips `false -> true` the first time the target intersects the
/// expanded viewport and never flips back. The subscription is released
/// exactly once: on that transition, or on [`VisibilityGate::dispose`],
/// whichever comes first.
pub struct VisibilityGate {
    hub: ObserverHub,
    options: ObserveOptions,
    state: Rc<RefCell<GateState>>,
}

impl VisibilityGate {
    /// Unattached gate observing through `hub`.
    pub fn new(hub: ObserverHub, options: ObserveOptions) -> Self {
        Self {
            hub,
            options,
            state: Rc::new(RefCell::new(GateState {
                record: VisibilityRecord {
                    target: None,
                    triggered: false,
                },
                handle: None,
                listeners: Vec::new(),
                disposed: false,
            })),
        }
    }

    /// Options the gate observes with.
    pub fn options(&self) -> ObserveOptions {
        self.options
    }

    /// Start observing `target`.
    ///
    /// `None` (element not mounted yet) leaves the gate idle until the next
    /// call. Calls on a triggered, disposed or already-observing gate are
    /// no-ops.
    pub fn mount(&self, target: Option<ElementId>) {
        let mut st = self.state.borrow_mut();
        if st.disposed || st.record.triggered || st.handle.is_some() {
            return;
        }
        let Some(target) = target else {
            return;
        };
        st.record.target = Some(target);

        let weak = Rc::downgrade(&self.state);
        let handle = self
            .hub
            .observe(target, self.options, move |entry: &IntersectionEntry| {
                let Some(state) = weak.upgrade() else {
                    return ObserverAction::Disconnect;
                };
                on_entry(&state, entry)
            });
        st.handle = Some(handle);
    }

    /// Whether the target has been seen.
    pub fn is_triggered(&self) -> bool {
        self.state.borrow().record.triggered
    }

    /// Whether a subscription is currently held.
    pub fn is_observing(&self) -> bool {
        self.state.borrow().handle.is_some()
    }

    /// Snapshot of the latch.
    pub fn record(&self) -> VisibilityRecord {
        self.state.borrow().record
    }

    /// Run `listener` once the latch fires; immediately if it already has.
    /// Listeners registered on a disposed gate are dropped.
    pub fn on_trigger(&self, listener: impl FnOnce() + 'static) {
        {
            let mut st = self.state.borrow_mut();
            if st.disposed {
                return;
            }
            if !st.record.triggered {
                st.listeners.push(Box::new(listener));
                return;
            }
        }
        listener();
    }

    /// Release the subscription (if still held) and drop pending listeners.
    pub fn dispose(&self) {
        let handle = {
            let mut st = self.state.borrow_mut();
            if st.disposed {
                return;
            }
            st.disposed = true;
            st.listeners.clear();
            st.handle.take()
        };
        if let Some(handle) = handle {
            self.hub.disconnect(handle);
        }
    }
}

fn on_entry(state: &Rc<RefCell<GateState>>, entry: &IntersectionEntry) -> ObserverAction {
    let listeners = {
        let mut st = state.borrow_mut();
        if st.disposed || st.record.triggered {
            st.handle = None;
            return ObserverAction::Disconnect;
        }
        if !entry.is_intersecting {
            return ObserverAction::Keep;
        }
        st.record.triggered = true;
        st.handle = None;
        std::mem::take(&mut st.listeners)
    };
    tracing::debug!(element = ?entry.target, ratio = entry.ratio, "visibility latch fired");
    for listener in listeners {
        listener();
    }
    ObserverAction::Disconnect
}

impl Drop for VisibilityGate {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for VisibilityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.state.borrow();
        f.debug_struct("VisibilityGate")
            .field("record", &st.record)
            .field("observing", &st.handle.is_some())
            .field("disposed", &st.disposed)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visibility/gate.rs"]
mod tests;
