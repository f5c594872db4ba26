use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::core::ElementId;
use crate::loader::registry::{Completer, LoadOutcome, LoadPhase, ModuleId, ModuleRegistry};
use crate::sched::liveness::Liveness;
use crate::viewport::boundary::FaultChannel;
use crate::visibility::gate::VisibilityGate;

/// Starts the asynchronous resolution of a module.
///
/// Implementations hand the [`Completer`] to whatever performs the fetch and
/// must not block.
pub trait ModuleSource<M> {
    /// Begin fetching `id`; settle the load through `completer`.
    fn fetch(&self, id: &ModuleId, completer: Completer<M>);
}

impl<M, F> ModuleSource<M> for F
where
    F: Fn(&ModuleId, Completer<M>),
{
    fn fetch(&self, id: &ModuleId, completer: Completer<M>) {
        self(id, completer)
    }
}

/// What the suspended region currently shows.
#[derive(Debug)]
pub enum SlotView<M> {
    /// Waiting for visibility or for the load.
    Placeholder,
    /// The module resolved.
    Ready(Rc<M>),
    /// The load failed and was reported to the fault boundary.
    Faulted,
}

impl<M> Clone for SlotView<M> {
    fn clone(&self) -> Self {
        match self {
            Self::Placeholder => Self::Placeholder,
            Self::Ready(m) => Self::Ready(Rc::clone(m)),
            Self::Faulted => Self::Faulted,
        }
    }
}

impl<M> SlotView<M> {
    /// Whether the placeholder is showing.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// The resolved module, if any.
    pub fn module(&self) -> Option<&Rc<M>> {
        match self {
            Self::Ready(m) => Some(m),
            _ => None,
        }
    }
}

struct SlotState<M> {
    view: SlotView<M>,
    requested: bool,
}

/// A region whose implementation is code-split and loaded on first visibility.
///
/// The source is only asked for the module once the gate latches. Until the
/// load settles the region shows a placeholder; a failed load is reported to
/// the owner's fault boundary through the supplied channel.
pub struct DeferredSlot<M: 'static> {
    id: ModuleId,
    registry: ModuleRegistry<M>,
    gate: VisibilityGate,
    state: Rc<RefCell<SlotState<M>>>,
    alive: Liveness,
}

impl<M: 'static> DeferredSlot<M> {
    /// Slot that loads `id` through `source` once `gate` latches. Load failures
    /// are reported on `faults`.
    pub fn new(
        id: ModuleId,
        registry: ModuleRegistry<M>,
        gate: VisibilityGate,
        source: Rc<dyn ModuleSource<M>>,
        faults: FaultChannel,
    ) -> Self {
        let state = Rc::new(RefCell::new(SlotState {
            view: SlotView::Placeholder,
            requested: false,
        }));
        let alive = Liveness::new();

        let on_visible = {
            let id = id.clone();
            let registry = registry.clone();
            let state = Rc::downgrade(&state);
            let alive = alive.clone();
            move || {
                if !alive.is_alive() {
                    return;
                }
                let Some(slot) = state.upgrade() else {
                    return;
                };
                slot.borrow_mut().requested = true;
                let waiter = {
                    let state = Rc::downgrade(&slot);
                    let alive = alive.clone();
                    move |outcome: &LoadOutcome<M>| {
                        if !alive.is_alive() {
                            return;
                        }
                        let Some(slot) = state.upgrade() else {
                            return;
                        };
                        match outcome {
                            LoadOutcome::Ready(module) => {
                                slot.borrow_mut().view = SlotView::Ready(Rc::clone(module));
                            }
                            LoadOutcome::Failed { .. } => {
                                slot.borrow_mut().view = SlotView::Faulted;
                                if let Some(err) = outcome.to_error() {
                                    faults.report(err);
                                }
                            }
                        }
                    }
                };
                registry.request(&id, |completer| source.fetch(&id, completer), waiter);
            }
        };
        gate.on_trigger(on_visible);

        Self {
            id,
            registry,
            gate,
            state,
            alive,
        }
    }

    /// Module this slot loads.
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    /// Attach the region's element; see [`VisibilityGate::mount`].
    pub fn mount(&self, target: Option<ElementId>) {
        if self.alive.is_alive() {
            self.gate.mount(target);
        }
    }

    /// What the region shows now.
    pub fn view(&self) -> SlotView<M> {
        self.state.borrow().view.clone()
    }

    /// Whether this slot has asked the registry for its module.
    pub fn requested(&self) -> bool {
        self.state.borrow().requested
    }

    /// Registry load status of this slot's module.
    pub fn phase(&self) -> LoadPhase {
        self.registry.phase(&self.id)
    }

    /// The visibility gate that triggers the load.
    pub fn gate(&self) -> &VisibilityGate {
        &self.gate
    }

    /// Stop observing and ignore any later load result. Idempotent.
    pub fn dispose(&self) {
        if self.alive.kill() {
            self.gate.dispose();
        }
    }
}

impl<M: 'static> Drop for DeferredSlot<M> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/loader/slot.rs"]
mod tests;
