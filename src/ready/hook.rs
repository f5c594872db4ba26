use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::error::{FolioError, FolioResult};

type OverlayHook = Box<dyn FnOnce()>;

enum HookSlot {
    Empty,
    Registered(OverlayHook),
    Consumed,
}

/// Holder for the startup overlay's "finish your progress animation" hook.
///
/// The overlay registers it once at startup; the ready signal invokes it at
/// most once, after which the slot is spent and later registrations fail.
#[derive(Clone)]
pub struct OverlayHookRegistry {
    slot: Rc<RefCell<HookSlot>>,
}

impl Default for OverlayHookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayHookRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(HookSlot::Empty)),
        }
    }

    /// Install the hook. Fails if one is installed or was already used.
    pub fn register(&self, hook: impl FnOnce() + 'static) -> FolioResult<()> {
        let mut slot = self.slot.borrow_mut();
        match *slot {
            HookSlot::Empty => {
                *slot = HookSlot::Registered(Box::new(hook));
                Ok(())
            }
            HookSlot::Registered(_) => Err(FolioError::validation(
                "overlay completion hook is already registered",
            )),
            HookSlot::Consumed => Err(FolioError::validation(
                "overlay completion hook was already used",
            )),
        }
    }

    /// Whether a hook is installed and unused.
    pub fn is_registered(&self) -> bool {
        matches!(*self.slot.borrow(), HookSlot::Registered(_))
    }

    /// Whether the hook has run.
    pub fn is_consumed(&self) -> bool {
        matches!(*self.slot.borrow(), HookSlot::Consumed)
    }

    /// Take the hook out and run it. Returns whether a hook ran.
    ///
    /// With no hook registered this is a no-op and the slot stays open.
    pub fn invoke(&self) -> bool {
        let hook = {
            let mut slot = self.slot.borrow_mut();
            match std::mem::replace(&mut *slot, HookSlot::Empty) {
                HookSlot::Registered(hook) => {
                    *slot = HookSlot::Consumed;
                    hook
                }
                other => {
                    *slot = other;
                    return false;
                }
            }
        };
        hook();
        true
    }
}

impl std::fmt::Debug for OverlayHookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match *self.slot.borrow() {
            HookSlot::Empty => "empty",
            HookSlot::Registered(_) => "registered",
            HookSlot::Consumed => "consumed",
        };
        f.debug_struct("OverlayHookRegistry")
            .field("slot", &state)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ready/hook.rs"]
mod tests;
