use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::core::Millis;
use crate::ready::hook::OverlayHookRegistry;
use crate::sched::host::{Scheduler, TaskHandle};
use crate::sched::liveness::Liveness;

/// The two facts overlay dismissal waits for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PageReadyState {
    /// The document finished loading.
    pub dom_complete: bool,
    /// The overlay has been up for its minimum dwell.
    pub minimum_dwell_elapsed: bool,
}

impl PageReadyState {
    /// Both facts hold.
    pub fn is_ready(self) -> bool {
        self.dom_complete && self.minimum_dwell_elapsed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Lifecycle of the startup overlay.
pub enum OverlayPhase {
    /// Shown, waiting for readiness.
    Visible,
    /// Dismissal started, fade running.
    FadingOut,
    /// Taken out of the document.
    Removed,
}

struct SignalState {
    ready: PageReadyState,
    phase: OverlayPhase,
    dwell: Option<TaskHandle>,
    fade: Option<TaskHandle>,
    removed_at: Option<Millis>,
    removals: u32,
}

/// Startup overlay coordinator.
///
/// Dismissal starts once the document has loaded and the overlay has been up
/// for its minimum dwell, in either order. The overlay's completion hook is
/// invoked, the fade runs, and the overlay is removed exactly once.
pub struct PageReadySignal {
    sched: Scheduler,
    hooks: OverlayHookRegistry,
    fade_ms: u64,
    state: Rc<RefCell<SignalState>>,
    alive: Liveness,
}

impl PageReadySignal {
    /// Show the overlay and start the dwell timer.
    pub fn start(
        sched: Scheduler,
        hooks: OverlayHookRegistry,
        min_dwell_ms: u64,
        fade_ms: u64,
    ) -> Self {
        let state = Rc::new(RefCell::new(SignalState {
            ready: PageReadyState::default(),
            phase: OverlayPhase::Visible,
            dwell: None,
            fade: None,
            removed_at: None,
            removals: 0,
        }));
        let signal = Self {
            sched,
            hooks,
            fade_ms,
            state,
            alive: Liveness::new(),
        };
        let dwell = {
            let ctx = signal.context();
            signal.sched.set_timeout(min_dwell_ms, move |_| {
                if !ctx.alive.is_alive() {
                    return;
                }
                {
                    let mut st = ctx.state.borrow_mut();
                    st.dwell = None;
                    st.ready.minimum_dwell_elapsed = true;
                }
                ctx.evaluate();
            })
        };
        signal.state.borrow_mut().dwell = Some(dwell);
        signal
    }

    fn context(&self) -> SignalContext {
        SignalContext {
            sched: self.sched.clone(),
            hooks: self.hooks.clone(),
            fade_ms: self.fade_ms,
            state: Rc::clone(&self.state),
            alive: self.alive.clone(),
        }
    }

    /// The document finished loading. Repeated calls are harmless.
    pub fn dom_complete(&self) {
        if !self.alive.is_alive() {
            return;
        }
        self.state.borrow_mut().ready.dom_complete = true;
        self.context().evaluate();
    }

    /// Re-check readiness; a no-op unless dismissal is due and not yet started.
    pub fn evaluate(&self) {
        self.context().evaluate();
    }

    /// Readiness facts so far.
    pub fn ready_state(&self) -> PageReadyState {
        self.state.borrow().ready
    }

    /// Overlay phase.
    pub fn phase(&self) -> OverlayPhase {
        self.state.borrow().phase
    }

    /// Clock time of the removal.
    pub fn removed_at(&self) -> Option<Millis> {
        self.state.borrow().removed_at
    }

    /// Times the overlay was removed from the document; never more than one.
    pub fn removals(&self) -> u32 {
        self.state.borrow().removals
    }

    /// Cancel the dwell and fade timers. Idempotent.
    pub fn dispose(&self) {
        if !self.alive.kill() {
            return;
        }
        let (dwell, fade) = {
            let mut st = self.state.borrow_mut();
            (st.dwell.take(), st.fade.take())
        };
        for handle in [dwell, fade].into_iter().flatten() {
            self.sched.cancel(handle);
        }
    }
}

impl Drop for PageReadySignal {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for PageReadySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.state.borrow();
        f.debug_struct("PageReadySignal")
            .field("ready", &st.ready)
            .field("phase", &st.phase)
            .finish()
    }
}

/// Everything a scheduled continuation needs, detached from the owner.
#[derive(Clone)]
struct SignalContext {
    sched: Scheduler,
    hooks: OverlayHookRegistry,
    fade_ms: u64,
    state: Rc<RefCell<SignalState>>,
    alive: Liveness,
}

impl SignalContext {
    fn evaluate(&self) {
        if !self.alive.is_alive() {
            return;
        }
        {
            let mut st = self.state.borrow_mut();
            if st.phase != OverlayPhase::Visible || !st.ready.is_ready() {
                return;
            }
            st.phase = OverlayPhase::FadingOut;
        }
        if self.hooks.invoke() {
            tracing::debug!("overlay completion hook invoked");
        }
        let ctx = self.clone();
        let fade = self.sched.set_timeout(self.fade_ms, move |now| ctx.remove(now));
        self.state.borrow_mut().fade = Some(fade);
    }

    fn remove(&self, now: Millis) {
        if !self.alive.is_alive() {
            return;
        }
        let mut st = self.state.borrow_mut();
        st.fade = None;
        if st.phase != OverlayPhase::FadingOut {
            return;
        }
        st.phase = OverlayPhase::Removed;
        st.removed_at = Some(now);
        st.removals += 1;
        tracing::debug!(at = now.0, "startup overlay removed");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ready/signal.rs"]
mod tests;
