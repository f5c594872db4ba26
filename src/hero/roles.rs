use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::error::{FolioError, FolioResult};
use crate::sched::host::{LoopControl, LoopHandle, Scheduler, TaskHandle};
use crate::sched::liveness::Liveness;

/// Time each role stays on screen.
pub const ROLE_PERIOD_MS: u64 = 3000;

/// Roles shown in the hero headline.
pub fn default_roles() -> Vec<String> {
    [
        "FullStack Developer",
        "React Specialist",
        "Mobile App Builder",
        "Automation Engineer",
        "Web Scraping Specialist",
        "Apify Actor Developer",
        "CRM & Workflow Builder",
        "Problem Solver",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

/// Rendered state of the ticker.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RoleFrame {
    /// Index into the looped list (the roles plus a copy of the first).
    pub index: usize,
    /// Role text at `index`.
    pub role: String,
    /// Transitions are suppressed for the frame after a snap back to the start.
    pub animate: bool,
}

struct TickerState {
    looped: Vec<String>,
    index: usize,
    resetting: bool,
    reset_frame: Option<TaskHandle>,
}

/// Vertically scrolling role list that loops seamlessly.
///
/// The list is rendered with a copy of the first role at the end. Once the
/// slide onto that copy finishes, the ticker jumps back to index 0 with
/// transitions disabled for one frame so the jump is invisible.
pub struct RoleTicker {
    sched: Scheduler,
    state: Rc<RefCell<TickerState>>,
    alive: Liveness,
    interval: LoopHandle,
}

impl RoleTicker {
    /// Start advancing every [`ROLE_PERIOD_MS`]. Fails on an empty list.
    pub fn start(roles: Vec<String>, sched: Scheduler) -> FolioResult<Self> {
        let Some(first) = roles.first().cloned() else {
            return Err(FolioError::validation("role ticker needs at least one role"));
        };
        let mut looped = roles;
        looped.push(first);
        let state = Rc::new(RefCell::new(TickerState {
            looped,
            index: 0,
            resetting: false,
            reset_frame: None,
        }));
        let alive = Liveness::new();
        let interval = {
            let state = Rc::clone(&state);
            sched.interval(ROLE_PERIOD_MS, alive.clone(), move |_| {
                let mut st = state.borrow_mut();
                st.index += 1;
                LoopControl::Continue
            })
        };
        Ok(Self {
            sched,
            state,
            alive,
            interval,
        })
    }

    fn real_len(&self) -> usize {
        self.state.borrow().looped.len() - 1
    }

    /// Current index, role and transition flag.
    pub fn frame(&self) -> RoleFrame {
        let st = self.state.borrow();
        let last = st.looped.len() - 1;
        RoleFrame {
            index: st.index,
            role: st.looped[st.index.min(last)].clone(),
            animate: !st.resetting,
        }
    }

    /// The slide transition finished.
    pub fn transition_end(&self) {
        let at_clone = self.state.borrow().index == self.real_len();
        if at_clone {
            self.snap_to_start();
        }
    }

    /// The page became visible again after being hidden. Intervals keep
    /// firing in the background, so the index may have run past the end.
    pub fn page_visible(&self) {
        let overshot = self.state.borrow().index >= self.real_len();
        if overshot {
            self.snap_to_start();
        } else {
            self.begin_reset();
        }
    }

    fn snap_to_start(&self) {
        self.state.borrow_mut().index = 0;
        self.begin_reset();
    }

    fn begin_reset(&self) {
        if !self.alive.is_alive() {
            return;
        }
        let previous = {
            let mut st = self.state.borrow_mut();
            st.resetting = true;
            st.reset_frame.take()
        };
        if let Some(previous) = previous {
            self.sched.cancel(previous);
        }
        let state = Rc::clone(&self.state);
        let alive = self.alive.clone();
        let handle = self.sched.request_frame(move |_| {
            if !alive.is_alive() {
                return;
            }
            let mut st = state.borrow_mut();
            st.resetting = false;
            st.reset_frame = None;
        });
        self.state.borrow_mut().reset_frame = Some(handle);
    }

    /// Cancel the interval and any pending reset frame. Idempotent.
    pub fn stop(&self) {
        if !self.alive.kill() {
            return;
        }
        self.interval.cancel();
        if let Some(frame) = self.state.borrow_mut().reset_frame.take() {
            self.sched.cancel(frame);
        }
    }
}

impl Drop for RoleTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/hero/roles.rs"]
mod tests;
