use std::cell::{Cell, RefCell};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use std::rc::Rc;

use crate::foundation::core::Millis;
use crate::sched::liveness::Liveness;

type Callback = Box<dyn FnOnce(Millis)>;

/// Identifies a queued frame callback or timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskHandle {
    /// Animation-frame callback.
    Frame(u64),
    /// Timeout.
    Timer(u64),
}

struct SchedulerInner {
    now: Millis,
    frame_interval_ms: u64,
    next_id: u64,
    /// `(due, id)`; entries whose callback was cancelled are skipped lazily.
    timers: BinaryHeap<Reverse<(u64, u64)>>,
    timer_cbs: HashMap<u64, Callback>,
    frames: BTreeMap<u64, Callback>,
    fired: u64,
}

impl SchedulerInner {
    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn next_live_timer(&mut self) -> Option<(u64, u64)> {
        while let Some(&Reverse((due, id))) = self.timers.peek() {
            if self.timer_cbs.contains_key(&id) {
                return Some((due, id));
            }
            self.timers.pop();
        }
        None
    }
}

/// Deterministic single-threaded host loop: a virtual clock, animation-frame
/// callbacks and timers.
///
/// Determinism rule: timers fire in `(due, id)` order, timers due on a frame
/// boundary fire before that frame's callbacks, and frame callbacks run in
/// request order. Callbacks queued while a batch runs are deferred to a later
/// turn.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Scheduler {
    /// Clock at 0 with frames every `frame_interval_ms` (at least 1).
    pub fn new(frame_interval_ms: u64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                now: Millis(0),
                frame_interval_ms: frame_interval_ms.max(1),
                next_id: 0,
                timers: BinaryHeap::new(),
                timer_cbs: HashMap::new(),
                frames: BTreeMap::new(),
                fired: 0,
            })),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Millis {
        self.inner.borrow().now
    }

    /// Spacing between animation frames.
    pub fn frame_interval_ms(&self) -> u64 {
        self.inner.borrow().frame_interval_ms
    }

    /// Queue `cb` for the next animation frame.
    pub fn request_frame(&self, cb: impl FnOnce(Millis) + 'static) -> TaskHandle {
        let mut inner = self.inner.borrow_mut();
        let id = inner.alloc_id();
        inner.frames.insert(id, Box::new(cb));
        TaskHandle::Frame(id)
    }

    /// Queue `cb` to run once `delay_ms` of virtual time has elapsed.
    pub fn set_timeout(&self, delay_ms: u64, cb: impl FnOnce(Millis) + 'static) -> TaskHandle {
        let mut inner = self.inner.borrow_mut();
        let id = inner.alloc_id();
        let due = inner.now.0.saturating_add(delay_ms);
        inner.timers.push(Reverse((due, id)));
        inner.timer_cbs.insert(id, Box::new(cb));
        TaskHandle::Timer(id)
    }

    /// Drop a queued callback. Returns whether anything was still pending.
    pub fn cancel(&self, handle: TaskHandle) -> bool {
        let mut inner = self.inner.borrow_mut();
        let removed = match handle {
            TaskHandle::Frame(id) => inner.frames.remove(&id).is_some(),
            TaskHandle::Timer(id) => inner.timer_cbs.remove(&id).is_some(),
        };
        if removed {
            tracing::debug!(?handle, "cancelled scheduled task");
        }
        removed
    }

    /// Outstanding frame callbacks plus timers.
    pub fn pending(&self) -> usize {
        let inner = self.inner.borrow();
        inner.frames.len() + inner.timer_cbs.len()
    }

    /// Total callbacks executed so far.
    pub fn fired(&self) -> u64 {
        self.inner.borrow().fired
    }

    /// Run every frame callback queued before this call, at the current time.
    pub fn run_frame(&self) -> usize {
        let (now, batch): (Millis, Vec<u64>) = {
            let inner = self.inner.borrow();
            (inner.now, inner.frames.keys().copied().collect())
        };
        let mut ran = 0;
        for id in batch {
            let cb = self.inner.borrow_mut().frames.remove(&id);
            if let Some(cb) = cb {
                self.inner.borrow_mut().fired += 1;
                cb(now);
                ran += 1;
            }
        }
        ran
    }

    fn run_timers_due(&self, upto: u64) -> usize {
        let mut ran = 0;
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                match inner.next_live_timer() {
                    Some((due, id)) if due <= upto => {
                        inner.timers.pop();
                        let now = inner.now;
                        inner.timer_cbs.remove(&id).map(|cb| (now, cb))
                    }
                    _ => None,
                }
            };
            let Some((now, cb)) = next else {
                break;
            };
            self.inner.borrow_mut().fired += 1;
            cb(now);
            ran += 1;
        }
        ran
    }

    /// Move the virtual clock forward by `ms`, firing timers and animation
    /// frames on the way. Returns the number of callbacks executed.
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.now().0.saturating_add(ms);
        let mut ran = 0;
        loop {
            let (now, interval, next_timer) = {
                let mut inner = self.inner.borrow_mut();
                let next_timer = inner.next_live_timer().map(|(due, _)| due);
                (inner.now.0, inner.frame_interval_ms, next_timer)
            };
            let next_frame = (now / interval + 1) * interval;
            let next = match next_timer {
                Some(due) if due <= next_frame => due.max(now),
                _ => next_frame,
            };
            if next > target {
                break;
            }
            self.inner.borrow_mut().now = Millis(next);
            if next_timer.is_some_and(|due| due.max(now) == next) {
                ran += self.run_timers_due(next);
            }
            if next == next_frame {
                ran += self.run_frame();
            }
        }
        self.inner.borrow_mut().now = Millis(target);
        ran
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(16)
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Scheduler")
            .field("now", &inner.now)
            .field("frames", &inner.frames.len())
            .field("timers", &inner.timer_cbs.len())
            .finish()
    }
}

/// Whether a repeating body wants another turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    /// Schedule another turn.
    Continue,
    /// End the chain.
    Stop,
}

#[derive(Clone, Copy, Debug)]
enum Cadence {
    Frame,
    Every(u64),
}

struct LoopState {
    alive: Liveness,
    cadence: Cadence,
    body: RefCell<Box<dyn FnMut(Millis) -> LoopControl>>,
    current: Cell<Option<TaskHandle>>,
}

/// Handle to a self-rescheduling callback chain started with
/// [`Scheduler::frame_loop`] or [`Scheduler::interval`].
pub struct LoopHandle {
    sched: Scheduler,
    state: Rc<LoopState>,
}

impl LoopHandle {
    /// Cancel the queued turn, if any. The liveness flag is left to its owner.
    pub fn cancel(&self) -> bool {
        match self.state.current.take() {
            Some(handle) => self.sched.cancel(handle),
            None => false,
        }
    }

    /// Whether a turn is queued.
    pub fn is_scheduled(&self) -> bool {
        self.state.current.get().is_some()
    }
}

impl Scheduler {
    /// Run `body` on every animation frame while `alive` holds and the body
    /// returns [`LoopControl::Continue`].
    pub fn frame_loop(
        &self,
        alive: Liveness,
        body: impl FnMut(Millis) -> LoopControl + 'static,
    ) -> LoopHandle {
        self.start_loop(alive, Cadence::Frame, Box::new(body))
    }

    /// Run `body` every `period_ms` while `alive` holds and the body returns
    /// [`LoopControl::Continue`].
    pub fn interval(
        &self,
        period_ms: u64,
        alive: Liveness,
        body: impl FnMut(Millis) -> LoopControl + 'static,
    ) -> LoopHandle {
        self.start_loop(alive, Cadence::Every(period_ms.max(1)), Box::new(body))
    }

    fn start_loop(
        &self,
        alive: Liveness,
        cadence: Cadence,
        body: Box<dyn FnMut(Millis) -> LoopControl>,
    ) -> LoopHandle {
        let state = Rc::new(LoopState {
            alive,
            cadence,
            body: RefCell::new(body),
            current: Cell::new(None),
        });
        schedule_turn(self, Rc::clone(&state));
        LoopHandle {
            sched: self.clone(),
            state,
        }
    }
}

fn schedule_turn(sched: &Scheduler, state: Rc<LoopState>) {
    let next_sched = sched.clone();
    let turn_state = Rc::clone(&state);
    let turn = move |now: Millis| {
        turn_state.current.set(None);
        if !turn_state.alive.is_alive() {
            return;
        }
        let control = {
            let mut body = turn_state.body.borrow_mut();
            (body.as_mut())(now)
        };
        if control == LoopControl::Continue && turn_state.alive.is_alive() {
            schedule_turn(&next_sched, turn_state);
        }
    };
    let handle = match state.cadence {
        Cadence::Frame => sched.request_frame(turn),
        Cadence::Every(period) => sched.set_timeout(period, turn),
    };
    state.current.set(Some(handle));
}

#[cfg(test)]
#[path = "../../tests/unit/sched/host.rs"]
mod tests;
