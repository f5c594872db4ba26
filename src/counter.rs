//! Visibility-triggered numeric count-up.

use std::cell::RefCell;
use std::rc::Rc;

use crate::animation::reveal::{Reveal, RevealPose, RevealSpec};
use crate::foundation::core::{ElementId, Millis, Rect, Viewport};
use crate::foundation::error::{FolioError, FolioResult};
use crate::sched::host::{LoopControl, LoopHandle, Scheduler, TaskHandle};
use crate::sched::liveness::Liveness;
use crate::timeline::trigger::CONTENT_START;
use crate::visibility::gate::VisibilityGate;
use crate::visibility::observer::{ObserveOptions, ObserverHub};

/// Length of one count-up.
pub const COUNT_DURATION_MS: u64 = 2000;
/// Start offset between neighbouring counters of a group.
pub const STAGGER_MS: u64 = 150;

/// What a counter counts up to.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CounterTarget {
    /// Value shown once the count settles.
    pub final_value: u64,
    /// Text appended to the number, e.g. `+` or `%`.
    pub suffix: String,
    #[serde(default)]
    /// Delay between the trigger and the first frame.
    pub start_delay_ms: u64,
    #[serde(default)]
    /// Caption under the number.
    pub label: String,
}

impl CounterTarget {
    /// Target with no start delay.
    pub fn new(final_value: u64, suffix: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            final_value,
            suffix: suffix.into(),
            start_delay_ms: 0,
            label: label.into(),
        }
    }

    /// Same target, starting `start_delay_ms` after the trigger.
    pub fn with_delay(mut self, start_delay_ms: u64) -> Self {
        self.start_delay_ms = start_delay_ms;
        self
    }
}

/// The stock tiles shown under the hero section.
pub fn default_targets() -> Vec<CounterTarget> {
    vec![
        CounterTarget::new(6, "+", "Years Experience"),
        CounterTarget::new(20, "+", "Projects Completed"),
        CounterTarget::new(10, "+", "Technologies"),
        CounterTarget::new(100, "%", "Dedication"),
    ]
}

/// `floor(target * (1 - (1 - t)^3))`, exactly `target` once `t >= 1`.
pub fn eased_count(target: u64, t: f64) -> u64 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    if t >= 1.0 {
        return target;
    }
    let eased = 1.0 - (1.0 - t).powi(3);
    ((target as f64 * eased).floor() as u64).min(target)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Where a [`ThresholdCounter`] is in its one-shot run.
pub enum CounterPhase {
    /// Not seen yet.
    Idle,
    /// Triggered, waiting out the stagger delay.
    Delayed,
    /// Advancing every animation frame.
    Counting,
    /// Showing the exact target.
    Done,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Displayed state of one counter.
pub struct CounterSnapshot {
    /// Caption.
    pub label: String,
    /// Number currently shown.
    pub value: u64,
    /// Suffix appended to the number.
    pub suffix: String,
    /// Run phase.
    pub phase: CounterPhase,
}

impl CounterSnapshot {
    /// Number and suffix as rendered, e.g. `20+`.
    pub fn display(&self) -> String {
        format!("{}{}", self.value, self.suffix)
    }
}

struct CounterState {
    target: CounterTarget,
    duration_ms: u64,
    value: u64,
    phase: CounterPhase,
    started_at: Option<Millis>,
    delay: Option<TaskHandle>,
    frames: Option<LoopHandle>,
}

/// One-shot count-up started by the first positive visibility observation.
///
/// Later observations never restart it; the value only resets when the
/// counter is dropped and built again.
pub struct ThresholdCounter {
    sched: Scheduler,
    gate: VisibilityGate,
    state: Rc<RefCell<CounterState>>,
    alive: Liveness,
}

impl ThresholdCounter {
    /// Counter that starts once its element is observed with `options`.
    pub fn new(
        target: CounterTarget,
        duration_ms: u64,
        sched: Scheduler,
        hub: ObserverHub,
        options: ObserveOptions,
    ) -> Self {
        let state = Rc::new(RefCell::new(CounterState {
            target,
            duration_ms,
            value: 0,
            phase: CounterPhase::Idle,
            started_at: None,
            delay: None,
            frames: None,
        }));
        let alive = Liveness::new();
        let gate = VisibilityGate::new(hub, options);

        let on_visible = {
            let sched = sched.clone();
            let state = Rc::clone(&state);
            let alive = alive.clone();
            move || schedule_start(&sched, &state, &alive)
        };
        gate.on_trigger(on_visible);

        Self {
            sched,
            gate,
            state,
            alive,
        }
    }

    /// Attach the counter's element; see [`VisibilityGate::mount`].
    pub fn mount(&self, target: Option<ElementId>) {
        if self.alive.is_alive() {
            self.gate.mount(target);
        }
    }

    /// Number currently shown.
    pub fn value(&self) -> u64 {
        self.state.borrow().value
    }

    /// Current run phase.
    pub fn phase(&self) -> CounterPhase {
        self.state.borrow().phase
    }

    /// Label, value and phase for display.
    pub fn snapshot(&self) -> CounterSnapshot {
        let st = self.state.borrow();
        CounterSnapshot {
            label: st.target.label.clone(),
            value: st.value,
            suffix: st.target.suffix.clone(),
            phase: st.phase,
        }
    }

    /// Release the observation, the stagger timer and the frame loop.
    pub fn dispose(&self) {
        if !self.alive.kill() {
            return;
        }
        self.gate.dispose();
        let (delay, frames) = {
            let mut st = self.state.borrow_mut();
            (st.delay.take(), st.frames.take())
        };
        if let Some(delay) = delay {
            self.sched.cancel(delay);
        }
        if let Some(frames) = frames {
            frames.cancel();
        }
    }
}

impl Drop for ThresholdCounter {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn schedule_start(sched: &Scheduler, state: &Rc<RefCell<CounterState>>, alive: &Liveness) {
    if !alive.is_alive() {
        return;
    }
    let delay_ms = {
        let mut st = state.borrow_mut();
        if st.phase != CounterPhase::Idle {
            return;
        }
        st.phase = CounterPhase::Delayed;
        st.target.start_delay_ms
    };
    let handle = {
        let loop_sched = sched.clone();
        let state = Rc::clone(state);
        let alive = alive.clone();
        sched.set_timeout(delay_ms, move |now| {
            if !alive.is_alive() {
                return;
            }
            {
                let mut st = state.borrow_mut();
                st.delay = None;
                st.phase = CounterPhase::Counting;
                st.started_at = Some(now);
            }
            let frames = {
                let state = Rc::clone(&state);
                loop_sched.frame_loop(alive, move |now| count_frame(&state, now))
            };
            state.borrow_mut().frames = Some(frames);
        })
    };
    state.borrow_mut().delay = Some(handle);
}

fn count_frame(state: &Rc<RefCell<CounterState>>, now: Millis) -> LoopControl {
    let mut st = state.borrow_mut();
    let Some(start) = st.started_at else {
        return LoopControl::Stop;
    };
    let t = if st.duration_ms == 0 {
        1.0
    } else {
        now.since(start) as f64 / st.duration_ms as f64
    };
    if t >= 1.0 {
        st.value = st.target.final_value;
        st.phase = CounterPhase::Done;
        st.frames = None;
        tracing::debug!(label = %st.target.label, value = st.value, "counter settled");
        return LoopControl::Stop;
    }
    st.value = eased_count(st.target.final_value, t).max(st.value);
    LoopControl::Continue
}

/// Sample of a counter trace produced by [`trace`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TracePoint {
    /// Clock time of the sample.
    pub at: Millis,
    /// Value shown at that time.
    pub value: u64,
}

/// Run a single counter to completion on a private clock and record the value
/// after every frame.
pub fn trace(target: u64, duration_ms: u64, frame_ms: u64) -> FolioResult<Vec<TracePoint>> {
    if frame_ms == 0 {
        return Err(FolioError::validation("frame interval must be > 0"));
    }
    let sched = Scheduler::new(frame_ms);
    let hub = ObserverHub::new();
    hub.set_viewport(Viewport::new(100.0, 100.0)?);
    hub.set_layout(ElementId(0), Rect::new(0.0, 0.0, 10.0, 10.0));

    let counter = ThresholdCounter::new(
        CounterTarget::new(target, "", ""),
        duration_ms,
        sched.clone(),
        hub.clone(),
        ObserveOptions::new(0.0, 0.5)?,
    );
    counter.mount(Some(ElementId(0)));
    hub.notify();

    let mut out = vec![TracePoint {
        at: sched.now(),
        value: counter.value(),
    }];
    // A frame past the duration, plus one for the start-up frame.
    let max_frames = duration_ms / frame_ms + 2;
    for _ in 0..max_frames {
        sched.advance(frame_ms);
        out.push(TracePoint {
            at: sched.now(),
            value: counter.value(),
        });
        if counter.phase() == CounterPhase::Done {
            break;
        }
    }
    Ok(out)
}

/// The counter strip: one entrance reveal for the container plus one
/// [`ThresholdCounter`] per tile, staggered by index.
pub struct CounterGroup {
    hub: ObserverHub,
    container: ElementId,
    reveals: Vec<Reveal>,
    tiles: Vec<(ElementId, ThresholdCounter)>,
}

impl CounterGroup {
    /// Build the group and mount one counter per tile. Tile `i` starts
    /// `i * STAGGER_MS` after the trigger.
    pub fn new(
        container: ElementId,
        tiles: Vec<(ElementId, CounterTarget)>,
        sched: &Scheduler,
        hub: &ObserverHub,
        options: ObserveOptions,
    ) -> Self {
        let reveals = (0..tiles.len())
            .map(|i| Reveal::new(RevealSpec::counter_tile(i)))
            .collect();
        let tiles = tiles
            .into_iter()
            .enumerate()
            .map(|(i, (element, target))| {
                let target = target.with_delay(i as u64 * STAGGER_MS);
                let counter = ThresholdCounter::new(
                    target,
                    COUNT_DURATION_MS,
                    sched.clone(),
                    hub.clone(),
                    options,
                );
                counter.mount(Some(element));
                (element, counter)
            })
            .collect();
        Self {
            hub: hub.clone(),
            container,
            reveals,
            tiles,
        }
    }

    /// Element that owns the strip.
    pub fn container(&self) -> ElementId {
        self.container
    }

    /// Latch the entrance once the container's top passes 85% of the viewport.
    pub fn on_scroll(&mut self, viewport: Viewport, now: Millis) {
        let Some(rect) = self.hub.layout_of(self.container) else {
            return;
        };
        if viewport.scroll_y >= CONTENT_START.resolve(rect, viewport) {
            for reveal in &mut self.reveals {
                reveal.trigger(now);
            }
        }
    }

    /// Whether the entrance reveal has latched.
    pub fn entered(&self) -> bool {
        self.reveals.iter().any(Reveal::is_triggered)
    }

    /// Entrance pose of each tile at `now`.
    pub fn poses(&self, now: Millis) -> Vec<RevealPose> {
        self.reveals.iter().map(|r| r.sample(now)).collect()
    }

    /// Displayed state of each tile, in order.
    pub fn snapshots(&self) -> Vec<CounterSnapshot> {
        self.tiles.iter().map(|(_, c)| c.snapshot()).collect()
    }

    /// The counter mounted on `element`.
    pub fn counter(&self, element: ElementId) -> Option<&ThresholdCounter> {
        self.tiles
            .iter()
            .find(|(e, _)| *e == element)
            .map(|(_, c)| c)
    }

    /// Release every tile's counter. Idempotent.
    pub fn dispose(&self) {
        for (_, counter) in &self.tiles {
            counter.dispose();
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/counter/counter.rs"]
mod tests;
