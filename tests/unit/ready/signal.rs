use super::*;
use std::cell::Cell;

fn setup() -> (Scheduler, OverlayHookRegistry, Rc<Cell<u32>>) {
    let sched = Scheduler::new(16);
    let hooks = OverlayHookRegistry::new();
    let calls = Rc::new(Cell::new(0));
    let c = Rc::clone(&calls);
    hooks.register(move || c.set(c.get() + 1)).unwrap();
    (sched, hooks, calls)
}

#[test]
fn waits_for_dwell_when_dom_is_fast() {
    let (sched, hooks, calls) = setup();
    let signal = PageReadySignal::start(sched.clone(), hooks, 1_200, 500);
    sched.advance(100);
    signal.dom_complete();
    assert_eq!(signal.phase(), OverlayPhase::Visible);
    assert_eq!(calls.get(), 0);

    sched.advance(1_100);
    assert_eq!(signal.phase(), OverlayPhase::FadingOut);
    assert_eq!(calls.get(), 1);

    sched.advance(500);
    assert_eq!(signal.phase(), OverlayPhase::Removed);
    assert_eq!(signal.removed_at(), Some(Millis(1_700)));
}

#[test]
fn waits_for_dom_when_dwell_is_over() {
    let (sched, hooks, calls) = setup();
    let signal = PageReadySignal::start(sched.clone(), hooks, 1_200, 500);
    sched.advance(3_000);
    assert!(signal.ready_state().minimum_dwell_elapsed);
    assert_eq!(signal.phase(), OverlayPhase::Visible);

    signal.dom_complete();
    assert_eq!(calls.get(), 1);
    sched.advance(500);
    assert_eq!(signal.removed_at(), Some(Millis(3_500)));
}

#[test]
fn removal_happens_exactly_once() {
    let (sched, hooks, calls) = setup();
    let signal = PageReadySignal::start(sched.clone(), hooks.clone(), 0, 100);
    signal.dom_complete();
    signal.dom_complete();
    sched.advance(10);
    signal.evaluate();
    signal.dom_complete();
    sched.advance(1_000);
    signal.evaluate();
    signal.dom_complete();

    assert_eq!(signal.removals(), 1);
    assert_eq!(calls.get(), 1);
    assert!(hooks.is_consumed());
    assert_eq!(sched.pending(), 0);
}

#[test]
fn missing_hook_does_not_block_dismissal() {
    let sched = Scheduler::new(16);
    let signal = PageReadySignal::start(sched.clone(), OverlayHookRegistry::new(), 200, 50);
    signal.dom_complete();
    sched.advance(250);
    assert_eq!(signal.phase(), OverlayPhase::Removed);
}

#[test]
fn dispose_cancels_pending_timers() {
    let (sched, hooks, calls) = setup();
    let signal = PageReadySignal::start(sched.clone(), hooks, 1_200, 500);
    assert_eq!(sched.pending(), 1);
    signal.dispose();
    assert_eq!(sched.pending(), 0);
    signal.dom_complete();
    sched.advance(5_000);
    assert_eq!(signal.phase(), OverlayPhase::Visible);
    assert_eq!(calls.get(), 0);
}
