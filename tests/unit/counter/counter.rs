use super::*;

fn visible_hub() -> ObserverHub {
    let hub = ObserverHub::new();
    hub.set_viewport(Viewport::new(1000.0, 800.0).unwrap());
    hub.set_layout(ElementId(1), Rect::new(0.0, 100.0, 200.0, 300.0));
    hub
}

fn counter_opts() -> ObserveOptions {
    ObserveOptions::new(0.0, 0.5).unwrap()
}

#[test]
fn eased_count_follows_cubic_out() {
    assert_eq!(eased_count(100, 0.0), 0);
    assert_eq!(eased_count(100, 0.5), 87);
    assert_eq!(eased_count(100, 1.0), 100);
    assert_eq!(eased_count(100, 7.0), 100);
    assert_eq!(eased_count(20, f64::NAN), 0);
}

#[test]
fn counts_are_monotonic_and_converge_exactly() {
    for target in [0, 1, 20, 100] {
        for (duration, frame) in [(2_000, 16), (333, 7), (0, 16), (50, 100)] {
            let points = trace(target, duration, frame).unwrap();
            assert!(
                points.windows(2).all(|w| w[0].value <= w[1].value),
                "non-monotonic for target {target} duration {duration}"
            );
            assert_eq!(points.last().map(|p| p.value), Some(target));
        }
    }
}

#[test]
fn trace_rejects_zero_frame_interval() {
    assert!(trace(10, 100, 0).is_err());
}

#[test]
fn retriggering_never_restarts_the_count() {
    let sched = Scheduler::new(16);
    let hub = visible_hub();
    let counter = ThresholdCounter::new(
        CounterTarget::new(20, "+", "Projects"),
        2_000,
        sched.clone(),
        hub.clone(),
        counter_opts(),
    );
    counter.mount(Some(ElementId(1)));
    hub.notify();
    sched.advance(1_000);
    let mid = counter.value();
    assert!(mid > 0 && mid < 20);

    // Scroll away and back.
    hub.set_viewport(Viewport::new(1000.0, 800.0).unwrap().with_scroll(5_000.0));
    hub.notify();
    hub.set_viewport(Viewport::new(1000.0, 800.0).unwrap());
    hub.notify();
    counter.mount(Some(ElementId(1)));
    assert!(counter.value() >= mid);

    sched.advance(1_100);
    assert_eq!(counter.phase(), CounterPhase::Done);
    assert_eq!(counter.snapshot().display(), "20+");
    assert_eq!(sched.pending(), 0);
}

#[test]
fn stagger_delays_the_start() {
    let sched = Scheduler::new(16);
    let hub = visible_hub();
    let counter = ThresholdCounter::new(
        CounterTarget::new(10, "+", "Tech").with_delay(2 * STAGGER_MS),
        2_000,
        sched.clone(),
        hub.clone(),
        counter_opts(),
    );
    counter.mount(Some(ElementId(1)));
    hub.notify();
    assert_eq!(counter.phase(), CounterPhase::Delayed);
    sched.advance(299);
    assert_eq!(counter.phase(), CounterPhase::Delayed);
    assert_eq!(counter.value(), 0);
    sched.advance(1);
    assert_eq!(counter.phase(), CounterPhase::Counting);
}

#[test]
fn below_threshold_does_not_start() {
    let sched = Scheduler::new(16);
    let hub = visible_hub();
    // Only the top 40% of the tile is on screen.
    hub.set_layout(ElementId(1), Rect::new(0.0, 720.0, 200.0, 920.0));
    let counter = ThresholdCounter::new(
        CounterTarget::new(6, "+", "Years"),
        2_000,
        sched.clone(),
        hub.clone(),
        counter_opts(),
    );
    counter.mount(Some(ElementId(1)));
    hub.notify();
    assert_eq!(counter.phase(), CounterPhase::Idle);
}

#[test]
fn teardown_mid_count_silences_every_callback() {
    let sched = Scheduler::new(16);
    let hub = visible_hub();
    let counter = ThresholdCounter::new(
        CounterTarget::new(100, "%", "Dedication").with_delay(150),
        2_000,
        sched.clone(),
        hub.clone(),
        counter_opts(),
    );
    counter.mount(Some(ElementId(1)));
    hub.notify();
    sched.advance(400);
    let frozen = counter.value();

    counter.dispose();
    assert_eq!(sched.pending(), 0);
    let fired = sched.fired();
    sched.advance(5_000);
    assert_eq!(sched.fired(), fired);
    assert_eq!(counter.value(), frozen);
}

#[test]
fn teardown_before_visibility_leaves_nothing_behind() {
    let sched = Scheduler::new(16);
    let hub = visible_hub();
    let counter = ThresholdCounter::new(
        CounterTarget::new(6, "+", "Years"),
        2_000,
        sched.clone(),
        hub.clone(),
        counter_opts(),
    );
    counter.mount(Some(ElementId(1)));
    drop(counter);
    assert_eq!(hub.active_subscriptions(), 0);
    hub.notify();
    sched.advance(3_000);
    assert_eq!(sched.fired(), 0);
}

#[test]
fn group_staggers_tiles_and_reveals_once() {
    let sched = Scheduler::new(16);
    let hub = ObserverHub::new();
    let vp = Viewport::new(1000.0, 800.0).unwrap();
    hub.set_viewport(vp);
    hub.set_layout(ElementId(100), Rect::new(0.0, 500.0, 1000.0, 700.0));
    let tiles: Vec<(ElementId, CounterTarget)> = default_targets()
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            let id = ElementId(101 + i as u64);
            hub.set_layout(id, Rect::new(250.0 * i as f64, 500.0, 250.0 * (i + 1) as f64, 700.0));
            (id, t)
        })
        .collect();
    let mut group = CounterGroup::new(ElementId(100), tiles, &sched, &hub, counter_opts());

    group.on_scroll(vp, Millis(0));
    assert!(group.entered());
    hub.notify();
    sched.advance(2_500);
    let shown: Vec<String> = group.snapshots().iter().map(CounterSnapshot::display).collect();
    assert_eq!(shown, ["6+", "20+", "10+", "100%"]);
    assert!(group.poses(sched.now()).iter().all(|p| *p == RevealPose::REST));

    group.dispose();
    assert_eq!(sched.pending(), 0);
    assert_eq!(hub.active_subscriptions(), 0);
    assert!(group.counter(ElementId(102)).is_some());
}
