use super::*;

#[test]
fn untriggered_reveal_holds_from_pose() {
    let r = Reveal::new(RevealSpec::rise_text());
    assert!(!r.is_triggered());
    assert_eq!(r.sample(Millis(10_000)), RevealSpec::rise_text().from);
}

#[test]
fn trigger_latches_once() {
    let mut r = Reveal::new(RevealSpec::rise_text());
    assert!(r.trigger(Millis(100)));
    assert!(!r.trigger(Millis(400)));
    // Progress is measured from the first trigger.
    assert_eq!(r.progress(Millis(350)), 0.5);
    assert!(r.is_settled(Millis(600)));
    assert_eq!(r.sample(Millis(600)), RevealPose::REST);
}

#[test]
fn delay_postpones_start() {
    let mut r = Reveal::new(RevealSpec::counter_tile(2));
    r.trigger(Millis(0));
    assert_eq!(r.progress(Millis(199)), 0.0);
    assert_eq!(r.progress(Millis(200)), 0.0);
    assert_eq!(r.progress(Millis(500)), 0.5);
    assert_eq!(r.progress(Millis(800)), 1.0);
}

#[test]
fn slide_card_moves_from_left() {
    let mut r = Reveal::new(RevealSpec::slide_card());
    r.trigger(Millis(0));
    let start = r.sample(Millis(0));
    assert_eq!(start.x_percent, -100.0);
    assert_eq!(start.opacity, 0.0);
    let mid = r.sample(Millis(500));
    assert!(mid.x_percent > -100.0 && mid.x_percent < 0.0);
}
