use super::*;

fn card() -> Rect {
    Rect::new(0.0, 0.0, 200.0, 100.0)
}

#[test]
fn angle_is_measured_from_card_centre() {
    let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
    assert!(close(glow_angle(Point::new(200.0, 50.0), card()), 60.0));
    // Screen y grows downward.
    assert!(close(glow_angle(Point::new(100.0, 100.0), card()), 150.0));
    assert!(close(glow_angle(Point::new(0.0, 50.0), card()), 240.0));
    assert!(close(glow_angle(Point::new(100.0, 0.0), card()), 330.0));
}

#[test]
fn most_recent_write_wins() {
    let writer = GlowChannel::new();
    let reader = writer.clone();
    assert_eq!(reader.read(), None);

    writer.track(Point::new(0.0, 50.0), card());
    writer.track(Point::new(200.0, 50.0), card());
    assert_eq!(reader.writes(), 2);
    assert!((reader.read().unwrap() - 60.0).abs() < 1e-9);
}
