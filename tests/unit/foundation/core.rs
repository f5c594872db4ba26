use super::*;

#[test]
fn viewport_rect_tracks_scroll() {
    let vp = Viewport::new(1280.0, 800.0).unwrap().with_scroll(400.0);
    assert_eq!(vp.rect(), Rect::new(0.0, 400.0, 1280.0, 1200.0));
    assert_eq!(vp.expanded(200.0), Rect::new(-200.0, 200.0, 1480.0, 1400.0));
}

#[test]
fn viewport_rejects_empty_size_and_negative_scroll() {
    assert!(Viewport::new(0.0, 10.0).is_err());
    assert!(Viewport::new(10.0, f64::NAN).is_err());
    let vp = Viewport::new(10.0, 10.0).unwrap().with_scroll(-5.0);
    assert_eq!(vp.scroll_y, 0.0);
}

#[test]
fn millis_since_saturates() {
    assert_eq!(Millis(10).since(Millis(4)), 6);
    assert_eq!(Millis(4).since(Millis(10)), 0);
    assert_eq!(Millis(1500).as_secs_f64(), 1.5);
}

#[test]
fn rgb_hex_parse_and_lerp() {
    let blue = Rgb::from_hex("#2563eb").unwrap();
    assert_eq!(blue.to_hex(), "#2563eb");
    let green = Rgb::from_hex("#10b981").unwrap();
    assert_eq!(blue.lerp(green, 1.0), green);
    assert_eq!(blue.lerp(green, 0.0), blue);
    assert!(Rgb::from_hex("2563eb").is_err());
    assert!(Rgb::from_hex("#25zz").is_err());
    assert!(Rgb::from_hex("#gg63eb").is_err());
}
