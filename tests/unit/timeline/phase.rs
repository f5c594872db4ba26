use super::*;

#[test]
fn phases_start_staggered_and_overlap() {
    let v = PhaseVisuals::at(0.25);
    assert!((v.phase(PhaseKind::CircleDraw) - 0.625).abs() < 1e-12);
    assert!((v.phase(PhaseKind::LogoFade) - 1.0 / 6.0).abs() < 1e-12);
    assert_eq!(v.phase(PhaseKind::LineGrow), 0.0);
}

#[test]
fn rest_and_complete_states() {
    let start = PhaseVisuals::at(0.0);
    assert_eq!(start.progress, [0.0; 3]);
    assert!((start.ring_dash_offset - RING_CIRCUMFERENCE).abs() < 1e-12);
    assert_eq!(start.logo_opacity, 0.0);
    assert!((start.logo_scale - 0.8).abs() < 1e-12);
    assert_eq!(start.line_scale_y, 0.0);

    for p in [1.0, 3.0] {
        let end = PhaseVisuals::at(p);
        assert_eq!(end.progress, [1.0; 3]);
        assert!(end.ring_dash_offset.abs() < 1e-12);
        assert!((end.logo_scale - 1.0).abs() < 1e-12);
        assert!((end.line_scale_y - 1.0).abs() < 1e-12);
    }
}

#[test]
fn logo_phase_can_run_before_circle_finishes() {
    let v = PhaseVisuals::at(0.3);
    assert!(v.phase(PhaseKind::CircleDraw) < 1.0);
    assert!(v.phase(PhaseKind::LogoFade) > 0.0);
    assert!(v.logo_opacity > 0.0);
}

#[test]
fn visuals_are_monotonic_in_progress() {
    let mut prev = PhaseVisuals::at(0.0);
    for i in 1..=100 {
        let v = PhaseVisuals::at(f64::from(i) / 100.0);
        assert!(v.ring_dash_offset <= prev.ring_dash_offset + 1e-12);
        assert!(v.logo_opacity >= prev.logo_opacity - 1e-12);
        assert!(v.line_scale_y >= prev.line_scale_y - 1e-12);
        prev = v;
    }
}

#[test]
fn line_keeps_growing_until_the_exit_trigger() {
    let early = PhaseVisuals::at(0.71);
    assert_eq!(early.phase(PhaseKind::CircleDraw), 1.0);
    assert_eq!(early.phase(PhaseKind::LogoFade), 1.0);
    assert!(early.phase(PhaseKind::LineGrow) < 1.0);

    let late = PhaseVisuals::at(0.85);
    assert!(late.line_scale_y > early.line_scale_y);
    assert!(late.line_scale_y < 1.0);
    assert!((late.phase(PhaseKind::LineGrow) - 0.55 / 0.7).abs() < 1e-12);

    assert_eq!(PhaseVisuals::at(1.0).phase(PhaseKind::LineGrow), 1.0);
}
