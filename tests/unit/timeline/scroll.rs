use super::*;
use crate::foundation::core::Rect;
use crate::timeline::phase::PhaseKind;

const ITEM: ElementId = ElementId(10);

fn setup() -> (ObserverHub, ScrollTimeline, Viewport) {
    let hub = ObserverHub::new();
    hub.set_layout(ITEM, Rect::new(0.0, 3_000.0, 800.0, 3_400.0));
    let vp = Viewport::new(1280.0, 1000.0).unwrap();
    let mut tl = ScrollTimeline::new(hub.clone());
    tl.register(TimelineItem::new(ITEM), Millis(0)).unwrap();
    tl.on_resize(vp, Millis(0));
    (hub, tl, vp)
}

#[test]
fn progress_maps_scroll_between_entry_and_exit() {
    let (_hub, mut tl, vp) = setup();
    // entry = 3000 - 850 = 2150, exit = 3200 - 400 = 2800
    let ext = tl.extent(ITEM).unwrap();
    assert!((ext.entry_y - 2_150.0).abs() < 1e-9);
    assert!((ext.exit_y - 2_800.0).abs() < 1e-9);

    assert_eq!(tl.progress(ITEM), Some(0.0));
    tl.on_scroll(vp.with_scroll(2_475.0), Millis(10));
    assert!((tl.progress(ITEM).unwrap() - 0.5).abs() < 1e-12);
    tl.on_scroll(vp.with_scroll(9_000.0), Millis(20));
    assert_eq!(tl.progress(ITEM), Some(1.0));
}

#[test]
fn scrubbing_back_restores_every_phase() {
    let (_hub, mut tl, vp) = setup();
    tl.on_scroll(vp.with_scroll(2_300.0), Millis(0));
    let before = tl.visuals(ITEM).unwrap();

    for y in [2_400.0, 2_700.0, 3_500.0, 100.0, 2_600.0] {
        tl.on_scroll(vp.with_scroll(y), Millis(0));
    }
    tl.on_scroll(vp.with_scroll(2_300.0), Millis(0));
    assert_eq!(tl.visuals(ITEM).unwrap(), before);
}

#[test]
fn replaying_a_scroll_sample_is_idempotent() {
    let (_hub, mut tl, vp) = setup();
    tl.on_scroll(vp.with_scroll(2_500.0), Millis(40));
    let once = tl.sample_item(ITEM, Millis(100)).unwrap();
    tl.on_scroll(vp.with_scroll(2_500.0), Millis(40));
    let twice = tl.sample_item(ITEM, Millis(100)).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn resize_recomputes_triggers_against_current_scroll() {
    let (hub, mut tl, vp) = setup();
    tl.on_scroll(vp.with_scroll(2_475.0), Millis(0));

    // Content above the item grew by 100px and the window got shorter.
    hub.set_layout(ITEM, Rect::new(0.0, 3_100.0, 800.0, 3_500.0));
    let resized = Viewport::new(1280.0, 900.0).unwrap().with_scroll(2_475.0);
    tl.on_resize(resized, Millis(0));

    let ext = tl.extent(ITEM).unwrap();
    assert!((ext.entry_y - (3_100.0 - 765.0)).abs() < 1e-9);
    assert!((ext.exit_y - (3_300.0 - 360.0)).abs() < 1e-9);
    let expected = (2_475.0 - ext.entry_y) / (ext.exit_y - ext.entry_y);
    assert!((tl.progress(ITEM).unwrap() - expected).abs() < 1e-12);
}

#[test]
fn text_reveal_latches_once_and_never_rewinds() {
    let (_hub, mut tl, vp) = setup();
    assert!(!tl.content_revealed(ITEM));

    // Content start is "top 85%": 2150.
    tl.on_scroll(vp.with_scroll(2_200.0), Millis(1_000));
    assert!(tl.content_revealed(ITEM));
    // Card start is "top 80%": 2200.
    assert!(tl.card_revealed(ITEM));

    tl.on_scroll(vp.with_scroll(0.0), Millis(1_100));
    assert!(tl.content_revealed(ITEM));
    assert_eq!(tl.progress(ITEM), Some(0.0));

    let settled = tl.sample_item(ITEM, Millis(1_500)).unwrap();
    assert_eq!(settled.content, RevealPose::REST);
    let halfway = tl.sample_item(ITEM, Millis(1_250)).unwrap();
    assert!(halfway.content.opacity > 0.0 && halfway.content.opacity < 1.0);
}

#[test]
fn items_without_layout_stay_at_rest() {
    let hub = ObserverHub::new();
    let mut tl = ScrollTimeline::new(hub.clone());
    let vp = Viewport::new(800.0, 600.0).unwrap();
    tl.on_resize(vp, Millis(0));
    tl.register(TimelineItem::new(ElementId(1)), Millis(0)).unwrap();
    tl.on_scroll(vp.with_scroll(5_000.0), Millis(0));
    assert_eq!(tl.extent(ElementId(1)), None);
    assert_eq!(tl.progress(ElementId(1)), Some(0.0));
    assert!(!tl.content_revealed(ElementId(1)));

    hub.set_layout(ElementId(1), Rect::new(0.0, 1_000.0, 100.0, 1_100.0));
    tl.on_resize(vp.with_scroll(5_000.0), Millis(0));
    assert_eq!(tl.visuals(ElementId(1)).unwrap().phase(PhaseKind::LineGrow), 1.0);
}

#[test]
fn duplicate_registration_is_rejected() {
    let (_hub, mut tl, _vp) = setup();
    assert!(tl.register(TimelineItem::new(ITEM), Millis(0)).is_err());
    assert_eq!(tl.len(), 1);
    assert!(tl.unregister(ITEM));
    assert!(tl.is_empty());
}
