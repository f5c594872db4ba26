use super::*;
use std::cell::RefCell;
use std::rc::Rc;

fn vp(scroll_y: f64) -> Viewport {
    Viewport::new(1000.0, 800.0).unwrap().with_scroll(scroll_y)
}

#[test]
fn margin_expands_the_root() {
    // Element starts 150px below the fold.
    let target = Rect::new(0.0, 950.0, 100.0, 1050.0);
    let strict = ObserveOptions::new(0.0, 0.01).unwrap();
    let lazy = ObserveOptions::default();

    assert!(!intersect(ElementId(1), target, vp(0.0), strict).is_intersecting);
    assert!(intersect(ElementId(1), target, vp(0.0), lazy).is_intersecting);
}

#[test]
fn threshold_requires_visible_fraction() {
    let target = Rect::new(0.0, 700.0, 100.0, 900.0);
    let half = ObserveOptions::new(0.0, 0.5).unwrap();
    let e = intersect(ElementId(1), target, vp(0.0), half);
    assert_eq!(e.ratio, 0.5);
    assert!(e.is_intersecting);

    let e = intersect(ElementId(1), target, vp(0.0).with_scroll(0.0), ObserveOptions::new(0.0, 0.6).unwrap());
    assert!(!e.is_intersecting);
}

#[test]
fn options_reject_out_of_range_values() {
    assert!(ObserveOptions::new(-1.0, 0.5).is_err());
    assert!(ObserveOptions::new(0.0, 1.5).is_err());
    assert!(ObserveOptions::new(f64::NAN, 0.5).is_err());
}

#[test]
fn notify_delivers_redundantly_until_disconnected() {
    let hub = ObserverHub::new();
    hub.set_viewport(vp(0.0));
    hub.set_layout(ElementId(7), Rect::new(0.0, 10.0, 10.0, 20.0));

    let seen = Rc::new(RefCell::new(0u32));
    let s = Rc::clone(&seen);
    let h = hub.observe(ElementId(7), ObserveOptions::default(), move |_| {
        *s.borrow_mut() += 1;
        ObserverAction::Keep
    });

    assert_eq!(hub.notify(), 1);
    assert_eq!(hub.notify(), 1);
    assert_eq!(*seen.borrow(), 2);

    assert!(hub.disconnect(h));
    assert!(!hub.disconnect(h));
    assert_eq!(hub.notify(), 0);
    assert_eq!(*seen.borrow(), 2);
    assert_eq!(hub.released(), 1);
}

#[test]
fn callback_disconnect_releases_once() {
    let hub = ObserverHub::new();
    hub.set_viewport(vp(0.0));
    hub.set_layout(ElementId(1), Rect::new(0.0, 10.0, 10.0, 20.0));
    hub.observe(ElementId(1), ObserveOptions::default(), |_| {
        ObserverAction::Disconnect
    });
    assert_eq!(hub.active_subscriptions(), 1);
    hub.notify();
    hub.notify();
    assert_eq!(hub.active_subscriptions(), 0);
    assert_eq!(hub.released(), 1);
    assert_eq!(hub.delivered(), 1);
}

#[test]
fn unlaid_out_targets_are_skipped() {
    let hub = ObserverHub::new();
    hub.set_viewport(vp(0.0));
    hub.observe(ElementId(3), ObserveOptions::default(), |_| {
        panic!("no layout, no delivery")
    });
    assert_eq!(hub.notify(), 0);
}
