use super::*;
use std::cell::Cell;

#[test]
fn healthy_subtree_renders() {
    let b = FaultBoundary::new("hero", None);
    assert_eq!(b.render(|| Ok(7)), RenderResult::Rendering(7));
    assert!(!b.has_failed());
}

#[test]
fn first_fault_is_terminal_and_halts_rendering() {
    let b = FaultBoundary::new("hero", Some(Fallback::image("/p.jpg", "portrait")));
    let calls = Cell::new(0);
    let out = b.render(|| -> FolioResult<()> {
        calls.set(calls.get() + 1);
        Err(FolioError::construction("bad glb"))
    });
    assert_eq!(out, RenderResult::Failed(Fallback::image("/p.jpg", "portrait")));

    // No retry: the subtree is never invoked again.
    let out = b.render(|| {
        calls.set(calls.get() + 1);
        Ok(())
    });
    assert!(out.is_failed());
    assert_eq!(calls.get(), 1);
    assert!(b.fault().unwrap().contains("bad glb"));
}

#[test]
fn channel_reports_reach_the_boundary() {
    let b = FaultBoundary::new("tech", Some(Fallback::icon("⚡")));
    let ch = b.channel();
    assert!(ch.report(FolioError::ContextLost));
    assert!(ch.report(FolioError::construction("late")));
    assert!(b.has_failed());
    assert_eq!(b.captured(), 2);
    assert_eq!(b.fault().as_deref(), Some("rendering context lost"));
}

#[test]
fn channel_outliving_boundary_swallows_faults() {
    let ch = {
        let b = FaultBoundary::new("gone", None);
        b.channel()
    };
    assert!(!ch.report(FolioError::ContextLost));
    assert!(!FaultChannel::detached().report(FolioError::ContextLost));
}

#[test]
fn default_fallback_is_the_generic_panel() {
    let b = FaultBoundary::new("x", None);
    match b.fallback() {
        Fallback::Panel { title, .. } => assert_eq!(title, "3D content unavailable"),
        other => panic!("unexpected fallback {other:?}"),
    }
}
