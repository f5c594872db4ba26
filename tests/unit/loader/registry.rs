use super::*;
use std::cell::{Cell, RefCell};

fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn FnOnce(&LoadOutcome<u32>)>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = Rc::clone(&log);
    let make = move |tag: &str| -> Box<dyn FnOnce(&LoadOutcome<u32>)> {
        let l = Rc::clone(&l);
        let tag = tag.to_owned();
        Box::new(move |outcome: &LoadOutcome<u32>| {
            let line = match outcome {
                LoadOutcome::Ready(m) => format!("{tag}:ready:{m}"),
                LoadOutcome::Failed { reason, .. } => format!("{tag}:failed:{reason}"),
            };
            l.borrow_mut().push(line);
        })
    };
    (log, make)
}

#[test]
fn concurrent_requests_share_one_fetch() {
    let reg: ModuleRegistry<u32> = ModuleRegistry::new();
    let id = ModuleId::new("tech-showcase");
    let (log, waiter) = recorder();
    let pending: Rc<RefCell<Option<Completer<u32>>>> = Rc::new(RefCell::new(None));

    let p = Rc::clone(&pending);
    reg.request(&id, move |c| *p.borrow_mut() = Some(c), waiter("a"));
    let p = Rc::clone(&pending);
    reg.request(&id, move |c| *p.borrow_mut() = Some(c), waiter("b"));

    assert_eq!(reg.fetch_count(&id), 1);
    assert_eq!(reg.phase(&id), LoadPhase::InFlight);
    assert_eq!(reg.in_flight(), vec![id.clone()]);
    assert!(log.borrow().is_empty());

    let completer = pending.borrow_mut().take().unwrap();
    assert_eq!(completer.module(), &id);
    completer.resolve(7);

    assert_eq!(*log.borrow(), vec!["a:ready:7", "b:ready:7"]);
    assert_eq!(reg.phase(&id), LoadPhase::Resolved);
    assert_eq!(reg.get(&id).as_deref(), Some(&7));
    assert!(reg.in_flight().is_empty());
}

#[test]
fn resolved_module_is_served_without_refetch() {
    let reg: ModuleRegistry<u32> = ModuleRegistry::new();
    let id = ModuleId::new("photo-frame");
    let (log, waiter) = recorder();

    reg.request(&id, |c| c.resolve(3), waiter("first"));
    let fetched_again = Cell::new(false);
    reg.request(&id, |_| fetched_again.set(true), waiter("second"));

    assert!(!fetched_again.get());
    assert_eq!(reg.fetch_count(&id), 1);
    assert_eq!(*log.borrow(), vec!["first:ready:3", "second:ready:3"]);
}

#[test]
fn failures_are_cached_and_convert_to_module_load_errors() {
    let reg: ModuleRegistry<u32> = ModuleRegistry::new();
    let id = ModuleId::new("broken");
    let (log, waiter) = recorder();
    let err = Rc::new(RefCell::new(None));

    let e = Rc::clone(&err);
    reg.request(&id, |c| c.reject("chunk 404"), move |outcome| {
        *e.borrow_mut() = outcome.to_error();
    });
    reg.request(&id, |c| c.resolve(1), waiter("late"));

    assert_eq!(reg.phase(&id), LoadPhase::Failed);
    assert_eq!(reg.fetch_count(&id), 1);
    assert_eq!(*log.borrow(), vec!["late:failed:chunk 404"]);
    let err = err.borrow_mut().take().unwrap();
    assert!(err.escalates());
    assert!(err.to_string().contains("broken"));
}

#[test]
fn dropped_completer_rejects_the_load() {
    let reg: ModuleRegistry<u32> = ModuleRegistry::new();
    let id = ModuleId::new("abandoned");
    let (log, waiter) = recorder();

    reg.request(&id, drop, waiter("w"));

    assert_eq!(reg.phase(&id), LoadPhase::Failed);
    assert_eq!(*log.borrow(), vec!["w:failed:loader dropped without completing"]);
}

#[test]
fn distinct_modules_load_independently() {
    let reg: ModuleRegistry<&'static str> = ModuleRegistry::new();
    let a = ModuleId::new("a");
    let b = ModuleId::new("b");
    reg.request(&a, |c| c.resolve("A"), |_| {});
    reg.request(&b, |c| c.resolve("B"), |_| {});
    assert_eq!(reg.get(&a).as_deref(), Some(&"A"));
    assert_eq!(reg.get(&b).as_deref(), Some(&"B"));
    assert_eq!(reg.phase(&ModuleId::new("c")), LoadPhase::Idle);
    assert_eq!(reg.fetch_count(&ModuleId::new("c")), 0);
}

#[test]
fn cancelled_fetch_returns_to_idle_without_failing() {
    let reg: ModuleRegistry<u32> = ModuleRegistry::new();
    let id = ModuleId::new("parked");
    let (log, waiter) = recorder();
    let pending: Rc<RefCell<Option<Completer<u32>>>> = Rc::new(RefCell::new(None));

    let p = Rc::clone(&pending);
    reg.request(&id, move |c| *p.borrow_mut() = Some(c), waiter("w"));
    pending.borrow_mut().take().unwrap().cancel();

    assert_eq!(reg.phase(&id), LoadPhase::Idle);
    assert!(reg.in_flight().is_empty());
    assert!(log.borrow().is_empty());

    reg.request(&id, |c| c.resolve(5), waiter("again"));
    assert_eq!(reg.fetch_count(&id), 2);
    assert_eq!(*log.borrow(), vec!["again:ready:5"]);
}

#[test]
fn modules_are_keyed_by_their_full_name() {
    let reg: ModuleRegistry<&'static str> = ModuleRegistry::new();
    let ids: Vec<ModuleId> = ["tech-cards", "tech-card", "Tech-cards", ""]
        .into_iter()
        .map(ModuleId::new)
        .collect();
    for (id, name) in ids.iter().zip(["a", "b", "c", "d"]) {
        reg.request(id, move |c| c.resolve(name), |_| {});
    }
    for (id, name) in ids.iter().zip(["a", "b", "c", "d"]) {
        assert_eq!(reg.fetch_count(id), 1);
        assert_eq!(reg.get(id).as_deref(), Some(&name));
    }
}
