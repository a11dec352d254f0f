//! Integration tests for weft-common crate.

use std::cell::Cell;
use std::rc::Rc;
use weft_common::{ListenerSet, Span};

#[test]
fn test_span_from_range() {
    let span = Span::from(10..20);
    assert_eq!(span.start, 10);
    assert_eq!(span.end, 20);
    assert_eq!(span.offset(), 10);
}

#[test]
fn test_span_range() {
    let span = Span::from_usize(5, 15);
    assert_eq!(span.range(), 5..15);
    assert_eq!(Span::default(), Span::DUMMY);
}

trait Counter {
    fn hit(&self);
}

#[derive(Default)]
struct Hits(Cell<usize>);

impl Counter for Hits {
    fn hit(&self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn test_listener_set_keeps_subscription_order() {
    let set: ListenerSet<dyn Counter> = ListenerSet::new();
    let first: Rc<dyn Counter> = Rc::new(Hits::default());
    let second: Rc<dyn Counter> = Rc::new(Hits::default());
    set.add(Rc::downgrade(&first));
    set.add(Rc::downgrade(&second));

    let snapshot = set.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert!(Rc::ptr_eq(&snapshot[0], &first));
    assert!(Rc::ptr_eq(&snapshot[1], &second));
}

#[test]
fn test_listener_set_drops_dead_listeners() {
    let set: ListenerSet<dyn Counter> = ListenerSet::new();
    let alive: Rc<dyn Counter> = Rc::new(Hits::default());
    let id = set.add(Rc::downgrade(&alive));
    {
        let dead: Rc<dyn Counter> = Rc::new(Hits::default());
        set.add(Rc::downgrade(&dead));
    }
    assert_eq!(set.len(), 1);
    assert_eq!(set.snapshot().len(), 1);

    assert!(set.remove(id));
    assert!(!set.remove(id));
    assert!(set.is_empty());
}

#[test]
fn test_listener_set_filters_by_key() {
    let set: ListenerSet<dyn Counter, Option<&'static str>> = ListenerSet::new();
    let everything = Rc::new(Hits::default());
    let only_int = Rc::new(Hits::default());
    let everything_dyn: Rc<dyn Counter> = everything.clone();
    let only_int_dyn: Rc<dyn Counter> = only_int.clone();
    set.add_keyed(None, Rc::downgrade(&everything_dyn));
    set.add_keyed(Some("Int"), Rc::downgrade(&only_int_dyn));

    for listener in set.snapshot_matching(|key| key.is_none_or(|k| k == "Bool")) {
        listener.hit();
    }
    for listener in set.snapshot_matching(|key| key.is_none_or(|k| k == "Int")) {
        listener.hit();
    }
    assert_eq!(everything.0.get(), 2);
    assert_eq!(only_int.0.get(), 1);
}
