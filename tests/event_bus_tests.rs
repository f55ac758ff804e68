use std::cell::RefCell;
use std::rc::Rc;

use sales_lens::api::{DashEvent, EventBus, EventKind};
use sales_lens::core::YearRange;

fn recorder(log: &Rc<RefCell<Vec<String>>>, label: &'static str) -> impl FnMut(&DashEvent) + 'static {
    let log = Rc::clone(log);
    move |event| log.borrow_mut().push(format!("{label}:{:?}", event.kind()))
}

#[test]
fn subscribers_run_in_subscription_order() {
    let mut bus = EventBus::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    bus.subscribe(EventKind::SelectionChanged, recorder(&log, "first"));
    bus.subscribe(EventKind::SelectionChanged, recorder(&log, "second"));
    bus.subscribe(EventKind::FormatsChanged, recorder(&log, "formats"));

    let range = YearRange::new(1990, 1995).expect("range");
    let delivered = bus.publish(&DashEvent::selection(Some(range)));

    assert_eq!(delivered, 2);
    assert_eq!(
        *log.borrow(),
        vec![
            "first:SelectionChanged".to_owned(),
            "second:SelectionChanged".to_owned()
        ]
    );
}

#[test]
fn events_without_subscribers_are_dropped() {
    let mut bus = EventBus::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    bus.subscribe(EventKind::HighlightChanged, recorder(&log, "hl"));

    assert_eq!(bus.publish(&DashEvent::milestone(Some(1999))), 0);
    assert!(log.borrow().is_empty());

    // Subscribing later does not replay anything.
    bus.subscribe(EventKind::MilestoneChanged, recorder(&log, "late"));
    assert!(log.borrow().is_empty());
}

#[test]
fn unsubscribe_removes_only_the_given_handler() {
    let mut bus = EventBus::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let first = bus.subscribe(EventKind::HighlightChanged, recorder(&log, "a"));
    bus.subscribe(EventKind::HighlightChanged, recorder(&log, "b"));
    assert_eq!(bus.subscriber_count(), 2);

    assert!(bus.unsubscribe(first));
    assert!(!bus.unsubscribe(first));
    assert_eq!(bus.subscribers_for(EventKind::HighlightChanged), 1);

    bus.publish(&DashEvent::highlight(Some("CD")));
    assert_eq!(*log.borrow(), vec!["b:HighlightChanged".to_owned()]);
}

#[test]
fn handlers_see_the_event_payload() {
    let mut bus = EventBus::new();
    let seen = Rc::new(RefCell::new(Vec::<Vec<String>>::new()));
    let sink = Rc::clone(&seen);
    bus.subscribe(EventKind::FormatsChanged, move |event| {
        if let DashEvent::FormatsChanged { formats } = event {
            sink.borrow_mut().push(formats.clone());
        }
    });

    bus.publish(&DashEvent::formats(["CD", "Vinyl"]));
    bus.publish(&DashEvent::formats(Vec::<String>::new()));

    assert_eq!(
        *seen.borrow(),
        vec![vec!["CD".to_owned(), "Vinyl".to_owned()], Vec::new()]
    );
}
