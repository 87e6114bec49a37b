use herald::{
    BusinessEvent, BusinessEvents, BusinessEventsSettings, ListenerRegistry, actions,
    listen::{ListenerConfig, ListenerMethod, OwnerRegistry, TypedListener},
    registry::ListenerRegistration,
    testing::BusinessEventRecorder,
};
use std::sync::{Arc, Mutex};

mod common;
use common::{Journal, Order, OrderService};

/// Wires settings, owners, method listeners, a typed listener and a recorder
/// into one registry and drives it through the order service.
#[test]
fn test_emission_reaches_every_listener_in_order() {
    let owners = Arc::new(OwnerRegistry::new());
    let events = BusinessEvents::builder(BusinessEventsSettings::default())
        .owners(owners.clone())
        .build();
    let listeners = events.listener_factory().expect("listening is enabled");

    let journal = Arc::new(Journal::default());
    owners.register("journal", Arc::clone(&journal));

    let on_created = ListenerMethod::new("on_created", |journal: &Journal, order: Order| {
        journal.write(format!("created {}", order.id));
    })
    .listener(ListenerConfig::for_payload::<Order>().action(actions::CREATE));
    let on_cancelled = ListenerMethod::new(
        "on_cancelled",
        |journal: &Journal, order: Order, action: String| {
            journal.write(format!("{action} {}", order.id));
        },
    )
    .listener(ListenerConfig::for_payload::<Order>().action("CANCEL"));

    let statuses = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&statuses);
    let typed = TypedListener::<Order>::new().on_actions(
        [actions::UPDATE, "CANCEL"],
        move |order: &Order, _: &BusinessEvent| {
            seen.lock().unwrap().push(order.status.clone());
        },
    );

    let recorder = BusinessEventRecorder::new();
    let registry = ListenerRegistry::builder()
        .register(listeners.create_listener("journal", &on_created).unwrap())
        .register(listeners.create_listener("journal", &on_cancelled).unwrap())
        .register_with_priority(typed, 5)
        .register_as(recorder.clone(), ListenerRegistration::new().priority(-5).named("recorder"))
        .build();

    let service = OrderService::new(events.emitter(Arc::new(registry)));
    service
        .place_all(vec![Order::new(1, "NEW"), Order::new(2, "NEW")])
        .unwrap();
    service.change_status(1, "SHIPPED").unwrap();
    service.change_status(2, "CANCELLED").unwrap();

    assert_eq!(
        journal.lines(),
        vec![
            "created 1".to_string(),
            "created 2".to_string(),
            "CANCEL 2".to_string()
        ]
    );
    assert_eq!(
        *statuses.lock().unwrap(),
        vec!["SHIPPED".to_string(), "CANCELLED".to_string()]
    );
    recorder
        .assert_that()
        .count(4)
        .with_one_of_actions(&[actions::UPDATE, "CANCEL"])
        .count(2);
}

#[test]
fn test_disabled_listening_offers_no_factory() {
    let mut settings = BusinessEventsSettings::default();
    settings.listen.enabled = false;
    let events = BusinessEvents::builder(settings).build();

    assert!(events.listener_factory().is_none());
    assert!(events.events_factory().is_some());
}

#[test]
fn test_master_switch_disables_everything() {
    let mut settings = BusinessEventsSettings::default();
    settings.enabled = false;
    let events = BusinessEvents::builder(settings).build();
    let recorder = BusinessEventRecorder::new();

    assert!(events.listener_factory().is_none());
    assert!(events.emitter(Arc::new(recorder)).is_none());
}

#[test]
fn test_emitter_order_follows_settings() {
    let mut settings = BusinessEventsSettings::default();
    settings.emission.aspect.order = 10;
    let events = BusinessEvents::builder(settings).build();

    let emitter = events
        .emitter(Arc::new(BusinessEventRecorder::new()))
        .expect("emission is enabled");

    assert_eq!(emitter.order(), 10);
}
