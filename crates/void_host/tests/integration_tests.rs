//! Integration tests for void_host crate
//!
//! Exercises the host model through its trait objects, the way facades see it

use std::rc::Rc;
use void_host::*;

fn spring_host() -> (MemoryHost, HostHandle, HostHandle) {
    let host = MemoryHost::new();
    host.define_behaviour(
        "Spring",
        &[
            ("samples", PropertyKind::DataRange),
            ("anchor", PropertyKind::ObjectRef),
        ],
    );
    let object = host.create_object("Hip");
    let spring = host.attach_behaviour(object, "Spring").unwrap();
    (host, object, spring)
}

#[test]
fn test_value_serialization() {
    let value = HostValue::Tuple(vec![
        HostValue::from(3),
        HostValue::from([0.0, 1.0, 2.0]),
        HostValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]),
        HostValue::Handle(HostHandle::new(HostClass::Object, 12)),
    ]);

    let json = serde_json::to_string(&value).expect("Failed to serialize");
    assert!(json.contains("3q2+7w=="));

    let back: HostValue = serde_json::from_str(&json).expect("Failed to deserialize");
    assert_eq!(back, value);
}

#[test]
fn test_transaction_through_trait_object() {
    let (host, object, spring) = spring_host();
    let model: Rc<dyn HostModel> = Rc::new(host.clone());

    let mut serial = 0;
    model
        .transact("Fill samples", &mut |editors| {
            serial = editors.session.serial();
            for value in [0.1, 0.2] {
                let record = editors.data.create_data(HostValue::from(value)).unwrap();
                editors
                    .behaviour
                    .add_to_range(spring, "samples", RangeKind::Data, record)
                    .unwrap();
            }
            editors
                .behaviour
                .set_behaviour_object(spring, "anchor", object)
                .unwrap();
            editors.updater.generate_update().unwrap();
        })
        .unwrap();

    assert!(serial > 0);
    let viewer = model.behaviour_viewer();
    let samples = viewer.get_behaviour_data_range(spring, "samples").unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(
        model.data_viewer().get_data_value(samples[1], None).unwrap(),
        HostValue::Float(0.2)
    );
    assert_eq!(viewer.get_behaviour_object(spring, "anchor").unwrap(), object);
    assert_eq!(host.update_count(), 1);
    assert_eq!(host.commit_count(), 1);
}

#[test]
fn test_range_kind_must_match_slot() {
    let (host, object, spring) = spring_host();
    let mut outcome = None;

    host.transact("Misfile", &mut |editors| {
        outcome = Some(
            editors
                .behaviour
                .add_to_range(spring, "anchor", RangeKind::Object, object),
        );
    })
    .unwrap();

    assert!(matches!(
        outcome,
        Some(Err(HostError::KindMismatch { expected: PropertyKind::ObjectRefRange, .. }))
    ));
}

#[test]
fn test_one_transaction_at_a_time() {
    let (host, _, _) = spring_host();
    let inner_host = host.clone();
    let mut nested = None;

    host.transact("Outer", &mut |_| {
        nested = Some(inner_host.transact("Inner", &mut |_| {}));
    })
    .unwrap();

    assert!(matches!(
        nested,
        Some(Err(HostError::TransactionRejected { .. }))
    ));
    assert_eq!(host.undo_log(), vec!["Outer".to_string()]);
}

#[test]
fn test_schema_reports_slot_kinds() {
    let (host, _, spring) = spring_host();
    assert_eq!(host.get_behaviour_schema(spring).unwrap(), None);

    host.set_schema_enabled(true);
    let schema = host.get_behaviour_schema(spring).unwrap().unwrap();
    assert_eq!(
        schema,
        vec![
            ("samples".to_string(), PropertyKind::DataRange),
            ("anchor".to_string(), PropertyKind::ObjectRef),
        ]
    );
}
