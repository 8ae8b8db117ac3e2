//! Canonical string determinism.
//!
//! The string depends only on the message type and field values, never on
//! the order the fields arrived in.

mod common;

use common::notification;
use proptest::prelude::*;
use serde_json::{Map, Value};
use sns_verify::{canonical_string, signed_fields, SnsPayload};

fn reorder(payload: &SnsPayload, order: &[usize]) -> String {
    let Value::Object(map) = payload.to_value() else {
        unreachable!("payload serializes to an object");
    };
    let entries: Vec<(String, Value)> = map.into_iter().collect();

    // serde_json's default map sorts keys, so write the text by hand
    let members: Vec<String> = order
        .iter()
        .map(|&i| {
            let (k, v) = &entries[i % entries.len()];
            format!("{}:{}", Value::String(k.clone()), v)
        })
        .collect();
    format!("{{{}}}", members.join(","))
}

#[test]
fn test_reversed_order_matches() {
    let payload = notification();
    let fields = signed_fields(payload.message_type.as_deref()).unwrap();
    let expected = canonical_string(&payload, fields);

    let len = payload.to_value().as_object().map(Map::len).unwrap();
    let reversed: Vec<usize> = (0..len).rev().collect();
    let reparsed = SnsPayload::from_json_str(&reorder(&payload, &reversed)).unwrap();

    assert_eq!(canonical_string(&reparsed, fields), expected);
}

#[test]
fn test_notification_layout() {
    let payload = notification();
    let fields = signed_fields(Some("Notification")).unwrap();
    let canonical = canonical_string(&payload, fields);

    let names: Vec<&str> = canonical.lines().step_by(2).collect();
    assert_eq!(
        names,
        vec!["Message", "MessageId", "Subject", "Timestamp", "TopicArn", "Type"]
    );
    assert!(canonical.ends_with("Type\nNotification\n"));
}

proptest! {
    #[test]
    fn prop_insertion_order_irrelevant(seed in prop::collection::vec(any::<usize>(), 0..32)) {
        let payload = notification();
        let fields = signed_fields(payload.message_type.as_deref()).unwrap();
        let expected = canonical_string(&payload, fields);

        let len = payload.to_value().as_object().map(Map::len).unwrap();
        // A permutation derived from the seed
        let mut order: Vec<usize> = (0..len).collect();
        for (i, s) in seed.iter().enumerate() {
            let a = i % len;
            let b = s % len;
            order.swap(a, b);
        }

        let reparsed = SnsPayload::from_json_str(&reorder(&payload, &order)).unwrap();
        prop_assert_eq!(canonical_string(&reparsed, fields), expected);
    }
}
