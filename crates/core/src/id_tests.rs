// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::{DriverId, IdTooLong};

#[test]
fn new_ids_carry_the_type_prefix() {
    let id = DriverId::new();
    assert!(id.as_str().starts_with("drv-"));
    assert_eq!(id.as_str().len(), 23);
}

#[test]
fn from_string_round_trips() {
    let id = DriverId::from_string("drv-example").unwrap();
    assert_eq!(id.as_str(), "drv-example");
    assert_eq!(id.suffix(), "example");
}

#[test]
fn from_string_rejects_ids_over_the_byte_budget() {
    let too_long = "a".repeat(24);
    let err = DriverId::from_string(&too_long).unwrap_err();
    assert_eq!(err, IdTooLong { value: too_long, len: 24, max: 23 });
}

#[test]
fn from_string_rejects_rather_than_collides_two_long_ids_sharing_a_prefix() {
    let a = format!("{}-alpha", "x".repeat(20));
    let b = format!("{}-beta", "x".repeat(20));
    assert!(DriverId::from_string(&a).is_err());
    assert!(DriverId::from_string(&b).is_err());
}

#[test]
fn two_new_ids_are_distinct() {
    assert_ne!(DriverId::new(), DriverId::new());
}

#[test]
fn short_truncates_the_suffix() {
    let id = DriverId::from_string("drv-abcdefgh").unwrap();
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn equality_against_str_ignores_wrapper() {
    let id = DriverId::from_string("drv-web").unwrap();
    assert_eq!(id, "drv-web");
    assert_eq!(id.as_ref(), "drv-web");
}

#[test]
fn serializes_as_a_plain_string() {
    let id = DriverId::from_string("drv-web").unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"drv-web\"");
    let back: DriverId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}
