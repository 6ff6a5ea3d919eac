//! Struct Tests
//!
//! Tests for version-dependent struct dispatch: graph entities, spatial
//! and temporal values.

use boltwire::packstream::{
    value_registry, Date, DateTime, DateTimeZoneId, Dimension, Duration, Fields, LocalDateTime,
    LocalTime, Node, Point, Relationship, StructRegistry, Time, UnboundRelationship,
    DATE_TIME_LEGACY, DATE_TIME_UTC, NODE, POINT_2D, POINT_3D, RELATIONSHIP,
    UNBOUND_RELATIONSHIP,
};
use boltwire::protocol::ProtocolVersion;
use boltwire::{BoltError, Value, ValueMap};

use crate::{pack, round_trip, unpack};

const V4: ProtocolVersion = ProtocolVersion::V4_4;
const V5: ProtocolVersion = ProtocolVersion::V5_0;

fn person(id: i64) -> Node {
    let mut properties = ValueMap::new();
    properties.insert("name", "Alice");
    Node::new(id, vec!["Person".to_string()], properties)
}

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_registry_dispatch_on_signature_and_arity() {
    let mut registry: StructRegistry<i64> = StructRegistry::new();
    registry.register(0x01, 1, |f: &mut Fields| f.next_int());
    registry.register(0x01, 2, |f: &mut Fields| Ok(f.next_int()? + f.next_int()?));

    assert_eq!(registry.len(), 2);
    assert!(registry.contains(0x01, 2));
    assert!(!registry.contains(0x02, 1));

    let mut fields = Fields::new(0x01, vec![Value::from(3i64), Value::from(4i64)]);
    assert_eq!(registry.resolve(0x01, 2).unwrap()(&mut fields).unwrap(), 7);
    assert!(matches!(registry.resolve(0x01, 3), Err(BoltError::Protocol(_))));
}

#[test]
fn test_entity_layouts_are_exclusive_per_version() {
    let v4 = value_registry(V4);
    assert!(v4.contains(NODE, 3));
    assert!(!v4.contains(NODE, 4));
    assert!(v4.contains(RELATIONSHIP, 5));
    assert!(!v4.contains(RELATIONSHIP, 8));
    assert!(v4.contains(UNBOUND_RELATIONSHIP, 3));
    assert!(v4.contains(DATE_TIME_LEGACY, 3));
    assert!(!v4.contains(DATE_TIME_UTC, 3));

    let v5 = value_registry(V5);
    assert!(v5.contains(NODE, 4));
    assert!(!v5.contains(NODE, 3));
    assert!(v5.contains(RELATIONSHIP, 8));
    assert!(v5.contains(UNBOUND_RELATIONSHIP, 4));
    assert!(v5.contains(DATE_TIME_UTC, 3));
    assert!(!v5.contains(DATE_TIME_LEGACY, 3));

    for registry in [&v4, &v5] {
        assert!(registry.contains(POINT_2D, 3));
        assert!(registry.contains(POINT_3D, 4));
    }
}

// =============================================================================
// Node Tests
// =============================================================================

#[test]
fn test_legacy_node_decoding() {
    // B3 'N' id=1 labels=["Person"] props={}
    let bytes = [
        0xB3, 0x4E, 0x01, 0x91, 0x86, b'P', b'e', b'r', b's', b'o', b'n', 0xA0,
    ];

    let node = match unpack(&bytes, V4).unwrap() {
        Value::Node(node) => node,
        other => panic!("Expected Node, got {:?}", other),
    };
    assert_eq!(node.id, 1);
    assert!(node.has_label("Person"));
    assert!(node.properties.is_empty());
    assert_eq!(node.element_id, None);
}

#[test]
fn test_element_id_node_decoding() {
    let bytes = [0xB4, 0x4E, 0x07, 0x90, 0xA0, 0x83, b'4', b':', b'7'];

    let node = match unpack(&bytes, V5).unwrap() {
        Value::Node(node) => node,
        other => panic!("Expected Node, got {:?}", other),
    };
    assert_eq!(node.id, 7);
    assert_eq!(node.element_id.as_deref(), Some("4:7"));
}

#[test]
fn test_node_arity_from_other_version_rejected() {
    let v5_node = [0xB4, 0x4E, 0x07, 0x90, 0xA0, 0x83, b'4', b':', b'7'];
    assert!(matches!(unpack(&v5_node, V4), Err(BoltError::Protocol(_))));

    let v4_node = [0xB3, 0x4E, 0x07, 0x90, 0xA0];
    assert!(matches!(unpack(&v4_node, V5), Err(BoltError::Protocol(_))));
}

#[test]
fn test_node_packing_per_version() {
    let node = person(1);

    let legacy = pack(&Value::from(node.clone()), V4).unwrap();
    assert_eq!(&legacy[..2], &[0xB3, 0x4E]);
    assert_eq!(round_trip(&Value::from(node.clone()), V4), Value::from(node.clone()));

    // Without an element id the numeric id is sent in its place
    let modern = round_trip(&Value::from(node.clone()), V5);
    assert_eq!(modern, Value::from(node.with_element_id("1")));
}

#[test]
fn test_node_field_type_mismatch() {
    // labels is not a list
    let bytes = [0xB3, 0x4E, 0x01, 0x81, b'x', 0xA0];
    assert!(matches!(unpack(&bytes, V4), Err(BoltError::Protocol(_))));
}

// =============================================================================
// Relationship Tests
// =============================================================================

#[test]
fn test_relationship_per_version() {
    let mut rel = Relationship::new(5, 1, 2, "KNOWS", ValueMap::new());

    let legacy = pack(&Value::from(rel.clone()), V4).unwrap();
    assert_eq!(&legacy[..2], &[0xB5, 0x52]);
    assert_eq!(round_trip(&Value::from(rel.clone()), V4), Value::from(rel.clone()));

    rel.element_id = Some("5:r".to_string());
    rel.start_element_id = Some("4:1".to_string());
    rel.end_element_id = Some("4:2".to_string());

    let modern = pack(&Value::from(rel.clone()), V5).unwrap();
    assert_eq!(&modern[..2], &[0xB8, 0x52]);

    let decoded = round_trip(&Value::from(rel.clone()), V5);
    let decoded = decoded.as_relationship().unwrap();
    assert_eq!(decoded, &rel);
    assert_eq!(decoded.start_element_id.as_deref(), Some("4:1"));
}

#[test]
fn test_unbound_relationship_per_version() {
    let rel = UnboundRelationship::new(9, "LIKES", ValueMap::new());

    let legacy = pack(&Value::from(rel.clone()), V4).unwrap();
    assert_eq!(&legacy[..2], &[0xB3, 0x72]);

    let modern = pack(&Value::from(rel.clone()), V5).unwrap();
    assert_eq!(&modern[..2], &[0xB4, 0x72]);
    match unpack(&modern, V5).unwrap() {
        Value::UnboundRelationship(decoded) => {
            assert_eq!(decoded.id, 9);
            assert_eq!(decoded.element_id.as_deref(), Some("9"));
        }
        other => panic!("Expected UnboundRelationship, got {:?}", other),
    }
}

// =============================================================================
// Spatial Tests
// =============================================================================

#[test]
fn test_point_dispatch() {
    let flat = Point::new_2d(7203, 1.0, 2.0);
    let bytes = pack(&Value::from(flat), V5).unwrap();
    assert_eq!(&bytes[..2], &[0xB3, 0x58]);

    let decoded = round_trip(&Value::from(flat), V5);
    let decoded = decoded.as_point().unwrap();
    assert!(!decoded.is_3d());
    assert!(decoded.z.is_nan());
    assert_eq!(decoded, &flat);

    let solid = Point::new_3d(9157, 1.0, 2.0, 3.0);
    let bytes = pack(&Value::from(solid), V4).unwrap();
    assert_eq!(&bytes[..2], &[0xB4, 0x59]);
    assert_eq!(round_trip(&Value::from(solid), V4), Value::from(solid));
}

#[test]
fn test_point_keeps_dimension_with_nan_z() {
    let solid = Point::new_3d(4979, 1.0, 2.0, f64::NAN);
    let bytes = pack(&Value::from(solid), V5).unwrap();
    assert_eq!(&bytes[..2], &[0xB4, 0x59]);

    let decoded = round_trip(&Value::from(solid), V5);
    let decoded = decoded.as_point().unwrap();
    assert!(decoded.is_3d());
    assert_eq!(decoded.dimension, Dimension::Three);
    assert!(decoded.z.is_nan());
    assert_eq!(decoded, &solid);
    assert_ne!(decoded, &Point::new_2d(4979, 1.0, 2.0));
}

#[test]
fn test_point_needs_float_coordinates() {
    // X with an integer x coordinate
    let bytes = [0xB3, 0x58, 0x01, 0x01, 0xC1, 0, 0, 0, 0, 0, 0, 0, 0];
    assert!(matches!(unpack(&bytes, V5), Err(BoltError::Protocol(_))));
}

// =============================================================================
// Temporal Tests
// =============================================================================

#[test]
fn test_simple_temporal_round_trips() {
    let values = vec![
        Value::Date(Date::new(19_000)),
        Value::Time(Time::new(3_600_000_000_000, 7200)),
        Value::LocalTime(LocalTime::new(1)),
        Value::LocalDateTime(LocalDateTime::new(1_700_000_000, 5)),
        Value::Duration(Duration::new(14, 3, 59, 999_999_999)),
    ];

    for version in [V4, V5] {
        for value in &values {
            assert_eq!(&round_trip(value, version), value);
        }
    }

    assert_eq!(pack(&Value::Date(Date::new(1)), V5).unwrap(), vec![0xB1, 0x44, 0x01]);
}

#[test]
fn test_date_time_encoding_per_version() {
    let dt = DateTime::new(1_000, 0, 3_600);

    let utc = pack(&Value::DateTime(dt), V5).unwrap();
    assert_eq!(utc, vec![0xB3, 0x49, 0xC9, 0x03, 0xE8, 0x00, 0xC9, 0x0E, 0x10]);

    // Legacy layout carries wall-clock seconds: 1000 + 3600
    let legacy = pack(&Value::DateTime(dt), V4).unwrap();
    assert_eq!(legacy, vec![0xB3, 0x46, 0xC9, 0x11, 0xF8, 0x00, 0xC9, 0x0E, 0x10]);

    assert_eq!(round_trip(&Value::DateTime(dt), V4), Value::DateTime(dt));
    assert_eq!(round_trip(&Value::DateTime(dt), V5), Value::DateTime(dt));
}

#[test]
fn test_legacy_date_time_overflow() {
    // F with local seconds i64::MIN and a positive offset
    let mut bytes = vec![0xB3, 0x46, 0xCB];
    bytes.extend_from_slice(&i64::MIN.to_be_bytes());
    bytes.extend_from_slice(&[0x00, 0x01]);
    assert!(matches!(unpack(&bytes, V4), Err(BoltError::Protocol(_))));

    let late = DateTime::new(i64::MAX, 0, 1);
    assert_eq!(late.local_seconds(), None);
    assert!(matches!(pack(&Value::DateTime(late), V4), Err(BoltError::Protocol(_))));

    // UTC layout carries the seconds unchanged
    assert!(pack(&Value::DateTime(late), V5).is_ok());
}

#[test]
fn test_zoned_date_time_per_version() {
    let utc = DateTimeZoneId::utc(1_000, 0, "Europe/Stockholm");
    let bytes = pack(&Value::DateTimeZoneId(utc.clone()), V5).unwrap();
    assert_eq!(&bytes[..2], &[0xB3, 0x69]);
    assert_eq!(
        round_trip(&Value::DateTimeZoneId(utc.clone()), V5),
        Value::DateTimeZoneId(utc.clone())
    );

    let local = DateTimeZoneId::local(1_000, 0, "Europe/Stockholm");
    let bytes = pack(&Value::DateTimeZoneId(local.clone()), V4).unwrap();
    assert_eq!(&bytes[..2], &[0xB3, 0x66]);

    // The seconds cannot be converted without a zone database
    assert!(matches!(
        pack(&Value::DateTimeZoneId(utc), V4),
        Err(BoltError::Protocol(_))
    ));
    assert!(matches!(
        pack(&Value::DateTimeZoneId(local), V5),
        Err(BoltError::Protocol(_))
    ));
}
