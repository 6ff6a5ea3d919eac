//! Codec Tests
//!
//! Tests for request and response encoding/decoding.

use std::io::Cursor;

use boltwire::chunk::{chunk_message, ChunkReader, MAX_CHUNK_SIZE};
use boltwire::error::{Classification, ServerError};
use boltwire::protocol::{
    decode_request, decode_response, encode_request, encode_response, read_response,
    MessageFormat, ProtocolVersion, Request, Response, LAST_QUERY_ID,
};
use boltwire::{BoltError, Value, ValueMap};
use bytes::Bytes;

fn format() -> MessageFormat {
    MessageFormat::new(ProtocolVersion::V5_0).unwrap()
}

// =============================================================================
// Request Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_wire_format_run() {
    let request = Request::run("RETURN 1", ValueMap::new(), None);
    let encoded = encode_request(&format(), &request).unwrap();

    let mut expected = vec![0xB3, 0x10, 0x88];
    expected.extend_from_slice(b"RETURN 1");
    expected.extend_from_slice(&[0xA0, 0xA0]);
    assert_eq!(&encoded[..], &expected[..]);
}

#[test]
fn test_wire_format_pull() {
    let request = Request::Pull {
        n: 1000,
        qid: LAST_QUERY_ID,
    };
    let encoded = encode_request(&format(), &request).unwrap();

    // {n: 1000}; the qid is left out when it means "last query"
    assert_eq!(
        &encoded[..],
        &[0xB1, 0x3F, 0xA1, 0x81, b'n', 0xC9, 0x03, 0xE8]
    );
}

#[test]
fn test_encode_decode_run_with_database() {
    let mut parameters = ValueMap::new();
    parameters.insert("x", 42i64);
    parameters.insert("names", vec![Value::from("a"), Value::from("b")]);

    let request = Request::run("RETURN $x", parameters, Some("movies".to_string()));
    let encoded = encode_request(&format(), &request).unwrap();
    let decoded = decode_request(&format(), encoded).unwrap();

    assert_eq!(decoded, request);
}

#[test]
fn test_encode_decode_pull_with_qid() {
    let request = Request::Pull { n: 5, qid: 3 };
    let encoded = encode_request(&format(), &request).unwrap();
    assert_eq!(decode_request(&format(), encoded).unwrap(), request);
}

#[test]
fn test_encode_decode_discard_all() {
    let request = Request::Discard {
        n: -1,
        qid: LAST_QUERY_ID,
    };
    let encoded = encode_request(&format(), &request).unwrap();
    assert_eq!(encoded[1], 0x2F);
    assert_eq!(decode_request(&format(), encoded).unwrap(), request);
}

#[test]
fn test_unencodable_parameter() {
    let mut parameters = ValueMap::new();
    parameters.insert(
        "bad",
        Value::Struct(boltwire::packstream::Structure::new(0x01, vec![Value::Null; 16])),
    );

    let request = Request::run("RETURN $bad", parameters, None);
    assert!(matches!(
        encode_request(&format(), &request),
        Err(BoltError::Protocol(_))
    ));
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_wire_format_success() {
    let encoded = encode_response(&format(), &Response::Success(ValueMap::new())).unwrap();
    assert_eq!(&encoded[..], &[0xB1, 0x70, 0xA0]);
}

#[test]
fn test_wire_format_ignored() {
    let encoded = encode_response(&format(), &Response::Ignored).unwrap();
    assert_eq!(&encoded[..], &[0xB0, 0x7E]);
    assert_eq!(
        decode_response(&format(), encoded).unwrap(),
        Response::Ignored
    );
}

#[test]
fn test_encode_decode_record() {
    let response = Response::Record(vec![Value::from(1i64), Value::Null, Value::from("x")]);
    let encoded = encode_response(&format(), &response).unwrap();
    assert_eq!(&encoded[..2], &[0xB1, 0x71]);
    assert_eq!(decode_response(&format(), encoded).unwrap(), response);
}

#[test]
fn test_encode_decode_failure() {
    let response = Response::Failure(ServerError::new(
        "Neo.ClientError.Statement.SyntaxError",
        "Invalid input",
    ));
    let encoded = encode_response(&format(), &response).unwrap();

    match decode_response(&format(), encoded).unwrap() {
        Response::Failure(err) => {
            assert_eq!(err.code, "Neo.ClientError.Statement.SyntaxError");
            assert_eq!(err.message, "Invalid input");
            assert_eq!(err.classification, Classification::ClientError);
        }
        other => panic!("Expected FAILURE, got {:?}", other),
    }
}

#[test]
fn test_failure_without_message() {
    // B1 7F {code: "X"}
    let bytes = Bytes::from_static(&[0xB1, 0x7F, 0xA1, 0x84, b'c', b'o', b'd', b'e', 0x81, b'X']);
    assert!(matches!(
        decode_response(&format(), bytes),
        Err(BoltError::Protocol(_))
    ));
}

// =============================================================================
// Malformed Message Tests
// =============================================================================

#[test]
fn test_unknown_message_signature() {
    let bytes = Bytes::from_static(&[0xB1, 0x66, 0xA0]);
    assert!(matches!(
        decode_response(&format(), bytes),
        Err(BoltError::Protocol(_))
    ));
}

#[test]
fn test_wrong_field_count() {
    // SUCCESS with two fields
    let bytes = Bytes::from_static(&[0xB2, 0x70, 0xA0, 0xA0]);
    assert!(matches!(
        decode_response(&format(), bytes),
        Err(BoltError::Protocol(_))
    ));
}

#[test]
fn test_not_a_struct() {
    let bytes = Bytes::from_static(&[0xA0]);
    assert!(matches!(
        decode_response(&format(), bytes),
        Err(BoltError::Protocol(_))
    ));
}

#[test]
fn test_trailing_bytes() {
    let bytes = Bytes::from_static(&[0xB1, 0x70, 0xA0, 0x01]);
    assert!(matches!(
        decode_response(&format(), bytes),
        Err(BoltError::Protocol(_))
    ));
}

#[test]
fn test_response_is_not_a_request() {
    let bytes = Bytes::from_static(&[0xB1, 0x70, 0xA0]);
    assert!(matches!(
        decode_request(&format(), bytes),
        Err(BoltError::Protocol(_))
    ));
}

// =============================================================================
// Stream-based I/O Tests
// =============================================================================

#[test]
fn test_stream_read_responses() {
    let format = format();
    let responses = vec![
        Response::Success(vec![("fields", Value::List(vec![Value::from("n")]))]
            .into_iter()
            .collect()),
        Response::Record(vec![Value::from(1i64)]),
        Response::Success(ValueMap::new()),
    ];

    let mut wire = Vec::new();
    for response in &responses {
        let payload = encode_response(&format, response).unwrap();
        wire.extend_from_slice(&chunk_message(&payload, MAX_CHUNK_SIZE));
    }

    let mut reader = ChunkReader::new(Cursor::new(wire));
    for expected in &responses {
        assert_eq!(&read_response(&mut reader, &format).unwrap(), expected);
    }
    assert!(matches!(
        read_response(&mut reader, &format),
        Err(BoltError::ConnectionClosed(_))
    ));
}
