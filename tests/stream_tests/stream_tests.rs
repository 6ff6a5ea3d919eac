//! Result Stream Tests
//!
//! Tests for flow control, cancellation and failure delivery.

use boltwire::error::ServerError;
use boltwire::stream::{QueryType, StreamState};
use boltwire::{BoltError, FetchSize, Value, ValueMap};

use crate::mock::{done, has_more, int_records, Event, MockIo};

fn run(names: &[&'static str]) -> Event {
    Event::Run(names.to_vec())
}

fn next_int(stream: &std::sync::Arc<boltwire::stream::ResultStream>) -> Option<i64> {
    stream
        .next_record()
        .unwrap()
        .map(|record| record.values()[0].as_int().unwrap())
}

// =============================================================================
// Flow Control Tests
// =============================================================================

#[test]
fn test_single_batch() {
    let mut batch = vec![run(&["n"])];
    batch.extend(int_records(0..3));
    batch.push(done());

    let (stream, io) = MockIo::stream(FetchSize::Limited(10), vec![batch]);
    assert_eq!(stream.state(), StreamState::AwaitingRunAck);

    assert_eq!(next_int(&stream), Some(0));
    assert_eq!(stream.state(), StreamState::Exhausted);
    assert_eq!(stream.buffered(), 2);
    assert_eq!(next_int(&stream), Some(1));
    assert_eq!(next_int(&stream), Some(2));
    assert_eq!(next_int(&stream), None);
    assert_eq!(next_int(&stream), None);

    assert!(io.calls().is_empty());
    assert_eq!(io.receives(), 1);
}

#[test]
fn test_watermarks_gate_prefetch() {
    // fetch 10: high watermark 7, low watermark 3
    let mut first = vec![run(&["n"])];
    first.extend(int_records(0..10));
    first.push(has_more());

    let mut second: Vec<Event> = int_records(10..12).collect();
    second.push(done());

    let (stream, io) = MockIo::stream(FetchSize::Limited(10), vec![first, second]);

    assert_eq!(next_int(&stream), Some(0));
    assert!(!stream.is_auto_pull_enabled());
    assert_eq!(stream.state(), StreamState::ReadyToPull);

    // Buffered drops 8, 7, 6, 5, 4: still above the low watermark
    for expected in 1..=5 {
        assert_eq!(next_int(&stream), Some(expected));
    }
    assert!(io.calls().is_empty());

    // Buffered reaches 3: pulling ahead resumes
    assert_eq!(next_int(&stream), Some(6));
    assert!(stream.is_auto_pull_enabled());
    assert_eq!(io.calls(), vec!["PULL 10"]);
    assert_eq!(stream.state(), StreamState::AwaitingPullAck);

    let rest: Vec<i64> = std::iter::from_fn(|| next_int(&stream)).collect();
    assert_eq!(rest, vec![7, 8, 9, 10, 11]);
    assert_eq!(io.calls(), vec!["PULL 10"]);
    assert_eq!(io.receives(), 2);
}

#[test]
fn test_pull_when_buffer_empty() {
    let first = vec![run(&["n"]), Event::Record(vec![Value::from(1i64)]), has_more()];
    let second = vec![Event::Record(vec![Value::from(2i64)]), done()];

    let (stream, io) = MockIo::stream(FetchSize::Limited(100), vec![first, second]);

    assert_eq!(next_int(&stream), Some(1));
    assert_eq!(io.calls(), vec!["PULL 100"]);
    assert_eq!(next_int(&stream), Some(2));
    assert_eq!(next_int(&stream), None);
}

#[test]
fn test_fetch_all_requests_everything() {
    let first = vec![run(&["n"]), has_more()];
    let second = vec![Event::Record(vec![Value::from(1i64)]), done()];

    let (stream, io) = MockIo::stream(FetchSize::All, vec![first, second]);

    assert_eq!(next_int(&stream), Some(1));
    assert_eq!(io.calls(), vec!["PULL -1"]);
}

#[test]
fn test_empty_result() {
    let (stream, _io) = MockIo::stream(FetchSize::Limited(10), vec![vec![run(&[]), done()]]);

    assert_eq!(next_int(&stream), None);
    assert!(stream.keys().unwrap().is_empty());
}

// =============================================================================
// Cancellation Tests
// =============================================================================

#[test]
fn test_cancel_turns_pull_into_discard() {
    let first = vec![
        run(&["n"]),
        Event::Record(vec![Value::from(1i64)]),
        Event::Record(vec![Value::from(2i64)]),
        has_more(),
    ];
    let second = vec![done()];

    let (stream, io) = MockIo::stream(FetchSize::Limited(2), vec![first, second]);

    assert_eq!(next_int(&stream), Some(1));
    stream.cancel();
    assert!(stream.is_cancelled());

    // Buffered records stay readable after cancel
    assert_eq!(next_int(&stream), Some(2));
    assert_eq!(next_int(&stream), None);
    assert_eq!(io.calls(), vec!["DISCARD -1"]);
}

#[test]
fn test_cancel_before_first_record() {
    let first = vec![run(&["n"]), Event::Record(vec![Value::from(1i64)]), has_more()];
    let second = vec![done()];

    let (stream, io) = MockIo::stream(FetchSize::Limited(1), vec![first, second]);
    stream.cancel();

    let summary = stream.consume().unwrap();
    assert_eq!(summary.query, "RETURN n");
    assert_eq!(io.calls(), vec!["DISCARD -1"]);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_failure_after_records() {
    let error = BoltError::Server(ServerError::new(
        "Neo.ClientError.Statement.ArithmeticError",
        "/ by zero",
    ));
    let mut batch = vec![run(&["n"])];
    batch.extend(int_records(0..2));
    batch.push(Event::Failure(error));

    let (stream, _io) = MockIo::stream(FetchSize::Limited(10), vec![batch]);

    assert_eq!(next_int(&stream), Some(0));
    assert_eq!(next_int(&stream), Some(1));

    for _ in 0..2 {
        match stream.next_record() {
            Err(BoltError::Server(err)) => assert_eq!(err.message, "/ by zero"),
            other => panic!("Expected server error, got {:?}", other),
        }
    }
    assert!(matches!(stream.consume(), Err(BoltError::Server(_))));
}

#[test]
fn test_first_error_wins() {
    let batch = vec![
        Event::Failure(BoltError::Server(ServerError::new("Neo.ClientError.A.B", "first"))),
        Event::Ignored,
        Event::Failure(BoltError::Protocol("second".to_string())),
    ];
    let (stream, _io) = MockIo::stream(FetchSize::Limited(10), vec![batch]);

    match stream.next_record() {
        Err(BoltError::Server(err)) => assert_eq!(err.message, "first"),
        other => panic!("Expected first error, got {:?}", other),
    }
}

#[test]
fn test_ignored_request() {
    let (stream, _io) = MockIo::stream(FetchSize::Limited(10), vec![vec![Event::Ignored]]);
    assert!(matches!(stream.next_record(), Err(BoltError::Ignored)));
    assert!(matches!(stream.keys(), Err(BoltError::Ignored)));
}

#[test]
fn test_record_width_mismatch() {
    let batch = vec![run(&["a", "b"]), Event::Record(vec![Value::from(1i64)])];
    let (stream, _io) = MockIo::stream(FetchSize::Limited(10), vec![batch]);

    assert!(matches!(stream.next_record(), Err(BoltError::Protocol(_))));
    assert_eq!(stream.state(), StreamState::Exhausted);
}

#[test]
fn test_transport_error_is_kept() {
    // The script has nothing to deliver: receive fails like a closed socket
    let (stream, _io) = MockIo::stream(FetchSize::Limited(10), vec![]);

    assert!(matches!(stream.next_record(), Err(BoltError::ConnectionClosed(_))));
    assert!(matches!(stream.next_record(), Err(BoltError::ConnectionClosed(_))));
}

// =============================================================================
// Consume Tests
// =============================================================================

#[test]
fn test_consume_builds_summary_once() {
    let first = vec![run(&["n"]), Event::Record(vec![Value::from(1i64)]), has_more()];

    let mut stats = ValueMap::new();
    stats.insert("nodes-created", 2i64);
    stats.insert("properties-set", 4i64);
    let mut metadata = ValueMap::new();
    metadata.insert("type", "w");
    metadata.insert("t_last", 9i64);
    metadata.insert("db", "neo4j");
    metadata.insert("bookmark", "bm:1");
    metadata.insert("stats", stats);
    let second = vec![Event::Done(metadata)];

    let (stream, io) = MockIo::stream(FetchSize::Limited(5), vec![first, second]);

    let summary = stream.consume().unwrap();
    assert_eq!(summary.query_type, QueryType::WriteOnly);
    assert_eq!(summary.counters.nodes_created, 2);
    assert_eq!(summary.counters.properties_set, 4);
    assert!(summary.counters.contains_updates());
    assert!(!summary.counters.contains_system_updates());
    assert_eq!(summary.result_available_after, Some(3));
    assert_eq!(summary.result_consumed_after, Some(9));
    assert_eq!(summary.database.as_deref(), Some("neo4j"));
    assert_eq!(summary.bookmark.as_deref(), Some("bm:1"));

    assert_eq!(io.calls(), vec!["DISCARD -1"]);
    let receives = io.receives();

    // Second call replays the outcome without touching the network
    assert_eq!(stream.consume().unwrap(), summary);
    assert_eq!(io.receives(), receives);
    assert_eq!(io.calls(), vec!["DISCARD -1"]);
    assert!(stream.is_consumed());
}

#[test]
fn test_operations_after_consume() {
    let (stream, _io) = MockIo::stream(FetchSize::Limited(10), vec![vec![run(&["n"]), done()]]);
    stream.consume().unwrap();

    assert!(matches!(stream.next_record(), Err(BoltError::ResultConsumed)));
    assert!(matches!(stream.keys(), Err(BoltError::ResultConsumed)));
}

#[test]
fn test_stream_outliving_its_connection() {
    let (stream, io) = MockIo::stream(FetchSize::Limited(10), vec![vec![run(&["n"]), done()]]);
    drop(io);

    assert!(matches!(
        stream.next_record(),
        Err(BoltError::ConnectionClosed(_))
    ));
    assert_eq!(stream.state(), StreamState::Exhausted);
    assert!(matches!(
        stream.next_record(),
        Err(BoltError::ConnectionClosed(_))
    ));
}
