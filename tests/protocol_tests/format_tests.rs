//! Version and Error Tests

use boltwire::error::{Classification, ServerError};
use boltwire::protocol::{MessageFormat, ProtocolVersion};
use boltwire::{BoltError, ErrorKind};

// =============================================================================
// Protocol Version Tests
// =============================================================================

#[test]
fn test_supported_versions() {
    for minor in 0..=4 {
        assert!(ProtocolVersion::new(4, minor).is_supported());
    }
    assert!(ProtocolVersion::V5_0.is_supported());
    assert!(ProtocolVersion::new(5, 4).is_supported());

    assert!(!ProtocolVersion::new(3, 0).is_supported());
    assert!(!ProtocolVersion::new(4, 5).is_supported());
    assert!(!ProtocolVersion::new(6, 0).is_supported());
}

#[test]
fn test_version_features() {
    assert!(!ProtocolVersion::V4_4.supports_element_ids());
    assert!(!ProtocolVersion::V4_4.utc_date_time());
    assert!(ProtocolVersion::V5_0.supports_element_ids());
    assert!(ProtocolVersion::V5_0.utc_date_time());
}

#[test]
fn test_version_display_and_order() {
    assert_eq!(ProtocolVersion::V4_3.to_string(), "4.3");
    assert!(ProtocolVersion::V4_4 < ProtocolVersion::V5_0);
}

#[test]
fn test_message_format_rejects_unsupported_version() {
    assert!(matches!(
        MessageFormat::new(ProtocolVersion::new(3, 0)),
        Err(BoltError::Config(_))
    ));

    let format = MessageFormat::new(ProtocolVersion::V4_1).unwrap();
    assert_eq!(format.version(), ProtocolVersion::V4_1);
}

// =============================================================================
// Error Classification Tests
// =============================================================================

#[test]
fn test_classification_from_code() {
    assert_eq!(
        Classification::from_code("Neo.ClientError.Statement.SyntaxError"),
        Classification::ClientError
    );
    assert_eq!(
        Classification::from_code("Neo.TransientError.Transaction.DeadlockDetected"),
        Classification::TransientError
    );
    assert_eq!(
        Classification::from_code("Neo.DatabaseError.General.UnknownError"),
        Classification::DatabaseError
    );
    assert_eq!(Classification::from_code("garbage"), Classification::DatabaseError);
}

#[test]
fn test_error_kinds() {
    let client = BoltError::Server(ServerError::new("Neo.ClientError.Statement.SyntaxError", "bad"));
    assert_eq!(client.kind(), ErrorKind::Client);
    assert!(!client.is_connection_fatal());

    let database = BoltError::Server(ServerError::new("Neo.DatabaseError.General.UnknownError", "boom"));
    assert_eq!(database.kind(), ErrorKind::Database);
    assert!(database.is_connection_fatal());

    let io = BoltError::from(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"));
    assert_eq!(io.kind(), ErrorKind::Transport);
    assert!(io.is_connection_fatal());

    assert_eq!(BoltError::Protocol("x".into()).kind(), ErrorKind::Protocol);
    assert!(!BoltError::ResultConsumed.is_connection_fatal());
    assert!(!BoltError::Ignored.is_connection_fatal());
}

#[test]
fn test_server_error_display() {
    let err = BoltError::Server(ServerError::new("Neo.ClientError.Statement.SyntaxError", "bad"));
    assert_eq!(err.to_string(), "Neo.ClientError.Statement.SyntaxError: bad");
}
