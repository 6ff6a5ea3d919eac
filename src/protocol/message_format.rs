//! Message Format
//!
//! Everything that depends on the negotiated version, built once per
//! connection: the value registry used inside messages and the message
//! registries used for the envelopes themselves.

use crate::error::Result;
use crate::packstream::{value_registry, StructRegistry, Value};

use super::request::{Request, RequestType};
use super::response::{Response, ResponseType};
use super::version::ProtocolVersion;

pub struct MessageFormat {
    version: ProtocolVersion,
    values: StructRegistry<Value>,
    responses: StructRegistry<Response>,
    requests: StructRegistry<Request>,
}

impl MessageFormat {
    /// Build the registries for a supported version
    pub fn new(version: ProtocolVersion) -> Result<Self> {
        version.ensure_supported()?;

        let mut responses: StructRegistry<Response> = StructRegistry::new();
        responses.register(ResponseType::Success as u8, 1, Response::decode_success);
        responses.register(ResponseType::Record as u8, 1, Response::decode_record);
        responses.register(ResponseType::Ignored as u8, 0, Response::decode_ignored);
        responses.register(ResponseType::Failure as u8, 1, Response::decode_failure);

        let mut requests: StructRegistry<Request> = StructRegistry::new();
        requests.register(RequestType::Run as u8, 3, Request::decode_run);
        requests.register(RequestType::Pull as u8, 1, Request::decode_pull);
        requests.register(RequestType::Discard as u8, 1, Request::decode_discard);

        Ok(Self {
            version,
            values: value_registry(version),
            responses,
            requests,
        })
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn value_registry(&self) -> &StructRegistry<Value> {
        &self.values
    }

    pub fn response_registry(&self) -> &StructRegistry<Response> {
        &self.responses
    }

    pub fn request_registry(&self) -> &StructRegistry<Request> {
        &self.requests
    }
}
