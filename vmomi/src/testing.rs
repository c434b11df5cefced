//! Test doubles shared by the unit tests.

use serde_json::Value;

use crate::error::TransportError;
use crate::transport::{BoxFuture, Transport, TransportReply};

/// A transport that never produces a reply.
pub(crate) struct NullTransport;

impl Transport for NullTransport {
    fn call<'a>(
        &'a self,
        _method: &'a str,
        _params: Value,
    ) -> BoxFuture<'a, Result<Option<TransportReply>, TransportError>> {
        Box::pin(async { Ok(None) })
    }
}
