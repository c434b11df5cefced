//! The pluggable RPC transport.
//!
//! The runtime never speaks SOAP itself. A [`Transport`] receives the wire
//! method name and a JSON parameter object and returns the decoded reply
//! body plus the response headers.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::error::TransportError;

/// Boxed future returned by [`Transport`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A successful reply from the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportReply {
    /// The call's result value (the `returnval` of the response body).
    pub result: Value,
    /// Response headers, in arrival order.
    pub headers: Vec<(String, String)>,
}

impl TransportReply {
    pub fn new(result: Value) -> Self {
        Self {
            result,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// All values of a header, compared case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Performs remote method calls.
///
/// Implementations must be shareable between tasks; a [`Connection`](crate::Connection)
/// holds its transport behind an `Arc`.
pub trait Transport: Send + Sync {
    /// Invokes `method` with `params`.
    ///
    /// `Ok(None)` means the call completed but carried no reply payload.
    fn call<'a>(
        &'a self,
        method: &'a str,
        params: Value,
    ) -> BoxFuture<'a, Result<Option<TransportReply>, TransportError>>;

    /// Stores the session cookie for subsequent calls.
    fn set_session_cookie(&self, _cookie: &str) {}
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn call<'a>(
        &'a self,
        method: &'a str,
        params: Value,
    ) -> BoxFuture<'a, Result<Option<TransportReply>, TransportError>> {
        (**self).call(method, params)
    }

    fn set_session_cookie(&self, cookie: &str) {
        (**self).set_session_cookie(cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_lookup_ignores_case() {
        let reply = TransportReply::new(json!(null))
            .with_header("Set-Cookie", "a=1")
            .with_header("content-type", "text/xml")
            .with_header("set-cookie", "b=2");

        let cookies: Vec<_> = reply.header_values("set-cookie").collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
    }
}
