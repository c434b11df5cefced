//! A scripted transport for driving the generated client.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use vmomi::{BoxFuture, Connection, Transport, TransportError, TransportReply};

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
}

/// A transport replaying scripted replies in order.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Result<Option<TransportReply>, TransportError>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    cookie: Arc<Mutex<Option<String>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, reply: Result<Option<TransportReply>, TransportError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Queues a successful reply carrying `result`.
    pub fn result(self, result: Value) -> Self {
        self.reply(Ok(Some(TransportReply::new(result))))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn cookie(&self) -> Option<String> {
        self.cookie.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn call<'a>(
        &'a self,
        method: &'a str,
        params: Value,
    ) -> BoxFuture<'a, Result<Option<TransportReply>, TransportError>> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            params,
        });
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None));
        Box::pin(async move { reply })
    }

    fn set_session_cookie(&self, cookie: &str) {
        *self.cookie.lock().unwrap() = Some(cookie.to_string());
    }
}

/// A connection bound to the generated descriptor registry.
pub fn connection(transport: ScriptedTransport) -> Connection {
    vmomi_fixture::connect(transport)
}
