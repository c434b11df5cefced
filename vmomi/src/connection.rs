//! The session wrapper generated methods call through.

use std::fmt;
use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::descriptor::DescriptorRegistry;
use crate::error::VmomiError;
use crate::materialize::{FromDecoded, reconstruct};
use crate::transport::{Transport, TransportReply};
use crate::wire::{ObjectReference, VALUE_KEY, discriminator, merge_params, this_params, unwrap_envelope};

/// Name of the session cookie set by a successful login.
pub const SESSION_COOKIE: &str = "vmware_soap_session";

/// Parameter key stripped from outgoing calls.
const CONNECTION_KEY: &str = "connection";

/// Default wire name of the service entry point.
pub const DEFAULT_ROOT_TYPE: &str = "ServiceInstance";

/// A live session: the transport, the descriptor registry and session state.
///
/// Cloning is cheap; clones share the same transport and session.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Box<dyn Transport>,
    registry: Arc<DescriptorRegistry>,
    root_type: String,
    debug: bool,
    session: RwLock<Option<String>>,
}

/// Builder for [`Connection`].
pub struct ConnectionBuilder {
    transport: Box<dyn Transport>,
    registry: Option<Arc<DescriptorRegistry>>,
    root_type: String,
    debug: bool,
}

impl ConnectionBuilder {
    /// Sets the descriptor registry used to reconstruct responses.
    ///
    /// Defaults to [`DescriptorRegistry::with_builtins`].
    pub fn registry(mut self, registry: impl Into<Arc<DescriptorRegistry>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// Sets the wire name of the service entry point `login` starts from.
    ///
    /// Defaults to [`DEFAULT_ROOT_TYPE`].
    pub fn root_type(mut self, root_type: impl Into<String>) -> Self {
        self.root_type = root_type.into();
        self
    }

    /// Enables diagnostic tracing during reconstruction.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn build(self) -> Connection {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(DescriptorRegistry::with_builtins()));

        Connection {
            inner: Arc::new(Inner {
                transport: self.transport,
                registry,
                root_type: self.root_type,
                debug: self.debug,
                session: RwLock::new(None),
            }),
        }
    }
}

impl Connection {
    /// Creates a connection with the built-in registry and debug off.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::builder(transport).build()
    }

    pub fn builder(transport: impl Transport + 'static) -> ConnectionBuilder {
        ConnectionBuilder {
            transport: Box::new(transport),
            registry: None,
            root_type: DEFAULT_ROOT_TYPE.to_string(),
            debug: false,
        }
    }

    pub fn registry(&self) -> &DescriptorRegistry {
        &self.inner.registry
    }

    pub fn debug(&self) -> bool {
        self.inner.debug
    }

    /// Wire name of the service entry point.
    pub fn root_type(&self) -> &str {
        &self.inner.root_type
    }

    /// The session token captured by [`Connection::login`], if any.
    pub fn session_token(&self) -> Option<String> {
        match self.inner.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Invokes a remote method.
    ///
    /// `connection` keys are stripped from `params` at every depth before
    /// the call is handed to the transport.
    ///
    /// ## Errors
    ///
    /// - [`VmomiError::AuthenticationRejected`] if the server rejects the credentials
    /// - [`VmomiError::Transport`] for every other transport failure
    /// - [`VmomiError::NoResult`] if the call produced no reply
    pub async fn exec(&self, method: &str, params: Value) -> Result<TransportReply, VmomiError> {
        let params = sanitize(params);
        debug!(method, "invoking remote method");

        match self.inner.transport.call(method, params).await {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Err(VmomiError::NoResult {
                method: method.to_string(),
            }),
            Err(err) => {
                debug!(method, error = %err, "remote method failed");
                Err(VmomiError::from_transport(err))
            }
        }
    }

    /// Reconstructs a raw value as `T` using this connection's registry.
    pub fn reconstruct<T: FromDecoded>(&self, raw: Value, key: &str) -> Result<T, VmomiError> {
        reconstruct(self, raw, key)
    }

    /// Logs in and stores the session token.
    ///
    /// Retrieves the service content, calls `Login` on its session manager
    /// and captures the session cookie from the reply.
    ///
    /// ## Errors
    ///
    /// Returns [`VmomiError::AuthenticationRejected`] for bad credentials and
    /// [`VmomiError::MalformedResponse`] if the service content names no
    /// session manager.
    pub async fn login(&self, user_name: &str, password: &str) -> Result<Option<String>, VmomiError> {
        let content = self
            .exec("RetrieveServiceContent", this_params(ObjectReference::root(self.root_type()))?)
            .await?;
        let session_manager = session_manager_reference(content.result)?;

        let mut credentials = Map::new();
        credentials.insert("userName".to_string(), Value::String(user_name.to_string()));
        credentials.insert("password".to_string(), Value::String(password.to_string()));
        let reply = self
            .exec("Login", merge_params(session_manager, &Value::Object(credentials))?)
            .await?;

        let token = reply
            .header_values("set-cookie")
            .find_map(session_cookie)
            .map(str::to_string);

        if let Some(token) = &token {
            self.inner.transport.set_session_cookie(token);
            info!("session established");
        }

        match self.inner.session.write() {
            Ok(mut guard) => *guard = token.clone(),
            Err(poisoned) => *poisoned.into_inner() = token.clone(),
        }
        Ok(token)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("root_type", &self.inner.root_type)
            .field("debug", &self.inner.debug)
            .field("types", &self.inner.registry.len())
            .field("authenticated", &self.session_token().is_some())
            .finish()
    }
}

/// Removes `connection` keys from every object in `value`.
fn sanitize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| key != CONNECTION_KEY)
                .map(|(key, value)| (key, sanitize(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        other => other,
    }
}

fn session_manager_reference(content: Value) -> Result<ObjectReference, VmomiError> {
    let manager = match content {
        Value::Object(mut map) => map.remove("sessionManager"),
        _ => None,
    };
    let Some(manager) = manager else {
        return Err(VmomiError::malformed(
            "ServiceContent",
            "no sessionManager in service content",
        ));
    };

    let type_name = manager
        .as_object()
        .and_then(discriminator)
        .unwrap_or("SessionManager")
        .to_string();
    let has_value = manager.get(VALUE_KEY).is_some();

    match unwrap_envelope(manager) {
        Value::String(value) => Ok(ObjectReference::managed(type_name, value)),
        _ if has_value => Err(VmomiError::malformed("SessionManager", "non-string reference")),
        _ => Err(VmomiError::malformed("SessionManager", "missing reference")),
    }
}

/// Extracts the session cookie value from one `Set-Cookie` header.
fn session_cookie(header: &str) -> Option<&str> {
    header.split(';').find_map(|part| {
        let (name, value) = part.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.trim_matches('"'))
    })
}
