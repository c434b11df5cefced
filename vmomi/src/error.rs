//! Call-time errors.
//!
//! Transport failures are kept separate from the errors raised while
//! reconstructing a response, so callers can tell a network problem from a
//! malformed payload.

use thiserror::Error;

/// Fault text the server uses when it rejects a login.
pub const LOGIN_REJECTED_MESSAGE: &str =
    "Cannot complete login due to an incorrect user name or password.";

/// Errors reported by a [`Transport`](crate::Transport) implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network or protocol failure (connection refused, bad envelope, ...).
    #[error("{0}")]
    Protocol(String),

    /// The server answered with an application-level fault.
    #[error("{message}")]
    Fault {
        /// Localized fault message as reported by the server.
        message: String,
        /// Wire name of the fault type, when the transport could decode it.
        fault_type: Option<String>,
    },
}

impl TransportError {
    /// Creates a fault error without a fault type.
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault {
            message: message.into(),
            fault_type: None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Protocol(message) | Self::Fault { message, .. } => message,
        }
    }
}

/// Errors that can occur while invoking a method or reconstructing its result.
#[derive(Debug, Error)]
pub enum VmomiError {
    /// The transport failed; the original message is preserved.
    #[error(transparent)]
    Transport(TransportError),

    /// The server rejected the supplied credentials.
    #[error("Server rejected login credentials")]
    AuthenticationRejected,

    /// The transport completed without a reply payload.
    #[error("No result returned for '{method}'")]
    NoResult { method: String },

    /// The response does not have the shape the descriptor map declares.
    #[error("Malformed response for '{type_key}': {reason}")]
    MalformedResponse { type_key: String, reason: String },

    /// A required value was absent from the response.
    #[error("Missing value for '{type_key}'")]
    MissingValue { type_key: String },

    /// An enum value the generated type does not know.
    #[error("Unknown value '{value}' for enum '{enum_type}'")]
    UnknownEnumValue { enum_type: String, value: String },

    /// A `dateTime` value that could not be parsed.
    #[error("Invalid dateTime '{value}': {source}")]
    InvalidDateTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A `base64Binary` value that could not be decoded.
    #[error("Invalid base64Binary payload: {0}")]
    InvalidBinary(#[from] base64::DecodeError),

    /// Method arguments did not serialize to an object.
    #[error("Invalid method parameters: {0}")]
    InvalidParameters(String),

    /// Method arguments could not be serialized.
    #[error("Failed to serialize parameters: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VmomiError {
    /// Converts a transport failure, translating the credential-rejection
    /// fault into [`VmomiError::AuthenticationRejected`].
    ///
    /// ## Examples
    ///
    /// ```
    /// use vmomi::{TransportError, VmomiError, LOGIN_REJECTED_MESSAGE};
    ///
    /// let err = VmomiError::from_transport(TransportError::fault(LOGIN_REJECTED_MESSAGE));
    /// assert!(err.is_authentication());
    ///
    /// let err = VmomiError::from_transport(TransportError::Protocol("connection reset".into()));
    /// assert_eq!(err.to_string(), "connection reset");
    /// ```
    pub fn from_transport(err: TransportError) -> Self {
        if err.message().contains(LOGIN_REJECTED_MESSAGE) {
            Self::AuthenticationRejected
        } else {
            Self::Transport(err)
        }
    }

    pub fn malformed(type_key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            type_key: type_key.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(type_key: impl Into<String>) -> Self {
        Self::MissingValue {
            type_key: type_key.into(),
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationRejected)
    }
}
