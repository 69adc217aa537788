//! Binding error types

use abibind_abi::{AbiError, DecodeError, EncodeError};
use thiserror::Error;

/// Error reported by a chain backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Transport/network error
    #[error("transport error: {0}")]
    Transport(String),

    /// RPC error from node
    #[error("RPC error: {code} - {message}")]
    Rpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },

    /// Response that could not be interpreted
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The log subscription ended
    #[error("subscription closed")]
    SubscriptionClosed,
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        TransportError::InvalidResponse(e.to_string())
    }
}

impl From<hex::FromHexError> for TransportError {
    fn from(e: hex::FromHexError) -> Self {
        TransportError::InvalidResponse(e.to_string())
    }
}

/// Error returned by bound contracts and generated bindings
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The embedded ABI could not be parsed or resolved
    #[error("invalid ABI: {0}")]
    Abi(#[from] AbiError),

    /// Arguments could not be encoded; nothing was sent
    #[error("failed to encode {context}: {source}")]
    Encoding {
        /// Function signature or topic being encoded
        context: String,
        /// Codec failure
        #[source]
        source: EncodeError,
    },

    /// Return data or a log could not be decoded
    #[error("failed to decode {context} (value {index}): {source}")]
    Decoding {
        /// Function signature or event name
        context: String,
        /// Position of the value being decoded
        index: usize,
        /// Codec failure
        #[source]
        source: DecodeError,
    },

    /// Signature not present in the contract ABI
    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    /// Backend failure, passed through unchanged
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl BindError {
    pub(crate) fn decoding(context: impl Into<String>, index: usize, source: DecodeError) -> Self {
        BindError::Decoding {
            context: context.into(),
            index,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_is_transparent() {
        let inner = TransportError::Rpc {
            code: -32000,
            message: "execution reverted".into(),
        };
        let err = BindError::from(inner.clone());
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err, BindError::Transport(inner));
    }

    #[test]
    fn test_decoding_display() {
        let err = BindError::decoding("owner(bytes32)", 0, DecodeError::InvalidBool);
        assert_eq!(
            err.to_string(),
            "failed to decode owner(bytes32) (value 0): invalid boolean encoding"
        );
    }
}
