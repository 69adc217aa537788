//! ABI error types

use std::fmt;
use thiserror::Error;

/// Where in an ABI document a problem was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiLocation {
    /// The document as a whole (invalid JSON, wrong top-level shape)
    Document,
    /// The entry at this index of the ABI array
    Entry(usize),
}

impl fmt::Display for AbiLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiLocation::Document => write!(f, "document"),
            AbiLocation::Entry(index) => write!(f, "entry #{}", index),
        }
    }
}

/// Errors raised while reading an ABI or resolving its types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// The ABI source violates the contract-ABI schema
    #[error("malformed ABI at {location}: {reason}")]
    MalformedAbi {
        /// Offending document position
        location: AbiLocation,
        /// What was wrong
        reason: String,
    },

    /// A type string with no known Solidity meaning
    #[error("unsupported type `{0}`")]
    UnsupportedType(String),
}

impl AbiError {
    pub(crate) fn malformed(location: AbiLocation, reason: impl Into<String>) -> Self {
        AbiError::MalformedAbi {
            location,
            reason: reason.into(),
        }
    }
}

/// ABI encoding error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Token shape does not match the declared type
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Declared type
        expected: String,
        /// Kind of token supplied
        got: String,
    },

    /// Integer value does not fit the declared width
    #[error("value out of range for {0}")]
    Overflow(String),

    /// Fixed array or tuple with the wrong number of elements
    #[error("length mismatch: expected {expected} elements, got {got}")]
    LengthMismatch {
        /// Declared length
        expected: usize,
        /// Supplied length
        got: usize,
    },

    /// Fixed bytes of the wrong size
    #[error("expected {expected} fixed bytes, got {got}")]
    FixedBytesSize {
        /// Declared size
        expected: usize,
        /// Supplied size
        got: usize,
    },

    /// Number of arguments differs from the number of parameters
    #[error("expected {expected} arguments, got {got}")]
    ArgumentCount {
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// Failure inside a top-level parameter
    #[error("parameter {index}: {source}")]
    Param {
        /// Parameter position
        index: usize,
        /// Underlying failure
        #[source]
        source: Box<EncodeError>,
    },
}

/// ABI decoding error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Data ended before the value did
    #[error("insufficient data: need {needed} bytes, have {available}")]
    InsufficientData {
        /// Bytes required
        needed: usize,
        /// Bytes present
        available: usize,
    },

    /// Offset or length word does not fit in memory
    #[error("offset or length out of bounds")]
    OffsetOverflow,

    /// Integer word outside the declared width
    #[error("value out of range for {0}")]
    OutOfRange(String),

    /// Non-zero bytes where padding is required
    #[error("non-zero padding for {0}")]
    DirtyPadding(String),

    /// Boolean word other than 0 or 1
    #[error("invalid boolean encoding")]
    InvalidBool,

    /// String payload that is not UTF-8
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Token does not have the shape the caller expected
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected kind
        expected: String,
        /// Actual token kind
        got: String,
    },

    /// Array or tuple with the wrong number of elements
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// Fewer decoded values than requested
    #[error("missing value")]
    MissingValue,
}
