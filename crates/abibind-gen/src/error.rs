//! Generator errors

use std::path::PathBuf;

use abibind_abi::AbiError;
use thiserror::Error;

/// Errors that abort binding generation. Nothing is written when one occurs.
#[derive(Debug, Error)]
pub enum GenError {
    /// The ABI document could not be read into a model
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// A parameter type has no Rust binding
    #[error("unsupported type `{ty}` in {item}")]
    UnsupportedType {
        /// The offending type string
        ty: String,
        /// Declaring item, e.g. `function foo`
        item: String,
    },

    /// The emitted tokens did not form a valid Rust file
    #[error("generated code is not valid Rust: {0}")]
    Syntax(String),

    /// Reading an ABI or writing bindings failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Invalid generator or build configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl GenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }

    /// Lift a type resolution failure, attaching the declaring item
    pub(crate) fn resolving(error: AbiError, item: &str) -> Self {
        match error {
            AbiError::UnsupportedType(ty) => GenError::UnsupportedType {
                ty,
                item: item.to_string(),
            },
            other => GenError::Abi(other),
        }
    }
}

impl From<syn::Error> for GenError {
    fn from(e: syn::Error) -> Self {
        GenError::Syntax(e.to_string())
    }
}
