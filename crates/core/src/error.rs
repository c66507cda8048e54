//! Error types for Cinder.

use crate::types::DataType;
use thiserror::Error;

/// Result type alias for Cinder operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for index maintenance and query evaluation.
///
/// Every variant is a local, synchronous failure: nothing is retried and a
/// failing predicate aborts the whole evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An attribute has no index store while the cache holds entries of the type.
    #[error("Index is not defined for attribute '{attribute}' of type '{type_name}'")]
    IndexNotDefined { type_name: String, attribute: String },

    /// An aggregate function was applied to values it cannot combine.
    #[error("{function} cannot be applied to {data_type} values of attribute '{attribute}'")]
    AggregateTypeMismatch {
        function: String,
        attribute: String,
        data_type: DataType,
    },

    /// A query parameter referenced by the predicate tree was not supplied.
    #[error("Value for parameter '{name}' was not supplied")]
    MissingParameter { name: String },

    /// No index is registered for the type and none could be synthesized.
    #[error("No index is registered for type '{type_name}'")]
    TypeNotIndexed { type_name: String },

    /// An object was indexed under a type that was never registered.
    #[error("Type '{type_name}' is not registered")]
    TypeNotRegistered { type_name: String },

    /// The attribute map handed to the index violates its contract.
    #[error("Malformed attributes for entry '{key}': {message}")]
    MalformedAttributes { key: String, message: String },

    /// The operation is not supported.
    #[error("Not supported: {message}")]
    Unsupported { message: String },
}

impl Error {
    /// Creates an index-not-defined error.
    pub fn index_not_defined(type_name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Error::IndexNotDefined {
            type_name: type_name.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an aggregate type mismatch error.
    pub fn aggregate_type_mismatch(
        function: impl Into<String>,
        attribute: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Error::AggregateTypeMismatch {
            function: function.into(),
            attribute: attribute.into(),
            data_type,
        }
    }

    /// Creates a missing parameter error.
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Error::MissingParameter { name: name.into() }
    }

    /// Creates a type-not-indexed error.
    pub fn type_not_indexed(type_name: impl Into<String>) -> Self {
        Error::TypeNotIndexed {
            type_name: type_name.into(),
        }
    }

    /// Creates a type-not-registered error.
    pub fn type_not_registered(type_name: impl Into<String>) -> Self {
        Error::TypeNotRegistered {
            type_name: type_name.into(),
        }
    }

    /// Creates a malformed attributes error.
    pub fn malformed_attributes(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedAttributes {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::Unsupported {
            message: message.into(),
        }
    }
}
