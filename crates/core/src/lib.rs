//! Cinder Core - Core types for the Cinder secondary-index query engine.
//!
//! This crate provides the foundational types shared by the index and query
//! layers:
//!
//! - `DataType`: Supported attribute data types
//! - `Value`: Runtime attribute values with a total, cross-numeric order
//! - `IndexKey`: Null-aware key stored inside index stores
//! - `EntryKey`: Cache key of an entry
//! - `AttributeSource`: Direct read access to one entry's attributes
//! - `pattern_match`: Case- and accent-insensitive wildcard matching
//! - `Error`: Error types for index maintenance and query evaluation
//!
//! # Example
//!
//! ```rust
//! use cinder_core::{IndexKey, Value};
//!
//! let age = IndexKey::from(Some(Value::Int32(30)));
//! let missing = IndexKey::from(None::<Value>);
//!
//! assert!(missing < age);
//! assert_eq!(age, IndexKey::Value(Value::Int64(30)));
//! ```

mod error;
mod key;
pub mod pattern_match;
mod source;
mod types;
mod value;

pub use error::{Error, Result};
pub use key::{EntryKey, IndexKey};
pub use source::AttributeSource;
pub use types::DataType;
pub use value::Value;

pub use rust_decimal::Decimal;
