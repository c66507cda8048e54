//! Data type definitions for Cinder.
//!
//! This module defines the data types an indexed attribute value can carry.

use core::fmt;

/// Supported attribute data types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean type (true/false)
    Boolean,
    /// Single Unicode scalar value
    Char,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit floating point number
    Float64,
    /// 96-bit fixed-point decimal
    Decimal,
    /// UTF-8 string
    String,
    /// Date and time stored as Unix timestamp (milliseconds)
    DateTime,
}

impl DataType {
    /// Returns whether values of this type can be summed and averaged.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int32 | DataType::Int64 | DataType::Float64 | DataType::Decimal
        )
    }

    /// Returns whether values of this type can take part in MIN/MAX.
    pub fn is_orderable(&self) -> bool {
        !matches!(self, DataType::Boolean)
    }

    /// Returns whether a wildcard pattern can be matched against this type.
    pub fn is_textual(&self) -> bool {
        matches!(self, DataType::String | DataType::Char)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "boolean",
            DataType::Char => "char",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::Decimal => "decimal",
            DataType::String => "string",
            DataType::DateTime => "datetime",
        };
        f.write_str(name)
    }
}
