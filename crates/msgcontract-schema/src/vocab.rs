//! Closed vocabularies of data types and formats a contract may declare.
//!
//! Each member carries a machine value (what appears in the JSON) and a
//! display name. Lookups match the machine value exactly.

use std::fmt;

/// Allowed `type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Object,
    Integer,
    Number,
    String,
    Boolean,
    Array,
}

impl DataType {
    pub const ALL: [DataType; 6] = [
        DataType::Object,
        DataType::Integer,
        DataType::Number,
        DataType::String,
        DataType::Boolean,
        DataType::Array,
    ];

    /// Machine value as written in a contract.
    pub fn value(self) -> &'static str {
        match self {
            DataType::Object => "object",
            DataType::Integer => "integer",
            DataType::Number => "number",
            DataType::String => "string",
            DataType::Boolean => "boolean",
            DataType::Array => "array",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DataType::Object => "Object",
            DataType::Integer => "Integer",
            DataType::Number => "Number",
            DataType::String => "String",
            DataType::Boolean => "Boolean",
            DataType::Array => "Array",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.value() == value)
    }

    pub fn is_allowed(value: &str) -> bool {
        Self::from_value(value).is_some()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Allowed `format` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Date,
    DateTime,
    Password,
    Byte,
    Binary,
    Guid,
    Float,
    Double,
    Int32,
    Int64,
}

impl Format {
    pub const ALL: [Format; 10] = [
        Format::Date,
        Format::DateTime,
        Format::Password,
        Format::Byte,
        Format::Binary,
        Format::Guid,
        Format::Float,
        Format::Double,
        Format::Int32,
        Format::Int64,
    ];

    /// Machine value as written in a contract.
    pub fn value(self) -> &'static str {
        match self {
            Format::Date => "date",
            Format::DateTime => "date-time",
            Format::Password => "password",
            Format::Byte => "byte",
            Format::Binary => "binary",
            Format::Guid => "guid",
            Format::Float => "float",
            Format::Double => "double",
            Format::Int32 => "int32",
            Format::Int64 => "int64",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Format::Date => "Date",
            Format::DateTime => "DateTime",
            Format::Password => "Password",
            Format::Byte => "Byte",
            Format::Binary => "Binary",
            Format::Guid => "Guid",
            Format::Float => "Float",
            Format::Double => "Double",
            Format::Int32 => "Int32",
            Format::Int64 => "Int64",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.value() == value)
    }

    pub fn is_allowed(value: &str) -> bool {
        Self::from_value(value).is_some()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}
