//! Error types for schema translation, sort configuration and record adaptation

use crate::schema::FieldKind;
use thiserror::Error;

/// The external schema cannot be represented by the internal columnar schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field uses a type with no columnar counterpart (null, bytes, fixed, map, ...)
    #[error("field '{path}' has unsupported type '{avro_type}'")]
    UnsupportedType { path: String, avro_type: String },

    /// Two siblings share a name
    #[error("duplicate field name '{name}' in '{parent}'")]
    DuplicateField { parent: String, name: String },

    /// A record with no fields has no columnar representation
    #[error("record '{path}' has no fields")]
    EmptyRecord { path: String },

    /// A named type refers to a type that was never declared
    #[error("field '{path}' refers to unknown type '{name}'")]
    UnresolvedReference { path: String, name: String },

    /// A record contains itself, directly or through other records
    #[error("field '{path}' recursively contains record '{name}'")]
    RecursiveType { path: String, name: String },

    /// The top-level external schema must be a record
    #[error("top-level schema must be a record, found '{found}'")]
    NotARecord { found: String },
}

/// Sort configuration is incompatible with the schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("sort column '{column}' does not exist (available columns: {})", .available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    /// Complex columns can never be sort keys
    #[error("sort column '{column}' has kind {kind}; only BOOLEAN, INT, LONG, DOUBLE and STRING columns can be sorted")]
    UnsortableColumn { column: String, kind: FieldKind },

    #[error("sort column '{column}' is listed more than once")]
    DuplicateSortColumn { column: String },
}

/// A single record does not conform to the schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdaptationError {
    #[error("field '{path}' expected {expected} but found {actual}")]
    TypeMismatch {
        path: String,
        expected: FieldKind,
        actual: String,
    },

    /// A non-nullable primitive field is absent or null
    #[error("required field '{path}' is missing or null")]
    MissingField { path: String },

    #[error("input is not a record")]
    NotARecord,
}
