//! Error types for the fact file writer crate

use factwriter_core::{AdaptationError, ConfigurationError, SchemaError};
use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Input schema cannot be represented as columns
    E001UnsupportedSchema,
    /// E002: Writer options do not fit the schema
    E002SchemaConfiguration,
    /// E003: A record does not conform to the schema
    E003BadRecord,
    /// E004: Configuration missing or invalid
    E004InvalidConfig,
    /// E005: Write operation failed
    E005WriteFailure,
    /// E006: Writer already closed or aborted
    E006ClosedWriter,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001UnsupportedSchema => "E001",
            Self::E002SchemaConfiguration => "E002",
            Self::E003BadRecord => "E003",
            Self::E004InvalidConfig => "E004",
            Self::E005WriteFailure => "E005",
            Self::E006ClosedWriter => "E006",
        }
    }
}

/// Errors that can occur while building a writer or writing fact files
#[derive(Debug, Error)]
pub enum WriterError {
    /// The Avro schema could not be translated
    #[error("[{code}] Schema translation failed: {source}")]
    Schema {
        code: &'static str,
        #[source]
        source: SchemaError,
    },

    /// Sort columns (or other schema-dependent options) are invalid
    #[error("[{code}] Invalid writer configuration for schema: {source}")]
    Configuration {
        code: &'static str,
        #[source]
        source: ConfigurationError,
    },

    /// A record could not be adapted to the schema
    #[error("[{code}] Record rejected: {source}")]
    Adaptation {
        code: &'static str,
        #[source]
        source: AdaptationError,
    },

    /// Invalid configuration provided
    #[error("[{code}] Invalid configuration: {message}")]
    InvalidConfig { code: &'static str, message: String },

    /// Write operation failed
    #[error("[{code}] Write operation failed: {message}")]
    WriteFailure { code: &'static str, message: String },

    /// The writer no longer accepts records
    #[error("[{code}] Writer is {state}; no further records are accepted")]
    ClosedWriter { code: &'static str, state: String },
}

impl WriterError {
    /// Create an invalid config error with error code
    pub fn invalid_config(message: String) -> Self {
        Self::InvalidConfig {
            code: ErrorCode::E004InvalidConfig.as_str(),
            message,
        }
    }

    /// Create a write failure error with error code
    pub fn write_failure(message: String) -> Self {
        Self::WriteFailure {
            code: ErrorCode::E005WriteFailure.as_str(),
            message,
        }
    }

    /// Create a closed writer error with error code
    pub fn closed_writer(state: impl ToString) -> Self {
        Self::ClosedWriter {
            code: ErrorCode::E006ClosedWriter.as_str(),
            state: state.to_string(),
        }
    }

    /// Stable code, e.g. "E003"
    pub fn code(&self) -> &'static str {
        match self {
            Self::Schema { code, .. }
            | Self::Configuration { code, .. }
            | Self::Adaptation { code, .. }
            | Self::InvalidConfig { code, .. }
            | Self::WriteFailure { code, .. }
            | Self::ClosedWriter { code, .. } => *code,
        }
    }
}

impl From<SchemaError> for WriterError {
    fn from(source: SchemaError) -> Self {
        Self::Schema {
            code: ErrorCode::E001UnsupportedSchema.as_str(),
            source,
        }
    }
}

impl From<ConfigurationError> for WriterError {
    fn from(source: ConfigurationError) -> Self {
        Self::Configuration {
            code: ErrorCode::E002SchemaConfiguration.as_str(),
            source,
        }
    }
}

impl From<AdaptationError> for WriterError {
    fn from(source: AdaptationError) -> Self {
        Self::Adaptation {
            code: ErrorCode::E003BadRecord.as_str(),
            source,
        }
    }
}

/// Result type alias for WriterError
pub type Result<T> = std::result::Result<T, WriterError>;
