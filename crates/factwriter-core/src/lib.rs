// factwriter-core - Platform-agnostic core logic
//
// This crate contains the PURE translation logic between an external Avro
// schema/record world and the internal columnar model. No I/O, no file
// handles, deterministic for the same input.
//
// - translate: Avro schema tree -> internal Schema
// - adapt:     generic record -> Row
// - sort:      sort column validation and stable row ordering
// - to_arrow:  Rows -> Arrow RecordBatch (the encoder input)

pub mod adapt;
pub mod error;
pub mod row;
pub mod schema;
pub mod sort;
pub mod to_arrow;
pub mod translate;

// Re-export commonly used types
pub use adapt::{adapt, GenericArray, GenericRecord, GenericValue};
pub use error::{AdaptationError, ConfigurationError, SchemaError};
pub use row::{Row, Value};
pub use schema::{Field, FieldKind, Schema, ARRAY_ELEMENT_NAME};
pub use sort::{compare_rows, sort_rows, validate_sort_columns, SortKey};
pub use to_arrow::{rows_to_record_batch, to_arrow_schema};
pub use translate::translate;
