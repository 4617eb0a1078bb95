//! Segmented columnar fact file writer
//!
//! Takes an Avro schema and a [`factwriter_config::WriterConfig`], accepts
//! generic records through [`ColumnarWriter::write`] and, on
//! [`ColumnarWriter::close`], writes them as Parquet-encoded `.carbondata`
//! files into the segment directory.
//!
//! ```ignore
//! let schema = apache_avro::Schema::parse_str(AVSC)?;
//! let config = WriterConfig::new("/warehouse/people").with_sort_by(["name"]);
//! let mut writer = ColumnarWriter::new(&schema, config)?;
//! writer.write(&serde_json::json!({"name": "bob", "age": 10}))?;
//! let summary = writer.close()?;
//! ```

mod encoding;
mod error;
pub mod segment;
mod types;
mod writer;

pub use encoding::{SCHEMA_KEY, SEGMENT_ID_KEY, SORT_COLUMNS_KEY, VERSION_KEY};
pub use error::{ErrorCode, Result, WriterError};
pub use types::{Blake3Hash, DataFile, WriteSummary, WriterState};
pub use writer::ColumnarWriter;
