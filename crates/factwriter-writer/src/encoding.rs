use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::error::{Result, WriterError};
use crate::types::Blake3Hash;

pub const VERSION_KEY: &str = "factwriter.version";
pub const SCHEMA_KEY: &str = "factwriter.schema";
pub const SEGMENT_ID_KEY: &str = "factwriter.segment_id";
pub const SORT_COLUMNS_KEY: &str = "factwriter.sort_columns";

/// Passes bytes through to `inner` while hashing and counting them
struct HashingWriter<W> {
    inner: W,
    hasher: blake3::Hasher,
    bytes_written: u64,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: blake3::Hasher::new(),
            bytes_written: 0,
        }
    }

    fn finish(self) -> (W, Blake3Hash, u64) {
        let hash = self.hasher.finalize();
        (self.inner, Blake3Hash::new(*hash.as_bytes()), self.bytes_written)
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        self.bytes_written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Key/value metadata embedded in every data file of a session
pub(crate) fn file_metadata(
    schema_json: String,
    segment_id: &str,
    sort_columns: &[String],
) -> Vec<KeyValue> {
    vec![
        KeyValue {
            key: VERSION_KEY.to_string(),
            value: Some(env!("CARGO_PKG_VERSION").to_string()),
        },
        KeyValue {
            key: SCHEMA_KEY.to_string(),
            value: Some(schema_json),
        },
        KeyValue {
            key: SEGMENT_ID_KEY.to_string(),
            value: Some(segment_id.to_string()),
        },
        KeyValue {
            key: SORT_COLUMNS_KEY.to_string(),
            value: Some(sort_columns.join(",")),
        },
    ]
}

/// Writer properties for one session
///
/// - Snappy compression
/// - Dictionary encoding enabled
/// - Page-level statistics
/// - `row_group_rows` rows per group
pub(crate) fn writer_properties(row_group_rows: usize, metadata: Vec<KeyValue>) -> WriterProperties {
    WriterProperties::builder()
        .set_dictionary_enabled(true)
        .set_statistics_enabled(EnabledStatistics::Page)
        .set_compression(Compression::SNAPPY)
        .set_data_page_size_limit(256 * 1024)
        .set_write_batch_size(32 * 1024)
        .set_max_row_group_size(row_group_rows)
        .set_dictionary_page_size_limit(128 * 1024)
        .set_key_value_metadata(Some(metadata))
        .build()
}

/// Outcome of encoding one batch into a file
#[derive(Debug)]
pub(crate) struct EncodedFile {
    pub row_count: u64,
    pub file_size: u64,
    pub hash: Blake3Hash,
}

/// Encode `batch` as Parquet into `file`, then flush and sync it
pub(crate) fn encode_to_file(
    file: File,
    batch: &RecordBatch,
    properties: &WriterProperties,
) -> Result<EncodedFile> {
    let mut sink = HashingWriter::new(BufWriter::new(file));

    let thrift_metadata = {
        let mut writer = ArrowWriter::try_new(&mut sink, batch.schema(), Some(properties.clone()))
            .map_err(|e| WriterError::write_failure(format!("failed to create Arrow writer: {}", e)))?;
        writer
            .write(batch)
            .map_err(|e| WriterError::write_failure(format!("failed to write batch: {}", e)))?;
        writer
            .close()
            .map_err(|e| WriterError::write_failure(format!("failed to close writer: {}", e)))?
    };

    let (buffered, hash, file_size) = sink.finish();
    let file = buffered
        .into_inner()
        .map_err(|e| WriterError::write_failure(format!("failed to flush data file: {}", e.error())))?;
    file.sync_all()
        .map_err(|e| WriterError::write_failure(format!("failed to sync data file: {}", e)))?;

    Ok(EncodedFile {
        row_count: u64::try_from(thrift_metadata.num_rows).unwrap_or_default(),
        file_size,
        hash,
    })
}
