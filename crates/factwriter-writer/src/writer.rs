// ColumnarWriter - one write session into one segment
//
// Construction validates everything that can be checked up front (config,
// schema translation, sort columns) before any directory is touched. Rows are
// buffered in memory and only encoded at close.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use apache_avro::Schema as AvroSchema;
use arrow::datatypes::SchemaRef;
use chrono::Utc;
use factwriter_config::{BadRecordAction, WriterConfig};
use factwriter_core::{
    adapt, rows_to_record_batch, sort_rows, to_arrow_schema, translate, validate_sort_columns,
    GenericRecord, Row, Schema, SortKey,
};
use parquet::file::properties::WriterProperties;
use tracing::{debug, info, warn};

use crate::encoding::{self, EncodedFile};
use crate::error::{Result, WriterError};
use crate::segment;
use crate::types::{DataFile, WriteSummary, WriterState};

/// Buffers records for one segment and writes them as fact files on close
pub struct ColumnarWriter {
    schema: Schema,
    arrow_schema: SchemaRef,
    sort_keys: Vec<SortKey>,
    config: WriterConfig,
    segment_id: String,
    segment_dir: PathBuf,
    task_id: String,
    properties: WriterProperties,
    state: WriterState,
    buffer: Vec<Row>,
    buffered_bytes: usize,
    rows_skipped: u64,
    data_files: Vec<DataFile>,
}

impl ColumnarWriter {
    /// Build a writer for records described by `avro_schema`
    pub fn new(avro_schema: &AvroSchema, config: WriterConfig) -> Result<Self> {
        validate_config(&config)?;
        let schema = translate(avro_schema)?;
        Self::build(schema, config)
    }

    /// Build a writer for an already translated schema
    pub fn from_schema(schema: Schema, config: WriterConfig) -> Result<Self> {
        validate_config(&config)?;
        Self::build(schema, config)
    }

    fn build(schema: Schema, config: WriterConfig) -> Result<Self> {
        let sort_keys = validate_sort_columns(&schema, &config.sort_by)?;

        let segment_id = segment::effective_segment_id(config.segment_id.as_deref()).to_string();
        let segment_dir = segment::resolve(
            &config.output_path,
            config.segment_id.as_deref(),
            config.is_transactional_table,
        );

        let metadata = encoding::file_metadata(schema.to_json(), &segment_id, &config.sort_by);
        let properties = encoding::writer_properties(config.row_group_rows, metadata);
        let arrow_schema = Arc::new(to_arrow_schema(&schema));
        let task_id = uuid::Uuid::new_v4().simple().to_string();

        debug!(
            segment_id = %segment_id,
            segment_dir = %segment_dir.display(),
            columns = schema.len(),
            sort_columns = sort_keys.len(),
            "Created columnar writer"
        );

        Ok(Self {
            schema,
            arrow_schema,
            sort_keys,
            config,
            segment_id,
            segment_dir,
            task_id,
            properties,
            state: WriterState::Open,
            buffer: Vec::new(),
            buffered_bytes: 0,
            rows_skipped: 0,
            data_files: Vec::new(),
        })
    }

    /// Adapt and buffer one record
    ///
    /// Under [`BadRecordAction::Fail`] a rejected record aborts the session:
    /// the error is returned and no file will be written. Under
    /// [`BadRecordAction::Skip`] it is logged, counted and dropped.
    pub fn write<R>(&mut self, record: &R) -> Result<()>
    where
        R: GenericRecord + ?Sized,
    {
        if self.state != WriterState::Open {
            return Err(WriterError::closed_writer(self.state));
        }

        match adapt(&self.schema, record) {
            Ok(row) => {
                self.buffered_bytes += row.estimated_size();
                self.buffer.push(row);
                Ok(())
            }
            Err(err) => match self.config.bad_record_action {
                BadRecordAction::Skip => {
                    self.rows_skipped += 1;
                    warn!(error = %err, skipped = self.rows_skipped, "Skipping bad record");
                    Ok(())
                }
                BadRecordAction::Fail => {
                    warn!(error = %err, "Bad record; aborting writer");
                    self.abort();
                    Err(err.into())
                }
            },
        }
    }

    /// Discard buffered rows and stop accepting records; nothing is written
    pub fn abort(&mut self) {
        if matches!(self.state, WriterState::Closed | WriterState::Aborted) {
            return;
        }
        let discarded = self.buffer.len();
        self.buffer = Vec::new();
        self.buffered_bytes = 0;
        self.state = WriterState::Aborted;
        debug!(discarded, "Writer aborted");
    }

    /// Sort, encode and publish all buffered rows
    ///
    /// Runs once; later calls (and calls on an aborted writer) return the
    /// summary without writing anything.
    pub fn close(&mut self) -> Result<WriteSummary> {
        if self.state != WriterState::Open {
            return Ok(self.summary());
        }

        self.state = WriterState::Closing;
        let rows = std::mem::take(&mut self.buffer);
        let buffered_bytes = std::mem::take(&mut self.buffered_bytes);
        let result = self.flush(rows, Utc::now().timestamp_millis());
        self.state = WriterState::Closed;
        self.data_files = result?;

        let summary = self.summary();
        info!(
            segment_dir = %self.segment_dir.display(),
            files = summary.files.len(),
            rows_written = summary.rows_written,
            rows_skipped = summary.rows_skipped,
            buffered_bytes,
            "Closed columnar writer"
        );
        Ok(summary)
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn segment_dir(&self) -> &Path {
        &self.segment_dir
    }

    /// Rows accepted and not yet written
    pub fn buffered_rows(&self) -> usize {
        self.buffer.len()
    }

    /// Files written by close; empty before close or after abort
    pub fn data_files(&self) -> &[DataFile] {
        &self.data_files
    }

    pub fn summary(&self) -> WriteSummary {
        WriteSummary {
            state: self.state,
            segment_id: self.segment_id.clone(),
            segment_dir: self.segment_dir.clone(),
            rows_written: self.data_files.iter().map(|file| file.row_count).sum(),
            rows_skipped: self.rows_skipped,
            files: self.data_files.clone(),
        }
    }

    fn flush(&self, mut rows: Vec<Row>, timestamp: i64) -> Result<Vec<DataFile>> {
        if rows.is_empty() {
            debug!("No rows buffered; no data file written");
            return Ok(Vec::new());
        }

        sort_rows(&mut rows, &self.sort_keys);
        let chunks = split_by_volume(&rows, self.config.max_file_bytes);

        fs::create_dir_all(&self.segment_dir).map_err(|e| {
            WriterError::write_failure(format!(
                "failed to create segment directory {}: {}",
                self.segment_dir.display(),
                e
            ))
        })?;

        // All files are staged before any is renamed into place
        let mut staged: Vec<StagedFile> = Vec::with_capacity(chunks.len());
        for (batch_no, chunk) in chunks.iter().enumerate() {
            let name = segment::data_file_name(&self.task_id, batch_no, &self.segment_id, timestamp);
            let staged_file = StagedFile {
                temp_path: self.segment_dir.join(segment::temp_file_name(&name)),
                final_path: self.segment_dir.join(&name),
                encoded: None,
            };

            match self.encode_chunk(chunk, &staged_file) {
                Ok(encoded) => staged.push(StagedFile {
                    encoded: Some(encoded),
                    ..staged_file
                }),
                Err(err) => {
                    staged.push(staged_file);
                    remove_temp_files(&staged);
                    return Err(err);
                }
            }
        }

        let mut files = Vec::with_capacity(staged.len());
        for (idx, staged_file) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(&staged_file.temp_path, &staged_file.final_path) {
                remove_temp_files(&staged[idx..]);
                return Err(WriterError::write_failure(format!(
                    "failed to publish {}: {}",
                    staged_file.final_path.display(),
                    e
                )));
            }

            let Some(encoded) = staged_file.encoded.as_ref() else {
                continue;
            };
            debug!(
                path = %staged_file.final_path.display(),
                rows = encoded.row_count,
                bytes = encoded.file_size,
                hash = %encoded.hash.to_hex(),
                "Wrote data file"
            );
            files.push(DataFile {
                path: staged_file.final_path.clone(),
                row_count: encoded.row_count,
                file_size: encoded.file_size,
                hash: encoded.hash.clone(),
                completed_at: Utc::now(),
            });
        }

        Ok(files)
    }

    fn encode_chunk(&self, chunk: &[Row], staged: &StagedFile) -> Result<EncodedFile> {
        if staged.final_path.exists() {
            return Err(WriterError::write_failure(format!(
                "data file already exists: {}",
                staged.final_path.display()
            )));
        }

        let batch = rows_to_record_batch(&self.schema, Arc::clone(&self.arrow_schema), chunk)
            .map_err(|e| WriterError::write_failure(format!("failed to build record batch: {}", e)))?;

        let file = create_new(&staged.temp_path)?;
        encoding::encode_to_file(file, &batch, &self.properties)
    }
}

impl Drop for ColumnarWriter {
    fn drop(&mut self) {
        if self.state == WriterState::Open && !self.buffer.is_empty() {
            warn!(
                rows = self.buffer.len(),
                segment_dir = %self.segment_dir.display(),
                "Columnar writer dropped without close; buffered rows discarded"
            );
        }
    }
}

struct StagedFile {
    temp_path: PathBuf,
    final_path: PathBuf,
    encoded: Option<EncodedFile>,
}

fn validate_config(config: &WriterConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| WriterError::invalid_config(format!("{:#}", e)))
}

fn create_new(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| {
            WriterError::write_failure(format!("failed to create {}: {}", path.display(), e))
        })
}

fn remove_temp_files(staged: &[StagedFile]) {
    for staged_file in staged {
        if let Err(e) = fs::remove_file(&staged_file.temp_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    path = %staged_file.temp_path.display(),
                    error = %e,
                    "Failed to remove temporary data file"
                );
            }
        }
    }
}

/// Split rows into contiguous chunks whose estimated volume fits `max_bytes`
///
/// A chunk always holds at least one row, so a single oversized row still
/// gets its own file.
fn split_by_volume(rows: &[Row], max_bytes: usize) -> Vec<&[Row]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut volume = 0usize;

    for (idx, row) in rows.iter().enumerate() {
        let size = row.estimated_size();
        if idx > start && volume.saturating_add(size) > max_bytes {
            chunks.push(&rows[start..idx]);
            start = idx;
            volume = 0;
        }
        volume = volume.saturating_add(size);
    }

    if start < rows.len() {
        chunks.push(&rows[start..]);
    }
    chunks
}
