// factwriter - command-line front end
//
// Wires configuration, tracing and the writer together:
// - `write`:  Avro schema + JSON lines -> fact files in a segment directory
// - `schema`: print the columnar schema an Avro schema translates to

use anyhow::{Context, Result};
use apache_avro::Schema as AvroSchema;
use factwriter_config::{LogConfig, LogFormat, WriterConfig};
use factwriter_core::Schema;
use factwriter_writer::{ColumnarWriter, WriteSummary, WriterError};
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info};

/// Initialize tracing subscriber (text or JSON on stderr)
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing(config: &LogConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Parse log level from config
    let env_filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Try to set the global subscriber; ignore error if already set (idempotent)
    let _ = match config.format {
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_writer(std::io::stderr)),
        ),
        LogFormat::Text => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().with_writer(std::io::stderr)),
        ),
    };
}

/// Read and parse an Avro schema (`.avsc`) file
pub fn load_avro_schema(path: &Path) -> Result<AvroSchema> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
    AvroSchema::parse_str(&text)
        .with_context(|| format!("Failed to parse Avro schema: {}", path.display()))
}

/// Translate an Avro schema file into the columnar schema
pub fn translate_schema_file(path: &Path) -> Result<Schema> {
    let avro_schema = load_avro_schema(path)?;
    factwriter_core::translate(&avro_schema)
        .map_err(WriterError::from)
        .with_context(|| format!("Unsupported schema: {}", path.display()))
}

/// Write one JSON object per input line through a [`ColumnarWriter`]
///
/// Blank lines are ignored. Malformed JSON stops the run and nothing is
/// written; records that parse but do not fit the schema follow the
/// configured bad-record action.
pub fn write_json_lines<R: BufRead>(
    schema: &AvroSchema,
    config: WriterConfig,
    input: R,
) -> Result<WriteSummary> {
    let mut writer = ColumnarWriter::new(schema, config).context("Failed to create writer")?;
    debug!(segment_dir = %writer.segment_dir().display(), "Writing JSON lines");

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                writer.abort();
                return Err(e).with_context(|| format!("Failed to read input line {}", line_no));
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let record: serde_json::Value = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                writer.abort();
                return Err(e).with_context(|| format!("Invalid JSON on input line {}", line_no));
            }
        };

        writer
            .write(&record)
            .with_context(|| format!("Failed to write record on input line {}", line_no))?;
    }

    let summary = writer.close().context("Failed to close writer")?;
    info!(
        files = summary.files.len(),
        rows_written = summary.rows_written,
        rows_skipped = summary.rows_skipped,
        segment_dir = %summary.segment_dir.display(),
        "Write complete"
    );
    Ok(summary)
}
