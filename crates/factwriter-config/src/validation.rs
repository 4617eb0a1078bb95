// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_writer_config(&config.writer)?;
    validate_log_config(&config.log)?;
    Ok(())
}

pub fn validate_writer_config(config: &WriterConfig) -> Result<()> {
    if config.output_path.as_os_str().is_empty() {
        bail!("writer.output_path must not be empty");
    }

    if let Some(segment_id) = config.segment_id.as_deref() {
        validate_segment_id(segment_id)?;
    }

    if config.max_file_bytes == 0 {
        bail!("writer.max_file_bytes must be greater than 0");
    }

    if config.row_group_rows == 0 {
        bail!("writer.row_group_rows must be greater than 0");
    }

    if config.sort_by.iter().any(|column| column.trim().is_empty()) {
        bail!("writer.sort_by must not contain empty column names");
    }

    if config.max_file_bytes as u64 > 8 << 30 {
        // 8 GB
        warn!(
            max_file_bytes = config.max_file_bytes,
            "writer.max_file_bytes is very large; files are encoded in memory"
        );
    }

    if config.row_group_rows > 10_000_000 {
        warn!(
            row_group_rows = config.row_group_rows,
            "writer.row_group_rows is very large; may cause memory issues"
        );
    }

    Ok(())
}

// The id becomes a directory name and part of every file name.
fn validate_segment_id(segment_id: &str) -> Result<()> {
    if segment_id.is_empty() {
        bail!("writer.segment_id must not be empty when set");
    }

    if segment_id == "." || segment_id == ".." {
        bail!("writer.segment_id must not be '.' or '..'");
    }

    if segment_id.contains(['/', '\\']) {
        bail!(
            "writer.segment_id must not contain path separators: {}",
            segment_id
        );
    }

    Ok(())
}

fn validate_log_config(config: &LogConfig) -> Result<()> {
    if config.level.trim().is_empty() {
        bail!("log.level must not be empty");
    }

    Ok(())
}
