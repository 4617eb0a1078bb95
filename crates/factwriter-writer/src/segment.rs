// Segment directory and data file naming
//
// Transactional tables keep each segment under `Fact/Part0/Segment_<id>`;
// non-transactional output writes straight into the output root. No I/O
// happens here apart from `list_fact_files`.

use std::io;
use std::path::{Path, PathBuf};

/// Extension of every fact data file
pub const FACT_FILE_EXT: &str = ".carbondata";

/// Segment id used when none is configured
pub const DEFAULT_SEGMENT_ID: &str = "null";

const FACT_DIR: &str = "Fact";
const PART_DIR: &str = "Part0";
const SEGMENT_PREFIX: &str = "Segment_";

/// The configured segment id, or [`DEFAULT_SEGMENT_ID`]
pub fn effective_segment_id(segment_id: Option<&str>) -> &str {
    segment_id.unwrap_or(DEFAULT_SEGMENT_ID)
}

/// Directory that holds the data files of one segment
pub fn resolve(output_root: &Path, segment_id: Option<&str>, is_transactional: bool) -> PathBuf {
    if !is_transactional {
        return output_root.to_path_buf();
    }

    output_root
        .join(FACT_DIR)
        .join(PART_DIR)
        .join(format!(
            "{}{}",
            SEGMENT_PREFIX,
            effective_segment_id(segment_id)
        ))
}

/// `part-0-<task>_batchno<n>-0-<segment>-<millis>.carbondata`
pub fn data_file_name(
    task_id: &str,
    batch_no: usize,
    segment_id: &str,
    timestamp_millis: i64,
) -> String {
    format!(
        "part-0-{}_batchno{}-0-{}-{}{}",
        task_id, batch_no, segment_id, timestamp_millis, FACT_FILE_EXT
    )
}

/// Hidden staging name a data file is written under before being renamed
pub fn temp_file_name(file_name: &str) -> String {
    format!(".{}.tmp", file_name)
}

/// Visible fact files directly inside `dir`, sorted by name
///
/// A missing directory yields an empty list.
pub fn list_fact_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with('.') || !name.ends_with(FACT_FILE_EXT) {
            continue;
        }
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}
