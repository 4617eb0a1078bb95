//! Result types reported by the writer

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::path::PathBuf;

/// Blake3 content hash of a data file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blake3Hash([u8; 32]);

impl Blake3Hash {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Serialize for Blake3Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// One fact file written by a close
#[derive(Clone, Debug, Serialize)]
pub struct DataFile {
    /// Final path inside the segment directory
    pub path: PathBuf,
    pub row_count: u64,
    /// File size in bytes
    pub file_size: u64,
    pub hash: Blake3Hash,
    /// Timestamp when the file was renamed into place
    pub completed_at: DateTime<Utc>,
}

/// Lifecycle of a [`crate::ColumnarWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriterState {
    Open,
    Closing,
    Closed,
    /// Terminal after a rejected record under the fail policy
    Aborted,
}

impl std::fmt::Display for WriterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriterState::Open => write!(f, "open"),
            WriterState::Closing => write!(f, "closing"),
            WriterState::Closed => write!(f, "closed"),
            WriterState::Aborted => write!(f, "aborted"),
        }
    }
}

/// What a write session produced
#[derive(Clone, Debug, Serialize)]
pub struct WriteSummary {
    pub state: WriterState,
    pub segment_id: String,
    pub segment_dir: PathBuf,
    pub rows_written: u64,
    pub rows_skipped: u64,
    pub files: Vec<DataFile>,
}
