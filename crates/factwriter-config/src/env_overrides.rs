use super::{BadRecordAction, LogFormat, RuntimeConfig};
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "FACTWRITER_";

/// Abstraction over environment-variable lookups so tests and embedders can
/// supply their own source of overrides.
pub trait EnvSource {
    /// Get a variable by its key without the FACTWRITER_ prefix
    fn get(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Output layout
    if let Some(path) = get_env_string(env, "OUTPUT_PATH")? {
        config.writer.output_path = PathBuf::from(path);
    }
    if let Some(val) = get_env_bool(env, "TRANSACTIONAL")? {
        config.writer.is_transactional_table = val;
    }
    if let Some(segment_id) = get_env_string(env, "SEGMENT_ID")? {
        config.writer.segment_id = if segment_id.is_empty() {
            None
        } else {
            Some(segment_id)
        };
    }

    // Ordering and thresholds
    if let Some(columns) = get_env_string(env, "SORT_BY")? {
        config.writer.sort_by = parse_column_list(&columns);
    }
    if let Some(val) = get_env_usize(env, "MAX_FILE_BYTES")? {
        config.writer.max_file_bytes = val;
    }
    if let Some(val) = get_env_usize(env, "ROW_GROUP_ROWS")? {
        config.writer.row_group_rows = val;
    }
    if let Some(action) = get_env_string(env, "BAD_RECORD_ACTION")? {
        config.writer.bad_record_action = action
            .parse::<BadRecordAction>()
            .context("Invalid FACTWRITER_BAD_RECORD_ACTION value")?;
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL")? {
        config.log.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT")? {
        config.log.format = match format.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };
    }

    Ok(())
}

/// Split a comma-separated column list, dropping empty entries
fn parse_column_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(str::to_string)
        .collect()
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Result<Option<String>> {
    Ok(env.get(key))
}

fn get_env_usize<E: EnvSource>(env: &E, key: &str) -> Result<Option<usize>> {
    match get_env_string(env, key)? {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<usize>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match get_env_string(env, key)? {
        Some(val) => {
            let parsed = val.trim().parse::<bool>().map_err(|e| {
                anyhow!(
                    "Failed to parse {}{} (expected bool): {}",
                    ENV_PREFIX,
                    key,
                    e
                )
            })?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
