// Sort column validation and row ordering
//
// Sort keys are top-level primitive columns only. Ordering is a stable,
// multi-key comparison in the precedence the caller listed the columns.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::ConfigurationError;
use crate::row::{Row, Value};
use crate::schema::{FieldKind, Schema};

/// A validated sort column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    column: String,
    index: usize,
    kind: FieldKind,
}

impl SortKey {
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Position of the column in the schema (and in every Row)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

/// Resolve requested sort column names against `schema`
///
/// Names must match a top-level field exactly and that field must be one of
/// BOOLEAN, INT, LONG, DOUBLE or STRING. The returned keys keep the requested
/// order, which is the sort precedence.
pub fn validate_sort_columns(
    schema: &Schema,
    requested: &[String],
) -> Result<Vec<SortKey>, ConfigurationError> {
    let mut seen = HashSet::with_capacity(requested.len());
    let mut keys = Vec::with_capacity(requested.len());

    for column in requested {
        if !seen.insert(column.as_str()) {
            return Err(ConfigurationError::DuplicateSortColumn {
                column: column.clone(),
            });
        }

        let Some((index, field)) = schema.field(column) else {
            return Err(ConfigurationError::UnknownColumn {
                column: column.clone(),
                available: schema.column_names(),
            });
        };

        if !field.kind().is_primitive() {
            return Err(ConfigurationError::UnsortableColumn {
                column: column.clone(),
                kind: field.kind(),
            });
        }

        keys.push(SortKey {
            column: column.clone(),
            index,
            kind: field.kind(),
        });
    }

    Ok(keys)
}

/// Compare two rows by `keys` in precedence order
pub fn compare_rows(a: &Row, b: &Row, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = match (a.get(key.index), b.get(key.index)) {
            (Some(left), Some(right)) => compare_values(left, right),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Stable in-place sort; ties keep arrival order
pub fn sort_rows(rows: &mut [Row], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    rows.sort_by(|a, b| compare_rows(a, b, keys));
}

// Nulls first; false < true; numbers ascending (doubles by total order);
// strings by code point, which is byte order for UTF-8.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Long(x), Value::Long(y)) => x.cmp(y),
        (Value::Double(x), Value::Double(y)) => x.total_cmp(y),
        (Value::String(x), Value::String(y)) => x.as_bytes().cmp(y.as_bytes()),
        _ => Ordering::Equal,
    }
}
