// Rows -> Arrow RecordBatch
//
// The internal schema maps one-to-one onto Arrow types. Every Arrow field is
// declared nullable: required-ness is enforced earlier by the adapter, and a
// null STRUCT still needs null slots in its children.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int32Array, Int64Array, ListArray, RecordBatch,
    RecordBatchOptions, StringArray, StructArray,
};
use arrow::buffer::{NullBuffer, OffsetBuffer};
use arrow::datatypes::{DataType, Field as ArrowField, Fields, Schema as ArrowSchema, SchemaRef};
use arrow::error::ArrowError;

use crate::row::{Row, Value};
use crate::schema::{Field, FieldKind, Schema, ARRAY_ELEMENT_NAME};

static NULL_VALUE: Value = Value::Null;

/// Arrow schema for the internal schema
///
/// BOOLEAN → Boolean, INT → Int32, LONG → Int64, DOUBLE → Float64,
/// STRING → Utf8, STRUCT → Struct, ARRAY → List with an `item` element.
pub fn to_arrow_schema(schema: &Schema) -> ArrowSchema {
    ArrowSchema::new(
        schema
            .fields()
            .iter()
            .map(to_arrow_field)
            .collect::<Vec<_>>(),
    )
}

fn to_arrow_field(field: &Field) -> ArrowField {
    ArrowField::new(field.name(), to_data_type(field), true)
}

fn to_data_type(field: &Field) -> DataType {
    match field.kind() {
        FieldKind::Boolean => DataType::Boolean,
        FieldKind::Int => DataType::Int32,
        FieldKind::Long => DataType::Int64,
        FieldKind::Double => DataType::Float64,
        FieldKind::String => DataType::Utf8,
        FieldKind::Struct => DataType::Struct(struct_fields(field)),
        FieldKind::Array => {
            let element = match field.element() {
                Some(element) => to_arrow_field(element),
                None => ArrowField::new(ARRAY_ELEMENT_NAME, DataType::Null, true),
            };
            DataType::List(Arc::new(element))
        }
    }
}

fn struct_fields(field: &Field) -> Fields {
    field.children().iter().map(to_arrow_field).collect()
}

/// Build one RecordBatch from rows that conform to `schema`
///
/// `arrow_schema` must be the result of [`to_arrow_schema`] for the same
/// schema; callers keep it around so every batch of a file shares it.
pub fn rows_to_record_batch(
    schema: &Schema,
    arrow_schema: SchemaRef,
    rows: &[Row],
) -> Result<RecordBatch, ArrowError> {
    let columns = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let values: Vec<&Value> = rows
                .iter()
                .map(|row| row.get(idx).unwrap_or(&NULL_VALUE))
                .collect();
            build_array(field, &values)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
    RecordBatch::try_new_with_options(arrow_schema, columns, &options)
}

fn build_array<'a>(field: &Field, values: &[&'a Value]) -> Result<ArrayRef, ArrowError> {
    let array: ArrayRef = match field.kind() {
        FieldKind::Boolean => Arc::new(BooleanArray::from(collect_values(
            field,
            values,
            |value| match value {
                Value::Boolean(b) => Some(*b),
                _ => None,
            },
        )?)),
        FieldKind::Int => Arc::new(Int32Array::from(collect_values(
            field,
            values,
            |value| match value {
                Value::Int(i) => Some(*i),
                _ => None,
            },
        )?)),
        FieldKind::Long => Arc::new(Int64Array::from(collect_values(
            field,
            values,
            |value| match value {
                Value::Long(l) => Some(*l),
                _ => None,
            },
        )?)),
        FieldKind::Double => Arc::new(Float64Array::from(collect_values(
            field,
            values,
            |value| match value {
                Value::Double(d) => Some(*d),
                _ => None,
            },
        )?)),
        FieldKind::String => Arc::new(StringArray::from(collect_values(
            field,
            values,
            |value: &'a Value| match value {
                Value::String(s) => Some(s.as_str()),
                _ => None,
            },
        )?)),
        FieldKind::Struct => build_struct(field, values)?,
        FieldKind::Array => build_list(field, values)?,
    };
    Ok(array)
}

fn collect_values<'a, T>(
    field: &Field,
    values: &[&'a Value],
    extract: impl Fn(&'a Value) -> Option<T>,
) -> Result<Vec<Option<T>>, ArrowError> {
    values
        .iter()
        .map(|&value| match value {
            Value::Null => Ok(None),
            other => extract(other).map(Some).ok_or_else(|| mismatch(field, other)),
        })
        .collect()
}

fn build_struct(field: &Field, values: &[&Value]) -> Result<ArrayRef, ArrowError> {
    let mut validity = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Value::Struct(_) => validity.push(true),
            Value::Null => validity.push(false),
            other => return Err(mismatch(field, other)),
        }
    }

    let children = field
        .children()
        .iter()
        .enumerate()
        .map(|(idx, child)| {
            let child_values: Vec<&Value> = values
                .iter()
                .map(|value| match value {
                    Value::Struct(members) => members.get(idx).unwrap_or(&NULL_VALUE),
                    _ => &NULL_VALUE,
                })
                .collect();
            build_array(child, &child_values)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let nulls = null_buffer(validity);
    let array = if children.is_empty() {
        StructArray::new_empty_fields(values.len(), nulls)
    } else {
        StructArray::try_new(struct_fields(field), children, nulls)?
    };
    Ok(Arc::new(array))
}

fn build_list<'a>(field: &Field, values: &[&'a Value]) -> Result<ArrayRef, ArrowError> {
    let element = field.element().ok_or_else(|| {
        ArrowError::SchemaError(format!("array column {} has no element", field.name()))
    })?;

    let mut lengths = Vec::with_capacity(values.len());
    let mut validity = Vec::with_capacity(values.len());
    let mut flattened: Vec<&'a Value> = Vec::new();

    for value in values {
        match *value {
            Value::Array(items) => {
                lengths.push(items.len());
                validity.push(true);
                flattened.extend(items.iter());
            }
            Value::Null => {
                lengths.push(0);
                validity.push(false);
            }
            other => return Err(mismatch(field, other)),
        }
    }

    let child = build_array(element, &flattened)?;
    let list = ListArray::try_new(
        Arc::new(to_arrow_field(element)),
        OffsetBuffer::from_lengths(lengths),
        child,
        null_buffer(validity),
    )?;
    Ok(Arc::new(list))
}

fn null_buffer(validity: Vec<bool>) -> Option<NullBuffer> {
    if validity.iter().all(|valid| *valid) {
        None
    } else {
        Some(NullBuffer::from(validity))
    }
}

fn mismatch(field: &Field, value: &Value) -> ArrowError {
    ArrowError::InvalidArgumentError(format!(
        "column {} expects {} but the row holds {:?}",
        field.name(),
        field.kind(),
        value
    ))
}
