// Generic record -> Row adaptation
//
// The core never depends on a concrete record representation. Anything that
// can answer "get named field", "get array element" and "get scalar as kind
// X" can be written: Avro `types::Value` and `serde_json::Value` are provided.

mod avro;
mod json;

use crate::error::AdaptationError;
use crate::row::{Row, Value};
use crate::schema::{Field, FieldKind, Schema};

/// Record-shaped input: named field access
pub trait GenericRecord {
    /// Value of the named field, `None` when absent
    fn field(&self, name: &str) -> Option<&dyn GenericValue>;

    /// Whether this input is record-shaped at all
    fn is_record(&self) -> bool {
        true
    }
}

/// Sequence-shaped input
pub trait GenericArray {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<&dyn GenericValue>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single input value, inspected by the kind the schema expects
pub trait GenericValue {
    fn is_null(&self) -> bool;
    fn as_bool(&self) -> Option<bool>;
    fn as_i32(&self) -> Option<i32>;
    fn as_i64(&self) -> Option<i64>;
    fn as_f64(&self) -> Option<f64>;
    fn as_str(&self) -> Option<&str>;
    fn as_record(&self) -> Option<&dyn GenericRecord>;
    fn as_array(&self) -> Option<&dyn GenericArray>;

    /// Runtime kind, for diagnostics only
    fn kind_name(&self) -> &'static str;
}

/// Adapt one generic record into a [`Row`] aligned with `schema`
///
/// Top-level fields are read by name in declaration order. Absent or null
/// values become [`Value::Null`] for nullable and complex fields; a missing
/// non-nullable primitive fails with [`AdaptationError::MissingField`].
pub fn adapt<R>(schema: &Schema, record: &R) -> Result<Row, AdaptationError>
where
    R: GenericRecord + ?Sized,
{
    if !record.is_record() {
        return Err(AdaptationError::NotARecord);
    }

    let values = schema
        .fields()
        .iter()
        .map(|field| adapt_value(field, record.field(field.name()), field.name()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Row::new(values))
}

fn adapt_value(
    field: &Field,
    value: Option<&dyn GenericValue>,
    path: &str,
) -> Result<Value, AdaptationError> {
    let value = match value {
        Some(value) if !value.is_null() => value,
        _ => return missing(field, path),
    };

    let mismatch = || AdaptationError::TypeMismatch {
        path: path.to_string(),
        expected: field.kind(),
        actual: value.kind_name().to_string(),
    };

    let adapted = match field.kind() {
        FieldKind::Boolean => Value::Boolean(value.as_bool().ok_or_else(mismatch)?),
        FieldKind::Int => Value::Int(value.as_i32().ok_or_else(mismatch)?),
        FieldKind::Long => Value::Long(value.as_i64().ok_or_else(mismatch)?),
        FieldKind::Double => Value::Double(value.as_f64().ok_or_else(mismatch)?),
        FieldKind::String => Value::String(value.as_str().ok_or_else(mismatch)?.to_string()),
        FieldKind::Struct => {
            let record = value.as_record().ok_or_else(mismatch)?;
            let children = field
                .children()
                .iter()
                .map(|child| {
                    let child_path = format!("{}.{}", path, child.name());
                    adapt_value(child, record.field(child.name()), &child_path)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Value::Struct(children)
        }
        FieldKind::Array => {
            let array = value.as_array().ok_or_else(mismatch)?;
            let Some(element) = field.element() else {
                return Err(mismatch());
            };
            let elements = (0..array.len())
                .map(|idx| {
                    let element_path = format!("{}[{}]", path, idx);
                    adapt_value(element, array.get(idx), &element_path)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Value::Array(elements)
        }
    };

    Ok(adapted)
}

fn missing(field: &Field, path: &str) -> Result<Value, AdaptationError> {
    if field.nullable() || !field.kind().is_primitive() {
        Ok(Value::Null)
    } else {
        Err(AdaptationError::MissingField {
            path: path.to_string(),
        })
    }
}
