// JSON generic values
//
// Objects are records, arrays are sequences. Integers that fit are accepted
// wherever an integral or floating kind is expected.

use serde_json::Value as JsonValue;

use super::{GenericArray, GenericRecord, GenericValue};

impl GenericRecord for JsonValue {
    fn field(&self, name: &str) -> Option<&dyn GenericValue> {
        match self {
            JsonValue::Object(map) => map.get(name).map(|value| value as &dyn GenericValue),
            _ => None,
        }
    }

    fn is_record(&self) -> bool {
        self.is_object()
    }
}

impl GenericArray for Vec<JsonValue> {
    fn len(&self) -> usize {
        <[JsonValue]>::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn GenericValue> {
        <[JsonValue]>::get(self, index).map(|value| value as &dyn GenericValue)
    }
}

impl GenericValue for JsonValue {
    fn is_null(&self) -> bool {
        JsonValue::is_null(self)
    }

    fn as_bool(&self) -> Option<bool> {
        JsonValue::as_bool(self)
    }

    fn as_i32(&self) -> Option<i32> {
        JsonValue::as_i64(self).and_then(|i| i32::try_from(i).ok())
    }

    fn as_i64(&self) -> Option<i64> {
        JsonValue::as_i64(self)
    }

    fn as_f64(&self) -> Option<f64> {
        JsonValue::as_f64(self)
    }

    fn as_str(&self) -> Option<&str> {
        JsonValue::as_str(self)
    }

    fn as_record(&self) -> Option<&dyn GenericRecord> {
        match self {
            JsonValue::Object(_) => Some(self as &dyn GenericRecord),
            _ => None,
        }
    }

    fn as_array(&self) -> Option<&dyn GenericArray> {
        match self {
            JsonValue::Array(items) => Some(items as &dyn GenericArray),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            JsonValue::Null => "null",
            JsonValue::Bool(_) => "boolean",
            JsonValue::Number(n) if n.is_i64() || n.is_u64() => "integer",
            JsonValue::Number(_) => "number",
            JsonValue::String(_) => "string",
            JsonValue::Array(_) => "array",
            JsonValue::Object(_) => "object",
        }
    }
}
