// Avro generic values
//
// Unions are transparent: the selected branch is what gets adapted.
// Numeric reads follow Avro promotion rules (int -> long -> double, float -> double).

use apache_avro::types::Value as AvroValue;

use super::{GenericArray, GenericRecord, GenericValue};

fn resolved(value: &AvroValue) -> &AvroValue {
    match value {
        AvroValue::Union(_, inner) => resolved(inner),
        other => other,
    }
}

impl GenericRecord for AvroValue {
    fn field(&self, name: &str) -> Option<&dyn GenericValue> {
        match resolved(self) {
            AvroValue::Record(fields) => fields
                .iter()
                .find(|(field_name, _)| field_name == name)
                .map(|(_, value)| value as &dyn GenericValue),
            AvroValue::Map(entries) => entries.get(name).map(|value| value as &dyn GenericValue),
            _ => None,
        }
    }

    fn is_record(&self) -> bool {
        matches!(resolved(self), AvroValue::Record(_) | AvroValue::Map(_))
    }
}

impl GenericArray for Vec<AvroValue> {
    fn len(&self) -> usize {
        <[AvroValue]>::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn GenericValue> {
        <[AvroValue]>::get(self, index).map(|value| value as &dyn GenericValue)
    }
}

impl GenericValue for AvroValue {
    fn is_null(&self) -> bool {
        matches!(resolved(self), AvroValue::Null)
    }

    fn as_bool(&self) -> Option<bool> {
        match resolved(self) {
            AvroValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn as_i32(&self) -> Option<i32> {
        match resolved(self) {
            AvroValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match resolved(self) {
            AvroValue::Int(i) => Some(i64::from(*i)),
            AvroValue::Long(l) => Some(*l),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match resolved(self) {
            AvroValue::Int(i) => Some(f64::from(*i)),
            AvroValue::Long(l) => Some(*l as f64),
            AvroValue::Float(f) => Some(f64::from(*f)),
            AvroValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match resolved(self) {
            AvroValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn as_record(&self) -> Option<&dyn GenericRecord> {
        let value = resolved(self);
        match value {
            AvroValue::Record(_) | AvroValue::Map(_) => Some(value as &dyn GenericRecord),
            _ => None,
        }
    }

    fn as_array(&self) -> Option<&dyn GenericArray> {
        match resolved(self) {
            AvroValue::Array(items) => Some(items as &dyn GenericArray),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match resolved(self) {
            AvroValue::Null => "null",
            AvroValue::Boolean(_) => "boolean",
            AvroValue::Int(_) => "int",
            AvroValue::Long(_) => "long",
            AvroValue::Float(_) => "float",
            AvroValue::Double(_) => "double",
            AvroValue::Bytes(_) => "bytes",
            AvroValue::String(_) => "string",
            AvroValue::Fixed(..) => "fixed",
            AvroValue::Enum(..) => "enum",
            AvroValue::Array(_) => "array",
            AvroValue::Map(_) => "map",
            AvroValue::Record(_) => "record",
            _ => "logical",
        }
    }
}
