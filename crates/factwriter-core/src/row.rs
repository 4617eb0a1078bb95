// Internal row representation
//
// A Row holds one Value per top-level schema field, positionally aligned.

/// A typed value aligned with a [`crate::Field`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    /// Also carries widened single-precision input
    Double(f64),
    String(String),
    /// Children aligned with the STRUCT field's children
    Struct(Vec<Value>),
    /// Elements conforming to the ARRAY field's element type
    Array(Vec<Value>),
}

impl Value {
    /// Approximate in-memory footprint, used for file-size planning
    pub fn estimated_size(&self) -> usize {
        match self {
            Value::Null | Value::Boolean(_) => 1,
            Value::Int(_) => 4,
            Value::Long(_) | Value::Double(_) => 8,
            Value::String(s) => s.len() + 4,
            Value::Struct(children) => 1 + children.iter().map(Value::estimated_size).sum::<usize>(),
            Value::Array(elements) => 4 + elements.iter().map(Value::estimated_size).sum::<usize>(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn estimated_size(&self) -> usize {
        self.values.iter().map(Value::estimated_size).sum()
    }
}
