// Internal columnar schema
//
// A Schema is an ordered list of Fields; position defines column order and
// the value order of every Row. Fields are immutable once built.

use crate::error::SchemaError;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Name given to the single child Field of an ARRAY
pub const ARRAY_ELEMENT_NAME: &str = "item";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldKind {
    Boolean,
    Int,
    Long,
    Double,
    String,
    Struct,
    Array,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Int => "INT",
            Self::Long => "LONG",
            Self::Double => "DOUBLE",
            Self::String => "STRING",
            Self::Struct => "STRUCT",
            Self::Array => "ARRAY",
        }
    }

    /// Primitive kinds are the orderable ones
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Struct | Self::Array)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column or nested component of a column
///
/// Fields come from [`crate::translate`]; leaf fields cannot be built with
/// an arbitrary kind from outside the crate:
///
/// ```compile_fail
/// use factwriter_core::{Field, FieldKind};
/// let field = Field::primitive("payload", FieldKind::Struct);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    name: String,
    kind: FieldKind,
    nullable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Field>,
}

impl Field {
    /// Non-nullable primitive field. `kind` must not be STRUCT or ARRAY.
    pub(crate) fn primitive(name: impl Into<String>, kind: FieldKind) -> Self {
        debug_assert!(kind.is_primitive(), "{kind} is not a primitive kind");
        Self {
            name: name.into(),
            kind,
            nullable: false,
            children: Vec::new(),
        }
    }

    /// STRUCT field; needs at least one child and child names must be unique.
    pub fn structure(name: impl Into<String>, children: Vec<Field>) -> Result<Self, SchemaError> {
        let name = name.into();
        if children.is_empty() {
            return Err(SchemaError::EmptyRecord { path: name });
        }
        ensure_unique_names(&name, &children)?;
        Ok(Self {
            name,
            kind: FieldKind::Struct,
            nullable: false,
            children,
        })
    }

    /// ARRAY field; the element is renamed to [`ARRAY_ELEMENT_NAME`].
    pub fn array(name: impl Into<String>, element: Field) -> Self {
        let element = Field {
            name: ARRAY_ELEMENT_NAME.to_string(),
            ..element
        };
        Self {
            name: name.into(),
            kind: FieldKind::Array,
            nullable: false,
            children: vec![element],
        }
    }

    pub fn with_nullable(self, nullable: bool) -> Self {
        Self { nullable, ..self }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    /// Children of a STRUCT (empty for every other kind)
    pub fn children(&self) -> &[Field] {
        match self.kind {
            FieldKind::Struct => &self.children,
            _ => &[],
        }
    }

    /// Element type of an ARRAY
    pub fn element(&self) -> Option<&Field> {
        match self.kind {
            FieldKind::Array => self.children.first(),
            _ => None,
        }
    }
}

/// Ordered sequence of top-level fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn try_new(fields: Vec<Field>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::EmptyRecord {
                path: "<root>".to_string(),
            });
        }
        ensure_unique_names("<root>", &fields)?;
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a top-level field by exact name, returning its position
    pub fn field(&self, name: &str) -> Option<(usize, &Field)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// JSON rendering embedded into data file metadata
    pub fn to_json(&self) -> String {
        // Serializing plain strings/enums/vecs cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn ensure_unique_names(parent: &str, fields: &[Field]) -> Result<(), SchemaError> {
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                parent: parent.to_string(),
                name: field.name.clone(),
            });
        }
    }
    Ok(())
}
