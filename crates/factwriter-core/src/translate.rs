// Avro schema -> internal columnar schema
//
// Pure and deterministic. The top-level Avro record's fields become the
// top-level columns; nested records become STRUCT, arrays become ARRAY.
// Field defaults and docs carry no meaning for the columnar schema.

use std::collections::HashMap;

use apache_avro::schema::{Name, RecordField, Schema as AvroSchema, SchemaKind};

use crate::error::SchemaError;
use crate::schema::{Field, FieldKind, Schema};

/// Translate a parsed Avro schema into the internal [`Schema`]
///
/// Type mapping:
/// - boolean → BOOLEAN, int → INT, long → LONG, string → STRING
/// - float and double → DOUBLE (float is widened, never rejected)
/// - record → STRUCT, array → ARRAY (recursively)
/// - `["null", T]` → T, marked nullable
/// - a reference to a record declared earlier → that record's STRUCT
///
/// Everything else (null, bytes, fixed, enum, map, logical types, wider
/// unions) fails with [`SchemaError::UnsupportedType`] naming the field path.
/// A record that contains itself fails with [`SchemaError::RecursiveType`].
pub fn translate(schema: &AvroSchema) -> Result<Schema, SchemaError> {
    let AvroSchema::Record(record) = schema else {
        return Err(SchemaError::NotARecord {
            found: avro_type_name(schema),
        });
    };

    let mut translator = Translator::new(schema);
    translator.expanding.push(record.name.clone());
    let fields = translator.fields(&record.fields, None)?;
    let schema = Schema::try_new(fields)?;

    tracing::debug!(columns = schema.len(), "Translated Avro schema");
    Ok(schema)
}

struct Translator<'s> {
    /// Named records declared anywhere in the schema
    names: HashMap<Name, &'s AvroSchema>,
    /// Records currently being expanded, outermost first
    expanding: Vec<Name>,
}

impl<'s> Translator<'s> {
    fn new(root: &'s AvroSchema) -> Self {
        let mut names = HashMap::new();
        collect_records(root, &mut names);
        Self {
            names,
            expanding: Vec::new(),
        }
    }

    fn fields(
        &mut self,
        fields: &'s [RecordField],
        parent: Option<&str>,
    ) -> Result<Vec<Field>, SchemaError> {
        fields
            .iter()
            .map(|field| {
                let path = match parent {
                    Some(parent) => format!("{}.{}", parent, field.name),
                    None => field.name.clone(),
                };
                self.field(&field.name, &path, &field.schema)
            })
            .collect()
    }

    fn field(&mut self, name: &str, path: &str, schema: &'s AvroSchema) -> Result<Field, SchemaError> {
        let field = match schema {
            AvroSchema::Boolean => Field::primitive(name, FieldKind::Boolean),
            AvroSchema::Int => Field::primitive(name, FieldKind::Int),
            AvroSchema::Long => Field::primitive(name, FieldKind::Long),
            AvroSchema::Float | AvroSchema::Double => Field::primitive(name, FieldKind::Double),
            AvroSchema::String => Field::primitive(name, FieldKind::String),
            AvroSchema::Record(record) => {
                if self.expanding.contains(&record.name) {
                    return Err(recursive(path, &record.name));
                }
                self.expanding.push(record.name.clone());
                let children = self.fields(&record.fields, Some(path));
                self.expanding.pop();

                Field::structure(name, children?).map_err(|err| match err {
                    SchemaError::DuplicateField { name, .. } => SchemaError::DuplicateField {
                        parent: path.to_string(),
                        name,
                    },
                    SchemaError::EmptyRecord { .. } => SchemaError::EmptyRecord {
                        path: path.to_string(),
                    },
                    other => other,
                })?
            }
            AvroSchema::Ref { name: type_name } => {
                if self.expanding.contains(type_name) {
                    return Err(recursive(path, type_name));
                }
                let Some(target) = self.names.get(type_name).copied() else {
                    return Err(SchemaError::UnresolvedReference {
                        path: path.to_string(),
                        name: type_name.fullname(None),
                    });
                };
                self.field(name, path, target)?
            }
            AvroSchema::Array(array) => {
                let element_path = format!("{}[]", path);
                let element = self.field(name, &element_path, &array.items)?;
                Field::array(name, element)
            }
            AvroSchema::Union(union) => {
                let variants = union.variants();
                let non_null: Vec<&'s AvroSchema> = variants
                    .iter()
                    .filter(|variant| !matches!(variant, AvroSchema::Null))
                    .collect();

                match non_null.as_slice() {
                    [inner] if variants.len() == 2 && !matches!(inner, AvroSchema::Union(_)) => {
                        self.field(name, path, *inner)?.with_nullable(true)
                    }
                    _ => return Err(unsupported(path, schema)),
                }
            }
            _ => return Err(unsupported(path, schema)),
        };

        Ok(field)
    }
}

/// Index every record declaration so later references can be expanded
fn collect_records<'s>(schema: &'s AvroSchema, names: &mut HashMap<Name, &'s AvroSchema>) {
    match schema {
        AvroSchema::Record(record) => {
            names.entry(record.name.clone()).or_insert(schema);
            for field in &record.fields {
                collect_records(&field.schema, names);
            }
        }
        AvroSchema::Array(array) => collect_records(&array.items, names),
        AvroSchema::Map(map) => collect_records(&map.types, names),
        AvroSchema::Union(union) => {
            for variant in union.variants() {
                collect_records(variant, names);
            }
        }
        _ => {}
    }
}

fn recursive(path: &str, name: &Name) -> SchemaError {
    SchemaError::RecursiveType {
        path: path.to_string(),
        name: name.fullname(None),
    }
}

fn unsupported(path: &str, schema: &AvroSchema) -> SchemaError {
    SchemaError::UnsupportedType {
        path: path.to_string(),
        avro_type: avro_type_name(schema),
    }
}

fn avro_type_name(schema: &AvroSchema) -> String {
    format!("{:?}", SchemaKind::from(schema)).to_lowercase()
}
