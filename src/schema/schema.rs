//! Schema management: the immutable name to field id mapping.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, Result};

/// Small integer identity of a field within one index.
pub type FieldId = u16;

/// An immutable mapping from field name to [`FieldId`].
///
/// Ids are dense and assigned in declaration order, so the schema doubles as
/// the field directory size for the entry codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FieldSchema {
    /// Field names indexed by field id.
    names: Vec<String>,
    /// Reverse lookup.
    ids: AHashMap<String, FieldId>,
}

impl FieldSchema {
    /// Create a schema from an ordered list of field names.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = SchemaBuilder::new();
        for name in names {
            builder = builder.add_field(name);
        }
        builder.build()
    }

    /// Create a new schema builder.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Resolve a field name.
    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.ids.get(name).copied()
    }

    /// Resolve a field id back to its name.
    pub fn field_name(&self, id: FieldId) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    /// Field names in id order.
    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    /// Iterate over `(id, name)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(id, name)| (id as FieldId, name.as_str()))
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl TryFrom<Vec<String>> for FieldSchema {
    type Error = QuarryError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        FieldSchema::new(names)
    }
}

impl From<FieldSchema> for Vec<String> {
    fn from(schema: FieldSchema) -> Self {
        schema.names
    }
}

/// Builder for [`FieldSchema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    names: Vec<String>,
}

impl SchemaBuilder {
    /// Create a new, empty builder.
    pub fn new() -> Self {
        SchemaBuilder { names: Vec::new() }
    }

    /// Declare the next field. Its id is its declaration index.
    pub fn add_field<S: Into<String>>(mut self, name: S) -> Self {
        self.names.push(name.into());
        self
    }

    /// Validate and build the schema.
    pub fn build(self) -> Result<FieldSchema> {
        if self.names.len() > FieldId::MAX as usize {
            return Err(QuarryError::schema(format!(
                "too many fields: {} (max {})",
                self.names.len(),
                FieldId::MAX
            )));
        }

        let mut ids = AHashMap::with_capacity(self.names.len());
        for (id, name) in self.names.iter().enumerate() {
            if name.is_empty() {
                return Err(QuarryError::schema("field names must not be empty"));
            }
            if ids.insert(name.clone(), id as FieldId).is_some() {
                return Err(QuarryError::schema(format!(
                    "field '{name}' is declared twice"
                )));
            }
        }

        Ok(FieldSchema {
            names: self.names,
            ids,
        })
    }
}
