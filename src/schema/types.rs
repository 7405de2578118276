//! Schema type definitions
//!
//! Supported declared types:
//! - integer, float, boolean, string
//! - enum: closed set of string members
//! - identifier: store-native object identifier
//! - timestamp: UTC date-time
//! - entity: reference to another entity (relationship target)
//! - list: homogeneous list with element type
//! - object: free-form embedded document

use bson::Document;
use serde::{Deserialize, Serialize};

/// Name of the internal identifier field in stored documents
pub const INTERNAL_ID_FIELD: &str = "_id";

/// Name of the identifier field in projected output
pub const OUTPUT_ID_FIELD: &str = "id";

/// Declared value type of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point
    Float,
    /// Boolean
    Boolean,
    /// UTF-8 string
    String,
    /// Enumerated value with a closed member set
    Enum {
        /// Allowed member values
        members: Vec<String>,
    },
    /// Store-native object identifier
    Identifier,
    /// UTC timestamp
    Timestamp,
    /// Reference to another entity
    Entity {
        /// Name of the referenced entity
        entity: String,
    },
    /// Homogeneous list
    List {
        /// Element type (boxed to allow recursive types)
        items: Box<FieldType>,
    },
    /// Free-form embedded document
    Object,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::String => "string",
            FieldType::Enum { .. } => "enum",
            FieldType::Identifier => "identifier",
            FieldType::Timestamp => "timestamp",
            FieldType::Entity { .. } => "entity",
            FieldType::List { .. } => "list",
            FieldType::Object => "object",
        }
    }

    /// Returns the referenced entity for `entity` and `list<entity>` types
    pub fn related_entity(&self) -> Option<&str> {
        match self {
            FieldType::Entity { entity } => Some(entity),
            FieldType::List { items } => match items.as_ref() {
                FieldType::Entity { entity } => Some(entity),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns true for list-valued types
    pub fn is_list(&self) -> bool {
        matches!(self, FieldType::List { .. })
    }

    /// Returns true for the free-form object type
    pub fn is_object(&self) -> bool {
        matches!(self, FieldType::Object)
    }

    /// Shorthand for an entity reference
    pub fn entity(name: impl Into<String>) -> Self {
        FieldType::Entity {
            entity: name.into(),
        }
    }

    /// Shorthand for a list type
    pub fn list(items: FieldType) -> Self {
        FieldType::List {
            items: Box::new(items),
        }
    }

    /// Shorthand for an enum type
    pub fn enumeration<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldType::Enum {
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

/// Field definition with optional relationship metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Declared type
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Key on this entity used for an equality join
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_field: Option<String>,
    /// Key on the related entity used for an equality join
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_field: Option<String>,
    /// Literal stage sequence computing this field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<Vec<Document>>,
    /// Variables bound for `pipeline` when it runs as a join
    #[serde(default, rename = "let", skip_serializing_if = "Option::is_none")]
    pub let_vars: Option<Document>,
}

impl FieldDef {
    /// Create a plain field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            local_field: None,
            foreign_field: None,
            pipeline: None,
            let_vars: None,
        }
    }

    /// Create a relationship field joined by `local_field == foreign_field`
    pub fn relation(
        name: impl Into<String>,
        field_type: FieldType,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
    ) -> Self {
        Self {
            local_field: Some(local_field.into()),
            foreign_field: Some(foreign_field.into()),
            ..Self::new(name, field_type)
        }
    }

    /// Create a field computed by a custom sub-pipeline
    pub fn computed(name: impl Into<String>, field_type: FieldType, pipeline: Vec<Document>) -> Self {
        Self {
            pipeline: Some(pipeline),
            ..Self::new(name, field_type)
        }
    }

    /// Sets `let` bindings for the custom sub-pipeline
    pub fn with_let(mut self, let_vars: Document) -> Self {
        self.let_vars = Some(let_vars);
        self
    }

    /// Returns the join keys when both are declared
    pub fn join_keys(&self) -> Option<(&str, &str)> {
        match (&self.local_field, &self.foreign_field) {
            (Some(local), Some(foreign)) => Some((local, foreign)),
            _ => None,
        }
    }

    /// True if both join keys are declared
    pub fn is_expandable(&self) -> bool {
        self.join_keys().is_some()
    }

    /// True if any relationship metadata is attached
    pub fn has_relationship(&self) -> bool {
        self.local_field.is_some() || self.foreign_field.is_some()
    }

    /// Custom sub-pipeline, if declared and non-empty
    pub fn custom_pipeline(&self) -> Option<&[Document]> {
        self.pipeline
            .as_deref()
            .filter(|stages| !stages.is_empty())
    }
}

/// Physical store coordinates of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Database name
    pub database: String,
    /// Collection name
    pub collection: String,
}

impl Location {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

/// Complete schema of one entity (document kind)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Unique entity name
    pub name: String,
    /// Where documents of this entity live
    #[serde(flatten)]
    pub location: Location,
    /// Declared fields in declaration order
    pub fields: Vec<FieldDef>,
}

impl EntitySchema {
    /// Create a new schema
    pub fn new(name: impl Into<String>, location: Location, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            location,
            fields,
        }
    }

    /// Database this entity lives in
    pub fn database(&self) -> &str {
        &self.location.database
    }

    /// Collection this entity lives in
    pub fn collection(&self) -> &str {
        &self.location.collection
    }

    /// Looks up a declared field
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Declared field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Fields with both local and foreign keys set
    pub fn expandable_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_expandable())
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Fields carrying a custom sub-pipeline, in declaration order
    pub fn custom_pipelines(&self) -> Vec<(&str, &[Document])> {
        self.fields
            .iter()
            .filter_map(|f| f.custom_pipeline().map(|p| (f.name.as_str(), p)))
            .collect()
    }
}
