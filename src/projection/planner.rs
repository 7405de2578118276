//! Projection construction

use bson::{doc, Bson, Document};

use crate::schema::{
    EntitySchema, SchemaError, SchemaRegistry, SchemaResult, INTERNAL_ID_FIELD, OUTPUT_ID_FIELD,
};

/// Output field name -> inclusion flag or expression.
///
/// Insertion order is preserved; re-inserting a key replaces its value in
/// place, so merged fragments keep the field's original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionMap {
    fields: Document,
}

impl ProjectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one output field
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Bson>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Merges a fragment, replacing existing keys in place
    pub fn merge(&mut self, fragment: Document) {
        for (key, value) in fragment {
            self.fields.insert(key, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Bson> {
        self.fields.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn as_document(&self) -> &Document {
        &self.fields
    }

    pub fn into_document(self) -> Document {
        self.fields
    }
}

impl From<Document> for ProjectionMap {
    fn from(fields: Document) -> Self {
        Self { fields }
    }
}

/// Default output shape of `entity`.
pub fn default_projection(entity: &EntitySchema) -> ProjectionMap {
    let mut projection = ProjectionMap::new();
    for name in entity.field_names() {
        projection.insert(name, 1);
    }
    projection.insert(OUTPUT_ID_FIELD, format!("${}", INTERNAL_ID_FIELD));
    projection.insert(INTERNAL_ID_FIELD, 0);
    projection
}

/// Conditional projection fragment for the joined relationship `field`.
///
/// The fragment is `{field: {$cond: {if: <unmatched>, then: null, else: {...}}}}`
/// where the else branch lifts every declared field of the related entity
/// (plus its identifier) out of the joined sub-document.
pub fn nested_projection(
    registry: &SchemaRegistry,
    entity: &EntitySchema,
    field: &str,
) -> SchemaResult<Document> {
    let def = entity
        .field(field)
        .ok_or_else(|| SchemaError::unknown_field(&entity.name, field))?;
    let (local_key, _) = def.join_keys().ok_or_else(|| {
        SchemaError::invalid_relationship(&entity.name, field, "no join keys declared")
    })?;
    let related = registry.related(&entity.name, field)?;

    let joined = format!("${}", field);
    let unmatched = doc! {
        "$or": [
            { "$eq": [format!("${}", local_key), Bson::Null] },
            { "$eq": [joined.as_str(), Bson::Null] },
            { "$eq": [joined.as_str(), {}] },
        ]
    };

    let mut lifted = Document::new();
    for name in related.field_names() {
        lifted.insert(name, format!("{}.{}", joined, name));
    }
    lifted.insert(OUTPUT_ID_FIELD, format!("{}.{}", joined, INTERNAL_ID_FIELD));

    Ok(doc! {
        field: {
            "$cond": {
                "if": unmatched,
                "then": Bson::Null,
                "else": lifted,
            }
        }
    })
}
