//! Schema registry
//!
//! Populated once at startup (programmatically or from a directory of
//! `*.json` entity files) and read-only afterwards. The compiler borrows it
//! immutably, so any number of callers may share one registry.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::observability::Event;

use super::errors::{SchemaError, SchemaResult};
use super::types::{EntitySchema, FieldDef, FieldType};

/// Registry of entity schemas keyed by entity name
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entities: HashMap<String, EntitySchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.json` entity file in `dir` and validates the result.
    pub fn load_dir(dir: &Path) -> SchemaResult<Self> {
        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::malformed(
                dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed(
                    dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        // Directory iteration order is platform dependent.
        paths.sort();

        let mut registry = Self::new();
        for path in &paths {
            registry.register(Self::read_schema_file(path)?)?;
        }
        registry.validate()?;

        tracing::info!(
            event = %Event::SchemasLoaded,
            dir = %dir.display(),
            entities = registry.len(),
        );
        Ok(registry)
    }

    fn read_schema_file(path: &Path) -> SchemaResult<EntitySchema> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("Invalid JSON: {}", e))
        })
    }

    /// Registers an entity schema. Names are unique.
    pub fn register(&mut self, schema: EntitySchema) -> SchemaResult<()> {
        if self.entities.contains_key(&schema.name) {
            return Err(SchemaError::DuplicateEntity(schema.name));
        }
        tracing::debug!(
            event = %Event::SchemaRegistered,
            entity = %schema.name,
            fields = schema.fields.len(),
        );
        self.entities.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Builder-style registration
    pub fn with(mut self, schema: EntitySchema) -> SchemaResult<Self> {
        self.register(schema)?;
        Ok(self)
    }

    /// Gets an entity schema by name
    pub fn get(&self, entity: &str) -> SchemaResult<&EntitySchema> {
        self.entities
            .get(entity)
            .ok_or_else(|| SchemaError::UnknownEntity(entity.to_string()))
    }

    /// True if the entity is registered
    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    /// Gets a declared field of an entity
    pub fn field(&self, entity: &str, field: &str) -> SchemaResult<&FieldDef> {
        self.get(entity)?
            .field(field)
            .ok_or_else(|| SchemaError::unknown_field(entity, field))
    }

    /// Resolves the entity referenced by a relationship field
    pub fn related(&self, entity: &str, field: &str) -> SchemaResult<&EntitySchema> {
        let def = self.field(entity, field)?;
        let related = def.field_type.related_entity().ok_or_else(|| {
            SchemaError::invalid_relationship(
                entity,
                field,
                format!("declared type '{}' is not an entity", def.field_type.type_name()),
            )
        })?;
        self.get(related)
    }

    /// Registered entity names, sorted
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Checks declaration rules across all registered entities.
    ///
    /// Cross-database relationships are accepted here; expansion rejects
    /// them when a pipeline is built.
    pub fn validate(&self) -> SchemaResult<()> {
        for name in self.entity_names() {
            let schema = &self.entities[name];
            let mut seen = HashSet::new();
            for field in &schema.fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(SchemaError::DuplicateField {
                        entity: schema.name.clone(),
                        field: field.name.clone(),
                    });
                }
                self.validate_field(schema, field)?;
            }
        }
        Ok(())
    }

    fn validate_field(&self, schema: &EntitySchema, field: &FieldDef) -> SchemaResult<()> {
        if let FieldType::Enum { members } = &field.field_type {
            if members.is_empty() {
                return Err(SchemaError::EmptyEnum {
                    entity: schema.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        if !field.has_relationship() {
            return Ok(());
        }

        if field.local_field.is_none() || field.foreign_field.is_none() {
            return Err(SchemaError::invalid_relationship(
                &schema.name,
                &field.name,
                "local_field and foreign_field must be declared together",
            ));
        }

        let related = field.field_type.related_entity().ok_or_else(|| {
            SchemaError::invalid_relationship(
                &schema.name,
                &field.name,
                format!(
                    "join keys require an entity or list of entity, got '{}'",
                    field.field_type.type_name()
                ),
            )
        })?;

        if !self.contains(related) {
            return Err(SchemaError::invalid_relationship(
                &schema.name,
                &field.name,
                format!("related entity '{}' is not registered", related),
            ));
        }
        Ok(())
    }
}
