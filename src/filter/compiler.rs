//! Filter compiler
//!
//! Validates a raw filter against an entity schema and coerces every value
//! into the field's declared type. Fields are independent of each other, so
//! processing order never changes the result.

use std::collections::HashMap;

use bson::Bson;

use crate::coercion::coerce;
use crate::observability::Event;
use crate::schema::{FieldType, SchemaRegistry, INTERNAL_ID_FIELD, OUTPUT_ID_FIELD};

use super::ast::{ComparisonOp, RawFilter, TypedFilter};
use super::errors::{FilterError, FilterResult};

const PATH_SEPARATOR: char = '.';

/// Compiles raw filters against a schema registry
pub struct FilterCompiler<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Compiles `raw` for `entity`.
    ///
    /// The identifier may be filtered as `id` or `_id` unless the entity
    /// declares a field of that name; either way it targets `_id`.
    pub fn compile(&self, entity: &str, raw: &RawFilter) -> FilterResult<TypedFilter> {
        let result = self.compile_fields(entity, raw);
        match &result {
            Ok(filter) => tracing::debug!(
                event = %Event::FilterCompiled,
                entity,
                fields = filter.len(),
            ),
            Err(e) => tracing::warn!(
                event = %Event::FilterRejected,
                entity,
                code = e.code(),
                field = e.field().unwrap_or(""),
            ),
        }
        result
    }

    fn compile_fields(&self, entity: &str, raw: &RawFilter) -> FilterResult<TypedFilter> {
        let schema = self.registry.get(entity)?;
        let mut typed = TypedFilter::new();
        // target field -> raw name that claimed it
        let mut claimed: HashMap<&str, &str> = HashMap::new();

        for (field, conditions) in raw {
            if field.contains(PATH_SEPARATOR) {
                return Err(FilterError::DottedFieldNotSupported(field.clone()));
            }

            let (target, field_type) = match schema.field(field) {
                Some(def) => (field.as_str(), &def.field_type),
                None if field == OUTPUT_ID_FIELD || field == INTERNAL_ID_FIELD => {
                    (INTERNAL_ID_FIELD, &FieldType::Identifier)
                }
                None => {
                    return Err(FilterError::UnknownField {
                        entity: entity.to_string(),
                        field: field.clone(),
                    })
                }
            };

            if let Some(other) = claimed.insert(target, field.as_str()) {
                return Err(FilterError::ConflictingAlias {
                    field: field.clone(),
                    other: other.to_string(),
                    target: target.to_string(),
                });
            }

            for (operator, value) in conditions {
                let op = ComparisonOp::parse(operator).ok_or_else(|| {
                    FilterError::UnsupportedOperator {
                        field: field.clone(),
                        operator: operator.clone(),
                    }
                })?;
                let native = coerce_condition(field, field_type, op, value)?;
                typed.insert(target, op, native);
            }
        }

        Ok(typed)
    }
}

fn coerce_condition(
    field: &str,
    field_type: &FieldType,
    op: ComparisonOp,
    value: &str,
) -> FilterResult<Bson> {
    if op.is_pattern() && !matches!(field_type, FieldType::String | FieldType::Enum { .. }) {
        return Err(FilterError::OperatorTypeMismatch {
            field: field.to_string(),
            operator: op.as_str(),
            type_name: field_type.type_name(),
        });
    }

    // Patterns are passed to the store as-is; enum patterns must still be members.
    coerce(field_type, value).map_err(|source| FilterError::Coercion {
        field: field.to_string(),
        source,
    })
}
