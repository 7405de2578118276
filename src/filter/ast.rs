//! Filter structures
//!
//! A raw filter arrives as `field -> operator -> string`; the compiler
//! turns it into a typed filter holding native values.

use std::collections::BTreeMap;

use bson::{Bson, Document};

/// Supported comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComparisonOp {
    /// `$eq`
    Eq,
    /// `$ne`
    Ne,
    /// `$lt`
    Lt,
    /// `$lte`
    Lte,
    /// `$gt`
    Gt,
    /// `$gte`
    Gte,
    /// `$regex`
    Regex,
}

impl ComparisonOp {
    pub const ALL: [ComparisonOp; 7] = [
        ComparisonOp::Eq,
        ComparisonOp::Ne,
        ComparisonOp::Lt,
        ComparisonOp::Lte,
        ComparisonOp::Gt,
        ComparisonOp::Gte,
        ComparisonOp::Regex,
    ];

    /// Wire operator, including the `$`
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "$eq",
            ComparisonOp::Ne => "$ne",
            ComparisonOp::Lt => "$lt",
            ComparisonOp::Lte => "$lte",
            ComparisonOp::Gt => "$gt",
            ComparisonOp::Gte => "$gte",
            ComparisonOp::Regex => "$regex",
        }
    }

    /// Parses a wire operator
    pub fn parse(operator: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == operator)
    }

    /// True for the pattern-match operator
    pub fn is_pattern(&self) -> bool {
        matches!(self, ComparisonOp::Regex)
    }
}

/// Untyped filter: field -> operator -> raw string value
pub type RawFilter = BTreeMap<String, BTreeMap<String, String>>;

/// Filter with native-typed values, keyed by top-level field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedFilter {
    conditions: BTreeMap<String, BTreeMap<ComparisonOp, Bson>>,
}

impl TypedFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one `field op value` condition
    pub fn insert(&mut self, field: impl Into<String>, op: ComparisonOp, value: Bson) {
        self.conditions
            .entry(field.into())
            .or_default()
            .insert(op, value);
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Match document: `{field: {$op: value, ...}, ...}`
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        for (field, ops) in &self.conditions {
            let condition: Document = ops
                .iter()
                .map(|(op, value)| (op.as_str().to_string(), value.clone()))
                .collect();
            document.insert(field.as_str(), condition);
        }
        document
    }
}

impl From<TypedFilter> for Document {
    fn from(filter: TypedFilter) -> Self {
        filter.to_document()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_parse_accepts_only_wire_operators() {
        for op in ComparisonOp::ALL {
            assert_eq!(ComparisonOp::parse(op.as_str()), Some(op));
        }
        assert_eq!(ComparisonOp::parse("$in"), None);
        assert_eq!(ComparisonOp::parse("eq"), None);
    }

    #[test]
    fn test_to_document_is_sorted() {
        let mut filter = TypedFilter::new();
        filter.insert("total", ComparisonOp::Lt, Bson::Int64(100));
        filter.insert("total", ComparisonOp::Gte, Bson::Int64(10));
        filter.insert("status", ComparisonOp::Eq, Bson::String("paid".into()));

        assert_eq!(
            filter.to_document(),
            doc! {
                "status": { "$eq": "paid" },
                "total": { "$lt": 100_i64, "$gte": 10_i64 },
            }
        );
    }
}
