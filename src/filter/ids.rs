//! Identifier filters

use bson::oid::ObjectId;
use bson::{doc, Document};

use crate::coercion::CoercionError;
use crate::schema::INTERNAL_ID_FIELD;

use super::errors::{FilterError, FilterResult};

/// `{_id: id}`
pub fn by_id(id: ObjectId) -> Document {
    doc! { INTERNAL_ID_FIELD: id }
}

/// `{_id: {$in: [ids...]}}`
pub fn by_ids(ids: &[ObjectId]) -> Document {
    doc! { INTERNAL_ID_FIELD: { "$in": ids.to_vec() } }
}

/// Parses hex identifiers, failing on the first malformed one
pub fn parse_ids<S: AsRef<str>>(raw: &[S]) -> FilterResult<Vec<ObjectId>> {
    raw.iter()
        .map(|value| {
            let value = value.as_ref();
            ObjectId::parse_str(value).map_err(|_| FilterError::Coercion {
                field: INTERNAL_ID_FIELD.to_string(),
                source: CoercionError::InvalidIdentifier {
                    value: value.to_string(),
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_ids() {
        let a = ObjectId::parse_str("65a1b2c3d4e5f60718293a4b").unwrap();
        let b = ObjectId::parse_str("65a1b2c3d4e5f60718293a4c").unwrap();
        assert_eq!(by_ids(&[a, b]), doc! { "_id": { "$in": [a, b] } });
        assert_eq!(by_id(a), doc! { "_id": a });
    }

    #[test]
    fn test_parse_ids_rejects_malformed() {
        let err = parse_ids(&["65a1b2c3d4e5f60718293a4b", "zzz"]).unwrap_err();
        assert_eq!(err.code(), "DOCPIPE_COERCE_INVALID_IDENTIFIER");
        assert_eq!(err.field(), Some("_id"));
    }
}
