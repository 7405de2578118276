//! Type Coercion subsystem
//!
//! Converts a loosely-typed string (typically from a query string) into the
//! store-native value implied by a field's declared type.
//!
//! | declared type | accepted input                           | native value |
//! |---------------|------------------------------------------|--------------|
//! | integer       | decimal i64, surrounding space allowed   | Int64        |
//! | float         | f64 literal                              | Double       |
//! | boolean       | `true`/`1`/`yes` (any case), else false  | Boolean      |
//! | string        | anything, unchanged                      | String       |
//! | enum          | exact member                             | String       |
//! | identifier    | 24 hex characters                        | ObjectId     |
//! | timestamp     | ISO-8601 date or date-time, naive is UTC | DateTime     |
//!
//! Entity, list and object types have no string form and are rejected with
//! `UnsupportedFieldType`. Coercion is pure: it either produces a complete
//! value or an error.

mod errors;

pub use errors::{CoercionError, CoercionResult};

use bson::oid::ObjectId;
use bson::Bson;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::schema::FieldType;

const TRUE_LITERALS: [&str; 3] = ["true", "1", "yes"];

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Coerces `raw` into the native value for `field_type`.
pub fn coerce(field_type: &FieldType, raw: &str) -> CoercionResult<Bson> {
    match field_type {
        FieldType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Bson::Int64)
            .map_err(|_| CoercionError::InvalidInteger { value: raw.into() }),
        FieldType::Float => raw
            .trim()
            .parse::<f64>()
            .map(Bson::Double)
            .map_err(|_| CoercionError::InvalidFloat { value: raw.into() }),
        FieldType::Boolean => Ok(Bson::Boolean(parse_bool(raw))),
        FieldType::String => Ok(Bson::String(raw.to_string())),
        FieldType::Enum { members } => {
            if members.iter().any(|m| m == raw) {
                Ok(Bson::String(raw.to_string()))
            } else {
                Err(CoercionError::InvalidEnumValue {
                    value: raw.into(),
                    allowed: members.clone(),
                })
            }
        }
        FieldType::Identifier => ObjectId::parse_str(raw)
            .map(Bson::ObjectId)
            .map_err(|_| CoercionError::InvalidIdentifier { value: raw.into() }),
        FieldType::Timestamp => parse_timestamp(raw)
            .map(Bson::DateTime)
            .ok_or_else(|| CoercionError::InvalidTimestamp { value: raw.into() }),
        FieldType::Entity { .. } | FieldType::List { .. } | FieldType::Object => {
            Err(CoercionError::UnsupportedFieldType {
                type_name: field_type.type_name(),
            })
        }
    }
}

fn parse_bool(raw: &str) -> bool {
    let lowered = raw.to_lowercase();
    TRUE_LITERALS.contains(&lowered.as_str())
}

/// Parses an ISO-8601-like timestamp. Inputs without an offset are UTC.
pub fn parse_timestamp(raw: &str) -> Option<bson::DateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(bson::DateTime::from_millis(dt.timestamp_millis()));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(bson::DateTime::from_millis(dt.timestamp_millis()));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(bson::DateTime::from_millis(naive.and_utc().timestamp_millis()));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| bson::DateTime::from_millis(naive.and_utc().timestamp_millis()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer() {
        assert_eq!(coerce(&FieldType::Integer, "42").unwrap(), Bson::Int64(42));
        assert_eq!(coerce(&FieldType::Integer, " -7 ").unwrap(), Bson::Int64(-7));
        assert_eq!(
            coerce(&FieldType::Integer, "4.2").unwrap_err().code(),
            "DOCPIPE_COERCE_INVALID_INTEGER"
        );
    }

    #[test]
    fn test_float() {
        assert_eq!(coerce(&FieldType::Float, "2.5").unwrap(), Bson::Double(2.5));
        assert_eq!(coerce(&FieldType::Float, "3").unwrap(), Bson::Double(3.0));
        assert!(coerce(&FieldType::Float, "abc").is_err());
    }

    #[test]
    fn test_boolean() {
        assert_eq!(coerce(&FieldType::Boolean, "Yes").unwrap(), Bson::Boolean(true));
        assert_eq!(coerce(&FieldType::Boolean, "TRUE").unwrap(), Bson::Boolean(true));
        assert_eq!(coerce(&FieldType::Boolean, "1").unwrap(), Bson::Boolean(true));
        assert_eq!(coerce(&FieldType::Boolean, "nope").unwrap(), Bson::Boolean(false));
        assert_eq!(coerce(&FieldType::Boolean, "").unwrap(), Bson::Boolean(false));
    }

    #[test]
    fn test_string_passthrough() {
        assert_eq!(
            coerce(&FieldType::String, " keep me ").unwrap(),
            Bson::String(" keep me ".into())
        );
    }

    #[test]
    fn test_enum_membership() {
        let status = FieldType::enumeration(["paid", "open"]);
        assert_eq!(coerce(&status, "paid").unwrap(), Bson::String("paid".into()));

        let err = coerce(&status, "not-a-member").unwrap_err();
        assert_eq!(err.code(), "DOCPIPE_COERCE_INVALID_ENUM_VALUE");
        assert_eq!(err.raw_value(), Some("not-a-member"));
        assert!(err.to_string().contains("paid, open"));
    }

    #[test]
    fn test_identifier() {
        let hex = "65a1b2c3d4e5f60718293a4b";
        assert_eq!(
            coerce(&FieldType::Identifier, hex).unwrap(),
            Bson::ObjectId(ObjectId::parse_str(hex).unwrap())
        );
        assert_eq!(
            coerce(&FieldType::Identifier, "xyz").unwrap_err().code(),
            "DOCPIPE_COERCE_INVALID_IDENTIFIER"
        );
    }

    #[test]
    fn test_timestamp_forms() {
        let expected = bson::DateTime::from_millis(1_704_067_200_000); // 2024-01-01T00:00:00Z
        assert_eq!(parse_timestamp("2024-01-01"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T00:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01 00:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T00:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T02:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T00:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-01T00:00:00.250"),
            Some(bson::DateTime::from_millis(1_704_067_200_250))
        );
    }

    #[test]
    fn test_timestamp_malformed() {
        let err = coerce(&FieldType::Timestamp, "yesterday").unwrap_err();
        assert_eq!(err.code(), "DOCPIPE_COERCE_INVALID_TIMESTAMP");
        assert!(parse_timestamp("2024-13-01").is_none());
    }

    #[test]
    fn test_unsupported_types() {
        for field_type in [
            FieldType::Object,
            FieldType::entity("Customer"),
            FieldType::list(FieldType::String),
        ] {
            let err = coerce(&field_type, "x").unwrap_err();
            assert_eq!(err.code(), "DOCPIPE_COERCE_UNSUPPORTED_FIELD_TYPE");
            assert_eq!(err.raw_value(), None);
        }
    }

    #[test]
    fn test_string_passes_through_unchanged() {
        for raw in ["^(?!draft)", "(a)\\1", "(unclosed", "  padded "] {
            assert_eq!(coerce(&FieldType::String, raw).unwrap(), Bson::String(raw.into()));
        }
    }
}
