//! Review meta fields and the validator table every write goes through.

use crate::auth::{Actor, Capability};
use crate::models::post::PostMeta;
use crate::utils::sanitize::{absint, is_numeric, sanitize_text_field, to_number};
use serde_json::{Map, Number, Value};
use thiserror::Error;

pub const PRODUCT_FIELD: &str = "prm_product_name";
pub const RATING_FIELD: &str = "prm_rating";
pub const REVIEWER_NAME_FIELD: &str = "prm_reviewer_name";

pub const MIN_RATING: u64 = 1;
pub const MAX_RATING: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Number,
    String,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::String => "string",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FieldError {
    #[error("{0} is not a registered review field")]
    Unknown(String),
    #[error("{key} is not of type {expected}")]
    InvalidType { key: &'static str, expected: &'static str },
    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        value: String,
        min: u64,
        max: u64,
    },
    #[error("Sorry, you are not allowed to edit the {0} custom field.")]
    Forbidden(&'static str),
}

/// A pending change to one stored field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaWrite {
    Set(String),
    Delete,
}

/// One row of the validator table.
pub struct MetaField {
    pub key: &'static str,
    pub field_type: FieldType,
    pub description: &'static str,
    pub capability: Capability,
    sanitize: fn(&'static str, &str) -> Result<String, FieldError>,
}

pub static REVIEW_FIELDS: [MetaField; 3] = [
    MetaField {
        key: PRODUCT_FIELD,
        field_type: FieldType::Integer,
        description: "The ID of the product being reviewed",
        capability: Capability::EditPosts,
        sanitize: sanitize_product,
    },
    MetaField {
        key: RATING_FIELD,
        field_type: FieldType::Number,
        description: "The rating given in the review (1-5)",
        capability: Capability::EditPosts,
        sanitize: sanitize_rating,
    },
    MetaField {
        key: REVIEWER_NAME_FIELD,
        field_type: FieldType::String,
        description: "The name of the reviewer",
        capability: Capability::EditPosts,
        sanitize: sanitize_reviewer,
    },
];

pub fn review_field(key: &str) -> Option<&'static MetaField> {
    REVIEW_FIELDS.iter().find(|field| field.key == key)
}

fn sanitize_product(_key: &'static str, raw: &str) -> Result<String, FieldError> {
    Ok(absint(raw).to_string())
}

fn sanitize_rating(key: &'static str, raw: &str) -> Result<String, FieldError> {
    let rating = absint(raw);
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating.to_string())
    } else {
        Err(FieldError::OutOfRange {
            key,
            value: raw.to_string(),
            min: MIN_RATING,
            max: MAX_RATING,
        })
    }
}

fn sanitize_reviewer(_key: &'static str, raw: &str) -> Result<String, FieldError> {
    Ok(sanitize_text_field(raw))
}

impl MetaField {
    /// Authorizes, type-checks and sanitizes one incoming value. JSON `null` deletes
    /// the field.
    pub fn prepare(&self, actor: &Actor, value: &Value) -> Result<MetaWrite, FieldError> {
        if !actor.can(self.capability) {
            return Err(FieldError::Forbidden(self.key));
        }
        if value.is_null() {
            return Ok(MetaWrite::Delete);
        }
        let raw = self.coerce(value)?;
        (self.sanitize)(self.key, &raw).map(MetaWrite::Set)
    }

    fn coerce(&self, value: &Value) -> Result<String, FieldError> {
        let mismatch = || FieldError::InvalidType {
            key: self.key,
            expected: self.field_type.as_str(),
        };
        match (self.field_type, value) {
            (FieldType::String, Value::String(s)) => Ok(s.clone()),
            (FieldType::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {
                Ok(n.to_string())
            }
            (FieldType::Number, Value::Number(n)) => Ok(n.to_string()),
            (FieldType::Integer, Value::String(s)) if is_integer_string(s) => Ok(s.clone()),
            (FieldType::Number, Value::String(s)) if is_numeric(s) => Ok(s.clone()),
            _ => Err(mismatch()),
        }
    }

    /// Stored value rendered with the field's declared type. Unset fields read as null.
    pub fn read(&self, stored: Option<&str>) -> Value {
        let Some(stored) = stored else {
            return Value::Null;
        };
        match self.field_type {
            FieldType::String => Value::String(stored.to_string()),
            FieldType::Integer => Value::from(absint(stored)),
            FieldType::Number => to_number(stored)
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

fn is_integer_string(value: &str) -> bool {
    to_number(value).map(|n| n.fract() == 0.0).unwrap_or(false)
}

/// Runs every entry of `body` through the table. Any failure rejects the whole update.
pub fn prepare_meta_update(
    actor: &Actor,
    body: &Map<String, Value>,
) -> Result<Vec<(&'static str, MetaWrite)>, FieldError> {
    body.iter()
        .map(|(key, value)| {
            let field = review_field(key).ok_or_else(|| FieldError::Unknown(key.clone()))?;
            Ok((field.key, field.prepare(actor, value)?))
        })
        .collect()
}

/// All registered fields of a review, typed per the table.
pub fn read_meta(meta: &PostMeta) -> Map<String, Value> {
    REVIEW_FIELDS
        .iter()
        .map(|field| {
            let stored = meta.get(field.key).map(String::as_str);
            (field.key.to_string(), field.read(stored))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use serde_json::json;

    fn editor() -> Actor {
        Actor::with_role(Role::Editor)
    }

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn valid_update_is_sanitized() {
        let writes = prepare_meta_update(
            &editor(),
            &body(json!({
                "prm_product_name": "42",
                "prm_rating": 4,
                "prm_reviewer_name": "  <b>Ada</b>  Lovelace ",
            })),
        )
        .unwrap();

        assert!(writes.contains(&(PRODUCT_FIELD, MetaWrite::Set("42".into()))));
        assert!(writes.contains(&(RATING_FIELD, MetaWrite::Set("4".into()))));
        assert!(writes.contains(&(REVIEWER_NAME_FIELD, MetaWrite::Set("Ada Lovelace".into()))));
    }

    #[test]
    fn rating_outside_one_to_five_is_rejected() {
        for rating in [json!(0), json!(6), json!("9")] {
            let err = prepare_meta_update(&editor(), &body(json!({ "prm_rating": rating })))
                .unwrap_err();
            assert!(matches!(err, FieldError::OutOfRange { key: RATING_FIELD, .. }));
        }
        // fractional ratings are truncated like every other integer write
        let writes =
            prepare_meta_update(&editor(), &body(json!({ "prm_rating": 4.7 }))).unwrap();
        assert_eq!(writes, vec![(RATING_FIELD, MetaWrite::Set("4".into()))]);
    }

    #[test]
    fn wrong_types_and_unknown_keys_fail() {
        let err = prepare_meta_update(&editor(), &body(json!({ "prm_reviewer_name": 7 })))
            .unwrap_err();
        assert_eq!(
            err,
            FieldError::InvalidType {
                key: REVIEWER_NAME_FIELD,
                expected: "string"
            }
        );

        let err = prepare_meta_update(&editor(), &body(json!({ "prm_product_name": "abc" })))
            .unwrap_err();
        assert!(matches!(err, FieldError::InvalidType { .. }));

        let err =
            prepare_meta_update(&editor(), &body(json!({ "price": 10 }))).unwrap_err();
        assert_eq!(err, FieldError::Unknown("price".into()));
    }

    #[test]
    fn writes_require_edit_capability() {
        let err = prepare_meta_update(
            &Actor::anonymous(),
            &body(json!({ "prm_reviewer_name": "Eve" })),
        )
        .unwrap_err();
        assert_eq!(err, FieldError::Forbidden(REVIEWER_NAME_FIELD));
    }

    #[test]
    fn null_deletes_the_field() {
        let writes =
            prepare_meta_update(&editor(), &body(json!({ "prm_rating": null }))).unwrap();
        assert_eq!(writes, vec![(RATING_FIELD, MetaWrite::Delete)]);
    }

    #[test]
    fn reads_are_typed() {
        let mut meta = PostMeta::new();
        meta.insert(PRODUCT_FIELD.into(), "17".into());
        meta.insert(RATING_FIELD.into(), "4".into());

        let read = read_meta(&meta);
        assert_eq!(read[PRODUCT_FIELD], json!(17));
        assert_eq!(read[RATING_FIELD], json!(4.0));
        assert_eq!(read[REVIEWER_NAME_FIELD], Value::Null);
    }
}
