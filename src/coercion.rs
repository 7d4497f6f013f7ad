//! Typed assignment of raw text onto record attributes.
//!
//! An update keeps the type of an attribute the record (or its class)
//! already has. A brand new attribute gets the type its literal looks like.
//! Whatever happens to the value, reaching the assignment step refreshes the
//! record's `updated_at` and saves the whole store.

use thiserror::Error;
use tracing::{debug, info};

use crate::construct::{Database, Record, RecordKey};
use crate::datatype::{Value, ValueType};
use crate::error::{Diagnostic, HbnbError};
use crate::parser::Token;

/// What became of the value handed to [`apply_update`].
#[derive(Debug, Clone, PartialEq)]
pub enum Coercion {
    /// The attribute now holds this value.
    Applied(Value),
    /// The text is not a valid literal of the attribute's existing type; the
    /// attribute is unchanged.
    Skipped { expected: ValueType },
    /// The attribute is part of the record's identity and cannot be set.
    Protected,
}

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("{0}")]
    Rejected(Diagnostic),
    #[error(transparent)]
    Persistence(#[from] HbnbError),
}

impl From<Diagnostic> for UpdateError {
    fn from(diagnostic: Diagnostic) -> Self {
        UpdateError::Rejected(diagnostic)
    }
}

/// Computes the value `raw` should be stored as on `record.attribute`. Fails
/// with the expected type when the text does not fit the existing one.
pub fn coerce(record: &Record, attribute: &str, raw: &str, quoted: bool) -> Result<Value, ValueType> {
    match record.attribute_type(attribute) {
        Some(expected) => expected.construct(raw).ok_or(expected),
        None => Ok(Value::infer(raw, quoted)),
    }
}

/// Sets one attribute from its raw text and persists the store.
pub fn apply_update(
    database: &mut Database,
    key: &RecordKey,
    attribute: Option<&Token>,
    value: Option<&Token>,
) -> Result<Coercion, UpdateError> {
    let record = database.get_mut(key).ok_or(Diagnostic::NoInstanceFound)?;
    let attribute = match attribute.map(Token::unquoted) {
        Some((name, _)) if !name.is_empty() => name,
        _ => return Err(Diagnostic::AttributeNameMissing.into()),
    };
    let (raw, quoted) = match value.map(Token::unquoted) {
        Some((raw, quoted)) if !raw.is_empty() => (raw, quoted),
        _ => return Err(Diagnostic::ValueMissing.into()),
    };
    let outcome = if Record::is_protected(attribute) {
        Coercion::Protected
    } else {
        match coerce(record, attribute, raw, quoted) {
            Ok(value) => {
                record.set(attribute, value.clone());
                Coercion::Applied(value)
            }
            Err(expected) => Coercion::Skipped { expected },
        }
    };
    match &outcome {
        Coercion::Applied(value) => {
            info!(key = %key, attribute, value_type = %value.value_type(), "updated attribute")
        }
        Coercion::Skipped { expected } => {
            debug!(key = %key, attribute, raw, %expected, "value does not fit the attribute type")
        }
        Coercion::Protected => debug!(key = %key, attribute, "protected attribute left alone"),
    }
    database.save_record(key)?;
    Ok(outcome)
}

/// Sets every pair of a mapping verbatim, without coercion, then persists
/// the store once. Returns how many attributes were assigned.
pub fn apply_mapping(
    database: &mut Database,
    key: &RecordKey,
    mapping: &serde_json::Map<String, serde_json::Value>,
) -> Result<usize, UpdateError> {
    let record = database.get_mut(key).ok_or(Diagnostic::NoInstanceFound)?;
    let mut assigned = 0;
    for (attribute, json) in mapping {
        if record.set(attribute, Value::from(json.clone())) {
            assigned += 1;
        } else {
            debug!(key = %key, attribute = %attribute, "protected attribute left alone");
        }
    }
    database.save_record(key)?;
    info!(key = %key, assigned, "updated attributes from mapping");
    Ok(assigned)
}
