//! Configuration validation
//!
//! Two passes with different strictness:
//! - [`basic_validation`] runs before every save and only rejects present keys of the
//!   wrong JSON type. Missing keys and out-of-range values are accepted.
//! - [`validate_config`] is the strict pass used by the settings UI: every required key
//!   must be present, and coordinates and icon size must be in range.
//!
//! Neither pass runs on load.

use crate::config::models::REQUIRED_KEYS;
use serde_json::Value;
use thiserror::Error;

/// Smallest accepted icon coordinate
pub const POSITION_MIN: i64 = -32768;
/// Largest accepted icon coordinate
pub const POSITION_MAX: i64 = 32767;
/// Smallest accepted icon size in pixels
pub const ICON_SIZE_MIN: i64 = 16;
/// Largest accepted icon size in pixels
pub const ICON_SIZE_MAX: i64 = 128;

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The document is not a JSON object
    #[error("configuration must be a JSON object")]
    NotAnObject,

    /// A required key (or `icon_position` coordinate) is absent
    #[error("missing required key '{0}'")]
    MissingKey(String),

    /// A key holds a value of the wrong JSON type
    #[error("{key} must be of type {expected}")]
    WrongType {
        /// Offending key, dotted for nested values
        key: String,
        /// Expected type name
        expected: &'static str,
    },

    /// An integer lies outside its allowed range
    #[error("{key} must be in range {min} to {max}")]
    OutOfRange {
        /// Offending key, dotted for nested values
        key: String,
        /// Inclusive lower bound
        min: i64,
        /// Inclusive upper bound
        max: i64,
    },
}

/// JSON type a required key must hold
#[derive(Debug, Clone, Copy)]
enum Expected {
    Str,
    Object,
    Bool,
    Int,
}

impl Expected {
    fn for_key(key: &str) -> Self {
        match key {
            "icon_position" => Self::Object,
            "icon_fixed" | "auto_start" => Self::Bool,
            "icon_size" => Self::Int,
            _ => Self::Str,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Object => "dict",
            Self::Bool => "bool",
            Self::Int => "int",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Str => value.is_string(),
            Self::Object => value.is_object(),
            Self::Bool => value.is_boolean(),
            Self::Int => as_integer(value).is_some(),
        }
    }
}

/// Integer view of a JSON value; booleans and floats are not integers
///
/// Values beyond the `i64` range saturate so range checks still reject them.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) if n.is_i64() => n.as_i64(),
        Value::Number(n) if n.is_u64() => Some(i64::MAX),
        _ => None,
    }
}

fn wrong_type(key: &str, expected: Expected) -> ValidationError {
    ValidationError::WrongType {
        key: key.to_string(),
        expected: expected.name(),
    }
}

/// Type check performed before a save
///
/// Rejects non-object documents and required keys present with the wrong type.
pub fn basic_validation(config: &Value) -> Result<(), Vec<ValidationError>> {
    let Some(map) = config.as_object() else {
        return Err(vec![ValidationError::NotAnObject]);
    };

    let errors: Vec<ValidationError> = REQUIRED_KEYS
        .iter()
        .filter_map(|&key| {
            let expected = Expected::for_key(key);
            match map.get(key) {
                Some(value) if !expected.matches(value) => Some(wrong_type(key, expected)),
                _ => None,
            }
        })
        .collect();

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Strict schema and range validation
///
/// Missing keys are reported on their own; type and range checks only run once
/// every required key is present.
pub fn validate_config(config: &Value) -> Result<(), Vec<ValidationError>> {
    let Some(map) = config.as_object() else {
        return Err(vec![ValidationError::NotAnObject]);
    };

    let missing: Vec<ValidationError> = REQUIRED_KEYS
        .iter()
        .filter(|key| !map.contains_key(**key))
        .map(|key| ValidationError::MissingKey((*key).to_string()))
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    let mut errors = Vec::new();

    for key in ["app_path", "version", "icon_fixed", "auto_start"] {
        let expected = Expected::for_key(key);
        if !expected.matches(&map[key]) {
            errors.push(wrong_type(key, expected));
        }
    }

    match map["icon_position"].as_object() {
        Some(position) => {
            for coord in ["x", "y"] {
                let key = format!("icon_position.{coord}");
                match position.get(coord) {
                    None => errors.push(ValidationError::MissingKey(key)),
                    Some(value) => check_range(&mut errors, key, value, POSITION_MIN, POSITION_MAX),
                }
            }
        }
        None => errors.push(wrong_type("icon_position", Expected::Object)),
    }

    check_range(
        &mut errors,
        "icon_size".to_string(),
        &map["icon_size"],
        ICON_SIZE_MIN,
        ICON_SIZE_MAX,
    );

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_range(errors: &mut Vec<ValidationError>, key: String, value: &Value, min: i64, max: i64) {
    match as_integer(value) {
        None => errors.push(ValidationError::WrongType {
            key,
            expected: Expected::Int.name(),
        }),
        Some(n) if !(min..=max).contains(&n) => {
            errors.push(ValidationError::OutOfRange { key, min, max });
        }
        Some(_) => {}
    }
}
