//! Parsing and validation of the structured item fields.
//!
//! Items carry two structured fields, `position` (`{x, y, z}`) and `rooms`
//! (a list of room names). Both arrive either as native JSON values or as
//! JSON-encoded strings (SQL rows store them as text).
//!
//! There are two flavours of every function:
//!
//! * `parse_*` is used on read paths. It never fails and falls back to a
//!   neutral value (`{0, 0, 0}` / `[]`) for anything it cannot make sense of.
//! * `normalize_*_input` is used on write paths. It distinguishes "not
//!   supplied" (`Ok(None)`) from "supplied but invalid" (`Err`), so callers
//!   can leave the stored value untouched or reject the request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A point in the viewer's model space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Fallback used when stored data cannot be read.
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

/// Client input that failed boundary validation.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was absent or empty.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// `position` was not an object with finite numeric `x`, `y` and `z`.
    #[error("Position must include numeric x, y, z")]
    InvalidPosition,

    /// `rooms` was not an array of strings.
    #[error("Rooms must be an array of strings")]
    InvalidRooms,

    /// Login without an email or a password.
    #[error("Email and password are required")]
    MissingCredentials,

    /// A sync body without an `elements` array.
    #[error("Elements array required")]
    MissingElements,

    /// The request body could not be decoded.
    #[error("Invalid payload: {reason}")]
    InvalidPayload { reason: String },
}

/// Reads a position from stored data, falling back to [`Position::ORIGIN`].
pub fn parse_position(value: &Value) -> Position {
    let decoded;
    let value = match value {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => {
                decoded = parsed;
                &decoded
            }
            Err(_) => return Position::ORIGIN,
        },
        other => other,
    };
    coordinates(value).unwrap_or(Position::ORIGIN)
}

/// Reads a room list from stored data, falling back to an empty list.
pub fn parse_rooms(value: &Value) -> Vec<String> {
    match value {
        Value::Array(entries) => clean_rooms(entries),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(entries)) => clean_rooms(&entries),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Strict validation of a client-supplied position.
///
/// `None` means the field was not supplied and is passed through as
/// `Ok(None)`. Anything other than an object with finite numeric
/// coordinates is rejected; JSON-encoded strings are not accepted here.
pub fn normalize_position_input(
    value: Option<&Value>,
) -> Result<Option<Position>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };
    coordinates(value)
        .map(Some)
        .ok_or(ValidationError::InvalidPosition)
}

/// Strict validation of a client-supplied room list.
///
/// `None` is passed through as `Ok(None)`. The value must be an array whose
/// entries are all strings; the result is trimmed with empty names dropped.
pub fn normalize_rooms_input(
    value: Option<&Value>,
) -> Result<Option<Vec<String>>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value {
        Value::Array(entries) if entries.iter().all(Value::is_string) => {
            Ok(Some(clean_rooms(entries)))
        }
        _ => Err(ValidationError::InvalidRooms),
    }
}

fn coordinates(value: &Value) -> Option<Position> {
    let object = value.as_object()?;
    let coord = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    };
    Some(Position {
        x: coord("x")?,
        y: coord("y")?,
        z: coord("z")?,
    })
}

fn clean_rooms(entries: &[Value]) -> Vec<String> {
    entries
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|room| !room.is_empty())
        .map(str::to_string)
        .collect()
}
