//! Item records: user-placed points of interest in the house model.

use rand::{Rng, distributions::Slice};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::normalize::{
    Position, ValidationError, normalize_position_input, normalize_rooms_input, parse_position,
    parse_rooms,
};

/// Length of generated item ids.
pub const ITEM_ID_LENGTH: usize = 10;

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Generates an opaque, URL-safe item id of [`ITEM_ID_LENGTH`] characters.
pub fn generate_item_id() -> String {
    // The alphabet is a non-empty constant, so the distribution always exists.
    let Ok(alphabet) = Slice::new(ID_ALPHABET) else {
        unreachable!("item id alphabet is empty");
    };
    rand::thread_rng()
        .sample_iter(alphabet)
        .take(ITEM_ID_LENGTH)
        .map(|&b| char::from(b))
        .collect()
}

/// A stored item.
///
/// `rooms` and `position` are read through the tolerant parsers, so a
/// document with legacy or hand-edited values still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub date_added: String,
    #[serde(default, deserialize_with = "tolerant_rooms")]
    pub rooms: Vec<String>,
    #[serde(default, deserialize_with = "tolerant_position")]
    pub position: Position,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A validated item ready to be added.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub date_added: Option<String>,
    pub rooms: Option<Vec<String>>,
    pub position: Position,
}

impl NewItem {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            description: None,
            url: None,
            date_added: None,
            rooms: None,
            position,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_date_added(mut self, date_added: impl Into<String>) -> Self {
        self.date_added = Some(date_added.into());
        self
    }

    pub fn with_rooms<I, S>(mut self, rooms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rooms = Some(rooms.into_iter().map(Into::into).collect());
        self
    }

    /// Builds the stored record. Omitted text fields become empty strings,
    /// an omitted date becomes `today`, omitted rooms an empty list.
    pub(crate) fn into_record(self, id: String, today: String, created_at: String) -> Item {
        Item {
            id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            date_added: self
                .date_added
                .filter(|date| !date.is_empty())
                .unwrap_or(today),
            rooms: self.rooms.unwrap_or_default(),
            position: self.position,
            created_at,
            updated_at: None,
        }
    }
}

/// A partial item update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub date_added: Option<String>,
    pub rooms: Option<Vec<String>>,
    pub position: Option<Position>,
}

impl ItemPatch {
    pub(crate) fn apply(self, item: &mut Item) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(url) = self.url {
            item.url = url;
        }
        if let Some(date_added) = self.date_added {
            item.date_added = date_added;
        }
        if let Some(rooms) = self.rooms {
            item.rooms = rooms;
        }
        if let Some(position) = self.position {
            item.position = position;
        }
    }
}

/// Item request body as sent by the viewer.
///
/// `rooms` and `position` keep the raw JSON so that an explicit `null` can
/// be told apart from an omitted field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub rooms: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub position: Option<Value>,
}

impl ItemPayload {
    /// Validates a body for `add`: name and position are required.
    pub fn into_new_item(self) -> Result<NewItem, ValidationError> {
        let name = required_name(self.name)?;
        let position = normalize_position_input(self.position.as_ref())?
            .ok_or(ValidationError::MissingField { field: "position" })?;
        let rooms = normalize_rooms_input(self.rooms.as_ref())?;
        Ok(NewItem {
            name,
            description: self.description,
            url: self.url,
            date_added: self.date_added,
            rooms,
            position,
        })
    }

    /// Validates a body for `update`: every field is optional, but supplied
    /// fields must be valid.
    pub fn into_patch(self) -> Result<ItemPatch, ValidationError> {
        let name = match self.name {
            Some(name) => Some(required_name(Some(name))?),
            None => None,
        };
        Ok(ItemPatch {
            name,
            description: self.description,
            url: self.url,
            date_added: self.date_added,
            rooms: normalize_rooms_input(self.rooms.as_ref())?,
            position: normalize_position_input(self.position.as_ref())?,
        })
    }
}

fn required_name(name: Option<String>) -> Result<String, ValidationError> {
    match name.as_deref().map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ValidationError::MissingField { field: "name" }),
    }
}

/// Wraps every present value, including `null`, in `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn tolerant_rooms<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| parse_rooms(&value))
}

fn tolerant_position<'de, D>(deserializer: D) -> Result<Position, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| parse_position(&value))
}
