//! Element records: building-component metadata synced from the BIM model.
//!
//! Fields fall into two groups. The *sync-owned* fields (`revitId`, `name`,
//! `type`, `material`) are refreshed on every sync. The *editor-owned*
//! fields (`yearAdded`, `softwareOriginator`, `comment`) only change through
//! an explicit edit, except that sync may fill an empty
//! `softwareOriginator`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A stored element, keyed by its externally assigned `guid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub guid: String,
    #[serde(default)]
    pub revit_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub year_added: String,
    #[serde(default)]
    pub software_originator: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Element {
    fn sync_fields(&self) -> (i64, &str, &str, &str, &str) {
        (
            self.revit_id,
            &self.name,
            &self.element_type,
            &self.material,
            &self.software_originator,
        )
    }
}

/// One entry of a sync batch.
///
/// Deserialization never fails on field types: non-string text becomes an
/// empty string and a `revitId` that is not a JSON number (numeric strings
/// included) becomes 0.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSyncInput {
    #[serde(default, deserialize_with = "lenient_text")]
    pub guid: String,
    #[serde(default, deserialize_with = "lenient_revit_id")]
    pub revit_id: i64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_text")]
    pub element_type: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub material: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub software_originator: String,
}

impl ElementSyncInput {
    pub fn new(
        guid: impl Into<String>,
        revit_id: i64,
        name: impl Into<String>,
        element_type: impl Into<String>,
        material: impl Into<String>,
    ) -> Self {
        Self {
            guid: guid.into(),
            revit_id,
            name: name.into(),
            element_type: element_type.into(),
            material: material.into(),
            software_originator: String::new(),
        }
    }

    pub fn with_software_originator(mut self, originator: impl Into<String>) -> Self {
        self.software_originator = originator.into();
        self
    }

    /// Reads one batch entry. Entries that are not objects yield an input
    /// with an empty guid, which the sync drops.
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        Self::deserialize(value).unwrap_or_default()
    }

    /// Trims every text field.
    pub fn normalized(self) -> Self {
        Self {
            guid: self.guid.trim().to_string(),
            revit_id: self.revit_id,
            name: self.name.trim().to_string(),
            element_type: self.element_type.trim().to_string(),
            material: self.material.trim().to_string(),
            software_originator: self.software_originator.trim().to_string(),
        }
    }
}

/// Merges one normalized sync input into the current record for its guid.
///
/// With no current record a fresh one is created at `now`. Otherwise the
/// sync-owned fields are refreshed (`revitId` only when non-zero), a
/// non-empty stored `softwareOriginator` is kept, and `updatedAt` moves to
/// `now` only when one of those fields actually changed.
pub fn merge_sync(current: Option<&Element>, input: &ElementSyncInput, now: &str) -> Element {
    let Some(current) = current else {
        return Element {
            guid: input.guid.clone(),
            revit_id: input.revit_id,
            name: input.name.clone(),
            element_type: input.element_type.clone(),
            material: input.material.clone(),
            year_added: String::new(),
            software_originator: input.software_originator.clone(),
            comment: String::new(),
            created_at: now.to_string(),
            updated_at: None,
        };
    };

    let software_originator = if current.software_originator.is_empty() {
        input.software_originator.clone()
    } else {
        current.software_originator.clone()
    };
    let revit_id = if input.revit_id != 0 {
        input.revit_id
    } else {
        current.revit_id
    };

    let mut merged = Element {
        revit_id,
        name: input.name.clone(),
        element_type: input.element_type.clone(),
        material: input.material.clone(),
        software_originator,
        ..current.clone()
    };
    if merged.sync_fields() != current.sync_fields() {
        merged.updated_at = Some(now.to_string());
    }
    merged
}

/// Editor annotation of an element. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(default)]
    pub year_added: Option<String>,
    #[serde(default)]
    pub software_originator: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ElementPatch {
    /// Trims every supplied field.
    pub fn normalized(self) -> Self {
        let trimmed = |value: Option<String>| value.map(|v| v.trim().to_string());
        Self {
            year_added: trimmed(self.year_added),
            software_originator: trimmed(self.software_originator),
            comment: trimmed(self.comment),
        }
    }

    pub(crate) fn apply(&self, element: &mut Element) {
        if let Some(year_added) = &self.year_added {
            element.year_added.clone_from(year_added);
        }
        if let Some(originator) = &self.software_originator {
            element.software_originator.clone_from(originator);
        }
        if let Some(comment) = &self.comment {
            element.comment.clone_from(comment);
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        _ => String::new(),
    })
}

fn lenient_revit_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_revit_id(&value))
}

// Only JSON numbers count; the integral part of a fractional id is kept.
fn coerce_revit_id(value: &Value) -> i64 {
    let Value::Number(number) = value else {
        return 0;
    };
    if let Some(id) = number.as_i64() {
        return id;
    }
    number
        .as_f64()
        .filter(|v| v.is_finite())
        .map_or(0, |v| v.trunc() as i64)
}
