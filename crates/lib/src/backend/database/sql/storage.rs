//! Row-level reads and writes for the SQL backend.

use serde_json::Value;

use super::{SqlxBackend, SqlxResultExt};
use crate::Result;
use crate::backend::errors::BackendError;
use crate::normalize::{parse_position, parse_rooms};
use crate::record::{Element, ElementPatch, ElementSyncInput, Item};

/// Upper bound on bound parameters per `IN (...)` lookup.
const LOOKUP_CHUNK: usize = 500;

const ITEM_COLUMNS: &str =
    "id, name, description, url, date_added, rooms_json, position_json, created_at, updated_at";

const ELEMENT_COLUMNS: &str = "guid, revit_id, name, element_type, material, year_added, \
     software_originator, comment, created_at, updated_at";

type ItemRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
);

type ElementRow = (
    String,
    i64,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
);

fn item_from_row(row: ItemRow) -> Item {
    let (id, name, description, url, date_added, rooms, position, created_at, updated_at) = row;
    Item {
        id,
        name,
        description,
        url,
        date_added,
        rooms: parse_rooms(&Value::String(rooms)),
        position: parse_position(&Value::String(position)),
        created_at,
        updated_at,
    }
}

fn element_from_row(row: ElementRow) -> Element {
    let (
        guid,
        revit_id,
        name,
        element_type,
        material,
        year_added,
        software_originator,
        comment,
        created_at,
        updated_at,
    ) = row;
    Element {
        guid,
        revit_id,
        name,
        element_type,
        material,
        year_added,
        software_originator,
        comment,
        created_at,
        updated_at,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| BackendError::SerializationFailed { source: e }.into())
}

pub async fn list_items(backend: &SqlxBackend) -> Result<Vec<Item>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY seq ASC");
    let rows: Vec<ItemRow> = sqlx::query_as(&sql)
        .fetch_all(backend.pool())
        .await
        .sql_context("Failed to list items")?;
    Ok(rows.into_iter().map(item_from_row).collect())
}

pub async fn get_item(backend: &SqlxBackend, id: &str) -> Result<Option<Item>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1");
    let row: Option<ItemRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(backend.pool())
        .await
        .sql_context("Failed to get item")?;
    Ok(row.map(item_from_row))
}

/// Inserts or updates an item. `created_at` is only set on insert, and the
/// database assigns `seq`.
pub async fn put_item(backend: &SqlxBackend, item: Item) -> Result<()> {
    let rooms = to_json(&item.rooms)?;
    let position = to_json(&item.position)?;

    sqlx::query(
        "INSERT INTO items (id, name, description, url, date_added, rooms_json, \
             position_json, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            url = EXCLUDED.url,
            date_added = EXCLUDED.date_added,
            rooms_json = EXCLUDED.rooms_json,
            position_json = EXCLUDED.position_json,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(&item.id)
    .bind(&item.name)
    .bind(&item.description)
    .bind(&item.url)
    .bind(&item.date_added)
    .bind(rooms)
    .bind(position)
    .bind(&item.created_at)
    .bind(item.updated_at.clone())
    .execute(backend.pool())
    .await
    .sql_context("Failed to store item")?;
    Ok(())
}

pub async fn remove_item(backend: &SqlxBackend, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM items WHERE id = $1")
        .bind(id)
        .execute(backend.pool())
        .await
        .sql_context("Failed to remove item")?;
    Ok(result.rows_affected() > 0)
}

pub async fn clear_items(backend: &SqlxBackend) -> Result<usize> {
    let result = sqlx::query("DELETE FROM items")
        .execute(backend.pool())
        .await
        .sql_context("Failed to clear items")?;
    Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
}

pub async fn list_elements(backend: &SqlxBackend) -> Result<Vec<Element>> {
    let sql = format!("SELECT {ELEMENT_COLUMNS} FROM elements ORDER BY seq ASC");
    let rows: Vec<ElementRow> = sqlx::query_as(&sql)
        .fetch_all(backend.pool())
        .await
        .sql_context("Failed to list elements")?;
    Ok(rows.into_iter().map(element_from_row).collect())
}

pub async fn get_elements(backend: &SqlxBackend, guids: &[String]) -> Result<Vec<Element>> {
    let mut found = Vec::new();
    for chunk in guids.chunks(LOOKUP_CHUNK) {
        let placeholders: Vec<String> = (1..=chunk.len()).map(|i| format!("${i}")).collect();
        let sql = format!(
            "SELECT {ELEMENT_COLUMNS} FROM elements WHERE guid IN ({}) ORDER BY seq ASC",
            placeholders.join(", ")
        );
        let mut query = sqlx::query_as::<_, ElementRow>(&sql);
        for guid in chunk {
            query = query.bind(guid);
        }
        let rows = query
            .fetch_all(backend.pool())
            .await
            .sql_context("Failed to look up elements")?;
        found.extend(rows.into_iter().map(element_from_row));
    }
    Ok(found)
}

/// Merge of one sync input into the stored row, evaluated by the database.
///
/// The conflict branch reads only the row being updated, so the statement
/// is the whole read-modify-write for its guid. `year_added` and `comment`
/// are left alone; a stored non-empty `software_originator` wins; a zero
/// `revit_id` keeps the stored id; `updated_at` moves only when one of the
/// merged sync fields differs from the stored value.
const SYNC_ELEMENT: &str = "INSERT INTO elements (guid, revit_id, name, element_type, material, \
         software_originator, created_at)
     VALUES ($1, $2, $3, $4, $5, $6, $7)
     ON CONFLICT (guid) DO UPDATE SET
        revit_id = CASE WHEN EXCLUDED.revit_id <> 0
            THEN EXCLUDED.revit_id ELSE elements.revit_id END,
        name = EXCLUDED.name,
        element_type = EXCLUDED.element_type,
        material = EXCLUDED.material,
        software_originator = COALESCE(
            NULLIF(elements.software_originator, ''), EXCLUDED.software_originator),
        updated_at = CASE
            WHEN (EXCLUDED.revit_id <> 0 AND EXCLUDED.revit_id <> elements.revit_id)
              OR EXCLUDED.name <> elements.name
              OR EXCLUDED.element_type <> elements.element_type
              OR EXCLUDED.material <> elements.material
              OR (elements.software_originator = '' AND EXCLUDED.software_originator <> '')
            THEN $8 ELSE elements.updated_at END
     RETURNING ";

/// Applies each input with its own upsert statement, in order.
///
/// There is no surrounding transaction: a failure part way leaves the
/// earlier inputs applied, each of them complete.
pub async fn sync_elements(
    backend: &SqlxBackend,
    inputs: &[ElementSyncInput],
    now: &str,
) -> Result<Vec<Element>> {
    if inputs.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!("{SYNC_ELEMENT}{ELEMENT_COLUMNS}");
    let mut conn = backend
        .pool()
        .acquire()
        .await
        .sql_context("Failed to acquire connection")?;

    let mut touched = Vec::with_capacity(inputs.len());
    for input in inputs {
        let row: ElementRow = sqlx::query_as(&sql)
            .bind(&input.guid)
            .bind(input.revit_id)
            .bind(&input.name)
            .bind(&input.element_type)
            .bind(&input.material)
            .bind(&input.software_originator)
            .bind(now)
            .bind(now)
            .fetch_one(&mut *conn)
            .await
            .sql_context("Failed to sync element")?;
        touched.push(element_from_row(row));
    }
    tracing::debug!(count = touched.len(), "synced element rows");
    Ok(touched)
}

/// Overwrites the supplied editor fields in place. Absent fields keep the
/// stored value through `COALESCE` on a NULL parameter.
pub async fn annotate_element(
    backend: &SqlxBackend,
    guid: &str,
    patch: &ElementPatch,
    now: &str,
) -> Result<Option<Element>> {
    let sql = format!(
        "UPDATE elements SET
            year_added = COALESCE($2, year_added),
            software_originator = COALESCE($3, software_originator),
            comment = COALESCE($4, comment),
            updated_at = $5
         WHERE guid = $1
         RETURNING {ELEMENT_COLUMNS}"
    );
    let row: Option<ElementRow> = sqlx::query_as(&sql)
        .bind(guid)
        .bind(patch.year_added.clone())
        .bind(patch.software_originator.clone())
        .bind(patch.comment.clone())
        .bind(now)
        .fetch_optional(backend.pool())
        .await
        .sql_context("Failed to annotate element")?;
    Ok(row.map(element_from_row))
}
