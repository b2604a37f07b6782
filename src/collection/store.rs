use super::schema::COLLECTION_VERSIONED_SCHEMAS;
use crate::catalog::{iso_timestamp, CollectionItem, MediaType, Year};
use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, ErrorCode, OptionalExtension, Row, ToSql};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};

pub(crate) const CHANGE_CHANNEL_CAPACITY: usize = 256;

const ITEM_COLUMNS: &str =
    "id, type, title, artist_or_producer, cover_image_url, year, imported_at, notes";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("An item with id {id} is already in the collection")]
    ConstraintViolation { id: String },

    #[error("Collection database error: {0}")]
    Database(#[from] rusqlite::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Updated,
}

/// Published on the store's change channel once a mutation has been written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionChange {
    pub kind: ChangeKind,
    pub media_type: MediaType,
    pub id: String,
}

/// Equality lookup on one of the secondary indexes of the items table.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexKey {
    Type(MediaType),
    Title(String),
    ArtistOrProducer(String),
    Year(Year),
    ImportedAt(DateTime<Utc>),
}

pub trait CollectionStore: Send + Sync {
    /// Inserts a new item.
    /// Returns ConstraintViolation, leaving the collection untouched, if the
    /// id is already present.
    fn add(&self, item: &CollectionItem) -> Result<(), StoreError>;

    /// Removes the item with the given id.
    /// Returns Ok(false) if there was nothing to remove.
    fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Returns Ok(None) if no item has the given id.
    fn get(&self, id: &str) -> Result<Option<CollectionItem>, StoreError>;

    /// Returns the first item whose title matches exactly.
    fn find_by_title(&self, title: &str) -> Result<Option<CollectionItem>, StoreError>;

    fn query_by_type(&self, media_type: MediaType) -> Result<Vec<CollectionItem>, StoreError>;

    fn query_index(&self, key: &IndexKey) -> Result<Vec<CollectionItem>, StoreError>;

    fn all(&self) -> Result<Vec<CollectionItem>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;

    /// Replaces the notes of an item.
    /// Returns Ok(false) if the item does not exist.
    fn set_notes(&self, id: &str, notes: &str) -> Result<bool, StoreError>;

    fn subscribe(&self) -> broadcast::Receiver<CollectionChange>;
}

#[derive(Clone)]
pub struct SqliteCollectionStore {
    conn: Arc<Mutex<Connection>>,
    change_tx: broadcast::Sender<CollectionChange>,
}

impl SqliteCollectionStore {
    /// Opens the collection database at `db_path`, creating it if needed and
    /// migrating older schema versions.
    pub fn new<P: AsRef<Path>>(db_path: P) -> anyhow::Result<Self> {
        let db_path = db_path.as_ref();
        let conn =
            crate::sqlite_persistence::open_versioned(db_path, COLLECTION_VERSIONED_SCHEMAS)?;
        info!("Opened collection database {:?}", db_path);
        Ok(Self::from_connection(conn))
    }

    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = crate::sqlite_persistence::open_in_memory(COLLECTION_VERSIONED_SCHEMAS)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            conn: Arc::new(Mutex::new(conn)),
            change_tx,
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // Every statement is atomic on its own, so a poisoned lock still
        // guards a consistent database.
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, kind: ChangeKind, media_type: MediaType, id: &str) {
        let change = CollectionChange {
            kind,
            media_type,
            id: id.to_string(),
        };
        if self.change_tx.send(change).is_err() {
            debug!("No subscribers for collection change on {}", id);
        }
    }

    fn query_items(
        &self,
        where_clause: &str,
        params: &[&dyn ToSql],
    ) -> Result<Vec<CollectionItem>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM items {} ORDER BY rowid",
            ITEM_COLUMNS, where_clause
        ))?;
        let items = stmt
            .query_map(params, item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn query_first(
        &self,
        where_clause: &str,
        params: &[&dyn ToSql],
    ) -> Result<Option<CollectionItem>, StoreError> {
        let conn = self.conn();
        let item = conn
            .query_row(
                &format!(
                    "SELECT {} FROM items {} ORDER BY rowid LIMIT 1",
                    ITEM_COLUMNS, where_clause
                ),
                params,
                item_from_row,
            )
            .optional()?;
        Ok(item)
    }
}

fn item_from_row(row: &Row) -> rusqlite::Result<CollectionItem> {
    let media_type = row
        .get::<_, String>(1)?
        .parse::<MediaType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, e.into()))?;
    let imported_at = iso_timestamp::parse(&row.get::<_, String>(6)?)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

    Ok(CollectionItem {
        id: row.get(0)?,
        media_type,
        title: row.get(2)?,
        artist_or_producer: row.get(3)?,
        cover_image_url: row.get(4)?,
        year: Year::from(row.get::<_, Option<i32>>(5)?),
        imported_at,
        notes: row.get(7)?,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl CollectionStore for SqliteCollectionStore {
    fn add(&self, item: &CollectionItem) -> Result<(), StoreError> {
        {
            let conn = self.conn();
            conn.execute(
                &format!(
                    "INSERT INTO items ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    ITEM_COLUMNS
                ),
                params![
                    item.id,
                    item.media_type.as_str(),
                    item.title,
                    item.artist_or_producer,
                    item.cover_image_url,
                    item.year.value(),
                    iso_timestamp::format(&item.imported_at),
                    item.notes,
                ],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    StoreError::ConstraintViolation {
                        id: item.id.clone(),
                    }
                } else {
                    StoreError::Database(e)
                }
            })?;
        }
        debug!("Added {} {} ({})", item.media_type, item.id, item.title);
        self.publish(ChangeKind::Added, item.media_type, &item.id);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let removed_type = self
            .conn()
            .query_row(
                "DELETE FROM items WHERE id = ?1 RETURNING type",
                params![id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        let Some(media_type) = removed_type else {
            return Ok(false);
        };
        let media_type = media_type
            .parse::<MediaType>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, e.into()))?;
        debug!("Removed {} {}", media_type, id);
        self.publish(ChangeKind::Removed, media_type, id);
        Ok(true)
    }

    fn get(&self, id: &str) -> Result<Option<CollectionItem>, StoreError> {
        self.query_first("WHERE id = ?1", &[&id])
    }

    fn find_by_title(&self, title: &str) -> Result<Option<CollectionItem>, StoreError> {
        self.query_first("WHERE title = ?1", &[&title])
    }

    fn query_by_type(&self, media_type: MediaType) -> Result<Vec<CollectionItem>, StoreError> {
        self.query_index(&IndexKey::Type(media_type))
    }

    fn query_index(&self, key: &IndexKey) -> Result<Vec<CollectionItem>, StoreError> {
        match key {
            IndexKey::Type(media_type) => {
                self.query_items("WHERE type = ?1", &[&media_type.as_str()])
            }
            IndexKey::Title(title) => self.query_items("WHERE title = ?1", &[title]),
            IndexKey::ArtistOrProducer(artist) => {
                self.query_items("WHERE artist_or_producer = ?1", &[artist])
            }
            IndexKey::Year(Year::Known(year)) => self.query_items("WHERE year = ?1", &[year]),
            IndexKey::Year(Year::Unavailable) => self.query_items("WHERE year IS NULL", &[]),
            IndexKey::ImportedAt(imported_at) => self.query_items(
                "WHERE imported_at = ?1",
                &[&iso_timestamp::format(imported_at)],
            ),
        }
    }

    fn all(&self) -> Result<Vec<CollectionItem>, StoreError> {
        self.query_items("", &[])
    }

    fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn set_notes(&self, id: &str, notes: &str) -> Result<bool, StoreError> {
        let updated_type = self
            .conn()
            .query_row(
                "UPDATE items SET notes = ?1 WHERE id = ?2 RETURNING type",
                params![notes, id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        let Some(media_type) = updated_type else {
            return Ok(false);
        };
        let media_type = media_type
            .parse::<MediaType>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, e.into()))?;
        debug!("Updated notes of {} {}", media_type, id);
        self.publish(ChangeKind::Updated, media_type, id);
        Ok(true)
    }

    fn subscribe(&self) -> broadcast::Receiver<CollectionChange> {
        self.change_tx.subscribe()
    }
}
