use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

pub const ITEMS_TABLE: &str = "items";

/// V 0
const ITEMS_TABLE_V_0: Table = Table {
    name: ITEMS_TABLE,
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true
        ),
        sqlite_column!("type", &SqlType::Text, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist_or_producer", &SqlType::Text, non_null = true),
        sqlite_column!("cover_image_url", &SqlType::Text, non_null = true),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("imported_at", &SqlType::Text, non_null = true),
        sqlite_column!(
            "notes",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
    ],
    indices: &[
        ("idx_items_type", "type"),
        ("idx_items_title", "title"),
        ("idx_items_artist_or_producer", "artist_or_producer"),
        ("idx_items_year", "year"),
        ("idx_items_imported_at", "imported_at"),
    ],
};

pub const COLLECTION_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[ITEMS_TABLE_V_0],
    migration: None,
}];
