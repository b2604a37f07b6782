//! JSON export and import of the whole collection.
//!
//! The export is a pretty-printed array of items. Import accepts the same
//! shape, tolerating hand-edited files: records without a usable id or
//! title are skipped, numeric ids are accepted, and anything already in the
//! collection (by id, or by exact title) is left alone.

use super::duplicates::DuplicateResolver;
use super::store::{CollectionStore, StoreError};
use crate::catalog::CollectionItem;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid import file: {0}")]
    Format(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to encode collection: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Per-record outcome counts of one import.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub added: usize,
    pub duplicates: usize,
    /// Records missing an id or a title.
    pub invalid: usize,
    /// Records that could not be read as a collection item, e.g. an unknown type.
    pub rejected: usize,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.added + self.duplicates + self.invalid + self.rejected
    }
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("entertainment_passport_{}.json", date.format("%Y-%m-%d"))
}

pub fn export(store: &dyn CollectionStore) -> Result<Vec<u8>, ExportError> {
    let items = store.all()?;
    info!("Exporting {} items", items.len());
    Ok(serde_json::to_vec_pretty(&items)?)
}

/// Truthiness as hand-written JSON tends to mean it: null, false, 0 and ""
/// are all "missing".
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Imports every record of a JSON array into `store`, one at a time.
///
/// Only a document that is not a JSON array fails the whole import, and in
/// that case nothing is written.
pub fn import(store: &dyn CollectionStore, bytes: &[u8]) -> Result<ImportReport, ImportError> {
    let records = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            return Err(ImportError::Format(
                "expected a JSON array of items".to_string(),
            ))
        }
        Err(e) => return Err(ImportError::Format(e.to_string())),
    };

    let resolver = DuplicateResolver::new(store);
    let mut report = ImportReport::default();

    for (index, record) in records.into_iter().enumerate() {
        if !is_truthy(record.get("id")) || !is_truthy(record.get("title")) {
            debug!("Skipping record {}: missing id or title", index);
            report.invalid += 1;
            continue;
        }

        let item: CollectionItem = match serde_json::from_value(record) {
            Ok(item) => item,
            Err(e) => {
                warn!("Skipping record {}: {}", index, e);
                report.rejected += 1;
                continue;
            }
        };

        if resolver.is_duplicate(&item.id, &item.title)? {
            debug!("Skipping record {}: {} is already collected", index, item.id);
            report.duplicates += 1;
            continue;
        }

        store.add(&item)?;
        report.added += 1;
    }

    info!(
        "Imported {} of {} records ({} duplicates, {} invalid, {} rejected)",
        report.added,
        report.total(),
        report.duplicates,
        report.invalid,
        report.rejected
    );
    Ok(report)
}
