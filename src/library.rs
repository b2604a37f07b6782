//! Application-level operations over the collection and the search providers.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::{CollectionItem, MediaType, SortOrder};
use crate::collection::{
    self, CollectionStore, DuplicateResolver, ImportReport, LiveQuery, SqliteCollectionStore,
    StoreError,
};
use crate::config::AppConfig;
use crate::sources::{SearchDispatcher, SourceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// An item with the same id or the same title is already collected.
    AlreadyCollected,
}

pub struct Library {
    store: Arc<dyn CollectionStore>,
    dispatcher: SearchDispatcher,
}

impl Library {
    pub fn new(store: Arc<dyn CollectionStore>, dispatcher: SearchDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Opens the collection database and builds the search providers
    /// described by `config`.
    pub fn open(config: &AppConfig) -> Result<Self> {
        if !config.db_path.exists() {
            info!("Creating new collection database at {:?}", config.db_path);
        }
        let store = Arc::new(SqliteCollectionStore::new(&config.db_path)?);
        let dispatcher = SearchDispatcher::from_settings(&config.sources)?;
        Ok(Self::new(store, dispatcher))
    }

    pub fn store(&self) -> &Arc<dyn CollectionStore> {
        &self.store
    }

    pub async fn search(
        &self,
        query: &str,
        media_type: MediaType,
    ) -> Result<Vec<CollectionItem>, SourceError> {
        self.dispatcher.search(query, media_type).await
    }

    /// Adds `item` unless it is already collected.
    pub fn add(&self, item: &CollectionItem) -> Result<AddOutcome, StoreError> {
        if DuplicateResolver::new(self.store.as_ref()).is_duplicate(&item.id, &item.title)? {
            debug!("{} ({}) is already collected", item.id, item.title);
            return Ok(AddOutcome::AlreadyCollected);
        }
        match self.store.add(item) {
            Ok(()) => Ok(AddOutcome::Added),
            Err(StoreError::ConstraintViolation { .. }) => Ok(AddOutcome::AlreadyCollected),
            Err(e) => Err(e),
        }
    }

    pub fn remove(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(id)
    }

    pub fn set_notes(&self, id: &str, notes: &str) -> Result<bool, StoreError> {
        self.store.set_notes(id, notes)
    }

    pub fn list(
        &self,
        media_type: MediaType,
        sort: SortOrder,
    ) -> Result<Vec<CollectionItem>, StoreError> {
        let mut items = self.store.query_by_type(media_type)?;
        sort.sort(&mut items);
        Ok(items)
    }

    /// Starts a live sorted view of one category. Must be called from within
    /// a tokio runtime.
    pub fn watch(&self, media_type: MediaType, sort: SortOrder) -> Result<LiveQuery, StoreError> {
        LiveQuery::watch(self.store.clone(), media_type, sort)
    }

    /// Writes the whole collection to a dated JSON file inside `dir` and
    /// returns its path.
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let bytes = collection::export(self.store.as_ref())?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory {:?}", dir))?;
        let path = dir.join(collection::export_file_name(Utc::now().date_naive()));
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write export file {:?}", path))?;
        info!("Exported collection to {:?}", path);
        Ok(path)
    }

    pub fn import_file(&self, path: &Path) -> Result<ImportReport> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read import file {:?}", path))?;
        let report = collection::import(self.store.as_ref(), &bytes)
            .with_context(|| format!("Failed to import {:?}", path))?;
        Ok(report)
    }
}
