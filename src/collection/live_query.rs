//! Sorted views of one category that follow the collection as it changes.
//!
//! Each `LiveQuery` owns a single background task. The task reads the store's
//! change events in order, drops the ones for other categories, drains
//! whatever else is already queued and then recomputes the view once, so a
//! burst of writes produces one fresh snapshot rather than one per write.

use super::store::{CollectionStore, StoreError};
use crate::catalog::{CollectionItem, MediaType, SortOrder};
use std::sync::Arc;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

pub struct LiveQuery {
    media_type: MediaType,
    snapshot: watch::Receiver<Vec<CollectionItem>>,
    task: JoinHandle<()>,
}

fn sorted_snapshot(
    store: &dyn CollectionStore,
    media_type: MediaType,
    sort: SortOrder,
) -> Result<Vec<CollectionItem>, StoreError> {
    let mut items = store.query_by_type(media_type)?;
    sort.sort(&mut items);
    Ok(items)
}

impl LiveQuery {
    /// Starts following `media_type` in `store`, ordered by `sort`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn watch(
        store: Arc<dyn CollectionStore>,
        media_type: MediaType,
        sort: SortOrder,
    ) -> Result<Self, StoreError> {
        // Subscribe before the first read so no write can slip in between.
        let mut changes = store.subscribe();
        let initial = sorted_snapshot(store.as_ref(), media_type, sort)?;
        let (snapshot_tx, snapshot) = watch::channel(initial);

        let task = tokio::spawn(async move {
            loop {
                let relevant = match changes.recv().await {
                    Ok(change) => change.media_type == media_type,
                    Err(RecvError::Lagged(n)) => {
                        warn!("{} live query lagged by {} changes", media_type, n);
                        true
                    }
                    Err(RecvError::Closed) => {
                        debug!("Collection change channel closed");
                        break;
                    }
                };
                if !relevant {
                    continue;
                }

                loop {
                    match changes.try_recv() {
                        Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                        Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                    }
                }

                // SQLite reads block; run them off the runtime's workers
                let snapshot_store = Arc::clone(&store);
                let refreshed = tokio::task::spawn_blocking(move || {
                    sorted_snapshot(snapshot_store.as_ref(), media_type, sort)
                })
                .await;
                match refreshed {
                    Ok(Ok(items)) => {
                        if snapshot_tx.send(items).is_err() {
                            break;
                        }
                    }
                    Ok(Err(e)) => error!("Failed to refresh {} live query: {}", media_type, e),
                    Err(e) => {
                        error!("{} live query refresh failed: {}", media_type, e);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            media_type,
            snapshot,
            task,
        })
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// The latest snapshot, without waiting.
    pub fn current(&self) -> Vec<CollectionItem> {
        self.snapshot.borrow().clone()
    }

    /// Waits for the next snapshot. Returns None once the query has stopped.
    pub async fn changed(&mut self) -> Option<Vec<CollectionItem>> {
        self.snapshot.changed().await.ok()?;
        Some(self.snapshot.borrow_and_update().clone())
    }

    /// A receiver that can be handed to other tasks.
    pub fn receiver(&self) -> watch::Receiver<Vec<CollectionItem>> {
        self.snapshot.clone()
    }
}

impl Drop for LiveQuery {
    fn drop(&mut self) {
        self.task.abort();
    }
}
