//! The personal collection: durable storage, duplicate detection, live
//! sorted views and JSON import/export.

mod duplicates;
mod live_query;
pub mod reconcile;
mod schema;
mod store;

pub use duplicates::DuplicateResolver;
pub use live_query::LiveQuery;
pub use reconcile::{export, export_file_name, import, ExportError, ImportError, ImportReport};
pub use store::{
    ChangeKind, CollectionChange, CollectionStore, IndexKey, SqliteCollectionStore, StoreError,
};
