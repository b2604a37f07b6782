use super::store::{CollectionStore, StoreError};

/// Decides whether an incoming record is already part of the collection.
///
/// A record counts as a duplicate when its id is stored, or when an item with
/// exactly the same title is, whatever its category.
pub struct DuplicateResolver<'a> {
    store: &'a dyn CollectionStore,
}

impl<'a> DuplicateResolver<'a> {
    pub fn new(store: &'a dyn CollectionStore) -> Self {
        Self { store }
    }

    pub fn is_duplicate(&self, id: &str, title: &str) -> Result<bool, StoreError> {
        if self.store.get(id)?.is_some() {
            return Ok(true);
        }
        Ok(self.store.find_by_title(title)?.is_some())
    }
}
