//! End-to-end tests for the collection: search, add, live views and
//! import/export against an on-disk database.

mod common;

use axum::http::StatusCode;
use common::*;
use entertainment_passport::collection::{self, IndexKey, StoreError};
use entertainment_passport::{
    AddOutcome, CollectionStore, Library, MediaType, SearchDispatcher, SortOrder,
    SqliteCollectionStore,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

struct TestLibrary {
    library: Library,
    providers: MockProviders,
    temp_dir: TempDir,
}

impl TestLibrary {
    async fn spawn() -> Self {
        let providers = MockProviders::spawn().await;
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            SqliteCollectionStore::new(temp_dir.path().join("passport.db"))
                .expect("Failed to open collection store"),
        );
        let dispatcher = SearchDispatcher::from_settings(&providers.settings())
            .expect("Failed to build dispatcher");
        Self {
            library: Library::new(store, dispatcher),
            providers,
            temp_dir,
        }
    }

    fn store(&self) -> &Arc<dyn CollectionStore> {
        self.library.store()
    }
}

#[tokio::test]
async fn test_added_search_result_is_listed_once() {
    let env = TestLibrary::spawn().await;
    let results = env
        .library
        .search("matrix", MediaType::Movie)
        .await
        .unwrap();
    let matrix = &results[0];

    assert_eq!(env.library.add(matrix).unwrap(), AddOutcome::Added);
    assert_eq!(
        env.library.add(matrix).unwrap(),
        AddOutcome::AlreadyCollected
    );

    let movies = env.store().query_by_type(MediaType::Movie).unwrap();
    assert_eq!(movies.iter().filter(|m| m.id == MOVIE_ID).count(), 1);
    assert!(env.store().query_by_type(MediaType::Tv).unwrap().is_empty());
}

#[tokio::test]
async fn test_raw_duplicate_insert_is_a_constraint_violation() {
    let env = TestLibrary::spawn().await;
    let results = env.library.search("google", MediaType::Book).await.unwrap();
    env.store().add(&results[0]).unwrap();

    let mut renamed = results[0].clone();
    renamed.title = "Another Title".to_string();
    let err = env.store().add(&renamed).unwrap_err();

    assert!(matches!(err, StoreError::ConstraintViolation { ref id } if id == BOOK_ID));
    assert_eq!(env.store().count().unwrap(), 1);
    assert_eq!(
        env.store().get(BOOK_ID).unwrap().unwrap().title,
        "The Google Story"
    );
}

#[tokio::test]
async fn test_failed_search_leaves_store_untouched() {
    let env = TestLibrary::spawn().await;
    let results = env.library.search("breaking", MediaType::Tv).await.unwrap();
    env.library.add(&results[0]).unwrap();
    let before = env.store().all().unwrap();

    env.providers.fail_with(StatusCode::INTERNAL_SERVER_ERROR);
    let err = env
        .library
        .search("breaking", MediaType::Tv)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(env.store().all().unwrap(), before);
}

#[tokio::test]
async fn test_duplicate_ids_in_one_import() {
    let env = TestLibrary::spawn().await;
    let document = br#"[
        {"id": "1", "type": "movie", "title": "Foo", "artist_or_producer": "X",
         "cover_image_url": "https://img/foo", "year": 2010,
         "imported_at": "2024-02-03T04:05:06.789Z"},
        {"id": "1", "type": "movie", "title": "Foo-dup", "artist_or_producer": "X",
         "cover_image_url": "https://img/foo", "year": 2010,
         "imported_at": "2024-02-03T04:05:06.789Z"}
    ]"#;

    let report = collection::import(env.store().as_ref(), document).unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(env.store().count().unwrap(), 1);
    assert_eq!(env.store().get("1").unwrap().unwrap().title, "Foo");
}

#[tokio::test]
async fn test_import_without_id_adds_nothing() {
    let env = TestLibrary::spawn().await;
    let report = collection::import(env.store().as_ref(), br#"[{"title":"NoId"}]"#).unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(env.store().count().unwrap(), 0);
}

#[tokio::test]
async fn test_import_is_idempotent() {
    let env = TestLibrary::spawn().await;
    for (query, media_type) in [
        ("matrix", MediaType::Movie),
        ("witcher", MediaType::Game),
        ("ok computer", MediaType::Album),
    ] {
        for item in env.library.search(query, media_type).await.unwrap() {
            env.library.add(&item).unwrap();
        }
    }
    let exported = collection::export(env.store().as_ref()).unwrap();

    let other_dir = TempDir::new().unwrap();
    let target = SqliteCollectionStore::new(other_dir.path().join("copy.db")).unwrap();
    let first = collection::import(&target, &exported).unwrap();
    let second = collection::import(&target, &exported).unwrap();

    assert_eq!(first.added, 4);
    assert_eq!(second.added, 0);
    assert_eq!(second.duplicates, 4);
    assert_eq!(target.count().unwrap(), 4);
}

#[tokio::test]
async fn test_export_import_round_trip_through_files() {
    let env = TestLibrary::spawn().await;
    for item in env.library.search("matrix", MediaType::Movie).await.unwrap() {
        env.library.add(&item).unwrap();
    }
    env.library.set_notes(MOVIE_ID, "Red pill").unwrap();

    let path = env.library.export_to_dir(env.temp_dir.path()).unwrap();

    let fresh = TestLibrary::spawn().await;
    let report = fresh.library.import_file(&path).unwrap();
    assert_eq!(report.added, 2);

    let mut original = env.store().all().unwrap();
    let mut restored = fresh.store().all().unwrap();
    original.sort_by(|a, b| a.id.cmp(&b.id));
    restored.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(original, restored);
    assert_eq!(
        fresh.store().get(MOVIE_ID).unwrap().unwrap().notes,
        "Red pill"
    );
}

#[tokio::test]
async fn test_malformed_import_changes_nothing() {
    let env = TestLibrary::spawn().await;
    let path = env.temp_dir.path().join("broken.json");
    std::fs::write(&path, r#"{"items": []}"#).unwrap();

    assert!(env.library.import_file(&path).is_err());
    assert_eq!(env.store().count().unwrap(), 0);
}

#[tokio::test]
async fn test_live_view_follows_adds_and_removals() {
    let env = TestLibrary::spawn().await;
    let mut view = env.library.watch(MediaType::Album, SortOrder::Added).unwrap();
    assert!(view.current().is_empty());

    let albums = env
        .library
        .search("ok computer", MediaType::Album)
        .await
        .unwrap();
    env.library.add(&albums[0]).unwrap();

    let snapshot = timeout(Duration::from_secs(2), view.changed())
        .await
        .expect("no snapshot after add")
        .unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, ALBUM_ID);

    env.library.remove(ALBUM_ID).unwrap();
    let snapshot = timeout(Duration::from_secs(2), view.changed())
        .await
        .expect("no snapshot after removal")
        .unwrap();
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_secondary_index_lookups() {
    let env = TestLibrary::spawn().await;
    for item in env.library.search("google", MediaType::Book).await.unwrap() {
        env.library.add(&item).unwrap();
    }

    let by_author = env
        .store()
        .query_index(&IndexKey::ArtistOrProducer(
            "David A. Vise, Mark Malseed".to_string(),
        ))
        .unwrap();
    assert_eq!(by_author.len(), 1);

    let by_type = env
        .store()
        .query_index(&IndexKey::Type(MediaType::Book))
        .unwrap();
    assert_eq!(by_type.len(), 1);
}
