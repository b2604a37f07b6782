//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::MockProviders;
//! use entertainment_passport::{MediaType, SearchDispatcher};
//!
//! #[tokio::test]
//! async fn test_search_shows() {
//!     let providers = MockProviders::spawn().await;
//!     let dispatcher = SearchDispatcher::from_settings(&providers.settings()).unwrap();
//!
//!     let results = dispatcher.search("breaking", MediaType::Tv).await.unwrap();
//!     assert_eq!(results.len(), 1);
//! }
//! ```

mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use server::{MockProviders, RecordedRequest};
