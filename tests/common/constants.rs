//! Shared constants for end-to-end tests

// ============================================================================
// Credentials handed to the adapters
// ============================================================================

pub const TMDB_KEY: &str = "tmdb-test-key";
pub const IGDB_CLIENT_ID: &str = "igdb-test-client";
pub const IGDB_CLIENT_SECRET: &str = "igdb-test-secret";
pub const GOOGLE_BOOKS_KEY: &str = "books-test-key";

/// Token the mock Twitch endpoint grants, and the only one IGDB accepts.
pub const IGDB_ACCESS_TOKEN: &str = "granted-app-token";

/// Any query with this text gets an empty result set from every provider.
pub const EMPTY_QUERY: &str = "nothing matches this";

// ============================================================================
// Fixture ids
// ============================================================================

pub const MOVIE_ID: &str = "603";
pub const MOVIE_TITLE: &str = "The Matrix";
pub const SHOW_ID: &str = "169";
pub const GAME_ID: &str = "1942";
pub const ALBUM_ID: &str = "1097861387";
pub const BOOK_ID: &str = "zyTCAlFPjgYC";

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;
