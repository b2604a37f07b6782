//! Canned provider payloads, shaped like the real APIs' responses.

use super::constants::*;
use serde_json::{json, Value};

pub fn tmdb_movies(query: &str) -> Value {
    if query == EMPTY_QUERY {
        return json!({"page": 1, "results": [], "total_results": 0});
    }
    json!({
        "page": 1,
        "results": [
            {
                "id": 603,
                "title": MOVIE_TITLE,
                "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
                "release_date": "1999-03-30"
            },
            {
                "id": 604,
                "title": "The Matrix Reloaded",
                "poster_path": null,
                "release_date": ""
            }
        ],
        "total_results": 2
    })
}

pub fn tvmaze_shows(query: &str) -> Value {
    if query == EMPTY_QUERY {
        return json!([]);
    }
    json!([
        {
            "score": 0.91,
            "show": {
                "id": 169,
                "name": "Breaking Bad",
                "network": {"id": 20, "name": "AMC"},
                "image": {"medium": "https://static.tvmaze.com/uploads/images/medium_portrait/0/2400.jpg"},
                "premiered": "2008-01-20"
            }
        }
    ])
}

pub fn twitch_token() -> Value {
    json!({
        "access_token": IGDB_ACCESS_TOKEN,
        "expires_in": 5587808,
        "token_type": "bearer"
    })
}

/// `body` is the Apicalypse query, which opens with `search "<term>";`.
pub fn igdb_games(body: &str) -> Value {
    if body.starts_with(&format!("search \"{}\";", EMPTY_QUERY)) {
        return json!([]);
    }
    json!([
        {
            "id": 1942,
            "name": "The Witcher 3: Wild Hunt",
            "cover": {"id": 89386, "url": "//images.igdb.com/igdb/image/upload/t_thumb/co1wyy.jpg"},
            "first_release_date": 1431993600,
            "genres": [{"id": 12, "name": "Role-playing (RPG)"}],
            "involved_companies": [
                {"id": 1, "company": {"id": 908, "name": "CD Projekt RED"}, "developer": true}
            ]
        }
    ])
}

pub fn itunes_albums(term: &str) -> Value {
    if term == EMPTY_QUERY {
        return json!({"resultCount": 0, "results": []});
    }
    json!({
        "resultCount": 1,
        "results": [
            {
                "wrapperType": "collection",
                "collectionId": 1097861387,
                "collectionName": "OK Computer",
                "artistName": "Radiohead",
                "artworkUrl100": "https://is1-ssl.mzstatic.com/image/thumb/Music/100x100bb.jpg",
                "releaseDate": "1997-05-21T07:00:00Z"
            }
        ]
    })
}

pub fn google_volumes(query: &str) -> Value {
    if query == EMPTY_QUERY {
        return json!({"kind": "books#volumes", "totalItems": 0});
    }
    json!({
        "kind": "books#volumes",
        "totalItems": 1,
        "items": [
            {
                "id": BOOK_ID,
                "volumeInfo": {
                    "title": "The Google Story",
                    "authors": ["David A. Vise", "Mark Malseed"],
                    "publishedDate": "2005-11-15",
                    "imageLinks": {"thumbnail": "http://books.google.com/books/content?id=zyTCAlFPjgYC"}
                }
            }
        ]
    })
}
