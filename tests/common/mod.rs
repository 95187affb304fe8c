//! Shared fixtures for the integration tests

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use lyric_catalog::api::{build_router, AppState};
use lyric_catalog::auth::Credential;
use lyric_catalog::config::Config;
use lyric_catalog::models::{Song, SongList};
use lyric_catalog::state::{CatalogStore, InMemoryStore};
use std::collections::HashMap;
use std::sync::Arc;

pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

pub fn song(title: &str, lyrics: &str) -> Song {
    Song::new(title.to_string(), lyrics.to_string(), None)
}

/// A small hymnal used across the search tests
pub fn hymnal() -> Vec<Song> {
    vec![
        song(
            "The Old Rugged Cross",
            "On a hill far away stood an old rugged cross\nthe emblem of suffering and shame",
        ),
        song(
            "Amazing Grace",
            "Amazing grace how sweet the sound\nthat saved a wretch like me",
        ),
        song(
            "A Mighty Fortress",
            "A mighty fortress is our God\na bulwark never failing",
        ),
        song("Be Thou My Vision", "Be thou my vision O Lord of my heart"),
        song(
            "Shepherds Arise",
            "Shepherds arise, be not afeared\nwith hasty steps to Bethlehem",
        ),
        song("Jerusalem", "And did those feet in ancient time"),
    ]
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server.trust_forwarded_for = true;
    config
}

/// Router over an in-memory store seeded with `songs` and a plain admin password
pub async fn test_app(songs: &[Song]) -> (axum::Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    for song in songs {
        store.save_song(song).await.unwrap();
    }
    store
        .save_credential(&Credential::plain(ADMIN_PASSWORD))
        .await
        .unwrap();

    let state = AppState::new(Arc::new(test_config()), store.clone());
    (build_router(state), store)
}

pub async fn save_list(store: &InMemoryStore, name: &str, songs: &[&Song], custom_order: bool) -> SongList {
    let list = SongList::new(
        name.to_string(),
        None,
        songs.iter().map(|s| s.id).collect(),
        custom_order,
    );
    store.save_list(&list).await.unwrap();
    list
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "198.51.100.7");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn login_request(password: &str, client: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/admin/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(serde_json::json!({ "password": password }).to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn titles(body: &serde_json::Value, field: &str) -> Vec<String> {
    body[field]
        .as_array()
        .unwrap()
        .iter()
        .map(|song| song["title"].as_str().unwrap().to_string())
        .collect()
}

/// Parse Prometheus exposition text into metric name -> sample lines
pub fn parse_prometheus_output(output: &str) -> HashMap<String, Vec<String>> {
    let mut metrics: HashMap<String, Vec<String>> = HashMap::new();

    for line in output.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let name = line
            .split(|c| c == '{' || c == ' ')
            .next()
            .unwrap_or_default()
            .to_string();
        metrics.entry(name).or_default().push(line.to_string());
    }

    metrics
}
