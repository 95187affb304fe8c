//! HTTP handlers for the catalog, list and admin login endpoints

use crate::api::{AdminSession, AppState, ClientId};
use crate::auth::AuthError;
use crate::error::{AppError, Result};
use crate::metrics::{gather_metrics, ACTIVE_SESSIONS, SEARCH_DURATION_SECONDS, SEARCH_REQUESTS_TOTAL};
use crate::models::{Song, SongList};
use crate::search::{sort_by_title, QueryKind};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Prometheus scrape endpoint
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

impl SearchParams {
    fn query(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.trim().is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SongsResponse {
    pub query: Option<String>,
    pub total: usize,
    pub songs: Vec<Song>,
}

fn search_kind(state: &AppState, query: Option<&str>) -> &'static str {
    match query.map(|q| state.search.parse(q).kind) {
        Some(QueryKind::Exact) => "exact",
        Some(QueryKind::Fuzzy) => "fuzzy",
        None => "browse",
    }
}

/// Search the whole catalog; without a query every song is returned
pub async fn search_songs(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SongsResponse>> {
    let songs = state.store.list_songs().await?;
    let query = params.query();

    SEARCH_REQUESTS_TOTAL
        .with_label_values(&[search_kind(&state, query)])
        .inc();
    let timer = SEARCH_DURATION_SECONDS.start_timer();
    let results: Vec<Song> = state
        .search
        .filter_and_sort(&songs, query, None)
        .into_iter()
        .cloned()
        .collect();
    timer.observe_duration();

    Ok(Json(SongsResponse {
        query: query.map(str::to_string),
        total: results.len(),
        songs: results,
    }))
}

/// Get a song by ID
pub async fn get_song(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Song>> {
    state
        .store
        .get_song(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Song {} not found", id)))
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct SongRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[serde(default)]
    pub lyrics: String,
    #[validate(length(max = 200))]
    pub author: Option<String>,
}

impl SongRequest {
    fn into_parts(self) -> Result<(String, String, Option<String>)> {
        self.validate()?;

        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("title must not be blank".to_string()));
        }

        let author = self
            .author
            .map(|author| author.trim().to_string())
            .filter(|author| !author.is_empty());

        Ok((title, self.lyrics, author))
    }
}

/// Add a song (admin)
pub async fn create_song(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Json(request): Json<SongRequest>,
) -> Result<(StatusCode, Json<Song>)> {
    let (title, lyrics, author) = request.into_parts()?;
    let song = Song::new(title, lyrics, author);

    state.store.save_song(&song).await?;
    tracing::info!(song_id = %song.id, client_id = %session.client_id, "Song created");

    Ok((StatusCode::CREATED, Json(song)))
}

/// Replace a song's title, lyrics and author (admin)
pub async fn update_song(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path(id): Path<Uuid>,
    Json(request): Json<SongRequest>,
) -> Result<Json<Song>> {
    let (title, lyrics, author) = request.into_parts()?;
    let mut song = state
        .store
        .get_song(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Song {} not found", id)))?;

    song.update(title, lyrics, author);
    state.store.update_song(&song).await?;
    tracing::info!(song_id = %id, client_id = %session.client_id, "Song updated");

    Ok(Json(song))
}

/// Delete a song and remove it from every list (admin)
pub async fn delete_song(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.store.delete_song(&id).await?;
    tracing::info!(song_id = %id, client_id = %session.client_id, "Song deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub song_count: usize,
    pub custom_order: bool,
}

impl From<&SongList> for ListSummary {
    fn from(list: &SongList) -> Self {
        Self {
            id: list.id,
            name: list.name.clone(),
            description: list.description.clone(),
            song_count: list.song_ids.len(),
            custom_order: list.custom_order,
        }
    }
}

/// All lists in library order, optionally filtered by name
pub async fn list_lists(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ListSummary>>> {
    let lists = state.store.list_lists().await?;
    let summaries = state
        .search
        .filter_and_sort(&lists, params.query(), None)
        .into_iter()
        .map(ListSummary::from)
        .collect();

    Ok(Json(summaries))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(flatten)]
    pub list: SongList,
    pub query: Option<String>,
    pub songs: Vec<Song>,
}

/// Get a list with its songs.
///
/// With a query the matching members come back alphabetically. Without one
/// they follow the list's custom order if it has one, else alphabetical.
pub async fn get_list(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ListResponse>> {
    let list = state
        .store
        .get_list(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("List {} not found", id)))?;

    let query = params.query();

    let songs = match query {
        Some(q) => {
            SEARCH_REQUESTS_TOTAL
                .with_label_values(&[search_kind(&state, Some(q))])
                .inc();
            let timer = SEARCH_DURATION_SECONDS.start_timer();
            let catalog = state.store.list_songs().await?;
            let member_ids: HashSet<Uuid> = list.song_ids.iter().copied().collect();
            let in_list = |song: &Song| member_ids.contains(&song.id);
            let matched = state
                .search
                .filter_and_sort(&catalog, Some(q), Some(&in_list))
                .into_iter()
                .cloned()
                .collect();
            timer.observe_duration();
            matched
        }
        None => {
            let mut members = state.store.get_songs(&list.song_ids).await?;
            if !list.custom_order {
                sort_by_title(&mut members);
            }
            members
        }
    };

    Ok(Json(ListResponse {
        list,
        query: query.map(str::to_string),
        songs,
    }))
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ListRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(default)]
    pub song_ids: Vec<Uuid>,
    #[serde(default)]
    pub custom_order: bool,
}

impl ListRequest {
    async fn into_parts(
        self,
        state: &AppState,
    ) -> Result<(String, Option<String>, Vec<Uuid>, bool)> {
        self.validate()?;

        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("name must not be blank".to_string()));
        }

        for id in &self.song_ids {
            if state.store.get_song(id).await?.is_none() {
                return Err(AppError::Validation(format!("Unknown song id {}", id)));
            }
        }

        Ok((name, self.description, self.song_ids, self.custom_order))
    }
}

/// Create a list (admin)
pub async fn create_list(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Json(request): Json<ListRequest>,
) -> Result<(StatusCode, Json<SongList>)> {
    let (name, description, song_ids, custom_order) = request.into_parts(&state).await?;
    let list = SongList::new(name, description, song_ids, custom_order);

    state.store.save_list(&list).await?;
    tracing::info!(list_id = %list.id, client_id = %session.client_id, "List created");

    Ok((StatusCode::CREATED, Json(list)))
}

/// Replace a list's name, description, members and ordering (admin)
pub async fn update_list(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path(id): Path<Uuid>,
    Json(request): Json<ListRequest>,
) -> Result<Json<SongList>> {
    let (name, description, song_ids, custom_order) = request.into_parts(&state).await?;
    let mut list = state
        .store
        .get_list(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("List {} not found", id)))?;

    list.update(name, description, song_ids, custom_order);
    state.store.update_list(&list).await?;
    tracing::info!(list_id = %id, client_id = %session.client_id, "List updated");

    Ok(Json(list))
}

/// Delete a list (admin); its songs stay in the catalog
pub async fn delete_list(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.store.delete_list(&id).await?;
    tracing::info!(list_id = %id, client_id = %session.client_id, "List deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in_secs: u64,
}

/// Exchange the admin password for a session token
pub async fn login(
    State(state): State<AppState>,
    ClientId(client_id): ClientId,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    request.validate()?;

    let credential = state
        .store
        .get_credential()
        .await?
        .ok_or(AuthError::NotConfigured)?;

    // Key derivation blocks for tens of milliseconds
    let guard = state.auth.clone();
    let attempt_client = client_id.clone();
    let verification = tokio::task::spawn_blocking(move || {
        guard.authenticate(&attempt_client, &request.password, &credential)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Login task failed: {}", e)))??;

    if let Some(migrated) = verification.migrated {
        // The login stands; an unsaved migration is retried on the next login
        if let Err(e) = state.store.save_credential(&migrated).await {
            tracing::error!(error = %e, "Failed to persist migrated admin credential");
        }
    }

    let session = state.sessions.create(&client_id).await;
    ACTIVE_SESSIONS.set(state.sessions.entry_count() as f64);

    Ok(Json(LoginResponse {
        token: session.token,
        expires_in_secs: state.sessions.ttl().as_secs(),
    }))
}

/// Revoke the caller's session
pub async fn logout(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
) -> Result<StatusCode> {
    state.sessions.revoke(&session.token).await;
    ACTIVE_SESSIONS.set(state.sessions.entry_count() as f64);
    tracing::info!(client_id = %session.client_id, "Admin logged out");
    Ok(StatusCode::NO_CONTENT)
}
