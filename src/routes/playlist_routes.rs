use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use crate::models::playlist::{
    AddSongRequest, CreatePlaylistRequest, Playlist, UpdatePlaylistRequest,
};
use crate::services::playlist_service::PlaylistService;
use crate::{AppState, Result};

pub struct PlaylistRoutes;

impl PlaylistRoutes {
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/", post(create_playlist_handler))
            .route("/", get(list_playlists_handler))
            .route("/{playlist_id}", get(get_playlist_handler))
            .route("/{playlist_id}", put(update_playlist_handler))
            .route("/{playlist_id}", delete(delete_playlist_handler))
            .route("/{playlist_id}/songs", post(add_song_handler))
            .route(
                "/{playlist_id}/songs/{song_id}",
                delete(remove_song_handler),
            )
    }
}

async fn create_playlist_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreatePlaylistRequest>,
) -> Result<Json<Playlist>> {
    let playlist = PlaylistService::create_playlist(&state.db, payload).await?;

    Ok(Json(playlist))
}

async fn list_playlists_handler(State(state): State<AppState>) -> Result<Json<Vec<Playlist>>> {
    let playlists = PlaylistService::list_playlists(&state.db).await?;

    Ok(Json(playlists))
}

async fn get_playlist_handler(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> Result<Json<Playlist>> {
    let playlist = PlaylistService::get_playlist(&state.db, &playlist_id).await?;

    Ok(Json(playlist))
}

async fn update_playlist_handler(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    Json(payload): Json<UpdatePlaylistRequest>,
) -> Result<Json<Playlist>> {
    let playlist = PlaylistService::update_playlist(&state.db, &playlist_id, payload).await?;

    Ok(Json(playlist))
}

async fn delete_playlist_handler(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> Result<Json<Value>> {
    PlaylistService::delete_playlist(&state.db, &playlist_id).await?;

    Ok(Json(json!({ "message": "Playlist deleted successfully" })))
}

async fn add_song_handler(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    Json(payload): Json<AddSongRequest>,
) -> Result<Json<Value>> {
    PlaylistService::add_song_to_playlist(&state.db, &playlist_id, &payload.song_id).await?;

    Ok(Json(json!({ "message": "Song added to playlist" })))
}

async fn remove_song_handler(
    State(state): State<AppState>,
    Path((playlist_id, song_id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    PlaylistService::remove_song_from_playlist(&state.db, &playlist_id, &song_id).await?;

    Ok(Json(json!({ "message": "Song removed from playlist" })))
}
