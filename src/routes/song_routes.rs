use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::models::song::{CreateYouTubeSongRequest, Song};
use crate::services::song_service::SongService;
use crate::{AppState, Result};

pub struct SongRoutes;

impl SongRoutes {
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/", get(list_songs_handler))
            .route("/add-youtube", post(add_youtube_song_handler))
            .route("/{song_id}", get(get_song_handler))
            .route("/{song_id}", delete(delete_song_handler))
    }
}

async fn list_songs_handler(State(state): State<AppState>) -> Result<Json<Vec<Song>>> {
    let songs = SongService::list_songs(&state.db).await?;

    Ok(Json(songs))
}

async fn add_youtube_song_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateYouTubeSongRequest>,
) -> Result<Json<Song>> {
    let song = SongService::insert_song(&state.db, Song::from_youtube(payload)).await?;

    Ok(Json(song))
}

async fn get_song_handler(
    State(state): State<AppState>,
    Path(song_id): Path<String>,
) -> Result<Json<Song>> {
    let song = SongService::get_song(&state.db, &song_id).await?;

    Ok(Json(song))
}

async fn delete_song_handler(
    State(state): State<AppState>,
    Path(song_id): Path<String>,
) -> Result<Json<Value>> {
    SongService::delete_song(&state.db, &state.files, &song_id).await?;

    Ok(Json(json!({ "message": "Song deleted successfully" })))
}
