use axum::{
    body::Body,
    extract::{Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::models::song::SongSource;
use crate::services::song_service::SongService;
use crate::{AppState, Error, Result};

pub struct StreamRoutes;

impl StreamRoutes {
    pub fn routes() -> Router<AppState> {
        Router::new().route("/audio/{song_id}", get(stream_audio_handler))
    }
}

/// Streams an uploaded song's blob. Songs that play from YouTube on the
/// client have nothing to serve here, so they report not found.
async fn stream_audio_handler(
    State(state): State<AppState>,
    Path(song_id): Path<String>,
) -> Result<Response> {
    let song = SongService::get_song(&state.db, &song_id).await?;

    let file_id = match (song.source, song.audio_file_id) {
        (SongSource::Upload, Some(file_id)) => file_id,
        _ => return Err(Error::SongNotFound { id: song_id }),
    };

    let audio = state.files.open_read_stream(&state.db, &file_id).await?;

    let headers = [
        (CONTENT_TYPE, audio.content_type.clone()),
        (
            CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", audio.file_name),
        ),
        (CONTENT_LENGTH, audio.size.to_string()),
    ];

    Ok((headers, Body::from_stream(audio.into_chunk_stream())).into_response())
}
