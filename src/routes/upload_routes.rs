use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};

use crate::models::song::Song;
use crate::services::upload_service::{SongUpload, UploadService};
use crate::{AppState, Error, Result};

// axum caps request bodies at 2 MB by default, far too small for audio
const MAX_UPLOAD_SIZE_BYTES: usize = 50 * 1024 * 1024;

pub struct UploadRoutes;

impl UploadRoutes {
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/audio", post(upload_audio_handler))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE_BYTES))
    }
}

async fn upload_audio_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Song>> {
    let mut content = None;
    let mut file_name = None;
    let mut content_type = None;
    let mut title = None;
    let mut artist = None;
    let mut album = None;
    let mut cover_image = None;

    while let Some(field) =
        multipart
            .next_field()
            .await
            .map_err(|err| Error::InvalidInput {
                reason: format!("Malformed multipart body: {}", err),
            })?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                content = Some(field.bytes().await.map_err(|err| Error::InvalidInput {
                    reason: format!("Could not read file field: {}", err),
                })?);
            }
            Some("title") => title = Some(read_text(field).await?),
            Some("artist") => artist = Some(read_text(field).await?),
            Some("album") => album = Some(read_text(field).await?),
            Some("coverImage") => cover_image = Some(read_text(field).await?),
            _ => {}
        }
    }

    let content = content.ok_or_else(|| Error::InvalidInput {
        reason: "Missing 'file' field".to_string(),
    })?;

    let upload = SongUpload {
        content,
        file_name: file_name.unwrap_or_else(|| "upload.bin".to_string()),
        content_type: content_type.unwrap_or_default(),
        title,
        artist,
        album,
        cover_image,
    };

    let song = UploadService::ingest(&state.db, &state.files, upload).await?;

    Ok(Json(song))
}

async fn read_text(field: Field<'_>) -> Result<String> {
    field.text().await.map_err(|err| Error::InvalidInput {
        reason: format!("Could not read form field: {}", err),
    })
}
