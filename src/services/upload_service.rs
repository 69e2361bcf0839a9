use axum::body::Bytes;
use chrono::Utc;
use surrealdb::{engine::any::Any, Surreal};

use crate::models::song::{Song, SongSource};
use crate::services::file_service::FileService;
use crate::services::metadata_service::MetadataService;
use crate::services::song_service::SongService;
use crate::Error;

/// Containers the ingest pipeline accepts, as declared by the client
pub const ALLOWED_AUDIO_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/wav",
    "audio/mp4",
    "audio/x-m4a",
    "audio/flac",
];

const DEFAULT_COVER_IMAGE: &str =
    "https://images.unsplash.com/photo-1511379938547-c1f69419868d?w=300&h=300&fit=crop";

pub struct SongUpload {
    pub content: Bytes,
    pub file_name: String,
    pub content_type: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub cover_image: Option<String>,
}

pub struct UploadService;

impl UploadService {
    /// Full ingest: validate the container, persist the blob, extract tags,
    /// then register the song. A failed registration takes the blob with it.
    pub async fn ingest(
        db: &Surreal<Any>,
        files: &FileService,
        upload: SongUpload,
    ) -> Result<Song, Error> {
        if !ALLOWED_AUDIO_TYPES.contains(&upload.content_type.as_str()) {
            return Err(Error::UnsupportedMediaType {
                content_type: upload.content_type,
            });
        }

        let stored = files
            .store(db, &upload.file_name, &upload.content_type, &upload.content)
            .await?;

        match Self::register_song(db, &stored.id, stored.size, upload).await {
            Ok(song) => Ok(song),
            Err(err) => {
                if let Err(cleanup_err) = files.delete(db, &stored.id).await {
                    tracing::warn!("Could not clean up blob '{}': {}", stored.id, cleanup_err);
                }
                Err(err)
            }
        }
    }

    async fn register_song(
        db: &Surreal<Any>,
        file_id: &str,
        size: u64,
        upload: SongUpload,
    ) -> Result<Song, Error> {
        // Tag parsing is CPU and blocking-io work, keep it off the runtime
        let file_name = upload.file_name.clone();
        let content = upload.content.clone();
        let metadata =
            tokio::task::spawn_blocking(move || MetadataService::extract(&file_name, &content))
                .await
                .unwrap_or_else(|err| {
                    tracing::warn!("Metadata extraction task failed: {}", err);
                    MetadataService::default_metadata(&upload.file_name)
                });

        tracing::debug!(
            "Extracted from '{}': {} - {} ({}s)",
            upload.file_name,
            metadata.artist,
            metadata.title,
            metadata.duration
        );

        let song = Song {
            id: None,
            title: Self::override_or(upload.title, metadata.title),
            artist: Self::override_or(upload.artist, metadata.artist),
            album: Some(Self::override_or(upload.album, metadata.album)),
            duration: metadata.duration,
            cover_image: Some(
                upload
                    .cover_image
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_COVER_IMAGE.to_string()),
            ),
            source: SongSource::Upload,
            video_id: None,
            audio_file_id: Some(file_id.to_string()),
            file_name: Some(upload.file_name),
            file_size: Some(size),
            created_at: surrealdb::sql::Datetime::from(Utc::now()),
        };

        SongService::insert_song(db, song).await
    }

    fn override_or(candidate: Option<String>, fallback: String) -> String {
        candidate
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(fallback)
    }
}
