use chrono::Utc;
use serde::{Deserialize, Serialize};
use surrealdb::sql::Datetime;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SongSource {
    Youtube,
    Upload,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub duration: u32,
    pub cover_image: Option<String>,
    pub source: SongSource,

    // Only set for youtube songs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,

    // Only set for uploaded songs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,

    pub created_at: Datetime,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateYouTubeSongRequest {
    pub video_id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub duration: u32,
    pub cover_image: Option<String>,
}

impl Song {
    pub fn from_youtube(req: CreateYouTubeSongRequest) -> Self {
        Self {
            id: None,
            title: req.title,
            artist: req.artist,
            album: req.album,
            duration: req.duration,
            cover_image: req.cover_image,
            source: SongSource::Youtube,
            video_id: Some(req.video_id),
            audio_file_id: None,
            file_name: None,
            file_size: None,
            created_at: Datetime::from(Utc::now()),
        }
    }
}
