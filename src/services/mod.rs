pub mod file_service;
pub mod metadata_service;
pub mod playlist_service;
pub mod song_service;
pub mod upload_service;
pub mod youtube_service;
