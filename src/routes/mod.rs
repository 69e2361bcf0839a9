pub mod playlist_routes;
pub mod song_routes;
pub mod stream_routes;
pub mod upload_routes;
pub mod youtube_routes;
