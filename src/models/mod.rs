pub mod audio_file;
pub mod playlist;
pub mod song;
pub mod youtube;

pub mod database_helpers;
