pub mod song_helpers;
pub mod thing_helpers;
