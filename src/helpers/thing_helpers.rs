use surrealdb::sql::Thing;

/// Accepts both bare ids and "table:id" forms
pub fn parse_id_part(id: &str) -> &str {
    if let Some(id_part) = id.split(':').nth(1) {
        id_part
    } else {
        id
    }
}

pub fn create_song_thing(song_id: &str) -> Thing {
    let clean_id = parse_id_part(song_id);
    Thing::from(("song".to_string(), clean_id.to_string()))
}

pub fn create_playlist_thing(playlist_id: &str) -> Thing {
    let clean_id = parse_id_part(playlist_id);
    Thing::from(("playlist".to_string(), clean_id.to_string()))
}

pub fn create_audio_file_thing(file_id: &str) -> Thing {
    let clean_id = parse_id_part(file_id);
    Thing::from(("audio_file".to_string(), clean_id.to_string()))
}
