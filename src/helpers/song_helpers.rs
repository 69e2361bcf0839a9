use crate::helpers::thing_helpers::create_song_thing;
use crate::models::database_helpers::RelationId;
use crate::Error;
use surrealdb::{engine::any::Any, Surreal};

pub async fn song_exists(db: &Surreal<Any>, song_id: &str) -> Result<bool, Error> {
    let song_thing = create_song_thing(song_id);
    let sql_query = "SELECT id FROM $song_id;";
    let mut response = db.query(sql_query).bind(("song_id", song_thing)).await?;
    let exists: Option<RelationId> = response.take(0)?;
    Ok(exists.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::song::{Song, SongSource};
    use crate::services::song_service::SongService;
    use chrono::Utc;
    use surrealdb::engine::any::connect;
    use surrealdb::sql::Datetime;

    async fn setup_db() -> (Surreal<Any>, String) {
        let db = connect("mem://").await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();

        let test_song = Song {
            id: None,
            title: "Test Song".to_string(),
            artist: "Test Artist".to_string(),
            album: Some("Test Album".to_string()),
            duration: 100,
            cover_image: None,
            source: SongSource::Youtube,
            video_id: Some("dQw4w9WgXcQ".to_string()),
            audio_file_id: None,
            file_name: None,
            file_size: None,
            created_at: Datetime::from(Utc::now()),
        };

        let created_song = SongService::insert_song(&db, test_song)
            .await
            .expect("Test song creation failed");

        let song_id = created_song.id.expect("Created song has no id");

        (db, song_id)
    }

    #[tokio::test]
    async fn test_song_exists() {
        let (db, valid_id) = setup_db().await;

        // --- Test 1: Verify that an existing song is detected ---
        let exists = song_exists(&db, &valid_id).await.unwrap();
        assert!(exists, "Song with ID '{}' should exist", valid_id);

        // --- Test 2: Verify that a valid but non-existent ID is detected ---
        let non_existent_id = "this_id_does_not_exist";
        let exists = song_exists(&db, non_existent_id).await.unwrap();
        assert!(!exists, "Song with a non-existent ID should not exist");

        // --- Test 3: Verify that a prefixed ID is normalized ---
        let prefixed_id = format!("song:{}", valid_id);
        let exists = song_exists(&db, &prefixed_id).await.unwrap();
        assert!(exists, "Prefixed ID '{}' should resolve to the same song", prefixed_id);
    }
}
