use surrealdb::{engine::any::Any, Surreal};

use crate::helpers::thing_helpers::create_song_thing;
use crate::models::database_helpers::RelationId;
use crate::models::song::{Song, SongSource};
use crate::services::file_service::FileService;
use crate::services::playlist_service::PlaylistService;
use crate::Error;

pub struct SongService;

impl SongService {
    /// Persists a song and returns it with its generated id
    pub async fn insert_song(db: &Surreal<Any>, song: Song) -> Result<Song, Error> {
        let query = r#"
        CREATE song SET
            title = $title,
            artist = $artist,
            album = $album,
            duration = $duration,
            coverImage = $cover_image,
            source = $source,
            videoId = $video_id,
            audioFileId = $audio_file_id,
            fileName = $file_name,
            fileSize = $file_size,
            createdAt = $created_at
        RETURN id
    "#;

        let mut created_records: Vec<RelationId> = db
            .query(query)
            .bind(("title", song.title.clone()))
            .bind(("artist", song.artist.clone()))
            .bind(("album", song.album.clone()))
            .bind(("duration", song.duration))
            .bind(("cover_image", song.cover_image.clone()))
            .bind(("source", song.source.to_string()))
            .bind(("video_id", song.video_id.clone()))
            .bind(("audio_file_id", song.audio_file_id.clone()))
            .bind(("file_name", song.file_name.clone()))
            .bind(("file_size", song.file_size))
            .bind(("created_at", song.created_at.clone()))
            .await?
            .take(0)?;

        let song_thing = created_records
            .pop()
            .ok_or_else(|| Error::DbError("Song creation returned no record".to_string()))?
            .id;

        Ok(Song {
            id: Some(song_thing.id.to_raw()),
            ..song
        })
    }

    pub async fn get_song(db: &Surreal<Any>, song_id: &str) -> Result<Song, Error> {
        let song_thing = create_song_thing(song_id);

        let mut songs: Vec<Song> = db
            .query("SELECT *, record::id(id) AS id FROM $song_id")
            .bind(("song_id", song_thing))
            .await?
            .take(0)?;

        songs.pop().ok_or_else(|| Error::SongNotFound {
            id: song_id.to_string(),
        })
    }

    pub async fn list_songs(db: &Surreal<Any>) -> Result<Vec<Song>, Error> {
        let songs: Vec<Song> = db
            .query(
                r#"
            SELECT *, record::id(id) AS id
            FROM song
            ORDER BY createdAt DESC
        "#,
            )
            .await?
            .take(0)?;

        Ok(songs)
    }

    /// Deletes a song, its audio blob when it owns one, and every
    /// playlist membership pointing at it
    pub async fn delete_song(
        db: &Surreal<Any>,
        files: &FileService,
        song_id: &str,
    ) -> Result<(), Error> {
        let song = Self::get_song(db, song_id).await?;

        if song.source == SongSource::Upload {
            if let Some(file_id) = song.audio_file_id.as_deref() {
                if let Err(err) = files.delete(db, file_id).await {
                    tracing::warn!("Could not delete audio file '{}': {}", file_id, err);
                }
            }
        }

        let song_thing = create_song_thing(song_id);
        db.query("DELETE FROM song WHERE id = $song_id")
            .bind(("song_id", song_thing))
            .await?
            .check()?;

        PlaylistService::scrub_song_from_playlists(db, song_id).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::playlist::CreatePlaylistRequest;
    use chrono::Utc;
    use surrealdb::engine::any::connect;
    use surrealdb::sql::Datetime;

    async fn setup_db() -> Surreal<Any> {
        let db = connect("mem://").await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();
        db
    }

    fn youtube_song(title: &str) -> Song {
        Song {
            id: None,
            title: title.to_string(),
            artist: "Artist".to_string(),
            album: None,
            duration: 215,
            cover_image: Some("https://i.ytimg.com/vi/abc/hqdefault.jpg".to_string()),
            source: SongSource::Youtube,
            video_id: Some("abc123def45".to_string()),
            audio_file_id: None,
            file_name: None,
            file_size: None,
            created_at: Datetime::from(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_song() {
        let db = setup_db().await;

        let created = SongService::insert_song(&db, youtube_song("First"))
            .await
            .unwrap();
        let id = created.id.clone().expect("Created song should have an id");

        let fetched = SongService::get_song(&db, &id).await.unwrap();
        assert_eq!(fetched.title, "First");
        assert_eq!(fetched.artist, "Artist");
        assert_eq!(fetched.source, SongSource::Youtube);
        assert_eq!(fetched.video_id.as_deref(), Some("abc123def45"));
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.album, None);
        assert_eq!(fetched.audio_file_id, None);
    }

    #[tokio::test]
    async fn test_get_song_not_found() {
        let db = setup_db().await;

        let err = SongService::get_song(&db, "does_not_exist").await.unwrap_err();
        assert!(
            matches!(err, Error::SongNotFound { .. }),
            "Expected SongNotFound, got {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_list_songs_newest_first() {
        let db = setup_db().await;

        SongService::insert_song(&db, youtube_song("Older"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        SongService::insert_song(&db, youtube_song("Newer"))
            .await
            .unwrap();

        let songs = SongService::list_songs(&db).await.unwrap();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].title, "Newer");
        assert_eq!(songs[1].title, "Older");
    }

    #[tokio::test]
    async fn test_delete_song_scrubs_playlists_and_blob() {
        let db = setup_db().await;
        let dir = tempfile::tempdir().unwrap();
        let files = FileService::init(dir.path()).unwrap();

        let stored = files
            .store(&db, "track.mp3", "audio/mpeg", b"not really an mp3")
            .await
            .unwrap();

        let uploaded = Song {
            source: SongSource::Upload,
            video_id: None,
            audio_file_id: Some(stored.id.clone()),
            file_name: Some("track.mp3".to_string()),
            file_size: Some(stored.size),
            ..youtube_song("Uploaded")
        };
        let song = SongService::insert_song(&db, uploaded).await.unwrap();
        let song_id = song.id.clone().unwrap();

        let p1 = PlaylistService::create_playlist(
            &db,
            CreatePlaylistRequest {
                name: "One".to_string(),
                description: None,
                cover_image: None,
            },
        )
        .await
        .unwrap();
        let p2 = PlaylistService::create_playlist(
            &db,
            CreatePlaylistRequest {
                name: "Two".to_string(),
                description: None,
                cover_image: None,
            },
        )
        .await
        .unwrap();
        let p1_id = p1.id.clone().unwrap();
        let p2_id = p2.id.clone().unwrap();

        PlaylistService::add_song_to_playlist(&db, &p1_id, &song_id)
            .await
            .unwrap();
        PlaylistService::add_song_to_playlist(&db, &p2_id, &song_id)
            .await
            .unwrap();

        let before_p1 = PlaylistService::get_playlist(&db, &p1_id).await.unwrap();
        let before_p2 = PlaylistService::get_playlist(&db, &p2_id).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        SongService::delete_song(&db, &files, &song_id).await.unwrap();

        // --- Test 1: The song record is gone ---
        let err = SongService::get_song(&db, &song_id).await.unwrap_err();
        assert!(matches!(err, Error::SongNotFound { .. }));

        // --- Test 2: Both playlists dropped the membership ---
        let after_p1 = PlaylistService::get_playlist(&db, &p1_id).await.unwrap();
        let after_p2 = PlaylistService::get_playlist(&db, &p2_id).await.unwrap();
        assert!(!after_p1.songs.contains(&song_id));
        assert!(!after_p2.songs.contains(&song_id));

        // --- Test 3: Scrubbing counts as a modification on both playlists ---
        assert!(
            after_p1.updated_at > before_p1.updated_at,
            "updatedAt should advance when a membership is scrubbed"
        );
        assert!(after_p2.updated_at > before_p2.updated_at);

        // --- Test 4: The blob and its record are gone too ---
        let err = files.open_read_stream(&db, &stored.id).await.unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
