use chrono::Utc;
use surrealdb::{engine::any::Any, Surreal};

use crate::helpers::song_helpers::song_exists;
use crate::helpers::thing_helpers::{create_playlist_thing, create_song_thing, parse_id_part};
use crate::models::database_helpers::RelationId;
use crate::models::playlist::{CreatePlaylistRequest, Playlist, UpdatePlaylistRequest};
use crate::Error;

pub struct PlaylistService;

impl PlaylistService {
    pub async fn create_playlist(
        db: &Surreal<Any>,
        playlist: CreatePlaylistRequest,
    ) -> Result<Playlist, Error> {
        if playlist.name.trim().is_empty() {
            return Err(Error::InvalidInput {
                reason: "Playlist name cannot be empty".to_string(),
            });
        }

        let now = surrealdb::sql::Datetime::from(Utc::now());

        let query = r#"
        CREATE playlist SET
            name = $name,
            description = $description,
            coverImage = $cover_image,
            songs = [],
            createdAt = $created_at,
            updatedAt = $updated_at
        RETURN id
    "#;

        let mut created_records: Vec<RelationId> = db
            .query(query)
            .bind(("name", playlist.name.clone()))
            .bind(("description", playlist.description.clone()))
            .bind(("cover_image", playlist.cover_image.clone()))
            .bind(("created_at", now.clone()))
            .bind(("updated_at", now.clone()))
            .await?
            .take(0)?;

        let playlist_thing = created_records
            .pop()
            .ok_or_else(|| Error::DbError("Playlist creation returned no record".to_string()))?
            .id;

        Ok(Playlist {
            id: Some(playlist_thing.id.to_raw()),
            name: playlist.name,
            description: playlist.description,
            cover_image: playlist.cover_image,
            songs: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub async fn get_playlist(db: &Surreal<Any>, playlist_id: &str) -> Result<Playlist, Error> {
        let playlist_thing = create_playlist_thing(playlist_id);

        let mut playlists: Vec<Playlist> = db
            .query("SELECT *, record::id(id) AS id FROM $playlist_id")
            .bind(("playlist_id", playlist_thing))
            .await?
            .take(0)?;

        playlists.pop().ok_or_else(|| Error::PlaylistNotFound {
            id: playlist_id.to_string(),
        })
    }

    pub async fn list_playlists(db: &Surreal<Any>) -> Result<Vec<Playlist>, Error> {
        let playlists: Vec<Playlist> = db
            .query(
                r#"
            SELECT *, record::id(id) AS id
            FROM playlist
            ORDER BY createdAt DESC
        "#,
            )
            .await?
            .take(0)?;

        Ok(playlists)
    }

    /// Applies only the fields present in the request, always refreshing updatedAt
    pub async fn update_playlist(
        db: &Surreal<Any>,
        playlist_id: &str,
        update: UpdatePlaylistRequest,
    ) -> Result<Playlist, Error> {
        if let Some(name) = update.name.as_deref() {
            if name.trim().is_empty() {
                return Err(Error::InvalidInput {
                    reason: "Playlist name cannot be empty".to_string(),
                });
            }
        }

        let playlist_thing = create_playlist_thing(playlist_id);

        let mut assignments = vec!["updatedAt = $updated_at"];
        if update.name.is_some() {
            assignments.push("name = $name");
        }
        if update.description.is_some() {
            assignments.push("description = $description");
        }
        if update.cover_image.is_some() {
            assignments.push("coverImage = $cover_image");
        }

        let query = format!(
            "UPDATE $playlist_id SET {} RETURN id",
            assignments.join(", ")
        );

        let mut request = db
            .query(query)
            .bind(("playlist_id", playlist_thing))
            .bind(("updated_at", surrealdb::sql::Datetime::from(Utc::now())));

        if let Some(name) = update.name {
            request = request.bind(("name", name));
        }
        if let Some(description) = update.description {
            request = request.bind(("description", description));
        }
        if let Some(cover_image) = update.cover_image {
            request = request.bind(("cover_image", cover_image));
        }

        let mut updated: Vec<RelationId> = request.await?.take(0)?;

        if updated.pop().is_none() {
            return Err(Error::PlaylistNotFound {
                id: playlist_id.to_string(),
            });
        }

        Self::get_playlist(db, playlist_id).await
    }

    pub async fn delete_playlist(db: &Surreal<Any>, playlist_id: &str) -> Result<(), Error> {
        let playlist_thing = create_playlist_thing(playlist_id);

        let mut deleted: Vec<RelationId> = db
            .query("DELETE FROM playlist WHERE id = $playlist_id RETURN BEFORE")
            .bind(("playlist_id", playlist_thing))
            .await?
            .take(0)?;

        if deleted.pop().is_none() {
            return Err(Error::PlaylistNotFound {
                id: playlist_id.to_string(),
            });
        }

        Ok(())
    }

    /// Appends a song id to the playlist, rejecting duplicates
    pub async fn add_song_to_playlist(
        db: &Surreal<Any>,
        playlist_id: &str,
        song_id: &str,
    ) -> Result<(), Error> {
        let playlist = Self::get_playlist(db, playlist_id).await?;

        if !song_exists(db, song_id).await? {
            return Err(Error::SongNotFound {
                id: song_id.to_string(),
            });
        }

        let bare_id = parse_id_part(song_id).to_string();

        if playlist.songs.iter().any(|s| parse_id_part(s) == bare_id) {
            return Err(Error::SongAlreadyExistsInPlaylist {
                song_id: song_id.to_string(),
                playlist_id: playlist_id.to_string(),
            });
        }

        let playlist_thing = create_playlist_thing(playlist_id);
        let song_thing = create_song_thing(song_id);

        // The guard re-checks membership and song liveness in one statement,
        // so an append can only land while the song record still exists
        let query = r#"
        UPDATE $playlist_id SET
            songs += $song_id,
            updatedAt = $updated_at
        WHERE songs CONTAINSNOT $song_id AND $song.id IS NOT NONE
        RETURN id
    "#;

        let mut updated: Vec<RelationId> = db
            .query(query)
            .bind(("playlist_id", playlist_thing))
            .bind(("song", song_thing))
            .bind(("song_id", bare_id))
            .bind(("updated_at", surrealdb::sql::Datetime::from(Utc::now())))
            .await?
            .take(0)?;

        if updated.pop().is_none() {
            // Lost a race: either a concurrent add of the same song, or the
            // song was deleted between the precheck and the update
            if !song_exists(db, song_id).await? {
                return Err(Error::SongNotFound {
                    id: song_id.to_string(),
                });
            }
            return Err(Error::SongAlreadyExistsInPlaylist {
                song_id: song_id.to_string(),
                playlist_id: playlist_id.to_string(),
            });
        }

        Ok(())
    }

    /// Removing a song that is not in the playlist is a no-op, not an error
    pub async fn remove_song_from_playlist(
        db: &Surreal<Any>,
        playlist_id: &str,
        song_id: &str,
    ) -> Result<(), Error> {
        let playlist_thing = create_playlist_thing(playlist_id);
        let bare_id = parse_id_part(song_id).to_string();

        let query = r#"
        UPDATE $playlist_id SET
            songs = array::complement(songs, [$song_id]),
            updatedAt = $updated_at
        RETURN id
    "#;

        let mut updated: Vec<RelationId> = db
            .query(query)
            .bind(("playlist_id", playlist_thing))
            .bind(("song_id", bare_id))
            .bind(("updated_at", surrealdb::sql::Datetime::from(Utc::now())))
            .await?
            .take(0)?;

        if updated.pop().is_none() {
            return Err(Error::PlaylistNotFound {
                id: playlist_id.to_string(),
            });
        }

        Ok(())
    }

    /// Drops a deleted song from every playlist that references it
    pub async fn scrub_song_from_playlists(
        db: &Surreal<Any>,
        song_id: &str,
    ) -> Result<(), Error> {
        let bare_id = parse_id_part(song_id).to_string();

        let query = r#"
        UPDATE playlist SET
            songs = array::complement(songs, [$song_id]),
            updatedAt = $updated_at
        WHERE songs CONTAINS $song_id
    "#;

        db.query(query)
            .bind(("song_id", bare_id))
            .bind(("updated_at", surrealdb::sql::Datetime::from(Utc::now())))
            .await?
            .check()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::song::{Song, SongSource};
    use crate::services::song_service::SongService;
    use surrealdb::engine::any::connect;

    async fn setup_db() -> Surreal<Any> {
        let db = connect("mem://").await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();
        db
    }

    fn create_request(name: &str) -> CreatePlaylistRequest {
        CreatePlaylistRequest {
            name: name.to_string(),
            description: Some("A test playlist".to_string()),
            cover_image: None,
        }
    }

    async fn insert_test_song(db: &Surreal<Any>, title: &str) -> String {
        let song = Song {
            id: None,
            title: title.to_string(),
            artist: "Artist".to_string(),
            album: None,
            duration: 180,
            cover_image: None,
            source: SongSource::Youtube,
            video_id: Some("vid".to_string()),
            audio_file_id: None,
            file_name: None,
            file_size: None,
            created_at: surrealdb::sql::Datetime::from(Utc::now()),
        };
        SongService::insert_song(db, song)
            .await
            .expect("Test song creation failed")
            .id
            .expect("Created song has no id")
    }

    #[tokio::test]
    async fn test_create_playlist_rejects_blank_name() {
        let db = setup_db().await;

        let err = PlaylistService::create_playlist(&db, create_request("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_create_and_get_playlist() {
        let db = setup_db().await;

        let created = PlaylistService::create_playlist(&db, create_request("Roadtrip"))
            .await
            .unwrap();
        let id = created.id.clone().expect("Created playlist should have an id");

        let fetched = PlaylistService::get_playlist(&db, &id).await.unwrap();
        assert_eq!(fetched.name, "Roadtrip");
        assert_eq!(fetched.description.as_deref(), Some("A test playlist"));
        assert!(fetched.songs.is_empty(), "A new playlist starts empty");
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_get_playlist_not_found() {
        let db = setup_db().await;

        let err = PlaylistService::get_playlist(&db, "nope").await.unwrap_err();
        assert!(matches!(err, Error::PlaylistNotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_playlists_newest_first() {
        let db = setup_db().await;

        PlaylistService::create_playlist(&db, create_request("Older"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        PlaylistService::create_playlist(&db, create_request("Newer"))
            .await
            .unwrap();

        let playlists = PlaylistService::list_playlists(&db).await.unwrap();
        assert_eq!(playlists.len(), 2);
        assert_eq!(playlists[0].name, "Newer");
        assert_eq!(playlists[1].name, "Older");
    }

    #[tokio::test]
    async fn test_update_playlist_partial() {
        let db = setup_db().await;

        let created = PlaylistService::create_playlist(&db, create_request("Before"))
            .await
            .unwrap();
        let id = created.id.clone().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = PlaylistService::update_playlist(
            &db,
            &id,
            UpdatePlaylistRequest {
                name: Some("After".to_string()),
                description: None,
                cover_image: None,
            },
        )
        .await
        .unwrap();

        // --- Test 1: Only the provided field changed ---
        assert_eq!(updated.name, "After");
        assert_eq!(updated.description.as_deref(), Some("A test playlist"));

        // --- Test 2: The update bumped updatedAt but not createdAt ---
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_update_playlist_not_found() {
        let db = setup_db().await;

        let err = PlaylistService::update_playlist(
            &db,
            "missing",
            UpdatePlaylistRequest {
                name: Some("Whatever".to_string()),
                description: None,
                cover_image: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::PlaylistNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_playlist() {
        let db = setup_db().await;

        let created = PlaylistService::create_playlist(&db, create_request("Doomed"))
            .await
            .unwrap();
        let id = created.id.clone().unwrap();

        PlaylistService::delete_playlist(&db, &id).await.unwrap();

        let err = PlaylistService::get_playlist(&db, &id).await.unwrap_err();
        assert!(matches!(err, Error::PlaylistNotFound { .. }));

        // Deleting again reports the missing playlist
        let err = PlaylistService::delete_playlist(&db, &id).await.unwrap_err();
        assert!(matches!(err, Error::PlaylistNotFound { .. }));
    }

    #[tokio::test]
    async fn test_add_song_to_playlist() {
        let db = setup_db().await;

        let playlist = PlaylistService::create_playlist(&db, create_request("Mix"))
            .await
            .unwrap();
        let playlist_id = playlist.id.clone().unwrap();
        let first = insert_test_song(&db, "First").await;
        let second = insert_test_song(&db, "Second").await;

        PlaylistService::add_song_to_playlist(&db, &playlist_id, &first)
            .await
            .unwrap();
        PlaylistService::add_song_to_playlist(&db, &playlist_id, &second)
            .await
            .unwrap();

        // --- Test 1: Memberships keep insertion order ---
        let fetched = PlaylistService::get_playlist(&db, &playlist_id).await.unwrap();
        assert_eq!(fetched.songs, vec![first.clone(), second.clone()]);

        // --- Test 2: A duplicate add is rejected and stored once ---
        let err = PlaylistService::add_song_to_playlist(&db, &playlist_id, &first)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SongAlreadyExistsInPlaylist { .. }));

        let fetched = PlaylistService::get_playlist(&db, &playlist_id).await.unwrap();
        let occurrences = fetched.songs.iter().filter(|s| **s == first).count();
        assert_eq!(occurrences, 1, "Song '{}' should appear exactly once", first);

        // --- Test 3: Unknown song and unknown playlist are reported ---
        let err = PlaylistService::add_song_to_playlist(&db, &playlist_id, "ghost_song")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SongNotFound { .. }));

        let err = PlaylistService::add_song_to_playlist(&db, "ghost_playlist", &first)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PlaylistNotFound { .. }));
    }

    #[tokio::test]
    async fn test_remove_song_from_playlist_is_idempotent() {
        let db = setup_db().await;

        let playlist = PlaylistService::create_playlist(&db, create_request("Mix"))
            .await
            .unwrap();
        let playlist_id = playlist.id.clone().unwrap();
        let song_id = insert_test_song(&db, "Track").await;

        PlaylistService::add_song_to_playlist(&db, &playlist_id, &song_id)
            .await
            .unwrap();

        let before = PlaylistService::get_playlist(&db, &playlist_id).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        // --- Test 1: Removing an existing membership drops it ---
        PlaylistService::remove_song_from_playlist(&db, &playlist_id, &song_id)
            .await
            .unwrap();
        let after = PlaylistService::get_playlist(&db, &playlist_id).await.unwrap();
        assert!(after.songs.is_empty());
        assert!(after.updated_at > before.updated_at);

        // --- Test 2: Removing it again still succeeds ---
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        PlaylistService::remove_song_from_playlist(&db, &playlist_id, &song_id)
            .await
            .unwrap();
        let again = PlaylistService::get_playlist(&db, &playlist_id).await.unwrap();
        assert!(again.updated_at > after.updated_at);

        // --- Test 3: A missing playlist is still an error ---
        let err = PlaylistService::remove_song_from_playlist(&db, "missing", &song_id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PlaylistNotFound { .. }));
    }

    #[tokio::test]
    async fn test_scrub_song_only_touches_affected_playlists() {
        let db = setup_db().await;

        let with_song = PlaylistService::create_playlist(&db, create_request("With"))
            .await
            .unwrap();
        let without_song = PlaylistService::create_playlist(&db, create_request("Without"))
            .await
            .unwrap();
        let with_id = with_song.id.clone().unwrap();
        let without_id = without_song.id.clone().unwrap();
        let song_id = insert_test_song(&db, "Track").await;

        PlaylistService::add_song_to_playlist(&db, &with_id, &song_id)
            .await
            .unwrap();

        let untouched_before = PlaylistService::get_playlist(&db, &without_id).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        PlaylistService::scrub_song_from_playlists(&db, &song_id)
            .await
            .unwrap();

        let scrubbed = PlaylistService::get_playlist(&db, &with_id).await.unwrap();
        assert!(scrubbed.songs.is_empty());

        let untouched_after = PlaylistService::get_playlist(&db, &without_id).await.unwrap();
        assert_eq!(
            untouched_after.updated_at, untouched_before.updated_at,
            "Playlists without the song should not be modified"
        );
    }
}
