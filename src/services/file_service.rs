use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use surrealdb::{engine::any::Any, Surreal};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::helpers::thing_helpers::{create_audio_file_thing, parse_id_part};
use crate::models::audio_file::AudioFile;
use crate::models::database_helpers::RelationId;
use crate::Error;

/// Streamed blobs are handed back in chunks of at most this size
pub const STREAM_CHUNK_SIZE: usize = 1024 * 1024;

const STAGING_DIR: &str = ".tmp";

#[derive(Clone)]
pub struct FileService {
    root: PathBuf,
}

pub struct StoredFile {
    pub id: String,
    pub size: u64,
}

pub struct AudioStream {
    file: File,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
}

impl AudioStream {
    pub fn into_chunk_stream(self) -> ReaderStream<File> {
        ReaderStream::with_capacity(self.file, STREAM_CHUNK_SIZE)
    }
}

impl FileService {
    pub fn init(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        std::fs::create_dir_all(root.join(STAGING_DIR)).map_err(|err| {
            Error::StorageFailure(format!("Could not prepare '{}': {}", root.display(), err))
        })?;
        Ok(Self { root })
    }

    fn blob_path(&self, file_id: &str) -> PathBuf {
        self.root.join(parse_id_part(file_id))
    }

    fn staging_path(&self, file_id: &str) -> PathBuf {
        self.root.join(STAGING_DIR).join(format!("{file_id}.part"))
    }

    /// Writes the blob to a staging file, moves it into place, then registers
    /// it. The blob only becomes reachable once the record exists.
    pub async fn store(
        &self,
        db: &Surreal<Any>,
        file_name: &str,
        content_type: &str,
        content: &[u8],
    ) -> Result<StoredFile, Error> {
        let file_id = Uuid::new_v4().to_string();
        let staging = self.staging_path(&file_id);
        let target = self.blob_path(&file_id);

        if let Err(err) = Self::write_blob(&staging, content).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(Error::StorageFailure(format!(
                "Could not write blob: {}",
                err
            )));
        }

        if let Err(err) = tokio::fs::rename(&staging, &target).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(Error::StorageFailure(format!(
                "Could not move blob into place: {}",
                err
            )));
        }

        let size = content.len() as u64;
        if let Err(err) = Self::create_record(db, &file_id, file_name, content_type, size).await {
            let _ = tokio::fs::remove_file(&target).await;
            return Err(err);
        }

        Ok(StoredFile { id: file_id, size })
    }

    async fn write_blob(path: &Path, content: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        Ok(())
    }

    async fn create_record(
        db: &Surreal<Any>,
        file_id: &str,
        file_name: &str,
        content_type: &str,
        size: u64,
    ) -> Result<(), Error> {
        let file_thing = create_audio_file_thing(file_id);

        let query = r#"
        CREATE $file_id SET
            fileName = $file_name,
            contentType = $content_type,
            size = $size,
            createdAt = $created_at
        RETURN id
    "#;

        let mut created: Vec<RelationId> = db
            .query(query)
            .bind(("file_id", file_thing))
            .bind(("file_name", file_name.to_string()))
            .bind(("content_type", content_type.to_string()))
            .bind(("size", size))
            .bind(("created_at", surrealdb::sql::Datetime::from(Utc::now())))
            .await?
            .take(0)?;

        created.pop().ok_or_else(|| {
            Error::DbError("Audio file registration returned no record".to_string())
        })?;

        Ok(())
    }

    pub async fn get_record(
        &self,
        db: &Surreal<Any>,
        file_id: &str,
    ) -> Result<Option<AudioFile>, Error> {
        let file_thing = create_audio_file_thing(file_id);

        let mut records: Vec<AudioFile> = db
            .query("SELECT *, record::id(id) AS id FROM $file_id")
            .bind(("file_id", file_thing))
            .await?
            .take(0)?;

        Ok(records.pop())
    }

    /// Opens a stored blob for streaming. The record is the source of truth;
    /// without one the blob does not exist, whatever is on disk.
    pub async fn open_read_stream(
        &self,
        db: &Surreal<Any>,
        file_id: &str,
    ) -> Result<AudioStream, Error> {
        let record =
            self.get_record(db, file_id)
                .await?
                .ok_or_else(|| Error::FileNotFound {
                    id: file_id.to_string(),
                })?;

        let path = self.blob_path(file_id);
        let file = File::open(&path).await.map_err(|err| {
            Error::StorageFailure(format!("Could not open blob '{}': {}", path.display(), err))
        })?;

        Ok(AudioStream {
            file,
            file_name: record.file_name,
            content_type: record.content_type,
            size: record.size,
        })
    }

    /// Removes the record first, then the blob. A blob already missing on
    /// disk is tolerated as long as the record existed.
    pub async fn delete(&self, db: &Surreal<Any>, file_id: &str) -> Result<(), Error> {
        let file_thing = create_audio_file_thing(file_id);

        let mut deleted: Vec<RelationId> = db
            .query("DELETE FROM audio_file WHERE id = $file_id RETURN BEFORE")
            .bind(("file_id", file_thing))
            .await?
            .take(0)?;

        if deleted.pop().is_none() {
            return Err(Error::FileNotFound {
                id: file_id.to_string(),
            });
        }

        match tokio::fs::remove_file(self.blob_path(file_id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::StorageFailure(format!(
                "Could not remove blob '{}': {}",
                file_id, err
            ))),
        }
    }
}
