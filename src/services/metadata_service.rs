use std::io::Write;
use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::{ItemKey, Tag};

use crate::Error;

// Probe order for each field: most specific key first
const TITLE_KEYS: &[ItemKey] = &[ItemKey::TrackTitle];
const ARTIST_KEYS: &[ItemKey] = &[ItemKey::TrackArtist, ItemKey::AlbumArtist];
const ALBUM_KEYS: &[ItemKey] = &[ItemKey::AlbumTitle, ItemKey::OriginalAlbumTitle];

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: u32,
}

pub struct MetadataService;

impl MetadataService {
    /// Best-effort tag extraction. Unreadable audio degrades to defaults
    /// derived from the file name instead of failing the ingest.
    pub fn extract(file_name: &str, content: &[u8]) -> ExtractedMetadata {
        match Self::try_extract(file_name, content) {
            Ok(metadata) => metadata,
            Err(err) => {
                tracing::warn!("Metadata extraction failed for '{}': {}", file_name, err);
                Self::default_metadata(file_name)
            }
        }
    }

    fn try_extract(file_name: &str, content: &[u8]) -> Result<ExtractedMetadata, Error> {
        // The parser sniffs the format from the extension, so the scratch
        // file keeps the original one
        let suffix = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let mut scratch = tempfile::Builder::new()
            .suffix(&suffix)
            .tempfile()
            .map_err(|err| Error::Io(err.to_string()))?;
        scratch
            .write_all(content)
            .map_err(|err| Error::Io(err.to_string()))?;

        let tagged_file = lofty::read_from_path(scratch.path())
            .map_err(|err| Error::MetadataParse(err.to_string()))?;

        let properties = tagged_file.properties();
        let duration = properties.duration().as_secs() as u32;

        let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

        let title = tag
            .and_then(|tag| Self::first_string(tag, TITLE_KEYS))
            .unwrap_or_else(|| Self::file_stem(file_name));
        let artist = tag
            .and_then(|tag| Self::first_string(tag, ARTIST_KEYS))
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let album = tag
            .and_then(|tag| Self::first_string(tag, ALBUM_KEYS))
            .unwrap_or_else(|| UNKNOWN_ALBUM.to_string());

        Ok(ExtractedMetadata {
            title,
            artist,
            album,
            duration,
        })
    }

    fn first_string(tag: &Tag, keys: &[ItemKey]) -> Option<String> {
        keys.iter().find_map(|key| {
            tag.get_string(key)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(String::from)
        })
    }

    pub fn default_metadata(file_name: &str) -> ExtractedMetadata {
        ExtractedMetadata {
            title: Self::file_stem(file_name),
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            duration: 0,
        }
    }

    fn file_stem(file_name: &str) -> String {
        Path::new(file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(file_name)
            .to_string()
    }
}
