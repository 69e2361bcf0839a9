use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Clone, Debug, Serialize, strum_macros::AsRefStr)]
#[serde(tag = "type", content = "data")]
pub enum Error {
    // -- Catalog errors.
    SongNotFound { id: String },
    PlaylistNotFound { id: String },
    SongAlreadyExistsInPlaylist { song_id: String, playlist_id: String },
    InvalidInput { reason: String },

    // -- Storage errors.
    FileNotFound { id: String },
    UnsupportedMediaType { content_type: String },
    StorageFailure(String),
    MetadataParse(String),

    ProviderError(String),
    DbError(String),
    EnvVarError(String),
    Io(String),
}

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status_code, client_error) = self.client_status_and_error();

        let response_body = serde_json::json!({
            "error": client_error.as_ref(),
            "details": self.to_string()
        });

        (status_code, Json(response_body)).into_response()
    }
}

impl Error {
    pub fn client_status_and_error(&self) -> (StatusCode, ClientError) {
        #[allow(unreachable_patterns)]
        match self {
            Self::SongNotFound { .. }
            | Self::PlaylistNotFound { .. }
            | Self::FileNotFound { .. } => (StatusCode::NOT_FOUND, ClientError::RESOURCE_NOT_FOUND),

            Self::SongAlreadyExistsInPlaylist { .. } => {
                (StatusCode::CONFLICT, ClientError::DUPLICATE_MEMBERSHIP)
            }

            Self::UnsupportedMediaType { .. } => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ClientError::UNSUPPORTED_MEDIA_TYPE,
            ),

            Self::InvalidInput { .. } => (StatusCode::BAD_REQUEST, ClientError::INVALID_PARAMS),

            Error::DbError(_) | Error::StorageFailure(_) | Error::MetadataParse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ClientError::SERVICE_ERROR,
            ),

            // Fallback
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ClientError::SERVICE_ERROR,
            ),
        }
    }
}

#[derive(Debug, strum_macros::AsRefStr)]
#[allow(non_camel_case_types)]
pub enum ClientError {
    INVALID_PARAMS,
    SERVICE_ERROR,
    RESOURCE_NOT_FOUND,
    DUPLICATE_MEMBERSHIP,
    UNSUPPORTED_MEDIA_TYPE,
}

impl From<surrealdb::Error> for Error {
    fn from(err: surrealdb::Error) -> Self {
        Error::DbError(err.to_string())
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::EnvVarError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
