use axum::{extract::State, routing::post, Json, Router};

use crate::models::youtube::{YouTubeSearchRequest, YouTubeSearchResponse};
use crate::{AppState, Result};

pub struct YouTubeRoutes;

impl YouTubeRoutes {
    pub fn routes() -> Router<AppState> {
        Router::new().route("/search", post(search_handler))
    }
}

async fn search_handler(
    State(state): State<AppState>,
    Json(payload): Json<YouTubeSearchRequest>,
) -> Result<Json<YouTubeSearchResponse>> {
    let results = state
        .youtube
        .search(&payload.query, payload.max_results)
        .await;

    Ok(Json(YouTubeSearchResponse { results }))
}
