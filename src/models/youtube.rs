use serde::{Deserialize, Serialize};

fn default_max_results() -> u32 {
    10
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeSearchRequest {
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeSearchResult {
    pub video_id: String,
    pub title: String,
    pub artist: String,
    pub thumbnail: String,
    pub duration: String,
    pub duration_seconds: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct YouTubeSearchResponse {
    pub results: Vec<YouTubeSearchResult>,
}
