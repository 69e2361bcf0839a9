use lazy_regex::regex;
use serde::Deserialize;

use crate::models::youtube::YouTubeSearchResult;
use crate::Error;

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

#[derive(Clone)]
pub struct YouTubeService {
    client: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    #[serde(rename = "contentDetails")]
    content_details: ContentDetails,
}

#[derive(Deserialize)]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Deserialize, Default)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Deserialize)]
struct ContentDetails {
    duration: String,
}

impl Thumbnails {
    fn best_url(self) -> String {
        self.high
            .or(self.medium)
            .or(self.default)
            .map(|thumbnail| thumbnail.url)
            .unwrap_or_default()
    }
}

impl YouTubeService {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    /// Searches the music category. Provider trouble degrades to an empty
    /// result list so the rest of the API stays usable without a key.
    pub async fn search(&self, query: &str, max_results: u32) -> Vec<YouTubeSearchResult> {
        match self.try_search(query, max_results).await {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!("YouTube search failed: {}", err);
                Vec::new()
            }
        }
    }

    async fn try_search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<YouTubeSearchResult>, Error> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::EnvVarError("YOUTUBE_API_KEY is not set".to_string()))?;

        let max_results = max_results.to_string();
        let search: SearchListResponse = self
            .client
            .get(SEARCH_ENDPOINT)
            .query(&[
                ("part", "id,snippet"),
                ("q", query),
                ("maxResults", max_results.as_str()),
                ("type", "video"),
                ("videoCategoryId", "10"),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|err| Error::ProviderError(format!("Search request failed: {}", err)))?
            .error_for_status()
            .map_err(|err| Error::ProviderError(format!("Search request failed: {}", err)))?
            .json()
            .await
            .map_err(|err| Error::ProviderError(format!("Malformed search response: {}", err)))?;

        let video_ids: Vec<String> = search
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();

        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        // Durations only come from the videos endpoint, one batched call
        let ids = video_ids.join(",");
        let videos: VideoListResponse = self
            .client
            .get(VIDEOS_ENDPOINT)
            .query(&[
                ("part", "contentDetails,snippet"),
                ("id", ids.as_str()),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|err| Error::ProviderError(format!("Videos request failed: {}", err)))?
            .error_for_status()
            .map_err(|err| Error::ProviderError(format!("Videos request failed: {}", err)))?
            .json()
            .await
            .map_err(|err| Error::ProviderError(format!("Malformed videos response: {}", err)))?;

        videos
            .items
            .into_iter()
            .map(|item| {
                let duration_seconds = parse_iso8601_duration(&item.content_details.duration)
                    .ok_or_else(|| {
                        Error::ProviderError(format!(
                            "Unparseable duration '{}' for video '{}'",
                            item.content_details.duration, item.id
                        ))
                    })?;
                let (artist, title) = parse_video_title(&item.snippet.title);

                Ok(YouTubeSearchResult {
                    video_id: item.id,
                    title,
                    artist,
                    thumbnail: item.snippet.thumbnails.best_url(),
                    duration: format_duration(duration_seconds),
                    duration_seconds,
                })
            })
            .collect()
    }
}

/// Splits a video title into (artist, title), trying " - ", then ": ",
/// then a case-insensitive " by " with the roles reversed
pub fn parse_video_title(video_title: &str) -> (String, String) {
    if let Some((artist, title)) = video_title.split_once(" - ") {
        return (artist.trim().to_string(), title.trim().to_string());
    }

    if let Some((artist, title)) = video_title.split_once(": ") {
        return (artist.trim().to_string(), title.trim().to_string());
    }

    let mut parts = regex!(" by "i).splitn(video_title, 2);
    if let (Some(title), Some(artist)) = (parts.next(), parts.next()) {
        return (artist.trim().to_string(), title.trim().to_string());
    }

    ("Unknown Artist".to_string(), video_title.trim().to_string())
}

/// Parses ISO 8601 durations of the shape P[nD]T[nH][nM][nS]
pub fn parse_iso8601_duration(duration: &str) -> Option<u32> {
    let rest = duration.strip_prefix('P')?;
    let (days_part, time_part) = match rest.split_once('T') {
        Some((days, time)) => (days, time),
        None => (rest, ""),
    };

    let mut total: u32 = 0;

    if !days_part.is_empty() {
        let days = days_part.strip_suffix('D')?;
        total = total.checked_add(days.parse::<u32>().ok()?.checked_mul(86_400)?)?;
    }

    let mut value = String::new();
    for c in time_part.chars() {
        if c.is_ascii_digit() {
            value.push(c);
            continue;
        }

        let amount: u32 = value.parse().ok()?;
        value.clear();

        let multiplier = match c {
            'H' => 3_600,
            'M' => 60,
            'S' => 1,
            _ => return None,
        };
        total = total.checked_add(amount.checked_mul(multiplier)?)?;
    }

    if !value.is_empty() {
        // Trailing digits without a unit
        return None;
    }

    Some(total)
}

/// Formats seconds as m:ss with unbounded minutes, so 3600 becomes "60:00"
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
