use serde::Deserialize;
use shared::model::{MediaType, NewExerciseMedia};
use tracing::{debug, instrument, warn};

use super::{check_status, IntegrationError};

const SERVICE: &str = "youtube";
pub const YOUTUBE_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
pub const YOUTUBE_MAX_RESULTS: u32 = 3;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    id: VideoId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

pub fn youtube_query(exercise_name: &str) -> String {
    format!("{exercise_name} physical therapy exercise")
}

fn videos_from_response(response: SearchResponse) -> Vec<NewExerciseMedia> {
    response
        .items
        .into_iter()
        // Channels and playlists have no video id
        .filter_map(|item| {
            let video_id = item.id.video_id?;
            let thumbnails = item.snippet.thumbnails;
            Some(NewExerciseMedia {
                media_type: MediaType::Video,
                url: format!("https://www.youtube.com/watch?v={video_id}"),
                thumbnail_url: thumbnails
                    .high
                    .or(thumbnails.medium)
                    .or(thumbnails.default)
                    .map(|t| t.url),
                title: item.snippet.title,
            })
        })
        .collect()
}

/// Searches YouTube for demonstration videos. Without an API key the search
/// is skipped and nothing is returned
#[instrument(skip(client, endpoint, api_key))]
pub async fn search_videos(
    client: &reqwest::Client,
    endpoint: &str,
    api_key: Option<&str>,
    exercise_name: &str,
) -> Result<Vec<NewExerciseMedia>, IntegrationError> {
    let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
        warn!("YouTube API key not configured, skipping video search");
        return Ok(vec![]);
    };

    let max_results = YOUTUBE_MAX_RESULTS.to_string();
    let response = client
        .get(endpoint)
        .query(&[
            ("part", "snippet"),
            ("type", "video"),
            ("q", youtube_query(exercise_name).as_str()),
            ("maxResults", max_results.as_str()),
            ("key", api_key),
        ])
        .send()
        .await
        .map_err(IntegrationError::request(SERVICE))?;

    let response: SearchResponse = check_status(SERVICE, response)
        .await?
        .json()
        .await
        .map_err(IntegrationError::request(SERVICE))?;

    let videos = videos_from_response(response);
    debug!(found = videos.len(), "YouTube search done");
    Ok(videos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_watch_urls_and_skips_non_videos() {
        let response: SearchResponse = serde_json::from_value(serde_json::json!({
            "items": [
                {
                    "id": { "kind": "youtube#video", "videoId": "abc123" },
                    "snippet": {
                        "title": "Heel slides for knee rehab",
                        "thumbnails": { "high": { "url": "https://i.ytimg.com/vi/abc123/hqdefault.jpg" } }
                    }
                },
                {
                    "id": { "kind": "youtube#channel", "channelId": "xyz" },
                    "snippet": { "title": "A channel", "thumbnails": {} }
                },
                {
                    "id": { "videoId": "def456" },
                    "snippet": {
                        "title": "No high thumbnail",
                        "thumbnails": { "default": { "url": "https://i.ytimg.com/vi/def456/default.jpg" } }
                    }
                }
            ]
        }))
        .unwrap();

        let videos = videos_from_response(response);
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(videos[0].media_type, MediaType::Video);
        assert_eq!(
            videos[0].thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/abc123/hqdefault.jpg")
        );
        assert_eq!(
            videos[1].thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/def456/default.jpg")
        );
    }

    #[test]
    fn query_mentions_physical_therapy() {
        assert_eq!(youtube_query("Clamshells"), "Clamshells physical therapy exercise");
    }

    #[tokio::test]
    async fn skipped_without_key() {
        let videos = search_videos(&reqwest::Client::new(), YOUTUBE_SEARCH_URL, None, "Clamshells").await.unwrap();
        assert!(videos.is_empty());
    }
}
