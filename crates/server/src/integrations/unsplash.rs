use serde::Deserialize;
use shared::model::{MediaType, NewExerciseMedia};
use tracing::{debug, instrument, warn};

use super::{check_status, IntegrationError};

const SERVICE: &str = "unsplash";
pub const UNSPLASH_SEARCH_URL: &str = "https://api.unsplash.com/search/photos";
pub const UNSPLASH_PER_PAGE: u32 = 3;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    alt_description: Option<String>,
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
    thumb: Option<String>,
}

pub fn unsplash_query(exercise_name: &str) -> String {
    format!("{exercise_name} exercise fitness")
}

fn images_from_response(response: SearchResponse, exercise_name: &str) -> Vec<NewExerciseMedia> {
    response
        .results
        .into_iter()
        .map(|photo| NewExerciseMedia {
            media_type: MediaType::Image,
            url: photo.urls.regular,
            thumbnail_url: photo.urls.thumb,
            title: photo
                .alt_description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| exercise_name.to_owned()),
        })
        .collect()
}

/// Searches Unsplash for illustrative photos. Without an access key the search
/// is skipped and nothing is returned
#[instrument(skip(client, endpoint, access_key))]
pub async fn search_images(
    client: &reqwest::Client,
    endpoint: &str,
    access_key: Option<&str>,
    exercise_name: &str,
) -> Result<Vec<NewExerciseMedia>, IntegrationError> {
    let Some(access_key) = access_key.filter(|k| !k.is_empty()) else {
        warn!("Unsplash access key not configured, skipping image search");
        return Ok(vec![]);
    };

    let per_page = UNSPLASH_PER_PAGE.to_string();
    let response = client
        .get(endpoint)
        .header(reqwest::header::AUTHORIZATION, format!("Client-ID {access_key}"))
        .query(&[("query", unsplash_query(exercise_name).as_str()), ("per_page", per_page.as_str())])
        .send()
        .await
        .map_err(IntegrationError::request(SERVICE))?;

    let response: SearchResponse = check_status(SERVICE, response)
        .await?
        .json()
        .await
        .map_err(IntegrationError::request(SERVICE))?;

    let images = images_from_response(response, exercise_name);
    debug!(found = images.len(), "Unsplash search done");
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_exercise_name_for_title() {
        let response: SearchResponse = serde_json::from_value(serde_json::json!({
            "total": 2,
            "results": [
                {
                    "id": "p1",
                    "alt_description": "woman stretching on a mat",
                    "urls": { "regular": "https://images.unsplash.com/p1", "thumb": "https://images.unsplash.com/p1-thumb" }
                },
                {
                    "id": "p2",
                    "alt_description": null,
                    "urls": { "regular": "https://images.unsplash.com/p2", "thumb": "https://images.unsplash.com/p2-thumb" }
                }
            ]
        }))
        .unwrap();

        let images = images_from_response(response, "Bird dog");
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].title, "woman stretching on a mat");
        assert_eq!(images[1].title, "Bird dog");
        assert_eq!(images[1].media_type, MediaType::Image);
        assert_eq!(images[1].thumbnail_url.as_deref(), Some("https://images.unsplash.com/p2-thumb"));
    }

    #[tokio::test]
    async fn skipped_without_key() {
        let images = search_images(&reqwest::Client::new(), UNSPLASH_SEARCH_URL, Some(""), "Bird dog").await.unwrap();
        assert!(images.is_empty());
    }
}
