use shared::model::NewExerciseMedia;
use tracing::instrument;

use super::{search_images, search_videos, IntegrationError};
use crate::cli::Cli;

/// Runs the video and image searches side by side. Videos come first in the
/// result
#[instrument(skip(client, args))]
pub async fn search_media(
    client: &reqwest::Client,
    args: &Cli,
    exercise_name: &str,
) -> Result<Vec<NewExerciseMedia>, IntegrationError> {
    let (videos, images) = tokio::try_join!(
        search_videos(client, &args.youtube_search_url, args.youtube_api_key.as_deref(), exercise_name),
        search_images(client, &args.unsplash_search_url, args.unsplash_access_key.as_deref(), exercise_name),
    )?;

    Ok(videos.into_iter().chain(images).collect())
}
