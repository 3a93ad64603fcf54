//! One-stop posting: truncate, illustrate, post, log

use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;

use crate::gemini::ImageGenerator;
use crate::journal::{DEFAULT_TEMPLATE, PostJournal};
use crate::prompt::truncate_tweet;
use crate::x_client::{PostedTweet, XClient};

/// What to post
#[derive(Debug, Clone, Default)]
pub struct PostRequest {
    /// Hook line, also the infographic title and the post log topic
    pub title: String,
    pub body: String,
    /// Infographic points; extracted from the body when empty
    pub points: Vec<String>,
    pub dry_run: bool,
    pub skip_image: bool,
    /// Existing image to attach instead of generating one
    pub image: Option<PathBuf>,
}

/// Everything that happened during a post, printable as JSON
#[derive(Debug, Clone, Serialize)]
pub struct PostOutcome {
    pub title: String,
    pub tweet_text: String,
    pub truncated: bool,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_error: Option<String>,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet: Option<PostedTweet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_error: Option<String>,
}

impl PostOutcome {
    /// A dry run, or a tweet that went out
    pub const fn succeeded(&self) -> bool {
        self.dry_run || self.tweet.is_some()
    }
}

/// Wires image generation, X and the post log together
///
/// Either client may be absent: without an image generator posts go out
/// without an image, and without an X client only dry runs are possible.
pub struct PostPipeline {
    x: Option<XClient>,
    images: Option<ImageGenerator>,
    journal: PostJournal,
}

impl PostPipeline {
    pub const fn new(x: Option<XClient>, images: Option<ImageGenerator>, journal: PostJournal) -> Self {
        Self { x, images, journal }
    }

    pub const fn journal(&self) -> &PostJournal {
        &self.journal
    }

    /// Run the full post flow
    ///
    /// Image generation failures only downgrade the post to text; a post
    /// failure is reported in [`PostOutcome::post_error`].
    pub async fn post_with_infographic(&self, request: &PostRequest) -> PostOutcome {
        let now = Local::now().naive_local();
        let (tweet_text, truncated) = truncate_tweet(&request.body);
        if truncated {
            tracing::warn!("Text truncated to 280 chars");
        }

        let mut outcome = PostOutcome {
            title: request.title.clone(),
            tweet_text,
            truncated,
            timestamp: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
            image_path: request.image.clone(),
            image_error: None,
            dry_run: request.dry_run,
            tweet: None,
            post_error: None,
        };

        if !request.skip_image && request.image.is_none() {
            match self.generate_image(request, now).await {
                Ok(path) => outcome.image_path = Some(path),
                Err(message) => {
                    tracing::warn!(error = %message, "Image generation failed, posting without image");
                    outcome.image_error = Some(message);
                }
            }
        }

        if request.dry_run {
            tracing::info!(
                text = %outcome.tweet_text,
                image = ?outcome.image_path,
                "[DRY RUN] Would post to X"
            );
            return outcome;
        }

        match self.publish(&outcome.tweet_text, outcome.image_path.as_deref()).await {
            Ok(tweet) => {
                if let Err(e) = self
                    .journal
                    .log_post(&tweet.url, &request.title, DEFAULT_TEMPLATE, now)
                {
                    tracing::warn!(error = %e, "Failed to write post log");
                }
                outcome.tweet = Some(tweet);
            }
            Err(message) => {
                tracing::error!(error = %message, "Post failed");
                outcome.post_error = Some(message);
            }
        }
        outcome
    }

    async fn generate_image(
        &self,
        request: &PostRequest,
        now: chrono::NaiveDateTime,
    ) -> Result<PathBuf, String> {
        let images = self
            .images
            .as_ref()
            .ok_or_else(|| "image generation is not configured".to_string())?;
        let output = self.journal.default_image_path(now);

        let result = if request.points.is_empty() {
            images
                .generate_from_content(&request.title, &request.body, &output)
                .await
        } else {
            images
                .generate_infographic(&request.title, &request.points, &output)
                .await
        };
        result.map_err(|e| e.to_string())
    }

    async fn publish(
        &self,
        text: &str,
        image: Option<&std::path::Path>,
    ) -> Result<PostedTweet, String> {
        let x = self
            .x
            .as_ref()
            .ok_or_else(|| "X credentials are not configured".to_string())?;

        let mut media_ids = Vec::new();
        if let Some(path) = image {
            media_ids.push(x.upload_media(path).await.map_err(|e| e.to_string())?);
        }
        x.create_tweet(text, &media_ids).await.map_err(|e| e.to_string())
    }
}
