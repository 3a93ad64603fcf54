//! X posting, credential check and standalone infographics

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use brainbase_config::{GeminiConfig, PathsConfig, XConfig};
use brainbase_social::{ImageGenerator, PostJournal, PostOutcome, PostPipeline, PostRequest, XClient};
use chrono::{Local, NaiveDateTime};
use serde_json::json;
use tracing::{info, warn};

use super::{Outcome, checked};
use crate::cli::PostArgs;

fn journal() -> PostJournal {
    PostJournal::new(PathsConfig::from_env().sns_dir)
}

fn x_client() -> anyhow::Result<XClient> {
    let config = checked(XConfig::from_env()).context("X credentials")?;
    Ok(XClient::new(&config)?)
}

/// Image generation is optional; without a key posts go out as text
fn image_generator() -> anyhow::Result<Option<ImageGenerator>> {
    match checked(GeminiConfig::from_env()) {
        Ok(config) => Ok(Some(ImageGenerator::new(&config)?)),
        Err(e) => {
            warn!("Image generation disabled: {e}");
            Ok(None)
        }
    }
}

fn print_outcome(outcome: &PostOutcome) {
    if outcome.dry_run {
        println!("[DRY RUN] {}", outcome.tweet_text);
    }
    if let Some(path) = &outcome.image_path {
        println!("Image: {}", path.display());
    }
    if let Some(error) = &outcome.image_error {
        println!("Image skipped: {error}");
    }
    if let Some(tweet) = &outcome.tweet {
        println!("Posted: {}", tweet.url);
    }
    if let Some(error) = &outcome.post_error {
        println!("Post failed: {error}");
    }
}

/// Only the points given on the command line go into the draft
fn save_draft(
    journal: &PostJournal,
    args: &PostArgs,
    now: NaiveDateTime,
) -> anyhow::Result<PathBuf> {
    journal
        .save_draft(&args.title, &args.body, &args.points, now)
        .context("saving draft")
}

pub async fn post(args: &PostArgs) -> anyhow::Result<Outcome> {
    let journal = journal();

    if args.save_draft {
        let path = save_draft(&journal, args, Local::now().naive_local())?;
        println!("Draft saved to {}", path.display());
        return Ok(Outcome::Success);
    }

    // a dry run can go ahead without X credentials
    let x = if args.dry_run {
        x_client()
            .inspect_err(|e| warn!("X client unavailable: {e:#}"))
            .ok()
    } else {
        Some(x_client()?)
    };
    let images = if args.skip_image || args.image.is_some() {
        None
    } else {
        image_generator()?
    };

    let request = PostRequest {
        title: args.title.clone(),
        body: args.body.clone(),
        points: args.points.clone(),
        dry_run: args.dry_run,
        skip_image: args.skip_image,
        image: args.image.clone(),
    };
    let outcome = PostPipeline::new(x, images, journal)
        .post_with_infographic(&request)
        .await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(if outcome.succeeded() {
        Outcome::Success
    } else {
        Outcome::Failed
    })
}

pub async fn verify_x(as_json: bool) -> anyhow::Result<Outcome> {
    let client = x_client()?;
    match client.verify_credentials().await {
        Ok(account) => {
            if as_json {
                println!(
                    "{}",
                    json!({"valid": true, "username": account.username, "name": account.name, "id": account.id})
                );
            } else {
                println!("Authenticated as @{} ({})", account.username, account.name);
            }
            Ok(Outcome::Success)
        }
        Err(e) => {
            if as_json {
                println!("{}", json!({"valid": false, "error": e.to_string()}));
            } else {
                println!("X credentials rejected: {e}");
            }
            Ok(Outcome::Failed)
        }
    }
}

pub async fn infographic(
    topic: &str,
    points: &[String],
    output: Option<&Path>,
) -> anyhow::Result<Outcome> {
    let config = checked(GeminiConfig::from_env()).context("Gemini settings")?;
    let generator = ImageGenerator::new(&config)?;

    let output = output.map_or_else(
        || journal().default_image_path(Local::now().naive_local()),
        Path::to_path_buf,
    );
    let path = generator
        .generate_infographic(topic, points, &output)
        .await
        .context("generating infographic")?;

    info!(path = %path.display(), "Infographic ready");
    println!("{}", path.display());
    Ok(Outcome::Success)
}
