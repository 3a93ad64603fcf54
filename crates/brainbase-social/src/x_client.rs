//! X (Twitter) client: media upload, tweet creation and credential check

use std::path::Path;

use reqwest::{Client, Method, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Result, SocialError};
use crate::oauth::OAuth1Signer;
use brainbase_config::XConfig;

const SERVICE: &str = "X";
const STATUS_URL_PREFIX: &str = "https://x.com/i/web/status/";

/// A created tweet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedTweet {
    pub id: String,
    pub url: String,
}

impl PostedTweet {
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let url = format!("{STATUS_URL_PREFIX}{id}");
        Self { id, url }
    }
}

/// The authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XAccount {
    pub id: String,
    pub username: String,
    pub name: String,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct CreatedTweet {
    id: String,
}

#[derive(Deserialize)]
struct UploadedMedia {
    media_id_string: String,
}

/// User-context client signing every request with OAuth 1.0a
#[derive(Debug, Clone)]
pub struct XClient {
    client: Client,
    signer: OAuth1Signer,
    api_url: String,
    upload_url: String,
}

impl XClient {
    /// # Errors
    ///
    /// Returns `SocialError::Http` if the HTTP client cannot be built
    pub fn new(config: &XConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            signer: OAuth1Signer::from_config(config),
            api_url: config.api_url.clone(),
            upload_url: config.upload_url.clone(),
        })
    }

    /// Upload an image through the v1.1 media endpoint
    ///
    /// # Errors
    ///
    /// Returns `SocialError::ImageNotFound` if the file is missing, otherwise
    /// HTTP or API errors from the upload
    pub async fn upload_media(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(SocialError::ImageNotFound(path.display().to_string()));
        }
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for(path))?;
        let form = reqwest::multipart::Form::new().part("media", part);

        let url = format!("{}/1.1/media/upload.json", self.upload_url);
        let auth = self.signer.authorization_header("POST", &url, &[])?;
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .multipart(form)
            .send()
            .await?;

        let media: UploadedMedia = parse(response).await?;
        tracing::info!(media_id = %media.media_id_string, "Media uploaded");
        Ok(media.media_id_string)
    }

    /// Create a tweet, optionally with attached media
    ///
    /// # Errors
    ///
    /// Returns HTTP or API errors from the v2 tweets endpoint
    pub async fn create_tweet(&self, text: &str, media_ids: &[String]) -> Result<PostedTweet> {
        let mut body = json!({ "text": text });
        if !media_ids.is_empty() {
            body["media"] = json!({ "media_ids": media_ids });
        }

        let response = self
            .signed(Method::POST, "/2/tweets")?
            .json(&body)
            .send()
            .await?;
        let created: DataEnvelope<CreatedTweet> = parse(response).await?;

        let tweet = PostedTweet::from_id(created.data.id);
        tracing::info!(url = %tweet.url, "Tweet posted");
        Ok(tweet)
    }

    /// Look up the account the credentials belong to
    ///
    /// # Errors
    ///
    /// Returns HTTP or API errors, typically 401 for bad credentials
    pub async fn verify_credentials(&self) -> Result<XAccount> {
        let response = self.signed(Method::GET, "/2/users/me")?.send().await?;
        let me: DataEnvelope<XAccount> = parse(response).await?;
        Ok(me.data)
    }

    fn signed(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let url = format!("{}{path}", self.api_url);
        let auth = self
            .signer
            .authorization_header(method.as_str(), &url, &[])?;
        Ok(self
            .client
            .request(method, &url)
            .header(reqwest::header::AUTHORIZATION, auth))
    }
}

async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        tracing::error!(status = status.as_u16(), body = %body, "X API request failed");
        return Err(SocialError::api(SERVICE, status.as_u16(), &body));
    }
    Ok(serde_json::from_str(&body)?)
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}
