//! Infographic generation through Gemini `generateContent`

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::{Result, SocialError};
use crate::prompt::{DEFAULT_STYLE, extract_points, infographic_prompt};
use brainbase_config::GeminiConfig;

const SERVICE: &str = "Gemini";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

/// Gemini image model client
#[derive(Debug, Clone)]
pub struct ImageGenerator {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl ImageGenerator {
    /// # Errors
    ///
    /// Returns `SocialError::Http` if the HTTP client cannot be built
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
        })
    }

    /// Render an infographic for `topic` and write it to `output`
    ///
    /// # Errors
    ///
    /// Returns API errors, `SocialError::NoImage` when the response carries no
    /// inline image, or an I/O error writing the file
    pub async fn generate_infographic(
        &self,
        topic: &str,
        points: &[String],
        output: &Path,
    ) -> Result<PathBuf> {
        let prompt = infographic_prompt(topic, points, DEFAULT_STYLE);
        tracing::info!(model = %self.model, topic, points = points.len(), "Generating infographic");

        let image = self.generate_image(&prompt).await?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, image).await?;
        tracing::info!(path = %output.display(), "Image saved");
        Ok(output.to_path_buf())
    }

    /// Infographic from a post: points are extracted from the body
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate_infographic`]
    pub async fn generate_from_content(
        &self,
        title: &str,
        body: &str,
        output: &Path,
    ) -> Result<PathBuf> {
        let points = extract_points(body);
        self.generate_infographic(title, &points, output).await
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseModalities": ["IMAGE", "TEXT"] }
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Gemini request failed");
            return Err(SocialError::api(SERVICE, status.as_u16(), &text));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)?;
        let parts = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        let mut model_text = Vec::new();
        for part in parts {
            if let Some(inline) = part.inline_data {
                tracing::debug!(mime_type = %inline.mime_type, "Received inline image");
                return BASE64_STANDARD
                    .decode(inline.data.as_bytes())
                    .map_err(|e| SocialError::Parse(format!("inline image data: {e}")));
            }
            if let Some(text) = part.text {
                model_text.push(text);
            }
        }

        Err(SocialError::NoImage(if model_text.is_empty() {
            "empty response".to_string()
        } else {
            model_text.join(" ")
        }))
    }
}
