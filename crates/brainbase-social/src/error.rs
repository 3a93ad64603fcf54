//! Error type for the social posting tools

use brainbase_common::{define_error_enum, impl_common_conversions};
use brainbase_config::ConfigError;

define_error_enum! {
    /// Errors raised while generating images or talking to X
    pub enum SocialError {
        #[error("HTTP error: {0}")]
        Http(reqwest::Error),

        #[error("API error: {0}")]
        Api(String),

        #[error("Image not found: {0}")]
        ImageNotFound(String),

        #[error("No image generated in response: {0}")]
        NoImage(String),
    }
}

impl_common_conversions!(SocialError, with_serde);

impl From<reqwest::Error> for SocialError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<ConfigError> for SocialError {
    fn from(e: ConfigError) -> Self {
        Self::Configuration(e.to_string())
    }
}

impl SocialError {
    /// Non-success response from `service`, body truncated for logging
    pub fn api(service: &str, status: u16, body: &str) -> Self {
        let body: String = body.chars().take(500).collect();
        Self::Api(format!("{service} returned {status}: {body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_truncates_body() {
        let body = "x".repeat(2000);
        let err = SocialError::api("X", 403, &body);
        let message = err.to_string();
        assert!(message.starts_with("API error: X returned 403: "));
        assert!(message.len() < 600);
    }

    #[test]
    fn test_config_error_converts() {
        let err: SocialError = ConfigError::MissingEnv {
            var: "GOOGLE_API_KEY".to_string(),
            alternatives: String::new(),
        }
        .into();
        assert!(matches!(err, SocialError::Configuration(ref m) if m.contains("GOOGLE_API_KEY")));
    }
}
