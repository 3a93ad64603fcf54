//! Shared helpers for the social integration tests

#![allow(dead_code)]

use brainbase_config::{GeminiConfig, XConfig};
use brainbase_social::{ImageGenerator, XClient};
use wiremock::MockServer;

pub const GEMINI_MODEL: &str = "gemini-test-image";

/// 8-byte PNG signature, base64 encoded
pub const PNG_SIGNATURE_B64: &str = "iVBORw0KGgo=";
pub const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

pub fn x_config(server: &MockServer) -> XConfig {
    XConfig {
        consumer_key: "consumer-key".to_string(),
        consumer_secret: "consumer-secret".to_string(),
        access_token: "access-token".to_string(),
        access_token_secret: "access-secret".to_string(),
        api_url: server.uri(),
        upload_url: server.uri(),
        timeout_seconds: 5,
    }
}

pub fn x_client(server: &MockServer) -> XClient {
    XClient::new(&x_config(server)).unwrap()
}

pub fn image_generator(server: &MockServer) -> ImageGenerator {
    ImageGenerator::new(&GeminiConfig {
        api_key: "google-key".to_string(),
        api_url: server.uri(),
        model: GEMINI_MODEL.to_string(),
        timeout_seconds: 5,
    })
    .unwrap()
}

pub fn generate_path() -> String {
    format!("/v1beta/models/{GEMINI_MODEL}:generateContent")
}
