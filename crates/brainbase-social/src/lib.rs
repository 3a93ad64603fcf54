//! Social posting helpers for Brainbase
//!
//! - [`oauth`]: OAuth 1.0a HMAC-SHA1 signing
//! - [`x_client`]: media upload, tweet creation, credential check
//! - [`gemini`]: infographic generation
//! - [`prompt`]: prompt template, point extraction, tweet truncation
//! - [`journal`]: post log and drafts
//! - [`post`]: the end-to-end post flow

pub mod error;
pub mod gemini;
pub mod journal;
pub mod oauth;
pub mod post;
pub mod prompt;
pub mod x_client;

pub use error::{Result, SocialError};
pub use gemini::ImageGenerator;
pub use journal::PostJournal;
pub use oauth::OAuth1Signer;
pub use post::{PostOutcome, PostPipeline, PostRequest};
pub use prompt::{extract_points, truncate_tweet};
pub use x_client::{PostedTweet, XAccount, XClient};
