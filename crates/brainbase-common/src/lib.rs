//! Common utilities shared by the brainbase ops tools
//!
//! Error plumbing, `.env` loading, logging setup and run identifiers.

pub mod error;
pub mod init;
pub mod logging;
pub mod redact;

pub use error::{CommonError, ReportContext};
pub use init::initialize_environment;
pub use logging::{LogGuards, LoggingOptions, init_logging};
pub use redact::{redact_secret, redact_url_password};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier attached to every log line of a single command invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generate a new run ID using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RunId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}
