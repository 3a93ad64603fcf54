//! Error plumbing shared by the ops crates
//!
//! Each crate owns its error enum; the macros here give those enums the same
//! catch-all variants and conversions so the CLI can treat them alike.

use std::fmt;

/// Constructors for the catch-all variants every ops error enum carries
pub trait CommonError: std::error::Error + Send + Sync + 'static {
    /// Filesystem or socket failure
    fn io_error(msg: impl Into<String>) -> Self
    where
        Self: Sized;

    /// Missing or unusable settings; the CLI exits with 2 for these
    fn config_error(msg: impl Into<String>) -> Self
    where
        Self: Sized;

    fn parse_error(msg: impl Into<String>) -> Self
    where
        Self: Sized;

    fn other_error(msg: impl Into<String>) -> Self
    where
        Self: Sized;
}

/// Flatten an error into a report line prefixed with what was being done.
///
/// Migration reports collect failures as strings and keep going.
pub trait ReportContext<T> {
    /// `"{what}: {error}"` on failure
    fn report_context(self, what: impl fmt::Display) -> Result<T, String>;
}

impl<T, E> ReportContext<T> for Result<T, E>
where
    E: fmt::Display,
{
    fn report_context(self, what: impl fmt::Display) -> Result<T, String> {
        self.map_err(|e| format!("{what}: {e}"))
    }
}

/// Implement `From` conversions for the error types every tool touches.
///
/// Generates:
/// - `From<std::io::Error>` -> `io_error`
/// - `From<anyhow::Error>` -> `other_error`
/// - `From<serde_json::Error>` -> `parse_error` (with the `with_serde` variant)
#[macro_export]
macro_rules! impl_common_conversions {
    ($error_type:ident) => {
        impl From<std::io::Error> for $error_type {
            fn from(e: std::io::Error) -> Self {
                <$error_type as $crate::CommonError>::io_error(e.to_string())
            }
        }

        impl From<anyhow::Error> for $error_type {
            fn from(e: anyhow::Error) -> Self {
                <$error_type as $crate::CommonError>::other_error(e.to_string())
            }
        }
    };

    ($error_type:ident, with_serde) => {
        impl_common_conversions!($error_type);

        impl From<serde_json::Error> for $error_type {
            fn from(e: serde_json::Error) -> Self {
                <$error_type as $crate::CommonError>::parse_error(format!("JSON: {e}"))
            }
        }
    };
}

/// Define an error enum with the common variants (`Io`, `Configuration`,
/// `Parse`, `Other`) plus any crate specific ones.
///
/// # Example
/// ```no_run
/// # use brainbase_common::define_error_enum;
/// define_error_enum! {
///     pub enum PostError {
///         #[error("Upstream rejected the request: {0}")]
///         Rejected(String),
///     }
/// }
/// ```
#[macro_export]
macro_rules! define_error_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident($variant_type:ty),
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, thiserror::Error)]
        pub enum $name {
            #[error("IO error: {0}")]
            Io(String),

            #[error("Configuration error: {0}")]
            Configuration(String),

            #[error("Parse error: {0}")]
            Parse(String),

            #[error("Other error: {0}")]
            Other(String),

            $(
                $(#[$variant_meta])*
                $variant($variant_type),
            )*
        }

        impl $crate::CommonError for $name {
            fn io_error(msg: impl Into<String>) -> Self {
                Self::Io(msg.into())
            }

            fn config_error(msg: impl Into<String>) -> Self {
                Self::Configuration(msg.into())
            }

            fn parse_error(msg: impl Into<String>) -> Self {
                Self::Parse(msg.into())
            }

            fn other_error(msg: impl Into<String>) -> Self {
                Self::Other(msg.into())
            }
        }

        /// Specialized Result type
        pub type Result<T> = std::result::Result<T, $name>;
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    enum TestError {
        #[error("IO error: {0}")]
        Io(String),
        #[error("Configuration error: {0}")]
        Configuration(String),
        #[error("Parse error: {0}")]
        Parse(String),
        #[error("Other error: {0}")]
        Other(String),
    }

    impl CommonError for TestError {
        fn io_error(msg: impl Into<String>) -> Self {
            Self::Io(msg.into())
        }

        fn config_error(msg: impl Into<String>) -> Self {
            Self::Configuration(msg.into())
        }

        fn parse_error(msg: impl Into<String>) -> Self {
            Self::Parse(msg.into())
        }

        fn other_error(msg: impl Into<String>) -> Self {
            Self::Other(msg.into())
        }
    }

    #[test]
    fn test_catch_all_constructors() {
        let err = TestError::config_error("NOCODB_TOKEN is not set");
        assert_eq!(err.to_string(), "Configuration error: NOCODB_TOKEN is not set");
        assert!(matches!(TestError::parse_error("bad yaml"), TestError::Parse(_)));
        assert!(matches!(TestError::io_error("reset"), TestError::Io(_)));
        assert!(matches!(TestError::other_error("?"), TestError::Other(_)));
    }

    #[test]
    fn test_report_context_prefixes_the_step() {
        let result: Result<(), TestError> = Err(TestError::io_error("connection reset"));
        assert_eq!(
            result.report_context("record fetch failed").unwrap_err(),
            "record fetch failed: IO error: connection reset"
        );

        let ok: Result<u8, TestError> = Ok(3);
        assert_eq!(ok.report_context("unused"), Ok(3));
    }
}
