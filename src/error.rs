//! Error types for booru-scrape
//!
//! Every failure in the pipeline is one [`Error`]. Errors fall into two groups:
//! - fatal errors abort the whole run (bad configuration, unreachable database,
//!   an invalid range or a batch wider than the page limit reaching the fetch layer)
//! - recoverable errors are logged by the caller and the run continues
//!   (network failures, bad responses, failed writes, failed file downloads)
//!
//! [`Error::is_fatal`] draws that line in one place.

use std::path::Path;
use thiserror::Error;

/// Result type alias for booru-scrape operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for booru-scrape
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key or file that caused the error (e.g., "database.json")
        key: Option<String>,
    },

    /// Database lifecycle or query failure
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A requested range has its start after its stop
    #[error("invalid range: start {start} is greater than stop {stop}")]
    InvalidRange {
        /// First post ID of the requested range
        start: i64,
        /// Exclusive upper bound of the requested range
        stop: i64,
    },

    /// A batch wider than the server page limit reached the fetch layer
    #[error("batch of {requested} posts exceeds the hard page limit of {limit}")]
    BatchTooWide {
        /// Number of post IDs covered by the batch
        requested: i64,
        /// Server-imposed page limit
        limit: i64,
    },

    /// The API answered with a non-success status
    #[error("request to {url} failed with HTTP {status}")]
    HttpStatus {
        /// HTTP status code returned by the server
        status: u16,
        /// URL that was requested
        url: String,
    },

    /// The API rejected the request because of rate limiting (HTTP 429)
    #[error("rate limited by {url}")]
    RateLimited {
        /// URL that was requested
        url: String,
    },

    /// A post has no file URL, so there is nothing to download
    #[error("post {0} has no file URL")]
    MissingFileUrl(i64),

    /// A post's file extension would not give a plain file name
    #[error("post {post_id} has an unusable file extension {file_ext:?}")]
    InvalidFileExt {
        /// Post the file belongs to
        post_id: i64,
        /// Extension as sent by the API
        file_ext: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL could not be parsed or joined
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns true if the error must abort the whole run
    ///
    /// Startup failures and programmer-invariant violations are fatal. Network,
    /// decode, persistence and file errors only affect the batch or post they
    /// happened in.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Config { .. } => true,
            Error::Database(DatabaseError::ConnectionFailed(_))
            | Error::Database(DatabaseError::MigrationFailed(_)) => true,
            Error::InvalidRange { .. } | Error::BatchTooWide { .. } => true,
            Error::Database(DatabaseError::QueryFailed(_)) => false,
            Error::Sqlx(_)
            | Error::HttpStatus { .. }
            | Error::RateLimited { .. }
            | Error::MissingFileUrl(_)
            | Error::InvalidFileExt { .. }
            | Error::Io(_)
            | Error::Network(_)
            | Error::Serialization(_)
            | Error::Url(_)
            | Error::Other(_) => false,
        }
    }

    /// Returns true if the server asked us to slow down
    ///
    /// Rate limiting is recoverable; the batch is skipped like any other
    /// failed request.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Error::RateLimited { .. } => true,
            Error::Network(e) => e.status().map(|s| s.as_u16()) == Some(429),
            _ => false,
        }
    }
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Builds a configuration error for a file that could not be read or parsed
pub(crate) fn config_file_error(path: &Path, reason: impl std::fmt::Display) -> Error {
    Error::Config {
        message: format!("could not load {}: {}", path.display(), reason),
        key: path
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_and_invariant_errors_are_fatal() {
        let fatal = vec![
            Error::Config {
                message: "missing".into(),
                key: Some("database.json".into()),
            },
            Error::Database(DatabaseError::ConnectionFailed("refused".into())),
            Error::Database(DatabaseError::MigrationFailed("locked".into())),
            Error::InvalidRange { start: 10, stop: 5 },
            Error::BatchTooWide {
                requested: 21,
                limit: 20,
            },
        ];

        for err in fatal {
            assert!(err.is_fatal(), "{err} should be fatal");
        }
    }

    #[test]
    fn test_runtime_errors_are_recoverable() {
        let recoverable = vec![
            Error::HttpStatus {
                status: 500,
                url: "https://example.com/posts.json".into(),
            },
            Error::RateLimited {
                url: "https://example.com/posts.json".into(),
            },
            Error::MissingFileUrl(7),
            Error::InvalidFileExt {
                post_id: 7,
                file_ext: "../x".into(),
            },
            Error::Database(DatabaseError::QueryFailed("constraint".into())),
            Error::Io(std::io::Error::other("disk full")),
            Error::Other("anything".into()),
        ];

        for err in recoverable {
            assert!(!err.is_fatal(), "{err} should be recoverable");
        }
    }

    #[test]
    fn test_rate_limit_classification() {
        assert!(Error::RateLimited { url: "u".into() }.is_rate_limited());
        assert!(
            !Error::HttpStatus {
                status: 503,
                url: "u".into()
            }
            .is_rate_limited()
        );
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = Error::BatchTooWide {
            requested: 25,
            limit: 20,
        };
        assert_eq!(
            err.to_string(),
            "batch of 25 posts exceeds the hard page limit of 20"
        );

        let err = config_file_error(
            Path::new("/home/u/.config/x/database.json"),
            "not found",
        );
        match err {
            Error::Config { message, key } => {
                assert!(message.contains("database.json"));
                assert!(message.contains("not found"));
                assert_eq!(key.as_deref(), Some("database.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
