//! HTTP access to the image-board API
//!
//! [`BooruClient`] requests one page of posts per [`IdRange`] and downloads
//! post files. The worker only sees the [`PostSource`] trait, so tests can
//! substitute a fake source.
//!
//! The API has no lower-bound filter: a page is requested with
//! `tags=id:<{end}` and comes back in descending ID order, so everything below
//! `range.start` is cut off after decoding.

use crate::config::{ApiConfig, Credentials};
use crate::error::{Error, Result};
use crate::partition::{IdRange, PAGE_LIMIT, check_batch_width};
use crate::types::Post;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

/// Source of posts and post files
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch all posts whose ID falls inside `range`
    async fn fetch_range(&self, range: IdRange) -> Result<Vec<Post>>;

    /// Save the post's file as `<id>.<ext>` inside `dir`, returning its path
    async fn download_file(&self, post: &Post, dir: &Path) -> Result<PathBuf>;
}

/// Client for a Danbooru-compatible API
#[derive(Clone)]
pub struct BooruClient {
    http: reqwest::Client,
    endpoint: Url,
    credentials: Option<Credentials>,
}

impl BooruClient {
    /// Build a client with the configured timeout and user agent
    ///
    /// # Errors
    /// Returns error if the endpoint is not a valid base URL or the HTTP
    /// client cannot be created
    pub fn new(api: &ApiConfig, credentials: Option<Credentials>) -> Result<Self> {
        let mut endpoint = Url::parse(&api.endpoint).map_err(|e| Error::Config {
            message: format!("invalid API endpoint {}: {}", api.endpoint, e),
            key: Some("endpoint".to_string()),
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::Config {
                message: format!("API endpoint {} cannot be a base URL", api.endpoint),
                key: Some("endpoint".to_string()),
            });
        }
        // Keep a trailing slash so joins append instead of replacing the last segment
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(api.timeout)
            .user_agent(api.user_agent.as_str())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            credentials,
        })
    }

    /// URL of the page holding the posts of `range`
    pub fn posts_url(&self, range: IdRange) -> Result<Url> {
        let mut url = self.endpoint.join("posts.json")?;
        url.query_pairs_mut()
            .append_pair("tags", &format!("id:<{}", range.end))
            .append_pair("limit", &PAGE_LIMIT.to_string());
        Ok(url)
    }

    /// Absolute URL of a post's file
    ///
    /// Relative file URLs are resolved against the API endpoint.
    pub fn file_url(&self, post: &Post) -> Result<Url> {
        let file_url = post.file_url().ok_or(Error::MissingFileUrl(post.id))?;
        Ok(self.endpoint.join(file_url)?)
    }

    /// Send a GET request and reject non-success statuses
    async fn get(&self, url: Url, authenticated: bool) -> Result<reqwest::Response> {
        let mut request = self.http.get(url.clone());
        if authenticated {
            if let Some(credentials) = &self.credentials {
                request = request.basic_auth(&credentials.login, Some(&credentials.api_key));
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl PostSource for BooruClient {
    async fn fetch_range(&self, range: IdRange) -> Result<Vec<Post>> {
        check_batch_width(range, PAGE_LIMIT)?;

        let url = self.posts_url(range)?;
        debug!(%range, %url, "Requesting posts");

        let response = self.get(url, true).await?;
        let body = response.bytes().await?;
        let posts: Vec<Post> = serde_json::from_slice(&body)?;

        Ok(trim_to_range(posts, range))
    }

    async fn download_file(&self, post: &Post, dir: &Path) -> Result<PathBuf> {
        let url = self.file_url(post)?;
        let path = dir.join(post.file_name()?);
        let mut response = self.get(url, false).await?;

        let mut file = tokio::fs::File::create(&path).await?;

        let written = async {
            let mut digest = md5::Context::new();
            while let Some(chunk) = response.chunk().await? {
                digest.consume(&chunk);
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            Ok::<_, Error>(format!("{:x}", digest.compute()))
        }
        .await;

        match written {
            Ok(actual) => {
                if let Some(expected) = post.md5.as_deref() {
                    if !expected.eq_ignore_ascii_case(&actual) {
                        warn!(
                            post_id = post.id,
                            expected = %expected,
                            actual = %actual,
                            "MD5 mismatch for saved file"
                        );
                    }
                }
                Ok(path)
            }
            Err(e) => {
                drop(file);
                let _ = tokio::fs::remove_file(&path).await;
                Err(e)
            }
        }
    }
}

/// Drop the trailing posts whose ID is below `range.start`
///
/// Pages arrive in descending ID order, so everything from the first post
/// below the range onwards is cut.
pub(crate) fn trim_to_range(mut posts: Vec<Post>, range: IdRange) -> Vec<Post> {
    if let Some(cut) = posts.iter().position(|p| p.id < range.start) {
        posts.truncate(cut);
    }
    posts
}
