mod admin_key;
mod filter;
#[cfg(test)]
pub(crate) mod in_memory;
mod types;

pub use admin_key::AdminApiKey;
pub use filter::{Clause, Filter};
pub use types::*;

use crate::utils::error_chain_fmt;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use types::{ErrorsEnvelope, NewslettersEnvelope, PostsEnvelope};

const ADMIN_API_PATH: &str = "ghost/api/admin/";

#[derive(thiserror::Error)]
pub enum GhostError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("Failed to sign an Admin API token")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Update collision: {0}")]
    Conflict(String),

    #[error("Ghost responded with {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Ghost response did not contain {0}")]
    MissingItem(&'static str),
}

impl std::fmt::Debug for GhostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// The subset of the Ghost Admin API the cron handlers rely on.
#[async_trait]
pub trait GhostApi: Send + Sync {
    async fn browse_posts(&self, query: &BrowseQuery) -> Result<PostPage, GhostError>;

    async fn read_post(&self, id: &str) -> Result<Post, GhostError>;

    /// Fails with [`GhostError::Conflict`] when `updated_at` is stale.
    async fn edit_post(
        &self,
        id: &str,
        updated_at: &str,
        patch: &PostPatch,
    ) -> Result<Post, GhostError>;

    async fn add_post(&self, post: &NewPost, options: &AddOptions) -> Result<Post, GhostError>;

    async fn browse_newsletters(&self) -> Result<Vec<Newsletter>, GhostError>;

    fn editor_url(&self, post_id: &str) -> String;
}

#[derive(Debug)]
pub struct GhostClient {
    http_client: Client,
    base_url: Url,
    admin_key: AdminApiKey,
    api_version: String,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    posts: [&'a T; 1],
}

#[derive(Serialize)]
struct EditEntry<'a> {
    updated_at: &'a str,
    #[serde(flatten)]
    patch: &'a PostPatch,
}

impl GhostClient {
    pub fn new(
        mut base_url: Url,
        admin_key: AdminApiKey,
        api_version: String,
        timeout: Duration,
    ) -> Result<Self, GhostError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        // Without a trailing slash `join` would replace the last path segment
        // of sites hosted under a subdirectory.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http_client,
            base_url,
            admin_key,
            api_version,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GhostError> {
        Ok(self.base_url.join(ADMIN_API_PATH)?.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, GhostError> {
        let token = self.admin_key.token(Utc::now())?;

        Ok(self
            .http_client
            .request(method, url)
            .header(AUTHORIZATION, format!("Ghost {}", token.expose_secret()))
            .header("Accept-Version", &self.api_version))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GhostError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response
            .json::<ErrorsEnvelope>()
            .await
            .ok()
            .and_then(|body| body.errors.into_iter().next())
            .map(|error| match error.context {
                Some(context) => format!("{} {}", error.message, context),
                None => error.message,
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

        if status == StatusCode::CONFLICT {
            return Err(GhostError::Conflict(message));
        }

        Err(GhostError::Status { status, message })
    }

    fn single_post(envelope: PostsEnvelope) -> Result<Post, GhostError> {
        envelope
            .posts
            .into_iter()
            .next()
            .ok_or(GhostError::MissingItem("a post"))
    }
}

#[async_trait]
impl GhostApi for GhostClient {
    #[tracing::instrument(name = "Browse Ghost posts", skip_all, fields(filter = %query.filter, page = ?query.page))]
    async fn browse_posts(&self, query: &BrowseQuery) -> Result<PostPage, GhostError> {
        let url = self.endpoint("posts/")?;
        let request = self.request(Method::GET, url)?.query(&query.to_query_pairs());

        let envelope: PostsEnvelope = self.send(request).await?;
        let pagination = match envelope.meta {
            Some(meta) => meta.pagination,
            None => Pagination {
                page: 1,
                pages: 1,
                total: envelope.posts.len() as u64,
                ..Pagination::default()
            },
        };

        Ok(PostPage {
            posts: envelope.posts,
            pagination,
        })
    }

    #[tracing::instrument(name = "Read Ghost post", skip(self))]
    async fn read_post(&self, id: &str) -> Result<Post, GhostError> {
        let url = self.endpoint(&format!("posts/{id}/"))?;
        let request = self.request(Method::GET, url)?;
        Self::single_post(self.send(request).await?)
    }

    #[tracing::instrument(name = "Edit Ghost post", skip(self, patch))]
    async fn edit_post(
        &self,
        id: &str,
        updated_at: &str,
        patch: &PostPatch,
    ) -> Result<Post, GhostError> {
        let url = self.endpoint(&format!("posts/{id}/"))?;
        let entry = EditEntry { updated_at, patch };
        let body = Envelope { posts: [&entry] };
        let request = self.request(Method::PUT, url)?.json(&body);
        Self::single_post(self.send(request).await?)
    }

    #[tracing::instrument(name = "Add Ghost post", skip_all, fields(title = %post.title, status = %post.status))]
    async fn add_post(&self, post: &NewPost, options: &AddOptions) -> Result<Post, GhostError> {
        let url = self.endpoint("posts/")?;
        let body = Envelope { posts: [post] };
        let request = self
            .request(Method::POST, url)?
            .query(&options.to_query_pairs(post.html.is_some()))
            .json(&body);
        Self::single_post(self.send(request).await?)
    }

    #[tracing::instrument(name = "Browse Ghost newsletters", skip(self))]
    async fn browse_newsletters(&self) -> Result<Vec<Newsletter>, GhostError> {
        let url = self.endpoint("newsletters/")?;
        let request = self
            .request(Method::GET, url)?
            .query(&[("limit", Limit::All.to_query_value())]);
        let envelope: NewslettersEnvelope = self.send(request).await?;
        Ok(envelope.newsletters)
    }

    fn editor_url(&self, post_id: &str) -> String {
        format!("{}ghost/#/editor/post/{}", self.base_url, post_id)
    }
}
