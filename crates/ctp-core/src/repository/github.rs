//! Template repositories hosted on GitHub
//!
//! Metadata comes from the repository endpoint of the REST API and the
//! template itself from the zipball endpoint.

use super::{RepositoryFetcher, RepositoryIdentity, RepositoryMetadata};
use crate::config::Settings;
use crate::error::{CtpError, Result};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use url::Url;

const GITHUB_JSON: &str = "application/vnd.github+json";

/// Subset of `GET /repos/{owner}/{repo}` that ctp needs
#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    default_branch: String,
    updated_at: DateTime<Utc>,
}

/// Fetcher backed by the GitHub REST API
pub struct GithubFetcher {
    api_url: Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl GithubFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(api_url: Url, user_agent: &str, token: Option<String>) -> Self {
        Self {
            api_url,
            token,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Create a fetcher from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.api_url.clone(),
            &settings.user_agent,
            settings.token.clone(),
        )
    }

    /// Build an API URL by appending path segments, preserving query parameters
    fn build_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("URL cannot have path segments: {}", self.api_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        let mut request = self.client.get(url.clone()).header(ACCEPT, GITHUB_JSON);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|source| CtpError::Http {
            url: url.to_string(),
            source,
        })?;

        if !response.status().is_success() {
            return Err(CtpError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl RepositoryFetcher for GithubFetcher {
    async fn metadata(&self, identity: &RepositoryIdentity) -> Result<RepositoryMetadata> {
        let url = self.build_url(&["repos", identity.owner(), identity.repo()])?;
        tracing::debug!(%url, "fetching repository metadata");

        let response = self.get(url.clone()).await?;
        let body: RepositoryResponse = response.json().await.map_err(|source| CtpError::Http {
            url: url.to_string(),
            source,
        })?;

        Ok(RepositoryMetadata {
            default_ref: body.default_branch,
            updated_at: body.updated_at.timestamp_millis(),
        })
    }

    async fn archive(&self, identity: &RepositoryIdentity, reference: &str) -> Result<Vec<u8>> {
        let url = self.build_url(&["repos", identity.owner(), identity.repo(), "zipball", reference])?;
        tracing::debug!(%url, "downloading template archive");

        let response = self.get(url.clone()).await?;
        let bytes = response.bytes().await.map_err(|source| CtpError::Http {
            url: url.to_string(),
            source,
        })?;

        Ok(bytes.to_vec())
    }
}
