//! GitHub release source.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::http::{HttpClient, RetryPolicy};

use super::{LatestRelease, ReleaseSource, RepoId};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Release {
        #[serde(default)]
        pub tag_name: String,
        pub name: Option<String>,
        pub published_at: Option<String>,
    }
}

/// Release lookup against the GitHub REST API.
///
/// The page asks for the version once, so the default client makes a
/// single attempt per lookup.
pub struct GitHubSource {
    http_client: HttpClient,
    api_url: String,
}

impl GitHubSource {
    /// Source for the public GitHub API.
    pub fn new(client: Client) -> Self {
        Self::with_api_url(client, DEFAULT_API_URL)
    }

    /// Source for a custom API base URL; a trailing slash is dropped.
    pub fn with_api_url(client: Client, api_url: &str) -> Self {
        Self::from_http_client(HttpClient::with_policy(client, RetryPolicy::once()), api_url)
    }

    /// Source over an already configured client, keeping its retry policy.
    pub fn from_http_client(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// The underlying HTTP client.
    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

#[async_trait]
impl ReleaseSource for GitHubSource {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    #[tracing::instrument(skip(self))]
    async fn latest_release(&self, repo: &RepoId) -> Result<LatestRelease> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_url, repo.owner, repo.repo
        );
        debug!("Fetching latest release from {}...", url);

        let release: api::Release = self.http_client.get_json(&url).await?;

        Ok(LatestRelease {
            tag: release.tag_name,
            name: release.name,
            published_at: release.published_at,
        })
    }
}
