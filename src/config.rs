use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};

use crate::release::{GitHubSource, RepoId};

const USER_AGENT: &str = "proseflow-site";

/// Wiring for the release metadata lookup.
pub struct Config {
    pub source: GitHubSource,
    pub repo: RepoId,
}

impl Config {
    /// Build from explicit values. `token`, when set, is sent as a bearer token.
    ///
    /// A token that cannot be sent as a header is skipped with a warning and
    /// the lookup goes out unauthenticated.
    pub fn new(api_url: Option<String>, repo: Option<RepoId>, token: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(mut auth_value) => {
                    auth_value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, auth_value);
                    debug!("Using GITHUB_TOKEN for authentication: {}", mask(&token));
                }
                Err(e) => warn!("Ignoring GITHUB_TOKEN, not a valid header value: {}", e),
            }
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        let source = match api_url {
            Some(url) => GitHubSource::with_api_url(client, &url),
            None => GitHubSource::new(client),
        };

        Ok(Self {
            source,
            repo: repo.unwrap_or_else(RepoId::proseflow),
        })
    }

    /// Like [`Config::new`], taking the token from `GITHUB_TOKEN`.
    pub fn from_env(api_url: Option<String>, repo: Option<RepoId>) -> Result<Self> {
        Self::new(api_url, repo, std::env::var("GITHUB_TOKEN").ok())
    }
}

fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
