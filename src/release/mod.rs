//! Latest release metadata.
//!
//! The site shows the latest published version next to the download button.
//! The lookup is best effort: the download links point at evergreen
//! "latest release" URLs and work whether or not this succeeds.

mod github;

use anyhow::{Result, bail};
use async_trait::async_trait;
use log::{debug, error};
use std::fmt;
use std::str::FromStr;

pub use github::GitHubSource;

use crate::download::FALLBACK_VERSION;

/// Repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    /// The repository the site distributes.
    pub fn proseflow() -> Self {
        Self {
            owner: "LSXPrime".to_string(),
            repo: "ProseFlow".to_string(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(RepoId {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => bail!("Invalid repository format. Expected 'owner/repo'."),
        }
    }
}

/// The most recent published release of a repository.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LatestRelease {
    /// Version tag (e.g., "v1.0.0")
    pub tag: String,
    pub name: Option<String>,
    pub published_at: Option<String>,
}

impl LatestRelease {
    /// The tag without a single leading `v`, or `None` for an empty tag.
    pub fn version(&self) -> Option<&str> {
        let version = self.tag.strip_prefix('v').unwrap_or(&self.tag);
        (!version.is_empty()).then_some(version)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    fn api_url(&self) -> &str;

    async fn latest_release(&self, repo: &RepoId) -> Result<LatestRelease>;
}

/// Version label for display. Any failure is logged and yields
/// [`FALLBACK_VERSION`].
#[tracing::instrument(skip(source))]
pub async fn fetch_latest_version(source: &dyn ReleaseSource, repo: &RepoId) -> String {
    match source.latest_release(repo).await {
        Ok(release) => match release.version() {
            Some(version) => {
                debug!("Latest release of {} is {}", repo, version);
                version.to_string()
            }
            None => {
                error!("Latest release of {} has no tag", repo);
                FALLBACK_VERSION.to_string()
            }
        },
        Err(e) => {
            error!("Failed to fetch latest release version: {:#}", e);
            FALLBACK_VERSION.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn test_repo_id_parse() {
        let repo: RepoId = "LSXPrime/ProseFlow".parse().unwrap();
        assert_eq!(repo, RepoId::proseflow());
        assert_eq!(repo.to_string(), "LSXPrime/ProseFlow");

        for bad in ["", "owner", "/repo", "owner/", "a/b/c"] {
            assert!(bad.parse::<RepoId>().is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_version_strips_single_v() {
        let release = |tag: &str| LatestRelease {
            tag: tag.to_string(),
            ..Default::default()
        };

        assert_eq!(release("v1.2.0").version(), Some("1.2.0"));
        assert_eq!(release("1.2.0").version(), Some("1.2.0"));
        assert_eq!(release("vv2").version(), Some("v2"));
        assert_eq!(release("v").version(), None);
        assert_eq!(release("").version(), None);
    }

    #[tokio::test]
    async fn test_fetch_latest_version_success() {
        let mut source = MockReleaseSource::new();
        source
            .expect_latest_release()
            .with(eq(RepoId::proseflow()))
            .times(1)
            .returning(|_| {
                Ok(LatestRelease {
                    tag: "v0.9.1".to_string(),
                    ..Default::default()
                })
            });

        let version = fetch_latest_version(&source, &RepoId::proseflow()).await;
        assert_eq!(version, "0.9.1");
    }

    #[tokio::test]
    async fn test_fetch_latest_version_failure_falls_back() {
        let mut source = MockReleaseSource::new();
        source
            .expect_latest_release()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("network unreachable")));

        let version = fetch_latest_version(&source, &RepoId::proseflow()).await;
        assert_eq!(version, "latest");
    }

    #[tokio::test]
    async fn test_fetch_latest_version_empty_tag_falls_back() {
        let mut source = MockReleaseSource::new();
        source
            .expect_latest_release()
            .returning(|_| Ok(LatestRelease::default()));

        let version = fetch_latest_version(&source, &RepoId::proseflow()).await;
        assert_eq!(version, "latest");
    }
}
