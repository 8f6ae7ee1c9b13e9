use crate::app_config::AppConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

/// A resolved target release: the human-readable release name and the bare
/// version string used in artifact URLs and cache paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub name: String,
    pub version: String,
}

/// A version string becomes a path and URL segment, so anything that could
/// escape the cache root is rejected up front.
pub fn validate_version(version: &str) -> Result<(), ReleaseError> {
    if version.trim().is_empty() {
        return Err(ReleaseError::EmptyVersion);
    }

    if version.contains(['/', '\\']) || version.contains("..") {
        return Err(ReleaseError::InvalidVersion(version.to_string()));
    }

    Ok(())
}

/// Where "latest" is resolved from. Both sources answer the same logical
/// question; the configuration picks one.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseSourceKind {
    GithubApi,
    AtomFeed,
}

#[async_trait]
pub trait ReleaseSource {
    async fn latest(&self, client: &Client) -> Result<Release, ReleaseError>;
}

pub fn source_for(config: &AppConfig) -> Box<dyn ReleaseSource + Send + Sync> {
    match config.release().source() {
        ReleaseSourceKind::GithubApi => Box::new(GithubApi {
            url: config.release().api_url().to_string(),
        }),
        ReleaseSourceKind::AtomFeed => Box::new(AtomFeed {
            url: config.release().feed_url().to_string(),
        }),
    }
}

#[derive(Debug)]
pub struct GithubApi {
    url: String,
}

#[derive(Debug, Deserialize)]
struct LatestReleaseResponse {
    name: String,
    tag_name: String,
}

#[async_trait]
impl ReleaseSource for GithubApi {
    #[instrument(skip_all)]
    async fn latest(&self, client: &Client) -> Result<Release, ReleaseError> {
        info!("Looking up the latest release...");
        let response = client.get(&self.url).send().await?.error_for_status()?;
        let release = response.json::<LatestReleaseResponse>().await?;

        let version = release.tag_name.trim_start_matches('v').to_string();
        validate_version(&version)?;

        info!("Looking up the latest release... OK, {}", release.name);
        Ok(Release {
            name: release.name,
            version,
        })
    }
}

#[derive(Debug)]
pub struct AtomFeed {
    url: String,
}

#[async_trait]
impl ReleaseSource for AtomFeed {
    #[instrument(skip_all)]
    async fn latest(&self, client: &Client) -> Result<Release, ReleaseError> {
        info!("Looking up the latest release from the feed...");
        let feed = client.get(&self.url).send().await?.error_for_status()?.text().await?;

        let tag = first_tag(&feed).ok_or(ReleaseError::MalformedFeed)?;
        let version = tag.trim_start_matches('v').to_string();
        validate_version(&version)?;

        info!("Looking up the latest release from the feed... OK, {}", tag);
        Ok(Release {
            name: tag.to_string(),
            version,
        })
    }
}

/// The releases feed links every entry as `…/releases/tag/<tag>`, newest
/// entry first.
fn first_tag(feed: &str) -> Option<&str> {
    let marker = "/releases/tag/";
    let start = feed.find(marker)? + marker.len();
    let rest = &feed[start..];
    let end = rest.find(['"', '<'])?;

    (!rest[..end].is_empty()).then_some(&rest[..end])
}

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("the version must not be empty")]
    EmptyVersion,
    #[error("'{0}' is not a valid version")]
    InvalidVersion(String),
    #[error("release lookup failed: {0}")]
    Lookup(#[from] reqwest::Error),
    #[error("the release feed does not contain a release tag")]
    MalformedFeed,
}
