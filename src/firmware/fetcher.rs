use crate::app_config::AppConfig;
use crate::firmware::naming;
use crate::release::{self, ReleaseError};
use futures::StreamExt;
use reqwest::Client;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Makes sure the firmware image for `(version, variant)` is in the local
/// cache and returns its path. An image that is already cached is never
/// downloaded again.
#[instrument(skip(client, config))]
pub async fn ensure_artifact(
    client: &Client,
    config: &AppConfig,
    version: &str,
    variant: Option<&str>,
) -> Result<PathBuf, DownloadError> {
    release::validate_version(version)?;

    let filename = naming::filename(config.artifacts().product(), variant, config.artifacts().naming());
    let directory = PathBuf::from(config.core().firmware_dir()).join(version);
    let path = directory.join(&filename);

    if fs::try_exists(&path).await? {
        debug!("{} is already cached", path.display());
        return Ok(path);
    }

    fs::create_dir_all(&directory).await?;

    let url = format!("{}/releases/download/v{}/{}", config.artifacts().base_url(), version, filename);
    info!("⬇️ Downloading {}...", filename);
    let response = client.get(&url).send().await?.error_for_status()?;

    // Stream to a temp file first so an aborted transfer never leaves a
    // half-written image at the cache path.
    let temp_path = directory.join(format!("{filename}.part"));
    let mut file = fs::File::create(&temp_path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    fs::rename(&temp_path, &path).await?;

    info!("⬇️ Downloading {}... OK", filename);
    Ok(path)
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error(transparent)]
    InvalidVersion(#[from] ReleaseError),
    #[error("download failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
