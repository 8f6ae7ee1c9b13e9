use crate::inventory::DeviceRecord;
use crate::retry::RetryPolicy;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio_retry::Retry;
use tracing::{info, instrument, warn};

/// Pushes a cached firmware image to the device's upload endpoint. The
/// artifact must already be in the local cache; a missing file is a
/// precondition error, not a transport failure.
#[instrument(skip_all, fields(host = %device.host))]
pub async fn upload(
    client: &Client,
    policy: &RetryPolicy,
    device: &DeviceRecord,
    artifact: &Path,
) -> Result<(), UploadError> {
    let bytes = fs::read(artifact).await.map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => UploadError::FirmwareNotFound {
            path: artifact.to_path_buf(),
        },
        _ => UploadError::Io(err),
    })?;

    let filename = artifact
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("firmware.bin")
        .to_string();
    let url = format!("http://{}/u2", device.host);

    info!("⬆️ Uploading {} to {}...", filename, device.host);
    Retry::spawn(policy.strategy(), || async {
        let part = Part::bytes(bytes.clone()).file_name(filename.clone());
        let form = Form::new().part("file", part);
        client.post(&url).multipart(form).send().await?.error_for_status()?;
        Ok::<(), reqwest::Error>(())
    })
    .await
    .map_err(|source| {
        warn!("⚠️ Upload to {} failed after {} attempts", device.host, policy.max_attempts());
        UploadError::UpdateFailed {
            host: device.host.clone(),
            source,
        }
    })?;

    info!("⬆️ Uploading {} to {}... OK", filename, device.host);
    Ok(())
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("the firmware file '{}' is missing from the local cache", .path.display())]
    FirmwareNotFound { path: PathBuf },
    #[error("could not upload the firmware to device {host}: {source}")]
    UpdateFailed { host: String, source: reqwest::Error },
    #[error(transparent)]
    Io(io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::time::Duration;

    fn device(host: String) -> DeviceRecord {
        DeviceRecord {
            id: "plug_office".to_string(),
            host,
            name: "Office".to_string(),
            username: "admin".to_string(),
            password: "hunter2".to_string(),
            variant: None,
        }
    }

    fn quick_policy() -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(1), Duration::from_millis(2), 5)
    }

    async fn artifact(name: &str) -> PathBuf {
        let path = temp_dir().join(name);
        fs::write(&path, b"firmware bytes").await.expect("could not write the artifact");
        path
    }

    #[tokio::test]
    async fn upload_posts_the_artifact_as_multipart() -> Result<(), UploadError> {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/u2")
            .match_header("content-type", mockito::Matcher::Regex("^multipart/form-data".to_string()))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let path = artifact("upload_ok.bin").await;
        upload(&Client::new(), &quick_policy(), &device(server.host_with_port()), &path).await?;

        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn upload_requires_the_artifact_to_exist() {
        let path = temp_dir().join("no_such_firmware.bin");

        let result = upload(&Client::new(), &quick_policy(), &device("192.0.2.1".to_string()), &path).await;

        assert!(matches!(result, Err(UploadError::FirmwareNotFound { .. })));
    }

    #[tokio::test]
    async fn upload_fails_the_device_after_exhausting_the_retry_budget() {
        let mut server = mockito::Server::new_async().await;

        let mock = server.mock("POST", "/u2").with_status(500).expect(5).create_async().await;

        let path = artifact("upload_exhausted.bin").await;
        let result = upload(&Client::new(), &quick_policy(), &device(server.host_with_port()), &path).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(UploadError::UpdateFailed { .. })));
    }
}
