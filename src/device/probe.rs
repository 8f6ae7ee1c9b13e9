use crate::inventory::DeviceRecord;
use crate::retry::RetryPolicy;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio_retry::Retry;
use tracing::{instrument, warn};

/// What a device reports about itself through `status 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatus {
    pub friendly_name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Status(DeviceStatus),
    Unreachable,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(rename = "Status")]
    status: StatusSection,
    #[serde(rename = "StatusFWR")]
    firmware: FirmwareSection,
}

#[derive(Debug, Deserialize)]
struct StatusSection {
    #[serde(rename = "FriendlyName")]
    friendly_name: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FirmwareSection {
    #[serde(rename = "Version")]
    version: String,
}

/// Queries a device's live status under the retry policy. Exhausting the
/// attempt budget is not an error: an unreachable device becomes a
/// placeholder in the status table, never a failed run.
#[instrument(skip_all, fields(host = %device.host))]
pub async fn probe(client: &Client, policy: &RetryPolicy, device: &DeviceRecord) -> ProbeOutcome {
    let result = Retry::spawn(policy.strategy(), || fetch_status(client, device)).await;

    match result {
        Ok(status) => ProbeOutcome::Status(status),
        Err(err) => {
            warn!(
                "⚠️ Device {} did not answer after {} attempts: {}",
                device.host,
                policy.max_attempts(),
                err
            );
            ProbeOutcome::Unreachable
        }
    }
}

async fn fetch_status(client: &Client, device: &DeviceRecord) -> Result<DeviceStatus, ProbeError> {
    let response = client
        .get(format!("http://{}/cm", device.host))
        .query(&[
            ("user", device.username.as_str()),
            ("password", device.password.as_str()),
            ("cmnd", "status 0"),
        ])
        .send()
        .await?
        .error_for_status()?;

    let status = response.json::<StatusResponse>().await?;
    let friendly_name = status
        .status
        .friendly_name
        .into_iter()
        .next()
        .ok_or(ProbeError::MissingFriendlyName)?;

    Ok(DeviceStatus {
        friendly_name,
        version: status.firmware.version,
    })
}

#[derive(Error, Debug)]
enum ProbeError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("the status response has no friendly name")]
    MissingFriendlyName,
}
