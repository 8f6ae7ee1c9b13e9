use crate::app_config::AppConfig;
use crate::device::probe::{self, ProbeOutcome};
use crate::device::upload;
use crate::firmware;
use crate::inventory::DeviceRecord;
use crate::prompt;
use crate::table;
use reqwest::Client;
use std::io;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

/// One bulk-update invocation: the configuration, the shared HTTP client,
/// and the devices selected for this run. Threaded explicitly through every
/// step so no state lives outside the session.
#[derive(Debug)]
pub struct UpdateSession {
    config: Arc<AppConfig>,
    client: Client,
    devices: Vec<DeviceRecord>,
}

/// The two sequential rollout stages. Every selected device gets the minimal
/// image first, then its regular image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Minimal,
    Regular,
}

impl Phase {
    /// The minimal phase always flashes the minimal image; the regular phase
    /// uses the device's own configured variant, or the full build if it has
    /// none.
    fn variant<'a>(&self, device: &'a DeviceRecord) -> Option<&'a str> {
        match self {
            Phase::Minimal => Some("minimal"),
            Phase::Regular => device.variant.as_deref(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Completed,
    Cancelled,
}

impl UpdateSession {
    pub fn new(config: Arc<AppConfig>, client: Client, devices: Vec<DeviceRecord>) -> Self {
        UpdateSession { config, client, devices }
    }

    /// Probes every selected device in order and prints the status table. A
    /// device that does not answer becomes a placeholder row, never a failed
    /// run.
    pub async fn show_status(&self) {
        let policy = self.config.device().probe_policy();

        let mut outcomes = Vec::with_capacity(self.devices.len());
        for device in &self.devices {
            outcomes.push(probe::probe(&self.client, &policy, device).await);
        }

        println!("\n{}", table::render(&self.devices, &outcomes));
    }

    /// Runs the full two-phase update: status, confirm, minimal firmware,
    /// status, confirm, regular firmware, status. The operator sees live
    /// device state before anything is flashed.
    pub async fn run_update(&self, version: &str) -> io::Result<Outcome> {
        self.show_status().await;
        if !prompt::confirm("These devices will be updated, proceed? [Y/n] ").await? {
            info!("Update cancelled");
            return Ok(Outcome::Cancelled);
        }

        info!("🚀 Flashing the minimal firmware first. This may take a few minutes.");
        self.flash(version, Phase::Minimal).await;

        self.settle().await;
        self.show_status().await;

        if !prompt::confirm("Is everything correct? Continue with the regular firmware? [Y/n] ").await? {
            info!("Update cancelled after the minimal phase");
            return Ok(Outcome::Cancelled);
        }

        info!("🚀 Flashing the regular firmware. This may take a few minutes.");
        self.flash(version, Phase::Regular).await;

        self.settle().await;
        self.show_status().await;

        Ok(Outcome::Completed)
    }

    /// Flashes one phase across the selected devices in inventory order. A
    /// failing device is reported and skipped; the batch always runs to
    /// completion.
    #[instrument(skip(self))]
    pub async fn flash(&self, version: &str, phase: Phase) {
        let policy = self.config.device().upload_policy();

        for device in &self.devices {
            let variant = phase.variant(device);

            let artifact = match firmware::ensure_artifact(&self.client, &self.config, version, variant).await {
                Ok(path) => path,
                Err(err) => {
                    warn!("⚠️ Skipping device {}: {}", device.host, err);
                    continue;
                }
            };

            if let Err(err) = upload::upload(&self.client, &policy, device, &artifact).await {
                warn!("⚠️ {}", err);
            }
        }
    }

    /// Gives freshly flashed devices time to reboot and reconnect before the
    /// next status probe.
    async fn settle(&self) {
        sleep(self.config.core().settle_delay()).await;
    }
}
