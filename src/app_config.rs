use crate::firmware::ArtifactNaming;
use crate::release::ReleaseSourceKind;
use crate::retry::RetryPolicy;
use config::{Config, ConfigError};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    core: Core,
    artifacts: Artifacts,
    release: ReleaseFeed,
    device: DeviceApi,
}

impl AppConfig {
    /// Every setting has a default, so the tool runs without a config file;
    /// an optional `config.toml` and environment variables override them.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("core.inventory_file", "devices.yaml")?
            .set_default("core.firmware_dir", "firmware")?
            .set_default("core.settle_delay_s", 15_i64)?
            .set_default("artifacts.base_url", "https://github.com/arendst/Tasmota")?
            .set_default("artifacts.product", "tasmota")?
            .set_default("artifacts.naming", "bin")?
            .set_default("release.source", "github-api")?
            .set_default("release.api_url", "https://api.github.com/repos/arendst/Tasmota/releases/latest")?
            .set_default("release.feed_url", "https://github.com/arendst/Tasmota/releases.atom")?
            .set_default("device.timeout_ms", 10_000_i64)?
            .set_default("device.retry_ms", 500_i64)?
            .set_default("device.retry_max_delay_ms", 5_000_i64)?
            .set_default("device.max_attempts", 5_i64)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn release(&self) -> &ReleaseFeed {
        &self.release
    }

    pub fn device(&self) -> &DeviceApi {
        &self.device
    }
}

#[derive(Debug, Deserialize)]
pub struct Core {
    inventory_file: String,
    firmware_dir: String,
    settle_delay_s: u64,
}

impl Core {
    pub fn inventory_file(&self) -> &str {
        &self.inventory_file
    }

    pub fn firmware_dir(&self) -> &str {
        &self.firmware_dir
    }

    /// How long freshly flashed devices get to reboot and reconnect before
    /// the next status probe.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_s)
    }
}

#[derive(Debug, Deserialize)]
pub struct Artifacts {
    base_url: String,
    product: String,
    naming: ArtifactNaming,
}

impl Artifacts {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn naming(&self) -> ArtifactNaming {
        self.naming
    }
}

#[derive(Debug, Deserialize)]
pub struct ReleaseFeed {
    source: ReleaseSourceKind,
    api_url: String,
    feed_url: String,
}

impl ReleaseFeed {
    pub fn source(&self) -> ReleaseSourceKind {
        self.source
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }
}

#[derive(Debug, Deserialize)]
pub struct DeviceApi {
    timeout_ms: u64,
    retry_ms: u64,
    retry_max_delay_ms: u64,
    max_attempts: usize,
}

impl DeviceApi {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn probe_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_millis(self.retry_ms),
            Duration::from_millis(self.retry_max_delay_ms),
            self.max_attempts,
        )
    }

    pub fn upload_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_millis(self.retry_ms),
            Duration::from_millis(self.retry_max_delay_ms),
            self.max_attempts,
        )
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                core: Core {
                    inventory_file: "devices.yaml".to_string(),
                    firmware_dir: "firmware".to_string(),
                    settle_delay_s: 0,
                },
                artifacts: Artifacts {
                    base_url: "https://artifacts.test".to_string(),
                    product: "tasmota".to_string(),
                    naming: ArtifactNaming::Bin,
                },
                release: ReleaseFeed {
                    source: ReleaseSourceKind::GithubApi,
                    api_url: "https://api.test/releases/latest".to_string(),
                    feed_url: "https://feed.test/releases.atom".to_string(),
                },
                device: DeviceApi {
                    timeout_ms: 5_000,
                    retry_ms: 1,
                    retry_max_delay_ms: 2,
                    max_attempts: 5,
                },
            },
        }
    }

    pub fn artifact_base_url(mut self, url: String) -> Self {
        self.config.artifacts.base_url = url;
        self
    }

    pub fn naming(mut self, naming: ArtifactNaming) -> Self {
        self.config.artifacts.naming = naming;
        self
    }

    pub fn firmware_dir(mut self, directory: String) -> Self {
        self.config.core.firmware_dir = directory;
        self
    }

    pub fn api_url(mut self, url: String) -> Self {
        self.config.release.api_url = url;
        self
    }

    pub fn feed_url(mut self, url: String) -> Self {
        self.config.release.feed_url = url;
        self
    }

    pub fn release_source(mut self, source: ReleaseSourceKind) -> Self {
        self.config.release.source = source;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
