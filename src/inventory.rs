use serde::Deserialize;
use serde_yaml_ng::Mapping;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument};

/// One device as declared in the inventory file. Records are not validated
/// beyond their presence; a missing host or credential surfaces later as a
/// connection failure, not a load-time error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceRecord {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub variant: Option<String>,
}

/// Reads the device inventory, preserving the declaration order of the YAML
/// mapping. Ordinals shown in the selection UI are derived from this order.
#[instrument]
pub async fn load(path: &str) -> Result<Vec<DeviceRecord>, InventoryError> {
    let content = fs::read_to_string(path).await.map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => InventoryError::NotFound { path: PathBuf::from(path) },
        _ => InventoryError::Io(err),
    })?;

    let devices = parse(&content)?;
    info!("📒 Loaded {} devices from {}", devices.len(), Path::new(path).display());
    Ok(devices)
}

fn parse(content: &str) -> Result<Vec<DeviceRecord>, InventoryError> {
    let mapping = serde_yaml_ng::from_str::<Mapping>(content)?;

    let mut devices = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let id = key.as_str().unwrap_or_default().to_string();
        let mut record = serde_yaml_ng::from_value::<DeviceRecord>(value)?;
        record.id = id;
        devices.push(record);
    }

    Ok(devices)
}

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("could not find the inventory file '{}'", .path.display())]
    NotFound { path: PathBuf },
    #[error("could not parse the inventory: {0}")]
    Parse(#[from] serde_yaml_ng::Error),
    #[error(transparent)]
    Io(io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env::temp_dir;

    const INVENTORY: &str = r#"
sonoff_kitchen:
  host: 192.168.1.21
  name: Kitchen
  username: admin
  password: hunter2
bulb_hallway:
  host: 192.168.1.22
  name: Hallway
  username: admin
  password: hunter2
  variant: sensors
plug_office:
  host: 192.168.1.23
  name: Office
  username: admin
  password: hunter2
"#;

    #[test]
    fn parse_preserves_the_declaration_order() -> Result<(), InventoryError> {
        let devices = parse(INVENTORY)?;

        let ids = devices.iter().map(|device| device.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["sonoff_kitchen", "bulb_hallway", "plug_office"]);

        Ok(())
    }

    #[test]
    fn parse_reads_the_optional_variant() -> Result<(), InventoryError> {
        let devices = parse(INVENTORY)?;

        assert_eq!(devices[0].variant, None);
        assert_eq!(devices[1].variant, Some("sensors".to_string()));
        assert_eq!(devices[1].host, "192.168.1.22");
        assert_eq!(devices[1].name, "Hallway");

        Ok(())
    }

    #[test]
    fn parse_tolerates_missing_fields() -> Result<(), InventoryError> {
        let devices = parse("bare_device:\n  host: 192.168.1.30\n")?;

        assert_eq!(devices[0].username, "");
        assert_eq!(devices[0].password, "");

        Ok(())
    }

    #[test]
    fn parse_rejects_a_malformed_document() {
        let result = parse("sonoff_kitchen: [not, a, record]");

        assert!(matches!(result, Err(InventoryError::Parse(_))));
    }

    #[tokio::test]
    async fn load_returns_not_found_for_a_missing_file() {
        let path = temp_dir().join("no_such_devices.yaml");

        let result = load(path.to_string_lossy().as_ref()).await;

        assert!(matches!(result, Err(InventoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn load_reads_an_inventory_file() -> Result<(), InventoryError> {
        let path = temp_dir().join("devices_load_test.yaml");
        fs::write(&path, INVENTORY).await.map_err(InventoryError::Io)?;

        let devices = load(path.to_string_lossy().as_ref()).await?;

        assert_eq!(devices.len(), 3);
        Ok(())
    }
}
