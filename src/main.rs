use crate::app_config::AppConfig;
use crate::inventory::DeviceRecord;
use crate::release::{Release, ReleaseError};
use crate::selection::{Selection, SelectionError};
use crate::session::UpdateSession;
use reqwest::Client;
use std::error::Error;
use std::sync::Arc;
use tracing::info;

mod app_config;
mod device;
mod firmware;
mod inventory;
mod prompt;
mod release;
mod retry;
mod selection;
mod session;
mod table;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    info!("🔌 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = Arc::new(AppConfig::load()?);
    let client = device::client::new_client(&config)?;
    let devices = inventory::load(config.core().inventory_file()).await?;

    println!("Welcome to {}, what do you want to do?", env!("CARGO_PKG_NAME"));
    println!("1. Bulk update all devices to the newest version available");
    println!("2. Bulk update all devices to a specific version");
    println!("3. Update one device to the newest version");
    println!("4. Update one device to a specific version");
    println!("5. Update selected devices to the newest version");
    println!("6. Show the status of all devices");
    println!("7. Show the newest release\n");

    let choice = prompt::read_line("Your choice: ").await?;

    match choice.as_str() {
        "1" => {
            let release = latest_release(&client, &config).await?;
            let session = session_for(&config, &client, &devices, Selection::All)?;
            confirm_and_update(&session, &release).await?;
        }
        "2" => {
            let version = prompt::read_line("Enter the version to be installed (e.g. 14.4.1): ").await?;
            release::validate_version(&version)?;

            let session = session_for(&config, &client, &devices, Selection::All)?;
            session.run_update(&version).await?;
        }
        "3" | "4" | "5" => {
            // Show the whole fleet first so the ordinals have something to
            // refer to.
            session_for(&config, &client, &devices, Selection::All)?.show_status().await;

            let selection = if choice == "5" {
                let input = prompt::read_line("Choose the devices to be updated (comma separated): ").await?;
                Selection::Many(selection::parse_ordinals(&input)?)
            } else {
                let input = prompt::read_line("Enter the number of the device to be updated: ").await?;
                Selection::One(selection::parse_ordinal(&input)?)
            };
            let session = session_for(&config, &client, &devices, selection)?;

            if choice == "4" {
                let version = prompt::read_line("Enter the version to be installed (e.g. 14.4.1): ").await?;
                release::validate_version(&version)?;
                session.run_update(&version).await?;
            } else {
                let release = latest_release(&client, &config).await?;
                confirm_and_update(&session, &release).await?;
            }
        }
        "6" => {
            session_for(&config, &client, &devices, Selection::All)?.show_status().await;
        }
        "7" => {
            let release = latest_release(&client, &config).await?;
            println!("Release name: {}", release.name);
            println!("Version number: {}", release.version);
        }
        other => println!("'{other}' is not one of the listed operations"),
    }

    Ok(())
}

fn session_for(
    config: &Arc<AppConfig>,
    client: &Client,
    devices: &[DeviceRecord],
    selection: Selection,
) -> Result<UpdateSession, SelectionError> {
    let selected = selection::resolve(devices, &selection)?;
    Ok(UpdateSession::new(Arc::clone(config), client.clone(), selected))
}

async fn latest_release(client: &Client, config: &AppConfig) -> Result<Release, ReleaseError> {
    release::source_for(config).latest(client).await
}

async fn confirm_and_update(session: &UpdateSession, release: &Release) -> Result<(), Box<dyn Error>> {
    let question = format!("{} looks like the latest release. Start the update? [Y/n] ", release.name);
    if prompt::confirm(&question).await? {
        session.run_update(&release.version).await?;
    } else {
        info!("Update cancelled");
    }

    Ok(())
}
