use crate::app_config::AppConfig;
use reqwest::Client;
use thiserror::Error;

/// One shared client for every device call and artifact download. The
/// timeout bounds a single attempt; retries are layered on top by the
/// callers' retry policies.
pub fn new_client(config: &AppConfig) -> Result<Client, DeviceClientError> {
    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(config.device().timeout())
        .build()?;
    Ok(client)
}

#[derive(Error, Debug)]
pub enum DeviceClientError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
}
