use anyhow::Result;
use secrecy::SecretString;

use crate::config::ResolvedConfig;
use crate::server::ServerClient;

use super::types::ServerActionOutput;

/// Pause scheduled snapshots on the configured server.
pub async fn pause_server(
    config: &ResolvedConfig,
    password: Option<SecretString>,
) -> Result<ServerActionOutput> {
    let client = ServerClient::from_config(&config.server, password);
    client.pause_sources().await?;
    tracing::info!(server = %config.server.address, "paused scheduled snapshots");

    Ok(ServerActionOutput {
        server: config.server.address.clone(),
        action: "pause".to_string(),
        ok: true,
    })
}
