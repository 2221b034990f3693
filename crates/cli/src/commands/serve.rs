//! Serve command handler.

use clap::Args;
use policyqa_core::{config::AppConfig, AppResult};
use policyqa_server::{AppState, PolicyQaServer};

use super::client::build_client;

/// Run the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind
    #[arg(long, env = "POLICYQA_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "POLICYQA_PORT")]
    pub port: Option<u16>,
}

impl ServeCommand {
    /// Execute the serve command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let mut config = config.clone();
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        config.validate_server()?;

        let state = AppState::from_config(&config, build_client(&config)?)?;
        let server = PolicyQaServer::new(&config, state);

        tracing::info!("API: http://{}/api/v1/hackrx/run", server.address());
        tracing::info!("Health: http://{}/health", server.address());

        server.start().await
    }
}
