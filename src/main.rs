use crate::sensors::catalog;
use crate::sensors::host::{LogHost, SensorHost};
use crate::sensors::poller::Poller;
use crate::sensors::Config;
use crate::victron::client::VrmClient;
use crate::victron::VictronError;
use std::sync::Arc;
use tracing::{error, info, warn};

mod sensors;
mod victron;

const CONFIG_PATH: &str = "vrm_sensors.json";

#[tokio::main(flavor = "current_thread")]
pub async fn main() -> Result<(), VictronError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::load(CONFIG_PATH).map_err(|e| VictronError(e.0))?;
    let client = VrmClient::new(&config.site_id, &config.token)?;
    let host: Arc<dyn SensorHost> = Arc::new(LogHost::new(config.site_id.clone()));

    info!("polling VRM site {}", config.site_id);

    let mut tasks = Vec::new();
    for group in catalog::build_groups(&config) {
        let mut poller = Poller::new(client.clone(), group);
        if let Err(e) = poller.refresh().await {
            warn!("initial refresh of {} failed: {}", poller.group().name, e.0);
        }
        host.announce(poller.group()).await?;
        host.publish(poller.group(), &poller.readings()).await?;
        tasks.push(tokio::spawn(poller.run(host.clone())));
    }

    for task in tasks {
        if let Err(e) = task.await {
            error!("poller task failed: {}", e);
        }
    }
    Ok(())
}
