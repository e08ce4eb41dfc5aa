use crate::sensors::catalog::SensorGroup;
use crate::sensors::Reading;
use crate::victron::VictronError;
use async_trait::async_trait;
use tracing::{debug, info};

/// Seam towards the home-automation host. The real host wiring is
/// out of scope; anything that can register a sensor group and accept
/// periodic readings can stand behind this.
#[async_trait]
pub trait SensorHost: Send + Sync {
    async fn announce(&self, group: &SensorGroup) -> Result<(), VictronError>;

    async fn publish(&self, group: &SensorGroup, readings: &[Reading])
        -> Result<(), VictronError>;
}

/// Host that writes everything to the log.
pub struct LogHost {
    site_id: String,
}

impl LogHost {
    pub fn new(site_id: String) -> Self {
        Self { site_id }
    }
}

#[async_trait]
impl SensorHost for LogHost {
    async fn announce(&self, group: &SensorGroup) -> Result<(), VictronError> {
        info!(
            "registering {} ({}, {} sensors, every {}s)",
            group.name,
            group.model,
            group.sensors.len(),
            group.interval.as_secs()
        );
        for sensor in &group.sensors {
            debug!(
                "  {} [{}] class={} state_class={} unit={} icon={}",
                group.unique_id(&self.site_id, &sensor.key),
                sensor.name,
                sensor.device_class.as_str(),
                sensor.state_class.as_str(),
                sensor.unit.unwrap_or("-"),
                sensor.icon
            );
        }
        Ok(())
    }

    async fn publish(
        &self,
        group: &SensorGroup,
        readings: &[Reading],
    ) -> Result<(), VictronError> {
        for reading in readings {
            match &reading.value {
                Some(value) => info!(
                    "{}/{}: {} = {}{}",
                    group.key,
                    reading.key,
                    reading.name,
                    value.to_string(),
                    reading.unit.map(|u| format!(" {}", u)).unwrap_or_default()
                ),
                None => debug!("{}/{}: {} unavailable", group.key, reading.key, reading.name),
            }
        }
        Ok(())
    }
}
