use crate::sensors::catalog::SensorGroup;
use crate::sensors::host::SensorHost;
use crate::sensors::{Payload, Reading};
use crate::victron::client::VrmClient;
use crate::victron::VictronError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

/// Fetches one endpoint on its own timer and keeps the last good
/// payload. Pollers share nothing with each other.
pub struct Poller {
    client: VrmClient,
    group: SensorGroup,
    last: Option<Payload>,
    last_updated: Option<DateTime<Utc>>,
}

impl Poller {
    pub fn new(client: VrmClient, group: SensorGroup) -> Self {
        Self {
            client,
            group,
            last: None,
            last_updated: None,
        }
    }

    pub fn group(&self) -> &SensorGroup {
        &self.group
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// One fetch. A failure keeps the previous payload; 204 drops it
    /// (the site currently reports nothing for this endpoint).
    pub async fn refresh(&mut self) -> Result<(), VictronError> {
        match self.client.fetch_records(&self.group.endpoint).await {
            Ok(Some(records)) => {
                self.last = Some(self.group.kind.parse(&records));
                self.last_updated = Some(Utc::now());
                debug!("{} refreshed", self.group.key);
                Ok(())
            }
            Ok(None) => {
                self.last = None;
                debug!("{} returned no content", self.group.key);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "update of {} failed, keeping previous values: {}",
                    self.group.name, e.0
                );
                Err(e)
            }
        }
    }

    /// Evaluate every sensor of the group against the current payload.
    /// Without a payload all values are unknown.
    pub fn readings(&self) -> Vec<Reading> {
        self.group
            .sensors
            .iter()
            .map(|sensor| Reading {
                key: sensor.key.clone(),
                name: sensor.name.clone(),
                unit: sensor.unit,
                value: self
                    .last
                    .as_ref()
                    .and_then(|payload| sensor.extract.read(payload)),
            })
            .collect()
    }

    /// Poll forever. The caller has already done the initial refresh,
    /// so the interval's immediate first tick is consumed up front.
    pub async fn run(mut self, host: Arc<dyn SensorHost>) {
        let mut tick = time::interval(self.group.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tick.tick().await;
        loop {
            tick.tick().await;
            // a failed refresh is already logged and the previous
            // payload stays published
            if self.refresh().await.is_err() {
                if let Some(at) = self.last_updated() {
                    debug!("{} still on snapshot from {}", self.group.key, at);
                }
            }
            if let Err(e) = host.publish(&self.group, &self.readings()).await {
                warn!("publish of {} failed: {}", self.group.key, e.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{DeviceClass, Extract, PayloadKind, Sensor, SensorValue, StateClass};
    use mockito::{Server, ServerGuard};
    use serde_json::json;
    use std::time::Duration;

    fn soc_group() -> SensorGroup {
        SensorGroup {
            key: "battery",
            name: "VRM Battery Summary",
            model: "Battery Summary",
            endpoint: "widgets/BatterySummary".to_owned(),
            interval: Duration::from_secs(20),
            kind: PayloadKind::Attributes,
            sensors: vec![Sensor {
                key: "soc".to_owned(),
                name: "State of charge".to_owned(),
                device_class: DeviceClass::Battery,
                state_class: StateClass::Measurement,
                unit: Some("%"),
                icon: "mdi:battery-50",
                extract: Extract::Float(51),
            }],
        }
    }

    fn poller(server: &ServerGuard) -> Poller {
        let client = VrmClient::new("12345", "abc")
            .unwrap()
            .with_base_url(&server.url());
        Poller::new(client, soc_group())
    }

    fn soc(poller: &Poller) -> Option<SensorValue> {
        poller.readings().remove(0).value
    }

    #[tokio::test]
    async fn refresh_updates_readings() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/installations/12345/widgets/BatterySummary")
            .with_status(200)
            .with_body(json!({ "records": { "data": { "51": { "valueFloat": 73.0 } } } }).to_string())
            .create_async()
            .await;

        let mut poller = poller(&server);
        assert_eq!(None, soc(&poller));
        assert!(poller.last_updated().is_none());

        poller.refresh().await.unwrap();
        assert_eq!(Some(SensorValue::Float(73.0)), soc(&poller));
        assert!(poller.last_updated().is_some());
    }

    #[tokio::test]
    async fn failed_refresh_retains_last_value() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/installations/12345/widgets/BatterySummary")
            .with_status(200)
            .with_body(json!({ "records": { "data": { "51": { "valueFloat": 73.0 } } } }).to_string())
            .expect(1)
            .create_async()
            .await;

        let mut poller = poller(&server);
        poller.refresh().await.unwrap();
        let stamped = poller.last_updated();

        server
            .mock("GET", "/installations/12345/widgets/BatterySummary")
            .with_status(500)
            .create_async()
            .await;

        assert!(poller.refresh().await.is_err());
        assert_eq!(Some(SensorValue::Float(73.0)), soc(&poller));
        assert_eq!(stamped, poller.last_updated());
    }

    #[tokio::test]
    async fn no_content_drops_the_payload() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/installations/12345/widgets/BatterySummary")
            .with_status(200)
            .with_body(json!({ "records": { "data": { "51": { "valueFloat": 73.0 } } } }).to_string())
            .expect(1)
            .create_async()
            .await;

        let mut poller = poller(&server);
        poller.refresh().await.unwrap();

        server
            .mock("GET", "/installations/12345/widgets/BatterySummary")
            .with_status(204)
            .create_async()
            .await;

        poller.refresh().await.unwrap();
        assert_eq!(None, soc(&poller));
    }
}
