use crate::victron::record::AttributeSet;
use crate::victron::stats::{Metric, OverallStats, Period};
use crate::victron::{pv_inverter, solar_charger, ve_bus};
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::Read;

pub mod catalog;
pub mod host;
pub mod poller;

#[derive(Debug)]
pub struct ConfigError(pub String);

impl<TStr: ToString> From<TStr> for ConfigError {
    fn from(t: TStr) -> Self {
        ConfigError(t.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// VRM installation ID.
    pub site_id: String,

    /// VRM access token, passed as-is in the request header.
    pub token: String,

    /// Device instance IDs; 0 leaves the endpoint unscoped and, for
    /// the optional groups, disables them entirely.
    #[serde(default)]
    pub battery_instance_id: u32,
    #[serde(default)]
    pub multi_instance_id: u32,
    #[serde(default)]
    pub pv_instance_id: u32,
    #[serde(default)]
    pub solar_charger_id: u32,
    #[serde(default)]
    pub tank_instance_id: u32,

    #[serde(default)]
    pub intervals: Intervals,
}

/// Refresh intervals in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Intervals {
    pub battery: u64,
    pub multi: u64,
    pub pv_inverter: u64,
    pub solar_charger: u64,
    pub tank: u64,
    pub overall: u64,
}

impl Default for Intervals {
    fn default() -> Self {
        Intervals {
            battery: 20,
            multi: 20,
            pv_inverter: 20,
            solar_charger: 20,
            tank: 60,
            overall: 300,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Config, ConfigError> {
        let mut file = File::open(path).map_err(|e| ConfigError(format!("{}: {}", path, e)))?;
        let mut json = String::new();
        file.read_to_string(&mut json)?;
        let v: Config = serde_json::from_str(&json)?;
        Ok(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    None,
    Battery,
    Voltage,
    Current,
    Power,
    Energy,
    Temperature,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::None => "none",
            DeviceClass::Battery => "battery",
            DeviceClass::Voltage => "voltage",
            DeviceClass::Current => "current",
            DeviceClass::Power => "power",
            DeviceClass::Energy => "energy",
            DeviceClass::Temperature => "temperature",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateClass {
    None,
    Measurement,
    TotalIncreasing,
}

impl StateClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateClass::None => "none",
            StateClass::Measurement => "measurement",
            StateClass::TotalIncreasing => "total_increasing",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SensorValue {
    Float(f64),
    Text(String),
}

impl ToString for SensorValue {
    fn to_string(&self) -> String {
        match self {
            SensorValue::Float(v) => v.to_string(),
            SensorValue::Text(s) => s.clone(),
        }
    }
}

/// How a sensor plucks its value out of a refreshed payload.
#[derive(Debug, Clone)]
pub enum Extract {
    /// Numeric attribute by ID.
    Float(u32),
    /// Textual attribute by ID (enum label, formatted value, raw).
    Label(u32),
    /// VE.Bus state, decoded when the payload carries no label.
    VeBusState,
    /// Solar charger state, decoded when the payload carries no label.
    ChargerState,
    /// PV inverter AC power with a V × I fallback.
    PvInverterPower,
    /// Derived power from a voltage and a current attribute.
    Power { voltage: u32, current: u32 },
    /// Nested total from the overall statistics payload.
    Total(Period, Metric),
}

#[derive(Debug, Clone)]
pub enum Payload {
    Attributes(AttributeSet),
    Stats(OverallStats),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Attributes,
    Stats,
}

impl PayloadKind {
    pub fn parse(&self, records: &Value) -> Payload {
        match self {
            PayloadKind::Attributes => Payload::Attributes(AttributeSet::from_records(records)),
            PayloadKind::Stats => Payload::Stats(OverallStats::from_records(records)),
        }
    }
}

impl Extract {
    pub fn read(&self, payload: &Payload) -> Option<SensorValue> {
        match (self, payload) {
            (Extract::Float(id), Payload::Attributes(attrs)) => {
                attrs.float(*id).map(SensorValue::Float)
            }
            (Extract::Label(id), Payload::Attributes(attrs)) => {
                attrs.label(*id).map(SensorValue::Text)
            }
            (Extract::VeBusState, Payload::Attributes(attrs)) => {
                ve_bus::state_label(attrs).map(SensorValue::Text)
            }
            (Extract::ChargerState, Payload::Attributes(attrs)) => {
                solar_charger::state_label(attrs).map(SensorValue::Text)
            }
            (Extract::PvInverterPower, Payload::Attributes(attrs)) => {
                pv_inverter::ac_power(attrs).map(SensorValue::Float)
            }
            (Extract::Power { voltage, current }, Payload::Attributes(attrs)) => {
                let v = attrs.float(*voltage)?;
                let i = attrs.float(*current)?;
                Some(SensorValue::Float((v * i * 10.0).round() / 10.0))
            }
            (Extract::Total(period, metric), Payload::Stats(stats)) => {
                stats.total(*period, *metric).map(SensorValue::Float)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sensor {
    pub key: String,
    pub name: String,
    pub device_class: DeviceClass,
    pub state_class: StateClass,
    pub unit: Option<&'static str>,
    pub icon: &'static str,
    pub extract: Extract,
}

#[derive(Debug, Clone)]
pub struct Reading {
    pub key: String,
    pub name: String,
    pub unit: Option<&'static str>,
    pub value: Option<SensorValue>,
}
