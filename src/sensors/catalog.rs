use crate::sensors::{Config, DeviceClass, Extract, PayloadKind, Sensor, StateClass};
use crate::victron::stats::{ALL_METRICS, ALL_PERIODS};
use crate::victron::{battery, pv_inverter, solar_charger, stats, tank, ve_bus, widget_endpoint};
use std::time::Duration;

/// A polled endpoint and the sensors presented from it.
#[derive(Debug, Clone)]
pub struct SensorGroup {
    pub key: &'static str,
    pub name: &'static str,
    pub model: &'static str,
    pub endpoint: String,
    pub interval: Duration,
    pub kind: PayloadKind,
    pub sensors: Vec<Sensor>,
}

impl SensorGroup {
    pub fn unique_id(&self, site_id: &str, sensor_key: &str) -> String {
        format!(
            "{}_{}_{}",
            site_id,
            self.name.to_lowercase().replace(' ', "_"),
            sensor_key
        )
    }
}

fn s(
    key: &str,
    name: &str,
    device_class: DeviceClass,
    state_class: StateClass,
    unit: Option<&'static str>,
    icon: &'static str,
    extract: Extract,
) -> Sensor {
    Sensor {
        key: key.to_owned(),
        name: name.to_owned(),
        device_class,
        state_class,
        unit,
        icon,
        extract,
    }
}

fn battery_sensors() -> Vec<Sensor> {
    use crate::victron::battery::Attribute::*;
    use crate::sensors::{DeviceClass as D, StateClass as S};
    vec![
        s("soc", "State of charge", D::Battery, S::Measurement, Some("%"), "mdi:battery-50", Extract::Float(Soc.id())),
        s("voltage", "Voltage", D::Voltage, S::Measurement, Some("V"), "mdi:current-dc", Extract::Float(Voltage.id())),
        s("current", "Current", D::Current, S::Measurement, Some("A"), "mdi:current-dc", Extract::Float(Current.id())),
        s("power", "Power", D::Power, S::Measurement, Some("W"), "mdi:battery-charging", Extract::Power { voltage: Voltage.id(), current: Current.id() }),
        s("consumed", "Consumed Amphours", D::None, S::TotalIncreasing, Some("Ah"), "mdi:battery-alert-variant-outline", Extract::Float(ConsumedAmphours.id())),
        s("ttg", "Time to go", D::None, S::Measurement, Some("h"), "mdi:timer-sand", Extract::Float(TimeToGo.id())),
        s("temp", "Battery temperature", D::Temperature, S::Measurement, Some("°C"), "mdi:thermometer", Extract::Float(Temperature.id())),
        s("min_cell_voltage", "Minimum Cell Voltage", D::Voltage, S::Measurement, Some("V"), "mdi:battery-low", Extract::Float(MinCellVoltage.id())),
        s("max_cell_voltage", "Maximum Cell Voltage", D::Voltage, S::Measurement, Some("V"), "mdi:battery-high", Extract::Float(MaxCellVoltage.id())),
    ]
}

fn multi_sensors() -> Vec<Sensor> {
    use crate::victron::ve_bus::Attribute::*;
    use crate::sensors::{DeviceClass as D, StateClass as S};
    vec![
        s("ac_in_voltage", "AC Input Voltage L1", D::Voltage, S::Measurement, Some("V"), "mdi:transmission-tower", Extract::Float(AcInVoltage.id())),
        s("ac_in_power", "AC Input Power L1", D::Power, S::Measurement, Some("W"), "mdi:transmission-tower", Extract::Float(AcInPower.id())),
        s("ac_out_voltage", "AC Output Voltage L1", D::Voltage, S::Measurement, Some("V"), "mdi:power-socket-eu", Extract::Float(AcOutVoltage.id())),
        s("ac_out_power", "AC Output Power L1", D::Power, S::Measurement, Some("W"), "mdi:power-socket-eu", Extract::Float(AcOutPower.id())),
        s("dc_voltage", "DC Bus Voltage", D::Voltage, S::Measurement, Some("V"), "mdi:current-dc", Extract::Float(DcVoltage.id())),
        s("dc_current", "DC Bus Current", D::Current, S::Measurement, Some("A"), "mdi:current-dc", Extract::Float(DcCurrent.id())),
        s("dc_power", "DC Bus Power", D::Power, S::Measurement, Some("W"), "mdi:current-dc", Extract::Power { voltage: DcVoltage.id(), current: DcCurrent.id() }),
        s("inverter_state", "VE.Bus State", D::None, S::None, None, "mdi:flash", Extract::VeBusState),
        s("multi_temp", "MultiPlus Temperature", D::Temperature, S::Measurement, Some("°C"), "mdi:thermometer", Extract::Float(Temperature.id())),
    ]
}

fn overall_sensors() -> Vec<Sensor> {
    let mut sensors = Vec::new();
    for period in ALL_PERIODS {
        for metric in ALL_METRICS {
            let icon = match metric {
                stats::Metric::SolarYield => "mdi:solar-power",
                stats::Metric::Consumption => "mdi:power-plug",
                stats::Metric::GridHistoryFrom => "mdi:transmission-tower",
                stats::Metric::GridHistoryTo => "mdi:home-export-outline",
            };
            sensors.push(s(
                &format!("{}_{}", period.key(), metric.key()),
                &format!("{} {}", period.title(), metric.title()),
                DeviceClass::Energy,
                StateClass::TotalIncreasing,
                Some("kWh"),
                icon,
                Extract::Total(period, metric),
            ));
        }
    }
    sensors
}

fn solar_charger_sensors() -> Vec<Sensor> {
    use crate::victron::solar_charger::Attribute::*;
    use crate::sensors::{DeviceClass as D, StateClass as S};
    vec![
        s("battery_voltage", "Battery Voltage", D::Voltage, S::Measurement, Some("V"), "mdi:current-dc", Extract::Float(BatteryVoltage.id())),
        s("battery_current", "Battery Current", D::Current, S::Measurement, Some("A"), "mdi:current-dc", Extract::Float(BatteryCurrent.id())),
        s("charge_power", "Charge Power", D::Power, S::Measurement, Some("W"), "mdi:battery-charging", Extract::Power { voltage: BatteryVoltage.id(), current: BatteryCurrent.id() }),
        s("charge_state", "Charge State", D::None, S::None, None, "mdi:flash", Extract::ChargerState),
        s("pv_voltage", "PV Voltage", D::Voltage, S::Measurement, Some("V"), "mdi:solar-panel", Extract::Float(PvVoltage.id())),
        s("pv_current", "PV Current", D::Current, S::Measurement, Some("A"), "mdi:solar-panel", Extract::Float(PvCurrent.id())),
        s("pv_power", "PV Power", D::Power, S::Measurement, Some("W"), "mdi:solar-power", Extract::Power { voltage: PvVoltage.id(), current: PvCurrent.id() }),
        s("yield_today", "Yield Today", D::Energy, S::TotalIncreasing, Some("kWh"), "mdi:solar-power", Extract::Float(YieldToday.id())),
    ]
}

fn pv_inverter_sensors() -> Vec<Sensor> {
    use crate::victron::pv_inverter::Attribute::*;
    use crate::sensors::{DeviceClass as D, StateClass as S};
    vec![
        s("ac_voltage", "AC Voltage L1", D::Voltage, S::Measurement, Some("V"), "mdi:solar-power", Extract::Float(AcVoltage.id())),
        s("ac_current", "AC Current L1", D::Current, S::Measurement, Some("A"), "mdi:solar-power", Extract::Float(AcCurrent.id())),
        s("ac_power", "AC Power L1", D::Power, S::Measurement, Some("W"), "mdi:solar-power", Extract::PvInverterPower),
        s("energy_total", "Total Energy", D::Energy, S::TotalIncreasing, Some("kWh"), "mdi:solar-power", Extract::Float(EnergyTotal.id())),
    ]
}

fn tank_sensors() -> Vec<Sensor> {
    use crate::victron::tank::Attribute::*;
    use crate::sensors::{DeviceClass as D, StateClass as S};
    vec![
        s("fluid_type", "Fluid Type", D::None, S::None, None, "mdi:storage-tank", Extract::Label(FluidType.id())),
        s("level", "Level", D::None, S::Measurement, Some("%"), "mdi:storage-tank", Extract::Float(Level.id())),
        s("remaining", "Remaining", D::None, S::Measurement, Some("m³"), "mdi:storage-tank", Extract::Float(Remaining.id())),
        s("capacity", "Capacity", D::None, S::Measurement, Some("m³"), "mdi:storage-tank", Extract::Float(Capacity.id())),
    ]
}

/// Builds the polled groups for one site. Battery, MultiPlus status
/// and overall statistics are always on; the remaining groups need an
/// explicit device instance.
pub fn build_groups(config: &Config) -> Vec<SensorGroup> {
    let mut groups = vec![
        SensorGroup {
            key: "battery",
            name: "VRM Battery Summary",
            model: "Battery Summary",
            endpoint: widget_endpoint(battery::WIDGET, config.battery_instance_id),
            interval: Duration::from_secs(config.intervals.battery),
            kind: PayloadKind::Attributes,
            sensors: battery_sensors(),
        },
        SensorGroup {
            key: "multi",
            name: "VRM MultiPlus Status",
            model: "MultiPlus Status",
            endpoint: widget_endpoint(ve_bus::WIDGET, config.multi_instance_id),
            interval: Duration::from_secs(config.intervals.multi),
            kind: PayloadKind::Attributes,
            sensors: multi_sensors(),
        },
        SensorGroup {
            key: "overall",
            name: "VRM Overall Stats",
            model: "Overall Statistics",
            endpoint: stats::ENDPOINT.to_owned(),
            interval: Duration::from_secs(config.intervals.overall),
            kind: PayloadKind::Stats,
            sensors: overall_sensors(),
        },
    ];

    if config.solar_charger_id > 0 {
        groups.push(SensorGroup {
            key: "solar_charger",
            name: "VRM Solar Charger",
            model: "Solar Charger Summary",
            endpoint: widget_endpoint(solar_charger::WIDGET, config.solar_charger_id),
            interval: Duration::from_secs(config.intervals.solar_charger),
            kind: PayloadKind::Attributes,
            sensors: solar_charger_sensors(),
        });
    }
    if config.pv_instance_id > 0 {
        groups.push(SensorGroup {
            key: "pv_inverter",
            name: "VRM PV Inverter",
            model: "PV Inverter Status",
            endpoint: widget_endpoint(pv_inverter::WIDGET, config.pv_instance_id),
            interval: Duration::from_secs(config.intervals.pv_inverter),
            kind: PayloadKind::Attributes,
            sensors: pv_inverter_sensors(),
        });
    }
    if config.tank_instance_id > 0 {
        groups.push(SensorGroup {
            key: "tank",
            name: "VRM Tank",
            model: "Tank Summary",
            endpoint: widget_endpoint(tank::WIDGET, config.tank_instance_id),
            interval: Duration::from_secs(config.intervals.tank),
            kind: PayloadKind::Attributes,
            sensors: tank_sensors(),
        });
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(json: &str) -> Config {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn default_config_builds_three_groups() {
        let groups = build_groups(&config(r#"{ "site_id": "12345", "token": "abc" }"#));
        let keys: Vec<&str> = groups.iter().map(|g| g.key).collect();
        assert_eq!(vec!["battery", "multi", "overall"], keys);
    }

    #[test]
    fn optional_groups_are_instance_gated() {
        let groups = build_groups(&config(
            r#"{
                "site_id": "12345",
                "token": "abc",
                "solar_charger_id": 288,
                "tank_instance_id": 20
            }"#,
        ));
        let keys: Vec<&str> = groups.iter().map(|g| g.key).collect();
        assert_eq!(vec!["battery", "multi", "overall", "solar_charger", "tank"], keys);
        assert_eq!(
            "widgets/SolarChargerSummary?instance=288",
            groups[3].endpoint
        );
    }

    #[test]
    fn battery_instance_scopes_the_endpoint() {
        let groups = build_groups(&config(
            r#"{ "site_id": "12345", "token": "abc", "battery_instance_id": 512 }"#,
        ));
        assert_eq!("widgets/BatterySummary?instance=512", groups[0].endpoint);
    }

    #[test]
    fn overall_group_expands_periods_and_metrics() {
        let groups = build_groups(&config(r#"{ "site_id": "12345", "token": "abc" }"#));
        let overall = &groups[2];
        assert_eq!(16, overall.sensors.len());
        assert!(overall
            .sensors
            .iter()
            .any(|s| s.key == "today_total_solar_yield" && s.name == "Today Solar Yield"));
        assert!(overall
            .sensors
            .iter()
            .any(|s| s.key == "year_grid_history_to" && s.name == "Year Grid Energy Out"));
    }

    #[test]
    fn unique_id_matches_site_group_key() {
        let groups = build_groups(&config(r#"{ "site_id": "12345", "token": "abc" }"#));
        assert_eq!(
            "12345_vrm_battery_summary_soc",
            groups[0].unique_id("12345", "soc")
        );
    }

    #[test]
    fn battery_group_units() {
        let groups = build_groups(&config(r#"{ "site_id": "12345", "token": "abc" }"#));
        let soc = groups[0].sensors.iter().find(|s| s.key == "soc").unwrap();
        assert_eq!(Some("%"), soc.unit);
        assert_eq!(DeviceClass::Battery, soc.device_class);
        assert_eq!(StateClass::Measurement, soc.state_class);
    }
}
