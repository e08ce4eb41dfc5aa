use crate::victron::record::AttributeSet;
use crate::victron::VictronError;

pub const WIDGET: &str = "SolarChargerSummary";

/// Solar Charger Summary widget attributes.
#[derive(Debug, Copy, Clone)]
pub enum Attribute {
    BatteryVoltage,
    BatteryCurrent,
    ChargeState,
    PvVoltage,
    PvCurrent,
    YieldToday,
}

impl Attribute {
    pub fn id(&self) -> u32 {
        use Attribute::*;
        match self {
            BatteryVoltage => 81,
            BatteryCurrent => 82,
            ChargeState => 85,
            PvVoltage => 86,
            PvCurrent => 87,
            YieldToday => 94,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChargerState {
    Off = 0,
    Fault = 2,
    Bulk = 3,
    Absorption = 4,
    Float = 5,
    Storage = 6,
    Equalize = 7,
    ExternalControl = 252,
}

impl ToString for ChargerState {
    fn to_string(&self) -> String {
        match self {
            ChargerState::Off => "Off",
            ChargerState::Fault => "Fault",
            ChargerState::Bulk => "Bulk",
            ChargerState::Absorption => "Absorption",
            ChargerState::Float => "Float",
            ChargerState::Storage => "Storage",
            ChargerState::Equalize => "Equalize",
            ChargerState::ExternalControl => "External Control",
        }
        .to_owned()
    }
}

impl TryFrom<u8> for ChargerState {
    type Error = VictronError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => ChargerState::Off,
            2 => ChargerState::Fault,
            3 => ChargerState::Bulk,
            4 => ChargerState::Absorption,
            5 => ChargerState::Float,
            6 => ChargerState::Storage,
            7 => ChargerState::Equalize,
            252 => ChargerState::ExternalControl,
            e => return Err(VictronError(format!("Invalid charger state {}!", e))),
        })
    }
}

pub fn state_label(attrs: &AttributeSet) -> Option<String> {
    let attr = attrs.get(Attribute::ChargeState.id())?;
    if let Some(name) = &attr.name_enum {
        return Some(name.clone());
    }
    let raw = attr.float()?;
    ChargerState::try_from(raw as u8).ok().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn charger_state_from_value() {
        assert_eq!(ChargerState::Float, ChargerState::try_from(5u8).unwrap());
        assert!(ChargerState::try_from(1u8).is_err());
    }

    #[test]
    fn state_label_decodes_bare_value() {
        let attrs = AttributeSet::from_records(&json!({
            "data": { "85": { "valueFloat": 3.0 } }
        }));
        assert_eq!(Some("Bulk".to_owned()), state_label(&attrs));
    }
}
