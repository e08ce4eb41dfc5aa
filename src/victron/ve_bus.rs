use crate::victron::record::AttributeSet;
use crate::victron::VictronError;

pub const WIDGET: &str = "Status";

/// MultiPlus Status widget attributes (single phase installs report
/// everything on L1).
#[derive(Debug, Copy, Clone)]
pub enum Attribute {
    AcInVoltage,
    AcInPower,
    AcOutVoltage,
    AcOutPower,
    DcVoltage,
    DcCurrent,
    State,
    Temperature,
}

impl Attribute {
    pub fn id(&self) -> u32 {
        use Attribute::*;
        match self {
            AcInVoltage => 8,
            AcInPower => 17,
            AcOutVoltage => 20,
            AcOutPower => 29,
            DcVoltage => 32,
            DcCurrent => 33,
            State => 40,
            Temperature => 521,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Off = 0,
    LowPower = 1,
    Fault = 2,
    Bulk = 3,
    Absorption = 4,
    Float = 5,
    Storage = 6,
    Equalize = 7,
    Passthrough = 8,
    Inverting = 9,
    PowerAssist = 10,
    PowerSupply = 11,
    BulkProtection = 252,
}

impl ToString for State {
    fn to_string(&self) -> String {
        match self {
            State::Off => "Off",
            State::LowPower => "Low Power",
            State::Fault => "Fault",
            State::Bulk => "Bulk",
            State::Absorption => "Absorption",
            State::Float => "Float",
            State::Storage => "Storage",
            State::Equalize => "Equalize",
            State::Passthrough => "Passthrough",
            State::Inverting => "Inverting",
            State::PowerAssist => "Power Assist",
            State::PowerSupply => "Power Supply",
            State::BulkProtection => "Bulk Protection",
        }
        .to_owned()
    }
}

impl TryFrom<u8> for State {
    type Error = VictronError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => State::Off,
            1 => State::LowPower,
            2 => State::Fault,
            3 => State::Bulk,
            4 => State::Absorption,
            5 => State::Float,
            6 => State::Storage,
            7 => State::Equalize,
            8 => State::Passthrough,
            9 => State::Inverting,
            10 => State::PowerAssist,
            11 => State::PowerSupply,
            252 => State::BulkProtection,
            e => return Err(VictronError(format!("Invalid VE.Bus state {}!", e))),
        })
    }
}

/// Textual reading for the state attribute. The payload's own enum
/// label wins; a bare numeric value is decoded through [`State`].
pub fn state_label(attrs: &AttributeSet) -> Option<String> {
    let attr = attrs.get(Attribute::State.id())?;
    if let Some(name) = &attr.name_enum {
        return Some(name.clone());
    }
    let raw = attr.float()?;
    State::try_from(raw as u8).ok().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_from_value() {
        assert_eq!(State::Inverting, State::try_from(9u8).unwrap());
        assert_eq!(State::BulkProtection, State::try_from(252u8).unwrap());
        assert!(State::try_from(99u8).is_err());
    }

    #[test]
    fn state_label_prefers_payload_enum() {
        let attrs = AttributeSet::from_records(&json!({
            "data": { "40": { "value": 9, "nameEnum": "Inverting (payload)" } }
        }));
        assert_eq!(Some("Inverting (payload)".to_owned()), state_label(&attrs));
    }

    #[test]
    fn state_label_decodes_bare_value() {
        let attrs = AttributeSet::from_records(&json!({
            "data": { "40": { "valueFloat": 4.0 } }
        }));
        assert_eq!(Some("Absorption".to_owned()), state_label(&attrs));
    }

    #[test]
    fn state_label_missing_attribute() {
        let attrs = AttributeSet::from_records(&json!({ "data": {} }));
        assert_eq!(None, state_label(&attrs));
    }
}
