use crate::victron::record::AttributeSet;

pub const WIDGET: &str = "PVInverterStatus";

/// PV Inverter Status widget attributes (L1).
#[derive(Debug, Copy, Clone)]
pub enum Attribute {
    AcVoltage,
    AcCurrent,
    AcPower,
    EnergyTotal,
}

impl Attribute {
    pub fn id(&self) -> u32 {
        use Attribute::*;
        match self {
            AcVoltage => 117,
            AcCurrent => 118,
            AcPower => 119,
            EnergyTotal => 122,
        }
    }
}

/// AC power, preferring the reported attribute and falling back to
/// voltage × current when the inverter does not publish one.
pub fn ac_power(attrs: &AttributeSet) -> Option<f64> {
    if let Some(p) = attrs.float(Attribute::AcPower.id()) {
        return Some(p);
    }
    let v = attrs.float(Attribute::AcVoltage.id())?;
    let i = attrs.float(Attribute::AcCurrent.id())?;
    Some((v * i * 10.0).round() / 10.0)
}
