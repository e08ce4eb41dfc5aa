use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// One entry of a widget's flat attribute map. Every field is
/// optional; the API omits whatever a device does not report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Attribute {
    pub code: Option<String>,
    pub value: Option<Value>,
    pub value_float: Option<f64>,
    pub value_enum: Option<i64>,
    pub name_enum: Option<String>,
    pub formatted_value: Option<String>,
}

impl Attribute {
    pub fn float(&self) -> Option<f64> {
        if let Some(v) = self.value_float {
            return Some(v);
        }
        match &self.value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn label(&self) -> Option<String> {
        if let Some(n) = &self.name_enum {
            return Some(n.clone());
        }
        if let Some(f) = &self.formatted_value {
            return Some(f.clone());
        }
        match &self.value {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Attribute ID keyed map parsed from a widget's `records` object.
#[derive(Debug, Clone, Default)]
pub struct AttributeSet {
    attrs: HashMap<u32, Attribute>,
}

impl AttributeSet {
    /// Build from `records`. The `data` member is an object keyed by
    /// numeric attribute IDs; the API sends `[]` instead when a widget
    /// has nothing, which parses to an empty set. Keys that are not
    /// numeric and entries that do not deserialize are skipped.
    pub fn from_records(records: &Value) -> Self {
        let mut attrs = HashMap::new();
        if let Some(data) = records.get("data").and_then(Value::as_object) {
            for (key, raw) in data {
                let id = match key.parse::<u32>() {
                    Ok(id) => id,
                    Err(_) => continue,
                };
                if let Ok(attr) = serde_json::from_value::<Attribute>(raw.clone()) {
                    attrs.insert(id, attr);
                }
            }
        }
        Self { attrs }
    }

    pub fn get(&self, id: u32) -> Option<&Attribute> {
        self.attrs.get(&id)
    }

    pub fn float(&self, id: u32) -> Option<f64> {
        self.get(id).and_then(Attribute::float)
    }

    pub fn label(&self, id: u32) -> Option<String> {
        self.get(id).and_then(Attribute::label)
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}
