use serde_json::Value;

pub const ENDPOINT: &str = "overallstats";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Period {
    Today,
    Week,
    Month,
    Year,
}

pub const ALL_PERIODS: [Period; 4] = [Period::Today, Period::Week, Period::Month, Period::Year];

impl Period {
    pub fn key(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::Week => "Week",
            Period::Month => "Month",
            Period::Year => "Year",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Metric {
    SolarYield,
    Consumption,
    GridHistoryFrom,
    GridHistoryTo,
}

pub const ALL_METRICS: [Metric; 4] = [
    Metric::SolarYield,
    Metric::Consumption,
    Metric::GridHistoryFrom,
    Metric::GridHistoryTo,
];

impl Metric {
    pub fn key(&self) -> &'static str {
        match self {
            Metric::SolarYield => "total_solar_yield",
            Metric::Consumption => "total_consumption",
            Metric::GridHistoryFrom => "grid_history_from",
            Metric::GridHistoryTo => "grid_history_to",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Metric::SolarYield => "Solar Yield",
            Metric::Consumption => "Consumption",
            Metric::GridHistoryFrom => "Grid Energy In",
            Metric::GridHistoryTo => "Grid Energy Out",
        }
    }
}

/// Per-period energy totals from the `overallstats` endpoint. The
/// shape is `{ <period>: { totals: { <metric>: number|string } } }`;
/// the API reports some totals as numeric strings.
#[derive(Debug, Clone, Default)]
pub struct OverallStats {
    records: Value,
}

impl OverallStats {
    pub fn from_records(records: &Value) -> Self {
        Self {
            records: records.clone(),
        }
    }

    pub fn total(&self, period: Period, metric: Metric) -> Option<f64> {
        let value = self
            .records
            .get(period.key())?
            .get("totals")?
            .get(metric.key())?;
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}
