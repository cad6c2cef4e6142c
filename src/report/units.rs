//! Unit normalization for `<number> <unit>` fields of the powertop report.
//!
//! powertop prints rates and power estimates with whatever unit keeps the
//! number readable (`2.1 ms/s`, `350 us/s`, `1.5 W`, `12 mW`). The helpers in
//! this module bring those values onto a single scale so that consumers can
//! be compared and exported as plain numbers.

/// How a recognized unit maps onto the target scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// Value is multiplied by the factor.
    Times(f64),
    /// Value is divided by the factor.
    Per(f64),
}

impl Scale {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Scale::Times(factor) => value * factor,
            Scale::Per(divisor) => value / divisor,
        }
    }
}

/// Time units for process usage, normalized to milliseconds per second.
pub const TIME_UNITS: &[(&str, Scale)] = &[
    ("s/s", Scale::Times(1000.0)),
    ("ms/s", Scale::Times(1.0)),
    ("us/s", Scale::Per(1000.0)),
];

/// Power units for estimates, normalized to watts.
pub const POWER_UNITS: &[(&str, Scale)] = &[
    ("W", Scale::Times(1.0)),
    ("mW", Scale::Per(1000.0)),
    ("uW", Scale::Per(1_000_000.0)),
];

/// Splits a field into its numeric part and its (optional) unit token.
///
/// The numeric part falls back to `0.0` when it does not parse; this never
/// fails.
pub fn split_value_unit(field: &str) -> (f64, Option<&str>) {
    let mut parts = field.split_whitespace();
    let value = parts
        .next()
        .and_then(|number| number.parse::<f64>().ok())
        .unwrap_or(0.0);
    (value, parts.next())
}

/// Parses `field` and applies the scale registered for its unit in `table`.
///
/// Unknown or missing units leave the value unchanged.
pub fn normalize(field: &str, table: &[(&str, Scale)]) -> f64 {
    let (value, unit) = split_value_unit(field);
    unit.and_then(|unit| table.iter().find(|(name, _)| *name == unit))
        .map(|(_, scale)| scale.apply(value))
        .unwrap_or(value)
}

/// Converts a usage field such as `2.5 ms/s` to milliseconds per second.
pub fn usage_to_ms_per_second(field: &str) -> f64 {
    normalize(field, TIME_UNITS)
}

/// Converts a power estimate such as `350 mW` to watts.
pub fn power_to_watts(field: &str) -> f64 {
    normalize(field, POWER_UNITS)
}

/// Parses a unitless rate field, defaulting to `0.0`.
pub fn parse_rate(field: &str) -> f64 {
    field.trim().parse().unwrap_or(0.0)
}
