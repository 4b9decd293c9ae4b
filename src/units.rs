//! Unit conversion between the source and destination platforms
//!
//! Distance and speed differ between the two; heart rate, cadence, power and
//! calories are shared units and pass through untouched.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Meters in one statute mile
pub const MILES_TO_METERS: Decimal = dec!(1609.344);

/// Divisor taking miles per hour to meters per second
pub const MPH_PER_METER_PER_SECOND: f64 = 2.237;

/// Unit a speed field is reported in by the source platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    MilesPerHour,
    MetersPerSecond,
}

impl SpeedUnit {
    /// Convert a value in this unit to meters per second
    pub fn to_meters_per_second(&self, value: f64) -> f64 {
        match self {
            SpeedUnit::MilesPerHour => value / MPH_PER_METER_PER_SECOND,
            SpeedUnit::MetersPerSecond => value,
        }
    }
}

/// Per-field speed units
///
/// Maximum and per-sample speed come from the raw metric series in mph. The
/// average speed summary is copied as-is by default; set `avg_speed` to
/// `miles_per_hour` if the destination shows it inflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPolicy {
    pub max_speed: SpeedUnit,
    pub sample_speed: SpeedUnit,
    pub avg_speed: SpeedUnit,
}

impl Default for UnitPolicy {
    fn default() -> Self {
        Self {
            max_speed: SpeedUnit::MilesPerHour,
            sample_speed: SpeedUnit::MilesPerHour,
            avg_speed: SpeedUnit::MetersPerSecond,
        }
    }
}

/// Miles to meters; non-finite or out-of-range input yields zero
pub fn miles_to_meters(miles: f64) -> Decimal {
    Decimal::from_f64(miles)
        .and_then(|m| m.checked_mul(MILES_TO_METERS))
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miles_to_meters_is_exact() {
        assert_eq!(miles_to_meters(10.0), dec!(16093.44));
        assert_eq!(miles_to_meters(0.0), Decimal::ZERO);
        assert_eq!(miles_to_meters(f64::NAN), Decimal::ZERO);
    }

    #[test]
    fn test_miles_to_meters_overflow_is_zero() {
        assert_eq!(miles_to_meters(1e28), Decimal::ZERO);
        assert_eq!(miles_to_meters(-1e28), Decimal::ZERO);
        assert_eq!(miles_to_meters(f64::INFINITY), Decimal::ZERO);
    }

    #[test]
    fn test_speed_units() {
        let mps = SpeedUnit::MilesPerHour.to_meters_per_second(22.37);
        assert!((mps - 10.0).abs() < 1e-9);
        assert_eq!(SpeedUnit::MetersPerSecond.to_meters_per_second(7.5), 7.5);
    }

    #[test]
    fn test_default_policy_keeps_average_unconverted() {
        let policy = UnitPolicy::default();
        assert_eq!(policy.max_speed, SpeedUnit::MilesPerHour);
        assert_eq!(policy.sample_speed, SpeedUnit::MilesPerHour);
        assert_eq!(policy.avg_speed, SpeedUnit::MetersPerSecond);
    }
}
