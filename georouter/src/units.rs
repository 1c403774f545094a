//! Unit normalization for vendors that do not report meters and seconds.

pub const METERS_PER_MILE: f64 = 1609.344;
pub const METERS_PER_KILOMETER: f64 = 1000.0;
pub const SECONDS_PER_MINUTE: f64 = 60.0;
pub const SECONDS_PER_HOUR: f64 = 3600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Meter,
    Kilometer,
    Mile,
}

impl DistanceUnit {
    /// Parse a vendor-reported unit name, e.g. Bing's `"Mile"`.
    pub fn from_vendor(name: &str) -> Option<DistanceUnit> {
        match name.to_ascii_lowercase().as_str() {
            "meter" | "m" => Some(DistanceUnit::Meter),
            "kilometer" | "km" => Some(DistanceUnit::Kilometer),
            "mile" | "mi" => Some(DistanceUnit::Mile),
            _ => None,
        }
    }

    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            DistanceUnit::Meter => value,
            DistanceUnit::Kilometer => value * METERS_PER_KILOMETER,
            DistanceUnit::Mile => value * METERS_PER_MILE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Second,
    Minute,
    Hour,
}

impl DurationUnit {
    pub fn from_vendor(name: &str) -> Option<DurationUnit> {
        match name.to_ascii_lowercase().as_str() {
            "second" | "s" => Some(DurationUnit::Second),
            "minute" | "min" => Some(DurationUnit::Minute),
            "hour" | "h" => Some(DurationUnit::Hour),
            _ => None,
        }
    }

    pub fn to_seconds(self, value: f64) -> f64 {
        match self {
            DurationUnit::Second => value,
            DurationUnit::Minute => value * SECONDS_PER_MINUTE,
            DurationUnit::Hour => value * SECONDS_PER_HOUR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_to_seconds() {
        assert_eq!(DurationUnit::Minute.to_seconds(2.0), 120.0);
        assert_eq!(DurationUnit::Hour.to_seconds(1.5), 5400.0);
    }

    #[test]
    fn test_miles_to_meters() {
        let meters = DistanceUnit::Mile.to_meters(5.0);
        assert!((meters - 8046.72).abs() < 0.01);
    }

    #[test]
    fn test_vendor_unit_names() {
        assert_eq!(DistanceUnit::from_vendor("Mile"), Some(DistanceUnit::Mile));
        assert_eq!(
            DistanceUnit::from_vendor("Kilometer"),
            Some(DistanceUnit::Kilometer)
        );
        assert_eq!(
            DurationUnit::from_vendor("Minute"),
            Some(DurationUnit::Minute)
        );
        assert_eq!(DistanceUnit::from_vendor("furlong"), None);
    }
}
