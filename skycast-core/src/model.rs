use serde::{Deserialize, Serialize};

/// One weather condition label as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Primary category, e.g. "Clear", "Rain".
    pub main: String,
    pub description: String,
    /// Provider icon code, e.g. "10d".
    pub icon: String,
}

/// Current conditions for a single city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country: String,
    /// Epoch seconds.
    pub sunrise: i64,
    /// Epoch seconds.
    pub sunset: i64,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub conditions: Vec<Condition>,
    pub wind_speed_mps: f64,
    pub wind_deg: f64,
    pub visibility_m: Option<u32>,
}

impl CurrentConditions {
    /// The first condition label, which providers treat as the dominant one.
    pub fn primary(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

/// A single sample from the 3-hour forecast feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Server-side timestamp text, e.g. "2024-05-01 12:00:00".
    pub timestamp: String,
    pub temperature_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: u8,
    pub conditions: Vec<Condition>,
}

impl ForecastPoint {
    pub fn primary(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

/// Samples taken from a 3-hour feed to approximate one entry per day.
pub const DAILY_STRIDE: usize = 8;

/// Maximum number of daily entries kept from a forecast feed.
pub const MAX_FORECAST_DAYS: usize = 5;

/// Reduce a 3-hour forecast feed to at most five daily samples, keeping
/// positions 0, 8, 16, 24 and 32.
pub fn daily_samples(points: Vec<ForecastPoint>) -> Vec<ForecastPoint> {
    points
        .into_iter()
        .step_by(DAILY_STRIDE)
        .take(MAX_FORECAST_DAYS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize) -> ForecastPoint {
        ForecastPoint {
            timestamp: format!("slot-{i}"),
            temperature_c: i as f64,
            temp_min_c: 0.0,
            temp_max_c: 0.0,
            humidity_pct: 50,
            conditions: Vec::new(),
        }
    }

    fn feed(n: usize) -> Vec<ForecastPoint> {
        (0..n).map(point).collect()
    }

    #[test]
    fn forty_entries_keep_every_eighth() {
        let kept: Vec<String> = daily_samples(feed(40)).into_iter().map(|p| p.timestamp).collect();
        assert_eq!(kept, vec!["slot-0", "slot-8", "slot-16", "slot-24", "slot-32"]);
    }

    #[test]
    fn short_feeds_keep_partial_days() {
        assert!(daily_samples(Vec::new()).is_empty());
        assert_eq!(daily_samples(feed(1)).len(), 1);
        assert_eq!(daily_samples(feed(8)).len(), 1);
        assert_eq!(daily_samples(feed(9)).len(), 2);
        assert_eq!(daily_samples(feed(17)).len(), 3);
    }

    #[test]
    fn long_feeds_are_capped_at_five() {
        let kept = daily_samples(feed(100));
        assert_eq!(kept.len(), MAX_FORECAST_DAYS);
        assert_eq!(kept.last().map(|p| p.timestamp.as_str()), Some("slot-32"));
    }
}
