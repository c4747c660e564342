//! Pure display helpers shared by every front end.
//!
//! Anything that depends on the host locale or time zone goes through
//! [`DisplayFormatter`] so callers can pin the output in tests.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, Utc};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// URL of the provider's 2x icon for `code`. The code is not validated.
pub fn icon_url(code: &str) -> String {
    format!("{ICON_BASE_URL}/{code}@2x.png")
}

/// Compass label for a wind direction in degrees.
///
/// Each label covers the 45 degree sector starting at its heading, so 44 is
/// still "N" and 45 is "NE". Values outside `[0, 360)` wrap around; non-finite
/// input reads as "N".
pub fn wind_direction(deg: f64) -> &'static str {
    if !deg.is_finite() {
        return COMPASS[0];
    }
    let sector = (deg / 45.0).floor() as i64;
    COMPASS[sector.rem_euclid(COMPASS.len() as i64) as usize]
}

/// Visual theme bucket for a primary condition label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackgroundClass {
    Clear,
    Clouds,
    Rain,
    Thunder,
    Snow,
    Mist,
    Default,
}

impl BackgroundClass {
    /// Exact, case-sensitive match on the provider's primary category.
    pub fn from_condition(main: &str) -> Self {
        match main {
            "Clear" => Self::Clear,
            "Clouds" => Self::Clouds,
            "Rain" | "Drizzle" => Self::Rain,
            "Thunderstorm" => Self::Thunder,
            "Snow" => Self::Snow,
            "Mist" | "Fog" | "Haze" => Self::Mist,
            _ => Self::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "bg-clear",
            Self::Clouds => "bg-clouds",
            Self::Rain => "bg-rain",
            Self::Thunder => "bg-thunder",
            Self::Snow => "bg-snow",
            Self::Mist => "bg-mist",
            Self::Default => "bg-default",
        }
    }
}

impl std::fmt::Display for BackgroundClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locale-dependent rendering of times and dates.
pub trait DisplayFormatter {
    /// Hour and minute for an epoch-seconds instant.
    fn time_of_day(&self, epoch_secs: i64) -> String;

    /// Short "weekday, month day" label for a provider timestamp string.
    fn day_label(&self, timestamp: &str) -> String;
}

/// 24-hour clock and English day names at a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFormatter {
    offset: FixedOffset,
}

impl ClockFormatter {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Uses the host's current UTC offset.
    pub fn local() -> Self {
        Self::new(*Local::now().offset())
    }
}

impl DisplayFormatter for ClockFormatter {
    fn time_of_day(&self, epoch_secs: i64) -> String {
        DateTime::from_timestamp(epoch_secs, 0)
            .map(|dt| dt.with_timezone(&self.offset).format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string())
    }

    /// Naive timestamps are shown as-is; timestamps carrying an offset are
    /// shifted to this formatter's offset. Unparsable input is returned unchanged.
    fn day_label(&self, timestamp: &str) -> String {
        parse_day(timestamp, self.offset)
            .map(|date| date.format("%a, %b %-d").to_string())
            .unwrap_or_else(|| timestamp.to_string())
    }
}

fn parse_day(timestamp: &str, offset: FixedOffset) -> Option<NaiveDate> {
    let s = timestamp.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&offset).date_naive());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
