//! Text and JSON views of a search.

use std::fmt;

use serde_json::{Value, json};
use skycast_core::{
    BackgroundClass, CurrentConditions, DisplayFormatter, ForecastPoint, Phase, SearchState,
    icon_url, wind_direction,
};

/// Human-readable report for the current state of a search.
pub fn report(state: &SearchState, fmt: &impl DisplayFormatter) -> String {
    Report { state, fmt }.to_string()
}

struct Report<'a, F> {
    state: &'a SearchState,
    fmt: &'a F,
}

impl<F: DisplayFormatter> fmt::Display for Report<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = self.state.error() {
            return writeln!(f, "{message}");
        }

        let Some(current) = self.state.current() else {
            if self.state.is_loading() {
                writeln!(f, "Loading...")?;
            }
            return Ok(());
        };

        write_current(f, current, self.fmt)?;

        writeln!(f)?;
        match self.state.phase() {
            Phase::Success { forecast, .. } if !forecast.is_empty() => {
                writeln!(f, "Forecast")?;
                for point in forecast {
                    write_forecast_line(f, point, self.fmt)?;
                }
                Ok(())
            }
            Phase::FetchingForecast { .. } => writeln!(f, "Loading forecast..."),
            _ => writeln!(f, "Forecast unavailable."),
        }
    }
}

fn write_current(
    out: &mut impl fmt::Write,
    current: &CurrentConditions,
    fmt: &impl DisplayFormatter,
) -> fmt::Result {
    let primary = current.primary();
    let theme = BackgroundClass::from_condition(primary.map_or("", |c| c.main.as_str()));

    if current.country.is_empty() {
        writeln!(out, "{}  [{theme}]", current.location_name)?;
    } else {
        writeln!(out, "{}, {}  [{theme}]", current.location_name, current.country)?;
    }

    if let Some(condition) = primary {
        writeln!(out, "{}  {}", capitalize(&condition.description), icon_url(&condition.icon))?;
    }

    writeln!(
        out,
        "Temperature  {:.1}°C (feels like {:.1}°C, min {:.1}°C, max {:.1}°C)",
        current.temperature_c, current.feels_like_c, current.temp_min_c, current.temp_max_c,
    )?;
    writeln!(out, "Humidity     {}%", current.humidity_pct)?;
    writeln!(out, "Pressure     {} hPa", current.pressure_hpa)?;
    writeln!(
        out,
        "Wind         {:.1} m/s {}",
        current.wind_speed_mps,
        wind_direction(current.wind_deg),
    )?;
    if let Some(visibility) = current.visibility_m {
        writeln!(out, "Visibility   {:.1} km", f64::from(visibility) / 1000.0)?;
    }
    writeln!(
        out,
        "Sunrise      {}  Sunset {}",
        fmt.time_of_day(current.sunrise),
        fmt.time_of_day(current.sunset),
    )
}

fn write_forecast_line(
    out: &mut impl fmt::Write,
    point: &ForecastPoint,
    fmt: &impl DisplayFormatter,
) -> fmt::Result {
    let description = point.primary().map(|c| c.description.as_str()).unwrap_or_default();
    writeln!(
        out,
        "  {:<12} {:>5.0}°C  ({:.0}° / {:.0}°)  {}",
        fmt.day_label(&point.timestamp),
        point.temperature_c,
        point.temp_min_c,
        point.temp_max_c,
        description,
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Machine-readable view of a search.
pub fn json_report(state: &SearchState) -> Value {
    json!({
        "query": state.query(),
        "phase": state.phase().name(),
        "loading": state.is_loading(),
        "error": state.error(),
        "current": state.current(),
        "forecast": state.forecast(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycast_core::{Condition, OpenWeatherProvider, SearchController};

    /// Fixed output, independent of host locale and time zone.
    struct FixedFormatter;

    impl DisplayFormatter for FixedFormatter {
        fn time_of_day(&self, epoch_secs: i64) -> String {
            format!("t{epoch_secs}")
        }

        fn day_label(&self, timestamp: &str) -> String {
            format!("d:{timestamp}")
        }
    }

    fn controller() -> SearchController<OpenWeatherProvider> {
        // Results are fed through tickets; the provider is never called.
        SearchController::new(OpenWeatherProvider::new("http://unused".into(), "KEY".into()))
    }

    fn current() -> CurrentConditions {
        CurrentConditions {
            location_name: "London".into(),
            country: "GB".into(),
            sunrise: 100,
            sunset: 200,
            temperature_c: 12.44,
            feels_like_c: 11.8,
            temp_min_c: 10.9,
            temp_max_c: 13.6,
            humidity_pct: 81,
            pressure_hpa: 1012,
            conditions: vec![Condition {
                main: "Drizzle".into(),
                description: "light intensity drizzle".into(),
                icon: "09d".into(),
            }],
            wind_speed_mps: 4.6,
            wind_deg: 230.0,
            visibility_m: Some(9000),
        }
    }

    fn point(ts: &str) -> ForecastPoint {
        ForecastPoint {
            timestamp: ts.into(),
            temperature_c: 14.2,
            temp_min_c: 12.0,
            temp_max_c: 15.0,
            humidity_pct: 70,
            conditions: vec![Condition {
                main: "Clouds".into(),
                description: "broken clouds".into(),
                icon: "04d".into(),
            }],
        }
    }

    #[test]
    fn full_report_lists_current_and_forecast() {
        let mut ctl = controller();
        let ticket = ctl.begin("London").unwrap();
        let next = ctl.complete_lookup(ticket, Ok(current())).unwrap();
        ctl.complete_forecast(next, Ok(vec![point("2024-05-01 12:00:00")]));

        let text = report(ctl.state(), &FixedFormatter);
        assert!(text.starts_with("London, GB  [bg-rain]\n"), "{text}");
        assert!(text.contains("Light intensity drizzle  https://openweathermap.org/img/wn/09d@2x.png"));
        assert!(text.contains("Temperature  12.4°C"));
        assert!(text.contains("Wind         4.6 m/s SW"));
        assert!(text.contains("Visibility   9.0 km"));
        assert!(text.contains("Sunrise      t100  Sunset t200"));
        assert!(text.contains("Forecast\n"));
        assert!(text.contains("d:2024-05-01 12:00:00"));
        assert!(text.contains("broken clouds"));
    }

    #[test]
    fn failed_lookup_reports_only_message() {
        let mut ctl = controller();
        let ticket = ctl.begin("Atlantis").unwrap();
        let _ = ctl.complete_lookup(ticket, Err(anyhow::anyhow!("404")));

        assert_eq!(
            report(ctl.state(), &FixedFormatter),
            "City not found. Please try another city name.\n"
        );
    }

    #[test]
    fn missing_forecast_is_called_out() {
        let mut ctl = controller();
        let ticket = ctl.begin("London").unwrap();
        let next = ctl.complete_lookup(ticket, Ok(current())).unwrap();
        ctl.complete_forecast(next, Err(anyhow::anyhow!("503")));

        let text = report(ctl.state(), &FixedFormatter);
        assert!(text.contains("London, GB"));
        assert!(text.ends_with("Forecast unavailable.\n"), "{text}");
    }

    #[test]
    fn in_flight_states_show_progress() {
        let mut ctl = controller();
        assert_eq!(report(ctl.state(), &FixedFormatter), "");

        let ticket = ctl.begin("London").unwrap();
        assert_eq!(report(ctl.state(), &FixedFormatter), "Loading...\n");

        let _next = ctl.complete_lookup(ticket, Ok(current())).unwrap();
        assert!(report(ctl.state(), &FixedFormatter).ends_with("Loading forecast...\n"));
    }

    #[test]
    fn json_report_mirrors_state() {
        let mut ctl = controller();
        let ticket = ctl.begin("London").unwrap();
        let next = ctl.complete_lookup(ticket, Ok(current())).unwrap();
        ctl.complete_forecast(next, Ok(vec![point("a"), point("b")]));

        let value = json_report(ctl.state());
        assert_eq!(value["query"], "London");
        assert_eq!(value["phase"], "success");
        assert_eq!(value["loading"], false);
        assert!(value["error"].is_null());
        assert_eq!(value["current"]["location_name"], "London");
        assert_eq!(value["forecast"].as_array().map(Vec::len), Some(1));
    }

    /// Writer that refuses everything, to check errors are passed up.
    struct Refusing;

    impl fmt::Write for Refusing {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn write_errors_propagate() {
        assert!(write_current(&mut Refusing, &current(), &FixedFormatter).is_err());
        assert!(write_forecast_line(&mut Refusing, &point("a"), &FixedFormatter).is_err());
    }

    #[test]
    fn capitalize_handles_empty_and_unicode() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("éclair"), "Éclair");
    }
}
