//! Search flow: one lookup of current conditions, then one forecast fetch for
//! the same city.
//!
//! The controller can drive both stages itself ([`SearchController::search`])
//! or hand them out as tickets ([`SearchController::begin`]) for hosts that
//! run requests elsewhere. Every search bumps a generation counter, and a
//! ticket from an older generation is discarded when it comes back, so the
//! most recently started search always owns the state.

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    WeatherProvider,
    model::{CurrentConditions, ForecastPoint, daily_samples},
};

/// Message shown for any failed lookup.
pub const LOOKUP_FAILED_MESSAGE: &str = "City not found. Please try another city name.";

#[derive(Debug, Error)]
pub enum SearchError {
    /// Current conditions could not be fetched (transport, bad query or
    /// unknown city; callers cannot tell these apart).
    #[error("{}", LOOKUP_FAILED_MESSAGE)]
    LookupFailure(#[source] anyhow::Error),

    /// Forecast failed after a successful lookup.
    #[error("Forecast unavailable")]
    ForecastUnavailable(#[source] anyhow::Error),
}

/// Where the current search is in its two-stage pipeline.
#[derive(Debug, Default)]
pub enum Phase {
    #[default]
    Idle,
    FetchingCurrent,
    FetchingForecast {
        current: CurrentConditions,
    },
    Success {
        current: CurrentConditions,
        forecast: Vec<ForecastPoint>,
    },
    /// Current conditions are shown; the forecast request failed.
    PartialSuccess {
        current: CurrentConditions,
        cause: SearchError,
    },
    Failed {
        error: SearchError,
    },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::FetchingCurrent => "fetching-current",
            Phase::FetchingForecast { .. } => "fetching-forecast",
            Phase::Success { .. } => "success",
            Phase::PartialSuccess { .. } => "partial-success",
            Phase::Failed { .. } => "failed",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Phase::FetchingCurrent | Phase::FetchingForecast { .. })
    }
}

/// View state owned by a [`SearchController`].
#[derive(Debug, Default)]
pub struct SearchState {
    query: String,
    phase: Phase,
    searched: bool,
}

impl SearchState {
    /// The query input buffer.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn current(&self) -> Option<&CurrentConditions> {
        match &self.phase {
            Phase::FetchingForecast { current }
            | Phase::Success { current, .. }
            | Phase::PartialSuccess { current, .. } => Some(current),
            Phase::Idle | Phase::FetchingCurrent | Phase::Failed { .. } => None,
        }
    }

    /// Daily forecast samples, empty unless the forecast stage succeeded.
    pub fn forecast(&self) -> &[ForecastPoint] {
        match &self.phase {
            Phase::Success { forecast, .. } => forecast,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase.is_loading()
    }

    /// User-facing error, set only when the lookup failed.
    pub fn error(&self) -> Option<&'static str> {
        match self.phase {
            Phase::Failed { .. } => Some(LOOKUP_FAILED_MESSAGE),
            _ => None,
        }
    }

    /// Whether any search has been started since construction.
    pub fn has_searched(&self) -> bool {
        self.searched
    }
}

/// Permission to deliver a current-conditions result.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct LookupTicket {
    generation: u64,
    city: String,
}

impl LookupTicket {
    pub fn city(&self) -> &str {
        &self.city
    }
}

/// Permission to deliver a forecast result. Only a successful lookup hands
/// one out, and it always names the city that was looked up.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct ForecastTicket {
    generation: u64,
    city: String,
}

impl ForecastTicket {
    pub fn city(&self) -> &str {
        &self.city
    }
}

/// A key press delivered to the search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Char(char),
    Other,
}

impl From<&str> for Key {
    /// Maps DOM-style key names ("Enter", "Backspace", "a") to keys.
    fn from(name: &str) -> Self {
        match name {
            "Enter" => Key::Enter,
            "Backspace" => Key::Backspace,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other,
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct SearchController<P> {
    provider: P,
    state: SearchState,
    generation: u64,
}

impl<P: WeatherProvider> SearchController<P> {
    pub fn new(provider: P) -> Self {
        Self { provider, state: SearchState::default(), generation: 0 }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
    }

    /// Run a full search for `query`: lookup, then forecast on success.
    ///
    /// Returns `false` without touching any state when the query is blank.
    pub async fn search(&mut self, query: &str) -> bool {
        let Some(ticket) = self.begin(query) else {
            return false;
        };

        let result = self.provider.current_conditions(ticket.city()).await;
        if let Some(next) = self.complete_lookup(ticket, result) {
            let result = self.provider.forecast(next.city()).await;
            self.complete_forecast(next, result);
        }
        true
    }

    /// Search for whatever is in the query buffer.
    pub async fn submit(&mut self) -> bool {
        let query = self.state.query.clone();
        self.search(&query).await
    }

    /// Edit the query buffer; `Enter` submits it. Returns whether a search ran.
    pub async fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Enter => return self.submit().await,
            Key::Backspace => {
                self.state.query.pop();
            }
            Key::Char(c) => self.state.query.push(c),
            Key::Other => {}
        }
        false
    }

    /// Start a search and return the ticket for its lookup stage.
    ///
    /// Blank queries return `None` and leave the state untouched. Otherwise
    /// previous results and errors are cleared and any in-flight search is
    /// superseded.
    pub fn begin(&mut self, query: &str) -> Option<LookupTicket> {
        let city = query.trim();
        if city.is_empty() {
            return None;
        }

        self.generation += 1;
        if self.state.query != query {
            self.state.query = query.to_string();
        }
        self.state.phase = Phase::FetchingCurrent;
        self.state.searched = true;
        debug!(city, generation = self.generation, "search started");

        Some(LookupTicket { generation: self.generation, city: city.to_string() })
    }

    /// Deliver the lookup result. On success returns the ticket for the
    /// forecast stage; on failure the search ends with the lookup error.
    pub fn complete_lookup(
        &mut self,
        ticket: LookupTicket,
        result: anyhow::Result<CurrentConditions>,
    ) -> Option<ForecastTicket> {
        if self.is_stale(ticket.generation) {
            debug!(city = %ticket.city, generation = ticket.generation, "discarding stale lookup");
            return None;
        }
        if !matches!(self.state.phase, Phase::FetchingCurrent) {
            debug!(city = %ticket.city, phase = self.state.phase.name(), "lookup already settled");
            return None;
        }

        match result {
            Ok(current) => {
                debug!(city = %ticket.city, "lookup succeeded, fetching forecast");
                self.state.phase = Phase::FetchingForecast { current };
                Some(ForecastTicket { generation: ticket.generation, city: ticket.city })
            }
            Err(err) => {
                warn!(city = %ticket.city, error = %format!("{err:#}"), "lookup failed");
                self.state.phase = Phase::Failed { error: SearchError::LookupFailure(err) };
                None
            }
        }
    }

    /// Deliver the forecast result. Returns whether it was applied.
    pub fn complete_forecast(
        &mut self,
        ticket: ForecastTicket,
        result: anyhow::Result<Vec<ForecastPoint>>,
    ) -> bool {
        if self.is_stale(ticket.generation) {
            debug!(city = %ticket.city, generation = ticket.generation, "discarding stale forecast");
            return false;
        }

        let current = match std::mem::take(&mut self.state.phase) {
            Phase::FetchingForecast { current } => current,
            other => {
                self.state.phase = other;
                return false;
            }
        };

        self.state.phase = match result {
            Ok(points) => {
                let forecast = daily_samples(points);
                debug!(city = %ticket.city, days = forecast.len(), "forecast loaded");
                Phase::Success { current, forecast }
            }
            Err(err) => {
                warn!(city = %ticket.city, error = %format!("{err:#}"), "forecast unavailable");
                Phase::PartialSuccess { current, cause: SearchError::ForecastUnavailable(err) }
            }
        };
        true
    }

    fn is_stale(&self, generation: u64) -> bool {
        generation != self.generation
    }
}
