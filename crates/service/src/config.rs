//! Service configuration (environment driven, with defaults).

use std::str::FromStr;

use rust_decimal::Decimal;

use ecoblock_core::DomainResult;
use ecoblock_forecast::{PredictorConfig, PredictorTable};
use ecoblock_inventory::{HistoryWindow, SourceRegistry, UsageHistory};

pub const ENV_HALF_LIFE_EVENTS: &str = "ECOBLOCK_HALF_LIFE_EVENTS";
pub const ENV_WINDOW_EVENTS: &str = "ECOBLOCK_WINDOW_EVENTS";
pub const ENV_DEFAULT_RATE: &str = "ECOBLOCK_DEFAULT_RATE";
pub const ENV_RETENTION_EVENTS: &str = "ECOBLOCK_RETENTION_EVENTS";
pub const ENV_VERIFY_SOURCES: &str = "ECOBLOCK_VERIFY_SOURCES";
pub const ENV_MAX_TRACKED_TYPES: &str = "ECOBLOCK_MAX_TRACKED_TYPES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub half_life_events: u32,
    pub window_events: usize,
    pub default_rate: Decimal,
    pub retention_events: usize,
    /// Material types with a usage stream; the stalest is evicted beyond this.
    pub max_tracked_types: usize,
    pub verify_sources: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            half_life_events: PredictorConfig::DEFAULT_HALF_LIFE_EVENTS,
            window_events: PredictorConfig::DEFAULT_WINDOW_EVENTS,
            default_rate: PredictorConfig::DEFAULT_RATE,
            retention_events: UsageHistory::DEFAULT_RETENTION,
            max_tracked_types: UsageHistory::DEFAULT_MAX_STREAMS,
            verify_sources: false,
        }
    }
}

impl ServiceConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults and
    /// unparsable values fall back to defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            half_life_events: parse_or(&lookup, ENV_HALF_LIFE_EVENTS, defaults.half_life_events),
            window_events: parse_or(&lookup, ENV_WINDOW_EVENTS, defaults.window_events),
            default_rate: parse_or(&lookup, ENV_DEFAULT_RATE, defaults.default_rate),
            retention_events: parse_or(&lookup, ENV_RETENTION_EVENTS, defaults.retention_events),
            max_tracked_types: parse_or(&lookup, ENV_MAX_TRACKED_TYPES, defaults.max_tracked_types),
            verify_sources: parse_or(&lookup, ENV_VERIFY_SOURCES, defaults.verify_sources),
        }
    }

    /// Predictor configuration applied to every material type without an override.
    pub fn predictor_config(&self) -> PredictorConfig {
        PredictorConfig::new()
            .with_half_life_events(self.half_life_events)
            .with_window(HistoryWindow::LastEvents(self.window_events))
            .with_default_rate(self.default_rate)
    }

    pub fn predictor_table(&self) -> DomainResult<PredictorTable> {
        PredictorTable::new(self.predictor_config())
    }

    pub fn usage_history(&self) -> UsageHistory {
        UsageHistory::with_limits(self.retention_events, self.max_tracked_types)
    }

    pub fn source_registry(&self) -> Option<SourceRegistry> {
        self.verify_sources.then(SourceRegistry::verified_defaults)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + core::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, fallback = %default, "invalid config value; using default");
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_environment_gives_defaults() {
        assert_eq!(ServiceConfig::from_lookup(|_| None), ServiceConfig::default());
    }

    #[test]
    fn values_are_parsed() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ENV_HALF_LIFE_EVENTS, "5"),
            (ENV_WINDOW_EVENTS, "12"),
            (ENV_DEFAULT_RATE, "7.5"),
            (ENV_RETENTION_EVENTS, "64"),
            (ENV_MAX_TRACKED_TYPES, "500"),
            (ENV_VERIFY_SOURCES, "true"),
        ]));

        assert_eq!(config.half_life_events, 5);
        assert_eq!(config.window_events, 12);
        assert_eq!(config.default_rate, Decimal::new(75, 1));
        assert_eq!(config.max_tracked_types, 500);
        assert_eq!(config.usage_history().max_streams(), 500);
        assert_eq!(config.retention_events, 64);
        assert!(config.verify_sources);
        assert!(config.source_registry().is_some());
        assert_eq!(config.predictor_config().window(), HistoryWindow::LastEvents(12));
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ENV_HALF_LIFE_EVENTS, "soon"),
            (ENV_VERIFY_SOURCES, "maybe"),
        ]));
        assert_eq!(config.half_life_events, PredictorConfig::DEFAULT_HALF_LIFE_EVENTS);
        assert!(!config.verify_sources);
        assert!(config.source_registry().is_none());
    }

    #[test]
    fn invalid_predictor_settings_surface_on_table_build() {
        let config = ServiceConfig {
            window_events: 1,
            ..ServiceConfig::default()
        };
        assert!(config.predictor_table().is_err());
    }
}
