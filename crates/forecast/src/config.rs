use std::collections::HashMap;

use chrono::Duration;
use rust_decimal::Decimal;

use ecoblock_core::{DomainError, DomainResult};
use ecoblock_inventory::{HistoryWindow, MaterialType};

/// Forecast parameters for one material type.
///
/// - `half_life_events`: an event `h` positions older than the newest one
///   carries half its weight.
/// - `window`: trailing slice of history fed to the weighted average.
/// - `default_rate`: consumption assumed per period when history is too
///   short to average (capped by the quantity on hand).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictorConfig {
    half_life_events: u32,
    window: HistoryWindow,
    default_rate: Decimal,
}

impl PredictorConfig {
    pub const DEFAULT_HALF_LIFE_EVENTS: u32 = 3;
    pub const DEFAULT_WINDOW_EVENTS: usize = 30;
    pub const DEFAULT_RATE: Decimal = Decimal::TEN;

    pub fn new() -> Self {
        Self {
            half_life_events: Self::DEFAULT_HALF_LIFE_EVENTS,
            window: HistoryWindow::LastEvents(Self::DEFAULT_WINDOW_EVENTS),
            default_rate: Self::DEFAULT_RATE,
        }
    }

    pub fn with_half_life_events(mut self, half_life_events: u32) -> Self {
        self.half_life_events = half_life_events;
        self
    }

    pub fn with_window(mut self, window: HistoryWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_default_rate(mut self, default_rate: Decimal) -> Self {
        self.default_rate = default_rate;
        self
    }

    pub fn half_life_events(&self) -> u32 {
        self.half_life_events
    }

    pub fn window(&self) -> HistoryWindow {
        self.window
    }

    pub fn default_rate(&self) -> Decimal {
        self.default_rate
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.half_life_events == 0 {
            return Err(DomainError::validation("half-life must be at least one event"));
        }
        match self.window {
            HistoryWindow::LastEvents(n) if n < 2 => {
                return Err(DomainError::validation(
                    "window must hold at least two events to average",
                ));
            }
            HistoryWindow::Trailing(span) if span <= Duration::zero() => {
                return Err(DomainError::validation("trailing window must be positive"));
            }
            _ => {}
        }
        if self.default_rate < Decimal::ZERO {
            return Err(DomainError::validation("default rate cannot be negative"));
        }
        Ok(())
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Explicit material type → predictor configuration lookup.
///
/// Types without an override use the default configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PredictorTable {
    default: PredictorConfig,
    overrides: HashMap<MaterialType, PredictorConfig>,
}

impl PredictorTable {
    pub fn new(default: PredictorConfig) -> DomainResult<Self> {
        default.validate()?;
        Ok(Self {
            default,
            overrides: HashMap::new(),
        })
    }

    pub fn with_override(
        mut self,
        material_type: MaterialType,
        config: PredictorConfig,
    ) -> DomainResult<Self> {
        config.validate()?;
        self.overrides.insert(material_type, config);
        Ok(self)
    }

    pub fn default_config(&self) -> &PredictorConfig {
        &self.default
    }

    pub fn config_for(&self, material_type: &MaterialType) -> &PredictorConfig {
        self.overrides.get(material_type).unwrap_or(&self.default)
    }

    pub fn has_override(&self, material_type: &MaterialType) -> bool {
        self.overrides.contains_key(material_type)
    }
}
