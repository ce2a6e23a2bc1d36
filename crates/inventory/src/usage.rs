use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use ecoblock_core::{DomainError, DomainResult};

use crate::material::MaterialType;

/// A single observed consumption of a material type.
///
/// Refers to its material by value only: the event outlives the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageEvent {
    #[serde(rename = "material")]
    material_type: MaterialType,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    timestamp: DateTime<Utc>,
}

impl UsageEvent {
    pub fn new(
        material_type: MaterialType,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("usage amount must be positive"));
        }
        Ok(Self {
            material_type,
            amount,
            timestamp,
        })
    }

    pub fn material_type(&self) -> &MaterialType {
        &self.material_type
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Which trailing slice of a material's history to read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HistoryWindow {
    /// Every retained event.
    All,
    /// The most recent `n` events.
    LastEvents(usize),
    /// Events no older than this, measured back from the newest event of
    /// the same material type (not from the wall clock).
    Trailing(Duration),
}

impl HistoryWindow {
    fn select(self, events: &VecDeque<UsageEvent>) -> Vec<UsageEvent> {
        match self {
            HistoryWindow::All => events.iter().cloned().collect(),
            HistoryWindow::LastEvents(n) => {
                let skip = events.len().saturating_sub(n);
                events.iter().skip(skip).cloned().collect()
            }
            HistoryWindow::Trailing(span) => {
                let Some(newest) = events.back().map(UsageEvent::timestamp) else {
                    return Vec::new();
                };
                // A span reaching past the earliest representable instant
                // covers the whole stream.
                let Some(cutoff) = newest.checked_sub_signed(span) else {
                    return events.iter().cloned().collect();
                };
                events
                    .iter()
                    .filter(|e| e.timestamp >= cutoff)
                    .cloned()
                    .collect()
            }
        }
    }
}

type Stream = Arc<Mutex<VecDeque<UsageEvent>>>;

/// Append-only consumption log, one ordered stream per material type.
///
/// Each stream keeps at most `retention` events; the oldest are dropped
/// first. At most `max_streams` material types are tracked: opening a stream
/// beyond that evicts the one whose newest event is oldest. Appends to
/// different material types do not contend.
#[derive(Debug)]
pub struct UsageHistory {
    streams: RwLock<HashMap<MaterialType, Stream>>,
    retention: usize,
    max_streams: usize,
}

impl UsageHistory {
    pub const DEFAULT_RETENTION: usize = 1_000;
    pub const DEFAULT_MAX_STREAMS: usize = 10_000;

    pub fn new() -> Self {
        Self::with_limits(Self::DEFAULT_RETENTION, Self::DEFAULT_MAX_STREAMS)
    }

    pub fn with_retention(retention: usize) -> Self {
        Self::with_limits(retention, Self::DEFAULT_MAX_STREAMS)
    }

    /// `retention` is clamped to at least 2 so a forecast can always see a
    /// trend; `max_streams` to at least 1.
    pub fn with_limits(retention: usize, max_streams: usize) -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
            retention: retention.max(2),
            max_streams: max_streams.max(1),
        }
    }

    pub fn max_streams(&self) -> usize {
        self.max_streams
    }

    /// Number of material types with a stream.
    pub fn tracked_types(&self) -> DomainResult<usize> {
        Ok(self.streams.read().map_err(|_| poisoned())?.len())
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    fn stream(&self, material_type: &MaterialType) -> DomainResult<Option<Stream>> {
        let streams = self.streams.read().map_err(|_| poisoned())?;
        Ok(streams.get(material_type).cloned())
    }

    fn stream_or_create(&self, material_type: &MaterialType) -> DomainResult<Stream> {
        if let Some(stream) = self.stream(material_type)? {
            return Ok(stream);
        }
        let mut streams = self.streams.write().map_err(|_| poisoned())?;
        if !streams.contains_key(material_type) && streams.len() >= self.max_streams {
            evict_stalest(&mut streams);
        }
        let stream = streams
            .entry(material_type.clone())
            .or_insert_with(|| Arc::new(Mutex::new(VecDeque::new())));
        Ok(Arc::clone(stream))
    }

    /// Append an event.
    ///
    /// Rejects non-positive amounts and timestamps earlier than the last
    /// recorded one for the same material type; a rejected event leaves the
    /// stream unchanged.
    pub fn record(&self, event: UsageEvent) -> DomainResult<()> {
        if event.amount <= Decimal::ZERO {
            return Err(DomainError::validation("usage amount must be positive"));
        }

        let stream = self.stream_or_create(&event.material_type)?;
        let mut events = stream.lock().map_err(|_| poisoned())?;

        if let Some(last) = events.back() {
            if event.timestamp < last.timestamp {
                return Err(DomainError::validation(format!(
                    "usage for {} at {} is earlier than the last recorded event at {}",
                    event.material_type, event.timestamp, last.timestamp
                )));
            }
        }

        events.push_back(event);
        while events.len() > self.retention {
            events.pop_front();
        }
        Ok(())
    }

    /// Events for one material type inside `window`, oldest first.
    ///
    /// Empty if the type has no history.
    pub fn events_for(
        &self,
        material_type: &MaterialType,
        window: HistoryWindow,
    ) -> DomainResult<Vec<UsageEvent>> {
        let Some(stream) = self.stream(material_type)? else {
            return Ok(Vec::new());
        };
        let events = stream.lock().map_err(|_| poisoned())?;
        Ok(window.select(&events))
    }

    pub fn last_timestamp(&self, material_type: &MaterialType) -> DomainResult<Option<DateTime<Utc>>> {
        let Some(stream) = self.stream(material_type)? else {
            return Ok(None);
        };
        let events = stream.lock().map_err(|_| poisoned())?;
        Ok(events.back().map(UsageEvent::timestamp))
    }
}

impl Default for UsageHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop the stream whose newest event is oldest. Empty or poisoned streams
/// go first.
fn evict_stalest(streams: &mut HashMap<MaterialType, Stream>) {
    let stalest = streams
        .iter()
        .map(|(kind, stream)| {
            let newest = stream
                .lock()
                .map(|events| events.back().map(UsageEvent::timestamp))
                .unwrap_or(None);
            (newest, kind)
        })
        .min()
        .map(|(_, kind)| kind.clone());

    if let Some(kind) = stalest {
        streams.remove(&kind);
        tracing::debug!(material = %kind, "usage stream evicted");
    }
}

fn poisoned() -> DomainError {
    DomainError::internal("usage history lock poisoned")
}
