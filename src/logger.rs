//! Append-only event sink between the simulation and the presentation layer.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::costs::CostTag;

const EVENT_BACKLOG_CAP: usize = 256;

/// One logged simulation event, keyed `log.<area>.<what>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub key: String,
    #[serde(default)]
    pub tag: Option<CostTag>,
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl LogEvent {
    #[must_use]
    pub fn keyed(key: &str) -> Self {
        Self {
            key: key.to_string(),
            tag: None,
            amount_cents: None,
            detail: None,
        }
    }

    #[must_use]
    pub fn money(key: &str, tag: CostTag, amount_cents: i64) -> Self {
        Self {
            key: key.to_string(),
            tag: Some(tag),
            amount_cents: Some(amount_cents),
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

/// Fire-and-forget event sink. Delivery is synchronous-or-dropped: `publish`
/// never fails and never blocks a simulation step.
pub trait UiLogger {
    fn publish(&mut self, event: LogEvent);
}

/// Sink that drops every event; used when no listener is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl UiLogger for NullLogger {
    fn publish(&mut self, _event: LogEvent) {}
}

/// Bounded in-memory backlog the presentation layer drains between frames.
/// Oldest events are discarded once the cap is reached.
#[derive(Debug, Clone, Default)]
pub struct EventBuffer {
    events: VecDeque<LogEvent>,
}

impl EventBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove and return all buffered events, oldest first.
    pub fn drain(&mut self) -> Vec<LogEvent> {
        self.events.drain(..).collect()
    }

    /// Peek the buffered events without consuming them.
    #[must_use]
    pub fn events(&self) -> impl Iterator<Item = &LogEvent> {
        self.events.iter()
    }
}

impl UiLogger for EventBuffer {
    fn publish(&mut self, event: LogEvent) {
        if self.events.len() >= EVENT_BACKLOG_CAP {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}
