use crate::error::{PortalError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Resolved outcomes kept for `actions.await`; the oldest are dropped first.
const MAX_OUTCOMES: usize = 256;

/// Per-key delays for simulated background work.
#[derive(Debug, Clone, Default)]
pub struct ActionDelays {
    pub per_key: BTreeMap<String, u64>,
    /// When set, every action uses this delay regardless of key.
    pub forced_ms: Option<u64>,
}

impl ActionDelays {
    pub fn delay_for(&self, key: &str, default_ms: u64) -> Duration {
        let ms = self
            .forced_ms
            .or_else(|| self.per_key.get(key).copied())
            .unwrap_or(default_ms);
        Duration::from_millis(ms)
    }
}

/// A started action waiting for its delay to elapse.
#[derive(Debug)]
pub struct Pending<E> {
    pub ticket: u64,
    pub key: String,
    pub ready_at: Instant,
    pub effect: E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub ticket: u64,
    pub delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub ticket: u64,
    pub key: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl Outcome {
    pub fn from_result(ticket: u64, key: &str, result: &Result<serde_json::Value>) -> Self {
        match result {
            Ok(v) => Outcome {
                ticket,
                key: key.to_string(),
                ok: true,
                result: Some(v.clone()),
                error: None,
            },
            Err(e) => Outcome {
                ticket,
                key: key.to_string(),
                ok: false,
                result: None,
                error: Some(serde_json::json!({
                    "code": e.code(),
                    "message": e.to_string(),
                    "details": e.details(),
                })),
            },
        }
    }
}

/// Simulated asynchronous actions. At most one action per key is in flight;
/// a second start of the same key is refused until the first resolves.
#[derive(Debug)]
pub struct ActionQueue<E> {
    next_ticket: u64,
    pending: Vec<Pending<E>>,
    outcomes: BTreeMap<u64, Outcome>,
    delays: ActionDelays,
}

impl<E> ActionQueue<E> {
    pub fn new(delays: ActionDelays) -> Self {
        Self {
            next_ticket: 1,
            pending: Vec::new(),
            outcomes: BTreeMap::new(),
            delays,
        }
    }

    pub fn is_busy(&self, key: &str) -> bool {
        self.pending.iter().any(|p| p.key == key)
    }

    pub fn begin(&mut self, key: &str, default_ms: u64, effect: E, now: Instant) -> Result<Ticket> {
        if self.is_busy(key) {
            return Err(PortalError::Busy(key.to_string()));
        }
        let delay = self.delays.delay_for(key, default_ms);
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending.push(Pending {
            ticket,
            key: key.to_string(),
            ready_at: now + delay,
            effect,
        });
        tracing::debug!(ticket, key, delay_ms = delay.as_millis() as u64, "action started");
        Ok(Ticket {
            ticket,
            delay_ms: delay.as_millis() as u64,
        })
    }

    /// Removes and returns every action whose delay has elapsed, oldest
    /// deadline first.
    pub fn take_due(&mut self, now: Instant) -> Vec<Pending<E>> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|p| p.ready_at <= now);
        self.pending = rest;
        due.sort_by_key(|p| (p.ready_at, p.ticket));
        due
    }

    pub fn ready_at(&self, ticket: u64) -> Option<Instant> {
        self.pending
            .iter()
            .find(|p| p.ticket == ticket)
            .map(|p| p.ready_at)
    }

    pub fn record(&mut self, outcome: Outcome) {
        self.outcomes.insert(outcome.ticket, outcome);
        while self.outcomes.len() > MAX_OUTCOMES {
            self.outcomes.pop_first();
        }
    }

    /// Hands out a resolved outcome once; it is forgotten afterwards.
    pub fn take_outcome(&mut self, ticket: u64) -> Option<Outcome> {
        self.outcomes.remove(&ticket)
    }

    /// Pending actions as `(ticket, key, remaining ms)`.
    pub fn in_flight(&self, now: Instant) -> Vec<(u64, &str, u64)> {
        self.pending
            .iter()
            .map(|p| {
                let remaining = p.ready_at.saturating_duration_since(now).as_millis() as u64;
                (p.ticket, p.key.as_str(), remaining)
            })
            .collect()
    }
}
