use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::actions::ActionQueue;
use crate::config::PortalConfig;
use crate::domains::contact::{DraftStore, MemoryDrafts};
use crate::domains::Portal;
use crate::ipc::effects::Effect;
use crate::notify::Outbox;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Summaries recomputed by the stats ticker.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub ticks: u64,
    pub computed_at: Option<DateTime<Utc>>,
    pub domains: BTreeMap<String, serde_json::Value>,
}

pub struct AppState {
    pub config: PortalConfig,
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub portal: Portal,
    pub actions: ActionQueue<Effect>,
    pub outbox: Outbox,
    pub memory_drafts: MemoryDrafts,
    pub stats: StatsSnapshot,
}

impl AppState {
    pub fn new(config: PortalConfig) -> Self {
        let actions = ActionQueue::new(config.action_delays());
        let outbox = Outbox::new(config.notification_ttl_ms);
        Self {
            config,
            workspace: None,
            db: None,
            portal: Portal::new(),
            actions,
            outbox,
            memory_drafts: MemoryDrafts::default(),
            stats: StatsSnapshot::default(),
        }
    }

    /// Workspace database when one is open, in-memory drafts otherwise.
    pub fn drafts(&self) -> &dyn DraftStore {
        match &self.db {
            Some(conn) => conn as &dyn DraftStore,
            None => &self.memory_drafts,
        }
    }

    pub fn drafts_mut(&mut self) -> &mut dyn DraftStore {
        match &mut self.db {
            Some(conn) => conn as &mut dyn DraftStore,
            None => &mut self.memory_drafts,
        }
    }
}
