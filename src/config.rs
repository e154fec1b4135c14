use crate::actions::ActionDelays;
use crate::notify::DEFAULT_TTL_MS;
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "PORTALD_CONFIG";

/// Runtime settings. Every field has a default so a config file only needs
/// the keys it changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub log_level: String,
    pub workspace: Option<PathBuf>,
    pub stats_refresh_ms: u64,
    pub notification_ttl_ms: u64,
    /// Delay per action key, e.g. `"contact.submit": 1500`.
    pub action_delays: BTreeMap<String, u64>,
    /// Forces every action delay when set.
    pub action_delay_override_ms: Option<u64>,
    /// Domains loaded from the built-in fixtures at startup.
    pub autoload: Vec<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            workspace: None,
            stats_refresh_ms: 30_000,
            notification_ttl_ms: DEFAULT_TTL_MS,
            action_delays: BTreeMap::new(),
            action_delay_override_ms: None,
            autoload: Vec::new(),
        }
    }
}

impl PortalConfig {
    /// Defaults, then the file named by `PORTALD_CONFIG`, then individual
    /// environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&PathBuf::from(path))?,
            Err(_) => Self::default(),
        };
        cfg.apply_env_overrides(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.to_string_lossy()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid config {}", path.to_string_lossy()))
    }

    pub fn apply_env_overrides<F>(&mut self, var: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = var("PORTALD_LOG") {
            self.log_level = level;
        }
        if let Some(ms) = var("PORTALD_ACTION_DELAY_MS") {
            self.action_delay_override_ms = Some(
                ms.parse()
                    .map_err(|_| anyhow::anyhow!("Invalid PORTALD_ACTION_DELAY_MS value: {}", ms))?,
            );
        }
        if let Some(ms) = var("PORTALD_STATS_REFRESH_MS") {
            self.stats_refresh_ms = ms
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid PORTALD_STATS_REFRESH_MS value: {}", ms))?;
        }
        if let Some(ws) = var("PORTALD_WORKSPACE") {
            self.workspace = Some(PathBuf::from(ws));
        }
        Ok(())
    }

    pub fn action_delays(&self) -> ActionDelays {
        ActionDelays {
            per_key: self.action_delays.clone(),
            forced_ms: self.action_delay_override_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: PortalConfig =
            serde_json::from_str(r#"{ "stats_refresh_ms": 1000, "autoload": ["courses"] }"#).unwrap();
        assert_eq!(cfg.stats_refresh_ms, 1000);
        assert_eq!(cfg.notification_ttl_ms, 3000);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.autoload, vec!["courses"]);
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = [
            ("PORTALD_LOG", "debug"),
            ("PORTALD_ACTION_DELAY_MS", "0"),
            ("PORTALD_WORKSPACE", "/tmp/ws"),
        ]
        .into_iter()
        .collect();
        let mut cfg = PortalConfig::default();
        cfg.apply_env_overrides(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.action_delay_override_ms, Some(0));
        assert_eq!(cfg.workspace, Some(PathBuf::from("/tmp/ws")));
        assert_eq!(cfg.stats_refresh_ms, 30_000);
    }

    #[test]
    fn bad_number_is_reported() {
        let mut cfg = PortalConfig::default();
        let err = cfg
            .apply_env_overrides(|k| (k == "PORTALD_STATS_REFRESH_MS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("PORTALD_STATS_REFRESH_MS"));
    }
}
