use crate::domains::Domain;
use crate::ipc::error::respond;
use crate::ipc::helpers::to_value;
use crate::ipc::types::{AppState, Request};

/// Recomputes the summary of every loaded domain. Driven by the ticker and
/// by `stats.refresh`.
pub fn refresh(state: &mut AppState) {
    let mut domains = std::collections::BTreeMap::new();
    for domain in state.portal.loaded().filter(|d| *d != Domain::Profile) {
        match state.portal.summary(domain) {
            Ok(summary) => {
                domains.insert(domain.as_str().to_string(), summary);
            }
            Err(e) => tracing::warn!(domain = domain.as_str(), error = %e, "summary failed"),
        }
    }
    state.stats.domains = domains;
    state.stats.ticks += 1;
    state.stats.computed_at = Some(chrono::Utc::now());
    tracing::debug!(ticks = state.stats.ticks, "stats refreshed");
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "stats.snapshot" => Some(respond(&req.id, to_value(&state.stats))),
        "stats.refresh" => {
            refresh(state);
            Some(respond(&req.id, to_value(&state.stats)))
        }
        _ => None,
    }
}
