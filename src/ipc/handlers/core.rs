use crate::datasource::{BundleSource, DataSource, FixtureSource};
use crate::db;
use crate::domains::contact::DRAFT_KEY;
use crate::domains::{Domain, DomainData};
use crate::error::{PortalError, Result};
use crate::ipc::error::{err, ok, respond};
use crate::ipc::helpers::{get_opt_str, get_required_str, get_str_list};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "loaded": state.portal.loaded().map(|d| d.as_str()).collect::<Vec<_>>(),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match db::open_db(&path) {
        Ok(conn) => {
            // A draft typed before the workspace existed moves into it.
            let carried = state.memory_drafts.take_draft(DRAFT_KEY);
            state.workspace = Some(path.clone());
            state.db = Some(conn);
            if let Some(payload) = carried {
                if let Err(e) = state.drafts_mut().save_draft(DRAFT_KEY, &payload) {
                    tracing::warn!(error = %e, "failed to carry contact draft into workspace");
                }
            }
            tracing::info!(workspace = %path.display(), "workspace selected");
            ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
        }
        Err(e) => err(&req.id, "db_failed", format!("{e:?}"), None),
    }
}

/// Domains named by `params.domain` (a name or `all`) or `params.domains`.
fn requested_domains(params: &serde_json::Value) -> Result<Vec<Domain>> {
    let mut names = get_str_list(params, "domains")?;
    if let Some(one) = get_opt_str(params, "domain") {
        names.push(one.to_string());
    }
    if names.is_empty() {
        return Err(PortalError::BadParams("missing domain".into()));
    }
    if names.iter().any(|n| n == "all") {
        return Ok(Domain::ALL.to_vec());
    }
    names.iter().map(|n| Domain::parse(n)).collect()
}

fn load_session(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value> {
    let domains = requested_domains(params)?;
    let source: Box<dyn DataSource> = match get_opt_str(params, "source").unwrap_or("fixtures") {
        "fixtures" => Box::new(FixtureSource),
        "bundle" => Box::new(BundleSource {
            path: PathBuf::from(get_required_str(params, "path")?),
        }),
        other => {
            return Err(PortalError::BadParams(format!(
                "source must be fixtures or bundle (got {other})"
            )))
        }
    };

    // Read everything before installing so a failed source changes nothing.
    let data: Vec<DomainData> = domains
        .iter()
        .map(|d| source.load(*d))
        .collect::<Result<_>>()?;
    let mut loaded = Vec::new();
    for d in data {
        let domain = d.domain();
        let count = state.portal.install(d)?;
        loaded.push(json!({ "domain": domain.as_str(), "count": count }));
    }
    Ok(json!({ "source": source.name(), "loaded": loaded }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "session.load" => Some(respond(&req.id, load_session(state, &req.params))),
        _ => None,
    }
}
