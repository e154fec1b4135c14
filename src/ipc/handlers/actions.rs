use crate::error::{PortalError, Result};
use crate::ipc::effects;
use crate::ipc::error::respond;
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};
use std::time::Instant;

fn handle_await(state: &mut AppState, params: &Value) -> Result<Value> {
    let ticket = params
        .get("ticket")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| PortalError::BadParams("missing ticket".into()))?;
    effects::await_ticket(state, ticket)
}

fn handle_list(state: &AppState) -> Value {
    let pending: Vec<Value> = state
        .actions
        .in_flight(Instant::now())
        .into_iter()
        .map(|(ticket, key, remaining_ms)| {
            json!({ "ticket": ticket, "key": key, "remainingMs": remaining_ms })
        })
        .collect();
    json!({ "pending": pending })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "actions.await" => Some(respond(&req.id, handle_await(state, &req.params))),
        "actions.list" => Some(respond(&req.id, Ok(handle_list(state)))),
        _ => None,
    }
}
