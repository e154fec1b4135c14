use super::effects;
use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::{err, with_notifications};

fn dispatch(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = handlers::core::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::announcements::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::attendance::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::grades::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::courses::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::research::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::profile::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::contact::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::actions::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::stats::try_handle(state, req) {
        return resp;
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    // Timers that came due while idle fire before the new request is seen.
    effects::resolve_due(state);
    let resp = dispatch(state, &req);
    with_notifications(resp, state.outbox.drain())
}

/// Periodic work between requests. Notifications raised by actions that
/// resolve here stay queued for the next response.
pub fn tick(state: &mut AppState) {
    effects::resolve_due(state);
    handlers::stats::refresh(state);
}
