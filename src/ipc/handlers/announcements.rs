use crate::domains::announcements::{self, Draft, Priority, Status};
use crate::domains::Domain;
use crate::error::{FieldError, PortalError, Result};
use crate::ipc::effects::{self, BulkSend, Effect};
use crate::ipc::error::respond;
use crate::ipc::handlers::start_export;
use crate::ipc::helpers::{
    delete_record, get_object, get_opt_str, get_record, get_required_str, get_str_list,
    list_store, to_value, today,
};
use crate::ipc::types::{AppState, Request};
use crate::pipeline::Renderable;
use serde_json::{json, Value};

fn draft_from(params: &Value) -> Result<Draft> {
    let fields = get_object(params, "fields")?;
    serde_json::from_value(fields.clone())
        .map_err(|e| PortalError::BadParams(format!("invalid announcement fields: {e}")))
}

fn handle_create(state: &mut AppState, params: &Value) -> Result<Value> {
    let draft = draft_from(params)?;
    effects::begin(
        state,
        Effect::CreateAnnouncement {
            draft,
            status: Status::Sent,
        },
    )
}

fn handle_schedule(state: &mut AppState, params: &Value) -> Result<Value> {
    let draft = draft_from(params)?;
    if draft.date.is_none() {
        let mut errors = match draft.validate() {
            Err(PortalError::Validation(errors)) => errors,
            _ => Vec::new(),
        };
        errors.push(FieldError::new("date", "This field is required"));
        return Err(PortalError::Validation(errors));
    }
    effects::begin(
        state,
        Effect::CreateAnnouncement {
            draft,
            status: Status::Scheduled,
        },
    )
}

fn handle_bulk(state: &mut AppState, params: &Value) -> Result<Value> {
    let priority = match get_opt_str(params, "priority") {
        None => Priority::default(),
        Some(raw) => serde_json::from_value(json!(raw))
            .map_err(|_| PortalError::BadParams(format!("unknown priority: {raw}")))?,
    };
    effects::begin(
        state,
        Effect::BulkAnnouncement(BulkSend {
            title: get_opt_str(params, "title").unwrap_or("").to_string(),
            content: get_opt_str(params, "content").unwrap_or("").to_string(),
            priority,
            courses: get_str_list(params, "courses")?,
        }),
    )
}

fn handle_duplicate(state: &mut AppState, params: &Value) -> Result<Value> {
    let id = get_required_str(params, "id")?;
    let today = today(params)?;
    let copy = announcements::duplicate(&mut state.portal.announcements, id, today)?;
    state.outbox.success("Announcement duplicated successfully");
    Ok(copy.render_item())
}

fn handle_update(state: &mut AppState, params: &Value) -> Result<Value> {
    let id = get_required_str(params, "id")?;
    let fields = get_object(params, "fields")?;
    let updated = state.portal.announcements.update(id, fields)?.render_item();
    state.outbox.success("Announcement updated successfully");
    Ok(updated)
}

fn handle_delete(state: &mut AppState, params: &Value) -> Result<Value> {
    let removed = delete_record(&mut state.portal.announcements, params)?;
    state.outbox.success("Announcement deleted successfully");
    Ok(json!({ "deleted": removed.id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    let result = match req.method.as_str() {
        "announcements.list" => list_store(Domain::Announcements, &state.portal.announcements, p),
        "announcements.get" => get_record(&state.portal.announcements, p),
        "announcements.stats" => to_value(&announcements::summary(state.portal.announcements.records())),
        "announcements.create" => handle_create(state, p),
        "announcements.schedule" => handle_schedule(state, p),
        "announcements.bulk" => handle_bulk(state, p),
        "announcements.duplicate" => handle_duplicate(state, p),
        "announcements.update" => handle_update(state, p),
        "announcements.delete" => handle_delete(state, p),
        "announcements.export" => start_export(state, Domain::Announcements, p),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
