use crate::domains::contact::{self, ContactForm, DRAFT_KEY};
use crate::error::{FieldError, PortalError, Result};
use crate::ipc::effects::{self, Effect};
use crate::ipc::error::respond;
use crate::ipc::helpers::{get_opt_str, to_value};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};

/// Read once when the form opens. No draft means an empty form.
fn handle_draft_get(state: &mut AppState) -> Result<Value> {
    let draft = contact::load_draft(state.drafts())?;
    let progress = draft.as_ref().map(ContactForm::progress).unwrap_or(0);
    Ok(json!({ "draft": draft, "progress": progress }))
}

/// Called on every field change.
fn handle_draft_save(state: &mut AppState, params: &Value) -> Result<Value> {
    let form = ContactForm::from_params(params)?;
    let saved = contact::autosave(state.drafts_mut(), &form)?;
    Ok(json!({ "saved": saved, "progress": form.progress() }))
}

fn handle_validate(params: &Value) -> Result<Value> {
    let form = ContactForm::from_params(params)?;
    let errors: Vec<FieldError> = match get_opt_str(params, "field") {
        Some(field) => form.validate_field(field)?.into_iter().collect(),
        None => form.validate(),
    };
    Ok(json!({
        "valid": errors.is_empty(),
        "errors": to_value(&errors)?,
        "progress": form.progress(),
    }))
}

fn handle_submit(state: &mut AppState, params: &Value) -> Result<Value> {
    let form = ContactForm::from_params(params)?;
    let errors = form.validate();
    if !errors.is_empty() {
        return Err(PortalError::Validation(errors));
    }
    effects::begin(state, Effect::SubmitContact(form))
}

fn handle_reset(state: &mut AppState) -> Result<Value> {
    state.drafts_mut().clear_draft(DRAFT_KEY)?;
    Ok(json!({ "cleared": true, "progress": 0 }))
}

fn handle_progress(params: &Value) -> Result<Value> {
    let form = ContactForm::from_params(params)?;
    Ok(json!({ "progress": form.progress() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    let result = match req.method.as_str() {
        "contact.draft.get" => handle_draft_get(state),
        "contact.draft.save" => handle_draft_save(state, p),
        "contact.validate" => handle_validate(p),
        "contact.submit" => handle_submit(state, p),
        "contact.reset" => handle_reset(state),
        "contact.progress" => handle_progress(p),
        "contact.submissions" => state
            .drafts()
            .submission_count()
            .map(|count| json!({ "count": count })),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
