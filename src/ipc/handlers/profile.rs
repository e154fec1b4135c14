use crate::error::{PortalError, Result};
use crate::ipc::effects::{self, Effect, ProfileSection};
use crate::ipc::error::respond;
use crate::ipc::helpers::{get_object, to_value, today};
use crate::ipc::types::{AppState, Request};
use serde_json::Value;

fn handle_get(state: &AppState) -> Result<Value> {
    let profile = state
        .portal
        .profile
        .as_ref()
        .ok_or_else(|| PortalError::NoDataSource("profile".into()))?;
    to_value(profile)
}

fn start_update(state: &mut AppState, section: ProfileSection, params: &Value) -> Result<Value> {
    let patch = get_object(params, "fields")?.clone();
    let today = today(params)?;
    effects::begin(
        state,
        Effect::UpdateProfile {
            section,
            patch,
            today,
        },
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let section = match req.method.as_str() {
        "profile.get" => return Some(respond(&req.id, handle_get(state))),
        "profile.updatePersonal" => ProfileSection::Personal,
        "profile.updateAcademic" => ProfileSection::Academic,
        "profile.updatePreferences" => ProfileSection::Preferences,
        "profile.updateSecurity" => ProfileSection::Security,
        _ => return None,
    };
    Some(respond(&req.id, start_update(state, section, &req.params)))
}
