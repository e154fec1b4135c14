pub mod actions;
pub mod announcements;
pub mod attendance;
pub mod contact;
pub mod core;
pub mod courses;
pub mod grades;
pub mod profile;
pub mod research;
pub mod stats;

use crate::domains::Domain;
use crate::error::{PortalError, Result};
use crate::export::default_bundle_path;
use crate::ipc::effects::{self, Effect};
use crate::ipc::helpers::get_opt_str;
use crate::ipc::types::AppState;
use std::path::PathBuf;

/// Starts `{domain}.export`. The bundle goes to `params.outPath`, or under
/// the workspace when no path is given.
pub(crate) fn start_export(
    state: &mut AppState,
    domain: Domain,
    params: &serde_json::Value,
) -> Result<serde_json::Value> {
    let out_path = match get_opt_str(params, "outPath") {
        Some(p) => PathBuf::from(p),
        None => {
            let ws = state.workspace.as_ref().ok_or(PortalError::NoWorkspace)?;
            default_bundle_path(ws, domain.as_str(), chrono::Utc::now())
        }
    };
    effects::begin(state, Effect::Export { domain, out_path })
}
