use crate::domains::courses;
use crate::domains::Domain;
use crate::ipc::error::respond;
use crate::ipc::handlers::start_export;
use crate::ipc::helpers::{get_record, list_store, to_value};
use crate::ipc::types::{AppState, Request};

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    let result = match req.method.as_str() {
        "courses.list" => list_store(Domain::Courses, &state.portal.courses, p),
        "courses.get" => get_record(&state.portal.courses, p),
        "courses.stats" => to_value(&courses::summary(state.portal.courses.records())),
        "courses.export" => start_export(state, Domain::Courses, p),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
