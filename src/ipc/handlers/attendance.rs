use crate::domains::attendance::{self, Mark};
use crate::domains::Domain;
use crate::error::Result;
use crate::ipc::error::respond;
use crate::ipc::handlers::start_export;
use crate::ipc::helpers::{
    get_opt_str, get_record, get_required_str, get_str_list, list_store, to_value, today,
};
use crate::ipc::types::{AppState, Request};
use crate::pipeline::Renderable;
use crate::pipeline::filter::parse_date;
use chrono::NaiveDate;
use serde_json::Value;

/// Day the mark counts for: `params.date`, else the reference day.
fn mark_date(params: &Value) -> Result<NaiveDate> {
    match get_opt_str(params, "date") {
        Some(raw) => parse_date(raw),
        None => today(params),
    }
}

fn handle_mark(state: &mut AppState, params: &Value) -> Result<Value> {
    let student_id = get_required_str(params, "studentId")?;
    let mark = Mark::parse(get_required_str(params, "status")?)?;
    let on = mark_date(params)?;
    let student = attendance::mark(&mut state.portal.attendance, student_id, mark, on)?;
    let msg = format!("{} marked as {}", student.name, mark.as_str());
    match mark {
        Mark::Present => state.outbox.success(msg),
        Mark::Absent => state.outbox.warning(msg),
        Mark::Excused => state.outbox.info(msg),
    }
    Ok(student.render_item())
}

fn handle_mark_selected(state: &mut AppState, params: &Value) -> Result<Value> {
    let ids = get_str_list(params, "ids")?;
    let mark = Mark::parse(get_required_str(params, "status")?)?;
    if ids.is_empty() {
        state.outbox.warning("Please select students first");
        return to_value(&attendance::BulkOutcome::default());
    }
    let on = mark_date(params)?;
    let outcome = attendance::mark_selected(&mut state.portal.attendance, &ids, mark, on);
    if !outcome.updated.is_empty() {
        state.outbox.success(format!(
            "{} students marked as {}",
            outcome.updated.len(),
            mark.as_str()
        ));
    }
    if !outcome.missing.is_empty() {
        state.outbox.warning(format!(
            "{} selected students no longer exist",
            outcome.missing.len()
        ));
    }
    to_value(&outcome)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    let result = match req.method.as_str() {
        "attendance.list" => list_store(Domain::Attendance, &state.portal.attendance, p),
        "attendance.get" => get_record(&state.portal.attendance, p),
        "attendance.stats" => to_value(&attendance::summary(state.portal.attendance.records())),
        "attendance.mark" => handle_mark(state, p),
        "attendance.markSelected" => handle_mark_selected(state, p),
        "attendance.export" => start_export(state, Domain::Attendance, p),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
