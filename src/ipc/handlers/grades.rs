use crate::domains::Domain;
use crate::error::{PortalError, Result};
use crate::ipc::error::respond;
use crate::ipc::handlers::start_export;
use crate::ipc::helpers::{get_opt_str, get_required_str, to_value, today};
use crate::ipc::types::{AppState, Request};
use crate::pipeline::filter::{Predicates, Selector};
use crate::pipeline::render::from_items;
use serde_json::{json, Value};

fn handle_list(state: &mut AppState, params: &Value) -> Result<Value> {
    let predicates = Predicates::from_params(params)?;
    let assignment = Selector::parse(get_opt_str(params, "assignment"));
    let today = today(params)?;
    let book = &state.portal.grades;

    let view = book.filter(&predicates, &assignment, today);
    let unrestricted = predicates.is_unrestricted() && assignment == Selector::All;
    let items = book.render_rows(&view, unrestricted);
    to_value(&from_items(
        Domain::Grades.as_str(),
        Domain::Grades.noun(),
        items,
        book.students.len(),
        book.entries.generation(),
    ))
}

fn handle_assign(state: &mut AppState, params: &Value) -> Result<Value> {
    let student_id = get_required_str(params, "studentId")?;
    let assignment_id = get_required_str(params, "assignmentId")?;
    let grade = params
        .get("grade")
        .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
        .ok_or_else(|| PortalError::BadParams("grade must be a whole number".into()))?;
    let comments = get_opt_str(params, "comments").unwrap_or("").trim();

    let entry = state
        .portal
        .grades
        .assign(student_id, assignment_id, grade, comments)?;
    state.outbox.success("Grade submitted successfully!");
    to_value(&entry)
}

fn handle_delete_student(state: &mut AppState, params: &Value) -> Result<Value> {
    let student_id = get_required_str(params, "studentId")?;
    let removed = state.portal.grades.delete_student_grades(student_id)?;
    state.outbox.success("Grades deleted successfully");
    Ok(json!({ "studentId": student_id, "removed": removed }))
}

fn handle_details(state: &mut AppState, params: &Value) -> Result<Value> {
    let student_id = get_required_str(params, "studentId")?;
    let details = state.portal.grades.details(student_id)?;
    if details.is_empty() {
        state.outbox.warning("No grades found for this student");
    }
    let name = state
        .portal
        .grades
        .student(student_id)
        .map(|s| s.name.clone())
        .unwrap_or_default();
    Ok(json!({ "studentId": student_id, "name": name, "grades": to_value(&details)? }))
}

fn handle_assignments(state: &mut AppState) -> Result<Value> {
    let book = &state.portal.grades;
    Ok(json!({
        "assignments": to_value(&book.assignments)?,
        "courses": book.courses(),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    let result = match req.method.as_str() {
        "grades.list" => handle_list(state, p),
        "grades.stats" => to_value(&state.portal.grades.summary()),
        "grades.assign" => handle_assign(state, p),
        "grades.deleteStudent" => handle_delete_student(state, p),
        "grades.details" => handle_details(state, p),
        "grades.assignments" => handle_assignments(state),
        "grades.export" => start_export(state, Domain::Grades, p),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
