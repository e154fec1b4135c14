mod test_support;

use serde_json::json;
use std::io::{BufRead, Write};
use test_support::{request, request_ok, spawn_sidecar, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("portald-router-smoke");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health.get("loaded"), Some(&json!([])));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let loaded = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "session.load",
        json!({ "domain": "all" }),
    );
    assert_eq!(
        loaded.get("loaded").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(9)
    );

    let methods = [
        "announcements.list",
        "announcements.stats",
        "attendance.list",
        "attendance.stats",
        "grades.list",
        "grades.stats",
        "grades.assignments",
        "courses.list",
        "courses.stats",
        "publications.list",
        "projects.list",
        "awards.list",
        "collaborations.list",
        "research.stats",
        "profile.get",
        "contact.draft.get",
        "contact.progress",
        "actions.list",
        "stats.refresh",
        "stats.snapshot",
    ];
    for (i, method) in methods.iter().enumerate() {
        let id = format!("m{}", i);
        let resp = request(&mut stdin, &mut reader, &id, method, json!({}));
        assert_eq!(
            resp.get("ok").and_then(|v| v.as_bool()),
            Some(true),
            "{} failed: {}",
            method,
            resp
        );
        assert!(resp.get("notifications").is_some(), "{} has no notifications", method);
    }

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn unknown_method_and_bad_json_are_reported() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(&mut stdin, &mut reader, "1", "gradebook.open", json!({}));
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(resp["error"]["code"], "not_implemented");

    writeln!(stdin, "{{\"id\":\"2\",\"method\":").expect("write");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("json");
    assert_eq!(value["ok"], false);
    assert_eq!(value["error"]["code"], "bad_json");

    // Still serving after a malformed line.
    let _ = request_ok(&mut stdin, &mut reader, "3", "health", json!({}));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn lists_show_placeholder_before_any_data_is_loaded() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let list = request_ok(&mut stdin, &mut reader, "1", "courses.list", json!({}));
    assert_eq!(list["shown"], 0);
    assert_eq!(list["placeholder"]["title"], "No courses found");
    assert_eq!(
        list["placeholder"]["hint"],
        "Try adjusting your search or filter criteria"
    );

    let grades = request_ok(&mut stdin, &mut reader, "2", "grades.list", json!({}));
    assert_eq!(grades["placeholder"]["title"], "No students found");

    drop(stdin);
    let _ = child.wait();
}
