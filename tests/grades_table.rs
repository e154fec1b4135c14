mod test_support;

use serde_json::json;
use test_support::{notices, request, request_err, request_ok, spawn_sidecar};

fn student_ids(list: &serde_json::Value) -> Vec<String> {
    list["items"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|r| r["studentId"].as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn rows_group_entries_per_roster_student() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "session.load",
        json!({ "domain": "grades" }),
    );

    let all = request_ok(&mut stdin, &mut reader, "2", "grades.list", json!({}));
    assert_eq!(all["shown"], 10);
    let first = &all["items"][0];
    assert_eq!(first["studentId"], "STU001");
    assert_eq!(first["average"], 91.0);
    assert_eq!(first["letter"], "A");
    assert_eq!(first["grades"]["final"]["grade"], 90);
    let ungraded = &all["items"][3];
    assert_eq!(ungraded["studentId"], "STU004");
    assert!(ungraded["average"].is_null());

    let midterm = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "grades.list",
        json!({ "assignment": "midterm" }),
    );
    assert_eq!(student_ids(&midterm), vec!["STU001", "STU002", "STU003"]);

    let jane = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "grades.list",
        json!({ "query": "jane" }),
    );
    assert_eq!(student_ids(&jane), vec!["STU002"]);
    assert_eq!(jane["items"][0]["average"], 79.0);
    assert_eq!(jane["items"][0]["letter"], "C");

    let stats = request_ok(&mut stdin, &mut reader, "5", "grades.stats", json!({}));
    assert_eq!(stats["totalStudents"], 10);
    assert_eq!(stats["totalGrades"], 12);
    assert_eq!(stats["failingStudents"], 0);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn assign_details_and_delete() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "session.load",
        json!({ "domain": "grades" }),
    );

    let out_of_range = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "grades.assign",
        json!({ "studentId": "STU004", "assignmentId": "final", "grade": 101 }),
    );
    assert_eq!(out_of_range["code"], "validation_failed");

    let assigned = request(
        &mut stdin,
        &mut reader,
        "3",
        "grades.assign",
        json!({ "studentId": "STU004", "assignmentId": "final", "grade": "55", "comments": "Retake" }),
    );
    assert_eq!(notices(&assigned, "success"), vec!["Grade submitted successfully!"]);

    let stats = request_ok(&mut stdin, &mut reader, "4", "grades.stats", json!({}));
    assert_eq!(stats["failingStudents"], 1);
    assert_eq!(stats["totalGrades"], 13);

    // Re-assigning replaces instead of adding a second entry.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "grades.assign",
        json!({ "studentId": "STU004", "assignmentId": "final", "grade": 72 }),
    );
    let details = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "grades.details",
        json!({ "studentId": "STU004" }),
    );
    assert_eq!(details["name"], "Sarah Wilson");
    assert_eq!(details["grades"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(details["grades"][0]["grade"], 72);

    let deleted = request(
        &mut stdin,
        &mut reader,
        "7",
        "grades.deleteStudent",
        json!({ "studentId": "STU004" }),
    );
    assert_eq!(notices(&deleted, "success"), vec!["Grades deleted successfully"]);
    assert_eq!(deleted["result"]["removed"], 1);

    let empty = request(
        &mut stdin,
        &mut reader,
        "8",
        "grades.details",
        json!({ "studentId": "STU004" }),
    );
    assert_eq!(notices(&empty, "warning"), vec!["No grades found for this student"]);

    drop(stdin);
    let _ = child.wait();
}
