mod test_support;

use serde_json::json;
use test_support::{item_ids, notices, request, request_err, request_ok, spawn_sidecar};

#[test]
fn filters_compose_and_keep_store_order() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "session.load",
        json!({ "domains": ["announcements", "courses"] }),
    );

    let all = request_ok(&mut stdin, &mut reader, "2", "announcements.list", json!({}));
    assert_eq!(item_ids(&all), vec!["1", "2", "3", "4", "5"]);
    assert!(all.get("placeholder").is_none());

    let cs101 = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "announcements.list",
        json!({ "course": "CS101" }),
    );
    assert_eq!(item_ids(&cs101), vec!["1", "4"]);

    let scheduled = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "announcements.list",
        json!({ "course": "CS101", "status": "scheduled" }),
    );
    assert_eq!(item_ids(&scheduled), vec!["4"]);

    let text = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "announcements.list",
        json!({ "query": "LECTURE notes" }),
    );
    assert_eq!(item_ids(&text), vec!["3"]);

    let today = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "announcements.list",
        json!({ "dateRange": "today", "today": "2024-01-15" }),
    );
    assert_eq!(item_ids(&today), vec!["1"]);

    let week = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "announcements.list",
        json!({ "dateRange": "week", "today": "2024-02-12" }),
    );
    assert_eq!(item_ids(&week), vec!["4"]);

    let none = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "announcements.list",
        json!({ "query": "no such words" }),
    );
    assert_eq!(none["shown"], 0);
    assert_eq!(none["total"], 5);
    assert_eq!(none["placeholder"]["title"], "No announcements found");

    let bad = request_err(
        &mut stdin,
        &mut reader,
        "9",
        "announcements.list",
        json!({ "dateRange": "fortnight" }),
    );
    assert_eq!(bad["code"], "bad_params");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn stats_cover_the_whole_store() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "session.load",
        json!({ "domain": "announcements" }),
    );
    let stats = request_ok(&mut stdin, &mut reader, "2", "announcements.stats", json!({}));
    assert_eq!(stats["total"], 5);
    assert_eq!(stats["readRate"], 92);
    assert_eq!(stats["scheduled"], 1);
    assert_eq!(stats["totalRecipients"], 285);

    // Stats ignore the active filter.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "announcements.list",
        json!({ "status": "draft" }),
    );
    let again = request_ok(&mut stdin, &mut reader, "4", "announcements.stats", json!({}));
    assert_eq!(again, stats);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn oversized_recipient_count_keeps_stats_alive() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "session.load",
        json!({ "domain": "announcements" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "announcements.update",
        json!({ "id": "1", "fields": { "recipients": u64::MAX } }),
    );
    let stats = request_ok(&mut stdin, &mut reader, "3", "announcements.stats", json!({}));
    assert_eq!(stats["totalRecipients"], u64::MAX);
    assert_eq!(stats["readRate"], 0);

    let health = request_ok(&mut stdin, &mut reader, "4", "health", json!({}));
    assert!(health.is_object());

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn duplicate_and_delete_mutate_the_store() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "session.load",
        json!({ "domain": "announcements" }),
    );

    let dup = request(
        &mut stdin,
        &mut reader,
        "2",
        "announcements.duplicate",
        json!({ "id": "1", "today": "2024-03-01" }),
    );
    assert_eq!(dup["ok"], true);
    assert_eq!(
        notices(&dup, "success"),
        vec!["Announcement duplicated successfully"]
    );
    let copy = &dup["result"];
    assert_eq!(copy["title"], "Assignment 3 Due Tomorrow (Copy)");
    assert_eq!(copy["status"], "draft");
    assert_eq!(copy["date"], "2024-03-01");
    assert_eq!(copy["recipients"], 0);
    assert_eq!(copy["opened"], 0);
    let copy_id = copy["id"].as_str().expect("copy id").to_string();
    assert_ne!(copy_id, "1");

    let list = request_ok(&mut stdin, &mut reader, "3", "announcements.list", json!({}));
    assert_eq!(item_ids(&list).first(), Some(&copy_id));
    assert_eq!(list["total"], 6);

    let del = request(
        &mut stdin,
        &mut reader,
        "4",
        "announcements.delete",
        json!({ "id": "2" }),
    );
    assert_eq!(notices(&del, "success"), vec!["Announcement deleted successfully"]);

    let gone = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "announcements.get",
        json!({ "id": "2" }),
    );
    assert_eq!(gone["code"], "not_found");

    let missing = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "announcements.duplicate",
        json!({ "id": "2" }),
    );
    assert_eq!(missing["code"], "not_found");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn create_is_validated_up_front_and_applied_on_resolution() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "session.load",
        json!({ "domains": ["announcements", "courses"] }),
    );

    let invalid = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "announcements.create",
        json!({ "fields": { "title": "  ", "course": "CS101" } }),
    );
    assert_eq!(invalid["code"], "validation_failed");
    let fields: Vec<&str> = invalid["details"]["fields"]
        .as_array()
        .expect("fields")
        .iter()
        .filter_map(|f| f["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["title", "content"]);

    let started = request(
        &mut stdin,
        &mut reader,
        "3",
        "announcements.create",
        json!({ "fields": {
            "title": "Office hours moved",
            "content": "Thursday office hours move to 3pm.",
            "course": "CS201",
            "priority": "high"
        } }),
    );
    assert_eq!(started["ok"], true);
    assert_eq!(notices(&started, "info"), vec!["Creating announcement..."]);
    let ticket = started["result"]["ticket"].as_u64().expect("ticket");

    let done = request(
        &mut stdin,
        &mut reader,
        "4",
        "actions.await",
        json!({ "ticket": ticket }),
    );
    assert_eq!(done["result"]["ok"], true);
    assert_eq!(
        notices(&done, "success"),
        vec!["Announcement created successfully!"]
    );
    let created = &done["result"]["result"];
    assert_eq!(created["courseName"], "Data Structures & Algorithms");
    assert_eq!(created["status"], "sent");

    let list = request_ok(&mut stdin, &mut reader, "5", "announcements.list", json!({}));
    assert_eq!(list["items"][0]["title"], "Office hours moved");
    assert_eq!(list["total"], 6);

    let unscheduled = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "announcements.schedule",
        json!({ "fields": { "title": "Later", "content": "Soon", "course": "CS101" } }),
    );
    assert_eq!(unscheduled["code"], "validation_failed");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn bulk_send_creates_one_record_per_course() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "session.load",
        json!({ "domains": ["announcements", "courses"] }),
    );

    let started = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "announcements.bulk",
        json!({
            "title": "Campus closed",
            "content": "Campus is closed Monday.",
            "priority": "urgent",
            "courses": ["CS101", "CS301"]
        }),
    );
    let ticket = started["ticket"].as_u64().expect("ticket");
    let done = request(
        &mut stdin,
        &mut reader,
        "3",
        "actions.await",
        json!({ "ticket": ticket }),
    );
    assert_eq!(
        notices(&done, "success"),
        vec!["Bulk announcements sent successfully!"]
    );

    let list = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "announcements.list",
        json!({ "query": "campus is closed" }),
    );
    assert_eq!(list["shown"], 2);
    let recipients: Vec<u64> = list["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|i| i["recipients"].as_u64())
        .collect();
    let mut sorted = recipients.clone();
    sorted.sort();
    assert_eq!(sorted, vec![75, 120]);

    drop(stdin);
    let _ = child.wait();
}
