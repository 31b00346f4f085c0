
use serde_json::json;
use test_support::{spawn_in_workspace, temp_dir};

#[test]
fn third_absence_is_rejected_when_cap_is_two() {
    let workspace = temp_dir("attendd-cap");
    let mut sc = spawn_in_workspace(workspace.path());
    let _ = sc.unlock();
    let sid = sc.create_subject("Algorithms");
    let _ = sc.request_ok("limits.set", json!({ "subjectId": sid, "value": 2 }));
    let lids: Vec<String> = ["2024-01-01", "2024-01-02", "2024-01-03"]
        .iter()
        .map(|d| sc.create_lecture(&sid, d))
        .collect();

    for lid in &lids[..2] {
        let v = sc.set_status(&sid, lid, "absent");
        assert_eq!(v["ok"], json!(true), "{}", v);
    }
    let v = sc.set_status(&sid, &lids[2], "absent");
    assert_eq!(v["ok"], json!(false));
    assert_eq!(v["error"]["code"], json!("limit_exceeded"));
    assert_eq!(v["error"]["details"]["absent"], json!(2));
    assert_eq!(v["error"]["details"]["maxAbsences"], json!(2));

    let stats = sc.request_ok("stats.get", json!({ "subjectId": sid }))["stats"].clone();
    assert_eq!(stats["absent"], json!(2));
    assert_eq!(stats["remainingAllowance"], json!(0));
    assert_eq!(stats["atLimit"], json!(true));

    // Marking an already-absent lecture again is accepted as a no-op.
    let v = sc.set_status(&sid, &lids[0], "absent");
    assert_eq!(v["ok"], json!(true));
    assert_eq!(v["result"]["changed"], json!(false));

    // Present is never blocked.
    let v = sc.set_status(&sid, &lids[2], "present");
    assert_eq!(v["result"]["changed"], json!(true));
    assert_eq!(v["result"]["stats"]["percentage"], json!(33));
}

#[test]
fn students_mark_attendance_while_locked() {
    let workspace = temp_dir("attendd-student-marks");
    let mut sc = spawn_in_workspace(workspace.path());
    let _ = sc.unlock();
    let sid = sc.create_subject("Physics");
    let lid = sc.create_lecture(&sid, "2024-02-01");
    let _ = sc.request_ok("gate.lock", json!({}));

    let v = sc.set_status(&sid, &lid, "present");
    assert_eq!(v["ok"], json!(true), "{}", v);
    assert_eq!(v["result"]["stats"]["attended"], json!(1));
    assert_eq!(v["result"]["stats"]["percentage"], json!(100));

    let v = sc.set_status(&sid, &lid, "late");
    assert_eq!(v["error"]["code"], json!("bad_params"));
    let v = sc.set_status(&sid, "missing", "present");
    assert_eq!(v["error"]["code"], json!("not_found"));
}

#[test]
fn duplicate_lecture_date_keeps_one_lecture() {
    let workspace = temp_dir("attendd-dup-date");
    let mut sc = spawn_in_workspace(workspace.path());
    let _ = sc.unlock();
    let sid = sc.create_subject("s1");

    let params = json!({ "subjectId": sid, "date": "2024-01-01", "topic": "Intro" });
    let _ = sc.request_ok("lectures.create", params.clone());
    assert_eq!(sc.request_err("lectures.create", params), "validation_error");
    assert_eq!(
        sc.request_err(
            "lectures.create",
            json!({ "subjectId": sid, "date": "01/02/2024" })
        ),
        "validation_error"
    );
    assert_eq!(
        sc.request_err(
            "lectures.create",
            json!({ "subjectId": "missing", "date": "2024-01-02" })
        ),
        "not_found"
    );

    let list = sc.request_ok("lectures.list", json!({ "subjectId": sid }));
    let lectures = list["lectures"].as_array().expect("lectures");
    assert_eq!(lectures.len(), 1);
    assert_eq!(lectures[0]["topic"], json!("Intro"));
    assert_eq!(lectures[0]["status"], json!("pending"));
}

#[test]
fn lectures_list_is_newest_first_and_delete_needs_confirmation() {
    let workspace = temp_dir("attendd-lecture-order");
    let mut sc = spawn_in_workspace(workspace.path());
    let _ = sc.unlock();
    let sid = sc.create_subject("History");
    let old = sc.create_lecture(&sid, "2023-11-20");
    let _ = sc.create_lecture(&sid, "2024-02-01");
    let _ = sc.create_lecture(&sid, "2024-01-10");

    let list = sc.request_ok("lectures.list", json!({ "subjectId": sid }));
    let dates: Vec<&str> = list["lectures"]
        .as_array()
        .expect("lectures")
        .iter()
        .filter_map(|l| l["date"].as_str())
        .collect();
    assert_eq!(dates, vec!["2024-02-01", "2024-01-10", "2023-11-20"]);
    assert_eq!(list["stats"]["total"], json!(3));
    assert_eq!(list["stats"]["percentage"], json!(0));

    assert_eq!(
        sc.request_err(
            "lectures.delete",
            json!({ "subjectId": sid, "lectureId": old })
        ),
        "confirmation_required"
    );
    let deleted = sc.request_ok(
        "lectures.delete",
        json!({ "subjectId": sid, "lectureId": old, "confirmed": true }),
    );
    assert_eq!(deleted["deleted"], json!(true));
    let again = sc.request_ok(
        "lectures.delete",
        json!({ "subjectId": sid, "lectureId": old, "confirmed": true }),
    );
    assert_eq!(again["deleted"], json!(false));
}
