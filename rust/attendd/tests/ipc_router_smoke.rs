
use serde_json::json;
use test_support::{spawn_sidecar, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("attendd-router-smoke");
    let mut sc = spawn_sidecar(&[]);

    let health = sc.request_ok("health", json!({}));
    assert_eq!(health.get("gateMode"), Some(&json!("inline")));
    assert_eq!(health.get("workspacePath"), Some(&json!(null)));

    assert_eq!(sc.request_err("state.get", json!({})), "no_workspace");
    assert_eq!(sc.request_err("workspace.select", json!({})), "bad_params");
    let _ = sc.request_ok(
        "workspace.select",
        json!({ "path": workspace.path().to_string_lossy() }),
    );

    let _ = sc.unlock();
    let subject_id = sc.create_subject("Smoke");
    let lecture_id = sc.create_lecture(&subject_id, "2024-01-01");

    let calls = [
        ("state.get", json!({})),
        ("stats.get", json!({})),
        ("subjects.list", json!({})),
        ("subjects.select", json!({ "subjectId": subject_id })),
        ("lectures.list", json!({ "subjectId": subject_id })),
        (
            "lectures.setStatus",
            json!({ "subjectId": subject_id, "lectureId": lecture_id, "status": "present" }),
        ),
        ("limits.set", json!({ "subjectId": subject_id, "value": 2 })),
        ("limits.setDefault", json!({ "value": 3 })),
        ("gate.status", json!({})),
        (
            "lectures.delete",
            json!({ "subjectId": subject_id, "lectureId": lecture_id, "confirmed": true }),
        ),
        ("subjects.delete", json!({ "subjectId": subject_id, "confirmed": true })),
        ("gate.lock", json!({})),
    ];
    for (method, params) in calls {
        let _ = sc.request_ok(method, params);
    }

    assert_eq!(sc.request_err("nope.nothing", json!({})), "not_implemented");
}

#[test]
fn malformed_line_reports_bad_json_and_keeps_serving() {
    use std::io::{BufRead, BufReader, Write};
    use std::process::{Command, Stdio};

    let mut child = Command::new(env!("CARGO_BIN_EXE_attendd"))
        .args(["--log-level", "off"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn attendd");
    let mut stdin = child.stdin.take().expect("stdin");
    let mut reader = BufReader::new(child.stdout.take().expect("stdout"));

    writeln!(stdin, "{{not json").expect("write");
    writeln!(stdin, "{}", json!({ "id": "1", "method": "health" })).expect("write");
    stdin.flush().expect("flush");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read");
    let v: serde_json::Value = serde_json::from_str(line.trim()).expect("json");
    assert_eq!(v["error"]["code"], json!("bad_json"));

    line.clear();
    reader.read_line(&mut line).expect("read");
    let v: serde_json::Value = serde_json::from_str(line.trim()).expect("json");
    assert_eq!(v["ok"], json!(true));

    let _ = child.kill();
    let _ = child.wait();
}
