use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

struct Sidecar {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    next_id: u64,
}

impl Sidecar {
    fn spawn(records_dir: &Path) -> Self {
        let exe = env!("CARGO_BIN_EXE_attendanced");
        let mut child = Command::new(exe)
            .arg("--records-dir")
            .arg(records_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn attendanced");
        let stdin = child.stdin.take().expect("child stdin");
        let stdout = child.stdout.take().expect("child stdout");
        Self {
            child,
            stdin,
            reader: BufReader::new(stdout),
            next_id: 0,
        }
    }

    fn call(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        self.next_id += 1;
        let id = self.next_id.to_string();
        let payload = json!({ "id": id, "method": method, "params": params });
        writeln!(self.stdin, "{}", payload).expect("write request");
        self.stdin.flush().expect("flush request");

        let mut line = String::new();
        self.reader.read_line(&mut line).expect("read response line");
        let value: serde_json::Value =
            serde_json::from_str(line.trim()).expect("parse response json");
        assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id.as_str()));
        value
    }

    fn ok(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        let resp = self.call(method, params);
        assert_eq!(resp["ok"], json!(true), "{} failed: {}", method, resp);
        resp["result"].clone()
    }

    fn error_code(&mut self, method: &str, params: serde_json::Value) -> (String, serde_json::Value) {
        let resp = self.call(method, params);
        assert_eq!(resp["ok"], json!(false), "{} unexpectedly succeeded: {}", method, resp);
        let code = resp["error"]["code"].as_str().unwrap_or("").to_string();
        (code, resp["error"].clone())
    }

    fn shutdown(mut self) {
        drop(self.stdin);
        let _ = self.child.wait();
    }
}

fn write_roster(dir: &Path, name: &str, body: &str) -> String {
    let p = dir.join(name);
    std::fs::write(&p, body).expect("write roster");
    p.to_string_lossy().to_string()
}

#[test]
fn actions_before_loading_report_no_active_session() {
    let dir = temp_dir("attendance-ipc-nosession");
    let mut sc = Sidecar::spawn(&dir.join("records"));

    for method in [
        "attendance.save",
        "attendance.snapshot",
        "attendance.chart",
        "attendance.clearAll",
    ] {
        let (code, error) = sc.error_code(method, json!({}));
        assert_eq!(code, "no_active_session", "{}", method);
        assert_eq!(error["details"]["severity"], json!("warning"));
    }
    let (code, _) = sc.error_code("attendance.markPresent", json!({ "rollNo": "1" }));
    assert_eq!(code, "no_active_session");
    assert!(!dir.join("records").exists());

    sc.shutdown();
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn load_mark_save_over_ipc() {
    let dir = temp_dir("attendance-ipc-flow");
    let records = dir.join("records");
    let roster = write_roster(&dir, "classX.csv", "Roll No,Name\n1,Ann\n2,Bo\n");
    let mut sc = Sidecar::spawn(&records);

    let loaded = sc.ok("roster.load", json!({ "path": roster }));
    assert_eq!(loaded["className"], json!("classX"));
    assert_eq!(loaded["studentCount"], json!(2));
    assert_eq!(loaded["students"][1], json!({ "rollNo": "2", "name": "Bo" }));
    assert_eq!(loaded["message"], json!("Loaded student data from classX.csv"));
    let session_id = loaded["sessionId"].as_str().expect("sessionId").to_string();

    let marked = sc.ok(
        "attendance.markAbsent",
        json!({ "rollNo": "1", "sessionId": session_id }),
    );
    assert_eq!(marked["state"], json!("absent"));
    let marked = sc.ok("attendance.markPresent", json!({ "rollNo": "1" }));
    assert_eq!(marked["rows"][0]["present"], json!(true));
    assert_eq!(marked["rows"][0]["absent"], json!(false));

    let opened = sc.ok("attendance.open", json!({}));
    assert_eq!(opened["rows"][1]["state"], json!("unset"));

    let snap = sc.ok("attendance.snapshot", json!({}));
    assert_eq!(
        snap["rows"],
        json!([
            { "rollNo": "1", "name": "Ann", "isPresent": true },
            { "rollNo": "2", "name": "Bo", "isPresent": false }
        ])
    );

    let saved = sc.ok("attendance.save", json!({ "now": "2024-01-01T10:00:00" }));
    assert_eq!(saved["fileName"], json!("attendance_2024-01-01.csv"));
    assert_eq!(saved["headerWritten"], json!(true));
    assert_eq!(saved["rowsWritten"], json!(2));
    let log = records.join("classX").join("attendance_2024-01-01.csv");
    assert_eq!(
        std::fs::read_to_string(&log).expect("read log"),
        "Date,Roll No,Name,Status\r\n\
         2024-01-01 10:00:00,1,Ann,Present\r\n\
         2024-01-01 10:00:00,2,Bo,Absent\r\n"
    );

    let again = sc.ok("attendance.save", json!({ "now": "2024-01-01 11:15:00" }));
    assert_eq!(again["headerWritten"], json!(false));
    let text = std::fs::read_to_string(&log).expect("read log");
    assert_eq!(text.lines().count(), 5);

    let chart = sc.ok("attendance.chart", json!({}));
    assert_eq!(chart["title"], json!("Attendance Record - classX"));
    assert_eq!(chart["bars"][0]["label"], json!("P"));
    assert_eq!(chart["bars"][1]["value"], json!(0));

    let cleared = sc.ok("attendance.clearAll", json!({}));
    assert_eq!(cleared["cleared"], json!(2));
    let snap = sc.ok("attendance.snapshot", json!({}));
    assert!(snap["rows"]
        .as_array()
        .expect("rows")
        .iter()
        .all(|r| r["isPresent"] == json!(false)));

    sc.shutdown();
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn roster_errors_are_distinguishable() {
    let dir = temp_dir("attendance-ipc-roster-errors");
    let mut sc = Sidecar::spawn(&dir.join("records"));

    let missing = dir.join("missing.csv").to_string_lossy().to_string();
    let (code, error) = sc.error_code("roster.load", json!({ "path": missing }));
    assert_eq!(code, "not_found");
    assert_eq!(error["details"]["severity"], json!("error"));

    let empty = write_roster(&dir, "empty.csv", "Roll No,Name\n");
    let (code, error) = sc.error_code("roster.load", json!({ "path": empty }));
    assert_eq!(code, "empty_roster");
    assert_eq!(error["details"]["severity"], json!("warning"));

    let bad = write_roster(&dir, "bad.csv", "Roll No,Full Name\n1,Ann\n");
    let (code, error) = sc.error_code("roster.load", json!({ "path": bad }));
    assert_eq!(code, "malformed_schema");
    assert_eq!(error["details"]["missingColumns"], json!(["Name"]));

    let (code, _) = sc.error_code("roster.load", json!({}));
    assert_eq!(code, "bad_params");

    sc.shutdown();
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn reloading_replaces_the_session() {
    let dir = temp_dir("attendance-ipc-reload");
    let first = write_roster(&dir, "first.csv", "Roll No,Name\n1,Ann\n2,Bo\n");
    let second = write_roster(&dir, "second.csv", "Roll No,Name\n7,Gus\n");
    let mut sc = Sidecar::spawn(&dir.join("records"));

    let a = sc.ok("roster.load", json!({ "path": first }));
    let old_id = a["sessionId"].as_str().expect("sessionId").to_string();
    sc.ok("attendance.markPresent", json!({ "rollNo": "1" }));

    let b = sc.ok("roster.load", json!({ "path": second }));
    assert_ne!(b["sessionId"], a["sessionId"]);

    let (code, _) = sc.error_code(
        "attendance.markPresent",
        json!({ "rollNo": "7", "sessionId": old_id }),
    );
    assert_eq!(code, "stale_session");

    let (code, error) = sc.error_code("attendance.markPresent", json!({ "rollNo": "1" }));
    assert_eq!(code, "unknown_student");
    assert_eq!(error["details"]["rollNo"], json!("1"));

    let snap = sc.ok("attendance.snapshot", json!({}));
    assert_eq!(
        snap["rows"],
        json!([{ "rollNo": "7", "name": "Gus", "isPresent": false }])
    );

    // A failed load keeps the live session.
    let missing = dir.join("gone.csv").to_string_lossy().to_string();
    sc.error_code("roster.load", json!({ "path": missing }));
    let health = sc.ok("health", json!({}));
    assert_eq!(health["className"], json!("second"));

    sc.shutdown();
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn save_failure_is_surfaced_and_retryable() {
    let dir = temp_dir("attendance-ipc-save-fail");
    let records = dir.join("records");
    std::fs::create_dir_all(&records).expect("records dir");
    // A plain file where the class folder should go.
    std::fs::write(records.join("blocked"), b"x").expect("blocker");
    let roster = write_roster(&dir, "blocked.csv", "Roll No,Name\n1,Ann\n");
    let mut sc = Sidecar::spawn(&records);

    sc.ok("roster.load", json!({ "path": roster }));
    sc.ok("attendance.markPresent", json!({ "rollNo": "1" }));
    let (code, _) = sc.error_code("attendance.save", json!({ "now": "2024-02-02T08:00:00" }));
    assert_eq!(code, "persistence_unavailable");

    let other = dir.join("elsewhere");
    sc.ok("workspace.select", json!({ "path": other.to_string_lossy() }));
    let saved = sc.ok("attendance.save", json!({ "now": "2024-02-02T08:00:00" }));
    assert_eq!(saved["rowsWritten"], json!(1));
    let text = std::fs::read_to_string(other.join("blocked").join("attendance_2024-02-02.csv"))
        .expect("read log");
    assert!(text.contains("2024-02-02 08:00:00,1,Ann,Present"));

    let (code, _) = sc.error_code("attendance.save", json!({ "now": "yesterday" }));
    assert_eq!(code, "bad_params");

    sc.shutdown();
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn quoted_multiline_names_load_as_one_student() {
    let dir = temp_dir("attendance-ipc-multiline");
    let roster = write_roster(&dir, "9A.csv", "Roll No,Name\n1,\"Ann\nLee\"\n2,Bo\n");
    let mut sc = Sidecar::spawn(&dir.join("records"));

    let loaded = sc.ok("roster.load", json!({ "path": roster }));
    assert_eq!(loaded["studentCount"], json!(2));
    assert_eq!(loaded["students"][0], json!({ "rollNo": "1", "name": "Ann\nLee" }));
    assert_eq!(loaded["students"][1], json!({ "rollNo": "2", "name": "Bo" }));

    sc.shutdown();
    let _ = std::fs::remove_dir_all(dir);
}
