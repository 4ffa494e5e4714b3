use recordbookd::db;
use recordbookd::http::build_router;
use recordbookd::ipc::AppState;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

struct RawResponse {
    status: u16,
    head: String,
    body: String,
}

impl RawResponse {
    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
        })
    }

    fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("json body")
    }
}

async fn start_server() -> (std::net::SocketAddr, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    db::open_db(dir.path()).expect("open db");
    let state = AppState::new(dir.path().to_path_buf());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, build_router(state))
            .await
            .expect("serve");
    });
    (addr, dir)
}

async fn send_raw(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    content_type: &str,
    body: &str,
) -> RawResponse {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let req = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok())
        .expect("status code");
    RawResponse {
        status,
        head: head.to_string(),
        body: body.to_string(),
    }
}

async fn get(addr: std::net::SocketAddr, path: &str) -> RawResponse {
    send_raw(addr, "GET", path, "text/plain", "").await
}

async fn post_json(addr: std::net::SocketAddr, path: &str, body: &str) -> RawResponse {
    send_raw(addr, "POST", path, "application/json", body).await
}

async fn post_form(addr: std::net::SocketAddr, path: &str, body: &str) -> RawResponse {
    send_raw(addr, "POST", path, "application/x-www-form-urlencoded", body).await
}

#[tokio::test]
async fn api_create_list_get_update_delete() {
    let (addr, _dir) = start_server().await;

    let created = post_json(
        addr,
        "/records?action=create",
        r#"{"name":"Aisha","english":90,"urdu":85,"maths":95,"physics":100,"chemistry":92}"#,
    )
    .await;
    assert_eq!(created.status, 200);
    let v = created.json();
    assert_eq!(v["success"], true);
    assert_eq!(v["message"], "Student record created successfully");
    let id = v["data"]["id"].as_i64().expect("id");
    assert!(v.get("id").is_none());

    let listed = get(addr, "/records?action=list&search=Aisha&page=1&limit=10").await;
    let v = listed.json();
    assert_eq!(v["success"], true);
    assert_eq!(v["data"]["records"][0]["name"], "Aisha");
    assert_eq!(v["data"]["records"][0]["grade"], "A+");
    assert_eq!(v["data"]["pagination"]["totalRecords"], 1);

    let fetched = get(addr, &format!("/records?action=get&id={id}")).await;
    let v = fetched.json();
    assert_eq!(v["message"], "Student found");
    assert_eq!(v["data"]["total"], 462);
    assert_eq!(v["data"]["percent"], 92.4);

    let updated = post_json(
        addr,
        "/records?action=update",
        &format!(
            r#"{{"id":{id},"name":"Aisha","english":50,"urdu":50,"maths":50,"physics":50,"chemistry":50}}"#
        ),
    )
    .await;
    assert_eq!(updated.json()["message"], "Student record updated successfully");

    let deleted = send_raw(
        addr,
        "DELETE",
        &format!("/records?action=delete&id={id}"),
        "text/plain",
        "",
    )
    .await;
    assert_eq!(deleted.json()["success"], true);

    let gone = get(addr, &format!("/records?action=get&id={id}")).await;
    assert_eq!(gone.status, 200);
    let v = gone.json();
    assert_eq!(v["success"], false);
    assert_eq!(v["message"], "Student not found");
    assert_eq!(v["data"], serde_json::json!({}));
}

#[tokio::test]
async fn api_rejects_unknown_action_method_and_body() {
    let (addr, _dir) = start_server().await;

    let unknown = get(addr, "/records?action=explode").await;
    assert_eq!(unknown.status, 200);
    assert_eq!(unknown.json()["message"], "Invalid action");

    let mismatched = get(addr, "/records?action=delete&id=1").await;
    assert_eq!(mismatched.json()["message"], "Invalid action");

    let put = send_raw(addr, "PUT", "/records?action=update", "application/json", "{}").await;
    assert_eq!(put.json()["message"], "Method not allowed");

    let malformed = post_json(addr, "/records?action=create", "{not json").await;
    let v = malformed.json();
    assert_eq!(v["success"], false);
    assert_eq!(v["message"], "Invalid request body");

    let invalid = post_json(
        addr,
        "/records?action=create",
        r#"{"name":"Edge","english":101}"#,
    )
    .await;
    assert_eq!(
        invalid.json()["message"],
        "All marks must be between 0 and 100"
    );
}

#[tokio::test]
async fn preflight_and_every_response_carry_cors_headers() {
    let (addr, _dir) = start_server().await;

    let preflight = send_raw(addr, "OPTIONS", "/records", "text/plain", "").await;
    assert_eq!(preflight.status, 204);
    assert_eq!(preflight.header("access-control-allow-origin"), Some("*"));
    assert_eq!(
        preflight.header("access-control-allow-methods"),
        Some("GET, POST, PUT, DELETE")
    );
    assert_eq!(
        preflight.header("access-control-allow-headers"),
        Some("Content-Type")
    );

    let listed = get(addr, "/records?action=list").await;
    assert_eq!(listed.header("access-control-allow-origin"), Some("*"));
    assert!(listed
        .header("content-type")
        .unwrap_or("")
        .starts_with("application/json"));
}

#[tokio::test]
async fn probes_report_ok() {
    let (addr, _dir) = start_server().await;
    assert_eq!(get(addr, "/livez").await.status, 200);
    assert_eq!(get(addr, "/healthz").await.status, 200);
}

#[tokio::test]
async fn pages_create_list_and_redirect_with_flash() {
    let (addr, _dir) = start_server().await;

    let empty = get(addr, "/").await;
    assert_eq!(empty.status, 200);

    let form = get(addr, "/create").await;
    assert_eq!(form.status, 200);
    assert!(form.body.contains("name=\"english\""));

    let created = post_form(
        addr,
        "/create",
        "name=Bilal+%3Cb%3EKhan%3C%2Fb%3E&english=70&urdu=72&maths=74&physics=76&chemistry=78",
    )
    .await;
    assert_eq!(created.status, 303);
    assert_eq!(created.header("location"), Some("/?success=created"));

    let listed = get(addr, "/?success=created").await;
    assert_eq!(listed.status, 200);
    assert!(listed.body.contains("Bilal Khan"));
    assert!(!listed.body.contains("<b>Khan"));
    assert!(listed.body.contains("sort=remarks"));

    let by_remarks = get(addr, "/?sort=remarks&direction=DESC").await;
    assert_eq!(by_remarks.status, 200);
    assert!(by_remarks.body.contains("Remarks ▼"));

    let far = get(addr, "/?page=9223372036854775807").await;
    assert_eq!(far.status, 200);
    assert!(far.body.contains("No records found"));

    let rejected = post_form(
        addr,
        "/create",
        "name=&english=50&urdu=50&maths=50&physics=50&chemistry=150",
    )
    .await;
    assert_eq!(rejected.status, 422);
    assert!(rejected.body.contains("Student name is required"));
    assert!(rejected
        .body
        .contains("Chemistry marks must be between 0 and 100"));

    let bad_id = get(addr, "/update?id=abc").await;
    assert_eq!(bad_id.status, 303);
    assert_eq!(bad_id.header("location"), Some("/?error=invalid_id"));

    let missing = get(addr, "/delete?id=4242").await;
    assert_eq!(missing.status, 303);
    assert_eq!(missing.header("location"), Some("/?error=not_found"));
}
