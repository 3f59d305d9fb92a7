//! HTTP collaborators against a local mock server.
//!
//! `ureq` is blocking, so every call runs on `spawn_blocking` while the mock
//! server keeps serving on the runtime.

use internsync_core::RowIndex;
use internsync_io::{GoogleSheets, HttpSource, SpreadsheetRef};
use internsync_sync::{FetchError, SheetBackend, SheetError, SourceFetcher};
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sheets(server: &MockServer, gid: Option<u64>) -> GoogleSheets {
    let base = Url::parse(&format!("{}/v4/spreadsheets/", server.uri())).expect("base");
    GoogleSheets::new(
        SpreadsheetRef {
            id: "sheet123".to_string(),
            gid,
        },
        "Sheet1",
        "test-token",
    )
    .with_base(base)
}

#[tokio::test(flavor = "multi_thread")]
async fn http_source_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/README.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string("| Company | Role |"))
        .mount(&server)
        .await;

    let url = format!("{}/README.md", server.uri());
    let body = tokio::task::spawn_blocking(move || HttpSource::new().fetch(&url))
        .await
        .expect("join")
        .expect("fetch");
    assert_eq!(body, "| Company | Role |");
}

#[tokio::test(flavor = "multi_thread")]
async fn http_source_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/README.md"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/README.md", server.uri());
    let err = tokio::task::spawn_blocking(move || HttpSource::new().fetch(&url))
        .await
        .expect("join")
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }), "{err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn google_read_all_stringifies_cells() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet123/values/Sheet1!A:G"))
        .and(query_param("majorDimension", "ROWS"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "range": "Sheet1!A1:G2",
            "majorDimension": "ROWS",
            "values": [["Company", "Role"], ["Acme", 42]]
        })))
        .mount(&server)
        .await;

    let mut backend = sheets(&server, Some(0));
    let values = tokio::task::spawn_blocking(move || backend.read_all())
        .await
        .expect("join")
        .expect("read");
    assert_eq!(values, vec![vec!["Company", "Role"], vec!["Acme", "42"]]);
}

#[tokio::test(flavor = "multi_thread")]
async fn google_empty_sheet_has_no_values_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet123/values/Sheet1!A:G"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "range": "Sheet1!A1:G1000" })),
        )
        .mount(&server)
        .await;

    let mut backend = sheets(&server, Some(0));
    let values = tokio::task::spawn_blocking(move || backend.read_all())
        .await
        .expect("join")
        .expect("read");
    assert!(values.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn google_write_uses_raw_values() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v4/spreadsheets/sheet123/values/Sheet1!A2:G3"))
        .and(query_param("valueInputOption", "RAW"))
        .and(body_partial_json(serde_json::json!({
            "values": [["Acme"], ["Globex"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut backend = sheets(&server, Some(0));
    tokio::task::spawn_blocking(move || {
        backend.write_range(
            RowIndex(2),
            &[vec!["Acme".to_string()], vec!["Globex".to_string()]],
        )
    })
    .await
    .expect("join")
    .expect("write");
}

#[tokio::test(flavor = "multi_thread")]
async fn google_insert_resolves_sheet_id_by_title() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sheets": [
                { "properties": { "sheetId": 0, "title": "Archive" } },
                { "properties": { "sheetId": 987, "title": "Sheet1" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/sheet123:batchUpdate"))
        .and(body_partial_json(serde_json::json!({
            "requests": [{ "insertDimension": { "range": {
                "sheetId": 987, "dimension": "ROWS", "startIndex": 1, "endIndex": 4
            }}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let mut backend = sheets(&server, None);
    tokio::task::spawn_blocking(move || {
        backend.insert_rows(RowIndex(2), 3)?;
        backend.insert_rows(RowIndex(2), 3)
    })
    .await
    .expect("join")
    .expect("insert");
}

fn two_tab_metadata() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "sheets": [
            { "properties": { "sheetId": 0, "title": "Sheet1" } },
            { "properties": { "sheetId": 777, "title": "Tracker" } }
        ]
    }))
}

#[tokio::test(flavor = "multi_thread")]
async fn google_insert_rejects_link_gid_of_another_tab() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet123"))
        .respond_with(two_tab_metadata())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/sheet123:batchUpdate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut backend = sheets(&server, Some(777));
    let err = tokio::task::spawn_blocking(move || backend.insert_rows(RowIndex(2), 3))
        .await
        .expect("join")
        .unwrap_err();
    match err {
        SheetError::Layout(message) => {
            assert!(message.contains("gid=777"), "{message}");
            assert!(message.contains("'Tracker'"), "{message}");
            assert!(message.contains("'Sheet1'"), "{message}");
        }
        other => panic!("expected layout error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn google_insert_targets_titled_tab_when_link_gid_agrees() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet123"))
        .respond_with(two_tab_metadata())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/sheet123:batchUpdate"))
        .and(body_partial_json(serde_json::json!({
            "requests": [{ "insertDimension": { "range": {
                "sheetId": 0, "dimension": "ROWS", "startIndex": 1, "endIndex": 4
            }}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut backend = sheets(&server, Some(0));
    tokio::task::spawn_blocking(move || backend.insert_rows(RowIndex(2), 3))
        .await
        .expect("join")
        .expect("insert");
}

#[tokio::test(flavor = "multi_thread")]
async fn google_rejection_carries_api_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/sheet123/values/Sheet1:clear"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": { "code": 403, "message": "The caller does not have permission" }
        })))
        .mount(&server)
        .await;

    let mut backend = sheets(&server, Some(0));
    let err = tokio::task::spawn_blocking(move || backend.clear())
        .await
        .expect("join")
        .unwrap_err();
    match err {
        SheetError::Rejected { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "The caller does not have permission");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}
