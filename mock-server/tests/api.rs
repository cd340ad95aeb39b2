use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, StoredRecord};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn text_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "text/plain")
        .body(body.to_string())
        .unwrap()
}

fn status_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("PATCH")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn seeded(id: &str, status: Option<&str>) -> StoredRecord {
    StoredRecord {
        id: id.to_string(),
        query: format!("query {id}"),
        result: format!("result {id}"),
        timestamp: 1_000,
        status: status.map(str::to_string),
    }
}

// --- health ---

#[tokio::test]
async fn health_check_is_ok() {
    let resp = app().oneshot(get("/api/health-check")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, "OK");
}

// --- groq ---

#[tokio::test]
async fn execute_query_returns_text() {
    let resp = app()
        .oneshot(text_request("/api/groq/query", "¿cuántos usuarios hay?"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, "Resultado para: ¿cuántos usuarios hay?");
}

#[tokio::test]
async fn execute_query_empty_returns_400() {
    let resp = app().oneshot(text_request("/api/groq/query", "   ")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["message"], "La consulta no puede estar vacía");
}

#[tokio::test]
async fn execute_query_and_store_returns_active_record() {
    let resp = app()
        .oneshot(text_request("/api/groq/query-and-store", "hola"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let record: StoredRecord = body_json(resp).await;
    assert_eq!(record.query, "hola");
    assert_eq!(record.result, "Resultado para: hola");
    assert_eq!(record.status.as_deref(), Some("A"));
}

// --- reads ---

#[tokio::test]
async fn list_returns_records_in_insertion_order() {
    let app = app_with(vec![seeded("1", Some("A")), seeded("2", None), seeded("3", Some("I"))]);
    let resp = app.oneshot(get("/api/query-records")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let records: Vec<serde_json::Value> = body_json(resp).await;
    let ids: Vec<&str> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["1", "2", "3"]);
    assert!(records[1].get("status").is_none());
}

#[tokio::test]
async fn list_all_is_not_shadowed_by_id_route() {
    let app = app_with(vec![seeded("1", Some("I"))]);
    let resp = app.oneshot(get("/api/query-records/all")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let records: Vec<StoredRecord> = body_json(resp).await;
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn get_record_not_found() {
    let resp = app().oneshot(get("/api/query-records/missing")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- status ---

#[tokio::test]
async fn update_status_not_found() {
    let resp = app()
        .oneshot(status_request("/api/query-records/missing/status", r#"{"status":"I"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_status_rejects_unknown_code() {
    let app = app_with(vec![seeded("1", Some("A"))]);
    let resp = app
        .oneshot(status_request("/api/query-records/1/status", r#"{"status":"X"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_status_malformed_json_returns_422() {
    let app = app_with(vec![seeded("1", Some("A"))]);
    let resp = app
        .oneshot(status_request("/api/query-records/1/status", r#"{"state":"I"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- full lifecycle ---

#[tokio::test]
async fn store_soft_delete_restore_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // store
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(text_request("/api/groq/query-and-store", "ventas de marzo"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: StoredRecord = body_json(resp).await;
    let id = created.id.clone();

    // soft delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(status_request(
            &format!("/api/query-records/{id}/status"),
            r#"{"status":"I"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: StoredRecord = body_json(resp).await;
    assert_eq!(deleted.status.as_deref(), Some("I"));
    assert_eq!(deleted.query, "ventas de marzo"); // unchanged

    // still readable by id, the record is only flagged
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/query-records/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: StoredRecord = body_json(resp).await;
    assert_eq!(fetched.status.as_deref(), Some("I"));

    // restore
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(status_request(
            &format!("/api/query-records/{id}/status"),
            r#"{"status":"A"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let restored: StoredRecord = body_json(resp).await;
    assert_eq!(restored.status.as_deref(), Some("A"));
    assert_eq!(restored.timestamp, created.timestamp);

    // all — still exactly one record
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/query-records/all"))
        .await
        .unwrap();
    let records: Vec<StoredRecord> = body_json(resp).await;
    assert_eq!(records, vec![restored]);
}
