use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use log::info;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// A record as the backend stores and serializes it. `status` is optional so
/// tests can seed records that omit it on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    pub query: String,
    pub result: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl StoredRecord {
    pub fn new(query: &str, result: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            query: query.to_string(),
            result: result.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            status: Some("A".to_string()),
        }
    }
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: String,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Records in insertion order.
pub type Db = Arc<RwLock<Vec<StoredRecord>>>;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

pub fn app() -> Router {
    app_with(Vec::new())
}

/// Router pre-loaded with `records`.
pub fn app_with(records: Vec<StoredRecord>) -> Router {
    let db: Db = Arc::new(RwLock::new(records));
    let api = Router::new()
        .route("/groq/query", post(execute_query))
        .route("/groq/query-and-store", post(execute_query_and_store))
        .route("/query-records", get(list_records))
        .route("/query-records/all", get(list_all_records))
        .route("/query-records/{id}", get(get_record))
        .route("/query-records/{id}/status", patch(update_status))
        .route("/health-check", get(health_check))
        .with_state(db);
    Router::new().nest("/api", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Vec::new()).await
}

pub async fn run_with(listener: TcpListener, records: Vec<StoredRecord>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(records)).await
}

/// Deterministic stand-in for the LLM call.
pub fn answer(query: &str) -> String {
    format!("Resultado para: {}", query.trim())
}

fn reject(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            message: message.to_string(),
        }),
    )
}

fn validate_query(query: &str) -> ApiResult<()> {
    if query.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "La consulta no puede estar vacía"));
    }
    Ok(())
}

async fn execute_query(query: String) -> ApiResult<String> {
    validate_query(&query)?;
    Ok(answer(&query))
}

async fn execute_query_and_store(State(db): State<Db>, query: String) -> ApiResult<Json<StoredRecord>> {
    validate_query(&query)?;
    let record = StoredRecord::new(&query, &answer(&query));
    info!("stored query record {}", record.id);
    db.write().await.push(record.clone());
    Ok(Json(record))
}

async fn list_records(State(db): State<Db>) -> Json<Vec<StoredRecord>> {
    Json(db.read().await.clone())
}

async fn list_all_records(State(db): State<Db>) -> Json<Vec<StoredRecord>> {
    Json(db.read().await.clone())
}

async fn get_record(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Json<StoredRecord>> {
    let records = db.read().await;
    records
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Registro no encontrado"))
}

async fn update_status(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<StatusBody>,
) -> ApiResult<Json<StoredRecord>> {
    if input.status != "A" && input.status != "I" {
        return Err(reject(StatusCode::BAD_REQUEST, "Estado inválido"));
    }
    let mut records = db.write().await;
    let record = records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Registro no encontrado"))?;
    info!("query record {id} -> status {}", input.status);
    record.status = Some(input.status);
    Ok(Json(record.clone()))
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_status_only_when_set() {
        let mut record = StoredRecord {
            id: "1".to_string(),
            query: "q".to_string(),
            result: "r".to_string(),
            timestamp: 1000,
            status: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("status").is_none());

        record.status = Some("I".to_string());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "I");
        assert_eq!(json["timestamp"], 1000);
    }

    #[test]
    fn new_record_is_active_with_fresh_id() {
        let a = StoredRecord::new("q", "r");
        let b = StoredRecord::new("q", "r");
        assert_eq!(a.status.as_deref(), Some("A"));
        assert_ne!(a.id, b.id);
        assert!(a.timestamp > 0);
    }

    #[test]
    fn answer_is_deterministic() {
        assert_eq!(answer("  hola "), "Resultado para: hola");
    }

    #[test]
    fn status_body_requires_status() {
        let result: Result<StatusBody, _> = serde_json::from_str(r#"{}"#);
        assert!(result.is_err());
    }
}
