//! Stateless HTTP request builder and response parser for the query record API.
//!
//! # Design
//! `QueryRecordClient` holds only a `ClientConfig` and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Parsers classify non-2xx statuses and normalize every
//! record before returning it.

use log::warn;

use crate::config::ClientConfig;
use crate::error::{classify_status, ApiError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::{normalize, normalize_all};
use crate::types::{QueryRecord, RecordId, RecordStatus, StatusUpdate, WireQueryRecord};

const TEXT_PLAIN: &str = "text/plain";
const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, Clone)]
pub struct QueryRecordClient {
    config: ClientConfig,
}

impl QueryRecordClient {
    pub fn new(config: ClientConfig) -> Self {
        let base_url = config.base_url.clone();
        Self {
            config: config.with_base_url(&base_url),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_execute_query(&self, query: &str) -> HttpRequest {
        self.request(HttpMethod::Post, "/groq/query", Some(TEXT_PLAIN), Some(query.to_string()))
    }

    pub fn build_execute_query_and_store(&self, query: &str) -> HttpRequest {
        self.request(
            HttpMethod::Post,
            "/groq/query-and-store",
            Some(TEXT_PLAIN),
            Some(query.to_string()),
        )
    }

    pub fn build_list_active(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/query-records", None, None)
    }

    pub fn build_list_all(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/query-records/all", None, None)
    }

    pub fn build_get_by_id(&self, id: &RecordId) -> HttpRequest {
        let path = format!("/query-records/{}", urlencoding::encode(id.as_str()));
        self.request(HttpMethod::Get, &path, None, None)
    }

    pub fn build_set_status(&self, id: &RecordId, status: RecordStatus) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&StatusUpdate { status }).map_err(|e| ApiError::Encode(e.to_string()))?;
        let path = format!("/query-records/{}/status", urlencoding::encode(id.as_str()));
        Ok(self.request(HttpMethod::Patch, &path, Some(APPLICATION_JSON), Some(body)))
    }

    pub fn build_check_connection(&self) -> HttpRequest {
        let mut req = self.request(HttpMethod::Get, "/health-check", None, None);
        req.timeout = self.config.health_check_timeout;
        req
    }

    pub fn parse_execute_query(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        Ok(response.body)
    }

    pub fn parse_execute_query_and_store(&self, response: HttpResponse) -> Result<QueryRecord, ApiError> {
        parse_record(response)
    }

    /// Active records only; the backend list is filtered after normalization.
    /// A record that fails normalization fails the whole call.
    pub fn parse_list_active(&self, response: HttpResponse) -> Result<Vec<QueryRecord>, ApiError> {
        let records = parse_records(response)?;
        Ok(records.into_iter().filter(QueryRecord::is_active).collect())
    }

    pub fn parse_list_all(&self, response: HttpResponse) -> Result<Vec<QueryRecord>, ApiError> {
        parse_records(response)
    }

    /// `Ok(None)` when the record exists but is inactive. A 404 stays an error.
    pub fn parse_get_by_id(&self, response: HttpResponse) -> Result<Option<QueryRecord>, ApiError> {
        let record = parse_record(response)?;
        if record.is_active() {
            Ok(Some(record))
        } else {
            warn!("query record {} is inactive, treating as absent", record.id);
            Ok(None)
        }
    }

    pub fn parse_set_status(&self, response: HttpResponse) -> Result<QueryRecord, ApiError> {
        parse_record(response)
    }

    pub fn parse_check_connection(&self, response: HttpResponse) -> Result<bool, ApiError> {
        check_status(&response)?;
        Ok(true)
    }

    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        content_type: Option<&str>,
        body: Option<String>,
    ) -> HttpRequest {
        let mut headers = Vec::with_capacity(2);
        if let Some(content_type) = content_type {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        headers.push(("Accept".to_string(), APPLICATION_JSON.to_string()));
        HttpRequest {
            method,
            url: format!("{}{path}", self.config.base_url),
            headers,
            body,
            timeout: self.config.request_timeout,
        }
    }
}

/// Any 2xx passes; everything else goes through `classify_status`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(classify_status(response))
    }
}

fn parse_record(response: HttpResponse) -> Result<QueryRecord, ApiError> {
    check_status(&response)?;
    let wire: WireQueryRecord =
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))?;
    normalize(wire)
}

fn parse_records(response: HttpResponse) -> Result<Vec<QueryRecord>, ApiError> {
    check_status(&response)?;
    let wires: Vec<WireQueryRecord> =
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))?;
    normalize_all(wires)
}
