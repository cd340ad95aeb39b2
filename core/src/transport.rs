//! Executing `HttpRequest`s over the network.
//!
//! # Design
//! `Transport` is the seam between the pure client and real I/O. The bundled
//! `UreqTransport` is blocking and enforces each request's time budget as a
//! hard global timeout. Non-2xx statuses come back as data; only failures
//! where no response arrived become errors, already classified.

use std::io;

use log::error;
use ureq::typestate::WithBody;
use ureq::RequestBuilder;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport {
    /// Perform one round-trip. Must return `Ok` for every response that
    /// arrived, whatever its status, and give up after `request.timeout`.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by ureq. Builds a fresh agent per request so
/// each call gets its own timeout.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(request.timeout))
            .build()
            .new_agent();

        let headers = &request.headers;
        let result = match request.method {
            HttpMethod::Get => with_headers(agent.get(&request.url), headers).call(),
            HttpMethod::Post => send(with_headers(agent.post(&request.url), headers), request.body.as_deref()),
            HttpMethod::Patch => send(with_headers(agent.patch(&request.url), headers), request.body.as_deref()),
        };

        let mut response = result.map_err(|e| classify_transport_error(request, e))?;

        let status = response.status().as_u16();
        let response_headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| classify_transport_error(request, e))?;

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

/// Log the raw failure and reduce it to a connectivity-class `ApiError`.
fn classify_transport_error(request: &HttpRequest, err: ureq::Error) -> ApiError {
    error!(
        "{} {} failed without a usable response: {err:?}",
        request.method.as_str(),
        request.url
    );
    match err {
        ureq::Error::Timeout(_) => ApiError::Network(format!(
            "tiempo de espera agotado ({} ms)",
            request.timeout.as_millis()
        )),
        ureq::Error::HostNotFound => ApiError::Unreachable,
        ureq::Error::Io(ref e) if is_refused(e) || is_name_resolution(e) => ApiError::Unreachable,
        ureq::Error::Io(ref e) if e.kind() == io::ErrorKind::TimedOut => ApiError::Network(format!(
            "tiempo de espera agotado ({} ms)",
            request.timeout.as_millis()
        )),
        other => ApiError::Network(other.to_string()),
    }
}

fn is_refused(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused | io::ErrorKind::AddrNotAvailable
    )
}

/// ureq resolves through std, which reports a failed lookup as an
/// uncategorized `io::Error`; only the message identifies it.
fn is_name_resolution(e: &io::Error) -> bool {
    const MARKERS: [&str; 3] = [
        "failed to lookup address information",
        "No such host is known",
        "nodename nor servname provided",
    ];
    let message = e.to_string();
    MARKERS.iter().any(|marker| message.contains(marker))
}
