//! Error types for the query record client.
//!
//! # Design
//! Every failed operation resolves to exactly one `ApiError`. Its `Display`
//! output is the user-facing message; `kind()` lets callers branch on the
//! classification without matching strings. Raw transport errors are logged
//! where they are classified and never carried past that point.

use crate::http::HttpResponse;

/// Coarse classification of an `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response reached the client: network failure or timeout.
    Network,
    /// The server could not be reached at all.
    Unreachable,
    NotFound,
    ServerFault,
    /// Any other non-2xx status.
    Status,
    /// The response arrived but its payload was not usable.
    Payload,
    /// The request could not be encoded.
    Request,
    ConnectionCheck,
}

/// Errors returned by `QueryRecordClient` parse methods and `RecordService`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A client-side or network-level failure, including exceeded time budgets.
    #[error("Error del cliente: {0}")]
    Network(String),

    /// Status 0, connection refused or unknown host.
    #[error("No se pudo conectar con el servidor. Verifique su conexión.")]
    Unreachable,

    /// The server returned 404.
    #[error("El recurso solicitado no fue encontrado.")]
    NotFound,

    /// The server returned 500.
    #[error("Error interno del servidor.")]
    ServerFault,

    /// The server returned a non-2xx status other than 0, 404 and 500.
    #[error("Error del servidor: {status}, mensaje: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded into the expected shape.
    #[error("Respuesta inválida del servidor: {0}")]
    Decode(String),

    /// The request payload could not be serialized.
    #[error("No se pudo preparar la solicitud: {0}")]
    Encode(String),

    /// A record arrived with a missing or unparsable timestamp.
    #[error("Marca de tiempo inválida: {0}")]
    InvalidTimestamp(String),

    /// A record arrived with a status outside `A` / `I`.
    #[error("Estado de registro inválido: {0}")]
    InvalidStatus(String),

    /// The health check failed; the cause is kept as the error source.
    #[error("Error de conexión con el servidor")]
    ConnectionCheck(#[source] Box<ApiError>),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Unreachable => ErrorKind::Unreachable,
            ApiError::NotFound => ErrorKind::NotFound,
            ApiError::ServerFault => ErrorKind::ServerFault,
            ApiError::Status { .. } => ErrorKind::Status,
            ApiError::Decode(_) | ApiError::InvalidTimestamp(_) | ApiError::InvalidStatus(_) => {
                ErrorKind::Payload
            }
            ApiError::Encode(_) => ErrorKind::Request,
            ApiError::ConnectionCheck(_) => ErrorKind::ConnectionCheck,
        }
    }

    /// True for failures where no server answered: network errors, timeouts
    /// and unreachable hosts.
    pub fn is_connectivity(&self) -> bool {
        matches!(self.kind(), ErrorKind::Network | ErrorKind::Unreachable)
    }
}

/// Map a non-2xx response to the matching `ApiError` variant.
pub fn classify_status(response: &HttpResponse) -> ApiError {
    match response.status {
        0 => ApiError::Unreachable,
        404 => ApiError::NotFound,
        500 => ApiError::ServerFault,
        status => ApiError::Status {
            status,
            message: server_message(&response.body),
        },
    }
}

/// Pull a human-readable message out of an error body. Backends usually send
/// `{"message": "..."}`; anything else is used verbatim.
fn server_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }
    body.trim().to_string()
}
