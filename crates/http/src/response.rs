//! JSON envelope shared by every API response.
//!
//! Bodies take the shape `{ "status": ..., "message"?: ..., "data"?: ... }`.
//! `fail` marks a client-caused rejection, `error` an internal fault.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Outcome classification carried in the `status` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
    Error,
}

/// Serialized response body
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl Envelope<()> {
    /// Envelope with a message and no payload
    pub fn message(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Successful response: an HTTP status code plus a `success` envelope
#[derive(Debug)]
pub struct ApiResponse<T = ()> {
    code: StatusCode,
    envelope: Envelope<T>,
}

impl ApiResponse<()> {
    /// `200 OK` success response without payload
    pub fn ok() -> Self {
        Self::with_code(StatusCode::OK)
    }

    /// `201 Created` success response without payload
    pub fn created() -> Self {
        Self::with_code(StatusCode::CREATED)
    }

    fn with_code(code: StatusCode) -> Self {
        Self {
            code,
            envelope: Envelope {
                status: Status::Success,
                message: None,
                data: None,
            },
        }
    }
}

impl<T> ApiResponse<T> {
    /// Attach a human-readable message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.envelope.message = Some(message.into());
        self
    }

    /// Attach the `data` payload
    pub fn data<U>(self, data: U) -> ApiResponse<U> {
        ApiResponse {
            code: self.code,
            envelope: Envelope {
                status: self.envelope.status,
                message: self.envelope.message,
                data: Some(data),
            },
        }
    }

    #[cfg(test)]
    fn code(&self) -> StatusCode {
        self.code
    }

    #[cfg(test)]
    fn envelope(&self) -> &Envelope<T> {
        &self.envelope
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.code, Json(self.envelope)).into_response()
    }
}
