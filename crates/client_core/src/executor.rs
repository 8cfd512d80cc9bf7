use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::error::ErrorBody;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    credentials::CredentialStore,
    transport::{ApiRequest, ApiResponse, Transport, TransportError},
};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
    #[error("server responded with {status}: {reason}")]
    Status { status: StatusCode, reason: String },
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("storage failure: {0:#}")]
    Storage(anyhow::Error),
}

impl ActionError {
    /// Text written to the log on failure. For an error status this is the
    /// server's own message rather than the whole error chain.
    pub fn reason(&self) -> String {
        match self {
            ActionError::Status { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// One mutating call against the API, relative to the configured root.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ActionRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body<T: Serialize>(mut self, body: &T) -> Result<Self, ActionError> {
        self.body = Some(serde_json::to_value(body).map_err(ActionError::Encode)?);
        Ok(self)
    }
}

pub fn decode_body<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, ActionError> {
    serde_json::from_slice(&response.body).map_err(ActionError::Decode)
}

/// Attaches the CSRF header and JSON content type, sends the request and
/// splits the result into a success response or an [`ActionError`].
pub struct RequestExecutor {
    api_root: String,
    csrf_cookie_name: String,
    csrf_header: String,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
}

impl RequestExecutor {
    pub fn new(
        api_root: impl Into<String>,
        csrf_cookie_name: impl Into<String>,
        csrf_header: impl Into<String>,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            api_root: api_root.into(),
            csrf_cookie_name: csrf_cookie_name.into(),
            csrf_header: csrf_header.into(),
            transport,
            credentials,
        }
    }

    pub fn build(&self, request: ActionRequest) -> ApiRequest {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        match self.credentials.read_cookie(&self.csrf_cookie_name) {
            Some(token) => headers.push((self.csrf_header.clone(), token)),
            None => warn!(
                cookie = %self.csrf_cookie_name,
                path = %request.path,
                "csrf cookie missing; sending request without token"
            ),
        }

        ApiRequest {
            method: request.method,
            url: format!("{}{}", self.api_root, request.path),
            headers,
            body: request.body,
        }
    }

    pub async fn execute(&self, request: ActionRequest) -> Result<ApiResponse, ActionError> {
        let request = self.build(request);
        debug!(method = %request.method, url = %request.url, "sending request");

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(ActionError::Status {
                status: response.status,
                reason: ErrorBody::reason_from_bytes(response.status.as_u16(), &response.body),
            });
        }
        Ok(response)
    }
}
