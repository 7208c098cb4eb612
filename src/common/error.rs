use std::fmt;
use std::time::Duration;

use http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Machine-readable code the API reports for endpoints that aren't configured.
pub const PATH_NOT_FOUND_CODE: &str = "PathNotFound";

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Body of a non-success response from the API.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiErrorResponse {
    pub error: ApiError,
    pub request_id: String,
    pub href: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiError {
    pub status: u16,
    pub text: String,
    pub code: String,
}

impl fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error.status={}; error.text={}; error.code={}; request_id={}; href={}",
            self.error.status, self.error.text, self.error.code, self.request_id, self.href
        )
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("unsupported API version {0}, expected one of 4, 5, 6, 7, 8")]
    UnsupportedVersion(u32),

    #[error("server {server} already exists in upstream {upstream}")]
    DuplicateServer { upstream: String, server: String },

    #[error("server {server} doesn't exist in upstream {upstream}")]
    ServerNotFound { upstream: String, server: String },

    #[error("expected {expected:?} response, got {status}: {response}")]
    Api {
        expected: Vec<StatusCode>,
        status: StatusCode,
        response: ApiErrorResponse,
    },

    #[error("expected {expected:?} response, got {status}: {body:?}")]
    UnexpectedResponse {
        expected: Vec<StatusCode>,
        status: StatusCode,
        body: String,
    },

    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("sending request: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("reading response body: {0}")]
    Body(#[from] hyper::Error),

    #[error("building request: {0}")]
    Http(#[from] http::Error),

    #[error("invalid URL: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Innermost error, looking through any context layers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Machine-readable code of the API error payload, if this is one.
    pub fn api_code(&self) -> Option<&str> {
        match self.root() {
            Error::Api { response, .. } => Some(response.error.code.as_str()),
            _ => None,
        }
    }

    pub fn is_path_not_found(&self) -> bool {
        self.api_code() == Some(PATH_NOT_FOUND_CODE)
    }

    pub(crate) fn wrap(self, context: impl Into<String>) -> Error {
        Error::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

pub(crate) trait ResultExt<T> {
    fn context(self, context: &str) -> Result<T>;

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|e| e.wrap(context))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| e.wrap(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_not_found() -> Error {
        Error::Api {
            expected: vec![StatusCode::OK],
            status: StatusCode::NOT_FOUND,
            response: ApiErrorResponse {
                error: ApiError {
                    status: 404,
                    text: "path not found".into(),
                    code: PATH_NOT_FOUND_CODE.into(),
                },
                request_id: "abc".into(),
                href: "https://nginx.org/en/docs/http/ngx_http_api_module.html".into(),
            },
        }
    }

    #[test]
    fn api_code_is_found_through_context() {
        let err = path_not_found()
            .wrap("getting stream upstreams")
            .wrap("getting stats");

        assert_eq!(err.api_code(), Some("PathNotFound"));
        assert!(err.is_path_not_found());
        assert_eq!(err.to_string(), "getting stats");
    }

    #[test]
    fn other_errors_have_no_api_code() {
        let err = Error::Validation("zone required".into()).wrap("getting keyvals");
        assert_eq!(err.api_code(), None);
        assert!(!err.is_path_not_found());
    }

    #[test]
    fn api_error_payload_is_parsed_and_displayed() {
        let body = r#"{"error":{"status":404,"text":"upstream not found","code":"UpstreamNotFound"},"request_id":"id1","href":"https://nginx.org"}"#;
        let response: ApiErrorResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.error.code, "UpstreamNotFound");
        assert_eq!(
            response.to_string(),
            "error.status=404; error.text=upstream not found; error.code=UpstreamNotFound; request_id=id1; href=https://nginx.org"
        );
    }
}
