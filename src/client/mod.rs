//! HTTP plumbing shared by every API operation.

use std::time::Duration;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, StatusCode, Uri};
use http_body_util::Full;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::common::{ApiErrorResponse, Error, Result};

pub mod transport;

pub use transport::{HyperTransport, Transport};

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: u32 = 8;

pub const SUPPORTED_API_VERSIONS: [u32; 5] = [4, 5, 6, 7, 8];

/// Deadline applied to every request when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client of the NGINX Plus API.
///
/// Every operation issues its requests one after another and returns after
/// the last one completes or the first one fails.
#[derive(Debug, Clone)]
pub struct Client<T = HyperTransport> {
    base_url: String,
    version: u32,
    timeout: Duration,
    transport: T,
}

#[derive(Debug, Clone)]
pub struct ClientBuilder<T = HyperTransport> {
    base_url: String,
    version: u32,
    timeout: Duration,
    transport: T,
}

impl Client<HyperTransport> {
    /// Client for `base_url` (e.g. `http://127.0.0.1:8080/api`) with default
    /// settings.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: impl Into<String>) -> ClientBuilder<HyperTransport> {
        ClientBuilder {
            base_url: base_url.into(),
            version: DEFAULT_API_VERSION,
            timeout: DEFAULT_TIMEOUT,
            transport: HyperTransport::new(),
        }
    }
}

impl<T: Transport> ClientBuilder<T> {
    /// Version of the API to talk to. It is up to the caller to pick a
    /// version the server actually supports.
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn transport<U: Transport>(self, transport: U) -> ClientBuilder<U> {
        ClientBuilder {
            base_url: self.base_url,
            version: self.version,
            timeout: self.timeout,
            transport,
        }
    }

    pub fn build(self) -> Result<Client<T>> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Validation("empty base URL".into()));
        }
        base_url.parse::<Uri>()?;

        if !SUPPORTED_API_VERSIONS.contains(&self.version) {
            return Err(Error::UnsupportedVersion(self.version));
        }

        Ok(Client {
            base_url,
            version: self.version,
            timeout: self.timeout,
            transport: self.transport,
        })
    }
}

impl<T: Transport> Client<T> {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// API versions the server supports.
    pub async fn available_api_versions(&self) -> Result<Vec<u32>> {
        let url = format!("{}/", self.base_url);
        let body = self
            .execute(Method::GET, url, None, &[StatusCode::OK])
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.version, path)
    }

    pub(crate) async fn get<D: DeserializeOwned>(&self, path: &str) -> Result<D> {
        let body = self
            .execute(Method::GET, self.url(path), None, &[StatusCode::OK])
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub(crate) async fn post<P: Serialize + ?Sized>(&self, path: &str, payload: &P) -> Result<()> {
        let body = serde_json::to_vec(payload)?;
        self.execute(Method::POST, self.url(path), Some(body), &[StatusCode::CREATED])
            .await?;
        Ok(())
    }

    pub(crate) async fn patch<P: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &P,
        expected: &[StatusCode],
    ) -> Result<()> {
        let body = serde_json::to_vec(payload)?;
        self.execute(Method::PATCH, self.url(path), Some(body), expected)
            .await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, path: &str, expected: &[StatusCode]) -> Result<()> {
        self.execute(Method::DELETE, self.url(path), None, expected)
            .await?;
        Ok(())
    }

    async fn execute(
        &self,
        method: Method,
        url: String,
        body: Option<Vec<u8>>,
        expected: &[StatusCode],
    ) -> Result<Bytes> {
        let mut request = Request::builder().method(method.clone()).uri(&url);
        if body.is_some() {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        let request = request.body(Full::new(Bytes::from(body.unwrap_or_default())))?;

        debug!(%method, %url, "sending request");

        let response = tokio::time::timeout(self.timeout, self.transport.send(request))
            .await
            .map_err(|_| Error::Timeout {
                url: url.clone(),
                timeout: self.timeout,
            })?
            .map_err(|e| e.wrap(format!("sending {method} request to {url}")))?;

        let status = response.status();
        if !expected.contains(&status) {
            return Err(response_mismatch(expected, status, response.body()));
        }

        Ok(response.into_body())
    }
}

fn response_mismatch(expected: &[StatusCode], status: StatusCode, body: &[u8]) -> Error {
    match serde_json::from_slice::<ApiErrorResponse>(body) {
        Ok(response) => Error::Api {
            expected: expected.to_vec(),
            status,
            response,
        },
        Err(_) => Error::UnexpectedResponse {
            expected: expected.to_vec(),
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        },
    }
}
