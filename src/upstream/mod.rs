//! Backend servers of `http` and `stream` upstream groups.
//!
//! Both flavors share the same parameter set ([`ServerParams`]) and go through
//! the same reconciliation code, parameterized over [`BackendServer`].

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub mod manager;
pub mod reconcile;

pub use reconcile::{Reconciler, ServerChanges, ServerDefaults};

/// The API module a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Http,
    Stream,
}

impl Context {
    pub fn as_str(&self) -> &'static str {
        match self {
            Context::Http => "http",
            Context::Stream => "stream",
        }
    }
}

/// Parameters common to every upstream server.
///
/// `None` means the parameter was not specified, which is different from
/// specifying its default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_conns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fails: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slow_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

/// A server of an `http` upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub server: String,
    #[serde(flatten)]
    pub params: ServerParams,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub route: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub drain: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service: String,
}

/// A server of a `stream` upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamServer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub server: String,
    #[serde(flatten)]
    pub params: ServerParams,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl HttpServer {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Default::default()
        }
    }
}

impl StreamServer {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Default::default()
        }
    }
}

/// What the reconciliation and server-management code needs from a server
/// record. Equality (`PartialEq`) must cover every field.
pub trait BackendServer:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const CONTEXT: Context;

    fn id(&self) -> Option<u64>;
    fn set_id(&mut self, id: Option<u64>);

    fn address(&self) -> &str;
    fn set_address(&mut self, address: String);

    fn params(&self) -> &ServerParams;
    fn params_mut(&mut self) -> &mut ServerParams;
}

macro_rules! impl_backend_server {
    ($ty:ty, $context:expr) => {
        impl BackendServer for $ty {
            const CONTEXT: Context = $context;

            fn id(&self) -> Option<u64> {
                self.id
            }

            fn set_id(&mut self, id: Option<u64>) {
                self.id = id;
            }

            fn address(&self) -> &str {
                &self.server
            }

            fn set_address(&mut self, address: String) {
                self.server = address;
            }

            fn params(&self) -> &ServerParams {
                &self.params
            }

            fn params_mut(&mut self) -> &mut ServerParams {
                &mut self.params
            }
        }
    };
}

impl_backend_server!(HttpServer, Context::Http);
impl_backend_server!(StreamServer, Context::Stream);
