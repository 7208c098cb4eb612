//! In-memory stand-in for the NGINX Plus API.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use ngx_upstreams::prelude::*;
use serde_json::{json, Value};

pub const BASE_URL: &str = "http://nginx.test/api";

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct State {
    upstreams: HashMap<String, Vec<Value>>,
    keyvals: HashMap<String, BTreeMap<String, String>>,
    fixed: HashMap<String, (StatusCode, Value)>,
    failures: Vec<(Method, String)>,
    requests: Vec<Recorded>,
    next_id: u64,
    delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<State>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(&self, version: u32) -> Client<FakeApi> {
        Client::builder(BASE_URL)
            .version(version)
            .transport(self.clone())
            .build()
            .unwrap()
    }

    /// Creates an upstream holding the given addresses, with every parameter
    /// reported at its default the way NGINX does.
    pub fn with_upstream(self, context: Context, name: &str, addresses: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let mut servers = Vec::new();
            for address in addresses {
                let id = state.next_id;
                state.next_id += 1;
                servers.push(live_server(context, id, &json!({ "server": address })));
            }
            state.upstreams.insert(upstream_key(context, name), servers);
        }
        self
    }

    pub fn with_response(self, path: &str, status: StatusCode, body: Value) -> Self {
        self.state
            .lock()
            .unwrap()
            .fixed
            .insert(path.to_string(), (status, body));
        self
    }

    pub fn with_keyval_zone(self, context: Context, zone: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .keyvals
            .insert(keyval_key(context, zone), BTreeMap::new());
        self
    }

    /// Requests with this method and path answer 500.
    pub fn fail_on(self, method: Method, path: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((method, path.to_string()));
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().delay = Some(delay);
        self
    }

    pub fn servers(&self, context: Context, name: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .upstreams
            .get(&upstream_key(context, name))
            .cloned()
            .unwrap_or_default()
    }

    pub fn addresses(&self, context: Context, name: &str) -> Vec<String> {
        self.servers(context, name)
            .iter()
            .map(|s| s["server"].as_str().unwrap().to_string())
            .collect()
    }

    pub fn keyvals(&self, context: Context, zone: &str) -> Option<BTreeMap<String, String>> {
        self.state
            .lock()
            .unwrap()
            .keyvals
            .get(&keyval_key(context, zone))
            .cloned()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn writes(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != Method::GET)
            .collect()
    }

    fn handle(&self, method: Method, path: String, body: Option<Value>) -> (StatusCode, Value) {
        let mut state = self.state.lock().unwrap();
        state.requests.push(Recorded {
            method: method.clone(),
            path: path.clone(),
            body: body.clone(),
        });

        if state.failures.iter().any(|(m, p)| *m == method && *p == path) {
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error", "InternalError");
        }
        if let Some(response) = state.fixed.get(&path) {
            return response.clone();
        }

        let segments: Vec<&str> = path.split('/').collect();
        match segments.as_slice() {
            [context, "upstreams", name, "servers", rest @ ..] => {
                let context = parse_context(context);
                let key = upstream_key(context, name);
                handle_servers(&mut state, context, &key, &method, rest, body)
            }
            [context, "keyvals", zone] => {
                let key = keyval_key(parse_context(context), zone);
                handle_keyvals(&mut state, &key, &method, body)
            }
            [context, "keyvals"] => {
                let prefix = format!("{context}/");
                let all: BTreeMap<String, BTreeMap<String, String>> = state
                    .keyvals
                    .iter()
                    .filter_map(|(k, v)| k.strip_prefix(&prefix).map(|z| (z.to_string(), v.clone())))
                    .collect();
                (StatusCode::OK, json!(all))
            }
            _ => api_error(StatusCode::NOT_FOUND, "path not found", "PathNotFound"),
        }
    }
}

impl Transport for FakeApi {
    async fn send(&self, request: Request<Full<Bytes>>) -> ngx_upstreams::Result<Response<Bytes>> {
        let delay = self.state.lock().unwrap().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let (parts, body) = request.into_parts();
        let body = body.collect().await.unwrap().to_bytes();
        let body = if body.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&body).unwrap())
        };

        let url = parts.uri.to_string();
        let path = url
            .strip_prefix(BASE_URL)
            .unwrap()
            .trim_start_matches('/')
            .splitn(2, '/')
            .nth(1)
            .unwrap_or_default()
            .to_string();

        let (status, value) = self.handle(parts.method, path, body);
        let body = if value.is_null() {
            Bytes::new()
        } else {
            Bytes::from(serde_json::to_vec(&value).unwrap())
        };

        Ok(Response::builder().status(status).body(body).unwrap())
    }
}

fn handle_servers(
    state: &mut State,
    context: Context,
    key: &str,
    method: &Method,
    rest: &[&str],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let next_id = state.next_id;
    let Some(servers) = state.upstreams.get_mut(key) else {
        return api_error(StatusCode::NOT_FOUND, "upstream not found", "UpstreamNotFound");
    };

    match (method.as_str(), rest) {
        ("GET", []) => (StatusCode::OK, Value::Array(servers.clone())),
        ("POST", [""]) => {
            let body = body.unwrap();
            if servers.iter().any(|s| s["server"] == body["server"]) {
                return api_error(StatusCode::CONFLICT, "server already exists", "UpstreamServerExists");
            }
            servers.push(live_server(context, next_id, &body));
            state.next_id += 1;
            (StatusCode::CREATED, Value::Null)
        }
        ("DELETE", [id]) => {
            let id: u64 = id.parse().unwrap();
            let before = servers.len();
            servers.retain(|s| s["id"] != json!(id));
            if servers.len() == before {
                return api_error(StatusCode::NOT_FOUND, "server not found", "UpstreamServerNotFound");
            }
            (StatusCode::OK, Value::Array(servers.clone()))
        }
        ("PATCH", [id]) => {
            let id: u64 = id.parse().unwrap();
            let Some(server) = servers.iter_mut().find(|s| s["id"] == json!(id)) else {
                return api_error(StatusCode::NOT_FOUND, "server not found", "UpstreamServerNotFound");
            };
            for (field, value) in body.unwrap().as_object().unwrap() {
                server[field] = value.clone();
            }
            (StatusCode::OK, server.clone())
        }
        _ => api_error(StatusCode::METHOD_NOT_ALLOWED, "method not supported", "MethodNotSupported"),
    }
}

fn handle_keyvals(state: &mut State, key: &str, method: &Method, body: Option<Value>) -> (StatusCode, Value) {
    let Some(zone) = state.keyvals.get_mut(key) else {
        return api_error(StatusCode::NOT_FOUND, "keyval not found", "KeyvalNotFound");
    };

    match method.as_str() {
        "GET" => (StatusCode::OK, json!(zone)),
        "POST" => {
            for (k, v) in body.unwrap().as_object().unwrap() {
                if zone.contains_key(k) {
                    return api_error(StatusCode::CONFLICT, "key already exists", "KeyvalKeyExists");
                }
                zone.insert(k.clone(), v.as_str().unwrap().to_string());
            }
            (StatusCode::CREATED, Value::Null)
        }
        "PATCH" => {
            for (k, v) in body.unwrap().as_object().unwrap() {
                match v.as_str() {
                    Some(v) => {
                        zone.insert(k.clone(), v.to_string());
                    }
                    None => {
                        zone.remove(k);
                    }
                }
            }
            (StatusCode::NO_CONTENT, Value::Null)
        }
        "DELETE" => {
            zone.clear();
            (StatusCode::NO_CONTENT, Value::Null)
        }
        _ => api_error(StatusCode::METHOD_NOT_ALLOWED, "method not supported", "MethodNotSupported"),
    }
}

fn live_server(context: Context, id: u64, requested: &Value) -> Value {
    let mut server = json!({
        "id": id,
        "weight": 1,
        "max_conns": 0,
        "max_fails": 1,
        "fail_timeout": "10s",
        "slow_start": "0s",
        "backup": false,
        "down": false,
    });
    if context == Context::Http {
        server["route"] = json!("");
    }
    for (field, value) in requested.as_object().unwrap() {
        server[field] = value.clone();
    }
    server
}

fn parse_context(context: &str) -> Context {
    match context {
        "http" => Context::Http,
        "stream" => Context::Stream,
        other => panic!("unknown context {other}"),
    }
}

fn upstream_key(context: Context, name: &str) -> String {
    format!("{}/{}", context.as_str(), name)
}

fn keyval_key(context: Context, zone: &str) -> String {
    format!("{}/{}", context.as_str(), zone)
}

fn api_error(status: StatusCode, text: &str, code: &str) -> (StatusCode, Value) {
    (
        status,
        json!({
            "error": { "status": status.as_u16(), "text": text, "code": code },
            "request_id": "f00d",
            "href": "https://nginx.org/en/docs/http/ngx_http_api_module.html",
        }),
    )
}
