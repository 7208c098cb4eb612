use http::StatusCode;
use tracing::info;

use super::{BackendServer, HttpServer, Reconciler, ServerChanges, StreamServer};
use crate::client::{Client, Transport};
use crate::common::error::ResultExt;
use crate::common::{normalize_address, Error, Result};

const MODIFY_SERVER_STATUSES: [StatusCode; 2] = [StatusCode::OK, StatusCode::NO_CONTENT];

/// Code the API reports when no server has the requested id.
const SERVER_NOT_FOUND_CODE: &str = "UpstreamServerNotFound";

fn servers_path<S: BackendServer>(upstream: &str) -> String {
    format!("{}/upstreams/{}/servers", S::CONTEXT.as_str(), upstream)
}

fn validate_upstream(upstream: &str) -> Result<()> {
    if upstream.is_empty() {
        return Err(Error::Validation("upstream name required".into()));
    }
    Ok(())
}

impl<T: Transport> Client<T> {
    /// Servers currently configured in the upstream.
    pub async fn get_servers<S: BackendServer>(&self, upstream: &str) -> Result<Vec<S>> {
        validate_upstream(upstream)?;
        self.get(&servers_path::<S>(upstream))
            .await
            .with_context(|| {
                format!(
                    "getting servers of {} upstream {}",
                    S::CONTEXT.as_str(),
                    upstream
                )
            })
    }

    /// Fails when the upstream doesn't exist.
    pub async fn check_if_upstream_exists<S: BackendServer>(&self, upstream: &str) -> Result<()> {
        self.get_servers::<S>(upstream).await.map(|_| ())
    }

    async fn find_server<S: BackendServer>(&self, upstream: &str, address: &str) -> Result<Option<S>> {
        let servers = self.get_servers::<S>(upstream).await?;
        Ok(servers.into_iter().find(|s| s.address() == address))
    }

    /// Adds a server to the upstream, failing if its address is already there.
    pub async fn add_server<S: BackendServer>(&self, upstream: &str, server: &S) -> Result<()> {
        let context = || {
            format!(
                "adding {} server to {} upstream {}",
                server.address(),
                S::CONTEXT.as_str(),
                upstream
            )
        };

        if self
            .find_server::<S>(upstream, server.address())
            .await
            .with_context(context)?
            .is_some()
        {
            return Err(Error::DuplicateServer {
                upstream: upstream.to_string(),
                server: server.address().to_string(),
            });
        }

        let path = format!("{}/", servers_path::<S>(upstream));
        self.post(&path, server).await.with_context(context)
    }

    /// Removes the server with the given address from the upstream.
    pub async fn delete_server<S: BackendServer>(&self, upstream: &str, address: &str) -> Result<()> {
        let context = || {
            format!(
                "removing {} server from {} upstream {}",
                address,
                S::CONTEXT.as_str(),
                upstream
            )
        };

        let id = self
            .find_server::<S>(upstream, address)
            .await
            .with_context(context)?
            .and_then(|s| s.id())
            .ok_or_else(|| Error::ServerNotFound {
                upstream: upstream.to_string(),
                server: address.to_string(),
            })?;

        let path = format!("{}/{}", servers_path::<S>(upstream), id);
        self.delete(&path, &MODIFY_SERVER_STATUSES)
            .await
            .with_context(context)
    }

    /// Updates the parameters of the server identified by `server.id()`.
    ///
    /// The id is sent in the path only, never in the body. An id the upstream
    /// doesn't know gives [`Error::ServerNotFound`].
    pub async fn update_server<S: BackendServer>(&self, upstream: &str, server: &S) -> Result<()> {
        validate_upstream(upstream)?;
        let context = || {
            format!(
                "updating {} server of {} upstream {}",
                server.address(),
                S::CONTEXT.as_str(),
                upstream
            )
        };

        let id = server.id().ok_or_else(|| {
            Error::Validation(format!("server {} has no id", server.address()))
        })?;

        let mut payload = server.clone();
        payload.set_id(None);

        let path = format!("{}/{}", servers_path::<S>(upstream), id);
        self.patch(&path, &payload, &MODIFY_SERVER_STATUSES)
            .await
            .map_err(|e| {
                if e.api_code() == Some(SERVER_NOT_FOUND_CODE) {
                    Error::ServerNotFound {
                        upstream: upstream.to_string(),
                        server: server.address().to_string(),
                    }
                } else {
                    e.wrap(context())
                }
            })
    }

    /// Makes the servers of the upstream match `servers`.
    ///
    /// Servers missing from the upstream are added, servers absent from
    /// `servers` are removed and servers whose parameters differ are updated.
    /// Addresses without a port get port 80. The first failing request stops
    /// the batch; changes applied before it stay applied.
    #[tracing::instrument(
        name = "Update upstream servers",
        skip(self, servers),
        fields(context = S::CONTEXT.as_str()),
        err(Debug)
    )]
    pub async fn update_servers<S: BackendServer>(
        &self,
        upstream: &str,
        servers: &[S],
    ) -> Result<ServerChanges<S>> {
        let context = || {
            format!(
                "updating servers of {} upstream {}",
                S::CONTEXT.as_str(),
                upstream
            )
        };

        validate_upstream(upstream)?;
        if let Some(server) = servers.iter().find(|s| s.address().is_empty()) {
            return Err(Error::Validation(format!(
                "server without an address: {server:?}"
            )));
        }

        let live = self.get_servers::<S>(upstream).await.with_context(context)?;

        let desired: Vec<S> = servers
            .iter()
            .map(|server| {
                let mut server = server.clone();
                server.set_address(normalize_address(server.address()));
                server
            })
            .collect();

        let changes = Reconciler::default().diff(&desired, &live);

        for server in &changes.added {
            self.add_server(upstream, server).await.with_context(context)?;
            info!(server = server.address(), "added server");
        }

        for server in &changes.removed {
            self.delete_server::<S>(upstream, server.address())
                .await
                .with_context(context)?;
            info!(server = server.address(), "removed server");
        }

        for server in &changes.updated {
            self.update_server(upstream, server).await.with_context(context)?;
            info!(server = server.address(), "updated server");
        }

        Ok(changes)
    }

    pub async fn get_http_servers(&self, upstream: &str) -> Result<Vec<HttpServer>> {
        self.get_servers(upstream).await
    }

    pub async fn check_if_http_upstream_exists(&self, upstream: &str) -> Result<()> {
        self.check_if_upstream_exists::<HttpServer>(upstream).await
    }

    pub async fn add_http_server(&self, upstream: &str, server: &HttpServer) -> Result<()> {
        self.add_server(upstream, server).await
    }

    pub async fn delete_http_server(&self, upstream: &str, address: &str) -> Result<()> {
        self.delete_server::<HttpServer>(upstream, address).await
    }

    pub async fn update_http_server(&self, upstream: &str, server: &HttpServer) -> Result<()> {
        self.update_server(upstream, server).await
    }

    pub async fn update_http_servers(
        &self,
        upstream: &str,
        servers: &[HttpServer],
    ) -> Result<ServerChanges<HttpServer>> {
        self.update_servers(upstream, servers).await
    }

    pub async fn get_stream_servers(&self, upstream: &str) -> Result<Vec<StreamServer>> {
        self.get_servers(upstream).await
    }

    pub async fn check_if_stream_upstream_exists(&self, upstream: &str) -> Result<()> {
        self.check_if_upstream_exists::<StreamServer>(upstream).await
    }

    pub async fn add_stream_server(&self, upstream: &str, server: &StreamServer) -> Result<()> {
        self.add_server(upstream, server).await
    }

    pub async fn delete_stream_server(&self, upstream: &str, address: &str) -> Result<()> {
        self.delete_server::<StreamServer>(upstream, address).await
    }

    pub async fn update_stream_server(&self, upstream: &str, server: &StreamServer) -> Result<()> {
        self.update_server(upstream, server).await
    }

    pub async fn update_stream_servers(
        &self,
        upstream: &str,
        servers: &[StreamServer],
    ) -> Result<ServerChanges<StreamServer>> {
        self.update_servers(upstream, servers).await
    }
}
