//! Read access to the runtime counters of the API.

use serde::de::DeserializeOwned;

use crate::client::{Client, Transport};
use crate::common::error::ResultExt;
use crate::common::Result;

pub mod types;

pub use types::*;

impl<T: Transport> Client<T> {
    /// Reads every counter group, one request after another.
    #[tracing::instrument(name = "Get stats", skip_all, err(Debug))]
    pub async fn get_stats(&self) -> Result<Stats> {
        self.collect_stats().await.context("getting stats")
    }

    async fn collect_stats(&self) -> Result<Stats> {
        Ok(Stats {
            nginx_info: self.get_nginx_info().await?,
            caches: self.get_caches().await?,
            processes: self.get_processes().await?,
            slabs: self.get_slabs().await?,
            connections: self.get_connections().await?,
            http_requests: self.get_http_requests().await?,
            ssl: self.get_ssl().await?,
            server_zones: self.get_server_zones().await?,
            upstreams: self.get_upstreams().await?,
            stream_server_zones: self.get_stream_server_zones().await?,
            stream_upstreams: self.get_stream_upstreams().await?,
            stream_zone_sync: self.get_stream_zone_sync().await?,
            location_zones: self.get_location_zones().await?,
            resolvers: self.get_resolvers().await?,
            http_limit_requests: self.get_http_limit_requests().await?,
            http_limit_connections: self.get_http_connections_limit().await?,
            stream_limit_connections: self.get_stream_connections_limit().await?,
        })
    }

    pub async fn get_nginx_info(&self) -> Result<NginxInfo> {
        self.get("nginx").await.context("getting NGINX info")
    }

    pub async fn get_caches(&self) -> Result<Caches> {
        self.get("http/caches").await.context("getting caches")
    }

    pub async fn get_slabs(&self) -> Result<Slabs> {
        self.get("slabs").await.context("getting slabs")
    }

    pub async fn get_connections(&self) -> Result<Connections> {
        self.get("connections").await.context("getting connections")
    }

    pub async fn get_http_requests(&self) -> Result<HttpRequests> {
        self.get("http/requests").await.context("getting http requests")
    }

    pub async fn get_ssl(&self) -> Result<Ssl> {
        self.get("ssl").await.context("getting ssl")
    }

    pub async fn get_server_zones(&self) -> Result<ServerZones> {
        self.get("http/server_zones")
            .await
            .context("getting server zones")
    }

    pub async fn get_upstreams(&self) -> Result<Upstreams> {
        self.get("http/upstreams").await.context("getting upstreams")
    }

    pub async fn get_processes(&self) -> Result<Processes> {
        self.get("processes").await.context("getting processes")
    }

    /// Empty when the stream module isn't configured.
    pub async fn get_stream_server_zones(&self) -> Result<StreamServerZones> {
        self.get_stream_optional("stream/server_zones")
            .await
            .context("getting stream server zones")
    }

    /// Empty when the stream module isn't configured.
    pub async fn get_stream_upstreams(&self) -> Result<StreamUpstreams> {
        self.get_stream_optional("stream/upstreams")
            .await
            .context("getting stream upstreams")
    }

    /// Empty when zone synchronization isn't configured.
    pub async fn get_stream_zone_sync(&self) -> Result<StreamZoneSync> {
        self.get_stream_optional("stream/zone_sync")
            .await
            .context("getting stream zone sync")
    }

    /// Requires API version 5; older versions get an empty result.
    pub async fn get_location_zones(&self) -> Result<LocationZones> {
        if self.version() < 5 {
            return Ok(LocationZones::default());
        }
        self.get("http/location_zones")
            .await
            .context("getting location zones")
    }

    /// Requires API version 5; older versions get an empty result.
    pub async fn get_resolvers(&self) -> Result<Resolvers> {
        if self.version() < 5 {
            return Ok(Resolvers::default());
        }
        self.get("resolvers").await.context("getting resolvers")
    }

    /// Requires API version 6; older versions get an empty result.
    pub async fn get_http_limit_requests(&self) -> Result<HttpLimitRequests> {
        if self.version() < 6 {
            return Ok(HttpLimitRequests::default());
        }
        self.get("http/limit_reqs")
            .await
            .context("getting http limit requests")
    }

    /// Requires API version 6; older versions get an empty result.
    pub async fn get_http_connections_limit(&self) -> Result<HttpLimitConnections> {
        if self.version() < 6 {
            return Ok(HttpLimitConnections::default());
        }
        self.get("http/limit_conns")
            .await
            .context("getting http connections limit")
    }

    /// Requires API version 6; older versions get an empty result. Also empty
    /// when the stream module isn't configured.
    pub async fn get_stream_connections_limit(&self) -> Result<StreamLimitConnections> {
        if self.version() < 6 {
            return Ok(StreamLimitConnections::default());
        }
        self.get_stream_optional("stream/limit_conns")
            .await
            .context("getting stream connections limit")
    }

    async fn get_stream_optional<D: DeserializeOwned + Default>(&self, path: &str) -> Result<D> {
        match self.get(path).await {
            Err(e) if e.is_path_not_found() => Ok(D::default()),
            other => other,
        }
    }
}
