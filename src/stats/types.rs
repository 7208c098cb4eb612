use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

/// All statistics exposed by the API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    pub nginx_info: NginxInfo,
    pub caches: Caches,
    pub processes: Processes,
    pub connections: Connections,
    pub slabs: Slabs,
    pub http_requests: HttpRequests,
    pub ssl: Ssl,
    pub server_zones: ServerZones,
    pub upstreams: Upstreams,
    pub stream_server_zones: StreamServerZones,
    pub stream_upstreams: StreamUpstreams,
    pub stream_zone_sync: StreamZoneSync,
    pub location_zones: LocationZones,
    pub resolvers: Resolvers,
    pub http_limit_requests: HttpLimitRequests,
    pub http_limit_connections: HttpLimitConnections,
    pub stream_limit_connections: StreamLimitConnections,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NginxInfo {
    pub version: String,
    pub build: String,
    pub address: String,
    pub generation: u64,
    pub load_timestamp: String,
    pub timestamp: String,
    #[serde(rename = "pid")]
    pub process_id: u64,
    #[serde(rename = "ppid")]
    pub parent_process_id: u64,
}

/// Cache stats by cache zone.
pub type Caches = HashMap<String, HttpCache>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpCache {
    pub size: u64,
    pub max_size: u64,
    pub cold: bool,
    pub hit: CacheStats,
    pub stale: CacheStats,
    pub updating: CacheStats,
    pub revalidated: CacheStats,
    pub miss: CacheStats,
    pub expired: ExtendedCacheStats,
    pub bypass: ExtendedCacheStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheStats {
    pub responses: u64,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtendedCacheStats {
    pub responses: u64,
    pub bytes: u64,
    pub responses_written: u64,
    pub bytes_written: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Connections {
    pub accepted: u64,
    pub dropped: u64,
    pub active: u64,
    pub idle: u64,
}

/// Slab allocator stats by zone.
pub type Slabs = HashMap<String, Slab>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Slab {
    pub pages: Pages,
    /// Slots by slot size.
    pub slots: HashMap<String, Slot>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Pages {
    pub used: u64,
    pub free: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Slot {
    pub used: u64,
    pub free: u64,
    pub reqs: u64,
    pub fails: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpRequests {
    pub total: u64,
    pub current: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Ssl {
    pub handshakes: u64,
    pub handshakes_failed: u64,
    pub session_reuses: u64,
}

pub type ServerZones = HashMap<String, ServerZone>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerZone {
    pub processing: u64,
    pub requests: u64,
    pub responses: Responses,
    pub discarded: u64,
    pub received: u64,
    pub sent: u64,
    pub ssl: Ssl,
}

pub type StreamServerZones = HashMap<String, StreamServerZone>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StreamServerZone {
    pub processing: u64,
    pub connections: u64,
    pub sessions: Sessions,
    pub discarded: u64,
    pub received: u64,
    pub sent: u64,
    pub ssl: Ssl,
}

/// Synchronization state of shared memory zones across a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StreamZoneSync {
    pub zones: HashMap<String, SyncZone>,
    pub status: StreamZoneSyncStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncZone {
    pub records_pending: u64,
    pub records_total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StreamZoneSyncStatus {
    pub bytes_in: u64,
    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_out: u64,
    pub nodes_online: u64,
}

/// Number of responses by status code.
pub type HttpCodes = BTreeMap<u16, u64>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Responses {
    pub codes: HttpCodes,
    #[serde(rename = "1xx")]
    pub responses_1xx: u64,
    #[serde(rename = "2xx")]
    pub responses_2xx: u64,
    #[serde(rename = "3xx")]
    pub responses_3xx: u64,
    #[serde(rename = "4xx")]
    pub responses_4xx: u64,
    #[serde(rename = "5xx")]
    pub responses_5xx: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Sessions {
    #[serde(rename = "2xx")]
    pub sessions_2xx: u64,
    #[serde(rename = "4xx")]
    pub sessions_4xx: u64,
    #[serde(rename = "5xx")]
    pub sessions_5xx: u64,
    pub total: u64,
}

pub type Upstreams = HashMap<String, Upstream>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Upstream {
    pub peers: Vec<Peer>,
    pub keepalives: i64,
    pub zombies: i64,
    pub zone: String,
    pub queue: Queue,
}

pub type StreamUpstreams = HashMap<String, StreamUpstream>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StreamUpstream {
    pub peers: Vec<StreamPeer>,
    pub zombies: i64,
    pub zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Queue {
    pub size: i64,
    pub max_size: i64,
    pub overflows: u64,
}

/// Stats of one server of an `http` upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Peer {
    pub id: i64,
    pub server: String,
    pub service: String,
    pub name: String,
    pub backup: bool,
    pub weight: i64,
    pub state: String,
    pub active: u64,
    pub ssl: Ssl,
    pub max_conns: i64,
    pub requests: u64,
    pub responses: Responses,
    pub sent: u64,
    pub received: u64,
    pub fails: u64,
    pub unavail: u64,
    pub health_checks: HealthChecks,
    pub downtime: u64,
    pub downstart: String,
    pub selected: String,
    pub header_time: u64,
    pub response_time: u64,
}

/// Stats of one server of a `stream` upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StreamPeer {
    pub id: i64,
    pub server: String,
    pub service: String,
    pub name: String,
    pub backup: bool,
    pub weight: i64,
    pub state: String,
    pub active: u64,
    pub ssl: Ssl,
    pub max_conns: i64,
    pub connections: u64,
    pub connect_time: i64,
    pub first_byte_time: i64,
    pub response_time: u64,
    pub sent: u64,
    pub received: u64,
    pub fails: u64,
    pub unavail: u64,
    pub health_checks: HealthChecks,
    pub downtime: u64,
    pub downstart: String,
    pub selected: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HealthChecks {
    pub checks: u64,
    pub fails: u64,
    pub unhealthy: u64,
    pub last_passed: bool,
}

pub type LocationZones = HashMap<String, LocationZone>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LocationZone {
    pub requests: i64,
    pub responses: Responses,
    pub discarded: i64,
    pub received: i64,
    pub sent: i64,
}

pub type Resolvers = HashMap<String, Resolver>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Resolver {
    pub requests: ResolverRequests,
    pub responses: ResolverResponses,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverRequests {
    pub name: i64,
    pub srv: i64,
    pub addr: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverResponses {
    pub noerror: i64,
    pub formerr: i64,
    pub servfail: i64,
    pub nxdomain: i64,
    pub notimp: i64,
    pub refused: i64,
    pub timedout: i64,
    pub unknown: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Processes {
    pub respawned: i64,
}

/// Request rate limiting counters of one zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpLimitRequest {
    pub passed: u64,
    pub delayed: u64,
    pub rejected: u64,
    pub delayed_dry_run: u64,
    pub rejected_dry_run: u64,
}

pub type HttpLimitRequests = HashMap<String, HttpLimitRequest>;

/// Connection limiting counters of one zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LimitConnection {
    pub passed: u64,
    pub rejected: u64,
    pub rejected_dry_run: u64,
}

pub type HttpLimitConnections = HashMap<String, LimitConnection>;

pub type StreamLimitConnections = HashMap<String, LimitConnection>;
