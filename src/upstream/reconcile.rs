use super::{BackendServer, ServerParams};

pub const DEFAULT_MAX_CONNS: u32 = 0;
pub const DEFAULT_MAX_FAILS: u32 = 1;
pub const DEFAULT_FAIL_TIMEOUT: &str = "10s";
pub const DEFAULT_SLOW_START: &str = "0s";
pub const DEFAULT_BACKUP: bool = false;
pub const DEFAULT_DOWN: bool = false;
pub const DEFAULT_WEIGHT: u32 = 1;

/// Values the API assumes for server parameters that were not specified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDefaults {
    pub max_conns: u32,
    pub max_fails: u32,
    pub fail_timeout: String,
    pub slow_start: String,
    pub backup: bool,
    pub down: bool,
    pub weight: u32,
}

impl Default for ServerDefaults {
    fn default() -> Self {
        Self {
            max_conns: DEFAULT_MAX_CONNS,
            max_fails: DEFAULT_MAX_FAILS,
            fail_timeout: DEFAULT_FAIL_TIMEOUT.to_string(),
            slow_start: DEFAULT_SLOW_START.to_string(),
            backup: DEFAULT_BACKUP,
            down: DEFAULT_DOWN,
            weight: DEFAULT_WEIGHT,
        }
    }
}

impl ServerDefaults {
    /// Fills every parameter `desired` leaves unspecified but `live` has, with
    /// the default value. The live value itself is never copied, so an
    /// omitted parameter compares equal only when live holds the default.
    fn fill(&self, desired: &mut ServerParams, live: &ServerParams) {
        if live.max_conns.is_some() && desired.max_conns.is_none() {
            desired.max_conns = Some(self.max_conns);
        }
        if live.max_fails.is_some() && desired.max_fails.is_none() {
            desired.max_fails = Some(self.max_fails);
        }
        if live.fail_timeout.is_some() && desired.fail_timeout.is_none() {
            desired.fail_timeout = Some(self.fail_timeout.clone());
        }
        if live.slow_start.is_some() && desired.slow_start.is_none() {
            desired.slow_start = Some(self.slow_start.clone());
        }
        if live.backup.is_some() && desired.backup.is_none() {
            desired.backup = Some(self.backup);
        }
        if live.down.is_some() && desired.down.is_none() {
            desired.down = Some(self.down);
        }
        if live.weight.is_some() && desired.weight.is_none() {
            desired.weight = Some(self.weight);
        }
    }
}

/// Result of reconciling a desired server list against the live one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerChanges<S> {
    pub added: Vec<S>,
    pub removed: Vec<S>,
    pub updated: Vec<S>,
}

impl<S> Default for ServerChanges<S> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
            updated: Vec::new(),
        }
    }
}

impl<S> ServerChanges<S> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

/// Computes which servers to add, remove and update in an upstream.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    defaults: ServerDefaults,
}

impl Reconciler {
    pub fn new(defaults: ServerDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &ServerDefaults {
        &self.defaults
    }

    /// Whether applying `desired` over `live` would leave the server unchanged.
    ///
    /// The id of `desired` is ignored. Addresses are compared as given, so
    /// `desired` should already be normalized.
    pub fn same_effective_parameters<S: BackendServer>(&self, desired: &S, live: &S) -> bool {
        let mut desired = desired.clone();
        desired.set_id(live.id());
        self.defaults.fill(desired.params_mut(), live.params());

        desired == *live
    }

    /// Splits `desired` against `live` by address into servers to add, servers
    /// to remove and servers whose parameters changed.
    ///
    /// Updated servers carry the id of the live server they replace.
    pub fn diff<S: BackendServer>(&self, desired: &[S], live: &[S]) -> ServerChanges<S> {
        let mut changes = ServerChanges::default();

        for server in desired {
            let matched = live.iter().find(|l| l.address() == server.address());
            if let Some(live_server) = matched {
                if !self.same_effective_parameters(server, live_server) {
                    let mut server = server.clone();
                    server.set_id(live_server.id());
                    changes.updated.push(server);
                }
            }
        }

        changes.added = desired
            .iter()
            .filter(|d| !live.iter().any(|l| l.address() == d.address()))
            .cloned()
            .collect();

        changes.removed = live
            .iter()
            .filter(|l| !desired.iter().any(|d| d.address() == l.address()))
            .cloned()
            .collect();

        changes
    }
}
