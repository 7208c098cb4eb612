pub mod client;
pub mod common;
pub mod configuration;
pub mod keyvals;
pub mod stats;
pub mod upstream;
pub mod utils;

pub use common::{Error, Result};

pub mod prelude {
    pub use crate::client::{Client, ClientBuilder, HyperTransport, Transport};
    pub use crate::common::{normalize_address, Error, Result};
    pub use crate::configuration::Settings;
    pub use crate::keyvals::{KeyValPairs, KeyValPairsByZone};
    pub use crate::stats::Stats;
    pub use crate::upstream::{
        BackendServer, Context, HttpServer, Reconciler, ServerChanges, ServerDefaults,
        ServerParams, StreamServer,
    };
}
