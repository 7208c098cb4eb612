use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use notify::{recommended_watcher, Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{debug, error, info};

use crate::client::{Client, DEFAULT_API_VERSION, DEFAULT_TIMEOUT};
use crate::upstream::{HttpServer, StreamServer};

/// Directory the binary reads its settings files from.
pub const CONFIG_DIR: &str = ".";

const CONFIG_NAME: &str = "config";
const ENV_PREFIX: &str = "NGX";
const DEFAULT_RUN_MODE: &str = "development";
const PRODUCTION_RUN_MODE: &str = "production";

// Formats the `config` crate is built with by default.
const SETTINGS_EXTENSIONS: [&str; 7] = ["toml", "json", "yaml", "yml", "ini", "ron", "json5"];

fn default_api_version() -> u32 {
    DEFAULT_API_VERSION
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// `RUN_MODE` from the environment, `development` when unset.
pub fn run_mode() -> String {
    env::var("RUN_MODE").unwrap_or_else(|_| DEFAULT_RUN_MODE.into())
}

/// Client settings plus the desired servers of each managed upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Keep running and reconcile again whenever the configuration changes.
    #[serde(default)]
    pub watch: bool,
    #[serde(default)]
    pub http_upstreams: BTreeMap<String, Vec<HttpServer>>,
    #[serde(default)]
    pub stream_upstreams: BTreeMap<String, Vec<StreamServer>>,
}

impl Settings {
    /// Layers `<dir>/config.*` (required in production), `<dir>/<run_mode>.*`
    /// (optional) and `NGX_*` environment variables, later sources taking
    /// precedence.
    pub fn load(dir: &Path, run_mode: &str) -> Result<Self, ConfigError> {
        let source = |name: &str| dir.join(name).to_string_lossy().into_owned();

        Config::builder()
            .add_source(File::with_name(&source(CONFIG_NAME)).required(run_mode == PRODUCTION_RUN_MODE))
            .add_source(File::with_name(&source(run_mode)).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }

    /// Loads the given file, overridden by `NGX_*` environment variables.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn client(&self) -> crate::Result<Client> {
        Client::builder(self.base_url.as_str())
            .version(self.api_version)
            .timeout(self.timeout())
            .build()
    }

    /// Reloads the settings with [`Settings::load`] every time one of the
    /// files it reads from `dir` is written, created or removed.
    pub fn watch_config(dir: &Path, run_mode: &str) -> notify::Result<ConfigWatcher> {
        let (tx, rx) = unbounded_channel();
        let config_dir: PathBuf = dir.to_path_buf();
        let mode = run_mode.to_string();

        let mut watcher: RecommendedWatcher = recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    error!("Watch error: {:?}", e);
                    return;
                }
            };

            let relevant = event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove();
            if !relevant || !event.paths.iter().any(|p| is_settings_file(p, &mode)) {
                return;
            }

            debug!(paths = ?event.paths, "settings file changed");
            match Settings::load(&config_dir, &mode) {
                Ok(new_settings) => {
                    if let Err(e) = tx.send(new_settings) {
                        error!("Error sending new config: {:?}", e);
                    }
                }
                Err(e) => error!("Error reloading config: {:?}", e),
            }
        })?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        info!("Watching {} for changes to {}.* and {}.*", dir.display(), CONFIG_NAME, run_mode);

        Ok(ConfigWatcher {
            _watcher: watcher,
            rx,
        })
    }
}

/// Whether `path` is a file [`Settings::load`] reads for `run_mode`.
fn is_settings_file(path: &Path, run_mode: &str) -> bool {
    let stem = path.file_stem().and_then(|s| s.to_str());
    let extension = path.extension().and_then(|e| e.to_str());

    matches!(stem, Some(s) if s == CONFIG_NAME || s == run_mode)
        && matches!(extension, Some(e) if SETTINGS_EXTENSIONS.contains(&e))
}

/// Delivers reloaded settings; watching stops when this is dropped.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: UnboundedReceiver<Settings>,
}

impl ConfigWatcher {
    pub async fn recv(&mut self) -> Option<Settings> {
        self.rx.recv().await
    }
}
