use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use ngx_upstreams::configuration::{run_mode, CONFIG_DIR};
use ngx_upstreams::prelude::*;
use ngx_upstreams::utils::tracing::{init_tracing, LogFormat};
use tracing::{error, info, info_span, Instrument};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(LogFormat::from_env()?)?;

    let run_mode = run_mode();
    let settings = Settings::load(Path::new(CONFIG_DIR), &run_mode).wrap_err("loading settings")?;
    sync_upstreams(&settings).await?;

    if !settings.watch {
        return Ok(());
    }

    let mut watcher = Settings::watch_config(Path::new(CONFIG_DIR), &run_mode)?;
    while let Some(new_settings) = watcher.recv().await {
        info!("Configuration changed, reconciling upstreams");
        if let Err(e) = sync_upstreams(&new_settings).await {
            error!("Error reconciling upstreams: {:?}", e);
        }
    }

    Ok(())
}

#[tracing::instrument(name = "Sync upstreams", skip_all, err(Debug))]
async fn sync_upstreams(settings: &Settings) -> Result<()> {
    let client = settings.client()?;

    for (upstream, servers) in &settings.http_upstreams {
        let changes = client
            .update_http_servers(upstream, servers)
            .instrument(info_span!("upstream", context = "http", %upstream))
            .await
            .wrap_err_with(|| format!("reconciling http upstream {upstream}"))?;
        report(upstream, &changes);
    }

    for (upstream, servers) in &settings.stream_upstreams {
        let changes = client
            .update_stream_servers(upstream, servers)
            .instrument(info_span!("upstream", context = "stream", %upstream))
            .await
            .wrap_err_with(|| format!("reconciling stream upstream {upstream}"))?;
        report(upstream, &changes);
    }

    Ok(())
}

fn report<S: BackendServer>(upstream: &str, changes: &ServerChanges<S>) {
    if changes.is_empty() {
        info!("{} upstream {} is up to date", S::CONTEXT.as_str(), upstream);
        return;
    }

    info!(
        "{} upstream {}: {} added, {} removed, {} updated",
        S::CONTEXT.as_str(),
        upstream,
        changes.added.len(),
        changes.removed.len(),
        changes.updated.len()
    );
}
