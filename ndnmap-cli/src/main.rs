//! ndnmap link-status collector daemon.
//!
//! Receives status info in the form of interests from gateways, resolves the
//! reporting link through the operator's link table, and relays bandwidth
//! samples to the ndnmap server.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use ndnmap_collector::{
    Forwarder, ForwarderOptions, InterestDispatcher, LinkTable, StatusTransport,
    UdpStatusTransport, POLL_WINDOW,
};
use ndnmap_common::metrics::CollectorMetrics;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

mod settings;

use settings::Settings;

/// ndnmap link-status collector
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// File containing ip pairs associated with link ids
    #[clap(short = 'f', long)]
    link_file: PathBuf,

    /// Number of link ids supplied by the link file
    #[clap(short = 'n', long)]
    link_count: usize,

    /// Address of the ndnmap server notifications are sent to
    #[clap(short = 's', long)]
    map_server: Option<String>,

    /// Address the UDP status face listens on
    #[clap(short, long)]
    listen: Option<String>,

    /// Optional configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Sets the level of verbosity
    #[clap(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "info" }),
    )
    .init();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(map_server) = cli.map_server {
        settings.map_server = map_server;
    }
    if let Some(listen) = cli.listen {
        settings.listen = listen;
    }

    run(&cli.link_file, cli.link_count, settings).await
}

async fn run(link_file: &Path, link_count: usize, settings: Settings) -> Result<()> {
    let file = File::open(link_file)
        .with_context(|| format!("cannot open file {}", link_file.display()))?;
    let table = LinkTable::load(BufReader::new(file), link_count)
        .with_context(|| format!("loading link table {}", link_file.display()))?;
    info!(
        "loaded {} link entries ({} malformed lines skipped)",
        table.len(),
        table.skipped_lines()
    );

    let table = Arc::new(table);
    let metrics = Arc::new(CollectorMetrics::new());

    let forwarder = Forwarder::new(
        ForwarderOptions {
            endpoint: settings.map_server.clone(),
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
            max_in_flight: settings.max_in_flight,
        },
        Arc::clone(&metrics),
    )?;

    let mut transport = UdpStatusTransport::bind(&settings.listen).await?;
    let mut dispatcher =
        InterestDispatcher::new(Arc::clone(&table), forwarder, Arc::clone(&metrics));
    dispatcher.register_prefixes(&mut transport)?;
    info!(
        "listening on {}, forwarding to http://{}/bw, {} prefixes registered",
        transport.local_addr()?,
        settings.map_server,
        table.len()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            upcall = transport.poll(POLL_WINDOW) => {
                if let Some(upcall) = upcall? {
                    let result = dispatcher.handle(&upcall);
                    transport.complete(&upcall, result);
                }
            }
        }
    }

    info!("exit collector...");
    dispatcher.drain().await;
    info!(
        "{} interests received, {} rejected, {} samples dropped, {} forwards ({} failed, {} discarded)",
        metrics.interests_received.value(),
        metrics.interests_rejected.value(),
        metrics.samples_dropped.value(),
        metrics.forwards_dispatched.value(),
        metrics.forwards_failed.value(),
        metrics.forwards_discarded.value()
    );

    Ok(())
}
