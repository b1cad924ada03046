//! Fire-and-forget relay of bandwidth samples to the map server.

use crate::translate::BandwidthSample;
use anyhow::{Context, Result};
use log::{debug, warn};
use ndnmap_common::metrics::CollectorMetrics;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Tuning knobs for the forwarder.
#[derive(Debug, Clone)]
pub struct ForwarderOptions {
    /// Host (and optional port) of the map server.
    pub endpoint: String,

    /// Per-request timeout; a hung map server must not pin resources.
    pub request_timeout: Duration,

    /// Upper bound on dispatches outstanding at once.
    pub max_in_flight: usize,
}

impl Default for ForwarderOptions {
    fn default() -> Self {
        Self {
            endpoint: crate::DEFAULT_MAP_SERVER.to_string(),
            request_timeout: Duration::from_secs(10),
            max_in_flight: 64,
        }
    }
}

/// Dispatches one HTTP notification per bandwidth sample without blocking
/// the interest-handling path.
///
/// Each dispatch runs as a detached task; completed ones are reaped
/// opportunistically on the next call. A failed dispatch is logged and the
/// sample is lost, never retried.
pub struct Forwarder {
    client: reqwest::Client,
    options: ForwarderOptions,
    in_flight: JoinSet<()>,
    metrics: Arc<CollectorMetrics>,
}

impl Forwarder {
    pub fn new(options: ForwarderOptions, metrics: Arc<CollectorMetrics>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            options,
            in_flight: JoinSet::new(),
            metrics,
        })
    }

    /// The notification URL for `sample` on `endpoint`.
    pub fn notify_url(endpoint: &str, sample: &BandwidthSample) -> String {
        format!(
            "http://{}/bw/{}/{}/{}/{}",
            endpoint, sample.link_id, sample.timestamp, sample.tx_bits, sample.rx_bits
        )
    }

    /// Dispatch exactly one notification for `sample`.
    ///
    /// Never blocks the caller. When the in-flight bound is reached the
    /// sample is discarded with a warning instead of queueing.
    pub fn forward(&mut self, sample: &BandwidthSample) {
        self.reap();

        if self.in_flight.len() >= self.options.max_in_flight {
            warn!(
                "{} forwards in flight, discarding sample for link {}",
                self.in_flight.len(),
                sample.link_id
            );
            self.metrics.forwards_discarded.increment();
            return;
        }

        let url = Self::notify_url(&self.options.endpoint, sample);
        debug!("forwarding {}", url);

        let client = self.client.clone();
        let metrics = Arc::clone(&self.metrics);
        self.in_flight.spawn(async move {
            // Any HTTP status is fine; only transport failures get a log line.
            if let Err(err) = client.get(&url).send().await {
                warn!("forward to {} failed: {}", url, err);
                metrics.forwards_failed.increment();
            }
        });

        self.metrics.forwards_dispatched.increment();
        self.metrics.forwards_in_flight.set(self.in_flight.len() as u64);
    }

    /// Collect already-finished dispatches without waiting on the rest.
    pub fn reap(&mut self) {
        while self.in_flight.try_join_next().is_some() {}
        self.metrics.forwards_in_flight.set(self.in_flight.len() as u64);
    }

    /// Wait for every outstanding dispatch; each is bounded by the request
    /// timeout. Called at shutdown.
    pub async fn drain(&mut self) {
        while self.in_flight.join_next().await.is_some() {}
        self.metrics.forwards_in_flight.set(0);
    }

    /// Number of dispatches currently outstanding.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
