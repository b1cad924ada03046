//! Metrics collection for the ndnmap collector.
//!
//! Counters are updated on the dispatch path and reported when the daemon
//! shuts down.

use std::sync::atomic::{AtomicU64, Ordering};

/* ---------------------------------------------------------------- *
 * Simple Counter
 * ---------------------------------------------------------------- */

#[derive(Debug)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Counter {
    fn clone(&self) -> Self {
        let c = Counter::new();
        c.value.store(self.value.load(Ordering::Relaxed), Ordering::Relaxed);
        c
    }
}

/* ---------------------------------------------------------------- *
 * Gauge
 * ---------------------------------------------------------------- */

#[derive(Debug)]
pub struct Gauge {
    value: AtomicU64,
}

impl Gauge {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Default for Gauge {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Gauge {
    fn clone(&self) -> Self {
        let g = Gauge::new();
        g.value.store(self.value.load(Ordering::Relaxed), Ordering::Relaxed);
        g
    }
}

/* ---------------------------------------------------------------- *
 * Aggregate metrics for the collector
 * ---------------------------------------------------------------- */

#[derive(Debug, Default, Clone)]
pub struct CollectorMetrics {
    /// Interest upcalls delivered to the dispatcher.
    pub interests_received: Counter,
    /// Interests that failed the monitoring-name grammar.
    pub interests_rejected: Counter,
    /// Decoded reports whose address pair resolved to no link id.
    pub samples_dropped: Counter,
    /// Notifications handed to the forwarder.
    pub forwards_dispatched: Counter,
    /// Notifications whose HTTP dispatch failed.
    pub forwards_failed: Counter,
    /// Notifications discarded because the in-flight bound was hit.
    pub forwards_discarded: Counter,
    /// Forward dispatches currently outstanding.
    pub forwards_in_flight: Gauge,
}

impl CollectorMetrics {
    pub fn new() -> Self {
        Self::default()
    }
}
