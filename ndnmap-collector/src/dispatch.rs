//! Registration and routing of interest upcalls.

use crate::decode;
use crate::forward::Forwarder;
use crate::link_table::LinkTable;
use crate::translate;
use crate::transport::{StatusTransport, Upcall, UpcallKind, UpcallResult};
use anyhow::Result;
use log::{debug, trace};
use ndnmap_common::metrics::CollectorMetrics;
use ndnmap_common::ndn::Name;
use std::sync::Arc;

/// Routes interest upcalls through decode, translation and forwarding.
///
/// One prefix per known link pair is registered at startup; the set never
/// changes afterwards. Upcalls are handled to completion, one at a time, on
/// the host event loop; only the forward dispatch leaves the loop.
pub struct InterestDispatcher {
    table: Arc<LinkTable>,
    forwarder: Forwarder,
    metrics: Arc<CollectorMetrics>,
}

impl InterestDispatcher {
    pub fn new(
        table: Arc<LinkTable>,
        forwarder: Forwarder,
        metrics: Arc<CollectorMetrics>,
    ) -> Self {
        Self {
            table,
            forwarder,
            metrics,
        }
    }

    /// Register one interest filter per link table entry:
    /// `<monitoring prefix>/<source>/<dest>`.
    pub fn register_prefixes(&self, transport: &mut dyn StatusTransport) -> Result<()> {
        for entry in self.table.entries() {
            let prefix = Name::from_string(&format!(
                "{}/{}/{}",
                crate::STATUS_PREFIX,
                entry.source_addr,
                entry.dest_addr
            ));
            transport.register_prefix(prefix)?;
        }
        Ok(())
    }

    /// Handle one upcall to completion: decode, translate, start the
    /// forward. Non-interest upcalls and non-monitoring names are ignored.
    pub fn handle(&mut self, upcall: &Upcall) -> UpcallResult {
        match upcall.kind {
            UpcallKind::Interest => {}
            kind => {
                trace!("ignoring non-interest upcall: {:?}", kind);
                return UpcallResult::Ignored;
            }
        }

        self.metrics.interests_received.increment();

        let status = match decode::decode_status(&upcall.name, crate::STATUS_TAG) {
            Some(status) => status,
            None => {
                self.metrics.interests_rejected.increment();
                return UpcallResult::Ignored;
            }
        };

        match translate::translate(&status, &self.table) {
            Some(sample) => {
                debug!(
                    "sample for link {}: tx {} rx {} at {}",
                    sample.link_id, sample.tx_bits, sample.rx_bits, sample.timestamp
                );
                self.forwarder.forward(&sample);
            }
            None => {
                self.metrics.samples_dropped.increment();
            }
        }

        UpcallResult::Consumed
    }

    /// Finish outstanding forwards; called at shutdown.
    pub async fn drain(&mut self) {
        self.forwarder.drain().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::ForwarderOptions;
    use std::io::Cursor;

    fn dispatcher(metrics: Arc<CollectorMetrics>) -> InterestDispatcher {
        let table = Arc::new(LinkTable::load(Cursor::new("3 10.0.0.1 10.0.0.2\n"), 1).unwrap());
        let forwarder = Forwarder::new(
            ForwarderOptions {
                // Nothing listens here; dispatch failures are fine for these
                // tests, which only look at routing decisions.
                endpoint: "127.0.0.1:9".to_string(),
                ..Default::default()
            },
            Arc::clone(&metrics),
        )
        .unwrap();
        InterestDispatcher::new(table, forwarder, metrics)
    }

    fn interest_upcall(name: &str) -> Upcall {
        Upcall {
            kind: UpcallKind::Interest,
            name: Name::from_string(name),
        }
    }

    #[tokio::test]
    async fn non_interest_upcalls_are_ignored() {
        let metrics = Arc::new(CollectorMetrics::new());
        let mut dispatcher = dispatcher(Arc::clone(&metrics));

        let upcall = Upcall {
            kind: UpcallKind::Data,
            name: Name::new(),
        };
        assert_eq!(dispatcher.handle(&upcall), UpcallResult::Ignored);
        assert_eq!(metrics.interests_received.value(), 0);
    }

    #[tokio::test]
    async fn non_monitoring_names_are_rejected() {
        let metrics = Arc::new(CollectorMetrics::new());
        let mut dispatcher = dispatcher(Arc::clone(&metrics));

        let upcall = interest_upcall("/ndn/wustl.edu/ndnstatus/10.0.0.1/10.0.0.2/1000");
        assert_eq!(dispatcher.handle(&upcall), UpcallResult::Ignored);
        assert_eq!(metrics.interests_rejected.value(), 1);
        assert_eq!(metrics.forwards_dispatched.value(), 0);
    }

    #[tokio::test]
    async fn unknown_pairs_are_consumed_but_dropped() {
        let metrics = Arc::new(CollectorMetrics::new());
        let mut dispatcher = dispatcher(Arc::clone(&metrics));

        let upcall = interest_upcall("/ndn/wustl.edu/ndnstatus/10.0.0.9/10.0.0.2/1000/125/250");
        assert_eq!(dispatcher.handle(&upcall), UpcallResult::Consumed);
        assert_eq!(metrics.samples_dropped.value(), 1);
        assert_eq!(metrics.forwards_dispatched.value(), 0);
    }

    #[tokio::test]
    async fn known_pairs_start_exactly_one_forward() {
        let metrics = Arc::new(CollectorMetrics::new());
        let mut dispatcher = dispatcher(Arc::clone(&metrics));

        let upcall = interest_upcall("/ndn/wustl.edu/ndnstatus/10.0.0.1/10.0.0.2/1000/125/250");
        assert_eq!(dispatcher.handle(&upcall), UpcallResult::Consumed);
        assert_eq!(metrics.forwards_dispatched.value(), 1);
        dispatcher.drain().await;
    }
}
