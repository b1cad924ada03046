//! Promotion of decoded status records into bandwidth samples.

use crate::decode::LinkStatus;
use crate::link_table::LinkTable;
use log::debug;
use ndnmap_common::types::LinkId;

/// A normalized bandwidth sample, ready to be relayed to the map server.
///
/// Exists only for the duration of the forwarding call; samples are never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandwidthSample {
    pub link_id: LinkId,
    pub timestamp: String,
    pub tx_bits: u64,
    pub rx_bits: u64,
}

/// Resolve `status` against the link table.
///
/// Reports from address pairs the operator has not mapped are dropped here
/// and never forwarded; the drop is not an error.
pub fn translate(status: &LinkStatus, table: &LinkTable) -> Option<BandwidthSample> {
    let link_id = match table.lookup(&status.source_addr, &status.dest_addr) {
        Some(id) => id,
        None => {
            debug!(
                "no link id for {} -> {}, dropping sample",
                status.source_addr, status.dest_addr
            );
            return None;
        }
    };

    Some(BandwidthSample {
        link_id,
        timestamp: status.timestamp.clone(),
        tx_bits: status.tx_bits,
        rx_bits: status.rx_bits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn table() -> LinkTable {
        LinkTable::load(Cursor::new("3 10.0.0.1 10.0.0.2\n"), 1).unwrap()
    }

    fn status(source: &str, dest: &str) -> LinkStatus {
        LinkStatus {
            source_addr: source.to_string(),
            dest_addr: dest.to_string(),
            timestamp: "1000".to_string(),
            tx_bytes: "125".to_string(),
            rx_bytes: "250".to_string(),
            tx_bits: 1000,
            rx_bits: 2000,
        }
    }

    #[test]
    fn known_pair_becomes_a_sample() {
        let sample = translate(&status("10.0.0.1", "10.0.0.2"), &table()).unwrap();

        assert_eq!(sample.link_id, LinkId(3));
        assert_eq!(sample.timestamp, "1000");
        assert_eq!(sample.tx_bits, 1000);
        assert_eq!(sample.rx_bits, 2000);
    }

    #[test]
    fn unknown_pair_is_dropped() {
        assert_eq!(translate(&status("10.0.0.9", "10.0.0.2"), &table()), None);
    }
}
