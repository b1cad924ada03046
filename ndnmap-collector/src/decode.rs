//! Decoding of status-report names into link status records.
//!
//! All information a gateway reports travels in the interest name itself.
//! The five status fields are anchored at the tail of the name and extracted
//! backward (rx, tx, timestamp, dest, source), so components inserted between
//! the monitoring tag and the fields never shift them.

use log::{debug, warn};
use ndnmap_common::ndn::Name;

/// Index of the literal status tag within the name.
pub const STATUS_TAG_INDEX: usize = 2;

/// Smallest name that can carry a status report: the three monitoring-prefix
/// components plus the five trailing fields.
pub const MIN_STATUS_COMPONENTS: usize = 8;

/// Capacity bound on a single extracted field.
pub const MAX_FIELD_LEN: usize = 50;

/// A status report decoded from an interest name.
///
/// Field extraction is tolerant: a component that cannot be fetched, exceeds
/// the capacity bound, or is not text leaves its field at the default instead
/// of failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkStatus {
    pub source_addr: String,
    pub dest_addr: String,
    pub timestamp: String,
    pub tx_bytes: String,
    pub rx_bytes: String,
    pub tx_bits: u64,
    pub rx_bits: u64,
}

/// Decode a status report out of `name`, validating the literal `tag` at
/// [`STATUS_TAG_INDEX`].
///
/// Names that are too short or carry a different tag are not monitoring
/// traffic and yield `None`; the caller ignores them without further
/// processing.
pub fn decode_status(name: &Name, tag: &str) -> Option<LinkStatus> {
    if name.len() < MIN_STATUS_COMPONENTS {
        debug!("non-monitoring interest with {} components", name.len());
        return None;
    }

    match name.get(STATUS_TAG_INDEX) {
        Some(component)
            if component.len() < MAX_FIELD_LEN && component.as_bytes() == tag.as_bytes() => {}
        _ => {
            debug!("non-monitoring interest received: {}", name);
            return None;
        }
    }

    // Extraction runs strictly from the tail of the name backward.
    let mut endc = name.len() - 1;

    let rx_bytes = extract_field(name, endc, "rx");
    endc -= 1;
    let tx_bytes = extract_field(name, endc, "tx");
    endc -= 1;
    let timestamp = extract_field(name, endc, "timestamp");
    endc -= 1;
    let dest_addr = extract_field(name, endc, "dest addr");
    endc -= 1;
    let source_addr = extract_field(name, endc, "source addr");

    let tx_bits = parse_decimal(&tx_bytes).saturating_mul(8);
    let rx_bits = parse_decimal(&rx_bytes).saturating_mul(8);

    Some(LinkStatus {
        source_addr,
        dest_addr,
        timestamp,
        tx_bytes,
        rx_bytes,
        tx_bits,
        rx_bits,
    })
}

/// Fetch one field component as text, yielding an empty string when the
/// component is missing, over the capacity bound, or not UTF-8. The failure
/// stays local to this field.
fn extract_field(name: &Name, index: usize, label: &str) -> String {
    let component = match name.get(index) {
        Some(component) => component,
        None => {
            warn!("error getting {} component {} from name", label, index);
            return String::new();
        }
    };

    if component.len() >= MAX_FIELD_LEN {
        warn!(
            "{} component {} is {} bytes, over the {}-byte bound",
            label,
            index,
            component.len(),
            MAX_FIELD_LEN
        );
        return String::new();
    }

    match component.as_str() {
        Some(text) => text.to_string(),
        None => {
            warn!("{} component {} is not valid UTF-8", label, index);
            String::new()
        }
    }
}

/// Parse the leading decimal digits of `text`. Text that does not start with
/// a digit parses as 0, matching the permissive numeric semantics gateways
/// rely on.
fn parse_decimal(text: &str) -> u64 {
    let digits: &str = text
        .find(|c: char| !c.is_ascii_digit())
        .map_or(text, |end| &text[..end]);
    digits.parse().unwrap_or(0)
}
