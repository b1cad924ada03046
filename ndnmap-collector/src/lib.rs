//! Link-status collection for the ndnmap visualization service.
//!
//! Gateways on the testbed report per-link byte counters by expressing
//! specially named interests under the monitoring prefix:
//!
//! `/ndn/wustl.edu/ndnstatus/<source ip>/<dest ip>/<timestamp>/<tx bytes>/<rx bytes>`
//!
//! This crate decodes those names into link status records, resolves the
//! reporting link through the operator's link table, and relays one bandwidth
//! notification per valid report to the map server over HTTP. Interests are
//! only observed, never answered.

use std::time::Duration;

pub mod decode;
pub mod dispatch;
pub mod forward;
pub mod link_table;
pub mod translate;
pub mod transport;

pub use decode::{decode_status, LinkStatus};
pub use dispatch::InterestDispatcher;
pub use forward::{Forwarder, ForwarderOptions};
pub use link_table::{LinkEntry, LinkTable};
pub use translate::{translate, BandwidthSample};
pub use transport::{StatusTransport, UdpStatusTransport, Upcall, UpcallKind, UpcallResult};

/// Name prefix the testbed gateways publish status reports under.
pub const STATUS_PREFIX: &str = "/ndn/wustl.edu/ndnstatus";

/// Literal tag expected at component index 2 of every status name.
pub const STATUS_TAG: &str = "ndnstatus";

/// Default address of the map server consuming bandwidth notifications.
pub const DEFAULT_MAP_SERVER: &str = "128.252.153.27";

/// Default UDP port for the status face (RFC 8609 NDN port).
pub const NDN_UDP_PORT: u16 = 6363;

/// How long one transport poll waits before the host loop comes back around.
pub const POLL_WINDOW: Duration = Duration::from_millis(333);
