//! Identifier types shared across the collector.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator-assigned identifier for a gateway-to-gateway link.
///
/// Link ids are small integers handed out in the link table file and serve as
/// the stable key the downstream visualization service charts bandwidth under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkId(pub u32);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
