//! Common types for the ndnmap link-status collector.
//!
//! This crate provides the NDN name and Interest packet model, the simplified
//! TLV codec those packets travel in, and the error and metric types shared
//! by the collector daemon and its tests.

pub mod error;
pub mod metrics;
pub mod ndn;
pub mod tlv;
pub mod types;

/// Reexport of common types
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
