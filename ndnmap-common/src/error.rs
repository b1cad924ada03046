//! Error types for the ndnmap collector.

use thiserror::Error;

/// All possible errors that can occur within the collector.
#[derive(Error, Debug)]
pub enum Error {
    /// Error related to TLV encoding/decoding.
    #[error("TLV error: {0}")]
    Tlv(String),

    /// Error related to NDN packet processing.
    #[error("NDN packet error: {0}")]
    NdnPacket(String),

    /// Error related to the link table.
    #[error("link table error: {0}")]
    LinkTable(String),

    /// Error related to the status transport.
    #[error("transport error: {0}")]
    Transport(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
