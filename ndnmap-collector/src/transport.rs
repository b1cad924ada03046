//! The status transport: how interest upcalls reach the dispatcher.
//!
//! The collector is transport-agnostic; anything that can register name
//! prefixes and deliver upcalls implements [`StatusTransport`]. The in-tree
//! implementation is an NDN-over-UDP face: gateways ship each TLV-encoded
//! status interest as a single datagram to the NDN port.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, trace};
use ndnmap_common::ndn::{Interest, Name};
use ndnmap_common::tlv::{self, TlvElement};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};

/// Largest datagram the status face will accept (RFC 8609 packet bound).
pub const MAX_DATAGRAM_SIZE: usize = 8800;

/// What kind of packet an upcall carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpcallKind {
    /// An interest matching one of the registered prefixes.
    Interest,
    /// A data packet; the collector never consumes these.
    Data,
    /// Any other packet type, identified by its TLV type octet.
    Other(u8),
}

/// One event delivered by the transport.
#[derive(Debug, Clone)]
pub struct Upcall {
    pub kind: UpcallKind,
    pub name: Name,
}

/// The handler's verdict on an upcall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpcallResult {
    /// The interest was fully handled; no reply will ever be produced.
    Consumed,
    /// The event was not for us.
    Ignored,
}

/// Contract between the collector and the underlying named-data transport.
#[async_trait]
pub trait StatusTransport {
    /// Ask the transport to deliver interests arriving under `prefix`.
    fn register_prefix(&mut self, prefix: Name) -> Result<()>;

    /// Wait up to `window` for the next upcall. `None` means the window
    /// elapsed quietly.
    async fn poll(&mut self, window: Duration) -> Result<Option<Upcall>>;

    /// Tell the transport what became of a delivered upcall, suppressing any
    /// default reply.
    fn complete(&mut self, upcall: &Upcall, result: UpcallResult);
}

/// NDN-over-UDP face for status interests.
///
/// Interests whose name falls under no registered prefix are dropped before
/// they reach the dispatcher, as are datagrams that do not decode.
pub struct UdpStatusTransport {
    socket: UdpSocket,
    prefixes: Vec<Name>,
    buf: Vec<u8>,
}

impl UdpStatusTransport {
    /// Bind the face to `addr`.
    pub async fn bind(addr: &str) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .with_context(|| format!("binding status face to {}", addr))?;

        Ok(Self {
            socket,
            prefixes: Vec::new(),
            buf: vec![0; MAX_DATAGRAM_SIZE],
        })
    }

    /// Address the face is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().context("status face local address")
    }

    /// Decode one datagram into an upcall, filtering interests through the
    /// registered prefixes.
    fn upcall_from_datagram(&self, datagram: &[u8], peer: SocketAddr) -> Option<Upcall> {
        let mut buf = Bytes::copy_from_slice(datagram);
        let element = match TlvElement::decode(&mut buf) {
            Ok(element) => element,
            Err(err) => {
                debug!("undecodable datagram from {}: {}", peer, err);
                return None;
            }
        };

        match element.tlv_type {
            tlv::TLV_INTEREST => {
                let interest = match Interest::from_element(&element) {
                    Ok(interest) => interest,
                    Err(err) => {
                        debug!("malformed interest from {}: {}", peer, err);
                        return None;
                    }
                };

                if !self.prefixes.iter().any(|p| p.is_prefix_of(&interest.name)) {
                    trace!("interest {} matches no registered prefix", interest.name);
                    return None;
                }

                Some(Upcall {
                    kind: UpcallKind::Interest,
                    name: interest.name,
                })
            }
            tlv::TLV_DATA => Some(Upcall {
                kind: UpcallKind::Data,
                name: Name::new(),
            }),
            other => Some(Upcall {
                kind: UpcallKind::Other(other),
                name: Name::new(),
            }),
        }
    }
}

#[async_trait]
impl StatusTransport for UdpStatusTransport {
    fn register_prefix(&mut self, prefix: Name) -> Result<()> {
        debug!("registering interest filter {}", prefix);
        self.prefixes.push(prefix);
        Ok(())
    }

    async fn poll(&mut self, window: Duration) -> Result<Option<Upcall>> {
        let deadline = Instant::now() + window;

        loop {
            let (len, peer) = match timeout_at(deadline, self.socket.recv_from(&mut self.buf)).await
            {
                Ok(received) => received.context("receiving on status face")?,
                Err(_) => return Ok(None),
            };

            if let Some(upcall) = self.upcall_from_datagram(&self.buf[..len], peer) {
                return Ok(Some(upcall));
            }
        }
    }

    fn complete(&mut self, upcall: &Upcall, result: UpcallResult) {
        // Observer face: consumed interests are simply never answered.
        trace!("upcall for {} -> {:?}", upcall.name, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn bound_transport(prefix: &str) -> (UdpStatusTransport, UdpSocket, SocketAddr) {
        let mut transport = UdpStatusTransport::bind("127.0.0.1:0").await.unwrap();
        transport.register_prefix(Name::from_string(prefix)).unwrap();
        let addr = transport.local_addr().unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        (transport, sender, addr)
    }

    #[tokio::test]
    async fn delivers_matching_interests() {
        let (mut transport, sender, addr) = bound_transport("/ndn/wustl.edu/ndnstatus").await;

        let name = Name::from_string("/ndn/wustl.edu/ndnstatus/10.0.0.1/10.0.0.2/1000/125/250");
        let wire = Interest::new(name.clone()).to_wire().unwrap();
        sender.send_to(&wire, addr).await.unwrap();

        let upcall = transport
            .poll(Duration::from_secs(2))
            .await
            .unwrap()
            .expect("interest upcall");
        assert_eq!(upcall.kind, UpcallKind::Interest);
        assert_eq!(upcall.name, name);
    }

    #[tokio::test]
    async fn filters_unregistered_prefixes() {
        let (mut transport, sender, addr) = bound_transport("/ndn/wustl.edu/ndnstatus").await;

        let wire = Interest::new(Name::from_string("/some/other/name"))
            .to_wire()
            .unwrap();
        sender.send_to(&wire, addr).await.unwrap();

        let upcall = transport.poll(Duration::from_millis(200)).await.unwrap();
        assert!(upcall.is_none());
    }

    #[tokio::test]
    async fn garbage_datagrams_are_dropped() {
        let (mut transport, sender, addr) = bound_transport("/ndn/wustl.edu/ndnstatus").await;

        // Interest frame whose declared length overruns the datagram.
        sender.send_to(&[tlv::TLV_INTEREST, 0x0a, 0x01], addr).await.unwrap();

        let upcall = transport.poll(Duration::from_millis(200)).await.unwrap();
        assert!(upcall.is_none());
    }

    #[tokio::test]
    async fn non_interest_frames_surface_as_upcalls() {
        let (mut transport, sender, addr) = bound_transport("/ndn/wustl.edu/ndnstatus").await;

        let mut frame = bytes::BytesMut::new();
        TlvElement::new(tlv::TLV_DATA, Bytes::new()).encode(&mut frame);
        sender.send_to(&frame, addr).await.unwrap();

        let upcall = transport
            .poll(Duration::from_secs(2))
            .await
            .unwrap()
            .expect("data upcall");
        assert_eq!(upcall.kind, UpcallKind::Data);
    }

    #[tokio::test]
    async fn quiet_window_returns_none() {
        let (mut transport, _sender, _addr) = bound_transport("/ndn/wustl.edu/ndnstatus").await;

        let upcall = transport.poll(Duration::from_millis(50)).await.unwrap();
        assert!(upcall.is_none());
    }
}
