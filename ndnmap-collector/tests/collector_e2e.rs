//! End-to-end tests: TLV status interests in one side, HTTP bandwidth
//! notifications out the other.

use ndnmap_collector::{
    Forwarder, ForwarderOptions, InterestDispatcher, LinkTable, StatusTransport,
    UdpStatusTransport, UpcallResult, STATUS_PREFIX,
};
use ndnmap_common::metrics::CollectorMetrics;
use ndnmap_common::ndn::{Interest, Name, NameComponent};
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::mpsc;

/// Minimal map-server stand-in: answers every request with 200 and reports
/// the request path.
async fn map_server_stub() -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            request.extend_from_slice(&chunk[..n]);
                            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                    }
                }

                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("").to_string();
                let _ = stream
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                    .await;
                let _ = tx.send(path);
            });
        }
    });

    (endpoint, rx)
}

struct Harness {
    transport: UdpStatusTransport,
    dispatcher: InterestDispatcher,
    metrics: Arc<CollectorMetrics>,
    gateway: UdpSocket,
    face_addr: SocketAddr,
}

/// Wire the whole pipeline up against a one-entry link table.
async fn harness(endpoint: String) -> Harness {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "3 10.0.0.1 10.0.0.2").unwrap();
    let table = LinkTable::load(
        std::io::BufReader::new(std::fs::File::open(file.path()).unwrap()),
        1,
    )
    .unwrap();
    let table = Arc::new(table);

    let metrics = Arc::new(CollectorMetrics::new());
    let forwarder = Forwarder::new(
        ForwarderOptions {
            endpoint,
            ..Default::default()
        },
        Arc::clone(&metrics),
    )
    .unwrap();

    let mut transport = UdpStatusTransport::bind("127.0.0.1:0").await.unwrap();
    let dispatcher = InterestDispatcher::new(table, forwarder, Arc::clone(&metrics));
    dispatcher.register_prefixes(&mut transport).unwrap();

    let face_addr = transport.local_addr().unwrap();
    let gateway = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    Harness {
        transport,
        dispatcher,
        metrics,
        gateway,
        face_addr,
    }
}

impl Harness {
    async fn send_interest(&self, name: Name) {
        let wire = Interest::new(name).to_wire().unwrap();
        self.gateway.send_to(&wire, self.face_addr).await.unwrap();
    }

    async fn pump_one(&mut self) -> Option<UpcallResult> {
        let upcall = self
            .transport
            .poll(Duration::from_secs(2))
            .await
            .unwrap()?;
        let result = self.dispatcher.handle(&upcall);
        self.transport.complete(&upcall, result);
        Some(result)
    }
}

#[tokio::test]
async fn known_link_report_is_forwarded() {
    let (endpoint, mut requests) = map_server_stub().await;
    let mut harness = harness(endpoint).await;

    harness
        .send_interest(Name::from_string(&format!(
            "{}/10.0.0.1/10.0.0.2/1000/125/250",
            STATUS_PREFIX
        )))
        .await;

    assert_eq!(harness.pump_one().await, Some(UpcallResult::Consumed));
    harness.dispatcher.drain().await;

    let path = tokio::time::timeout(Duration::from_secs(2), requests.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(path, "/bw/3/1000/1000/2000");
    assert_eq!(harness.metrics.forwards_dispatched.value(), 1);
}

#[tokio::test]
async fn unknown_source_is_dropped_without_forwarding() {
    let (endpoint, mut requests) = map_server_stub().await;
    let mut harness = harness(endpoint).await;

    // 10.0.0.9 -> 10.0.0.2 is in no link table entry, but its prefix must
    // still be observed for the interest to arrive; register it like an
    // operator with a stale table.
    harness
        .transport
        .register_prefix(Name::from_string(&format!(
            "{}/10.0.0.9/10.0.0.2",
            STATUS_PREFIX
        )))
        .unwrap();

    harness
        .send_interest(Name::from_string(&format!(
            "{}/10.0.0.9/10.0.0.2/1000/125/250",
            STATUS_PREFIX
        )))
        .await;

    assert_eq!(harness.pump_one().await, Some(UpcallResult::Consumed));
    harness.dispatcher.drain().await;

    assert_eq!(harness.metrics.samples_dropped.value(), 1);
    assert_eq!(harness.metrics.forwards_dispatched.value(), 0);
    assert!(requests.try_recv().is_err());
}

#[tokio::test]
async fn short_name_is_rejected_without_forwarding() {
    let (endpoint, mut requests) = map_server_stub().await;
    let mut harness = harness(endpoint).await;

    // Only three trailing fields; below the minimum component count.
    harness
        .send_interest(Name::from_string(&format!(
            "{}/10.0.0.1/10.0.0.2/1000",
            STATUS_PREFIX
        )))
        .await;

    assert_eq!(harness.pump_one().await, Some(UpcallResult::Ignored));
    harness.dispatcher.drain().await;

    assert_eq!(harness.metrics.interests_rejected.value(), 1);
    assert_eq!(harness.metrics.forwards_dispatched.value(), 0);
    assert!(requests.try_recv().is_err());
}

#[tokio::test]
async fn unreadable_tx_field_forwards_zero_bits() {
    let (endpoint, mut requests) = map_server_stub().await;
    let mut harness = harness(endpoint).await;

    // The tx component is over the field capacity bound, so only that field
    // defaults; the rest of the report survives.
    let mut name = Name::from_string(&format!("{}/10.0.0.1/10.0.0.2/1000", STATUS_PREFIX));
    name.push(NameComponent::new(vec![b'9'; 64]));
    name.push(NameComponent::new(&b"250"[..]));
    harness.send_interest(name).await;

    assert_eq!(harness.pump_one().await, Some(UpcallResult::Consumed));
    harness.dispatcher.drain().await;

    let path = tokio::time::timeout(Duration::from_secs(2), requests.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(path, "/bw/3/1000/0/2000");
}

#[tokio::test]
async fn map_server_errors_are_ignored() {
    // A map server that always fails; the collector must neither retry nor
    // surface an error.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut chunk = [0u8; 1024];
            let _ = stream.read(&mut chunk).await;
            let _ = stream
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\n\r\n")
                .await;
        }
    });

    let mut harness = harness(endpoint).await;
    harness
        .send_interest(Name::from_string(&format!(
            "{}/10.0.0.1/10.0.0.2/1000/125/250",
            STATUS_PREFIX
        )))
        .await;

    assert_eq!(harness.pump_one().await, Some(UpcallResult::Consumed));
    harness.dispatcher.drain().await;

    // The dispatch completed; an HTTP-level failure is not a forward failure.
    assert_eq!(harness.metrics.forwards_dispatched.value(), 1);
    assert_eq!(harness.metrics.forwards_failed.value(), 0);
}
