use crate::core::packet::{Category, IncomingPacket};
use crate::core::queue::QueueProducer;
use crate::core::stats::PipelineCounters;
use crate::domain::error::LanComResult;
use crate::infrastructure::wire::WireEnvelope;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Accepts inbound connections and feeds decoded packets into the two
/// receive queues. Each connection gets its own reader task; lines are
/// routed by the category carried in the envelope.
pub struct SocketListener {
    listener: TcpListener,
    local_addr: SocketAddr,
    processing: QueueProducer<IncomingPacket>,
    content: QueueProducer<IncomingPacket>,
    shutdown: watch::Receiver<bool>,
    counters: Arc<PipelineCounters>,
}

impl SocketListener {
    pub async fn bind(
        addr: &str,
        processing: QueueProducer<IncomingPacket>,
        content: QueueProducer<IncomingPacket>,
        shutdown: watch::Receiver<bool>,
        counters: Arc<PipelineCounters>,
    ) -> LanComResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        info!("Socket listener bound to {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            processing,
            content,
            shutdown,
            counters,
        })
    }

    /// Address the listener actually bound to. Resolves port 0 requests.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, peer)) => {
                            debug!("Accepted connection from {}", peer);
                            tokio::spawn(Self::read_connection(
                                stream,
                                peer,
                                self.processing.clone(),
                                self.content.clone(),
                                self.shutdown.clone(),
                                Arc::clone(&self.counters),
                            ));
                        }
                        Err(e) => {
                            warn!("Failed to accept connection: {}", e);
                        }
                    }
                }

                _ = self.shutdown.changed() => {
                    break;
                }
            }
        }

        debug!("Socket listener stopped");
    }

    async fn read_connection(
        stream: TcpStream,
        peer: SocketAddr,
        processing: QueueProducer<IncomingPacket>,
        content: QueueProducer<IncomingPacket>,
        mut shutdown: watch::Receiver<bool>,
        counters: Arc<PipelineCounters>,
    ) {
        let mut lines = BufReader::new(stream).lines();

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                line = lines.next_line() => {
                    match line {
                        Ok(Some(line)) => {
                            if line.trim().is_empty() {
                                continue;
                            }
                            Self::route_line(&line, peer, &processing, &content, &counters);
                        }
                        Ok(None) => {
                            debug!("Connection from {} closed", peer);
                            break;
                        }
                        Err(e) => {
                            counters.record_decode_failure();
                            warn!("Read error from {}: {}", peer, e);
                            break;
                        }
                    }
                }

                _ = shutdown.changed() => {
                    break;
                }
            }
        }
    }

    fn route_line(
        line: &str,
        peer: SocketAddr,
        processing: &QueueProducer<IncomingPacket>,
        content: &QueueProducer<IncomingPacket>,
        counters: &PipelineCounters,
    ) {
        let envelope = match WireEnvelope::decode_line(line) {
            Ok(envelope) => envelope,
            Err(e) => {
                counters.record_decode_failure();
                warn!("Discarding malformed transmission from {}: {}", peer, e);
                return;
            }
        };

        counters.record_envelope_received();

        let category = envelope.category;
        let packet = envelope.into_incoming(Some(peer));
        let queue = match category {
            Category::Processing => processing,
            Category::Content => content,
        };

        if !queue.enqueue(packet) {
            debug!("{} queue closed, dropping packet from {}", category, peer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::queue::{self, Dequeued, QueueConsumer};
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::task::JoinHandle;

    struct ListenerFixture {
        addr: SocketAddr,
        processing: QueueConsumer<IncomingPacket>,
        content: QueueConsumer<IncomingPacket>,
        stop: watch::Sender<bool>,
        counters: Arc<PipelineCounters>,
        handle: JoinHandle<()>,
    }

    async fn start_listener() -> ListenerFixture {
        let (stop, signal) = watch::channel(false);
        let (processing_tx, processing_rx) = queue::unbounded(signal.clone());
        let (content_tx, content_rx) = queue::unbounded(signal.clone());
        let counters = Arc::new(PipelineCounters::new());

        let listener = SocketListener::bind(
            "127.0.0.1:0",
            processing_tx,
            content_tx,
            signal,
            Arc::clone(&counters),
        )
        .await
        .unwrap();

        let addr = listener.local_addr();
        let handle = tokio::spawn(listener.run());

        ListenerFixture {
            addr,
            processing: processing_rx,
            content: content_rx,
            stop,
            counters,
            handle,
        }
    }

    async fn next_packet(consumer: &mut QueueConsumer<IncomingPacket>) -> IncomingPacket {
        match tokio::time::timeout(Duration::from_secs(2), consumer.dequeue())
            .await
            .unwrap()
        {
            Dequeued::Item(packet) => packet,
            Dequeued::Stopped => panic!("queue stopped before a packet arrived"),
        }
    }

    #[tokio::test]
    async fn test_bind_resolves_port_zero() {
        let fixture = start_listener().await;
        assert_ne!(fixture.addr.port(), 0);

        fixture.stop.send(true).unwrap();
        fixture.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_fails_on_taken_port() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = occupied.local_addr().unwrap();

        let (_stop, signal) = watch::channel(false);
        let (processing_tx, _processing_rx) = queue::unbounded(signal.clone());
        let (content_tx, _content_rx) = queue::unbounded(signal.clone());

        let result = SocketListener::bind(
            &addr.to_string(),
            processing_tx,
            content_tx,
            signal,
            Arc::new(PipelineCounters::new()),
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_routes_by_envelope_category() {
        let mut fixture = start_listener().await;

        let mut client = TcpStream::connect(fixture.addr).await.unwrap();
        client
            .write_all(
                b"{\"category\":\"content\",\"identifier\":\"content\",\"message\":\"page\"}\n\
                  {\"category\":\"processing\",\"identifier\":\"processor\",\"message\":\"work\"}\n",
            )
            .await
            .unwrap();
        client.flush().await.unwrap();

        let packet = next_packet(&mut fixture.content).await;
        assert_eq!(packet.identifier, "content");
        assert_eq!(packet.message, "page");
        assert_eq!(packet.category, Category::Content);
        assert!(packet.source_address.is_some());

        let packet = next_packet(&mut fixture.processing).await;
        assert_eq!(packet.identifier, "processor");
        assert_eq!(packet.message, "work");
        assert_eq!(packet.category, Category::Processing);

        assert_eq!(fixture.counters.snapshot().envelopes_received, 2);

        fixture.stop.send(true).unwrap();
        fixture.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_line_is_discarded() {
        let mut fixture = start_listener().await;

        let mut client = TcpStream::connect(fixture.addr).await.unwrap();
        client.write_all(b"garbage that is not json\n").await.unwrap();
        client
            .write_all(b"{\"category\":\"processing\",\"identifier\":\"processor\",\"message\":\"ok\"}\n")
            .await
            .unwrap();
        client.flush().await.unwrap();

        // The valid line after the malformed one still arrives.
        let packet = next_packet(&mut fixture.processing).await;
        assert_eq!(packet.message, "ok");

        let stats = fixture.counters.snapshot();
        assert_eq!(stats.decode_failures, 1);
        assert_eq!(stats.envelopes_received, 1);

        fixture.stop.send(true).unwrap();
        fixture.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_lines_keep_arrival_order() {
        let mut fixture = start_listener().await;

        let mut client = TcpStream::connect(fixture.addr).await.unwrap();
        for i in 0..5 {
            let line = format!(
                "{{\"category\":\"processing\",\"identifier\":\"processor\",\"message\":\"m{}\"}}\n",
                i
            );
            client.write_all(line.as_bytes()).await.unwrap();
        }
        client.flush().await.unwrap();

        for i in 0..5 {
            let packet = next_packet(&mut fixture.processing).await;
            assert_eq!(packet.message, format!("m{}", i));
        }

        fixture.stop.send(true).unwrap();
        fixture.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_multiple_connections_deliver() {
        let mut fixture = start_listener().await;

        for i in 0..3 {
            let mut client = TcpStream::connect(fixture.addr).await.unwrap();
            let line = format!(
                "{{\"category\":\"content\",\"identifier\":\"content\",\"message\":\"c{}\"}}\n",
                i
            );
            client.write_all(line.as_bytes()).await.unwrap();
            client.flush().await.unwrap();
        }

        let mut messages = Vec::new();
        for _ in 0..3 {
            messages.push(next_packet(&mut fixture.content).await.message);
        }
        messages.sort();
        assert_eq!(messages, vec!["c0", "c1", "c2"]);

        fixture.stop.send(true).unwrap();
        fixture.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_listener() {
        let fixture = start_listener().await;

        fixture.stop.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), fixture.handle)
            .await
            .unwrap()
            .unwrap();
    }
}
