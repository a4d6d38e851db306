use crate::core::packet::OutgoingPacket;
use crate::core::transport::Transmitter;
use crate::domain::error::{LanComError, LanComResult};
use crate::infrastructure::wire::WireEnvelope;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

/// Delivers packets over short-lived TCP connections: one connection per
/// packet, closed after the line is written.
pub struct TcpTransmitter {
    connect_timeout: Duration,
}

impl TcpTransmitter {
    pub fn new(connect_timeout_ms: u64) -> Self {
        Self {
            connect_timeout: Duration::from_millis(connect_timeout_ms),
        }
    }
}

#[async_trait]
impl Transmitter for TcpTransmitter {
    async fn transmit(&self, packet: &OutgoingPacket) -> LanComResult<()> {
        let line = WireEnvelope::for_outgoing(packet).encode_line()?;

        // Connect with timeout
        let mut stream = tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect(packet.destination.as_str()),
        )
        .await
        .map_err(|_| LanComError::Timeout)??;

        stream.write_all(&line).await?;
        stream.flush().await?;
        stream.shutdown().await?;

        debug!("Sent {} bytes to {}", line.len(), packet.destination);
        Ok(())
    }
}
