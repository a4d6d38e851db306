use crate::core::packet::OutgoingPacket;
use crate::domain::error::LanComResult;
use async_trait::async_trait;

/// Network delivery seam used by the send-queue worker.
///
/// The production implementation opens a TCP connection per packet; tests
/// substitute recording or failing implementations.
#[async_trait]
pub trait Transmitter: Send + Sync {
    /// Deliver one packet to its destination.
    async fn transmit(&self, packet: &OutgoingPacket) -> LanComResult<()>;
}
