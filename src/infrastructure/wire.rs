use crate::core::packet::{Category, IncomingPacket, OutgoingPacket};
use crate::domain::error::{LanComError, LanComResult};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Newline-delimited JSON envelope carrying one message between peers.
///
/// Every transmission is a single line: the serialized envelope followed
/// by `\n`. The category travels with the message so the receiver routes
/// without re-deriving it from the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEnvelope {
    pub category: Category,
    pub identifier: String,
    pub message: String,
}

impl WireEnvelope {
    /// Build the envelope for an outbound packet. The category is derived
    /// from the identifier on the sending side.
    pub fn for_outgoing(packet: &OutgoingPacket) -> Self {
        Self {
            category: Category::for_identifier(&packet.identifier),
            identifier: packet.identifier.clone(),
            message: packet.message.clone(),
        }
    }

    /// Serialize to one wire line, including the trailing newline.
    pub fn encode_line(&self) -> LanComResult<Vec<u8>> {
        let mut line = serde_json::to_vec(self).map_err(|e| LanComError::Envelope {
            message: format!("Failed to encode envelope: {}", e),
        })?;
        line.push(b'\n');
        Ok(line)
    }

    /// Parse one received line back into an envelope.
    pub fn decode_line(line: &str) -> LanComResult<Self> {
        serde_json::from_str(line.trim()).map_err(|e| LanComError::Envelope {
            message: format!("Malformed envelope: {}", e),
        })
    }

    /// Convert into the packet handed to the receive pipeline.
    pub fn into_incoming(self, source: Option<SocketAddr>) -> IncomingPacket {
        IncomingPacket::new(
            self.identifier,
            self.message,
            self.category,
            source.map(|addr| addr.to_string()),
        )
    }
}
