use serde::{Deserialize, Serialize};

/// Coarse routing class deciding which inbound queue and worker handle a
/// packet. Carried explicitly in the wire envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Processing,
    Content,
}

impl Category {
    /// Category tag written into the envelope for an outgoing identifier.
    /// The content module owns the "content" identifier; every other
    /// identifier routes through the processing pipeline.
    pub fn for_identifier(identifier: &str) -> Self {
        match identifier {
            "content" => Category::Content,
            _ => Category::Processing,
        }
    }

    /// Lowercase name, matching the wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Processing => "processing",
            Category::Content => "content",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message awaiting network transmission. Created once per `send()` call
/// and consumed exactly once by the send-queue worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingPacket {
    /// Destination peer as `host:port`
    pub destination: String,
    /// Message payload handed to the remote handler
    pub message: String,
    /// Module identifier selecting the remote handler
    pub identifier: String,
}

impl OutgoingPacket {
    pub fn new(destination: String, message: String, identifier: String) -> Self {
        Self {
            destination,
            message,
            identifier,
        }
    }
}

/// A decoded inbound message. Created by the socket listener and consumed
/// exactly once by the receive-queue worker of its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingPacket {
    /// Module identifier selecting the local handler
    pub identifier: String,
    /// Message payload
    pub message: String,
    /// Routing category carried by the wire envelope
    pub category: Category,
    /// Peer address the transmission arrived from, when known
    pub source_address: Option<String>,
}

impl IncomingPacket {
    pub fn new(
        identifier: String,
        message: String,
        category: Category,
        source_address: Option<String>,
    ) -> Self {
        Self {
            identifier,
            message,
            category,
            source_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_for_identifier() {
        assert_eq!(Category::for_identifier("content"), Category::Content);
        assert_eq!(Category::for_identifier("processor"), Category::Processing);
        assert_eq!(Category::for_identifier("telemetry"), Category::Processing);
        assert_eq!(Category::for_identifier(""), Category::Processing);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::Processing.to_string(), "processing");
        assert_eq!(Category::Content.to_string(), "content");
    }

    #[test]
    fn test_category_wire_tag() {
        assert_eq!(
            serde_json::to_string(&Category::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::from_str::<Category>("\"content\"").unwrap(),
            Category::Content
        );
        assert!(serde_json::from_str::<Category>("\"video\"").is_err());
    }

    #[test]
    fn test_outgoing_packet_creation() {
        let packet = OutgoingPacket::new(
            "10.0.0.5:9000".to_string(),
            "ping".to_string(),
            "processor".to_string(),
        );

        assert_eq!(packet.destination, "10.0.0.5:9000");
        assert_eq!(packet.message, "ping");
        assert_eq!(packet.identifier, "processor");
    }

    #[test]
    fn test_incoming_packet_creation() {
        let packet = IncomingPacket::new(
            "content".to_string(),
            "hello".to_string(),
            Category::Content,
            Some("10.0.0.7:41234".to_string()),
        );

        assert_eq!(packet.identifier, "content");
        assert_eq!(packet.message, "hello");
        assert_eq!(packet.category, Category::Content);
        assert_eq!(packet.source_address.as_deref(), Some("10.0.0.7:41234"));
    }
}
