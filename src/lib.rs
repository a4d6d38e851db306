//! LanCom Library
//!
//! LAN-local asynchronous message bus. One communicator per process sends
//! newline-delimited JSON envelopes to peers and dispatches inbound
//! messages to subscribed handlers, routed by category.

pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::communicator::{LanCommunicator, LifecycleState};
pub use crate::core::packet::{Category, IncomingPacket, OutgoingPacket};
pub use crate::core::registry::{HandlerRegistry, NotificationHandler};
pub use crate::core::stats::CommunicatorStats;
pub use crate::core::transport::Transmitter;
pub use crate::domain::config::CommunicatorConfig;
pub use crate::domain::error::{LanComError, LanComResult};
pub use crate::infrastructure::logging::init_logging;
pub use crate::infrastructure::wire::WireEnvelope;
