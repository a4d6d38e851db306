// Core module - Message pipeline and dispatch
pub mod communicator;
pub mod packet;
pub mod queue;
pub mod registry;
pub mod stats;
pub mod transport;
pub mod worker;

pub use communicator::{LanCommunicator, LifecycleState};
pub use packet::{Category, IncomingPacket, OutgoingPacket};
pub use queue::{Dequeued, QueueConsumer, QueueProducer};
pub use registry::{HandlerRegistry, NotificationHandler};
pub use stats::CommunicatorStats;
pub use transport::Transmitter;
