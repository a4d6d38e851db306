// Infrastructure module - Network adapters and logging
pub mod logging;
pub mod tcp;
pub mod wire;

pub use wire::WireEnvelope;
