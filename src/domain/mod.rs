// Domain module - Core value types and errors
pub mod config;
pub mod error;

pub use config::CommunicatorConfig;
pub use error::{LanComError, LanComResult};
