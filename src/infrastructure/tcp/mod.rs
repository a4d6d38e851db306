// TCP module - Socket listener and packet delivery
pub mod listener;
pub mod transmitter;

pub use listener::SocketListener;
pub use transmitter::TcpTransmitter;
