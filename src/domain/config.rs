use serde::{Deserialize, Serialize};

/// Communicator configuration: the listening endpoint plus transport tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunicatorConfig {
    /// Port the socket listener binds to
    pub port: u16,
    /// Interface the socket listener binds to
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    /// Timeout for outbound connection attempts in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

// Default value functions
fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_connect_timeout() -> u64 {
    3000
}

fn default_port() -> u16 {
    9300
}

impl CommunicatorConfig {
    /// Configuration listening on the given port, with defaults elsewhere.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            bind_host: default_bind_host(),
            connect_timeout_ms: default_connect_timeout(),
        }
    }

    /// Address string the socket listener binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for CommunicatorConfig {
    fn default() -> Self {
        Self::new(default_port())
    }
}
