use thiserror::Error;

/// LanCom unified error type
#[derive(Error, Debug)]
pub enum LanComError {
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("Communication timeout")]
    Timeout,

    #[error("Wire envelope error: {message}")]
    Envelope { message: String },

    #[error("Handler error: {message}")]
    Handler { message: String },
}

pub type LanComResult<T> = Result<T, LanComError>;
