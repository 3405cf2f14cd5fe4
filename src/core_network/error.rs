// Erreurs du protocole de trames
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame of {len} bytes exceeds the {max} byte limit")]
    TooLarge { len: usize, max: usize },

    #[error("Connection closed by peer")]
    ConnectionClosed,
}

impl FrameError {
    /// Maps an I/O failure, turning an early EOF into `ConnectionClosed`.
    pub fn from_read(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => FrameError::ConnectionClosed,
            _ => FrameError::Io(e),
        }
    }
}
