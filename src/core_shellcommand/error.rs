// Erreurs du sous-protocole de transfert de fichiers
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    #[error("invalid header")]
    InvalidHeader,

    #[error("invalid size")]
    InvalidSize,

    #[error("allocation failed")]
    AllocationFailed,

    #[error("connection lost while receiving file")]
    ConnectionLost,

    #[error("cannot create destination file")]
    CannotCreate,

    #[error("cannot open file")]
    CannotOpen,

    #[error("write error")]
    WriteError,

    #[error("read error")]
    ReadError,
}

impl TransferError {
    pub fn to_upload_reply(&self) -> String {
        let reason = match self {
            TransferError::InvalidHeader => "invalid header.",
            TransferError::InvalidSize => "invalid size.",
            TransferError::AllocationFailed => "allocation failed.",
            TransferError::ConnectionLost => "connection lost while receiving file.",
            TransferError::CannotCreate | TransferError::CannotOpen => "cannot open remote file.",
            TransferError::WriteError => "write error.",
            TransferError::ReadError => "read error.",
        };
        format!("UPLOAD_ERROR: {}\n", reason)
    }

    pub fn to_download_reply(&self) -> String {
        let reason = match self {
            TransferError::InvalidHeader => "invalid header.",
            TransferError::InvalidSize => "invalid file size.",
            TransferError::AllocationFailed => "allocation failed.",
            TransferError::CannotCreate | TransferError::CannotOpen => "cannot open file.",
            TransferError::ConnectionLost | TransferError::ReadError => "read error.",
            TransferError::WriteError => "write error.",
        };
        format!("DOWNLOAD_ERR: {}\n", reason)
    }

    /// Upload failures after which the byte stream can no longer be trusted.
    pub fn ends_upload_session(&self) -> bool {
        matches!(
            self,
            TransferError::InvalidHeader
                | TransferError::InvalidSize
                | TransferError::AllocationFailed
                | TransferError::ConnectionLost
        )
    }
}
