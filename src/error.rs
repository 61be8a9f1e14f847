use std::io;

use thiserror::Error;

use crate::device::Status;

/// Errors that end a scan session.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("start failed with status: {0}")]
    DeviceStartFailed(Status),
    #[error("get parameters failed with status: {0}")]
    DeviceParamsFailed(Status),
    #[error("read failed with status: {0}")]
    DeviceReadFailed(Status),
    #[error("writing the image failed")]
    EncodeIOFailed(#[from] io::Error),
}
impl ScanError {
    /// The device status that caused the error, if it came from the device.
    pub fn status(&self) -> Option<Status> {
        match self {
            ScanError::DeviceStartFailed(status)
            | ScanError::DeviceParamsFailed(status)
            | ScanError::DeviceReadFailed(status) => Some(*status),
            ScanError::EncodeIOFailed(_) => None,
        }
    }
}
