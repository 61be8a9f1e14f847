#![doc = include_str!("../README.md")]
// #![warn(missing_docs)]

pub mod buffer;
pub mod device;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod observer;
#[cfg(feature = "sane")]
pub mod sane;
pub mod scan;
pub mod sim;

pub use buffer::{ImageBuffer, PixelGrid};
pub use device::{ColorFormat, Device, FrameParameters, Status};
pub use encoder::write_pnm;
pub use error::ScanError;
pub use observer::{Completion, ImageCollector, Notifier, Observer, Region};
pub use scan::{CancelHandle, Phase, ScanConfig, ScanReport, ScanSession};
