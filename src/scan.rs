//! The acquisition loop: drives a [`Device`] frame by frame and reconstructs the image.

use std::io::Write;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use log::{debug, error, info, warn};

use crate::buffer::{ImageBuffer, STRIP_HEIGHT};
use crate::device::{ColorFormat, Device, FrameParameters, Status};
use crate::encoder::write_pnm;
use crate::error::ScanError;
use crate::frame::FrameDecoder;
use crate::observer::{Completion, Notifier, Observer, Region};

/// Bytes requested from the device per read.
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Tuning of a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Size of the read buffer, at least one byte.
    pub chunk_size: usize,
    /// Rows the image grows by when it fills up, at least one.
    pub strip_height: usize,
}
impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            strip_height: STRIP_HEIGHT,
        }
    }
}

/// The state a session last entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FrameStart,
    FrameParams,
    FrameRead,
    FrameEnd,
    Complete,
    Error,
}

/// Requests cancellation of a running scan, e.g. from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    requested: Arc<AtomicBool>,
}
impl CancelHandle {
    pub fn cancel(&self) {
        self.requested.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::Relaxed)
    }

    fn take(&self) -> bool {
        self.requested.swap(false, Ordering::Relaxed)
    }
}

/// Geometry of a finished scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    pub width: usize,
    pub height: usize,
    /// Format of the frame that completed the scan.
    pub format: ColorFormat,
    pub frames: usize,
}

struct Acquired {
    image: ImageBuffer,
    rows: usize,
    format: ColorFormat,
    frames: usize,
}

/**
Binds a device, its observers and an optional output sink for scanning.

Each call to [`scan`](ScanSession::scan) runs one acquisition: frames are started and read until the device reports the last one, decoded into a pixel grid that observers are kept up to date with, and finally written to the output sink if one was set. Observers receive exactly one completion per scan.
*/
pub struct ScanSession<D: Device> {
    device: D,
    notifier: Notifier,
    config: ScanConfig,
    output: Option<Box<dyn Write + Send>>,
    cancel: CancelHandle,
    phase: Phase,
}
impl<D: Device> ScanSession<D> {
    pub fn new(device: D) -> Self {
        Self::with_config(device, ScanConfig::default())
    }

    pub fn with_config(device: D, config: ScanConfig) -> Self {
        Self {
            device,
            notifier: Notifier::new(),
            config,
            output: None,
            cancel: CancelHandle::default(),
            phase: Phase::Idle,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// A handle to the observer set, usable while a scan is running.
    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }

    pub fn add_observer(&self, observer: Arc<dyn Observer>) -> bool {
        self.notifier.add(observer)
    }

    pub fn remove_observer(&self, observer: &Arc<dyn Observer>) -> bool {
        self.notifier.remove(observer)
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Sets where the next scan is written to. The sink is dropped after that scan.
    pub fn set_output(&mut self, out: impl Write + Send + 'static) {
        self.output = Some(Box::new(out));
    }

    /// Adds `observer` and scans.
    pub fn scan_with(&mut self, observer: Arc<dyn Observer>) -> Result<ScanReport, ScanError> {
        self.add_observer(observer);
        self.scan()
    }

    /**
    Runs one acquisition.

    Device failures end the scan with the matching [`ScanError`] after observers got [`Completion::Error`]. If only writing the output fails, observers have already received [`Completion::Done`] and [`ScanError::EncodeIOFailed`] is returned.
    */
    pub fn scan(&mut self) -> Result<ScanReport, ScanError> {
        self.phase = Phase::Idle;
        self.notifier.begin();
        self.cancel.take();
        let output = self.output.take();

        match self.acquire() {
            Ok(acquired) => self.complete(acquired, output),
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    fn acquire(&mut self) -> Result<Acquired, ScanError> {
        let mut chunk = vec![0u8; self.config.chunk_size.max(1)];

        let mut frames = 1;
        let mut params = self.begin_frame(frames)?;
        let mut image = ImageBuffer::new(
            params.pixels_per_line,
            params.known_lines(),
            self.config.strip_height,
        );
        loop {
            let rows = self.read_frame(&params, &mut image, &mut chunk)?;
            self.phase = Phase::FrameEnd;
            if params.last_frame {
                return Ok(Acquired {
                    image,
                    rows,
                    format: params.format,
                    frames,
                });
            }
            frames += 1;
            params = self.begin_frame(frames)?;
            if params.pixels_per_line != image.width() {
                warn!(
                    "frame #{frames} has {} pixels per line, keeping {}",
                    params.pixels_per_line,
                    image.width()
                );
            }
        }
    }

    fn begin_frame(&mut self, frame: usize) -> Result<FrameParameters, ScanError> {
        self.phase = Phase::FrameStart;
        info!("reading frame #{frame}");
        self.device.start().map_err(ScanError::DeviceStartFailed)?;

        self.phase = Phase::FrameParams;
        let params = self
            .device
            .get_parameters()
            .map_err(ScanError::DeviceParamsFailed)?;
        info!(
            "frame #{frame}: {:?}, {} pixels x {} lines, {} bytes per line, depth {}{}",
            params.format,
            params.pixels_per_line,
            params.lines,
            params.bytes_per_line,
            params.depth,
            if params.last_frame { ", last frame" } else { "" }
        );
        if params.pixels_per_line == 0 {
            return Err(ScanError::DeviceParamsFailed(Status::Invalid));
        }
        if params.depth != 8 {
            warn!(
                "sample depth {} is not supported, reading samples as 8 bit",
                params.depth
            );
        }
        Ok(params)
    }

    /// Reads one frame into `image` and returns the number of completed rows.
    fn read_frame(
        &mut self,
        params: &FrameParameters,
        image: &mut ImageBuffer,
        chunk: &mut [u8],
    ) -> Result<usize, ScanError> {
        let mut decoder = FrameDecoder::new(params.format);
        decoder.advance_row(image, &self.notifier);

        self.phase = Phase::FrameRead;
        loop {
            if self.cancel.take() {
                info!("cancelling scan");
                self.device.cancel();
            }
            match self.device.read(chunk) {
                Ok(len) => {
                    debug!("read {len} bytes");
                    decoder.decode(&chunk[..len], image, &self.notifier);
                    image.publish(&self.notifier);
                }
                Err(status) if status.is_fatal() => {
                    return Err(ScanError::DeviceReadFailed(status));
                }
                // end of frame
                Err(_) => return Ok(decoder.rows()),
            }
        }
    }

    fn complete(
        &mut self,
        acquired: Acquired,
        output: Option<Box<dyn Write + Send>>,
    ) -> Result<ScanReport, ScanError> {
        self.phase = Phase::Complete;
        let Acquired {
            mut image,
            rows,
            format,
            frames,
        } = acquired;
        image.finish(rows);
        let grid = image.into_grid();

        self.notifier.dimensions(grid.width(), grid.height());
        self.notifier.pixels(Region::full(&grid), &grid);

        let written = match output {
            Some(out) => write_pnm(&grid, format, out).map_err(|err| {
                warn!("writing the scanned image failed: {err}");
                ScanError::EncodeIOFailed(err)
            }),
            None => Ok(()),
        };

        self.notifier.complete(Completion::Done);
        self.device.cancel();
        info!(
            "scan complete: {}x{} from {frames} frame(s)",
            grid.width(),
            grid.height()
        );

        written.map(|()| ScanReport {
            width: grid.width(),
            height: grid.height(),
            format,
            frames,
        })
    }

    fn fail(&mut self, err: &ScanError) {
        self.phase = Phase::Error;
        error!("scan failed: {err}");
        let status = err.status().unwrap_or(Status::IoError);
        self.notifier.complete(Completion::Error(status));
        self.device.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Fault, ScriptedDevice};

    #[test]
    fn phase_tracks_the_outcome() {
        let mut session = ScanSession::new(ScriptedDevice::gray_pattern(2, 2));
        assert_eq!(session.phase(), Phase::Idle);
        session.scan().unwrap();
        assert_eq!(session.phase(), Phase::Complete);

        let device = ScriptedDevice::gray_pattern(2, 2).with_fault(Fault::Start {
            frame: 0,
            status: Status::DeviceBusy,
        });
        let mut session = ScanSession::new(device);
        assert!(matches!(
            session.scan(),
            Err(ScanError::DeviceStartFailed(Status::DeviceBusy))
        ));
        assert_eq!(session.phase(), Phase::Error);
    }

    #[test]
    fn cancel_handle_is_consumed_once() {
        let handle = CancelHandle::default();
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(handle.take());
        assert!(!handle.take());
    }

    #[test]
    fn zero_sized_config_still_scans() {
        let config = ScanConfig {
            chunk_size: 0,
            strip_height: 0,
        };
        let mut session = ScanSession::with_config(ScriptedDevice::handheld(3, 5), config);
        let report = session.scan().unwrap();
        assert_eq!((report.width, report.height), (3, 5));
    }

    #[test]
    fn zero_width_frames_are_rejected() {
        let mut session = ScanSession::new(ScriptedDevice::gray_pattern(0, 4));
        assert!(matches!(
            session.scan(),
            Err(ScanError::DeviceParamsFailed(Status::Invalid))
        ));
        assert_eq!(session.device().cancels(), 1);
    }
}
