//! The [`Device`] implementation over a SANE handle.

use std::ffi::CString;
use std::marker::PhantomData;

use sane_sys as sys;

use crate::device::{ColorFormat, Device, FrameParameters, Status};

use super::{Backend, status};

/// An opened scanner. Closed when dropped.
pub struct SaneDevice<'a> {
    handle: sys::SANE_Handle,
    name: String,
    _backend: PhantomData<&'a Backend>,
}
impl SaneDevice<'_> {
    pub(super) fn open(name: &str) -> Result<Self, Status> {
        let c_name = CString::new(name).map_err(|_| Status::Invalid)?;
        let mut handle: sys::SANE_Handle = std::ptr::null_mut();
        let code = unsafe { sys::sane_open(c_name.as_ptr(), &mut handle) };
        match status(code) {
            Status::Good if !handle.is_null() => {
                log::info!("opened device {name:?}");
                Ok(Self {
                    handle,
                    name: name.to_string(),
                    _backend: PhantomData,
                })
            }
            Status::Good => Err(Status::Invalid),
            err => Err(err),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Device for SaneDevice<'_> {
    fn start(&mut self) -> Result<(), Status> {
        match status(unsafe { sys::sane_start(self.handle) }) {
            Status::Good => {}
            err => return Err(err),
        }
        // reads block until data is available
        let blocking = sys::SANE_FALSE as sys::SANE_Bool;
        blocking_io(status(unsafe { sys::sane_set_io_mode(self.handle, blocking) }))
    }

    fn get_parameters(&mut self) -> Result<FrameParameters, Status> {
        let mut params = sys::SANE_Parameters::default();
        match status(unsafe { sys::sane_get_parameters(self.handle, &mut params) }) {
            Status::Good => {}
            err => return Err(err),
        }
        let format = ColorFormat::from_code(params.format).ok_or(Status::Invalid)?;
        Ok(FrameParameters {
            format,
            last_frame: params.last_frame != 0,
            bytes_per_line: usize::try_from(params.bytes_per_line).map_err(|_| Status::Invalid)?,
            pixels_per_line: usize::try_from(params.pixels_per_line)
                .map_err(|_| Status::Invalid)?,
            lines: params.lines,
            depth: u32::try_from(params.depth).map_err(|_| Status::Invalid)?,
        })
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Status> {
        let max_length = sys::SANE_Int::try_from(buffer.len()).unwrap_or(sys::SANE_Int::MAX);
        let mut length: sys::SANE_Int = 0;
        let code =
            unsafe { sys::sane_read(self.handle, buffer.as_mut_ptr(), max_length, &mut length) };
        match status(code) {
            Status::Good => Ok(usize::try_from(length).unwrap_or(0)),
            err => Err(err),
        }
    }

    fn cancel(&mut self) {
        unsafe { sys::sane_cancel(self.handle) };
    }
}

/// Result of selecting blocking reads. Backends without non-blocking support report
/// `Unsupported`, which leaves them in the blocking default.
fn blocking_io(status: Status) -> Result<(), Status> {
    match status {
        Status::Good => Ok(()),
        Status::Unsupported => {
            log::debug!("backend has no io mode setting, reads block");
            Ok(())
        }
        err => Err(err),
    }
}

impl Drop for SaneDevice<'_> {
    fn drop(&mut self) {
        unsafe { sys::sane_close(self.handle) };
        log::info!("closed device {:?}", self.name);
    }
}
