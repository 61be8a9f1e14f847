//! Scanners attached through the system SANE library. See the [SANE standard](https://sane-project.gitlab.io/standard/).

pub mod device;

use std::ffi::CStr;
use std::marker::PhantomData;
use std::os::raw::c_char;
use std::sync::atomic::{AtomicBool, Ordering};

use sane_sys as sys;

use crate::device::Status;

pub use device::SaneDevice;

// set while a `Backend` is alive
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Marks the library as initialized. Fails with `DeviceBusy` if it already is.
fn claim() -> Result<(), Status> {
    if INITIALIZED.swap(true, Ordering::AcqRel) {
        return Err(Status::DeviceBusy);
    }
    Ok(())
}

fn release() {
    INITIALIZED.store(false, Ordering::Release);
}

pub(crate) fn status(code: sys::SANE_Status) -> Status {
    Status::from_code(code as i32)
}

/// Vendor information of an attached scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// The name to open the device with.
    pub name: String,
    pub vendor: String,
    pub model: String,
    /// Kind of device, e.g. "flatbed scanner".
    pub kind: String,
}

/// An initialized SANE library. Dropping it shuts the library down, so opened devices borrow it.
///
/// Only one `Backend` can exist at a time.
pub struct Backend {
    // sane is not thread safe
    _not_send: PhantomData<*const ()>,
}
impl Backend {
    /// Initializes the library. Returns `DeviceBusy` while another `Backend` is alive.
    pub fn init() -> Result<Self, Status> {
        claim()?;
        let mut version = 0;
        let code = unsafe { sys::sane_init(&mut version, None) };
        match status(code) {
            Status::Good => {
                log::info!(
                    "SANE initialized, backend version {}.{}.{}",
                    (version >> 24) & 0xff,
                    (version >> 16) & 0xff,
                    version & 0xffff
                );
                Ok(Self {
                    _not_send: PhantomData,
                })
            }
            err => {
                release();
                Err(err)
            }
        }
    }

    /// Lists the available scanners. With `local_only` network scanners are skipped.
    pub fn devices(&self, local_only: bool) -> Result<Vec<DeviceInfo>, Status> {
        let mut list: *mut *const sys::SANE_Device = std::ptr::null_mut();
        let code = unsafe { sys::sane_get_devices(&mut list, local_only as sys::SANE_Bool) };
        if status(code) != Status::Good {
            return Err(status(code));
        }
        let mut devices = Vec::new();
        if list.is_null() {
            return Ok(devices);
        }
        // the list is terminated by a null entry
        let mut i = 0;
        loop {
            let entry = unsafe { *list.add(i) };
            if entry.is_null() {
                break;
            }
            let device = unsafe { &*entry };
            devices.push(DeviceInfo {
                name: string(device.name),
                vendor: string(device.vendor),
                model: string(device.model),
                kind: string(device.type_),
            });
            i += 1;
        }
        Ok(devices)
    }

    /// Opens the scanner called `name`; an empty name opens the first available one.
    pub fn open(&self, name: &str) -> Result<SaneDevice<'_>, Status> {
        SaneDevice::open(name)
    }

}
impl Drop for Backend {
    fn drop(&mut self) {
        unsafe { sys::sane_exit() };
        release();
        log::info!("SANE shut down");
    }
}

fn string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_is_claimed_once() {
        assert_eq!(claim(), Ok(()));
        assert_eq!(claim(), Err(Status::DeviceBusy));
        release();
        assert_eq!(claim(), Ok(()));
        release();
    }
}
