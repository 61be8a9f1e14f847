//! The device seam: what the acquisition loop needs from a scanner.

use std::fmt;

/// Status codes reported by a device. The numeric values are the SANE status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Good,
    Unsupported,
    Cancelled,
    DeviceBusy,
    Invalid,
    /// End of the current frame. Not an error.
    Eof,
    Jammed,
    NoDocs,
    CoverOpen,
    IoError,
    NoMem,
    AccessDenied,
    Other(i32),
}
impl Status {
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Status::Good,
            1 => Status::Unsupported,
            2 => Status::Cancelled,
            3 => Status::DeviceBusy,
            4 => Status::Invalid,
            5 => Status::Eof,
            6 => Status::Jammed,
            7 => Status::NoDocs,
            8 => Status::CoverOpen,
            9 => Status::IoError,
            10 => Status::NoMem,
            11 => Status::AccessDenied,
            other => Status::Other(other),
        }
    }

    pub const fn code(&self) -> i32 {
        match self {
            Status::Good => 0,
            Status::Unsupported => 1,
            Status::Cancelled => 2,
            Status::DeviceBusy => 3,
            Status::Invalid => 4,
            Status::Eof => 5,
            Status::Jammed => 6,
            Status::NoDocs => 7,
            Status::CoverOpen => 8,
            Status::IoError => 9,
            Status::NoMem => 10,
            Status::AccessDenied => 11,
            Status::Other(code) => *code,
        }
    }

    /// Human readable message, worded like `sane_strstatus`.
    pub fn message(&self) -> &'static str {
        match self {
            Status::Good => "Success",
            Status::Unsupported => "Operation not supported",
            Status::Cancelled => "Operation was cancelled",
            Status::DeviceBusy => "Device busy",
            Status::Invalid => "Invalid argument",
            Status::Eof => "End of file reached",
            Status::Jammed => "Document feeder jammed",
            Status::NoDocs => "Document feeder out of documents",
            Status::CoverOpen => "Scanner cover is open",
            Status::IoError => "Error during device I/O",
            Status::NoMem => "Out of memory",
            Status::AccessDenied => "Access to resource has been denied",
            Status::Other(_) => "Unknown SANE status code",
        }
    }

    /// Anything other than `Good` or `Eof` ends a session.
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Status::Good | Status::Eof)
    }
}
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

/// Pixel encoding of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFormat {
    /// One luminance byte per pixel.
    Gray,
    /// Interleaved red, green, blue bytes.
    Rgb,
    Red,
    Green,
    Blue,
}
impl ColorFormat {
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(ColorFormat::Gray),
            1 => Some(ColorFormat::Rgb),
            2 => Some(ColorFormat::Red),
            3 => Some(ColorFormat::Green),
            4 => Some(ColorFormat::Blue),
            _ => None,
        }
    }

    /// Bit position of the channel a single-channel frame writes into.
    pub const fn channel_shift(&self) -> Option<u32> {
        match self {
            ColorFormat::Red => Some(16),
            ColorFormat::Green => Some(8),
            ColorFormat::Blue => Some(0),
            ColorFormat::Gray | ColorFormat::Rgb => None,
        }
    }

    /// Bytes the device delivers per pixel.
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            ColorFormat::Rgb => 3,
            _ => 1,
        }
    }
}

/// Geometry and encoding of one frame, as reported by the device after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameParameters {
    pub format: ColorFormat,
    pub last_frame: bool,
    pub bytes_per_line: usize,
    pub pixels_per_line: usize,
    /// Negative when the device cannot tell the length in advance (hand-held scanners).
    pub lines: i32,
    pub depth: u32,
}
impl FrameParameters {
    /// Parameters of an 8-bit frame whose rows carry no padding.
    pub const fn new(
        format: ColorFormat,
        pixels_per_line: usize,
        lines: i32,
        last_frame: bool,
    ) -> Self {
        Self {
            format,
            last_frame,
            bytes_per_line: pixels_per_line * format.bytes_per_pixel(),
            pixels_per_line,
            lines,
            depth: 8,
        }
    }

    /// The declared number of lines, `None` for sources of unknown length.
    pub fn known_lines(&self) -> Option<usize> {
        usize::try_from(self.lines).ok()
    }
}

/// A scanner the acquisition loop can drive. Calls block until the device answers.
pub trait Device {
    /// Starts the next frame.
    fn start(&mut self) -> Result<(), Status>;

    /// Parameters of the frame that was just started.
    fn get_parameters(&mut self) -> Result<FrameParameters, Status>;

    /// Reads the next chunk of frame data into `buffer` and returns the number of bytes written. `Err(Status::Eof)` marks the end of the frame.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Status>;

    /// Asks the device to abort the current operation. Best effort.
    fn cancel(&mut self);
}

impl<D: Device + ?Sized> Device for &mut D {
    fn start(&mut self) -> Result<(), Status> {
        (**self).start()
    }
    fn get_parameters(&mut self) -> Result<FrameParameters, Status> {
        (**self).get_parameters()
    }
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Status> {
        (**self).read(buffer)
    }
    fn cancel(&mut self) {
        (**self).cancel()
    }
}

impl<D: Device + ?Sized> Device for Box<D> {
    fn start(&mut self) -> Result<(), Status> {
        (**self).start()
    }
    fn get_parameters(&mut self) -> Result<FrameParameters, Status> {
        (**self).get_parameters()
    }
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Status> {
        (**self).read(buffer)
    }
    fn cancel(&mut self) {
        (**self).cancel()
    }
}
