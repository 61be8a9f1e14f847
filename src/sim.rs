//! An in-memory device replaying scripted frames, for tests, demos and runs without hardware.

use crate::device::{ColorFormat, Device, FrameParameters, Status};

/// One frame the device will deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedFrame {
    pub parameters: FrameParameters,
    pub data: Vec<u8>,
}
impl ScriptedFrame {
    pub fn new(parameters: FrameParameters, data: Vec<u8>) -> Self {
        Self { parameters, data }
    }
}

/// A failure injected into the script. `frame` counts from 0 within one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Start { frame: usize, status: Status },
    Parameters { frame: usize, status: Status },
    /// Fails the first read after `after` bytes of the frame were delivered.
    Read { frame: usize, after: usize, status: Status },
}

/// Sample value of the built-in test patterns at `(x, y)` for `channel` 0..3 (red, green, blue).
pub fn pattern_sample(x: usize, y: usize, channel: usize) -> u8 {
    ((x + 2 * y + 85 * channel) % 256) as u8
}

/// A [`Device`] that plays back a list of frames.
#[derive(Debug, Clone)]
pub struct ScriptedDevice {
    frames: Vec<ScriptedFrame>,
    chunk_limit: Option<usize>,
    fault: Option<Fault>,
    next_frame: usize,
    current: Option<usize>,
    position: usize,
    cancelled: bool,
    starts: usize,
    reads: usize,
    cancels: usize,
}
impl ScriptedDevice {
    pub fn new(frames: Vec<ScriptedFrame>) -> Self {
        Self {
            frames,
            chunk_limit: None,
            fault: None,
            next_frame: 0,
            current: None,
            position: 0,
            cancelled: false,
            starts: 0,
            reads: 0,
            cancels: 0,
        }
    }

    /// A single gray frame of known size.
    pub fn gray_pattern(width: usize, height: usize) -> Self {
        let data = pattern(width, height, |x, y| vec![pattern_sample(x, y, 0)]);
        Self::new(vec![ScriptedFrame::new(
            FrameParameters::new(ColorFormat::Gray, width, lines(height), true),
            data,
        )])
    }

    /// A single interleaved RGB frame of known size.
    pub fn rgb_pattern(width: usize, height: usize) -> Self {
        let data = pattern(width, height, |x, y| {
            (0..3).map(|c| pattern_sample(x, y, c)).collect()
        });
        Self::new(vec![ScriptedFrame::new(
            FrameParameters::new(ColorFormat::Rgb, width, lines(height), true),
            data,
        )])
    }

    /// The RGB pattern delivered as separate red, green and blue frames.
    pub fn three_pass_pattern(width: usize, height: usize) -> Self {
        let formats = [ColorFormat::Red, ColorFormat::Green, ColorFormat::Blue];
        let frames = formats
            .iter()
            .enumerate()
            .map(|(channel, &format)| {
                let data = pattern(width, height, |x, y| vec![pattern_sample(x, y, channel)]);
                let parameters =
                    FrameParameters::new(format, width, lines(height), channel == 2);
                ScriptedFrame::new(parameters, data)
            })
            .collect();
        Self::new(frames)
    }

    /// A gray source that does not announce its length, like a hand-held scanner.
    pub fn handheld(width: usize, rows: usize) -> Self {
        let data = pattern(width, rows, |x, y| vec![pattern_sample(x, y, 0)]);
        Self::new(vec![ScriptedFrame::new(
            FrameParameters::new(ColorFormat::Gray, width, -1, true),
            data,
        )])
    }

    /// Limits how many bytes a single read returns.
    pub fn with_chunk_limit(mut self, limit: usize) -> Self {
        self.chunk_limit = Some(limit.max(1));
        self
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn frames(&self) -> &[ScriptedFrame] {
        &self.frames
    }

    pub fn starts(&self) -> usize {
        self.starts
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn cancels(&self) -> usize {
        self.cancels
    }

    fn frame_index(&self) -> Result<usize, Status> {
        self.current.ok_or(Status::Invalid)
    }
}

impl Device for ScriptedDevice {
    fn start(&mut self) -> Result<(), Status> {
        self.starts += 1;
        self.cancelled = false;
        if self.next_frame >= self.frames.len() {
            self.next_frame = 0;
        }
        let frame = self.next_frame;
        if let Some(Fault::Start { frame: f, status }) = self.fault {
            if f == frame {
                return Err(status);
            }
        }
        if self.frames.is_empty() {
            return Err(Status::NoDocs);
        }
        self.current = Some(frame);
        self.next_frame += 1;
        self.position = 0;
        Ok(())
    }

    fn get_parameters(&mut self) -> Result<FrameParameters, Status> {
        let frame = self.frame_index()?;
        if let Some(Fault::Parameters { frame: f, status }) = self.fault {
            if f == frame {
                return Err(status);
            }
        }
        Ok(self.frames[frame].parameters)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Status> {
        self.reads += 1;
        if self.cancelled {
            return Err(Status::Cancelled);
        }
        let frame = self.frame_index()?;
        let data = &self.frames[frame].data;
        let mut end = data.len();
        if let Some(Fault::Read { frame: f, after, status }) = self.fault {
            if f == frame {
                if self.position >= after {
                    return Err(status);
                }
                end = end.min(after);
            }
        }
        if self.position >= end {
            return Err(Status::Eof);
        }
        let mut count = buffer.len().min(end - self.position);
        if let Some(limit) = self.chunk_limit {
            count = count.min(limit);
        }
        buffer[..count].copy_from_slice(&data[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }

    fn cancel(&mut self) {
        self.cancels += 1;
        self.cancelled = true;
        self.current = None;
        self.next_frame = 0;
    }
}

fn lines(height: usize) -> i32 {
    i32::try_from(height).unwrap_or(-1)
}

fn pattern(width: usize, height: usize, sample: impl Fn(usize, usize) -> Vec<u8>) -> Vec<u8> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .flat_map(|(x, y)| sample(x, y))
        .collect()
}
