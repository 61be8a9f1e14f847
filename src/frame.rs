//! Turning raw frame bytes into channel writes on the pixel grid.

use crate::buffer::ImageBuffer;
use crate::device::ColorFormat;
use crate::observer::Notifier;

/// Where one byte of frame data lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Pixel index in the grid.
    pub index: usize,
    /// Bits ORed into that pixel.
    pub bits: u32,
    /// `true` if this byte is the last one of its pixel.
    pub completes_pixel: bool,
}

/// Maps the byte at `offset` within a frame of `format` to its pixel and channel bits.
pub const fn place(format: ColorFormat, offset: usize, byte: u8) -> Placement {
    let value = byte as u32;
    match format {
        ColorFormat::Gray => Placement {
            index: offset,
            bits: (value << 16) | (value << 8) | value,
            completes_pixel: true,
        },
        ColorFormat::Red => single_channel(offset, value, 16),
        ColorFormat::Green => single_channel(offset, value, 8),
        ColorFormat::Blue => single_channel(offset, value, 0),
        ColorFormat::Rgb => {
            // red, green, blue order within each triple
            let channel = 2 - offset % 3;
            Placement {
                index: offset / 3,
                bits: value << (8 * channel),
                completes_pixel: channel == 0,
            }
        }
    }
}

const fn single_channel(offset: usize, value: u32, shift: u32) -> Placement {
    Placement {
        index: offset,
        bits: value << shift,
        completes_pixel: true,
    }
}

/// Position within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Next pixel column.
    pub x: usize,
    /// Current row, `None` until the first row advance.
    pub row: Option<usize>,
    /// Bytes of the frame consumed so far.
    pub offset: usize,
}

/// Decodes the data of one frame into an [`ImageBuffer`], chunk by chunk.
#[derive(Debug)]
pub struct FrameDecoder {
    format: ColorFormat,
    cursor: Cursor,
}
impl FrameDecoder {
    pub fn new(format: ColorFormat) -> Self {
        Self {
            format,
            cursor: Cursor::default(),
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Rows completed in this frame.
    pub fn rows(&self) -> usize {
        self.cursor.row.unwrap_or(0)
    }

    /// Moves to the start of the next row, growing `image` if that row does not exist yet.
    pub fn advance_row(&mut self, image: &mut ImageBuffer, notifier: &Notifier) {
        self.cursor.x = 0;
        let row = self.cursor.row.map_or(0, |row| row + 1);
        self.cursor.row = Some(row);
        image.ensure_row(row, notifier);
    }

    /// ORs every byte of `chunk` into `image`, advancing rows as they fill up.
    pub fn decode(&mut self, chunk: &[u8], image: &mut ImageBuffer, notifier: &Notifier) {
        let width = image.width();
        for &byte in chunk {
            let placement = place(self.format, self.cursor.offset, byte);
            image.accumulate(placement.index, placement.bits);
            self.cursor.offset += 1;
            if placement.completes_pixel {
                self.cursor.x += 1;
                if self.cursor.x >= width {
                    self.advance_row(image, notifier);
                }
            }
        }
    }
}
