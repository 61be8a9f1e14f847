//! Binary portable graymap (`P5`) and pixmap (`P6`) output.

use std::io::{self, BufWriter, Write};

use crate::buffer::PixelGrid;
use crate::device::ColorFormat;

/// Comment line written after the magic number.
pub const HEADER_COMMENT: &str = "# SANE data follows";

/// The two file flavours the encoder writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnmKind {
    /// `P5`, one byte per pixel.
    Graymap,
    /// `P6`, red, green and blue bytes per pixel.
    Pixmap,
}
impl PnmKind {
    /// Gray scans become graymaps, everything color derived becomes a pixmap.
    pub const fn for_format(format: ColorFormat) -> Self {
        match format {
            ColorFormat::Gray => PnmKind::Graymap,
            ColorFormat::Rgb | ColorFormat::Red | ColorFormat::Green | ColorFormat::Blue => {
                PnmKind::Pixmap
            }
        }
    }

    pub const fn magic(&self) -> &'static str {
        match self {
            PnmKind::Graymap => "P5",
            PnmKind::Pixmap => "P6",
        }
    }

    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            PnmKind::Graymap => 1,
            PnmKind::Pixmap => 3,
        }
    }
}

/// Writes `grid` as a binary PNM file chosen by the `format` of the last frame. The alpha channel is dropped.
pub fn write_pnm<W: Write>(grid: &PixelGrid, format: ColorFormat, out: W) -> io::Result<()> {
    let kind = PnmKind::for_format(format);
    let mut out = BufWriter::new(out);
    write!(
        out,
        "{}\n{}\n{} {}\n255\n",
        kind.magic(),
        HEADER_COMMENT,
        grid.width(),
        grid.height()
    )?;
    for &pixel in grid.pixels() {
        let [_, r, g, b] = pixel.to_be_bytes();
        match kind {
            // all three channels carry the gray value
            PnmKind::Graymap => out.write_all(&[b])?,
            PnmKind::Pixmap => out.write_all(&[r, g, b])?,
        }
    }
    out.flush()
}

/// Size of the file [`write_pnm`] produces.
pub fn encoded_len(grid: &PixelGrid, format: ColorFormat) -> usize {
    let kind = PnmKind::for_format(format);
    let header = format!(
        "{}\n{}\n{} {}\n255\n",
        kind.magic(),
        HEADER_COMMENT,
        grid.width(),
        grid.height()
    );
    header.len() + grid.pixels().len() * kind.bytes_per_pixel()
}
