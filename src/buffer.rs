//! The growable pixel grid everything is decoded into.

use crate::observer::{Notifier, Region};

/// Rows added each time the grid runs out of space.
pub const STRIP_HEIGHT: usize = 256;

/// Value of a pixel nothing has been written to: alpha 255, color 0.
pub const OPAQUE_BLACK: u32 = 0xff00_0000;

/// Row-major grid of packed `0xAARRGGBB` pixels, `index = y * width + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}
impl PixelGrid {
    /// An empty grid of the given width.
    pub const fn new(width: usize) -> Self {
        Self {
            width,
            height: 0,
            pixels: Vec::new(),
        }
    }

    /// A `width * height` grid with every pixel set to [`OPAQUE_BLACK`].
    pub fn filled(width: usize, height: usize) -> Self {
        let mut grid = Self::new(width);
        grid.grow(height);
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// `[red, green, blue]` of the pixel at `(x, y)`.
    pub fn rgb(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        self.pixel(x, y).map(|p| {
            let [_, r, g, b] = p.to_be_bytes();
            [r, g, b]
        })
    }

    /// Appends `rows` opaque black rows, keeping all existing pixels.
    pub fn grow(&mut self, rows: usize) {
        self.height += rows;
        self.pixels.resize(self.width * self.height, OPAQUE_BLACK);
    }

    /// Drops every row from `height` on. Does nothing if the grid is not taller.
    pub fn truncate(&mut self, height: usize) {
        if height < self.height {
            self.height = height;
            self.pixels.truncate(self.width * height);
        }
    }

    /// ORs `bits` into the pixel at `index`. Returns `false` if the index is outside the grid.
    pub fn accumulate(&mut self, index: usize, bits: u32) -> bool {
        match self.pixels.get_mut(index) {
            Some(pixel) => {
                *pixel |= bits;
                true
            }
            None => false,
        }
    }

    /// Copies the rows of `region` from `other`, resizing to `other`'s geometry first if needed.
    pub fn copy_rows_from(&mut self, other: &PixelGrid, region: Region) {
        if self.width != other.width || self.height != other.height {
            self.resize_to(other.width, other.height);
        }
        let start = region.y.min(self.height) * self.width;
        let end = (region.y + region.height).min(self.height) * self.width;
        self.pixels[start..end].copy_from_slice(&other.pixels[start..end]);
    }

    /// Sets the geometry, keeping the pixels that still fit when only the height changes.
    pub fn resize_to(&mut self, width: usize, height: usize) {
        if width != self.width {
            *self = Self::filled(width, height);
        } else if height > self.height {
            self.grow(height - self.height);
        } else {
            self.truncate(height);
        }
    }
}

/// Owns the grid during one acquisition and grows it one strip at a time.
#[derive(Debug)]
pub struct ImageBuffer {
    grid: PixelGrid,
    first_allocation: usize,
    strip_height: usize,
    dirty: Option<(usize, usize)>,
}
impl ImageBuffer {
    /// `declared_lines` sizes the first allocation; `None` falls back to one strip.
    pub fn new(width: usize, declared_lines: Option<usize>, strip_height: usize) -> Self {
        let strip_height = strip_height.max(1);
        Self {
            grid: PixelGrid::new(width),
            // a spare row takes the advance after the last scanline
            first_allocation: declared_lines.map_or(strip_height, |lines| lines + 1),
            strip_height,
            dirty: None,
        }
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width
    }

    pub fn height(&self) -> usize {
        self.grid.height
    }

    /// Makes sure `row` exists, growing the grid and announcing the new size if it does not.
    pub fn ensure_row(&mut self, row: usize, notifier: &Notifier) {
        if row < self.grid.height {
            return;
        }
        let rows = if self.grid.height == 0 {
            self.first_allocation.max(row + 1)
        } else {
            self.strip_height * ((row - self.grid.height) / self.strip_height + 1)
        };
        self.grid.grow(rows);
        log::debug!(
            "image buffer grown to {}x{}",
            self.grid.width,
            self.grid.height
        );
        notifier.dimensions(self.grid.width, self.grid.height);
    }

    /// ORs `bits` into the pixel at `index` and marks its row dirty.
    pub fn accumulate(&mut self, index: usize, bits: u32) {
        if self.grid.accumulate(index, bits) {
            let row = index / self.grid.width;
            self.dirty = Some(match self.dirty {
                Some((first, last)) => (first.min(row), last.max(row)),
                None => (row, row),
            });
        } else {
            log::warn!("dropping sample outside the image buffer at pixel {index}");
        }
    }

    /// Notifies observers of the rows written since the last call.
    pub fn publish(&mut self, notifier: &Notifier) {
        if let Some((first, last)) = self.dirty.take() {
            let region = Region::new(0, first, self.grid.width, last - first + 1);
            notifier.pixels(region, &self.grid);
        }
    }

    /// Cuts the grid down to `rows` rows.
    pub fn finish(&mut self, rows: usize) {
        self.grid.truncate(rows);
        self.dirty = None;
    }

    /// Gives up the grid.
    pub fn into_grid(self) -> PixelGrid {
        self.grid
    }
}
