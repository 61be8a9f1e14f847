//! Push-based fan-out of scan progress to registered observers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::buffer::PixelGrid;
use crate::device::Status;

/// A rectangle of the pixel grid, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}
impl Region {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The region covering all of `grid`.
    pub fn full(grid: &PixelGrid) -> Self {
        Self::new(0, 0, grid.width(), grid.height())
    }
}

/// How a scan session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Done,
    /// The session failed with the given device status.
    Error(Status),
}

/**
Receives the events of a scan session, in emission order: dimension changes, pixel updates, then exactly one completion.

The grid passed to `on_pixels` is only valid for the duration of the call. It is reallocated whenever the dimensions change, so observers that want to keep pixels must copy them. Callbacks run on the scanning thread and must not start another scan on the same session.
*/
pub trait Observer: Send + Sync {
    fn on_dimensions(&self, _width: usize, _height: usize) {}

    /// `region` is a hint of what changed, `grid` the whole current buffer.
    fn on_pixels(&self, _region: Region, _grid: &PixelGrid) {}

    fn on_complete(&self, completion: Completion);
}

#[derive(Default)]
struct Registry {
    observers: Vec<Arc<dyn Observer>>,
    finished: bool,
}

/// The set of observers of one session. Clones share the same set, so observers can be added or removed from other threads or from within a callback; they only see events emitted after they were added.
#[derive(Clone, Default)]
pub struct Notifier {
    registry: Arc<Mutex<Registry>>,
}
impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer`. Returns `false` if this very observer is already registered.
    pub fn add(&self, observer: Arc<dyn Observer>) -> bool {
        let mut registry = self.lock();
        if registry.observers.iter().any(|o| Arc::ptr_eq(o, &observer)) {
            return false;
        }
        registry.observers.push(observer);
        true
    }

    /// Unregisters `observer`. Returns `false` if it was not registered.
    pub fn remove(&self, observer: &Arc<dyn Observer>) -> bool {
        let mut registry = self.lock();
        let count = registry.observers.len();
        registry.observers.retain(|o| !Arc::ptr_eq(o, observer));
        registry.observers.len() != count
    }

    pub fn contains(&self, observer: &Arc<dyn Observer>) -> bool {
        self.lock()
            .observers
            .iter()
            .any(|o| Arc::ptr_eq(o, observer))
    }

    pub fn len(&self) -> usize {
        self.lock().observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Opens a new session: events flow again until the next completion.
    pub(crate) fn begin(&self) {
        self.lock().finished = false;
    }

    pub(crate) fn dimensions(&self, width: usize, height: usize) {
        for observer in self.snapshot() {
            observer.on_dimensions(width, height);
        }
    }

    pub(crate) fn pixels(&self, region: Region, grid: &PixelGrid) {
        for observer in self.snapshot() {
            observer.on_pixels(region, grid);
        }
    }

    /// Delivers the terminal event. Later calls and any further events of this session are dropped.
    pub(crate) fn complete(&self, completion: Completion) {
        let observers = {
            let mut registry = self.lock();
            if registry.finished {
                return;
            }
            registry.finished = true;
            registry.observers.clone()
        };
        for observer in observers {
            observer.on_complete(completion);
        }
    }

    // observers are called without holding the lock
    fn snapshot(&self) -> Vec<Arc<dyn Observer>> {
        let registry = self.lock();
        if registry.finished {
            Vec::new()
        } else {
            registry.observers.clone()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An observer that keeps its own copy of the scanned image.
pub struct ImageCollector {
    image: Mutex<PixelGrid>,
    completion: Mutex<Option<Completion>>,
}
impl ImageCollector {
    pub fn new() -> Self {
        Self {
            image: Mutex::new(PixelGrid::new(0)),
            completion: Mutex::new(None),
        }
    }

    /// A copy of the pixels received so far.
    pub fn image(&self) -> PixelGrid {
        self.image
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn completion(&self) -> Option<Completion> {
        *self.completion.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
impl Default for ImageCollector {
    fn default() -> Self {
        Self::new()
    }
}
impl Observer for ImageCollector {
    fn on_dimensions(&self, width: usize, height: usize) {
        self.image
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .resize_to(width, height);
    }

    fn on_pixels(&self, region: Region, grid: &PixelGrid) {
        self.image
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .copy_rows_from(grid, region);
    }

    fn on_complete(&self, completion: Completion) {
        *self.completion.lock().unwrap_or_else(PoisonError::into_inner) = Some(completion);
    }
}
