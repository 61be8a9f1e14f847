/*!
This example scans a simulated three-pass color device, prints the progress received by an observer, and writes the result to `scan.ppm`. With the `sane` feature the first attached scanner is used instead.
*/

use std::{
    fs::File,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use sane_scan::{Completion, ImageCollector, Observer, PixelGrid, Region, ScanSession};

/// Prints every time the image buffer grows and counts pixel updates.
#[derive(Default)]
struct Printer {
    updates: AtomicUsize,
}
impl Observer for Printer {
    fn on_dimensions(&self, width: usize, height: usize) {
        println!("dimensions: {width}x{height}");
    }

    fn on_pixels(&self, region: Region, _grid: &PixelGrid) {
        self.updates.fetch_add(1, Ordering::Relaxed);
        println!("rows {}..{}", region.y, region.y + region.height);
    }

    fn on_complete(&self, completion: Completion) {
        println!(
            "{completion:?} after {} updates",
            self.updates.load(Ordering::Relaxed)
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "sane")]
    let backend = sane_scan::sane::Backend::init().map_err(|s| s.to_string())?;
    #[cfg(feature = "sane")]
    let device = backend.open("").map_err(|s| s.to_string())?;

    #[cfg(not(feature = "sane"))]
    let device = sane_scan::sim::ScriptedDevice::three_pass_pattern(320, 240).with_chunk_limit(8000);

    let collector = Arc::new(ImageCollector::new());

    let mut session = ScanSession::new(device);
    session.add_observer(Arc::new(Printer::default()));
    session.add_observer(collector.clone());
    session.set_output(File::create("scan.ppm")?);

    let report = session.scan()?;
    println!(
        "scanned {}x{} in {} frame(s), top left pixel: {:?}",
        report.width,
        report.height,
        report.frames,
        collector.image().rgb(0, 0)
    );

    Ok(())
}
