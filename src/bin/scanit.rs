//! Command line scanning.

use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{self, WrapErr};
use env_logger::Env;
use log::{LevelFilter, info};

use sane_scan::{
    Completion, Device, Observer, PixelGrid, Region, ScanConfig, ScanSession, scan::CHUNK_SIZE,
    sim::ScriptedDevice,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Pattern {
    Gray,
    Rgb,
    ThreePass,
    Handheld,
}

#[derive(Parser, Debug)]
#[command(version, about = "Scan an image and write it as PGM/PPM")]
struct Options {
    /// The output file, `-` for stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Scan a built-in test pattern instead of a device
    #[arg(long, value_enum, default_value = "gray")]
    pattern: Pattern,
    /// Width of the test pattern
    #[arg(long, default_value_t = 640)]
    width: usize,
    /// Height of the test pattern
    #[arg(long, default_value_t = 480)]
    height: usize,
    /// Bytes requested per read
    #[arg(long, default_value_t = CHUNK_SIZE)]
    buffer_size: usize,
    /// SANE device to scan from, empty for the first one found
    #[cfg(feature = "sane")]
    #[arg(short, long)]
    device: Option<String>,
    /// List the SANE devices and exit
    #[cfg(feature = "sane")]
    #[arg(short = 'L', long)]
    list_devices: bool,
    /// Log every read
    #[arg(short, long)]
    verbose: bool,
}

/// Logs rows as they come in.
#[derive(Default)]
struct Progress {
    rows: Mutex<usize>,
}
impl Observer for Progress {
    fn on_dimensions(&self, width: usize, height: usize) {
        info!("buffer is now {width}x{height}");
    }

    fn on_pixels(&self, region: Region, _grid: &PixelGrid) {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        let end = region.y + region.height;
        if end > *rows {
            *rows = end;
            log::debug!("{end} rows received");
        }
    }

    fn on_complete(&self, completion: Completion) {
        match completion {
            Completion::Done => info!("done"),
            Completion::Error(status) => info!("failed: {status}"),
        }
    }
}

fn init() -> eyre::Result<Options> {
    color_eyre::install()?;
    let args = Options::parse();
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .format_timestamp(None)
        .parse_env(Env::new().filter("SCANIT_LOG"))
        .init();
    Ok(args)
}

fn output(path: &Path) -> eyre::Result<Box<dyn Write + Send>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdout()));
    }
    let file = File::create(path)
        .wrap_err_with(|| format!("Failed to create `{}`", path.display()))?;
    Ok(Box::new(file))
}

fn run<D: Device>(device: D, args: &Options) -> eyre::Result<()> {
    let config = ScanConfig {
        chunk_size: args.buffer_size,
        ..ScanConfig::default()
    };
    let mut session = ScanSession::with_config(device, config);
    log::debug!("reading up to {} bytes at a time", session.config().chunk_size);
    if let Some(path) = &args.output {
        session.set_output(output(path)?);
    }
    let report = session
        .scan_with(Arc::new(Progress::default()))
        .wrap_err("Scan failed")?;
    info!(
        "scanned {}x{} ({:?}, {} frame(s))",
        report.width, report.height, report.format, report.frames
    );
    Ok(())
}

fn pattern(args: &Options) -> ScriptedDevice {
    match args.pattern {
        Pattern::Gray => ScriptedDevice::gray_pattern(args.width, args.height),
        Pattern::Rgb => ScriptedDevice::rgb_pattern(args.width, args.height),
        Pattern::ThreePass => ScriptedDevice::three_pass_pattern(args.width, args.height),
        Pattern::Handheld => ScriptedDevice::handheld(args.width, args.height),
    }
}

#[cfg(feature = "sane")]
fn main() -> eyre::Result<()> {
    use sane_scan::sane::Backend;

    let args = init()?;
    if !args.list_devices && args.device.is_none() {
        return run(pattern(&args), &args);
    }

    let backend = Backend::init().map_err(|status| eyre::eyre!("SANE init failed: {status}"))?;
    if args.list_devices {
        let devices = backend
            .devices(false)
            .map_err(|status| eyre::eyre!("Listing devices failed: {status}"))?;
        for device in devices {
            println!(
                "device `{}' is a {} {} {}",
                device.name, device.vendor, device.model, device.kind
            );
        }
        return Ok(());
    }
    let name = args.device.clone().unwrap_or_default();
    let device = backend
        .open(&name)
        .map_err(|status| eyre::eyre!("Opening `{name}` failed: {status}"))?;
    run(device, &args)
}

#[cfg(not(feature = "sane"))]
fn main() -> eyre::Result<()> {
    let args = init()?;
    run(pattern(&args), &args)
}
