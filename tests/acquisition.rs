//! End-to-end scans against the scripted device.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use sane_scan::{
    ColorFormat, Completion, FrameParameters, ImageCollector, Notifier, Observer, PixelGrid,
    Region, ScanError, ScanSession, Status,
    buffer::OPAQUE_BLACK,
    sim::{Fault, ScriptedDevice, ScriptedFrame, pattern_sample},
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Dimensions(usize, usize),
    Pixels(Region),
    Complete(Completion),
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<Event>>,
}
impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn dimensions(&self) -> Vec<(usize, usize)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Dimensions(w, h) => Some((w, h)),
                _ => None,
            })
            .collect()
    }

    fn completions(&self) -> Vec<Completion> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Complete(c) => Some(c),
                _ => None,
            })
            .collect()
    }
}
impl Observer for Recorder {
    fn on_dimensions(&self, width: usize, height: usize) {
        self.events.lock().unwrap().push(Event::Dimensions(width, height));
    }
    fn on_pixels(&self, region: Region, _grid: &PixelGrid) {
        self.events.lock().unwrap().push(Event::Pixels(region));
    }
    fn on_complete(&self, completion: Completion) {
        self.events.lock().unwrap().push(Event::Complete(completion));
    }
}

#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);
impl SharedSink {
    fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}
impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct BrokenSink;
impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }
    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }
}

fn session_with_recorder(
    device: ScriptedDevice,
) -> (ScanSession<ScriptedDevice>, Arc<Recorder>, Arc<ImageCollector>) {
    let session = ScanSession::new(device);
    let recorder = Arc::new(Recorder::default());
    let collector = Arc::new(ImageCollector::new());
    session.add_observer(recorder.clone());
    session.add_observer(collector.clone());
    (session, recorder, collector)
}

#[test]
fn gray_4x4_in_two_chunks() {
    let frame = ScriptedFrame::new(
        FrameParameters::new(ColorFormat::Gray, 4, 4, true),
        vec![0x80; 16],
    );
    let device = ScriptedDevice::new(vec![frame]).with_chunk_limit(8);
    let (mut session, recorder, collector) = session_with_recorder(device);
    let sink = SharedSink::default();
    session.set_output(sink.clone());

    let report = session.scan().unwrap();
    assert_eq!((report.width, report.height, report.frames), (4, 4, 1));

    assert_eq!(
        recorder.events(),
        [
            Event::Dimensions(4, 5),
            Event::Pixels(Region::new(0, 0, 4, 2)),
            Event::Pixels(Region::new(0, 2, 4, 2)),
            Event::Dimensions(4, 4),
            Event::Pixels(Region::new(0, 0, 4, 4)),
            Event::Complete(Completion::Done),
        ]
    );

    let image = collector.image();
    assert_eq!((image.width(), image.height()), (4, 4));
    assert!(image.pixels().iter().all(|&p| p == 0xff80_8080));

    let mut expected = b"P5\n# SANE data follows\n4 4\n255\n".to_vec();
    expected.extend_from_slice(&[0x80; 16]);
    assert_eq!(sink.bytes(), expected);
    assert_eq!(session.device().cancels(), 1);
}

#[test]
fn unknown_length_grows_in_strips_and_truncates() {
    let (mut session, recorder, collector) =
        session_with_recorder(ScriptedDevice::handheld(10, 600));
    let report = session.scan().unwrap();
    assert_eq!(report.height, 600);
    assert_eq!(
        recorder.dimensions(),
        [(10, 256), (10, 512), (10, 768), (10, 600)]
    );
    let image = collector.image();
    assert_eq!(image.height(), 600);
    assert_eq!(image.rgb(3, 599), Some([pattern_sample(3, 599, 0); 3]));
}

#[test]
fn partial_last_row_is_not_counted() {
    let frame = ScriptedFrame::new(
        FrameParameters::new(ColorFormat::Gray, 4, -1, true),
        vec![1; 4 * 3 + 2],
    );
    let (mut session, _recorder, collector) =
        session_with_recorder(ScriptedDevice::new(vec![frame]));
    assert_eq!(session.scan().unwrap().height, 3);
    assert_eq!(collector.image().pixels().len(), 12);
}

#[test]
fn three_passes_equal_one_interleaved_frame() {
    let (mut three, _, three_image) =
        session_with_recorder(ScriptedDevice::three_pass_pattern(17, 9).with_chunk_limit(10));
    let three_out = SharedSink::default();
    three.set_output(three_out.clone());
    let report = three.scan().unwrap();
    assert_eq!((report.frames, report.format), (3, ColorFormat::Blue));
    assert_eq!(three.device().starts(), 3);

    let (mut one, _, one_image) = session_with_recorder(ScriptedDevice::rgb_pattern(17, 9));
    let one_out = SharedSink::default();
    one.set_output(one_out.clone());
    one.scan().unwrap();

    assert_eq!(three_image.image(), one_image.image());
    assert_eq!(three_out.bytes(), one_out.bytes());
    assert!(three_out.bytes().starts_with(b"P6\n# SANE data follows\n17 9\n255\n"));
}

#[test]
fn graymap_round_trips_through_a_pnm_reader() {
    let mut session = ScanSession::new(ScriptedDevice::gray_pattern(33, 21));
    let sink = SharedSink::default();
    session.set_output(sink.clone());
    session.scan().unwrap();

    let decoded = image::load_from_memory_with_format(&sink.bytes(), image::ImageFormat::Pnm)
        .unwrap()
        .to_luma8();
    assert_eq!(decoded.dimensions(), (33, 21));
    for (x, y, pixel) in decoded.enumerate_pixels() {
        assert_eq!(pixel.0[0], pattern_sample(x as usize, y as usize, 0));
    }
}

#[test]
fn pixmap_round_trips_through_a_pnm_reader() {
    let mut session = ScanSession::new(ScriptedDevice::rgb_pattern(12, 30).with_chunk_limit(7));
    let sink = SharedSink::default();
    session.set_output(sink.clone());
    session.scan().unwrap();

    let decoded = image::load_from_memory_with_format(&sink.bytes(), image::ImageFormat::Pnm)
        .unwrap()
        .to_rgb8();
    assert_eq!(decoded.dimensions(), (12, 30));
    for (x, y, pixel) in decoded.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        let expected = [0, 1, 2].map(|c| pattern_sample(x, y, c));
        assert_eq!(pixel.0, expected);
    }
}

#[test]
fn read_failure_ends_with_one_error_event() {
    let device = ScriptedDevice::gray_pattern(8, 8)
        .with_chunk_limit(16)
        .with_fault(Fault::Read {
            frame: 0,
            after: 32,
            status: Status::Jammed,
        });
    let (mut session, recorder, _) = session_with_recorder(device);
    let sink = SharedSink::default();
    session.set_output(sink.clone());

    let err = session.scan().unwrap_err();
    assert!(matches!(err, ScanError::DeviceReadFailed(Status::Jammed)));
    assert_eq!(err.status(), Some(Status::Jammed));

    let events = recorder.events();
    assert_eq!(
        events.last(),
        Some(&Event::Complete(Completion::Error(Status::Jammed)))
    );
    assert_eq!(recorder.completions().len(), 1);
    assert_eq!(session.device().cancels(), 1);
    assert!(sink.bytes().is_empty());
}

#[test]
fn start_failure_on_a_later_frame() {
    let device = ScriptedDevice::three_pass_pattern(4, 4).with_fault(Fault::Start {
        frame: 1,
        status: Status::CoverOpen,
    });
    let (mut session, recorder, _) = session_with_recorder(device);
    assert!(matches!(
        session.scan(),
        Err(ScanError::DeviceStartFailed(Status::CoverOpen))
    ));
    assert_eq!(
        recorder.completions(),
        [Completion::Error(Status::CoverOpen)]
    );
}

#[test]
fn parameter_failure_before_any_pixels() {
    let device = ScriptedDevice::gray_pattern(4, 4).with_fault(Fault::Parameters {
        frame: 0,
        status: Status::IoError,
    });
    let (mut session, recorder, _) = session_with_recorder(device);
    assert!(matches!(
        session.scan(),
        Err(ScanError::DeviceParamsFailed(Status::IoError))
    ));
    assert_eq!(
        recorder.events(),
        [Event::Complete(Completion::Error(Status::IoError))]
    );
}

#[test]
fn encode_failure_still_completes_the_scan() {
    let (mut session, recorder, collector) =
        session_with_recorder(ScriptedDevice::gray_pattern(5, 5));
    session.set_output(BrokenSink);
    assert!(matches!(session.scan(), Err(ScanError::EncodeIOFailed(_))));
    assert_eq!(recorder.completions(), [Completion::Done]);
    assert_eq!(collector.image().height(), 5);

    // the sink is used for one scan only
    assert!(session.scan().is_ok());
}

/// Cancels the scan as soon as pixels arrive.
struct Canceller {
    handle: sane_scan::CancelHandle,
}
impl Observer for Canceller {
    fn on_pixels(&self, _region: Region, _grid: &PixelGrid) {
        self.handle.cancel();
    }
    fn on_complete(&self, _completion: Completion) {}
}

#[test]
fn cancellation_ends_in_the_error_state() {
    let device = ScriptedDevice::gray_pattern(16, 16).with_chunk_limit(16);
    let (mut session, recorder, _) = session_with_recorder(device);
    session.add_observer(Arc::new(Canceller {
        handle: session.cancel_handle(),
    }));
    assert!(matches!(
        session.scan(),
        Err(ScanError::DeviceReadFailed(Status::Cancelled))
    ));
    assert_eq!(
        recorder.completions(),
        [Completion::Error(Status::Cancelled)]
    );
    // once from the handle, once from the error state
    assert_eq!(session.device().cancels(), 2);
    assert_eq!(session.device().reads(), 2);
}

/// Registers `late` the first time the buffer grows.
struct Attacher {
    notifier: Notifier,
    late: Arc<Recorder>,
}
impl Observer for Attacher {
    fn on_dimensions(&self, _width: usize, _height: usize) {
        self.notifier.add(self.late.clone());
    }
    fn on_complete(&self, _completion: Completion) {}
}

#[test]
fn observers_added_mid_scan_see_only_later_events() {
    let mut session = ScanSession::new(ScriptedDevice::gray_pattern(4, 4).with_chunk_limit(8));
    let late = Arc::new(Recorder::default());
    session.add_observer(Arc::new(Attacher {
        notifier: session.notifier(),
        late: late.clone(),
    }));
    session.scan().unwrap();
    assert_eq!(
        late.events(),
        [
            Event::Pixels(Region::new(0, 0, 4, 2)),
            Event::Pixels(Region::new(0, 2, 4, 2)),
            Event::Dimensions(4, 4),
            Event::Pixels(Region::new(0, 0, 4, 4)),
            Event::Complete(Completion::Done),
        ]
    );
}

#[test]
fn removed_observers_get_nothing() {
    let (mut session, recorder, _) = session_with_recorder(ScriptedDevice::gray_pattern(2, 2));
    let observer: Arc<dyn Observer> = recorder.clone();
    assert!(session.remove_observer(&observer));
    session.scan().unwrap();
    assert!(recorder.events().is_empty());
}

#[test]
fn each_scan_gets_its_own_terminal_event() {
    let (mut session, recorder, collector) =
        session_with_recorder(ScriptedDevice::three_pass_pattern(3, 3));
    session.scan().unwrap();
    session.scan().unwrap();
    assert_eq!(recorder.completions(), [Completion::Done, Completion::Done]);
    assert_eq!(session.device().starts(), 6);
    let image = collector.image();
    assert_eq!(image.rgb(1, 2), Some([0, 1, 2].map(|c| pattern_sample(1, 2, c))));
    assert!(image.pixels().iter().all(|p| p & OPAQUE_BLACK == OPAQUE_BLACK));
}

#[test]
fn scan_with_registers_the_observer_first() {
    let mut session = ScanSession::new(ScriptedDevice::rgb_pattern(6, 4));
    let recorder = Arc::new(Recorder::default());
    let report = session.scan_with(recorder.clone()).unwrap();
    assert_eq!((report.width, report.height), (6, 4));
    assert_eq!(recorder.events().first(), Some(&Event::Dimensions(6, 5)));
    assert_eq!(recorder.completions(), [Completion::Done]);

    let observer: Arc<dyn Observer> = recorder.clone();
    assert!(session.notifier().contains(&observer));
}
