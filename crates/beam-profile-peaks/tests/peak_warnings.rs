use std::sync::Mutex;

use beam_profile_core::{Frame, Roi};
use beam_profile_peaks::{compute_fwhm, ProfileParams};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Keeps every record so tests can assert on emitted warnings.
struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

fn install() {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
}

fn take_warnings() -> Vec<String> {
    LOGGER
        .records
        .lock()
        .unwrap()
        .drain(..)
        .filter(|(level, _)| *level == Level::Warn)
        .map(|(_, msg)| msg)
        .collect()
}

fn gaussian(x: f64, center: f64, sigma: f64, amp: f64) -> f64 {
    let d = x - center;
    amp * (-d * d / (2.0 * sigma * sigma)).exp()
}

fn stripes(centers: &[(f64, f64)]) -> Frame {
    Frame::from_fn(400, 4, 8, |_, x| {
        centers
            .iter()
            .map(|&(c, amp)| gaussian(x as f64, c, 10.0, amp))
            .sum::<f64>()
            .round() as u16
    })
    .unwrap()
}

// Single test: the logger is process-global and tests run on parallel threads.
#[test]
fn multiple_peaks_warn_and_a_single_peak_does_not() {
    install();
    take_warnings();

    let two = stripes(&[(100.0, 100.0), (300.0, 200.0)]);
    let view = two.as_view();
    let res = compute_fwhm(&view, &Roi::full(&view), &ProfileParams::default()).unwrap();
    assert!(res.multiple_peaks);

    let warnings = take_warnings();
    assert!(
        warnings
            .iter()
            .any(|w| w.starts_with("multiple peaks detected (2)") && w.contains("column 300")),
        "warnings: {warnings:?}"
    );

    let one = stripes(&[(200.0, 200.0)]);
    let view = one.as_view();
    let res = compute_fwhm(&view, &Roi::full(&view), &ProfileParams::default()).unwrap();
    assert!(!res.multiple_peaks);
    assert!(res.fwhm().is_some());

    let warnings = take_warnings();
    assert!(
        warnings.iter().all(|w| !w.contains("multiple peaks")),
        "warnings: {warnings:?}"
    );
}
