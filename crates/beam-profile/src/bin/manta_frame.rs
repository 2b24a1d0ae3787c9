//! Grab a single frame from a camera, save it as `.npy` and optionally
//! measure the horizontal FWHM of the beam in it.
//!
//! Usage:
//!   manta-frame [OPTIONS] [camera_id]
//!   manta-frame --analyze-file manta-frame_Mono8_2021-08-13T14-05-09.npy

use std::path::PathBuf;
use std::process::ExitCode;

use beam_profile::acquire::{acquire, analyze_file};
use beam_profile::camera::{CameraInfo, CameraSystem};
use beam_profile::io::{AcquisitionConfig, AcquisitionReport, Backend};
use beam_profile::{FwhmResult, Roi};
use clap::{CommandFactory, Parser};
use log::LevelFilter;

type BoxError = Box<dyn std::error::Error>;

/// Single-shot frame grabber and beam profiler.
#[derive(Parser, Debug)]
#[command(
    name = "manta-frame",
    version,
    about = "Capture one frame, save it as .npy and optionally measure the beam FWHM",
    override_usage = "manta-frame [OPTIONS] [camera_id]\n       manta-frame [/h] [-h]"
)]
struct Cli {
    /// ID of the camera to use (the first camera found when omitted).
    #[arg(value_name = "camera_id")]
    camera_ids: Vec<String>,

    /// List accessible cameras and exit.
    #[arg(long)]
    list: bool,

    /// Camera backend.
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Directory of image files served by the `images` backend.
    #[arg(long, value_name = "DIR")]
    image_dir: Option<PathBuf>,

    /// Directory the frame is saved into.
    #[arg(long, value_name = "DIR")]
    save_dir: Option<PathBuf>,

    /// Frame timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Channel to keep from a multi-channel frame.
    #[arg(long)]
    channel: Option<usize>,

    /// Measure the FWHM of the captured frame.
    #[arg(long)]
    analyze: bool,

    /// Analyse a saved `.npy` frame instead of capturing.
    #[arg(long, value_name = "PATH", conflicts_with = "list")]
    analyze_file: Option<PathBuf>,

    /// Region of interest as ROW_MIN ROW_MAX COL_MIN COL_MAX (half-open).
    #[arg(long, num_args = 4, value_names = ["ROW_MIN", "ROW_MAX", "COL_MIN", "COL_MAX"])]
    roi: Option<Vec<usize>>,

    /// Minimum peak prominence.
    #[arg(long)]
    prominence: Option<f64>,

    /// Invert intensities so that dips become peaks.
    #[arg(long)]
    invert: bool,

    /// Bit depth used for inversion (defaults to the frame's).
    #[arg(long)]
    pixbit: Option<u8>,

    /// JSON acquisition config; explicit flags take precedence.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write a JSON report of the run.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace); `RUST_LOG` wins in tracing builds.
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Emit JSON log lines (tracing builds only).
    #[cfg(feature = "tracing")]
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Merge the flags over `cfg`.
    fn apply(&self, cfg: &mut AcquisitionConfig) {
        if let Some(id) = self.camera_ids.first() {
            cfg.camera_id = Some(id.clone());
        }
        if let Some(dir) = &self.image_dir {
            cfg.image_dir = Some(dir.clone());
            cfg.backend = Backend::Images;
        }
        if let Some(backend) = self.backend {
            cfg.backend = backend;
        }
        if let Some(dir) = &self.save_dir {
            cfg.save_dir = dir.clone();
        }
        if let Some(ms) = self.timeout_ms {
            cfg.timeout_ms = ms;
        }
        if self.channel.is_some() {
            cfg.channel = self.channel;
        }
        if self.analyze {
            cfg.analyze = true;
        }
        if let Some(roi) = self.roi.as_deref() {
            cfg.analysis.roi = Some(Roi::new(roi[0], roi[1], roi[2], roi[3]));
        }
        if let Some(p) = self.prominence {
            cfg.analysis.prominence_min = p;
        }
        if self.invert {
            cfg.analysis.invert = true;
        }
        if self.pixbit.is_some() {
            cfg.analysis.pixbit = self.pixbit;
        }
        if self.report.is_some() {
            cfg.report_path = self.report.clone();
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().skip(1).any(|a| a == "/h") {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    }
    let cli = Cli::parse_from(args);

    init_logging(&cli);
    print_preamble();

    if cli.camera_ids.len() > 1 {
        return abort("invalid number of arguments; abort", 2, true);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => abort(&format!("{e}; abort"), 1, false),
    }
}

fn run(cli: &Cli) -> Result<(), BoxError> {
    let mut cfg = match &cli.config {
        Some(path) => AcquisitionConfig::load_json(path)?,
        None => AcquisitionConfig::default(),
    };
    cli.apply(&mut cfg);
    log::debug!("effective config: {cfg:?}");

    if let Some(path) = &cli.analyze_file {
        let (frame, result) = analyze_file(path, &cfg.analysis)?;
        println!("/// loaded {}x{} frame from {}", frame.width, frame.height, path.display());
        print_analysis(&result);
        if let Some(report_path) = &cfg.report_path {
            let report = AcquisitionReport {
                frame_path: Some(path.clone()),
                frame_width: Some(frame.width),
                frame_height: Some(frame.height),
                analysis: Some(result),
                ..AcquisitionReport::new()
            };
            report.write_json(report_path)?;
        }
        return Ok(());
    }

    let system = cfg.build_system()?;
    if cli.list {
        return list_cameras(system.as_ref());
    }

    let opts = cfg.to_options();
    match acquire(system.as_ref(), &opts) {
        Ok(outcome) => {
            print_camera(&outcome.camera);
            println!("pixel format: {}", outcome.pixel_format);
            println!(
                "timestamp: {}",
                outcome.timestamp.format(beam_profile::camera::TIMESTAMP_FORMAT)
            );
            println!("{}", outcome.frame_path.display());
            if let Some(result) = &outcome.analysis {
                print_analysis(result);
            }
            if let Some(report_path) = &cfg.report_path {
                AcquisitionReport::from_outcome(&outcome).write_json(report_path)?;
            }
            Ok(())
        }
        Err(e) => {
            if let Some(report_path) = &cfg.report_path {
                let mut report = AcquisitionReport::new();
                report.set_error(&e);
                if let Err(write_err) = report.write_json(report_path) {
                    log::error!("failed to write report: {write_err}");
                }
            }
            Err(e.into())
        }
    }
}

fn list_cameras(system: &dyn CameraSystem) -> Result<(), BoxError> {
    let cams = system.cameras()?;
    println!("/// ");
    println!("/// found {} camera(s)", cams.len());
    println!("/// ");
    for cam in &cams {
        print_camera(cam);
    }
    Ok(())
}

fn print_analysis(result: &FwhmResult) {
    match (result.fwhm(), result.peak_column()) {
        (Some(fwhm), Some(col)) => {
            println!("FWHM = {fwhm:.3} px (peak at column {col}, ROI {})", result.roi);
            if result.multiple_peaks {
                println!("/// Only the most prominent peak is taken into the FWHM calculation.");
            }
        }
        _ => println!("no peak detected in ROI {}", result.roi),
    }
}

fn print_camera(cam: &CameraInfo) {
    println!("/// Camera Name: {}", cam.name);
    println!("/// Camera ID: {}", cam.id);
    println!("/// Interface ID: {}", cam.interface_id);
}

fn print_preamble() {
    println!("--- --- --- --- --- --- --- ---");
    println!("--- manta-frame ---------------");
    println!("--- --- --- --- --- --- --- ---");
}

fn abort(reason: &str, code: u8, usage: bool) -> ExitCode {
    println!("{reason}\n");
    if usage {
        println!("{}", Cli::command().render_usage());
    }
    ExitCode::from(code)
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) {
    beam_profile::core::init_tracing(cli.json_logs, cli.log_level);
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) {
    if let Err(e) = beam_profile::core::init_with_level(cli.log_level) {
        eprintln!("failed to install logger: {e}");
    }
}
