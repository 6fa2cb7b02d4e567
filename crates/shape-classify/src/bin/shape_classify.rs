//! Interactive shape classification over a sequence of frame images.
//!
//! Each frame is segmented, its regions are described and classified, and
//! the result is printed. Between frames the operator can train the
//! classifier on the largest observed region (`t`) or quit (`q`); label
//! capture blocks the frame loop until a label arrives.

use std::io::{BufRead, Lines, StdinLock, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use shape_classify::{
    mask_from_gray, FrameReport, FrameSummary, Session, SessionConfig, SessionReport,
    SessionState, TrainError,
};

#[derive(Parser, Debug)]
#[command(
    name = "shape-classify",
    about = "Classify foreground objects in frame images against an operator-trained example set",
    version
)]
struct Args {
    /// Frame image files, or a single directory of frames.
    #[arg(required = true)]
    frames: Vec<PathBuf>,

    /// Training store CSV path (created on first training command).
    #[arg(long, default_value = "training_set.csv")]
    store: PathBuf,

    /// JSON session config; overrides --store when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON report of all processed frames.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Classify every frame without prompting for commands.
    #[arg(long)]
    batch: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = shape_classify::core::init_with_level(level);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => SessionConfig::load_json(path)?,
        None => SessionConfig {
            store_path: args.store.clone(),
            ..SessionConfig::default()
        },
    };

    let frames = collect_frames(&args.frames)?;
    let mut session = Session::open(&config.store_path, config.extractor);
    let mut report = SessionReport::new(&config.store_path);

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    for path in &frames {
        if session.state() == SessionState::Exiting {
            break;
        }

        let entry = match process_frame(&mut session, &config, path) {
            Ok(summary) => {
                print_summary(path, &summary);
                FrameReport {
                    path: path.to_string_lossy().into_owned(),
                    observations: summary.observations,
                    error: None,
                }
            }
            Err(err) => {
                // One bad frame never aborts the session.
                log::error!("{}: {err}", path.display());
                FrameReport {
                    path: path.to_string_lossy().into_owned(),
                    observations: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        };
        report.frames.push(entry);

        if !args.batch {
            prompt_commands(&mut session, &mut lines)?;
        }
    }

    report.num_examples = session.store().len();
    if let Some(path) = &args.report {
        report.write_json(path)?;
        println!("report written to {}", path.display());
    }
    Ok(())
}

fn process_frame(
    session: &mut Session,
    config: &SessionConfig,
    path: &Path,
) -> Result<FrameSummary, Box<dyn std::error::Error>> {
    let img = image::ImageReader::open(path)?.decode()?.to_luma8();
    let mask = mask_from_gray(&img, &config.segment);
    Ok(session.process_mask(&mask.view()))
}

fn print_summary(path: &Path, summary: &FrameSummary) {
    println!(
        "{}: {} region(s)",
        path.display(),
        summary.observations.len()
    );
    for (index, observation) in summary.observations.iter().enumerate() {
        let label = observation.label.as_deref().unwrap_or("unclassified");
        match observation.distance {
            Some(distance) => println!(
                "  [{index}] {label} (distance {distance:.6}) at ({:.1}, {:.1}) filled {:.3} hw {:.3}",
                observation.shape.centroid.x,
                observation.shape.centroid.y,
                observation.shape.percent_filled,
                observation.shape.hw_ratio,
            ),
            None => println!(
                "  [{index}] {label} at ({:.1}, {:.1}) filled {:.3} hw {:.3}",
                observation.shape.centroid.x,
                observation.shape.centroid.y,
                observation.shape.percent_filled,
                observation.shape.hw_ratio,
            ),
        }
    }
}

/// Read operator commands between frames. An empty line advances to the
/// next frame; `t` enters the blocking training prompt; `q` exits.
fn prompt_commands(
    session: &mut Session,
    lines: &mut Lines<StdinLock<'_>>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        print!("[enter=next, t=train, q=quit] ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            // stdin closed: treat like quit
            session.request_exit();
            return Ok(());
        };
        match line?.trim() {
            "" => return Ok(()),
            "t" | "train" => train(session, lines)?,
            "q" | "quit" => {
                session.request_exit();
                return Ok(());
            }
            other => println!("unknown command {other:?}"),
        }
    }
}

fn train(
    session: &mut Session,
    lines: &mut Lines<StdinLock<'_>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let selected = match session.begin_training() {
        Ok(selected) => selected,
        Err(TrainError::NothingToLabel) => {
            println!("nothing to label in this frame");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    print!("label for observation {selected}: ");
    std::io::stdout().flush()?;

    let label = match lines.next() {
        Some(line) => line?,
        None => String::new(),
    };
    let label = label.trim();
    if label.is_empty() {
        println!("empty label, cancelled");
        session.cancel_training();
        return Ok(());
    }

    match session.submit_label(label) {
        Ok(()) => println!(
            "saved {label:?} ({} example(s) in store)",
            session.store().len()
        ),
        Err(err) => {
            eprintln!("training failed: {err}");
            session.cancel_training();
        }
    }
    Ok(())
}

fn collect_frames(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut frames = Vec::new();
    if let [single] = inputs {
        if single.is_dir() {
            for entry in std::fs::read_dir(single)? {
                let path = entry?.path();
                if is_frame_image(&path) {
                    frames.push(path);
                }
            }
            frames.sort();
            if frames.is_empty() {
                return Err(format!("no frame images in {}", single.display()).into());
            }
            return Ok(frames);
        }
    }
    frames.extend(inputs.iter().cloned());
    Ok(frames)
}

fn is_frame_image(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("png" | "jpg" | "jpeg" | "bmp" | "pgm")
    )
}
