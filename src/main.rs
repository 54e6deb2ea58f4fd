#![warn(unused_extern_crates)]
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, ValueEnum};
use facemark::detection::fixed::FixedDetector;
#[cfg(feature = "rustface")]
use facemark::detection::seeta::SeetaDetector;
use facemark::export::timestamped_label;
use facemark::render::REFERENCE_WIDTH;
use facemark::{Completion, DetectedFace, DetectionClient, DirectorySink, OverlayStyle, Session};
use std::path::PathBuf;
use tracing::{Level, info, span, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Outline and label every face
    Overlay,
    /// Paint every face solid black
    Redact,
    /// Print the smile probability of every face
    Report,
    /// Keep the image as loaded
    Original,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct CmdArgs {
    /// Image to detect faces on
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// What to show once faces are detected
    #[arg(short, long, value_enum, default_value_t = Mode::Overlay)]
    mode: Mode,

    /// Face box as LEFT,TOP,RIGHT,BOTTOM[,SMILE]. Repeat for more faces
    #[arg(short, long = "face", value_name = "BOX")]
    faces: Vec<DetectedFace>,

    /// SeetaFace model file to detect faces with
    #[cfg(feature = "rustface")]
    #[arg(long, value_name = "FILE", conflicts_with = "faces")]
    model: Option<PathBuf>,

    /// Smallest face, in pixels, the SeetaFace model looks for (at least 20)
    #[cfg(feature = "rustface")]
    #[arg(long, default_value_t = 20, requires = "model")]
    min_face_size: u32,

    /// SeetaFace score a window needs to count as a face
    #[cfg(feature = "rustface")]
    #[arg(long, default_value_t = 2.0, requires = "model")]
    score_thresh: f64,

    /// Image width at which box stroke and label size apply unscaled
    #[arg(long, default_value_t = REFERENCE_WIDTH)]
    reference_width: f32,

    #[command(flatten)]
    out: Out,
}

#[derive(Args, Debug)]
#[group(multiple = false)]
struct Out {
    /// Write the displayed image to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Save the displayed image into this directory as face_result_<millis>.png
    #[arg(short = 'd', long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::from_default_env();
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_env_filter(filter)
        .init();

    let args = CmdArgs::parse();

    let img = image::open(&args.input)
        .with_context(|| format!("failed to decode {}", args.input.display()))?
        .into_rgba8();
    let style = OverlayStyle {
        reference_width: args.reference_width,
        ..OverlayStyle::default()
    };
    let mut session = Session::new(detection_client(&args)?, img)?.with_overlay_style(style);

    let span = span!(Level::INFO, "detect");
    let guard = span.enter();
    match pollster::block_on(session.detect())? {
        Completion::Applied(result) => info!("Found {} faces", result.faces().len()),
        Completion::Discarded => bail!("detection result was discarded"),
    }
    drop(guard);

    match args.mode {
        Mode::Overlay => {}
        Mode::Redact => {
            session.apply_redaction()?;
        }
        Mode::Original => session.reset(),
        Mode::Report => {
            let lines = session.report()?;
            if lines.is_empty() {
                println!("No faces detected");
            }
            for line in lines {
                println!("{line}");
            }
        }
    }

    if let Some(path) = args.out.output {
        session
            .current()
            .pixels()
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Result at {:?}", path);
    } else if let Some(dir) = args.out.output_dir {
        session.save_current(&DirectorySink::new(dir), &timestamped_label("face_result"))?;
    }

    Ok(())
}

fn detection_client(args: &CmdArgs) -> Result<DetectionClient> {
    #[cfg(feature = "rustface")]
    if let Some(model) = &args.model {
        let detector = SeetaDetector::from_file(model)?
            .min_face_size(args.min_face_size)
            .score_thresh(args.score_thresh);
        return Ok(DetectionClient::new(detector));
    }

    if args.faces.is_empty() {
        warn!("No face boxes given, nothing will be detected");
    }
    Ok(DetectionClient::new(FixedDetector::new(args.faces.clone())))
}
