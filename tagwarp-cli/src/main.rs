mod detections;
mod frames;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn, LevelFilter};

use tagwarp::composite::{AnchorIds, Compositor, CornerSelection};
use tagwarp::config::CompositorConfig;
use tagwarp::detection::MarkerDetection;
use tagwarp::dictionary::Dictionary;
use tagwarp::error::ConfigError;
use tagwarp::draw::annotate_marker;
use tagwarp::playback::{SourceQueue, DEFAULT_CAPACITY};

use detections::{load_records, RecordIndex};
use frames::{load_image, save_image};

/// Project an image or video onto four fiducial markers
#[derive(Parser)]
#[command(name = "tagwarp", version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Overlay a source image onto a single photo.
    Overlay {
        /// Photo containing the four anchor markers
        #[arg(short, long)]
        image: PathBuf,
        /// Image to project onto the anchors
        #[arg(short, long)]
        source: PathBuf,
        /// Detections for the photo (apriltag-detect JSON)
        #[arg(short, long)]
        detections: PathBuf,
        /// Anchor ids in TL,TR,BR,BL order
        #[arg(short, long, default_value = "923,1001,241,1007")]
        anchors: String,
        /// Which corner of each anchor bounds the overlay
        #[arg(long, value_enum, default_value_t = Corners::Diagonal)]
        corners: Corners,
        /// Only markers from this dictionary count (name or AprilTag family)
        #[arg(
            short = 't',
            long,
            default_value = "DICT_ARUCO_ORIGINAL",
            value_parser = parse_dictionary
        )]
        dictionary: Dictionary,
        /// Output image
        #[arg(short, long, default_value = "overlay.png")]
        output: PathBuf,
    },
    /// Overlay a source frame sequence onto a camera frame sequence.
    Video {
        /// Camera frames, in order
        #[arg(long, num_args = 1.., required = true)]
        frames: Vec<PathBuf>,
        /// Source video frames, in order
        #[arg(long, num_args = 1.., required = true)]
        source_frames: Vec<PathBuf>,
        /// Detections for the camera frames (apriltag-detect JSON lines)
        #[arg(short, long)]
        detections: PathBuf,
        /// Anchor ids in TL,TR,BR,BL order
        #[arg(short, long, default_value = "923,1001,241,1007")]
        anchors: String,
        /// Only markers from this dictionary count (name or AprilTag family)
        #[arg(
            short = 't',
            long,
            default_value = "DICT_ARUCO_ORIGINAL",
            value_parser = parse_dictionary
        )]
        dictionary: Dictionary,
        /// Compositor settings (TOML); overrides --anchors and --no-cache
        #[arg(long)]
        config: Option<PathBuf>,
        /// Do not reuse the last good reference points
        #[arg(long)]
        no_cache: bool,
        /// Source look-ahead depth
        #[arg(long, default_value_t = DEFAULT_CAPACITY)]
        queue: usize,
        /// Directory for the displayed frames
        #[arg(short, long, default_value = "out")]
        output_dir: PathBuf,
    },
    /// Draw detected markers onto an image.
    Annotate {
        #[arg(short, long)]
        image: PathBuf,
        #[arg(short, long)]
        detections: PathBuf,
        /// Only draw markers from this dictionary (name or AprilTag family)
        #[arg(short = 't', long, value_parser = parse_dictionary)]
        dictionary: Option<Dictionary>,
        #[arg(short, long, default_value = "annotated.png")]
        output: PathBuf,
    },
    /// Count detections per dictionary.
    Survey {
        #[arg(short, long)]
        detections: PathBuf,
    },
    /// List supported dictionary names.
    Dictionaries,
}

#[derive(Clone, Copy, ValueEnum)]
enum Corners {
    Diagonal,
    Inner,
    Outer,
}

impl From<Corners> for CornerSelection {
    fn from(c: Corners) -> Self {
        match c {
            Corners::Diagonal => CornerSelection::Diagonal,
            Corners::Inner => CornerSelection::Inner,
            Corners::Outer => CornerSelection::Outer,
        }
    }
}

fn parse_anchors(s: &str) -> Result<AnchorIds> {
    let ids = s
        .split(',')
        .map(|t| {
            t.trim()
                .parse::<i32>()
                .with_context(|| format!("invalid anchor id: {t}"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(AnchorIds::new(&ids)?)
}

/// Accept a canonical dictionary name or the family label a detector
/// reports, e.g. `DICT_APRILTAG_36h11` or `tag36h11`.
fn parse_dictionary(s: &str) -> Result<Dictionary, ConfigError> {
    Dictionary::for_family(s).map_or_else(|| Dictionary::from_name(s), Ok)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Overlay {
            image,
            source,
            detections,
            anchors,
            corners,
            dictionary,
            output,
        } => {
            let anchors = parse_anchors(&anchors)?;
            run_overlay(
                &image,
                &source,
                &detections,
                anchors,
                dictionary,
                corners,
                &output,
            )
        }
        Command::Video {
            frames,
            source_frames,
            detections,
            anchors,
            dictionary,
            config,
            no_cache,
            queue,
            output_dir,
        } => {
            let config = match config {
                Some(path) => {
                    let text = std::fs::read_to_string(&path).with_context(|| {
                        format!("failed to read config: {}", path.display())
                    })?;
                    CompositorConfig::from_toml_str(&text)?
                }
                None => CompositorConfig {
                    use_cache: !no_cache,
                    ..CompositorConfig::with_anchors(parse_anchors(&anchors)?)
                },
            };
            run_video(
                &frames,
                &source_frames,
                &detections,
                dictionary,
                config,
                queue,
                &output_dir,
            )
        }
        Command::Annotate {
            image,
            detections,
            dictionary,
            output,
        } => run_annotate(&image, &detections, dictionary, &output),
        Command::Survey { detections } => run_survey(&detections),
        Command::Dictionaries => {
            for d in Dictionary::ALL {
                let bits = d.marker_bits();
                println!("{:<20} {bits}x{bits} bits, {} ids", d.name(), d.size());
            }
            Ok(())
        }
    }
}

fn run_overlay(
    image: &Path,
    source: &Path,
    detections: &Path,
    anchors: AnchorIds,
    dictionary: Dictionary,
    corners: Corners,
    output: &Path,
) -> Result<()> {
    let frame = load_image(image)?;
    let source = load_image(source)?;
    let index = RecordIndex::new(load_records(detections)?);
    let record = index
        .get(&image.to_string_lossy())
        .with_context(|| format!("no detections recorded for {}", image.display()))?;
    if (record.image_width, record.image_height) != (frame.width, frame.height) {
        warn!(
            "detections were recorded on a {}x{} image, {} is {}x{}",
            record.image_width,
            record.image_height,
            image.display(),
            frame.width,
            frame.height
        );
    }

    let result = record.to_result(Some(dictionary));
    if result.len() != 4 {
        let known = result.filter_ids(|id| anchors.contains(id)).len();
        eprintln!(
            "missing corners! {} {dictionary} markers detected, {known} of them anchors",
            result.len()
        );
        return Ok(());
    }
    info!("ids {:?}", result.ids());

    let config = CompositorConfig {
        use_cache: false,
        corner_selection: corners.into(),
        ..CompositorConfig::with_anchors(anchors)
    };
    let mut compositor = Compositor::new(config)?;
    match compositor.find_and_warp(&frame, &source, &result) {
        Some(out) => {
            save_image(&out, output)?;
            eprintln!("wrote {}", output.display());
        }
        None => eprintln!(
            "anchor markers {:?} not all found, nothing written",
            anchors.ids()
        ),
    }
    Ok(())
}

fn run_video(
    frames: &[PathBuf],
    source_frames: &[PathBuf],
    detections: &Path,
    dictionary: Dictionary,
    config: CompositorConfig,
    queue: usize,
    output_dir: &Path,
) -> Result<()> {
    let index = RecordIndex::new(load_records(detections)?);
    info!("{} detection records loaded", index.len());
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let sources = source_frames.iter().map_while(|p| match load_image(p) {
        Ok(img) => Some(img),
        Err(e) => {
            warn!("source ends early: {e:#}");
            None
        }
    });
    let mut sources = SourceQueue::new(sources, queue);
    let mut compositor = Compositor::new(config)?;
    info!(
        "anchors {:?} from {dictionary}, cache {}",
        compositor.config().anchors.ids(),
        if compositor.config().use_cache { "on" } else { "off" }
    );

    let (mut overlaid, mut written) = (0usize, 0usize);
    for (i, frame_path) in frames.iter().enumerate() {
        if sources.is_exhausted() {
            info!("source exhausted after {i} camera frames");
            break;
        }
        let Some(source) = sources.current().cloned() else {
            break;
        };

        let frame = load_image(frame_path)?;
        let result = index
            .get(&frame_path.to_string_lossy())
            .map(|r| r.to_result(Some(dictionary)))
            .unwrap_or_default();

        let warped = compositor.find_and_warp(&frame, &source, &result);
        let ok = warped.is_some();
        let shown = warped.unwrap_or(frame);
        save_image(&shown, &output_dir.join(format!("frame_{i:05}.png")))?;
        written += 1;
        if ok {
            overlaid += 1;
        }
        sources.step(ok);
    }

    eprintln!(
        "wrote {written} frames to {} ({overlaid} with overlay)",
        output_dir.display()
    );
    Ok(())
}

fn run_annotate(
    image: &Path,
    detections: &Path,
    dictionary: Option<Dictionary>,
    output: &Path,
) -> Result<()> {
    let mut img = load_image(image)?;
    let index = RecordIndex::new(load_records(detections)?);
    let record = index
        .get(&image.to_string_lossy())
        .with_context(|| format!("no detections recorded for {}", image.display()))?;

    let mut drawn = 0usize;
    for det in &record.detections {
        if dictionary.is_some_and(|d| !d.matches_family(&det.family)) {
            continue;
        }
        info!("hamming {}, margin {:.1}", det.hamming, det.decision_margin);
        let marker = MarkerDetection::new(det.id, det.corners);
        annotate_marker(&mut img, &marker);
        let [cx, cy] = marker.center();
        eprintln!("{} id {} at ({cx:.0}, {cy:.0})", det.family, det.id);
        drawn += 1;
    }

    save_image(&img, output)?;
    eprintln!("{drawn} marker(s) drawn, wrote {}", output.display());
    Ok(())
}

fn run_survey(detections: &Path) -> Result<()> {
    for record in load_records(detections)? {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for det in &record.detections {
            let name = Dictionary::for_family(&det.family)
                .map(|d| d.name().to_string())
                .unwrap_or_else(|| det.family.clone());
            *counts.entry(name).or_default() += 1;
        }
        println!("{}:", record.file);
        if counts.is_empty() {
            println!("  no tags detected");
        }
        for (name, n) in counts {
            println!("  {n} tag(s) detected for dictionary type {name}");
        }
    }
    Ok(())
}
