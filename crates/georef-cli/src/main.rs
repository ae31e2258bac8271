use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use georef_core::{ImageInfo, ImagePt, RealPt};
use georef_linear::{AffineTransform, PointResidual, ResidualSummary};
use georef_pipeline::{GeorefConfig, GeorefSession};
use log::{info, warn};
use serde::Serialize;

/// Affine georeferencing of raster images from three reference points.
#[derive(Debug, Parser)]
#[command(author, version, about = "Image <-> real-world coordinate conversion")]
struct Cli {
    /// Optional path to JSON GeorefConfig. Defaults are used if omitted.
    #[arg(long, global = true)]
    config: Option<String>,

    /// Image the points were picked on; its dimensions are recorded and
    /// points outside it are reported.
    #[arg(long, global = true)]
    image: Option<String>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the transform coefficients and per-point residuals.
    Info(PointsArg),
    /// Convert an image pixel to real-world coordinates.
    ToReal(ConvertArgs),
    /// Convert a real-world coordinate to image pixels.
    ToImage(ConvertArgs),
    /// Write selected reference points as CSV.
    Export(ExportArgs),
}

#[derive(Debug, Args)]
struct PointsArg {
    /// CSV file with reference points.
    #[arg(long)]
    points: String,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    #[command(flatten)]
    points: PointsArg,
    #[arg(allow_negative_numbers = true)]
    x: f64,
    #[arg(allow_negative_numbers = true)]
    y: f64,
}

#[derive(Debug, Args)]
struct ExportArgs {
    #[command(flatten)]
    points: PointsArg,

    /// Comma-separated point indices (0-based). All points if omitted.
    #[arg(long, value_delimiter = ',')]
    select: Option<Vec<usize>>,

    /// Output file. Writes to stdout if omitted.
    #[arg(long)]
    out: Option<String>,
}

#[derive(Debug, Serialize)]
struct InfoReport {
    points: usize,
    image: Option<ImageInfo>,
    status: String,
    transform: Option<AffineTransform>,
    residuals: Vec<PointResidual>,
    summary: Option<ResidualSummary>,
}

#[derive(Debug, Serialize)]
struct Conversion {
    image: ImagePt,
    real: RealPt,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(value)
}

fn load_session(cli: &Cli, points_path: &str) -> Result<GeorefSession> {
    let config = if let Some(cfg_path) = cli.config.as_deref() {
        load_json_file::<GeorefConfig>(Path::new(cfg_path))?
    } else {
        GeorefConfig::default()
    };
    let mut session = GeorefSession::with_config(config)?;

    if let Some(image_path) = cli.image.as_deref() {
        let (width, height) = image::image_dimensions(image_path)
            .with_context(|| format!("failed to read image {}", image_path))?;
        session.set_image(ImageInfo::with_source(width, height, image_path));
    }

    let file = fs::File::open(points_path)
        .with_context(|| format!("failed to open {}", points_path))?;
    let report = session.import_csv(file)?;
    if !report.skipped_lines.is_empty() {
        warn!(
            "{}: skipped lines {:?}",
            points_path, report.skipped_lines
        );
    }
    info!("{} reference points loaded", session.points().len());
    Ok(session)
}

fn run_info(cli: &Cli, args: &PointsArg) -> Result<String> {
    let session = load_session(cli, &args.points)?;
    let report = match session.transform() {
        Ok(t) => {
            let residuals = session.residuals()?;
            InfoReport {
                points: session.points().len(),
                image: session.image().cloned(),
                status: "ok".to_string(),
                transform: Some(t),
                summary: Some(ResidualSummary::from_residuals(&residuals)),
                residuals,
            }
        }
        Err(err) => InfoReport {
            points: session.points().len(),
            image: session.image().cloned(),
            status: err.to_string(),
            transform: None,
            residuals: Vec::new(),
            summary: None,
        },
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn run_to_real(cli: &Cli, args: &ConvertArgs) -> Result<String> {
    let session = load_session(cli, &args.points.points)?;
    let t = session.transform()?;
    let image = ImagePt::new(args.x, args.y);
    let conversion = Conversion {
        image,
        real: t.image_to_real(image),
    };
    Ok(serde_json::to_string_pretty(&conversion)?)
}

fn run_to_image(cli: &Cli, args: &ConvertArgs) -> Result<String> {
    let session = load_session(cli, &args.points.points)?;
    let t = session.transform()?;
    let real = RealPt::new(args.x, args.y);
    let conversion = Conversion {
        image: t.real_to_image(real),
        real,
    };
    Ok(serde_json::to_string_pretty(&conversion)?)
}

fn run_export(cli: &Cli, args: &ExportArgs) -> Result<String> {
    let session = load_session(cli, &args.points.points)?;
    let indices: Vec<usize> = match &args.select {
        Some(sel) => sel.clone(),
        None => (0..session.points().len()).collect(),
    };

    match args.out.as_deref() {
        Some(out) => {
            let file =
                fs::File::create(out).with_context(|| format!("failed to create {}", out))?;
            let rows = session.export_csv_indices(file, indices)?;
            Ok(format!("wrote {} rows to {}", rows, out))
        }
        None => {
            let mut buf = Vec::new();
            session.export_csv_indices(&mut buf, indices)?;
            Ok(String::from_utf8(buf)?.trim_end().to_string())
        }
    }
}

fn run(cli: &Cli) -> Result<String> {
    match &cli.command {
        Command::Info(args) => run_info(cli, args),
        Command::ToReal(args) => run_to_real(cli, args),
        Command::ToImage(args) => run_to_image(cli, args),
        Command::Export(args) => run_export(cli, args),
    }
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    match run(&cli) {
        Ok(output) => println!("{}", output),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
