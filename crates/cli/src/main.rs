mod config;
mod session_file;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use framecast_core::pipeline::decompose_video_use_case::DecomposeVideoUseCase;
use framecast_core::pipeline::download_result_use_case::DownloadResultUseCase;
use framecast_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use framecast_core::pipeline::recompose_video_use_case::RecomposeVideoUseCase;
use framecast_core::pipeline::session_results::discard_results;
use framecast_core::pipeline::share_result_use_case::ShareResultUseCase;
use framecast_core::session::session_state::{Screen, ScreenState, SessionState};
use framecast_core::shared::constants::{
    DEFAULT_FRAME_RATE, DEFAULT_SKIP_RATE, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS,
};
use framecast_core::shared::rates::{FrameRate, SkipRate};
use framecast_core::storage::domain::blob_store::BlobStore;
use framecast_core::storage::infrastructure::local_blob_store::LocalBlobStore;
use framecast_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use framecast_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use framecast_core::video::infrastructure::png_codec::PngCodec;

use config::AppConfig;
use session_file::SessionFile;

/// Turn videos into still frames and still frames into videos.
#[derive(Parser)]
#[command(name = "framecast", version)]
struct Cli {
    /// Config file (default: <config dir>/Framecast/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session file (default: <data dir>/Framecast/session.json).
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    /// More log output (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract every Nth frame of a video as PNG stills.
    Decompose {
        /// Input video (mp4, avi or mov).
        video: PathBuf,

        /// Keep frames whose index is a multiple of this (1-100).
        #[arg(long, default_value_t = DEFAULT_SKIP_RATE)]
        skip_rate: u32,
    },
    /// Assemble still images into an mp4, ordered by the number in each name.
    Recompose {
        /// Input images (png, jpg or jpeg).
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Output frames per second (1-100).
        #[arg(long, default_value_t = DEFAULT_FRAME_RATE)]
        frame_rate: u32,
    },
    /// Upload a screen's result to the configured export target.
    Share { screen: ScreenArg },
    /// Save a screen's result: a ZIP of stills or the assembled video.
    Download {
        screen: ScreenArg,

        /// Output file or directory (default: current directory).
        output: Option<PathBuf>,
    },
    /// Show what each screen currently holds.
    Status,
    /// Start a new session, deleting its stored results.
    Reset,
    /// Print the effective configuration.
    Config {
        /// Also write it to the config file.
        #[arg(long)]
        write: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScreenArg {
    Decompose,
    Recompose,
}

impl From<ScreenArg> for Screen {
    fn from(arg: ScreenArg) -> Self {
        match arg {
            ScreenArg::Decompose => Screen::Decompose,
            ScreenArg::Recompose => Screen::Recompose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    validate(&cli)?;

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load_from(&config_path)?;
    let session_file = SessionFile::new(cli.session.clone().unwrap_or_else(SessionFile::default_path));

    match cli.command {
        Command::Decompose { video, skip_rate } => {
            run_decompose(&config, &session_file, &video, SkipRate::new(skip_rate)?)
        }
        Command::Recompose { images, frame_rate } => {
            run_recompose(&config, &session_file, &images, FrameRate::new(frame_rate)?)
        }
        Command::Share { screen } => run_share(&config, &session_file, screen.into()),
        Command::Download { screen, output } => {
            run_download(&config, &session_file, screen.into(), output.as_deref())
        }
        Command::Status => {
            print_status(&session_file.load()?);
            Ok(())
        }
        Command::Reset => {
            let mut session = session_file.load()?;
            discard_results(&mut *open_store(&config)?, &mut session);
            session_file.reset()?;
            println!("Started a new session");
            Ok(())
        }
        Command::Config { write } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if write {
                config.save_to(&config_path)?;
                log::info!("Config written to {}", config_path.display());
            }
            Ok(())
        }
    }
}

fn open_store(config: &AppConfig) -> Result<Box<dyn BlobStore>, Box<dyn std::error::Error>> {
    log::debug!("Blob store at {}", config.store_root.display());
    Ok(Box::new(LocalBlobStore::open(&config.store_root)?))
}

fn run_decompose(
    config: &AppConfig,
    session_file: &SessionFile,
    video: &Path,
    skip_rate: SkipRate,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session_file.load()?;
    let mut logger = StdoutPipelineLogger::default();

    let mut use_case = DecomposeVideoUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(PngCodec::new()),
        open_store(config)?,
        config.conversion.clone(),
    );
    let result = use_case.execute(video, skip_rate, &mut session, &mut logger);
    session_file.save(&session)?;
    let report = result?;

    println!(
        "Extracted {} of {} frames into '{}'",
        report.frames_written, report.frames_seen, report.location.container
    );
    if report.frames_skipped > 0 {
        println!("Skipped {} frames that failed to encode", report.frames_skipped);
    }
    Ok(())
}

fn run_recompose(
    config: &AppConfig,
    session_file: &SessionFile,
    images: &[PathBuf],
    frame_rate: FrameRate,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session_file.load()?;
    let mut logger = StdoutPipelineLogger::default();

    let mut uploads = Vec::with_capacity(images.len());
    for path in images {
        let bytes = fs::read(path)
            .map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
        uploads.push((upload_name(path)?, bytes));
    }

    let mut use_case = RecomposeVideoUseCase::new(
        Box::new(PngCodec::new()),
        Box::new(FfmpegWriter::new()),
        open_store(config)?,
        config.conversion.clone(),
    );
    let result = use_case.execute(uploads, frame_rate, &mut session, &mut logger);
    session_file.save(&session)?;
    let report = result?;

    println!(
        "Assembled {} frames at {frame_rate} fps into {} ({} bytes)",
        report.frames_encoded,
        report.location.blob.as_deref().unwrap_or_default(),
        report.video_bytes
    );
    Ok(())
}

fn run_share(
    config: &AppConfig,
    session_file: &SessionFile,
    screen: Screen,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session_file.load()?;
    session.ready(screen)?;
    let mut logger = StdoutPipelineLogger::default();

    let mut use_case = ShareResultUseCase::new(
        open_store(config)?,
        config.export.build()?,
        config.conversion.clone(),
    );
    let report = use_case.execute(&mut session, screen, &mut logger)?;
    session_file.save(&session)?;

    match &report.folder {
        Some(folder) => println!(
            "Shared {} files into folder {folder}",
            report.files_uploaded
        ),
        None => println!("Shared {} file", report.files_uploaded),
    }
    Ok(())
}

fn run_download(
    config: &AppConfig,
    session_file: &SessionFile,
    screen: Screen,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = session_file.load()?;
    session.ready(screen)?;

    let use_case = DownloadResultUseCase::new(open_store(config)?, config.conversion.clone());
    let download = use_case.execute(&session, screen)?;

    let target = download_target(output, &download.file_name);
    fs::write(&target, &download.bytes)
        .map_err(|e| format!("Cannot write {}: {e}", target.display()))?;
    println!(
        "Saved {} ({}, {} bytes)",
        target.display(),
        download.mime_type,
        download.bytes.len()
    );
    Ok(())
}

fn print_status(session: &SessionState) {
    for &screen in Screen::ALL {
        let state = session.screen(screen);
        match state {
            ScreenState::Idle => println!("{screen}: idle"),
            ScreenState::Processed { result } => {
                println!("{screen}: processed ({})", result.container)
            }
            ScreenState::Exported { result, folder } => match folder {
                Some(folder) => println!(
                    "{screen}: exported ({} -> folder {folder})",
                    result.container
                ),
                None => println!("{screen}: exported ({})", result.container),
            },
        }
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Decompose { video, .. } => {
            if !video.exists() {
                return Err(format!("Input file not found: {}", video.display()).into());
            }
            if !has_extension(video, VIDEO_EXTENSIONS) {
                return Err(format!(
                    "Unsupported video format: {} (expected {})",
                    video.display(),
                    VIDEO_EXTENSIONS.join(", ")
                )
                .into());
            }
        }
        Command::Recompose { images, .. } => {
            for image in images {
                if !image.exists() {
                    return Err(format!("Input file not found: {}", image.display()).into());
                }
                if !has_extension(image, IMAGE_EXTENSIONS) {
                    return Err(format!(
                        "Unsupported image format: {} (expected {})",
                        image.display(),
                        IMAGE_EXTENSIONS.join(", ")
                    )
                    .into());
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allowed.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn upload_name(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| format!("Not a usable file name: {}", path.display()).into())
}

fn download_target(output: Option<&Path>, file_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}
