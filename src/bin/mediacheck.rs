use std::{
    fs::File,
    io::{self, ErrorKind, Read, Write},
    path::{Path, PathBuf},
    thread,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use mediacheck::{
    CheckOptions, Inspector, ReportCollection, Severity, SubtitleChecker, create_pipe,
};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  mediacheck inspect input.mp4\n  mediacheck inspect song.ogg --no-video --json\n  cat input.ts | mediacheck inspect -\n  mediacheck inspect input.mkv --pipe --progress\n  mediacheck subtitle lyrics.ass\n  mediacheck completions zsh > _mediacheck";

/// Chunk size the pipe producer copies with.
const PRODUCER_CHUNK: usize = 64 * 1024;

#[derive(Debug, Parser)]
#[command(
    name = "mediacheck",
    version,
    about = "Validate media containers and subtitle scripts",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (off, error, warn, info, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Inspect a media container.
    #[command(
        about = "Inspect a media container",
        visible_alias = "check",
        after_help = "Examples:\n  mediacheck inspect input.mp4 --json\n  mediacheck inspect - --buffer-size 1048576 < input.mkv"
    )]
    Inspect {
        /// Input media path, or `-` for stdin (forward-only).
        input: String,

        /// Do not require a video stream or a duration (audio-only assets).
        #[arg(long)]
        no_video: bool,

        /// Output the result as machine-readable JSON.
        #[arg(long)]
        json: bool,

        /// Engine read-ahead buffer in bytes (clamped to 4 KiB..=1 MiB).
        #[arg(long)]
        buffer_size: Option<usize>,

        /// Label printed in FFmpeg's stream summary.
        #[arg(long)]
        label: Option<String>,

        /// Feed the file through an OS pipe from a producer thread.
        #[arg(long)]
        pipe: bool,

        /// Show a progress bar for the pipe producer.
        #[arg(long, requires = "pipe")]
        progress: bool,
    },

    /// Extract lyrics from an ASS/SSA subtitle script.
    #[command(about = "Check a subtitle script")]
    Subtitle {
        /// Subtitle script path.
        input: PathBuf,

        /// Output the result as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_log_level(value: &str) -> Option<LevelFilter> {
    match value.to_ascii_lowercase().as_str() {
        "off" | "quiet" => Some(LevelFilter::Off),
        "error" | "fatal" | "panic" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" | "verbose" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = if global.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    if let Some(level) = &global.log_level {
        let parsed = parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
        mediacheck::set_engine_log_level(parsed);
    }

    Ok(())
}

fn print_collection(collection: &ReportCollection, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let summary = collection.summary();
        let payload = json!({
            "passed": summary.passed,
            "duration": summary.duration,
            "messages": summary.messages,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    for report in collection {
        let prefix = format!("{}:", report.severity());
        let prefix = match report.severity() {
            Severity::Error => prefix.red().bold(),
            Severity::Warning => prefix.yellow().bold(),
            Severity::Info => prefix.cyan().bold(),
        };
        println!("{prefix} {}", report.text());
    }
    if collection.passed() {
        println!("{} duration {}s", "passed".green().bold(), collection.duration());
    } else {
        println!("{}", "failed".red().bold());
    }
    Ok(())
}

/// Copy `path` into `writer`, ticking `progress` per chunk.
///
/// A reader that stops early closes the pipe; that is not a producer error.
fn produce(path: &Path, mut writer: impl Write, progress: Option<ProgressBar>) -> io::Result<u64> {
    let mut file = File::open(path)?;
    let mut chunk = vec![0u8; PRODUCER_CHUNK];
    let mut written = 0u64;

    loop {
        let count = match file.read(&mut chunk) {
            Ok(0) => break,
            Ok(count) => count,
            Err(error) if error.kind() == ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };
        match writer.write_all(&chunk[..count]) {
            Ok(()) => {}
            Err(error) if error.kind() == ErrorKind::BrokenPipe => break,
            Err(error) => return Err(error),
        }
        written += count as u64;
        if let Some(progress) = &progress {
            progress.inc(count as u64);
        }
    }

    if let Some(progress) = &progress {
        progress.finish_and_clear();
    }
    Ok(written)
}

fn inspect_through_pipe(
    inspector: &Inspector,
    path: &Path,
    expect_video: bool,
    show_progress: bool,
) -> Result<ReportCollection, Box<dyn std::error::Error>> {
    let (mut reader, writer) = create_pipe()?;

    let progress = if show_progress {
        let length = std::fs::metadata(path)?.len();
        let pb = ProgressBar::new(length);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {bar:40.cyan/blue} {bytes}/{total_bytes} {msg}",
        )?;
        pb.set_style(style.progress_chars("##-"));
        Some(pb)
    } else {
        None
    };

    let source_path = path.to_path_buf();
    let producer = thread::spawn(move || produce(&source_path, writer, progress));

    let collection = inspector.check(reader.as_pull(), expect_video);
    drop(reader);

    let written = producer
        .join()
        .map_err(|_| "pipe producer thread panicked")??;
    log::debug!("Pipe producer wrote {written} bytes");

    Ok(collection?)
}

fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Inspect {
            input,
            no_video,
            json,
            buffer_size,
            label,
            pipe,
            progress,
        } => {
            let mut options = CheckOptions::new();
            if let Some(size) = buffer_size {
                options = options.with_buffer_size(size);
            }
            if let Some(label) = label {
                options = options.with_label(label);
            }
            let inspector = Inspector::with_options(options);
            let expect_video = !no_video;

            let collection = if input == "-" {
                if pipe {
                    return Err("--pipe needs a file input, not stdin".into());
                }
                inspector.check_stream(io::stdin().lock(), expect_video)?
            } else if pipe {
                inspect_through_pipe(&inspector, Path::new(&input), expect_video, progress)?
            } else {
                inspector.check_path(&input, expect_video)?
            };

            print_collection(&collection, json)?;
            Ok(collection.passed())
        }
        Commands::Subtitle { input, json } => {
            let file = File::open(&input)
                .map_err(|error| format!("cannot open {}: {error}", input.display()))?;
            let Some(result) = SubtitleChecker::new().check_source(file)? else {
                return Err(format!("{} is not an ASS/SSA script", input.display()).into());
            };

            if json {
                let payload = json!({
                    "io_error": result.io_error(),
                    "lyrics": result.lyrics(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else if let Some(lyrics) = result.lyrics() {
                println!("{lyrics}");
            } else {
                eprintln!("{} {}", "error:".red().bold(), "unreadable subtitle script");
            }
            Ok(!result.io_error())
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "mediacheck", &mut io::stdout());
            Ok(true)
        }
    }
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("{} {error}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}
