//! rescleaner CLI - forum export cleaning tool
//!
//! A command-line tool for cleaning anchor-numbered forum exports into
//! normalized two-column CSV files.

mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use logging::LogLevel;
use rescleaner::{BundleMode, CleanOptions, CleanReport, CsvPipeline, ResCleaner};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Forum export cleaning to normalized CSV
#[derive(Parser)]
#[command(
    name = "rescleaner",
    version,
    about = "Clean forum thread exports into normalized CSV",
    long_about = "rescleaner - forum thread export cleaner.\n\n\
                  Reads a CSV export with レス番号/内容 columns in UTF-8, Shift_JIS,\n\
                  CP932 or EUC-JP and writes a BOM-prefixed UTF-8 CSV with cleaned posts.\n\n\
                  Usage:\n  \
                  rescleaner <input> <output>           Clean one file\n  \
                  rescleaner text <string>              Clean one string\n  \
                  rescleaner batch <inputs>... -o <zip> Clean several files into a ZIP"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input CSV path (for default cleaning)
    #[arg(global = false)]
    input: Option<PathBuf>,

    /// Output CSV path (for default cleaning)
    #[arg(global = false)]
    output: Option<PathBuf>,

    /// Face-mark table (JSON object of pattern to token)
    #[arg(long, global = true)]
    face_config: Option<PathBuf>,

    /// Log verbosity; debug and trace also write rescleaner_debug.log
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,

    /// Cleaning preset
    #[arg(long, global = true, default_value = "standard")]
    mode: CleanMode,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a CSV export (default command)
    Clean {
        /// Input CSV path
        input: PathBuf,

        /// Output CSV path
        output: PathBuf,
    },

    /// Clean a single string and print it
    Text {
        /// Text to clean
        text: String,
    },

    /// Clean several exports into one ZIP archive
    Batch {
        /// Input CSV paths
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Archive path
        #[arg(short, long)]
        output: PathBuf,

        /// Concatenate all rows into one CSV entry
        #[arg(long)]
        merge: bool,
    },

    /// List the active face-mark table
    Faces,

    /// Show version information
    Version,
}

/// Cleaning preset
#[derive(Clone, Copy, ValueEnum)]
enum CleanMode {
    /// Every cleaning step (default)
    Standard,
    /// Width folding and whitespace only
    Minimal,
}

impl From<CleanMode> for CleanOptions {
    fn from(mode: CleanMode) -> Self {
        match mode {
            CleanMode::Standard => CleanOptions::default(),
            CleanMode::Minimal => CleanOptions::minimal(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_guard = match logging::init_logging(cli.log_level) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}: {}", "Warning".yellow().bold(), e);
            None
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        drop(log_guard);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = build_pipeline(&cli);

    let Some(command) = cli.command else {
        // Default command (rescleaner <input> <output>)
        return match (cli.input, cli.output) {
            (Some(input), Some(output)) => run_clean(&pipeline, &input, &output, cli.json),
            (Some(_), None) => Err("missing <OUTPUT> path".into()),
            _ => {
                use clap::CommandFactory;
                Cli::command().print_help()?;
                Ok(())
            }
        };
    };

    match command {
        Commands::Clean { input, output } => {
            run_clean(&pipeline, &input, &output, cli.json)?;
        }

        Commands::Text { text } => {
            println!("{}", pipeline.cleaner().try_clean(&text)?);
        }

        Commands::Batch {
            inputs,
            output,
            merge,
        } => {
            info!(files = inputs.len(), archive = %output.display(), merge, "Starting batch");
            let mode = if merge {
                BundleMode::Merged
            } else {
                BundleMode::Separate
            };

            let pb = create_spinner(&format!("Cleaning {} files...", inputs.len()));
            let report = rescleaner::clean_batch(&pipeline, &inputs[..], &output, mode);
            pb.finish_and_clear();
            let report = report?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", "Batch Complete".green().bold());
                println!("{}", "─".repeat(40));
                println!("{}: {}", "Archive".bold(), report.archive.display());
                for entry in &report.entries {
                    println!("  {} {}", "✓".green(), entry);
                }
                for failure in &report.failures {
                    println!(
                        "  {} {}: {}",
                        "✗".red(),
                        failure.input.display(),
                        failure.message
                    );
                }
                println!("{}: {}", "Rows written".bold(), report.rows_written);
            }
        }

        Commands::Faces => {
            let table = pipeline.cleaner().face_marks();
            if cli.json {
                let map: serde_json::Map<String, serde_json::Value> = table
                    .iter()
                    .map(|mark| (mark.pattern().to_string(), mark.token().into()))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else {
                println!("{}", "Face Marks".cyan().bold());
                println!("{}", "─".repeat(40));
                for mark in table.iter() {
                    println!("{} → {}", mark.pattern(), mark.token().bold());
                }
                println!("{}: {}", "Entries".bold(), table.len());
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn build_pipeline(cli: &Cli) -> CsvPipeline {
    let mut builder = ResCleaner::new().with_options(cli.mode.into());
    if let Some(ref path) = cli.face_config {
        info!(path = %path.display(), "Face config path");
        builder = builder.with_face_config(path.clone());
    }
    let pipeline = builder.build();
    debug!(
        face_marks = pipeline.cleaner().face_marks().len(),
        minimal = pipeline.cleaner().options().is_minimal(),
        "Pipeline ready"
    );
    pipeline
}

/// Run the clean command with a row progress bar
fn run_clean(
    pipeline: &CsvPipeline,
    input: &Path,
    output: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_progress_bar();

    let result = pipeline.run_with_progress(input, output, |done, total| {
        if pb.length() != Some(total as u64) {
            pb.set_length(total as u64);
        }
        pb.set_position(done as u64);
    });
    pb.finish_and_clear();
    let report = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn print_summary(report: &CleanReport) {
    println!("{}", "Cleaning Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Input".bold(), report.input.display());
    println!("{}: {}", "Output".bold(), report.output.display());
    println!("{}: {}", "Encoding".bold(), report.encoding);

    println!("\n{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Rows read".bold(), report.stats.rows_read);
    println!(
        "{}: {}",
        "Header rows dropped".bold(),
        report.stats.header_rows_dropped
    );
    println!(
        "{}: {}",
        "Incomplete rows dropped".bold(),
        report.stats.incomplete_rows_dropped
    );
    println!(
        "{}: {}",
        "Duplicates dropped".bold(),
        report.stats.duplicate_rows_dropped
    );
    println!("{}: {}", "Rows written".bold(), report.rows_written);
    println!("{}: {} ms", "Elapsed".bold(), report.elapsed_ms);
}

fn print_version() {
    println!("{} {}", "rescleaner".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Forum thread export cleaner");
    println!();
    println!("Input encodings: UTF-8, Shift_JIS, CP932, EUC-JP");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.blue} [{bar:40.cyan/blue}] {pos}/{len} rows")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_args() {
        let cli = Cli::try_parse_from(["rescleaner", "in.csv", "out.csv"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.input, Some(PathBuf::from("in.csv")));
        assert_eq!(cli.output, Some(PathBuf::from("out.csv")));
        assert_eq!(cli.log_level, LogLevel::Info);
    }

    #[test]
    fn test_batch_args() {
        let cli = Cli::try_parse_from([
            "rescleaner", "batch", "a.csv", "b.csv", "-o", "out.zip", "--merge",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Batch {
                inputs,
                output,
                merge,
            }) => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(output, PathBuf::from("out.zip"));
                assert!(merge);
            }
            _ => panic!("expected batch command"),
        }
    }

    #[test]
    fn test_face_config_flag_loads_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("faces.json");
        std::fs::write(&config, r#"{"orz": "[FACE_ORZ]"}"#).unwrap();

        let config_arg = config.to_str().unwrap();
        let cli =
            Cli::try_parse_from(["rescleaner", "--face-config", config_arg, "text", "orz"]).unwrap();
        let pipeline = build_pipeline(&cli);
        assert_eq!(pipeline.cleaner().face_marks().len(), 1);
        assert_eq!(pipeline.cleaner().clean("もうだめorz"), "もうだめ[FACE_ORZ]");
    }

    #[test]
    fn test_minimal_mode_maps_to_options() {
        let options: CleanOptions = CleanMode::Minimal.into();
        assert!(options.is_minimal());
    }

    #[test]
    fn test_run_clean_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "レス番号,内容\n1,ｱｲｳ\n").unwrap();

        run_clean(&CsvPipeline::default(), &input, &output, true).unwrap();
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "\u{FEFF}レス番号,内容\n1,アイウ\n"
        );
    }
}
