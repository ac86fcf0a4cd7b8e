use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

use yurei_filter::config::RunnerConfig;
use yurei_filter::monitor::{classify, parse_log_document};
use yurei_filter::runner::Runner;
use yurei_filter::source::PayloadSource;

#[derive(Parser)]
#[command(
    name = "yurei",
    version,
    about = "Replay the YUREI instruction filter locally and read its logs."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: ~/.yurei/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a payload through the filter. Exit code is the filter status
    /// (0 accepted, 1 rejected) or 2 when the invocation aborts.
    #[command(group(ArgGroup::new("source").args(["hex", "base64", "file"])))]
    Scan {
        /// Payload as hex digits
        #[arg(long)]
        hex: Option<String>,

        /// Payload as base64
        #[arg(long)]
        base64: Option<String>,

        /// Read the payload from a file (stdin when no source is given)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Treat the input as a serialized program input region
        #[arg(long, default_value_t = false)]
        region: bool,

        /// Override the payload ceiling from the config
        #[arg(long)]
        max_payload: Option<usize>,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Classify a captured transaction log
    Classify {
        /// JSON log document (`-` for stdin)
        logs: PathBuf,

        /// Program id to attribute (default: from config, else the first
        /// frame that rejected or failed)
        #[arg(short, long)]
        program_id: Option<String>,

        /// Print the classification as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("YUREI_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = RunnerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Scan {
            hex,
            base64,
            file,
            region,
            max_payload,
            json,
        } => {
            if let Some(limit) = max_payload {
                config.max_payload_len = limit;
                config.validate()?;
            }
            let source = match (hex, base64, file) {
                (Some(text), _, _) => PayloadSource::Hex(text),
                (_, Some(text), _) => PayloadSource::Base64(text),
                (_, _, Some(path)) => PayloadSource::File(path),
                _ => PayloadSource::Stdin,
            };
            let input = source.read()?;

            let runner = Runner::new(config);
            let report = if region {
                runner.run_region(&input)
            } else {
                runner.run(&input)
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
            Ok(ExitCode::from(report.process_exit_code() as u8))
        }
        Command::Classify {
            logs,
            program_id,
            json,
        } => {
            let text = if logs.as_os_str() == "-" {
                std::io::read_to_string(std::io::stdin()).context("failed to read logs from stdin")?
            } else {
                std::fs::read_to_string(&logs)
                    .with_context(|| format!("failed to read {}", logs.display()))?
            };
            let lines = parse_log_document(&text)?;
            let program_id = program_id.or(config.program_id);
            let classification = classify(&lines, program_id.as_deref());

            if json {
                println!("{}", serde_json::to_string_pretty(&classification)?);
            } else {
                print!("{}", classification.render());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
