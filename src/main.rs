use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use rfaudio::{CanPlayType, Scenario};

#[derive(Parser)]
#[command(name = "rfaudio", version, about = "Replay native audio callbacks through a media-element adapter")]
struct Cli {
    /// Log adapter transitions (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a JSON scenario and print the event trace
    Replay {
        /// Scenario file, or `-` for stdin
        file: PathBuf,
        /// Print one pretty JSON report instead of JSON lines
        #[arg(long)]
        pretty: bool,
    },
    /// Print the canPlayType answer for a MIME type
    CanPlayType { mime: String },
}

fn replay(file: &Path, pretty: bool) -> anyhow::Result<()> {
    let scenario = if file.as_os_str() == "-" {
        Scenario::from_reader(io::stdin().lock()).context("failed to parse scenario from stdin")?
    } else {
        let f = File::open(file).with_context(|| format!("failed to open {}", file.display()))?;
        Scenario::from_reader(BufReader::new(f))
            .with_context(|| format!("failed to parse scenario {}", file.display()))?
    };
    let report = scenario.run().context("scenario run failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if pretty {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        for entry in &report.trace {
            writeln!(out, "{}", serde_json::to_string(entry)?)?;
        }
        writeln!(out, "{}", serde_json::to_string(&report.final_state)?)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match &cli.command {
        Command::Replay { file, pretty } => replay(file, *pretty),
        Command::CanPlayType { mime } => {
            println!("{:?}", CanPlayType::for_mime(mime).as_str());
            Ok(())
        }
    }
}
