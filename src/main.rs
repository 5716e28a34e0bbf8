//! mid2seq command line
//!
//! `mid2seq <input.mid> <output.seq>` converts a format-0 MIDI file into a
//! SEQ bank. Any failure prints a diagnostic and exits with status 1.

use clap::error::ErrorKind;
use clap::Parser;
use mid2seq::{convert_file, disassemble, ConversionError, ConversionSettings, InspectError};
use std::path::PathBuf;
use std::process;
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("Failed to disassemble SEQ: {0}")]
    Inspect(#[from] InspectError),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Format-0 MIDI file to convert
    input: PathBuf,

    /// SEQ file to write
    output: PathBuf,

    /// Resolution to write instead of the MIDI division
    #[arg(short, long, value_name = "TICKS")]
    resolution: Option<u16>,

    /// Print the conversion report as JSON
    #[arg(long)]
    report: bool,

    /// Print a disassembly of the written SEQ bank as JSON
    #[arg(long)]
    dump: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(1);
        }
    };

    if let Err(e) = run(&cli) {
        eprintln!("{}", e);
        process::exit(1);
    }

    println!("Conversion complete.");
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let settings = ConversionSettings {
        resolution: cli.resolution,
        ..Default::default()
    };

    log::info!("Converting {} -> {}", cli.input.display(), cli.output.display());
    let result = convert_file(&cli.input, &cli.output, &settings)?;

    if cli.report {
        println!("{}", serde_json::to_string_pretty(&result.report)?);
    }

    if cli.dump {
        let dump = disassemble(&result.seq)?;
        println!("{}", serde_json::to_string_pretty(&dump)?);
    }

    Ok(())
}
