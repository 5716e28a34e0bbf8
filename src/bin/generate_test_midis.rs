//! Writes the reference MIDI files into a directory
//!
//! `generate-test-midis [--out-dir DIR]`, defaulting to `midi_test_files`.

use clap::Parser;
use mid2seq::fixtures::write_fixtures;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate the reference MIDI test files", long_about = None)]
struct Cli {
    /// Directory to write the files into
    #[arg(short, long, default_value = "midi_test_files")]
    out_dir: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    println!("Generating MIDI test files...");
    match write_fixtures(&cli.out_dir) {
        Ok(paths) => {
            for path in &paths {
                println!("Generated: {}", path.display());
            }
            println!(
                "\nAll test files have been generated in the '{}' folder.",
                cli.out_dir.display()
            );
        }
        Err(e) => {
            eprintln!("Failed to write test files: {}", e);
            std::process::exit(1);
        }
    }
}
