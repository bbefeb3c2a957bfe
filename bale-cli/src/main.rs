//! Bale CLI - single-file Huffman archiver.
//!
//! Failures are reported on stderr; the process exit code is always 0.

use bale_archive::{AddSource, Archive, BatchReport, Selection};
use bale_core::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bale")]
#[command(author, version, about = "Single-file Huffman archiver")]
#[command(long_about = "
Bale packs files into one archive, compressing each independently with a
Huffman code built for that file.

Examples:
  bale add backup.bale notes.txt todo.txt
  bale extract backup.bale
  bale extract backup.bale notes.txt -o restored/
  bale remove backup.bale todo.txt
  bale remove backup.bale --all
  bale test backup.bale
  bale list backup.bale --json
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add files to an archive, creating the archive if it does not exist
    #[command(alias = "a")]
    Add {
        /// Archive file to add to
        archive: PathBuf,

        /// Files to compress into the archive
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Extract files from an archive (all of them if no names are given)
    #[command(alias = "x")]
    Extract {
        /// Archive file to extract from
        archive: PathBuf,

        /// Entry names to extract (all if empty)
        files: Vec<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Remove files from an archive
    #[command(alias = "d")]
    Remove {
        /// Archive file to remove from
        archive: PathBuf,

        /// Entry names to remove
        files: Vec<String>,

        /// Remove every entry
        #[arg(long)]
        all: bool,
    },

    /// Test archive integrity
    #[command(alias = "t")]
    Test {
        /// Archive file to check
        archive: PathBuf,
    },

    /// List archive contents
    #[command(alias = "l")]
    List {
        /// Archive file to inspect
        archive: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct EntryInfo<'a> {
    name: &'a str,
    original_size: u32,
    compressed_size: u32,
    savings_percent: u32,
    add_time: u64,
}

#[derive(Serialize)]
struct ArchiveInfo<'a> {
    archive: String,
    checksum: String,
    file_count: usize,
    entries: Vec<EntryInfo<'a>>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Usage and parse problems go through clap's own printer; the exit
    // code stays 0 either way, errors are carried by stderr text only.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return;
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("bale: {err}");
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Add { archive, files } => {
            let mut arch = open_archive(&archive)?;
            let sources: Vec<AddSource> = files.into_iter().map(AddSource::from_path).collect();
            let report = arch.append(&sources)?;
            print_report(&report, "added");
            println!("\tFiles added: {}", report.completed_count());
        }
        Commands::Extract {
            archive,
            files,
            output,
        } => {
            let mut arch = open_archive(&archive)?;
            let selection = if files.is_empty() {
                Selection::All
            } else {
                Selection::Names(&files)
            };
            let report = arch.extract(selection, &output)?;
            print_report(&report, "extracted");
            println!("\tFiles extracted: {}", report.completed_count());
        }
        Commands::Remove {
            archive,
            files,
            all,
        } => {
            if !all && files.is_empty() {
                eprintln!("bale: remove needs entry names or --all");
                return Ok(());
            }
            let mut arch = open_archive(&archive)?;
            let selection = if all {
                Selection::All
            } else {
                Selection::Names(&files)
            };
            let report = arch.remove(selection)?;
            print_report(&report, "deleted");
            println!("\tFiles removed: {}", report.completed_count());
        }
        Commands::Test { archive } => {
            // Opening validates the magic and checksum already; verify()
            // re-reads the file so repeated checks stay meaningful.
            let mut arch = open_archive(&archive)?;
            if arch.verify()? {
                println!("\tThe archive <<{}>> is OK!", archive.display());
            } else {
                eprintln!("\tThe archive <<{}>> is corrupted!", archive.display());
            }
        }
        Commands::List { archive, json } => {
            let mut arch = open_archive(&archive)?;
            let header = arch.describe()?;
            if json {
                let info = ArchiveInfo {
                    archive: archive.display().to_string(),
                    checksum: format!("{:#010x}", header.checksum),
                    file_count: header.entries.len(),
                    entries: header
                        .entries
                        .iter()
                        .map(|e| EntryInfo {
                            name: &e.name,
                            original_size: e.original_size,
                            compressed_size: e.compressed_size,
                            savings_percent: e.space_savings(),
                            add_time: e.add_time,
                        })
                        .collect(),
                };
                println!(
                    "{}",
                    serde_json::to_string_pretty(&info).expect("info serializes")
                );
            } else {
                println!("\n\t>>Archive name: <<{}>>", archive.display());
                println!("\n\t>>Checksum: {:#010X}", header.checksum);
                println!("\n\t>>Number of files: {}", header.entries.len());
                if !header.entries.is_empty() {
                    println!("\n\t\t***File list***\n");
                }
                for entry in &header.entries {
                    println!("\t<<{}>>", entry.name);
                    println!("\t*File size: {} bytes", entry.original_size);
                    println!("\t*Compressed file size: {} bytes", entry.compressed_size);
                    println!("\t*Compression: {}%", entry.space_savings());
                    println!("\t*Add time: {}\n", entry.add_time);
                }
            }
        }
    }
    Ok(())
}

fn open_archive(path: &Path) -> Result<Archive> {
    if !path.exists() {
        println!(
            "\tThe file <<{}>> does not exist. Creating...",
            path.display()
        );
    }
    Archive::open(path)
}

fn print_report(report: &BatchReport, verb: &str) {
    for name in &report.completed {
        println!("\t<<{name}>>: {verb}!");
    }
    for skip in &report.skipped {
        eprintln!("\t<<{}>>: {}", skip.name, skip.reason);
    }
}
