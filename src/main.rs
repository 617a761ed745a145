// Main entry point for the ddx client

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use ddx::backend::local::LocalConnector;
use ddx::common::config::TransferConfig;
use ddx::pipeline::{FileSpec, SessionReport, TransferPipeline};
use ddx::remote::{RemoteSession, StoreKeys};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "ddx")]
#[command(about = "Checksum-verified upload/download client for a data-delivery store", long_about = None)]
struct Cli {
    /// Store endpoint (root directory of the local store)
    #[arg(long, default_value = "./ddx_store")]
    endpoint: String,

    /// Store access key
    #[arg(long, default_value = "local")]
    access_key: String,

    /// Store secret key
    #[arg(long, default_value = "local")]
    secret_key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files to the store and register them in the catalog
    Put {
        /// Files to upload
        files: Vec<PathBuf>,

        /// Cancel all not-yet-started files when one file fails
        #[arg(long)]
        break_on_fail: bool,
    },

    /// Download files from the store by catalog key
    Get {
        /// Catalog keys to download
        keys: Vec<String>,

        /// Destination directory (default: ./downloads)
        #[arg(long, default_value = "./downloads")]
        destination: PathBuf,

        /// Verify the SHA-256 digest of each downloaded file
        #[arg(long)]
        verify: bool,

        /// Cancel all not-yet-started files when one file fails
        #[arg(long)]
        break_on_fail: bool,
    },
}

fn file_progress(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

fn print_report(report: &SessionReport) {
    println!(
        "\n{}/{} file(s) completed",
        report.delivered(),
        report.files.len()
    );
    for failure in report.failed() {
        match failure.failed_op {
            Some(op) => eprintln!("  ✗ {} [{}]: {}", failure.key, op, failure.message),
            None => eprintln!("  ✗ {}: {}", failure.key, failure.message),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let keys = StoreKeys {
        access_key: cli.access_key,
        secret_key: cli.secret_key,
    };
    let mut remote = RemoteSession::new(LocalConnector, cli.endpoint, keys);

    let report = match cli.command {
        Commands::Put {
            files,
            break_on_fail,
        } => {
            if files.is_empty() {
                eprintln!("No files to upload");
                return Ok(());
            }

            let specs: Vec<FileSpec> = files
                .iter()
                .map(|path| {
                    let key = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.to_string_lossy().into_owned());
                    FileSpec::new(&key, path.clone())
                })
                .collect();

            let config = TransferConfig::new().with_break_on_fail(break_on_fail);
            let pipeline = TransferPipeline::new(config);

            remote.with_connection(|store| {
                pipeline.register_uploads(&specs);
                let bar = file_progress(specs.len() as u64);
                for spec in &specs {
                    bar.set_message(spec.key.clone());
                    pipeline.upload_one(store, spec);
                    bar.inc(1);
                }
                bar.finish_and_clear();
                pipeline.report(&specs)
            })
        }

        Commands::Get {
            keys,
            destination,
            verify,
            break_on_fail,
        } => {
            if keys.is_empty() {
                eprintln!("No keys to download");
                return Ok(());
            }

            let specs: Vec<FileSpec> = keys
                .iter()
                .map(|key| {
                    // Keys with '/' land in matching subdirectories below
                    // the destination root.
                    let path = PathBuf::from(key);
                    let name = path
                        .file_name()
                        .map(PathBuf::from)
                        .unwrap_or_else(|| path.clone());
                    let subpath = path.parent().map(PathBuf::from).unwrap_or_default();
                    FileSpec::new(key, name).with_subpath(subpath)
                })
                .collect();

            let config = TransferConfig::new()
                .with_destination(destination)
                .with_break_on_fail(break_on_fail)
                .with_verify_checksum(verify);
            let pipeline = TransferPipeline::new(config);

            remote.with_connection(|store| {
                pipeline.register_downloads(&specs);
                let bar = file_progress(specs.len() as u64);
                for spec in &specs {
                    bar.set_message(spec.key.clone());
                    pipeline.download_one(store, spec);
                    bar.inc(1);
                }
                bar.finish_and_clear();
                pipeline.report(&specs)
            })
        }
    };

    match report {
        Some(report) => {
            print_report(&report);
            if !report.all_ok() {
                std::process::exit(1);
            }
            Ok(())
        }
        None => Err(remote.message().to_string().into()),
    }
}
