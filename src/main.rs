use clap::{Parser, Subcommand};
use photoproof::config::Config;
use photoproof::geocode::{NominatimGeocoder, ReverseGeocoder};
use photoproof::history::HistoryStore;
use photoproof::{check, decode, output};
use std::path::PathBuf;
use std::time::Duration;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "photoproof")]
#[command(about = "Photo authenticity checks from embedded metadata and content hashes")]
#[command(long_about = "\
Photo authenticity checks from embedded metadata and content hashes

A check reads one JPEG or PNG, normalizes its EXIF/XMP metadata (capture
time, GPS position, camera make/model), hashes its bytes, and classifies
the submission:

  Verified     capture time and GPS location are both present
  Suspicious   either signal is missing from the metadata
  Reused       the exact same bytes were submitted before

Every check is recorded in a local history (newest first, capped at 20
entries) which also powers the duplicate detection. The verdict trusts the
metadata at face value: it detects missing provenance signals, not forged
ones.

Metadata resolution (first available wins):
  Capture time:  DateTimeOriginal → CreateDate → ModifyDate
  Coordinates:   decoder-resolved pair → GPS/EXIF/XMP records, any shape
                 (decimal, rational, \"40.7128 N\", degree-minute-second)
  Device:        \"{Make} {Model}\"

Run 'photoproof gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// History file (default: the user data directory)
    #[arg(long, global = true)]
    history_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check one photograph and record the verdict
    Check {
        /// Image file to check (JPEG or PNG)
        file: PathBuf,
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Skip the reverse-geocoding lookup
        #[arg(long)]
        offline: bool,
    },
    /// Show the recorded check history
    History {
        /// Print the history as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Remove all recorded history
    Clear,
    /// Dump the raw metadata record of a file without recording anything
    Inspect {
        /// Image file to inspect (JPEG or PNG)
        file: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    let history_path = cli
        .history_file
        .clone()
        .or_else(|| config.history_file.clone())
        .unwrap_or_else(HistoryStore::default_path);
    let store = HistoryStore::new(history_path);

    match cli.command {
        Command::Check {
            file,
            json,
            offline,
        } => {
            let geocoder = build_geocoder(&config, offline);
            let report = check::run_check(
                &file,
                &store,
                geocoder.as_ref().map(|g| g as &dyn ReverseGeocoder),
                &config,
            )?;

            if json {
                let value = serde_json::json!({
                    "fileName": &report.file_name,
                    "hash": &report.hash,
                    "completeness": report.metadata.completeness(),
                    "metadata": &report.metadata,
                    "verification": &report.verification,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                output::print_check_report(&report);
            }
            if let Some(warning) = &report.save_warning {
                eprintln!("warning: {warning}");
            }
        }
        Command::History { json } => {
            let entries = store.load();
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                output::print_history(&entries);
            }
        }
        Command::Clear => {
            store.clear()?;
            println!("History cleared");
        }
        Command::Inspect { file } => {
            let bytes = std::fs::read(&file)?;
            if check::sniff_format(&bytes).is_none() {
                return Err(
                    check::CheckError::UnsupportedFormat(file.clone()).into(),
                );
            }
            let decoded = decode::decode(&bytes)?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            output::print_inspect(
                &file_name,
                &decoded.record,
                decoded.gps.map(|gps| (gps.latitude, gps.longitude)),
            );
        }
        Command::GenConfig => {
            print!("{}", photoproof::config::stock_config_toml());
        }
    }

    Ok(())
}

/// Build the geocoder unless geocoding is disabled by flag or config.
/// Construction failure degrades to no geocoder, matching the collaborator
/// policy: lookups are best-effort, never required.
fn build_geocoder(config: &Config, offline: bool) -> Option<NominatimGeocoder> {
    if offline || !config.geocode.enabled {
        return None;
    }
    NominatimGeocoder::new(
        config.geocode.endpoint.clone(),
        Duration::from_secs(config.geocode.timeout_secs),
    )
}
