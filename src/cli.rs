use crate::{
    config::Config,
    console::{self, UserCommand},
    gateways,
};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use geoloc_application::prelude::*;
use geoloc_core::usecases::{BatchEvent, BatchSettings};
use std::{
    io::{self, BufRead},
    path::PathBuf,
    sync::Arc,
    thread,
};

#[derive(Parser)]
#[command(name = "geolocator")]
#[command(author, version, about = "Geocode street intersections listed in CSV files", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (default: geolocator.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the intersections of a CSV file into coordinates
    Run {
        /// CSV file with the intersection in the second column
        #[arg(value_name = "CSV")]
        csv: PathBuf,

        /// Treat the first line as data
        #[arg(long)]
        no_headers: bool,

        /// Do not wait for confirmation if the first address cannot be resolved
        #[arg(long)]
        continue_on_first_failure: bool,
    },

    /// Store the OpenCage API key
    ApiKey {
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Show today's API usage
    Status,
}

pub fn run(cli: Cli) -> Result<()> {
    let cfg = Config::try_load_from_file_or_default(cli.config.as_ref())?;
    match cli.command {
        Command::Run {
            csv,
            no_headers,
            continue_on_first_failure,
        } => run_batch(&cfg, csv, no_headers, continue_on_first_failure),
        Command::ApiKey { key } => {
            let quota_repo = gateways::quota_repo(&cfg.quota);
            save_api_key(&quota_repo, &key)?;
            println!("API key saved.");
            Ok(())
        }
        Command::Status => {
            let quota_repo = gateways::quota_repo(&cfg.quota);
            print_quota_status(&quota_repo, &cfg)?;
            Ok(())
        }
    }
}

fn print_quota_status<R>(quota_repo: &R, cfg: &Config) -> Result<()>
where
    R: geoloc_core::repositories::QuotaRepo,
{
    if let Some(api_key) = &cfg.geocoding.api_key {
        import_api_key(quota_repo, api_key)?;
    }
    let status = quota_status(quota_repo, cfg.quota.daily_limit)?;
    for line in console::quota_status_lines(&status) {
        println!("{line}");
    }
    Ok(())
}

/// The configured key takes precedence and is stored if none is stored yet.
fn resolve_api_key<R>(quota_repo: &R, configured: Option<&str>) -> Result<String>
where
    R: geoloc_core::repositories::QuotaRepo,
{
    if let Some(api_key) = configured {
        import_api_key(quota_repo, api_key)?;
        return Ok(api_key.to_string());
    }
    stored_api_key(quota_repo)?.ok_or_else(|| {
        anyhow!("Missing API key. Run `geolocator api-key <KEY>` to store your key.")
    })
}

// Usage and reset time are reported by the `Started` event.
fn run_batch(
    cfg: &Config,
    input: PathBuf,
    no_headers: bool,
    continue_on_first_failure: bool,
) -> Result<()> {
    let quota_repo = Arc::new(gateways::quota_repo(&cfg.quota));
    let api_key = resolve_api_key(&quota_repo, cfg.geocoding.api_key.as_deref())?;
    let geocoder = gateways::geocoding_gateway(&cfg.geocoding, &api_key)?;

    let params = GeocodeFileParams {
        input,
        has_headers: cfg.input.has_headers && !no_headers,
        batch: BatchSettings {
            daily_limit: cfg.quota.daily_limit,
            quota_policy: cfg.quota.policy,
            pacing: cfg.geocoding.pacing,
            address_column: cfg.input.address_column,
        },
    };
    let worker = BatchWorker::new();
    let handle = worker.start(params, geocoder, Arc::clone(&quota_repo))?;
    spawn_command_reader(handle.controller())?;

    for event in handle.events() {
        for line in console::status_lines(&event) {
            println!("{line}");
        }
        if continue_on_first_failure && matches!(event, BatchEvent::FirstRowFailed { .. }) {
            log::info!("Continue after failed first row");
            handle.resume();
        }
    }

    match handle.join()? {
        FileOutcome::Completed { output, .. } => {
            println!();
            println!("Geocoding completed! File saved as: {}", output.display());
        }
        FileOutcome::Cancelled => {
            log::info!("Geocoding cancelled, no file written");
        }
    }
    Ok(())
}

// The thread blocks on stdin and ends with the process.
fn spawn_command_reader(controller: BatchController) -> io::Result<()> {
    thread::Builder::new()
        .name("commands".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                match UserCommand::parse(&line) {
                    Some(UserCommand::Continue) => controller.resume(),
                    Some(UserCommand::Cancel) => {
                        println!("Cancelling...");
                        controller.cancel();
                    }
                    None if line.trim().is_empty() => {}
                    None => println!("Unknown command '{}': type 'c' or 'q'", line.trim()),
                }
            }
        })?;
    Ok(())
}
