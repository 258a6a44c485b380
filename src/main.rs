use clap::Parser;
use geoloc_application::error::AppError;
use std::process;

mod cli;
mod config;
mod console;
mod gateways;

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Cli::parse();
    if let Err(err) = cli::run(args) {
        log::error!("{err}");
        if err
            .downcast_ref::<AppError>()
            .is_some_and(AppError::is_configuration)
        {
            eprintln!("Please check the API key and the quota file.");
        }
        process::exit(1);
    }
}
