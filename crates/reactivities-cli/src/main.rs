//! Reactivities CLI - Terminal client for the Reactivities API
//!
//! Signs in, browses guarded routes, edits activities and completes email
//! verification without a browser.

mod cli;
mod commands;
mod config;
mod error;
mod token_store;


use clap::Parser;

use crate::cli::{ActivityCommands, Cli, Commands, ConfigCommands};
use crate::commands::activity::{run_activity_create, run_activity_edit};
use crate::commands::config::{run_config_set_api_url, run_config_show};
use crate::commands::navigate::run_open;
use crate::commands::session::{run_login, run_logout, run_whoami};
use crate::commands::verify::{run_resend, run_verify};
use crate::commands::AppContext;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("reactivities=info,reactivities_core=info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api_url = cli.api_url.as_deref();

    match cli.command {
        Commands::Login { email, password } => {
            run_login(&AppContext::connect(api_url)?, &email, &password).await
        }
        Commands::Logout => run_logout(&AppContext::connect(api_url)?),
        Commands::Whoami => run_whoami(&AppContext::connect(api_url)?).await,
        Commands::Open { path } => run_open(&AppContext::connect(api_url)?, &path).await,
        Commands::Verify { link } => run_verify(&AppContext::connect(api_url)?, &link).await,
        Commands::Resend { email } => run_resend(&AppContext::connect(api_url)?, &email).await,
        Commands::Activity { command } => {
            let context = AppContext::connect(api_url)?;
            match command {
                ActivityCommands::Create { fields } => {
                    run_activity_create(&context, &fields).await
                }
                ActivityCommands::Edit { id, fields } => {
                    run_activity_edit(&context, &id, &fields).await
                }
            }
        }
        Commands::Config { command } => match command {
            ConfigCommands::SetApiUrl { url } => run_config_set_api_url(&url),
            ConfigCommands::Show => run_config_show(api_url),
        },
    }
}
