use reactivities_core::config::API_URL_ENV;

use crate::config::{default_config_path, resolve_client_config, CliConfig};
use crate::error::CliError;

pub fn run_config_set_api_url(url: &str) -> Result<(), CliError> {
    let mut config = CliConfig::load().map_err(CliError::Config)?;
    config.set_api_base_url(url).map_err(CliError::Config)?;
    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Saved API URL {} to {}",
        config.api_base_url.as_deref().unwrap_or_default(),
        path.display()
    );
    Ok(())
}

pub fn run_config_show(api_url: Option<&str>) -> Result<(), CliError> {
    let config = CliConfig::load().map_err(CliError::Config)?;
    let resolved = resolve_client_config(api_url, std::env::var(API_URL_ENV).ok(), &config)
        .map_err(CliError::Config)?;
    println!("API URL: {}", resolved.api_base_url);
    if let Ok(path) = default_config_path() {
        println!("Config file: {}", path.display());
    }
    Ok(())
}
