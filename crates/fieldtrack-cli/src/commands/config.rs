use anyhow::Result;

use fieldtrack_core::config::TrackerConfig;
use fieldtrack_infrastructure::ConfigService;

/// Prints the effective configuration as TOML.
pub fn show(service: &ConfigService) -> Result<()> {
    let config = service.get_config();
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Seeds the config file with defaults unless it already exists.
pub fn init(service: &ConfigService) -> Result<()> {
    if service.path().exists() {
        println!("Config already exists at {}", service.path().display());
        return Ok(());
    }

    service.save(&TrackerConfig::default())?;
    println!("Created {}", service.path().display());
    Ok(())
}
