//! Config subcommands handler

use std::path::PathBuf;

use anyhow::Result;

use stepslice::Config;

fn resolve_path(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.clone()),
        None => Config::config_path(),
    }
}

/// Show the effective configuration as TOML.
#[cfg(not(tarpaulin_include))]
pub fn handle_show(explicit: Option<&PathBuf>) -> Result<()> {
    let config = match explicit {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let toml_str = toml::to_string_pretty(&config)?;
    print!("{}", toml_str);
    Ok(())
}

/// Print where the configuration file lives.
#[cfg(not(tarpaulin_include))]
pub fn handle_path(explicit: Option<&PathBuf>) -> Result<()> {
    println!("{}", resolve_path(explicit)?.display());
    Ok(())
}

/// Create a configuration file with default settings.
///
/// An existing file is left untouched.
#[cfg(not(tarpaulin_include))]
pub fn handle_init(explicit: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_path(explicit)?;

    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    Config::default().save_to(&config_path)?;
    println!("Created {}", config_path.display());
    Ok(())
}
