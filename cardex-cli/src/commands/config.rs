use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::settings::Settings;

/// Show effective settings and where they came from.
pub(crate) fn run_config_show(
    settings: &Settings,
    config_path: &Path,
    env_overrides: &[&str],
) -> Result<(), CliError> {
    log::info!(
        "{}",
        "cardex Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    if config_path.exists() {
        log::info!(
            "  Config file: {} {}",
            config_path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Config file: {} {}",
            config_path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    if env_overrides.is_empty() {
        log::info!(
            "  Environment: {}",
            "no overrides".if_supports_color(Stdout, |t| t.dimmed())
        );
    } else {
        log::info!(
            "  Environment: {}",
            env_overrides.join(", ").if_supports_color(Stdout, |t| t.yellow())
        );
    }

    let storage = match settings.object_store() {
        Some(_) => "configured".if_supports_color(Stdout, |t| t.green()).to_string(),
        None => "not configured".if_supports_color(Stdout, |t| t.dimmed()).to_string(),
    };
    log::info!("  Image storage: {}", storage);
    crate::log_blank();

    for line in settings.to_toml()?.lines() {
        log::info!("  {}", line);
    }
    Ok(())
}

/// Print the config file path.
pub(crate) fn run_config_path(config_path: &Path) {
    println!("{}", config_path.display());
}
