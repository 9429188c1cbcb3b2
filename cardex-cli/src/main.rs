//! cardex CLI
//!
//! Command-line interface for parsing deck lists, importing decks, and
//! maintaining the local card cache.

mod cli_types;
mod commands;
mod error;
mod progress;
mod settings;

use std::future::Future;
use std::io::Write;

use clap::Parser;
use log::LevelFilter;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;
use settings::Settings;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.clone().unwrap_or_else(settings::config_path);
    let mut settings = Settings::load(&config_path)?;
    let env_overrides = settings.apply_env(|key| std::env::var(key).ok())?;
    if let Some(db) = cli.db {
        settings.database_path = db;
    }

    match cli.command {
        Commands::Parse {
            file,
            resolve: false,
            json,
        } => commands::parse::run_parse(&file, json),
        Commands::Parse {
            file,
            resolve: true,
            json,
        } => block_on(commands::parse::run_parse_resolved(settings, file, json))?,
        Commands::Import { deck, json } => {
            block_on(commands::import::run_import(settings, deck, json))?
        }
        Commands::Card {
            id,
            refresh,
            printings,
        } => block_on(commands::card::run_card(settings, id, refresh, printings))?,
        Commands::Named { name, fuzzy } => {
            block_on(commands::card::run_named(settings, name, fuzzy))?
        }
        Commands::Search {
            query,
            page,
            cached,
        } => block_on(commands::card::run_search(settings, query, page, cached))?,
        Commands::Image {
            id,
            size,
            back,
            fast,
        } => block_on(commands::image::run_image(
            settings,
            id,
            size.into(),
            back,
            fast,
        ))?,
        Commands::CacheImages {
            ids_file,
            size,
            back_faces,
        } => block_on(commands::image::run_cache_images(
            settings,
            ids_file,
            size.into(),
            back_faces,
        ))?,
        Commands::RefreshStale { limit } => {
            block_on(commands::maintenance::run_refresh_stale(settings, limit))?
        }
        Commands::Stats => commands::maintenance::run_stats(&settings),
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                commands::config::run_config_show(&settings, &config_path, &env_overrides)
            }
            ConfigAction::Path => {
                commands::config::run_config_path(&config_path);
                Ok(())
            }
        },
    }
}

/// Run one async command on a fresh multi-threaded runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, CliError> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))?;
    Ok(rt.block_on(future))
}

/// Install the logger. Normal output goes through `log::info!`, so the
/// default format is the bare message; warnings and errors get a colored
/// prefix, and `--verbose` adds timestamps and module paths.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();

    if verbose {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        });
    } else {
        builder.format(|buf, record| match record.level() {
            log::Level::Error => writeln!(
                buf,
                "{} {}",
                "error:".if_supports_color(Stdout, |t| t.red()),
                record.args()
            ),
            log::Level::Warn => writeln!(
                buf,
                "{} {}",
                "warning:".if_supports_color(Stdout, |t| t.yellow()),
                record.args()
            ),
            _ => writeln!(buf, "{}", record.args()),
        });
    }

    builder.target(env_logger::Target::Stdout).init();
}

/// Print an empty line through the logger, so `--quiet` suppresses it too.
pub(crate) fn log_blank() {
    log::info!("");
}
