//! Entry point for the **swaykbdd** daemon.
//!
//! Builds a [`Config`] from the optional config file and the command line,
//! then hands control to [`swaykbdd::daemon::run`], which only returns when
//! the connection to Sway fails.

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use swaykbdd::config::{self, Config, ConfigError};

/// Keyboard layout switcher for Sway.
#[derive(Parser, Debug)]
#[command(name = "swaykbdd", version, about)]
struct Args {
    /// Default layout for new windows, -1 to keep the current one [default: 0]
    #[arg(short = 'd', long = "default", value_name = "ID", allow_negative_numbers = true)]
    default_layout: Option<i64>,

    /// Delay between switching and saving layout, in ms [default: 50]
    #[arg(short = 't', long, value_name = "MS")]
    timeout: Option<u64>,

    /// Comma-separated list of applications with tabs
    #[arg(short = 'a', long, value_name = "LIST")]
    tabapps: Option<String>,

    /// Configuration file [default: $XDG_CONFIG_HOME/swaykbdd/config.json]
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/swaykbdd`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("swaykbdd")
}

/// Load the config file named on the command line, or the default one if it
/// exists, falling back to compiled-in defaults.
fn load_config(explicit: Option<&PathBuf>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return Config::load(path);
    }
    let path = config_dir().join("config.json");
    if path.exists() {
        let cfg = Config::load(&path)?;
        info!("loaded config from {}", path.display());
        Ok(cfg)
    } else {
        info!("no config file at {}, using defaults", path.display());
        Ok(Config::default())
    }
}

/// Apply command-line overrides on top of `config`.
fn apply_args(mut config: Config, args: &Args) -> Result<Config, ConfigError> {
    if let Some(d) = args.default_layout {
        config.default_layout = config::parse_default_layout(d)?;
    }
    if let Some(t) = args.timeout {
        config.switch_timeout_ms = t;
    }
    if let Some(list) = &args.tabapps {
        config.tab_apps = config::parse_tab_apps(list);
    }
    config.validate()?;
    Ok(config)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match load_config(args.config.as_ref()).and_then(|c| apply_args(c, &args)) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        "default layout {:?}, switch timeout {} ms, tab apps {:?}",
        config.default_layout, config.switch_timeout_ms, config.tab_apps
    );

    if let Err(e) = swaykbdd::daemon::run(&config) {
        error!("{}", e);
        std::process::exit(1);
    }
}
