use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use hudkit_cli::{Replay, ReplayRunner};
use hudkit_host::config::ConfigError;
use hudkit_host::logging::init_logging;
use hudkit_host::{GameSnapshot, HeadlessDom, HudkitConfig, create_host_from_config};
use tracing::info;

/// Theme colour of the default client skin
const DEFAULT_DANGER_COLOR: &str = "#ef4444";

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enables debug mode (-d for debug, -dd for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    debug: u8,

    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded session through the built-in plugins
    ///
    /// Usage: hudkit replay session.jsonl --each
    Replay {
        /// JSON-lines session log
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Wait between events as long as the recording did
        #[arg(long)]
        realtime: bool,

        /// Print the overlay tree after every event, not just at the end
        #[arg(long)]
        each: bool,
    },
    /// Write a config file with every built-in plugin's default settings
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn log_level(debug: u8) -> &'static str {
    match debug {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn load_config(path: Option<&Path>) -> Result<HudkitConfig> {
    let result = match path {
        Some(path) => HudkitConfig::load_from(path),
        None => HudkitConfig::load(),
    };

    match result {
        Ok(config) => Ok(config),
        // Only the default location may be missing
        Err(ConfigError::NotFound(_)) if path.is_none() => Ok(HudkitConfig::default()),
        Err(err) => Err(err).context("Failed to load config"),
    }
}

fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => HudkitConfig::config_path()?,
    };

    // Never overwrite an existing config file unless asked to
    if path.exists() && !force {
        bail!(
            "Config file already exists at {}. Edit it manually or pass --force.",
            path.display()
        );
    }

    let config = HudkitConfig {
        plugins: hudkit_plugins::default_plugin_settings(),
        ..HudkitConfig::default()
    };
    config
        .save_to(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!("Config file created at: {}", path.display());
    Ok(())
}

async fn replay(config: &HudkitConfig, file: &Path, realtime: bool, each: bool) -> Result<()> {
    let replay = Replay::from_path(file)?;
    info!(
        "Replaying {} events ({:?}) from {}",
        replay.len(),
        replay.duration(),
        file.display()
    );

    let dom = HeadlessDom::new().with_css_variable("--theme-danger", DEFAULT_DANGER_COLOR);
    let host = create_host_from_config(
        config,
        dom,
        GameSnapshot::new(),
        hudkit_plugins::builtin_plugins(),
    );

    let start = Instant::now();
    let wall_start = tokio::time::Instant::now();
    let mut runner = ReplayRunner::new(host, start);

    for event in replay.events() {
        if realtime {
            tokio::time::sleep_until(wall_start + event.offset()).await;
        }
        runner.apply(event);
        if each {
            println!("--- {}ms", event.at_ms);
            print!("{}", runner.host().dom().render());
        }
    }
    runner.advance_to(replay.duration());

    if !each {
        print!("{}", runner.host().dom().render());
    }

    let mut host = runner.into_host();
    host.stop_all(start + replay.duration());
    info!("Replay finished");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::InitConfig { force } => {
            init_logging("hudkit", false, log_level(cli.debug))?;
            init_config(cli.config.as_deref(), force)
        }
        Commands::Replay {
            file,
            realtime,
            each,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let _guard = init_logging("replay", config.logging.file, log_level(cli.debug))?;
            replay(&config, &file, realtime, each).await
        }
    }
}
