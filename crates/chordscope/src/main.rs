//! chordscope - chord and Roman-numeral display for a MIDI keyboard
//!
//! Subcommands:
//! - `chordscope monitor` - Live display from the connected keyboard (default)
//! - `chordscope analyze <notes...>` - Analyze notes given on the command line
//! - `chordscope keys` - List selectable keys
//! - `chordscope ports` - List MIDI inputs
//! - `chordscope replay <file>` - Analyze a Standard MIDI File
//! - `chordscope config` - Print the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use chordconf::ChordscopeConfig;
use chordscope::{commands, monitor};
use clap::{Parser, Subcommand};
use harmony::TheoryTables;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chordscope")]
#[command(about = "Live chord and Roman-numeral display for a MIDI keyboard")]
#[command(version)]
struct Cli {
    /// Config file (in place of ./chordscope.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the keyboard and show what is being played
    Monitor {
        /// Starting key, by name or number (see `keys`)
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Analyze notes such as C4 E4 G4 or MIDI numbers
    Analyze {
        /// Notes to analyze
        #[arg(required = true)]
        notes: Vec<String>,

        /// Key, by name or number
        #[arg(short, long)]
        key: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List selectable keys
    Keys,

    /// List MIDI input ports; `*` marks the one `monitor` would open
    Ports,

    /// Analyze every chord change in a Standard MIDI File
    Replay {
        /// Path to a .mid file
        file: PathBuf,

        /// Key, by name or number
        #[arg(short, long)]
        key: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout belongs to the display
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = ChordscopeConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&config.infra.telemetry.log_level);

    tracing::debug!(
        files = ?sources.files,
        env = ?sources.env_overrides,
        "configuration loaded"
    );

    let tables = TheoryTables::new();

    match cli.command.unwrap_or(Commands::Monitor { key: None }) {
        Commands::Monitor { key } => {
            let (index, _) = commands::resolve_key(&tables, key.as_deref(), &config)?;
            monitor::run(&tables, &config, index).await?;
        }
        Commands::Analyze { notes, key, json } => {
            let (_, key) = commands::resolve_key(&tables, key.as_deref(), &config)?;
            let report = commands::analyze_notes(&tables, &notes, key)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", commands::format_report(&report, key));
            }
        }
        Commands::Keys => {
            print!("{}", commands::format_keys(&tables));
        }
        Commands::Ports => {
            print!("{}", commands::ports(&config)?);
        }
        Commands::Replay { file, key, json } => {
            let (_, key) = commands::resolve_key(&tables, key.as_deref(), &config)?;
            let frames = commands::replay(&tables, &file, key)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&frames)?);
            } else {
                print!("{}", commands::format_frames(&frames, key));
            }
        }
        Commands::Config => {
            for file in &sources.files {
                println!("# loaded: {}", file.display());
            }
            for var in &sources.env_overrides {
                println!("# env: {}", var);
            }
            print!("{}", config.to_toml());
        }
    }

    Ok(())
}
