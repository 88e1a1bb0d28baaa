use clap::{Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use energy_quest::cli::commands;
use energy_quest::config::GameConfig;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "energy-quest.toml";

#[derive(Parser)]
#[command(name = "energy-quest")]
#[command(about = "Progression engine for an electricity-saving puzzle game")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the game behind a WebSocket server
    Serve,

    /// Play in the terminal, one command per line
    Play,

    /// Inspect or erase saved progress
    Progress {
        #[command(subcommand)]
        action: ProgressAction,
    },

    /// Browse the quiz question pool
    Quiz {
        #[command(subcommand)]
        action: QuizAction,
    },
}

#[derive(Subcommand)]
enum ProgressAction {
    /// Show the saved progress record
    Show,
    /// Delete the saved progress record
    Reset,
}

#[derive(Subcommand)]
enum QuizAction {
    /// List every question with its correct answer
    List,
}

fn load_config(path: Option<&str>) -> Result<GameConfig, String> {
    match path {
        Some(path) => GameConfig::from_file(Path::new(path)),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            GameConfig::from_file(Path::new(DEFAULT_CONFIG))
        }
        None => Ok(GameConfig::default()),
    }
}

/// RUST_LOG wins over the configured level.
fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&config.log_level, cli.log_json);

    let result = match cli.command {
        Commands::Serve => commands::serve(&config).await,
        Commands::Play => commands::play(&config).await,
        Commands::Progress { action } => match action {
            ProgressAction::Show => commands::show_progress(&config),
            ProgressAction::Reset => commands::reset_progress(&config),
        },
        Commands::Quiz { action } => match action {
            QuizAction::List => {
                commands::list_quiz();
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
