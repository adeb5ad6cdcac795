use clap::{Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use ricefield::cli::commands;
use ricefield::config::simulation::SimulationConfig;
use ricefield::persistence;
use ricefield::simulation::action::PlayerAction;
use ricefield::world::Coord;

#[derive(Parser)]
#[command(name = "ricefield")]
#[command(about = "Grow rice, claim land and outlast the opponent")]
#[command(version)]
struct Cli {
    /// Path to the configuration file (defaults apply if it is missing)
    #[arg(short, long, default_value = "ricefield.toml")]
    config: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new game and save it
    New {
        /// Board generation file overriding the [board] table
        #[arg(short, long)]
        board: Option<String>,
    },

    /// Take the player's action and play out the day
    Act {
        /// Snapshot to play from (defaults to the newest save)
        #[arg(short, long)]
        game: Option<String>,

        #[command(subcommand)]
        action: ActionArg,
    },

    /// Show the board and both sides
    Inspect {
        #[arg(short, long)]
        game: Option<String>,
    },

    /// Show per-day resource history
    History {
        #[arg(short, long)]
        game: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Manage saved games
    Snapshots {
        #[command(subcommand)]
        action: SnapshotAction,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum ActionArg {
    /// Fetch 15 water
    CollectWater,
    /// Claim the tile at X Y
    Claim { x: i32, y: i32 },
    /// Water the tile at X Y (costs 5 water)
    Water { x: i32, y: i32 },
    /// Build a house at X Y (costs 25 rice, 10 water, 1 unit)
    Build { x: i32, y: i32 },
}

impl From<ActionArg> for PlayerAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::CollectWater => PlayerAction::CollectWater,
            ActionArg::Claim { x, y } => PlayerAction::Claim(Coord::new(x, y)),
            ActionArg::Water { x, y } => PlayerAction::Water(Coord::new(x, y)),
            ActionArg::Build { x, y } => PlayerAction::Build(Coord::new(x, y)),
        }
    }
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// List available snapshots
    List {
        /// Snapshot directory (defaults to the configured one)
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Make a saved game the current one again
    Restore {
        /// Path to the snapshot file
        file: String,
    },
}

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

fn main() {
    let cli = Cli::parse();

    let config = match SimulationConfig::from_file_or_default(Path::new(&cli.config)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&config.log_level, cli.log_json);

    let result = match cli.command {
        Commands::New { board } => commands::new_game(&config, board.as_deref()).map(|_| ()),
        Commands::Act { game, action } => {
            commands::act(&config, game.as_deref(), action.into()).map(|_| ())
        }
        Commands::Inspect { game } => commands::inspect(&config, game.as_deref()),
        Commands::History { game, json } => commands::history(&config, game.as_deref(), json),
        Commands::Snapshots { action } => match action {
            SnapshotAction::List { dir } => {
                let dir = dir.unwrap_or_else(|| config.snapshot_directory.clone());
                list_snapshots(Path::new(&dir))
            }
            SnapshotAction::Restore { file } => commands::restore(&config, &file).map(|_| ()),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn list_snapshots(snapshot_dir: &Path) -> Result<(), String> {
    let snapshots = persistence::list_snapshots(snapshot_dir)
        .map_err(|e| format!("Error listing snapshots: {}", e))?;

    if snapshots.is_empty() {
        println!("No snapshots found in {}", snapshot_dir.display());
        return Ok(());
    }

    println!("{:<36} {:>6} {:>10}", "File", "Day", "Size");
    println!("{}", "-".repeat(54));
    for s in &snapshots {
        let name = s
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("?");
        println!("{:<36} {:>6} {:>7} B", name, s.day, s.file_size);
    }
    println!(
        "\n{} snapshot(s) in {}",
        snapshots.len(),
        snapshot_dir.display()
    );
    Ok(())
}
