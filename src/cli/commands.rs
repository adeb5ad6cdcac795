use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::config::generation::GenerationParams;
use crate::config::simulation::SimulationConfig;
use crate::persistence;
use crate::simulation::TurnEngine;
use crate::simulation::action::PlayerAction;
use crate::simulation::observer::{EventLog, GameEvent, GameObserver, TracingObserver};
use crate::simulation::opponent::ScriptedOpponent;
use crate::simulation::statistics::compute_statistics;
use crate::world::generation::{generate_game, print_game_summary};
use crate::world::{Coord, GameState, ResourceKind, SideId};

/// Load the given snapshot, or the newest valid one in the configured directory.
pub fn load_game(config: &SimulationConfig, game_path: Option<&str>) -> Result<GameState, String> {
    match game_path {
        Some(path) => persistence::load_snapshot(Path::new(path))
            .map_err(|e| format!("Failed to load snapshot: {}", e)),
        None => persistence::load_latest_valid_snapshot(Path::new(&config.snapshot_directory))
            .map_err(|e| format!("Failed to load snapshot: {}", e)),
    }
}

/// Save and prune; pruning failures are only logged.
fn save_game(config: &SimulationConfig, game: &GameState) -> Result<PathBuf, String> {
    let snapshot_dir = Path::new(&config.snapshot_directory);
    let path = persistence::save_snapshot(game, snapshot_dir)
        .map_err(|e| format!("Cannot save snapshot: {}", e))?;
    info!(path = %path.display(), day = game.day, "Snapshot saved");

    if let Err(e) = persistence::prune_snapshots(snapshot_dir, config.max_snapshots as usize) {
        warn!(error = %e, "Snapshot pruning failed");
    }
    Ok(path)
}

/// Generate a new game and save it. `board_file` overrides the `[board]` table.
pub fn new_game(config: &SimulationConfig, board_file: Option<&str>) -> Result<PathBuf, String> {
    let params = match board_file {
        Some(path) => GenerationParams::from_file(Path::new(path))?,
        None => config.board.clone(),
    };

    let game = generate_game(&params, &config.start)?;
    print_game_summary(&game);
    let path = save_game(config, &game)?;
    println!("\nGame saved to {}", path.display());
    Ok(path)
}

/// Records events for printing while still forwarding them to the log.
#[derive(Default)]
struct CliObserver {
    log: EventLog,
    tracing: TracingObserver,
}

impl GameObserver for CliObserver {
    fn on_event(&mut self, event: &GameEvent) {
        self.tracing.on_event(event);
        self.log.on_event(event);
    }
}

/// Play one day with `action` for the player, print what happened, save.
pub fn act(
    config: &SimulationConfig,
    game_path: Option<&str>,
    action: PlayerAction,
) -> Result<GameState, String> {
    let mut game = load_game(config, game_path)?;
    let mut engine = TurnEngine::new(ScriptedOpponent, CliObserver::default());

    let report = engine
        .play_day(&mut game, Some(action))
        .map_err(|e| e.to_string())?;

    println!("=== Day {} ===", report.resolution.day);
    for line in engine.observer().log.lines() {
        println!("  {}", line);
    }
    for id in SideId::all() {
        let i = id.index();
        println!(
            "  {:<10} harvested {:.0}, ate {:.0}, {} new units",
            id.to_string(),
            report.resolution.harvested[i],
            report.resolution.eaten[i],
            report.resolution.births[i]
        );
    }

    save_game(config, &game)?;
    Ok(game)
}

/// Make the game in `file` current again by re-saving it as the newest snapshot.
pub fn restore(config: &SimulationConfig, file: &str) -> Result<PathBuf, String> {
    let source = Path::new(file);
    let game = persistence::load_snapshot(source)
        .map_err(|e| format!("Error restoring snapshot: {}", e))?;
    println!("Restored game from {}", source.display());
    print_game_summary(&game);

    let path = save_game(config, &game)?;
    println!("\nPlay continues from day {} ({})", game.day, path.display());
    Ok(path)
}

/// Board as text from `perspective`, one row per `x`.
pub fn render_board(game: &GameState, perspective: SideId) -> String {
    let size = game.board.size() as i32;
    let mut out = String::new();
    for x in 0..size {
        for y in 0..size {
            if let Some(label) = game.board.state_label(Coord::new(x, y), perspective) {
                out.push_str(label.glyph());
            }
            if y + 1 < size {
                out.push(' ');
            }
        }
        out.push('\n');
    }
    out
}

pub fn inspect(config: &SimulationConfig, game_path: Option<&str>) -> Result<(), String> {
    let game = load_game(config, game_path)?;
    let stats = compute_statistics(&game);

    println!("=== {} (day {}) ===", game.name, game.day);
    println!("ID: {}", game.id);
    println!("Created: {} (unix seconds)", game.created_at);
    println!();
    print!("{}", render_board(&game, SideId::Human));
    println!();
    println!(
        "{:<10} {:>6} {:>6} {:>6} {:>6} {:>6} {:>8}",
        "Side", "Rice", "Water", "Units", "Houses", "Tiles", "Share"
    );
    for side in &game.sides {
        let s = stats.side(side.id());
        println!(
            "{:<10} {:>6.0} {:>6.0} {:>6} {:>6} {:>6} {:>7.1}%",
            side.id().to_string(),
            side.rice(),
            side.water(),
            side.units(),
            side.houses(),
            side.controlled_tiles(),
            s.board_share * 100.0
        );
    }
    println!("\nUnclaimed tiles: {}", stats.unclaimed_tiles);

    if let Some(winner) = game.winner {
        println!("Game over: {} won", winner);
    }
    Ok(())
}

/// Both sides' histories keyed by side name, then resource name.
pub fn history_json(game: &GameState) -> Value {
    let mut sides = Map::new();
    for side in &game.sides {
        let mut series = Map::new();
        for kind in ResourceKind::all() {
            series.insert(kind.name().to_string(), json!(side.series(kind)));
        }
        sides.insert(side.id().to_string().to_lowercase(), Value::Object(series));
    }
    json!({ "day": game.day, "sides": sides })
}

pub fn history(
    config: &SimulationConfig,
    game_path: Option<&str>,
    as_json: bool,
) -> Result<(), String> {
    let game = load_game(config, game_path)?;

    if as_json {
        let text = serde_json::to_string_pretty(&history_json(&game))
            .map_err(|e| format!("Cannot encode history: {}", e))?;
        println!("{}", text);
        return Ok(());
    }

    for side in &game.sides {
        println!("--- {} ---", side.id());
        println!(
            "{:>5} {:>8} {:>8} {:>6} {:>7}",
            "Day", "Water", "Rice", "Units", "Houses"
        );
        for (day, snapshot) in side.history().iter().enumerate() {
            println!(
                "{:>5} {:>8.0} {:>8.0} {:>6} {:>7}",
                day + 1,
                snapshot.water,
                snapshot.rice,
                snapshot.units,
                snapshot.houses
            );
        }
        println!();
    }
    Ok(())
}
