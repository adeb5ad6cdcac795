use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::config::generation::GenerationParams;
use crate::config::simulation::StartingResources;
use crate::world::board::Board;
use crate::world::side::Side;
use crate::world::tile::SideId;
use crate::world::topology::Coord;
use crate::world::GameState;

/// Upper bound (exclusive) of the random jitter added to every capture cost.
const COST_JITTER: u32 = 3;

/// Generate a new game: board, both sides on their home corners, day 0.
///
/// If `params.seed` is 0, a random seed is chosen. The actual seed used
/// is stored in the returned game's `generation_params` for reproducibility.
/// Out-of-range parameters are rejected before anything is generated.
pub fn generate_game(
    params: &GenerationParams,
    start: &StartingResources,
) -> Result<GameState, String> {
    params.validate()?;

    let seed = if params.seed == 0 {
        rand::thread_rng().r#gen()
    } else {
        params.seed
    };
    let resolved_params = GenerationParams {
        seed,
        ..params.clone()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut board = generate_board(params.board_size, &mut rng);
    let last = params.board_size as i32 - 1;
    let human = Side::new(
        SideId::Human,
        Coord::new(last, last),
        start.rice,
        start.water,
        start.units,
        &mut board,
    );
    let opponent = Side::new(
        SideId::Opponent,
        Coord::new(0, 0),
        start.rice,
        start.water,
        start.units,
        &mut board,
    );

    let id = Uuid::from_bytes(rng.r#gen());

    Ok(GameState {
        id,
        name: format!("Game-{}", seed),
        created_at: format!(
            "{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs()
        ),
        day: 0,
        generation_params: resolved_params,
        board,
        sides: [human, opponent],
        winner: None,
    })
}

/// Build a `size × size` board whose capture costs rise away from the corners.
///
/// Row `i` runs along two diagonal bands: the first `size - i` cells cost
/// `i + j`, the remaining `i` cells count back down from `size - 2`. Every
/// cost gets a jitter of 0, 1 or 2 on top.
pub fn generate_board(size: u32, rng: &mut impl Rng) -> Board {
    let size_i = size as i64;
    let mut costs = Vec::with_capacity((size * size) as usize);

    for row in 0..size_i {
        let mut band = row - 1;
        for col in 0..(size_i - row) {
            costs.push((row + col) as u32 + rng.gen_range(0..COST_JITTER));
            band += 1;
        }
        for _ in (size_i - row)..size_i {
            band -= 1;
            costs.push(band as u32 + rng.gen_range(0..COST_JITTER));
        }
    }

    let mut costs = costs.into_iter();
    Board::with_required_units(size, |_| costs.next().unwrap_or_default())
}

/// Print a summary of a freshly generated or loaded game.
pub fn print_game_summary(game: &GameState) {
    println!("=== Game Summary ===");
    println!("Name: {}", game.name);
    println!("Created: {}", game.created_at);
    println!("Board: {0}x{0}", game.board.size());
    println!("Seed: {}", game.generation_params.seed);
    println!("Day: {}", game.day);

    let costs: Vec<u32> = game
        .board
        .cells()
        .map(|(_, tile, _)| tile.required_units())
        .collect();
    if let (Some(min), Some(max)) = (costs.iter().min(), costs.iter().max()) {
        let mean = costs.iter().sum::<u32>() as f32 / costs.len() as f32;
        println!("\nCapture cost: min {} / mean {:.1} / max {}", min, mean, max);
    }

    println!("\nSides:");
    for side in &game.sides {
        println!(
            "  {:<10} home {}  rice {:.0}  water {:.0}  units {}",
            side.id().to_string(),
            side.home(),
            side.rice(),
            side.water(),
            side.units()
        );
    }

    if let Some(winner) = game.winner {
        println!("\nFinished: {} won", winner);
    }
}
