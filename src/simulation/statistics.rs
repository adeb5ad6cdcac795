use serde::Serialize;

use crate::world::{GameState, SideId};

/// Per-side board metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SideStatistics {
    pub tiles: u32,
    pub watered_tiles: u32,
    pub housed_tiles: u32,
    /// Sum of rice levels across the side's tiles.
    pub standing_rice: f64,
    /// Share of the board, 0.0-1.0.
    pub board_share: f32,
}

/// Aggregate metrics for the current game state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStatistics {
    pub day: u32,
    /// Indexed by [`SideId::index`].
    pub sides: [SideStatistics; 2],
    pub unclaimed_tiles: u32,
}

impl DayStatistics {
    pub fn side(&self, id: SideId) -> &SideStatistics {
        &self.sides[id.index()]
    }
}

/// Compute statistics for the game after a day.
pub fn compute_statistics(game: &GameState) -> DayStatistics {
    let mut sides = [SideStatistics::default(); 2];
    let mut unclaimed_tiles = 0;

    for (_, tile, level) in game.board.cells() {
        let Some(owner) = tile.owner() else {
            unclaimed_tiles += 1;
            continue;
        };
        let stats = &mut sides[owner.index()];
        stats.tiles += 1;
        stats.standing_rice += level;
        if tile.is_watered() {
            stats.watered_tiles += 1;
        }
        if tile.is_housed() {
            stats.housed_tiles += 1;
        }
    }

    let total = game.board.total_tiles();
    if total > 0 {
        for stats in &mut sides {
            stats.board_share = stats.tiles as f32 / total as f32;
        }
    }

    DayStatistics {
        day: game.day,
        sides,
        unclaimed_tiles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::generation::GenerationParams;
    use crate::config::simulation::StartingResources;
    use crate::world::generation::generate_game;
    use crate::world::Coord;

    fn make_game(size: u32) -> GameState {
        generate_game(
            &GenerationParams {
                seed: 3,
                board_size: size,
            },
            &StartingResources::default(),
        )
        .unwrap()
    }

    #[test]
    fn fresh_game_statistics() {
        let game = make_game(10);
        let stats = compute_statistics(&game);
        assert_eq!(stats.day, 0);
        assert_eq!(stats.unclaimed_tiles, 98);
        for id in SideId::all() {
            let side = stats.side(id);
            assert_eq!(side.tiles, 1);
            assert_eq!(side.watered_tiles, 0);
            assert_eq!(side.housed_tiles, 0);
            assert_eq!(side.standing_rice, 1.0);
            assert!((side.board_share - 0.01).abs() < 1e-6);
        }
    }

    #[test]
    fn counts_flags_per_owner() {
        let mut game = make_game(4);
        game.board.water(Coord::new(3, 3));
        game.board.build_house(Coord::new(0, 0));
        game.board.set_rice_at(Coord::new(0, 0), 2.5);

        let stats = compute_statistics(&game);
        assert_eq!(stats.side(SideId::Human).watered_tiles, 1);
        assert_eq!(stats.side(SideId::Human).housed_tiles, 0);
        assert_eq!(stats.side(SideId::Opponent).housed_tiles, 1);
        assert_eq!(stats.side(SideId::Opponent).standing_rice, 2.5);
    }
}
