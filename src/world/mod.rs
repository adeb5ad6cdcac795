pub mod board;
pub mod generation;
pub mod side;
pub mod tile;
pub mod topology;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::generation::GenerationParams;
use crate::simulation::{decide_winner, is_game_over};
pub use board::Board;
pub use side::{BuildOutcome, ClaimOutcome, ResourceKind, ResourceSnapshot, Side, WaterOutcome};
pub use tile::{Ownership, SideId, Tile, TileLabel};
pub use topology::Coord;

/// Everything that makes up a game in progress; saved and loaded as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub id: Uuid,
    pub name: String,
    pub created_at: String,
    /// Completed days.
    pub day: u32,
    pub generation_params: GenerationParams,
    pub board: Board,
    /// Indexed by [`SideId::index`].
    pub sides: [Side; 2],
    /// Set once the game has ended.
    pub winner: Option<SideId>,
}

impl GameState {
    pub fn side(&self, id: SideId) -> &Side {
        &self.sides[id.index()]
    }

    pub fn side_mut(&mut self, id: SideId) -> &mut Side {
        &mut self.sides[id.index()]
    }

    /// Mutable access to one side and the board alongside a view of the other side.
    pub fn split_mut(&mut self, id: SideId) -> (&mut Side, &Side, &mut Board) {
        let [human, opponent] = &mut self.sides;
        match id {
            SideId::Human => (human, opponent, &mut self.board),
            SideId::Opponent => (opponent, human, &mut self.board),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// Structural checks applied to a freshly loaded game.
    pub fn validate(&self) -> Result<(), String> {
        if !self.board.is_consistent() {
            return Err(format!(
                "board grids do not match size {}",
                self.board.size()
            ));
        }
        for side in &self.sides {
            if side.history().len() != self.day as usize {
                return Err(format!(
                    "{} history has {} entries for day {}",
                    side.id(),
                    side.history().len(),
                    self.day
                ));
            }
            let owned = self.board.count_controlled(side.id());
            if owned != side.controlled_tiles() {
                return Err(format!(
                    "{} reports {} tiles but owns {}",
                    side.id(),
                    side.controlled_tiles(),
                    owned
                ));
            }
        }
        if self.sides[0].id() != SideId::Human || self.sides[1].id() != SideId::Opponent {
            return Err("side registry is out of order".to_string());
        }

        let mut housed = [0u32; 2];
        for (coord, tile, _) in self.board.cells() {
            match tile.owner() {
                Some(owner) if tile.is_housed() => housed[owner.index()] += 1,
                Some(_) => {}
                None if tile.is_watered() || tile.is_housed() => {
                    return Err(format!("unowned tile {} is watered or housed", coord));
                }
                None => {}
            }
        }
        for side in &self.sides {
            if housed[side.id().index()] != side.houses() {
                return Err(format!(
                    "{} reports {} houses but the board has {}",
                    side.id(),
                    side.houses(),
                    housed[side.id().index()]
                ));
            }
        }

        if let Some(winner) = self.winner {
            if !is_game_over(self) {
                return Err(format!("{} is recorded as winner of an unfinished game", winner));
            }
            if decide_winner(self) != winner {
                return Err(format!("{} is recorded as winner but lost", winner));
            }
        }
        Ok(())
    }
}
