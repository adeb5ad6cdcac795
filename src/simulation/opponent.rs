use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::simulation::action::WATER_PER_COLLECTION;
use crate::world::side::{HOUSE_RICE_COST, RICE_EATEN_PER_UNIT};
use crate::world::topology::grid_index;
use crate::world::{Board, BuildOutcome, ClaimOutcome, Coord, Side, WaterOutcome};

/// Where the territory search always begins.
pub const SEARCH_START: Coord = Coord::new(0, 0);
/// Water the opponent wants in hand before tending its fields.
pub const TENDING_WATER_THRESHOLD: f64 = 15.0;

/// The opponent's action for the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpponentMove {
    Claimed(Coord),
    ClaimFailed,
    Watered(Coord),
    BuiltHouse(Coord),
    CollectedWater,
}

impl std::fmt::Display for OpponentMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpponentMove::Claimed(c) => write!(f, "Opponent claimed the nearest territory {}", c),
            OpponentMove::ClaimFailed => write!(f, "Opponent could not claim anything"),
            OpponentMove::Watered(c) => write!(f, "Opponent watered rice at {}", c),
            OpponentMove::BuiltHouse(c) => write!(f, "Opponent built a house at {}", c),
            OpponentMove::CollectedWater => {
                write!(f, "Opponent collected water, nothing else to do")
            }
        }
    }
}

/// Chooses one action per day for a scripted side.
pub trait OpponentStrategy {
    fn decide(&self, ai: &mut Side, opponent: &Side, board: &mut Board) -> OpponentMove;
}

/// Fixed-priority policy: expand while the workforce allows, otherwise tend
/// fields, otherwise fetch water.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedOpponent;

impl OpponentStrategy for ScriptedOpponent {
    fn decide(&self, ai: &mut Side, _opponent: &Side, board: &mut Board) -> OpponentMove {
        let wants_land = ai.units() >= ai.controlled_tiles()
            || (ai.rice() == 0.0 && ai.houses() != 0);

        if wants_land {
            let radius = board.total_tiles() / 2;
            return match claim_first_reachable(ai, board, SEARCH_START, radius) {
                Some(coord) => OpponentMove::Claimed(coord),
                None => OpponentMove::ClaimFailed,
            };
        }

        if ai.water() >= TENDING_WATER_THRESHOLD {
            return tend_fields(ai, board);
        }

        ai.collect_water(WATER_PER_COLLECTION);
        OpponentMove::CollectedWater
    }
}

/// Breadth-first search from `start`, claiming the first cell that accepts the claim.
///
/// Cells further than `radius` (Manhattan) from `start` are never enqueued.
/// Returns the claimed coordinate, or `None` once the frontier is exhausted.
pub fn claim_first_reachable(
    side: &mut Side,
    board: &mut Board,
    start: Coord,
    radius: u32,
) -> Option<Coord> {
    let size = board.size();
    let mut visited = vec![false; board.total_tiles() as usize];
    let mut queue = VecDeque::new();

    if let Some(i) = grid_index(start, size) {
        visited[i] = true;
        queue.push_back(start);
    }

    while let Some(current) = queue.pop_front() {
        if side.claim_territory(current, board) == ClaimOutcome::Claimed {
            return Some(current);
        }

        for next in current.neighbors() {
            let Some(i) = grid_index(next, size) else {
                continue;
            };
            if visited[i] || next.distance(start) > radius {
                continue;
            }
            visited[i] = true;
            queue.push_back(next);
        }
    }

    None
}

/// Water the first dry field while food is short, otherwise build on the
/// first free field. Falls back to collecting water.
fn tend_fields(ai: &mut Side, board: &mut Board) -> OpponentMove {
    let fields = board.controlled_coords(ai.id());
    let short_of_food =
        ai.rice() < ai.units() as f64 * RICE_EATEN_PER_UNIT || ai.rice() < HOUSE_RICE_COST;

    if short_of_food {
        for coord in fields {
            let dry = board.tile_at(coord).is_some_and(|t| !t.is_watered());
            if dry && ai.water_tile(coord, board) == WaterOutcome::Watered {
                return OpponentMove::Watered(coord);
            }
        }
    } else {
        for coord in fields {
            let free = board.tile_at(coord).is_some_and(|t| !t.is_housed());
            if free && ai.build_house(coord, board) == BuildOutcome::Built {
                return OpponentMove::BuiltHouse(coord);
            }
        }
    }

    ai.collect_water(WATER_PER_COLLECTION);
    OpponentMove::CollectedWater
}
