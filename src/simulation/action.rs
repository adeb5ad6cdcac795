use serde::{Deserialize, Serialize};

use crate::world::{Board, BuildOutcome, ClaimOutcome, Coord, Side, WaterOutcome};

/// Water gained by one collect-water action.
pub const WATER_PER_COLLECTION: f64 = 15.0;

/// The single action a side may take in a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    CollectWater,
    Claim(Coord),
    Water(Coord),
    Build(Coord),
}

/// What happened when a [`PlayerAction`] was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    CollectedWater,
    Claim(Coord, ClaimOutcome),
    Water(Coord, WaterOutcome),
    Build(Coord, BuildOutcome),
}

impl PlayerAction {
    pub fn apply(self, side: &mut Side, board: &mut Board) -> ActionOutcome {
        match self {
            PlayerAction::CollectWater => {
                side.collect_water(WATER_PER_COLLECTION);
                ActionOutcome::CollectedWater
            }
            PlayerAction::Claim(c) => ActionOutcome::Claim(c, side.claim_territory(c, board)),
            PlayerAction::Water(c) => ActionOutcome::Water(c, side.water_tile(c, board)),
            PlayerAction::Build(c) => ActionOutcome::Build(c, side.build_house(c, board)),
        }
    }
}

impl ActionOutcome {
    /// True when the action changed the game state.
    pub fn succeeded(&self) -> bool {
        match self {
            ActionOutcome::CollectedWater => true,
            ActionOutcome::Claim(_, o) => *o == ClaimOutcome::Claimed,
            ActionOutcome::Water(_, o) => *o == WaterOutcome::Watered,
            ActionOutcome::Build(_, o) => *o == BuildOutcome::Built,
        }
    }
}

impl std::fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionOutcome::CollectedWater => {
                write!(f, "Collected {} units of water", WATER_PER_COLLECTION)
            }
            ActionOutcome::Claim(c, o) => write!(f, "{} at {}", o, c),
            ActionOutcome::Water(c, o) => write!(f, "{} at {}", o, c),
            ActionOutcome::Build(c, o) => write!(f, "{} at {}", o, c),
        }
    }
}
