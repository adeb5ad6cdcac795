pub mod action;
pub mod observer;
pub mod opponent;
pub mod statistics;

use serde::Serialize;

use crate::simulation::action::{ActionOutcome, PlayerAction};
use crate::simulation::observer::{GameEvent, GameObserver, TracingObserver};
use crate::simulation::opponent::{OpponentMove, OpponentStrategy, ScriptedOpponent};
use crate::simulation::statistics::DayStatistics;
use crate::world::{GameState, SideId};

/// What the end-of-day resolution did, per side (indexed by [`SideId::index`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayResolution {
    /// The day number just completed.
    pub day: u32,
    pub harvested: [f64; 2],
    pub eaten: [f64; 2],
    pub births: [u32; 2],
    pub winner: Option<SideId>,
}

/// Result of a full day: both actions plus resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct DayReport {
    pub player: Option<ActionOutcome>,
    pub opponent: OpponentMove,
    pub resolution: DayResolution,
    pub statistics: DayStatistics,
}

/// Driving a game that has already ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnError {
    GameOver { winner: SideId },
}

impl std::fmt::Display for TurnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnError::GameOver { winner } => {
                write!(f, "The game is over ({} won); start a new one", winner)
            }
        }
    }
}

impl std::error::Error for TurnError {}

/// True once a side has neither units nor houses, or holds half the board.
pub fn is_game_over(game: &GameState) -> bool {
    let exhausted = game
        .sides
        .iter()
        .any(|s| s.units() == 0 && s.houses() == 0);
    if exhausted {
        return true;
    }
    let half = game.board.total_tiles() / 2;
    game.sides.iter().any(|s| s.controlled_tiles() >= half)
}

/// Winner of a finished game. Ties go to the opponent.
///
/// When either side is out of units the larger workforce wins, otherwise the
/// larger territory does.
pub fn decide_winner(game: &GameState) -> SideId {
    let human = game.side(SideId::Human);
    let opponent = game.side(SideId::Opponent);
    let human_wins = if human.units() == 0 || opponent.units() == 0 {
        human.units() > opponent.units()
    } else {
        human.controlled_tiles() > opponent.controlled_tiles()
    };
    if human_wins {
        SideId::Human
    } else {
        SideId::Opponent
    }
}

/// Runs the day cycle: the player's action, the opponent's turn, then resolution.
pub struct TurnEngine<S = ScriptedOpponent, O = TracingObserver> {
    strategy: S,
    observer: O,
}

impl Default for TurnEngine {
    fn default() -> Self {
        TurnEngine::new(ScriptedOpponent, TracingObserver)
    }
}

impl<S: OpponentStrategy, O: GameObserver> TurnEngine<S, O> {
    pub fn new(strategy: S, observer: O) -> Self {
        Self { strategy, observer }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    fn ensure_running(game: &GameState) -> Result<(), TurnError> {
        match game.winner {
            Some(winner) => Err(TurnError::GameOver { winner }),
            None => Ok(()),
        }
    }

    /// Apply the player's action for the day.
    pub fn apply_action(
        &mut self,
        game: &mut GameState,
        action: PlayerAction,
    ) -> Result<ActionOutcome, TurnError> {
        Self::ensure_running(game)?;
        let (side, _, board) = game.split_mut(SideId::Human);
        let outcome = action.apply(side, board);
        self.observer.on_event(&GameEvent::ActionApplied {
            day: game.day,
            side: SideId::Human,
            succeeded: outcome.succeeded(),
            description: outcome.to_string(),
        });
        Ok(outcome)
    }

    /// Let the strategy pick and apply the opponent's action.
    pub fn run_opponent_turn(&mut self, game: &mut GameState) -> Result<OpponentMove, TurnError> {
        Self::ensure_running(game)?;
        let (ai, human, board) = game.split_mut(SideId::Opponent);
        let mv = self.strategy.decide(ai, human, board);
        self.observer.on_event(&GameEvent::ActionApplied {
            day: game.day,
            side: SideId::Opponent,
            succeeded: mv != OpponentMove::ClaimFailed,
            description: mv.to_string(),
        });
        Ok(mv)
    }

    /// Grow, harvest, feed, reproduce, record history, advance the day and check for a winner.
    pub fn end_of_day(&mut self, game: &mut GameState) -> Result<DayResolution, TurnError> {
        Self::ensure_running(game)?;
        let sides = SideId::all();

        for id in sides {
            game.board.grow_rice(id);
        }

        let mut harvested = [0.0; 2];
        for id in sides {
            let (side, _, board) = game.split_mut(id);
            harvested[id.index()] = side.collect_rice(board);
        }

        let mut eaten = [0.0; 2];
        for id in sides {
            let side = game.side_mut(id);
            eaten[id.index()] = side.eat_rice(side.units());
        }

        let mut births = [0; 2];
        for id in sides {
            births[id.index()] = game.side_mut(id).reproduce();
        }

        for side in &mut game.sides {
            side.save_resource_snapshot();
        }

        game.day += 1;

        if is_game_over(game) {
            game.winner = Some(decide_winner(game));
        }

        let resolution = DayResolution {
            day: game.day,
            harvested,
            eaten,
            births,
            winner: game.winner,
        };
        self.observer
            .on_event(&GameEvent::DayResolved(resolution.clone()));
        if let Some(winner) = game.winner {
            self.observer.on_event(&GameEvent::GameOver {
                day: game.day,
                winner,
            });
        }
        Ok(resolution)
    }

    /// Play a whole day. `None` skips the player's action.
    pub fn play_day(
        &mut self,
        game: &mut GameState,
        action: Option<PlayerAction>,
    ) -> Result<DayReport, TurnError> {
        let player = action
            .map(|a| self.apply_action(game, a))
            .transpose()?;
        let opponent = self.run_opponent_turn(game)?;
        let resolution = self.end_of_day(game)?;
        Ok(DayReport {
            player,
            opponent,
            resolution,
            statistics: statistics::compute_statistics(game),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::generation::GenerationParams;
    use crate::config::simulation::StartingResources;
    use crate::simulation::observer::EventLog;
    use crate::world::generation::generate_game;
    use crate::world::{Board, ClaimOutcome, Coord, Side};
    use uuid::Uuid;

    /// A game on a board where every tile costs `cost`.
    fn flat_game(size: u32, cost: u32) -> GameState {
        let mut board = Board::with_required_units(size, |_| cost);
        let last = size as i32 - 1;
        let human = Side::new(SideId::Human, Coord::new(last, last), 20.0, 10.0, 15, &mut board);
        let opponent = Side::new(SideId::Opponent, Coord::new(0, 0), 20.0, 10.0, 15, &mut board);
        GameState {
            id: Uuid::new_v4(),
            name: "test".to_string(),
            created_at: "0".to_string(),
            day: 0,
            generation_params: GenerationParams {
                seed: 1,
                board_size: size,
            },
            board,
            sides: [human, opponent],
            winner: None,
        }
    }

    fn logging_engine() -> TurnEngine<ScriptedOpponent, EventLog> {
        TurnEngine::new(ScriptedOpponent, EventLog::default())
    }

    #[test]
    fn end_of_day_runs_the_pipeline() {
        let mut game = flat_game(10, 5);
        let mut engine = logging_engine();

        let r = engine.end_of_day(&mut game).unwrap();
        assert_eq!(r.day, 1);
        // Level 1 grows to 2 and is harvested back down to 1.
        assert_eq!(r.harvested, [2.0, 2.0]);
        assert_eq!(game.board.rice_at(Coord::new(9, 9)), Some(1.0));
        // 22 rice against 15 units × 3 leaves nothing.
        assert_eq!(r.eaten, [22.0, 22.0]);
        assert_eq!(game.side(SideId::Human).rice(), 0.0);
        assert_eq!(r.births, [0, 0]);
        assert_eq!(r.winner, None);
        assert_eq!(game.day, 1);
        for side in &game.sides {
            assert_eq!(side.history().len(), 1);
        }
    }

    #[test]
    fn watered_tiles_yield_more() {
        let mut game = flat_game(10, 5);
        game.board.water(Coord::new(9, 9));
        let mut engine = logging_engine();

        let r = engine.end_of_day(&mut game).unwrap();
        assert_eq!(r.harvested[SideId::Human.index()], 3.0);
        assert_eq!(game.board.rice_at(Coord::new(9, 9)), Some(2.0));
    }

    #[test]
    fn houses_add_units_when_rice_remains() {
        let mut game = flat_game(10, 5);
        let human = game.side_mut(SideId::Human);
        human.set_units(1);
        human.set_houses(2);
        let mut engine = logging_engine();

        let r = engine.end_of_day(&mut game).unwrap();
        // 20 + 2 harvested - 3 eaten = 19, so both houses produce.
        assert_eq!(game.side(SideId::Human).rice(), 19.0);
        assert_eq!(r.births[SideId::Human.index()], 2);
        assert_eq!(game.side(SideId::Human).units(), 3);
    }

    #[test]
    fn no_rice_means_no_new_units() {
        let mut game = flat_game(10, 5);
        let human = game.side_mut(SideId::Human);
        human.set_rice(0.0);
        human.set_houses(2);
        let mut engine = logging_engine();

        let r = engine.end_of_day(&mut game).unwrap();
        assert_eq!(game.side(SideId::Human).rice(), 0.0);
        assert_eq!(r.births[SideId::Human.index()], 0);
        assert_eq!(game.side(SideId::Human).units(), 15);
    }

    #[test]
    fn exhausted_side_loses() {
        let mut game = flat_game(10, 5);
        game.side_mut(SideId::Opponent).set_units(0);
        let mut engine = logging_engine();

        let r = engine.end_of_day(&mut game).unwrap();
        assert_eq!(r.winner, Some(SideId::Human));
        assert!(game.is_finished());
        assert!(engine.observer().events.contains(&GameEvent::GameOver {
            day: 1,
            winner: SideId::Human
        }));
    }

    #[test]
    fn workforce_tie_goes_to_opponent() {
        let mut game = flat_game(10, 5);
        game.side_mut(SideId::Human).set_units(0);
        game.side_mut(SideId::Opponent).set_units(0);
        assert!(is_game_over(&game));
        assert_eq!(decide_winner(&game), SideId::Opponent);

        let mut engine = logging_engine();
        let r = engine.end_of_day(&mut game).unwrap();
        assert_eq!(r.winner, Some(SideId::Opponent));
    }

    #[test]
    fn zero_units_with_houses_is_not_exhausted() {
        let mut game = flat_game(10, 5);
        let human = game.side_mut(SideId::Human);
        human.set_units(0);
        human.set_houses(1);
        assert!(!is_game_over(&game));
    }

    #[test]
    fn half_the_board_wins() {
        let mut game = flat_game(4, 0);
        let targets = [(3, 2), (3, 1), (3, 0), (2, 3), (2, 2), (2, 1), (2, 0)];
        for (x, y) in targets {
            let (side, _, board) = game.split_mut(SideId::Human);
            assert_eq!(
                side.claim_territory(Coord::new(x, y), board),
                ClaimOutcome::Claimed
            );
        }
        assert_eq!(game.side(SideId::Human).controlled_tiles(), 8);
        assert!(is_game_over(&game));
        assert_eq!(decide_winner(&game), SideId::Human);
    }

    #[test]
    fn territory_tie_goes_to_opponent() {
        let mut game = flat_game(4, 0);
        for (id, cells) in [
            (SideId::Human, [(3, 2), (3, 1), (3, 0), (2, 3), (2, 2), (2, 1), (2, 0)]),
            (SideId::Opponent, [(0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2), (1, 3)]),
        ] {
            for (x, y) in cells {
                let (side, _, board) = game.split_mut(id);
                side.claim_territory(Coord::new(x, y), board);
            }
        }
        assert_eq!(game.side(SideId::Human).controlled_tiles(), 8);
        assert_eq!(game.side(SideId::Opponent).controlled_tiles(), 8);
        assert_eq!(decide_winner(&game), SideId::Opponent);
    }

    #[test]
    fn finished_game_rejects_further_play() {
        let mut game = flat_game(10, 5);
        game.side_mut(SideId::Opponent).set_units(0);
        let mut engine = logging_engine();
        engine.end_of_day(&mut game).unwrap();

        let err = engine
            .play_day(&mut game, Some(PlayerAction::CollectWater))
            .unwrap_err();
        assert_eq!(
            err,
            TurnError::GameOver {
                winner: SideId::Human
            }
        );
        assert_eq!(game.day, 1);
        assert_eq!(game.side(SideId::Human).water(), 10.0);
    }

    #[test]
    fn play_day_reports_both_moves_in_order() {
        let mut game = flat_game(10, 5);
        let mut engine = logging_engine();

        let report = engine
            .play_day(&mut game, Some(PlayerAction::Claim(Coord::new(8, 9))))
            .unwrap();
        assert_eq!(
            report.player,
            Some(ActionOutcome::Claim(Coord::new(8, 9), ClaimOutcome::Claimed))
        );
        assert_eq!(report.opponent, OpponentMove::Claimed(Coord::new(0, 1)));
        assert_eq!(report.resolution.day, 1);
        assert_eq!(report.statistics.side(SideId::Human).tiles, 2);

        let events = &engine.observer().events;
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            GameEvent::ActionApplied {
                side: SideId::Human,
                succeeded: true,
                ..
            }
        ));
        assert!(matches!(
            events[1],
            GameEvent::ActionApplied {
                side: SideId::Opponent,
                ..
            }
        ));
        assert!(matches!(events[2], GameEvent::DayResolved(_)));
    }

    #[test]
    fn skipping_the_player_action_still_advances() {
        let mut game = flat_game(10, 5);
        let mut engine = logging_engine();
        let report = engine.play_day(&mut game, None).unwrap();
        assert_eq!(report.player, None);
        assert_eq!(game.day, 1);
    }

    #[test]
    fn closures_can_observe() {
        let mut game = flat_game(10, 5);
        let mut days = Vec::new();
        {
            let mut engine = TurnEngine::new(ScriptedOpponent, |e: &GameEvent| {
                if let GameEvent::DayResolved(r) = e {
                    days.push(r.day);
                }
            });
            engine.play_day(&mut game, None).unwrap();
            engine.play_day(&mut game, None).unwrap();
        }
        assert_eq!(days, vec![1, 2]);
    }

    #[test]
    fn invariants_hold_over_a_long_game() {
        let mut game = generate_game(
            &GenerationParams {
                seed: 2024,
                board_size: 10,
            },
            &StartingResources::default(),
        )
        .unwrap();
        let mut engine = logging_engine();
        let actions = [
            PlayerAction::Water(Coord::new(9, 9)),
            PlayerAction::Claim(Coord::new(8, 9)),
            PlayerAction::CollectWater,
            PlayerAction::Build(Coord::new(9, 9)),
        ];

        for day in 0..300 {
            if game.is_finished() {
                break;
            }
            let action = actions[day % actions.len()];
            let before: Vec<u32> = game.sides.iter().map(|s| s.controlled_tiles()).collect();
            engine.play_day(&mut game, Some(action)).unwrap();

            for (side, prev) in game.sides.iter().zip(before) {
                assert!(side.controlled_tiles() >= prev);
                assert_eq!(side.controlled_tiles(), game.board.count_controlled(side.id()));
                assert_eq!(side.history().len(), game.day as usize);
                assert!(side.rice() >= 0.0);
                assert!(side.water() >= 0.0);
            }
            for (_, tile, level) in game.board.cells() {
                let cap = if tile.is_watered() { 3.0 } else { 2.0 };
                assert!(level <= cap);
            }
        }
        game.validate().unwrap();
    }
}
