use serde::Serialize;
use tracing::info;

use crate::simulation::DayResolution;
use crate::world::SideId;

/// Notable moments in a game, emitted by the turn engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// A side's action for the day was applied. `description` is display text.
    ActionApplied {
        day: u32,
        side: SideId,
        succeeded: bool,
        description: String,
    },
    DayResolved(DayResolution),
    GameOver { day: u32, winner: SideId },
}

/// Receives [`GameEvent`]s from the turn engine.
pub trait GameObserver {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F: FnMut(&GameEvent)> GameObserver for F {
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl GameObserver for TracingObserver {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ActionApplied {
                day,
                side,
                succeeded,
                description,
            } => {
                info!(day, %side, succeeded, "{}", description);
            }
            GameEvent::DayResolved(r) => {
                info!(
                    day = r.day,
                    human_harvest = r.harvested[0],
                    opponent_harvest = r.harvested[1],
                    human_births = r.births[0],
                    opponent_births = r.births[1],
                    "Day resolved"
                );
            }
            GameEvent::GameOver { day, winner } => {
                info!(day, %winner, "Game over");
            }
        }
    }
}

/// Keeps every event in order, for display after the fact.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
}

impl GameObserver for EventLog {
    fn on_event(&mut self, event: &GameEvent) {
        self.events.push(event.clone());
    }
}

impl EventLog {
    /// Human-readable lines for the action and game-over events.
    pub fn lines(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                GameEvent::ActionApplied { description, .. } => Some(description.clone()),
                GameEvent::GameOver { winner, day } => {
                    Some(format!("Game over after day {}: {} wins", day, winner))
                }
                GameEvent::DayResolved(_) => None,
            })
            .collect()
    }
}
