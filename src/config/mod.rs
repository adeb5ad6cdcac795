pub mod generation;
pub mod simulation;

pub use generation::GenerationParams;
pub use simulation::{SimulationConfig, StartingResources};
