pub mod events;
pub mod population;
pub mod tick;

pub use events::{SimulationEvent, SpawnCause, WorldEffect};
pub use population::{GameOutcome, PopulationTracker};
pub use tick::run_simulation_tick;
