//! Real-time simulation core for a tile-based action RPG.
//!
//! The crate runs a fixed-timestep world of monsters and one player on a
//! tile grid: collision-aware movement, A* pathfinding with waypoint
//! following and stuck recovery, a per-monster finite state machine, and
//! stochastic melee combat with a two-phase death sweep. Rendering, input,
//! and persistence live outside; the embedding layer drives
//! [`game_loop::Simulation`] with wall-clock time, observes the world
//! through [`events::GameEvent`]s, and supplies loot and progression
//! callbacks via [`hooks::Hooks`].

pub mod components;
pub mod constants;
pub mod events;
pub mod game_loop;
pub mod grid;
pub mod hooks;
pub mod pathfinding;
pub mod queries;
pub mod spawning;
pub mod systems;

pub use components::{Ai, AiState, Behavior, Combat, Movement, Position, Stats};
pub use events::{EventQueue, GameEvent};
pub use game_loop::Simulation;
pub use grid::Grid;
pub use hooks::{Hooks, ItemDrop, NoopHooks};
pub use spawning::{MonsterTemplate, SpawnPoint};
