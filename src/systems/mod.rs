//! Simulation systems organized by domain.
//!
//! This module contains all per-tick logic, split into focused submodules:
//! - `ai`: monster state machine and decision-making
//! - `movement`: collision-aware movement resolution
//! - `path`: waypoint following and stuck recovery
//! - `combat`: swing timing, attack resolution, damage
//! - `death`: death handling and the corpse sweep
//! - `experience`: XP and leveling

pub mod ai;
pub mod combat;
pub mod death;
pub mod experience;
pub mod movement;
pub mod path;

// Re-export commonly used items
pub use ai::{start_chase, transition_ai_state, update_ai};
pub use combat::{perform_attack, resolve_attacks, try_start_attack};
pub use death::{kill_monster, kill_player, sweep_dead};
pub use experience::grant_xp;
pub use movement::facing_from_delta;
pub use path::{request_path, PathRequest};
