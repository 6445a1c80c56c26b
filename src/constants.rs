//! Simulation constants organized by category.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.
//! Per-monster values (leash distance, path recompute interval, ranges)
//! are NOT here - they live on monster templates as tunable data.

// =============================================================================
// TIME
// =============================================================================

/// Fixed simulation rate (ticks per second)
pub const TICK_RATE: f32 = 60.0;
/// Fixed timestep in seconds
pub const TICK_DT: f32 = 1.0 / TICK_RATE;

// =============================================================================
// MAP
// =============================================================================

/// Tile edge length in world units
pub const TILE_SIZE: f32 = 64.0;

// =============================================================================
// MOVEMENT
// =============================================================================

/// Speed multiplier while running
pub const RUN_SPEED_MULTIPLIER: f32 = 1.5;
/// Speed multiplier while hasted (returning monsters only)
pub const HASTE_SPEED_MULTIPLIER: f32 = 3.0;
/// Distance at which a path waypoint counts as reached
pub const WAYPOINT_ARRIVE_DISTANCE: f32 = 5.0;
/// Minimum displacement per stuck check to count as progress
pub const STUCK_MIN_MOVEMENT: f32 = 2.0;
/// Seconds without progress before stuck recovery kicks in
pub const STUCK_TIMEOUT: f32 = 0.5;

// =============================================================================
// AI
// =============================================================================

/// Roam interval reseed range on entering IDLE (seconds)
pub const ROAM_INTERVAL_MIN: f32 = 3.0;
pub const ROAM_INTERVAL_MAX: f32 = 6.0;
/// Aggro requires the monster within roam_radius times this of home
pub const AGGRO_HOME_LIMIT_FACTOR: f32 = 1.5;
/// Aggro drops beyond detection range times this
pub const AGGRO_DROP_FACTOR: f32 = 1.5;
/// ATTACKING falls back to CHASING beyond attack range times this
pub const ATTACK_BREAK_FACTOR: f32 = 1.5;
/// After VICTORY_IDLE, idle in place if within roam_radius times this of home
pub const VICTORY_HOME_FACTOR: f32 = 1.2;
/// Distance from home at which RETURNING counts as arrived
pub const RETURN_ARRIVE_DISTANCE: f32 = 32.0;

// =============================================================================
// COMBAT
// =============================================================================

/// Damage floor after defense
pub const MIN_DAMAGE: i32 = 1;
/// Full swing duration (seconds)
pub const ATTACK_SWING_DURATION: f32 = 0.4;
/// Point in the swing at which damage lands (seconds)
pub const ATTACK_HIT_FRAME: f32 = 0.2;
/// Stamina cost to start a swing
pub const ATTACK_STAMINA_COST: f32 = 5.0;
/// Player melee reach in world units
pub const PLAYER_ATTACK_RANGE: f32 = 48.0;

// =============================================================================
// RESOURCE POOLS
// =============================================================================

pub const DEFAULT_MAX_STAMINA: f32 = 100.0;
pub const DEFAULT_STAMINA_REGEN: f32 = 10.0;
pub const DEFAULT_MAX_MANA: f32 = 50.0;
pub const DEFAULT_MANA_REGEN: f32 = 5.0;

// =============================================================================
// DEATH
// =============================================================================

/// Seconds a dead monster lingers before removal
pub const MONSTER_CORPSE_DURATION: f32 = 1.5;
/// Seconds a dead player lingers before removal
pub const PLAYER_CORPSE_DURATION: f32 = 10.0;

// =============================================================================
// EXPERIENCE
// =============================================================================

/// XP needed per level = level * this
pub const XP_PER_LEVEL_MULTIPLIER: u32 = 100;
/// XP granted per monster level on kill
pub const MONSTER_XP_PER_LEVEL: u32 = 25;
