//! Component types stored in the hecs world.
//!
//! Each entity owns zero-or-one instance of each component. Systems look
//! components up explicitly and skip entities that lack what they need.

use glam::Vec2;
use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Position component - world coordinates in pixels
#[derive(Debug, Clone, Copy)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn vec(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn set_vec(&mut self, v: Vec2) {
        self.x = v.x;
        self.y = v.y;
    }
}

/// Movement intent: where the entity wants to go and how fast.
///
/// Position is only ever mutated by the movement resolver (or an explicit
/// teleport); everything else just writes intents here.
#[derive(Debug, Clone, Copy)]
pub struct Movement {
    /// Current movement target in world coordinates
    pub target: Vec2,
    /// 8-way facing, East = 0, clockwise
    pub direction: u8,
    pub base_speed: f32,
    pub speed: f32,
    pub is_moving: bool,
    pub is_running: bool,
    /// Temporary speed boost, only active while a monster is returning home
    pub is_hasted: bool,
}

impl Movement {
    pub fn new(base_speed: f32) -> Self {
        Self {
            target: Vec2::ZERO,
            direction: 0,
            base_speed,
            speed: base_speed,
            is_moving: false,
            is_running: false,
            is_hasted: false,
        }
    }

    /// Speed after run/haste multipliers
    pub fn effective_speed(&self) -> f32 {
        let mut speed = self.speed;
        if self.is_running {
            speed *= RUN_SPEED_MULTIPLIER;
        }
        if self.is_hasted {
            speed *= HASTE_SPEED_MULTIPLIER;
        }
        speed
    }

    pub fn move_to(&mut self, target: Vec2) {
        self.target = target;
        self.is_moving = true;
    }

    pub fn stop(&mut self) {
        self.is_moving = false;
    }
}

/// Axis-aligned solid bounds relative to the entity position, used for tile
/// collision queries.
#[derive(Debug, Clone, Copy)]
pub struct CollisionBox {
    pub offset_x: f32,
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
}

impl CollisionBox {
    pub fn new(offset_x: f32, offset_y: f32, width: f32, height: f32) -> Self {
        Self {
            offset_x,
            offset_y,
            width,
            height,
        }
    }

    /// A box centered on the entity position
    pub fn centered(width: f32, height: f32) -> Self {
        Self {
            offset_x: -width / 2.0,
            offset_y: -height / 2.0,
            width,
            height,
        }
    }
}

/// Waypoint list the path follower is walking, plus stuck-detection state.
#[derive(Debug, Clone)]
pub struct PathFollow {
    /// Waypoints in tile coordinates
    pub waypoints: Vec<(i32, i32)>,
    pub index: usize,
    pub is_following: bool,
    /// Seconds since the entity last made meaningful progress
    pub stuck_timer: f32,
    /// Position at the last progress check
    pub last_pos: Vec2,
    /// A stalled path gets exactly one recomputation before being abandoned
    pub recovery_used: bool,
}

impl PathFollow {
    pub fn new() -> Self {
        Self {
            waypoints: Vec::new(),
            index: 0,
            is_following: false,
            stuck_timer: 0.0,
            last_pos: Vec2::ZERO,
            recovery_used: false,
        }
    }

    /// Start following a fresh waypoint list from the given position
    pub fn follow(&mut self, waypoints: Vec<(i32, i32)>, from: Vec2) {
        self.waypoints = waypoints;
        self.index = 0;
        self.is_following = true;
        self.stuck_timer = 0.0;
        self.last_pos = from;
        self.recovery_used = false;
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.index = 0;
        self.is_following = false;
        self.stuck_timer = 0.0;
    }

    pub fn current_waypoint(&self) -> Option<(i32, i32)> {
        self.waypoints.get(self.index).copied()
    }

    pub fn final_goal(&self) -> Option<(i32, i32)> {
        self.waypoints.last().copied()
    }
}

impl Default for PathFollow {
    fn default() -> Self {
        Self::new()
    }
}

/// Attack state and combat tuning for one entity.
#[derive(Debug, Clone, Copy)]
pub struct Combat {
    pub is_attacking: bool,
    pub attack_target: Option<Entity>,
    /// Seconds into the current swing
    pub swing_timer: f32,
    pub swing_duration: f32,
    /// Point in the swing at which damage lands
    pub hit_frame: f32,
    /// Set once the current swing's damage has been resolved
    pub damage_dealt: bool,
    pub cooldown: f32,
    pub cooldown_remaining: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub evasion: f32,
}

impl Combat {
    pub fn new(cooldown: f32, crit_chance: f32, crit_multiplier: f32, evasion: f32) -> Self {
        Self {
            is_attacking: false,
            attack_target: None,
            swing_timer: 0.0,
            swing_duration: ATTACK_SWING_DURATION,
            hit_frame: ATTACK_HIT_FRAME,
            damage_dealt: false,
            cooldown,
            cooldown_remaining: 0.0,
            crit_chance,
            crit_multiplier,
            evasion,
        }
    }

    pub fn can_attack(&self) -> bool {
        !self.is_attacking && self.cooldown_remaining <= 0.0
    }

    /// True only at the swing's hit frame, before damage has been resolved
    pub fn should_deal_damage(&self) -> bool {
        self.is_attacking && !self.damage_dealt && self.swing_timer >= self.hit_frame
    }

    pub fn start_attack(&mut self, target: Entity) {
        self.is_attacking = true;
        self.attack_target = Some(target);
        self.swing_timer = 0.0;
        self.damage_dealt = false;
        self.cooldown_remaining = self.cooldown;
    }

    pub fn tick(&mut self, dt: f32) {
        if self.cooldown_remaining > 0.0 {
            self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
        }
        if self.is_attacking {
            self.swing_timer += dt;
            if self.swing_timer >= self.swing_duration {
                self.is_attacking = false;
            }
        }
    }
}

/// Core attribute block: health, damage stats, and resource pools.
#[derive(Debug, Clone, Copy)]
pub struct Stats {
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub stamina_regen: f32,
    pub mana: f32,
    pub max_mana: f32,
    pub mana_regen: f32,
}

impl Stats {
    pub fn new(max_hp: i32, attack: i32, defense: i32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            attack,
            defense,
            stamina: DEFAULT_MAX_STAMINA,
            max_stamina: DEFAULT_MAX_STAMINA,
            stamina_regen: DEFAULT_STAMINA_REGEN,
            mana: DEFAULT_MAX_MANA,
            max_mana: DEFAULT_MAX_MANA,
            mana_regen: DEFAULT_MANA_REGEN,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Apply damage, clamping hp at zero
    pub fn apply_damage(&mut self, damage: i32) {
        self.hp = (self.hp - damage).max(0);
    }

    pub fn heal_full(&mut self) {
        self.hp = self.max_hp;
    }

    /// Spend stamina if available. Returns false (and changes nothing) when
    /// the pool is short.
    pub fn spend_stamina(&mut self, cost: f32) -> bool {
        if self.stamina < cost {
            return false;
        }
        self.stamina -= cost;
        true
    }

    pub fn tick_regen(&mut self, dt: f32) {
        self.stamina = (self.stamina + self.stamina_regen * dt).min(self.max_stamina);
        self.mana = (self.mana + self.mana_regen * dt).min(self.max_mana);
    }
}

/// Monster disposition toward the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    /// Attacks the player on sight
    Aggressive,
    /// Ignores the player until struck
    Passive,
}

/// Monster AI states. Transitions go through
/// [`crate::systems::ai::transition_ai_state`] so movement and path state
/// never leak across a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiState {
    Idle,
    Roaming,
    Chasing,
    Returning,
    Attacking,
    VictoryIdle,
    Dead,
}

/// Per-monster decision state: home leash, perception ranges, and the timers
/// driving each FSM state.
#[derive(Debug, Clone, Copy)]
pub struct Ai {
    pub state: AiState,
    /// Spawn anchor the monster roams around and returns to
    pub home: Vec2,
    pub roam_radius: f32,
    /// Player detection range in tiles
    pub detection_range: f32,
    /// Attack reach in world units
    pub attack_range: f32,
    /// Leash: maximum distance from home while chasing
    pub return_threshold: f32,
    pub behavior: Behavior,
    pub roam_timer: f32,
    pub roam_interval: f32,
    pub path_timer: f32,
    pub path_update_interval: f32,
    pub attack_timer: f32,
    pub attack_interval: f32,
    pub victory_timer: f32,
    pub victory_idle_duration: f32,
    pub target: Option<Entity>,
    /// Set while a roam destination is pending; cleared on every transition
    pub roam_target: Option<Vec2>,
}

impl Ai {
    /// AI-level attack cooldown (the swing itself is gated by [`Combat`])
    pub fn can_attack(&self) -> bool {
        self.attack_timer >= self.attack_interval
    }
}

/// Marker plus countdown attached when an entity dies. Suppresses AI,
/// path-following, and movement; the death sweep despawns the entity once
/// the countdown elapses.
#[derive(Debug, Clone, Copy)]
pub struct Dead {
    pub remaining: f32,
}

impl Dead {
    pub fn new(remaining: f32) -> Self {
        Self { remaining }
    }
}

/// Player marker component
#[derive(Debug, Clone, Copy)]
pub struct Player;

/// Friendly NPC marker (no combat AI)
#[derive(Debug, Clone, Copy)]
pub struct Npc;

/// Portal marker
#[derive(Debug, Clone, Copy)]
pub struct Portal;

/// Monster identity used by loot generation and quest bookkeeping.
#[derive(Debug, Clone)]
pub struct Monster {
    pub name: String,
    pub level: u32,
    /// Maximum number of drop slots the loot system may fill
    pub drop_capacity: u32,
    pub quest_id: Option<u32>,
}

/// The player's sticky attack target, cleared when either side dies.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoAttack {
    pub target: Option<Entity>,
}

/// An equipped weapon. Durability drops on whiffed player swings.
#[derive(Debug, Clone)]
pub struct Weapon {
    pub name: String,
    pub durability: u32,
}

/// Equipment component (weapon slot only - armor lives outside the core)
#[derive(Debug, Clone, Default)]
pub struct Equipment {
    pub weapon: Option<Weapon>,
}

impl Equipment {
    pub fn with_weapon(weapon: Weapon) -> Self {
        Self {
            weapon: Some(weapon),
        }
    }
}

/// Experience component
#[derive(Debug, Clone, Copy)]
pub struct Experience {
    pub current: u32,
    pub level: u32,
}

impl Experience {
    pub fn new() -> Self {
        Self {
            current: 0,
            level: 1,
        }
    }
}

impl Default for Experience {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haste_triples_speed() {
        let mut movement = Movement::new(100.0);
        assert_eq!(movement.effective_speed(), 100.0);
        movement.is_hasted = true;
        assert_eq!(movement.effective_speed(), 300.0);
    }

    #[test]
    fn test_should_deal_damage_only_at_hit_frame() {
        let mut world = hecs::World::new();
        let target = world.spawn(());

        let mut combat = Combat::new(1.0, 0.0, 2.0, 0.0);
        assert!(!combat.should_deal_damage());

        combat.start_attack(target);
        assert!(!combat.should_deal_damage());

        combat.tick(combat.hit_frame);
        assert!(combat.should_deal_damage());

        combat.damage_dealt = true;
        assert!(!combat.should_deal_damage());
    }

    #[test]
    fn test_attack_cooldown_gates_next_swing() {
        let mut world = hecs::World::new();
        let target = world.spawn(());

        let mut combat = Combat::new(1.0, 0.0, 2.0, 0.0);
        assert!(combat.can_attack());
        combat.start_attack(target);
        assert!(!combat.can_attack());

        // Swing ends but cooldown is still running
        combat.tick(combat.swing_duration);
        assert!(!combat.can_attack());

        combat.tick(1.0);
        assert!(combat.can_attack());
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut stats = Stats::new(10, 5, 0);
        stats.apply_damage(25);
        assert_eq!(stats.hp, 0);
        assert!(stats.is_dead());
    }

    #[test]
    fn test_spend_stamina_aborts_when_short() {
        let mut stats = Stats::new(10, 5, 0);
        stats.stamina = 3.0;
        assert!(!stats.spend_stamina(5.0));
        assert_eq!(stats.stamina, 3.0);
        assert!(stats.spend_stamina(3.0));
        assert_eq!(stats.stamina, 0.0);
    }
}
