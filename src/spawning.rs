//! Entity assembly: monster templates, spawn points, and the player bundle.
//!
//! Monster tuning is data, not code: a [`MonsterTemplate`] carries every
//! per-species knob (stats, perception ranges, leash distance, timer
//! intervals) and can be loaded from JSON.

use glam::Vec2;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use crate::components::{
    Ai, AiState, AutoAttack, Behavior, CollisionBox, Combat, Equipment, Experience, Monster,
    Movement, PathFollow, Player, Position, Stats, Weapon,
};
use crate::constants::ROAM_INTERVAL_MIN;

/// Everything needed to stamp out one monster species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub name: String,
    pub level: u32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: f32,
    pub behavior: Behavior,
    /// Collision box edge length, centered on the entity
    pub collision_size: f32,
    /// Roam radius around home, world units
    pub roam_radius: f32,
    /// Player detection range, in tiles
    pub detection_range: f32,
    /// Attack reach, world units
    pub attack_range: f32,
    /// Leash distance from home while chasing, world units
    pub return_threshold: f32,
    /// Seconds between chase path recomputations
    pub path_update_interval: f32,
    /// Minimum seconds between swings
    pub attack_interval: f32,
    /// Seconds spent gloating after downing the player
    pub victory_idle_duration: f32,
    pub attack_cooldown: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub evasion: f32,
    pub drop_capacity: u32,
    #[serde(default)]
    pub quest_id: Option<u32>,
}

impl MonsterTemplate {
    /// Parse a template from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Spawn one instance of this species anchored at `home`.
    pub fn spawn(&self, world: &mut World, home: Vec2) -> Entity {
        world.spawn((
            Position::new(home.x, home.y),
            Movement::new(self.speed),
            CollisionBox::centered(self.collision_size, self.collision_size),
            PathFollow::new(),
            Combat::new(
                self.attack_cooldown,
                self.crit_chance,
                self.crit_multiplier,
                self.evasion,
            ),
            Stats::new(self.max_hp, self.attack, self.defense),
            Ai {
                state: AiState::Idle,
                home,
                roam_radius: self.roam_radius,
                detection_range: self.detection_range,
                attack_range: self.attack_range,
                return_threshold: self.return_threshold,
                behavior: self.behavior,
                roam_timer: 0.0,
                roam_interval: ROAM_INTERVAL_MIN,
                path_timer: 0.0,
                path_update_interval: self.path_update_interval,
                // Starts ready so the first swing is not delayed
                attack_timer: self.attack_interval,
                attack_interval: self.attack_interval,
                victory_timer: 0.0,
                victory_idle_duration: self.victory_idle_duration,
                target: None,
                roam_target: None,
            },
            Monster {
                name: self.name.clone(),
                level: self.level,
                drop_capacity: self.drop_capacity,
                quest_id: self.quest_id,
            },
        ))
    }
}

/// Spawn the player bundle at a world position.
pub fn spawn_player(world: &mut World, position: Vec2) -> Entity {
    world.spawn((
        Player,
        Position::new(position.x, position.y),
        Movement::new(160.0),
        CollisionBox::centered(28.0, 28.0),
        PathFollow::new(),
        Combat::new(0.8, 0.1, 2.0, 0.05),
        Stats::new(100, 10, 2),
        Experience::new(),
        AutoAttack::default(),
        Equipment::with_weapon(Weapon {
            name: "Worn Sword".to_string(),
            durability: 100,
        }),
    ))
}

/// A respawning monster anchor. The game loop re-stamps the template after
/// the previous occupant has died and the respawn delay has elapsed.
#[derive(Debug, Clone)]
pub struct SpawnPoint {
    pub template: MonsterTemplate,
    pub position: Vec2,
    /// Seconds between the occupant's despawn and the replacement
    pub respawn_delay: f32,
    pub timer: f32,
    pub entity: Option<Entity>,
}

impl SpawnPoint {
    pub fn new(template: MonsterTemplate, position: Vec2, respawn_delay: f32) -> Self {
        Self {
            template,
            position,
            respawn_delay,
            timer: 0.0,
            entity: None,
        }
    }
}

/// Built-in species used by tests and demos.
pub mod templates {
    use super::MonsterTemplate;
    use crate::components::Behavior;

    pub fn wolf() -> MonsterTemplate {
        MonsterTemplate {
            name: "Wolf".to_string(),
            level: 3,
            max_hp: 40,
            attack: 8,
            defense: 2,
            speed: 120.0,
            behavior: Behavior::Aggressive,
            collision_size: 24.0,
            roam_radius: 200.0,
            detection_range: 4.0,
            attack_range: 48.0,
            return_threshold: 600.0,
            path_update_interval: 0.5,
            attack_interval: 1.2,
            victory_idle_duration: 2.0,
            attack_cooldown: 1.0,
            crit_chance: 0.05,
            crit_multiplier: 1.5,
            evasion: 0.1,
            drop_capacity: 2,
            quest_id: None,
        }
    }

    pub fn slime() -> MonsterTemplate {
        MonsterTemplate {
            name: "Slime".to_string(),
            level: 1,
            max_hp: 15,
            attack: 3,
            defense: 0,
            speed: 60.0,
            behavior: Behavior::Passive,
            collision_size: 20.0,
            roam_radius: 150.0,
            detection_range: 3.0,
            attack_range: 40.0,
            return_threshold: 400.0,
            path_update_interval: 0.8,
            attack_interval: 1.5,
            victory_idle_duration: 1.5,
            attack_cooldown: 1.2,
            crit_chance: 0.0,
            crit_multiplier: 1.5,
            evasion: 0.0,
            drop_capacity: 1,
            quest_id: Some(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Ai, AiState, Monster, Stats};

    #[test]
    fn test_spawn_assembles_monster_at_home() {
        let mut world = World::new();
        let home = Vec2::new(320.0, 256.0);
        let entity = templates::wolf().spawn(&mut world, home);

        let ai = world.get::<&Ai>(entity).unwrap();
        assert_eq!(ai.state, AiState::Idle);
        assert_eq!(ai.home, home);
        assert!(ai.attack_timer >= ai.attack_interval);
        drop(ai);

        let stats = world.get::<&Stats>(entity).unwrap();
        assert_eq!(stats.hp, stats.max_hp);
        drop(stats);

        assert_eq!(world.get::<&Monster>(entity).unwrap().name, "Wolf");
        assert_eq!(world.get::<&Position>(entity).unwrap().vec(), home);
    }

    #[test]
    fn test_template_from_json() {
        let json = r#"{
            "name": "Cave Bat",
            "level": 2,
            "max_hp": 12,
            "attack": 4,
            "defense": 0,
            "speed": 140.0,
            "behavior": "Aggressive",
            "collision_size": 16.0,
            "roam_radius": 180.0,
            "detection_range": 5.0,
            "attack_range": 36.0,
            "return_threshold": 500.0,
            "path_update_interval": 0.4,
            "attack_interval": 1.0,
            "victory_idle_duration": 2.0,
            "attack_cooldown": 0.9,
            "crit_chance": 0.02,
            "crit_multiplier": 1.5,
            "evasion": 0.25,
            "drop_capacity": 1
        }"#;

        let template = MonsterTemplate::from_json(json).unwrap();
        assert_eq!(template.name, "Cave Bat");
        assert_eq!(template.behavior, Behavior::Aggressive);
        assert_eq!(template.quest_id, None);
        assert_eq!(template.evasion, 0.25);
    }

    #[test]
    fn test_spawn_player_bundle() {
        let mut world = World::new();
        let player = spawn_player(&mut world, Vec2::new(100.0, 100.0));

        assert!(world.get::<&Player>(player).is_ok());
        assert!(world.get::<&Experience>(player).is_ok());
        let equipment = world.get::<&Equipment>(player).unwrap();
        assert!(equipment.weapon.is_some());
    }
}
