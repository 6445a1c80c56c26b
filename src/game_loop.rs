//! Fixed-timestep simulation driver.
//!
//! Wall-clock time is folded into an accumulator and consumed in fixed
//! ticks, so simulation outcomes are independent of frame rate. Every tick
//! runs the systems in a fixed order: AI decisions, combat timers, the
//! player's auto-attack, path following, movement resolution, attack
//! resolution, the death sweep, and finally spawn-point respawns.

use glam::Vec2;
use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::{AutoAttack, CollisionBox, Combat, Movement, PathFollow};
use crate::constants::{PLAYER_ATTACK_RANGE, TICK_DT};
use crate::events::EventQueue;
use crate::grid::Grid;
use crate::hooks::Hooks;
use crate::queries;
use crate::spawning::{self, MonsterTemplate, SpawnPoint};
use crate::systems::{ai, combat, death, movement, path};

/// Most wall-clock time one update will fold in. Anything beyond this is
/// dropped so a long stall cannot snowball into a tick avalanche.
const MAX_FRAME_TIME: f32 = 0.25;

/// Seconds between the player's auto-attack path recomputations
const AUTO_ATTACK_REPATH_INTERVAL: f32 = 0.4;

/// The whole simulation: world, map, clock, and spawn bookkeeping.
pub struct Simulation {
    pub world: World,
    pub grid: Grid,
    pub events: EventQueue,
    pub spawn_points: Vec<SpawnPoint>,
    player: Entity,
    accumulator: f32,
    repath_timer: f32,
    rng: StdRng,
}

impl Simulation {
    /// Build a simulation on the given map, spawning the player at
    /// `player_spawn`. The seed fixes every stochastic outcome.
    pub fn new(grid: Grid, player_spawn: Vec2, seed: u64) -> Self {
        let mut world = World::new();
        let player = spawning::spawn_player(&mut world, player_spawn);
        Self {
            world,
            grid,
            events: EventQueue::new(),
            spawn_points: Vec::new(),
            player,
            accumulator: 0.0,
            repath_timer: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    /// Register a respawning monster anchor and stamp its first occupant.
    pub fn add_spawn_point(
        &mut self,
        template: MonsterTemplate,
        position: Vec2,
        respawn_delay: f32,
    ) -> Entity {
        let entity = template.spawn(&mut self.world, position);
        let mut point = SpawnPoint::new(template, position, respawn_delay);
        point.entity = Some(entity);
        self.spawn_points.push(point);
        entity
    }

    /// Route the player toward a world position. Clears any attack order.
    pub fn command_move(&mut self, to: Vec2) {
        if queries::is_entity_dead(&self.world, self.player) {
            return;
        }
        if let Ok(mut auto) = self.world.get::<&mut AutoAttack>(self.player) {
            auto.target = None;
        }
        let Some(from) = queries::entity_position(&self.world, self.player) else {
            return;
        };
        let bbox = self
            .world
            .get::<&CollisionBox>(self.player)
            .map(|b| *b)
            .ok();
        if let Ok(mut path_follow) = self.world.get::<&mut PathFollow>(self.player) {
            path::request_path(&self.grid, &mut path_follow, bbox.as_ref(), from, to);
        }
    }

    /// Order the player to attack a monster. The target sticks until either
    /// side dies or a move order replaces it.
    pub fn command_attack(&mut self, target: Entity) {
        if queries::is_entity_dead(&self.world, self.player) {
            return;
        }
        if let Ok(mut auto) = self.world.get::<&mut AutoAttack>(self.player) {
            auto.target = Some(target);
        }
        self.repath_timer = AUTO_ATTACK_REPATH_INTERVAL;
    }

    /// Toggle the player's run modifier.
    pub fn set_running(&mut self, running: bool) {
        if let Ok(mut mv) = self.world.get::<&mut Movement>(self.player) {
            mv.is_running = running;
        }
    }

    /// Fold `dt` seconds of wall time into fixed ticks. Returns the number
    /// of ticks executed.
    pub fn update(&mut self, dt: f32, hooks: &mut dyn Hooks) -> u32 {
        puffin::profile_function!();

        self.accumulator = (self.accumulator + dt).min(MAX_FRAME_TIME);
        let mut ticks = 0;
        while self.accumulator >= TICK_DT {
            self.accumulator -= TICK_DT;
            self.tick(hooks);
            ticks += 1;
        }
        ticks
    }

    /// One fixed simulation step.
    pub fn tick(&mut self, hooks: &mut dyn Hooks) {
        puffin::profile_function!();

        ai::update_ai(
            &mut self.world,
            &self.grid,
            self.player,
            TICK_DT,
            &mut self.events,
            &mut self.rng,
        );
        combat::tick_combat_timers(&mut self.world, TICK_DT);
        self.update_auto_attack();
        path::follow_paths(&mut self.world, &self.grid, TICK_DT);
        movement::resolve_movement(&mut self.world, &self.grid, TICK_DT);
        combat::resolve_attacks(&mut self.world, &mut self.events, hooks, &mut self.rng);
        let despawned = death::sweep_dead(&mut self.world, TICK_DT);
        self.update_spawn_points(&despawned);
    }

    /// Player auto-attack: chase the sticky target until in reach, then
    /// swing whenever the cooldown allows.
    fn update_auto_attack(&mut self) {
        self.repath_timer += TICK_DT;

        if queries::is_entity_dead(&self.world, self.player) {
            return;
        }
        let target = match self.world.get::<&AutoAttack>(self.player) {
            Ok(auto) => match auto.target {
                Some(target) => target,
                None => return,
            },
            Err(_) => return,
        };
        if queries::is_entity_dead(&self.world, target) {
            if let Ok(mut auto) = self.world.get::<&mut AutoAttack>(self.player) {
                auto.target = None;
            }
            return;
        }

        let (Some(player_pos), Some(target_pos)) = (
            queries::entity_position(&self.world, self.player),
            queries::entity_position(&self.world, target),
        ) else {
            return;
        };

        if player_pos.distance(target_pos) <= PLAYER_ATTACK_RANGE {
            // In reach: stand still and swing
            if let Ok(mut path_follow) = self.world.get::<&mut PathFollow>(self.player) {
                path_follow.clear();
            }
            if let Ok(mut mv) = self.world.get::<&mut Movement>(self.player) {
                mv.stop();
            }
            let ready = self
                .world
                .get::<&Combat>(self.player)
                .map(|c| c.can_attack())
                .unwrap_or(false);
            if ready {
                combat::face_target(&mut self.world, self.player, target_pos);
                combat::try_start_attack(&mut self.world, self.player, target);
            }
        } else if self.repath_timer >= AUTO_ATTACK_REPATH_INTERVAL {
            self.repath_timer = 0.0;
            let bbox = self
                .world
                .get::<&CollisionBox>(self.player)
                .map(|b| *b)
                .ok();
            if let Ok(mut path_follow) = self.world.get::<&mut PathFollow>(self.player) {
                path::request_path(
                    &self.grid,
                    &mut path_follow,
                    bbox.as_ref(),
                    player_pos,
                    target_pos,
                );
            }
        }
    }

    /// Advance respawn timers; restock anchors whose occupant is gone.
    fn update_spawn_points(&mut self, despawned: &[Entity]) {
        for point in &mut self.spawn_points {
            if let Some(entity) = point.entity {
                if despawned.contains(&entity) || !self.world.contains(entity) {
                    point.entity = None;
                    point.timer = 0.0;
                }
            }

            if point.entity.is_none() {
                point.timer += TICK_DT;
                if point.timer >= point.respawn_delay {
                    let entity = point.template.spawn(&mut self.world, point.position);
                    point.entity = Some(entity);
                    point.timer = 0.0;
                }
            }
        }
    }
}
