//! Common entity query helpers.
//!
//! Reusable read-only lookups shared across systems. Missing components are
//! expected and surface as `None`/conservative defaults, never as errors.

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{Dead, Position, Stats};

/// Get an entity's world position
pub fn entity_position(world: &World, entity: Entity) -> Option<Vec2> {
    world.get::<&Position>(entity).ok().map(|p| p.vec())
}

/// Check if an entity is dead (hp depleted or despawned). Entities without
/// stats are treated as dead for targeting purposes.
pub fn is_entity_dead(world: &World, entity: Entity) -> bool {
    world
        .get::<&Stats>(entity)
        .map(|s| s.is_dead())
        .unwrap_or(true)
}

/// Check if an entity carries the `Dead` marker
pub fn has_dead_marker(world: &World, entity: Entity) -> bool {
    world.get::<&Dead>(entity).is_ok()
}

/// Distance between two entities, if both have positions
pub fn distance_between(world: &World, a: Entity, b: Entity) -> Option<f32> {
    let pa = entity_position(world, a)?;
    let pb = entity_position(world, b)?;
    Some(pa.distance(pb))
}
