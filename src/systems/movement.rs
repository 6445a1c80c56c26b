//! Collision-aware movement resolution.
//!
//! Converts movement intents into per-tick position deltas. Collisions are
//! resolved by sliding: shorter or axis-aligned sub-steps are tried before
//! giving up, and a fully blocked entity simply stays put for the tick -
//! stuck detection in the path follower handles the rest.

use glam::Vec2;
use hecs::World;

use crate::components::{CollisionBox, Dead, Movement, Position};
use crate::grid::Grid;

/// 8-way facing from a movement vector, East = 0, clockwise.
/// World y grows downward, so atan2(dy, dx) already winds clockwise.
pub fn facing_from_delta(delta: Vec2) -> u8 {
    let degrees = delta.y.atan2(delta.x).to_degrees();
    ((degrees / 45.0).round() as i32).rem_euclid(8) as u8
}

/// Advance every moving entity one tick, resolving tile collisions.
pub fn resolve_movement(world: &mut World, grid: &Grid, dt: f32) {
    puffin::profile_function!();

    for (_, (pos, movement, bbox)) in world
        .query::<(&mut Position, &mut Movement, &CollisionBox)>()
        .without::<&Dead>()
        .iter()
    {
        if !movement.is_moving {
            continue;
        }

        let here = pos.vec();
        let to_target = movement.target - here;
        let distance = to_target.length();
        if distance <= f32::EPSILON {
            movement.stop();
            continue;
        }

        let step = movement.effective_speed() * dt;

        // Close enough to cover the remaining distance this tick: snap to
        // the target, unless the destination itself is inside terrain
        if step >= distance {
            if !grid.collides_with_box(bbox, movement.target.x, movement.target.y) {
                pos.set_vec(movement.target);
            }
            movement.stop();
            continue;
        }

        let delta = to_target / distance * step;
        movement.direction = facing_from_delta(delta);

        // Slide resolution: full step, then X-only, Y-only, 50%, 25%.
        // If everything collides the entity does not move this tick.
        let attempts = [
            delta,
            Vec2::new(delta.x, 0.0),
            Vec2::new(0.0, delta.y),
            delta * 0.5,
            delta * 0.25,
        ];
        for attempt in attempts {
            if attempt.length_squared() <= f32::EPSILON {
                continue;
            }
            let next = here + attempt;
            if !grid.collides_with_box(bbox, next.x, next.y) {
                pos.set_vec(next);
                break;
            }
        }
    }
}
