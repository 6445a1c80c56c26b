//! Waypoint following and stuck recovery.
//!
//! Paths come out of the pathfinder as tile coordinates; the follower feeds
//! them to the movement resolver one pixel-center target at a time. A path
//! that stops making progress gets exactly one recomputation before being
//! abandoned.

use glam::Vec2;
use hecs::World;

use crate::components::{CollisionBox, Dead, Movement, PathFollow, Position};
use crate::constants::{STUCK_MIN_MOVEMENT, STUCK_TIMEOUT, WAYPOINT_ARRIVE_DISTANCE};
use crate::grid::Grid;
use crate::pathfinding;

/// Outcome of a path request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRequest {
    /// A path was found and the entity is now following it
    Following,
    /// Start and goal fall on the same tile - nothing to follow
    AlreadyThere,
    /// No route exists
    Unreachable,
}

/// Plot a route from a world position to a world position and start
/// following it.
pub fn request_path(
    grid: &Grid,
    path: &mut PathFollow,
    bbox: Option<&CollisionBox>,
    from: Vec2,
    to: Vec2,
) -> PathRequest {
    let start = Grid::world_to_tile(from);
    let goal = Grid::world_to_tile(to);
    if start == goal {
        return PathRequest::AlreadyThere;
    }
    match pathfinding::find_path(grid, start, goal, bbox) {
        Some(waypoints) if !waypoints.is_empty() => {
            path.follow(waypoints, from);
            PathRequest::Following
        }
        _ => PathRequest::Unreachable,
    }
}

/// Advance every path-following entity: update stuck timers, run recovery,
/// and emit the next movement target.
pub fn follow_paths(world: &mut World, grid: &Grid, dt: f32) {
    puffin::profile_function!();

    for (_, (pos, movement, path, bbox)) in world
        .query::<(
            &mut Position,
            &mut Movement,
            &mut PathFollow,
            &CollisionBox,
        )>()
        .without::<&Dead>()
        .iter()
    {
        if !path.is_following {
            continue;
        }

        let here = pos.vec();

        // Stuck detection: the timer resets whenever net displacement since
        // the last check clears the minimum-movement threshold
        if here.distance(path.last_pos) > STUCK_MIN_MOVEMENT {
            path.stuck_timer = 0.0;
            path.last_pos = here;
        } else {
            path.stuck_timer += dt;
        }

        if path.stuck_timer > STUCK_TIMEOUT {
            recover_stuck(grid, path, movement, bbox, here);
            if !path.is_following {
                continue;
            }
        }

        // Advance past any waypoints already within reach, then target the
        // next one
        loop {
            let Some((tx, ty)) = path.current_waypoint() else {
                // Waypoints exhausted: land exactly on the final tile center
                if let Some((lx, ly)) = path.final_goal() {
                    pos.set_vec(Grid::tile_center(lx, ly));
                }
                movement.stop();
                path.clear();
                break;
            };

            let center = Grid::tile_center(tx, ty);
            if here.distance(center) <= WAYPOINT_ARRIVE_DISTANCE {
                path.index += 1;
                continue;
            }

            movement.move_to(center);
            break;
        }
    }
}

/// One-shot recovery for a stalled path: recompute from the current tile to
/// the original goal, or abandon the path entirely.
fn recover_stuck(
    grid: &Grid,
    path: &mut PathFollow,
    movement: &mut Movement,
    bbox: &CollisionBox,
    here: Vec2,
) {
    let goal = path.final_goal();
    let (Some(goal), false) = (goal, path.recovery_used) else {
        movement.stop();
        path.clear();
        return;
    };

    path.recovery_used = true;
    let start = Grid::world_to_tile(here);
    match pathfinding::find_path(grid, start, goal, Some(bbox)) {
        Some(waypoints) if !waypoints.is_empty() => {
            path.waypoints = waypoints;
            path.index = 0;
            path.stuck_timer = 0.0;
            path.last_pos = here;
        }
        _ => {
            movement.stop();
            path.clear();
        }
    }
}
