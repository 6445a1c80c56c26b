//! A* pathfinding over the tile grid.
//!
//! Searches are synchronous and bounded by the grid size; the caller gets a
//! waypoint list (excluding the start tile) or `None` when no route exists.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::components::CollisionBox;
use crate::grid::Grid;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct Node {
    x: i32,
    y: i32,
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct ScoredNode {
    node: Node,
    f_score: i32, // g_score + heuristic
}

// BinaryHeap is a max-heap, so we reverse the ordering for min-heap behavior
impl Ord for ScoredNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f_score.cmp(&self.f_score)
    }
}

impl PartialOrd for ScoredNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a path from start to goal using the A* algorithm, 4-way movement.
/// Returns the path as tile coordinates excluding the start tile, or `None`
/// if no path exists.
///
/// When a collision box is given, a tile only counts as walkable if the box
/// fits at that tile's center - wide entities route around narrow gaps.
pub fn find_path(
    grid: &Grid,
    start: (i32, i32),
    goal: (i32, i32),
    bbox: Option<&CollisionBox>,
) -> Option<Vec<(i32, i32)>> {
    let start_node = Node {
        x: start.0,
        y: start.1,
    };
    let goal_node = Node {
        x: goal.0,
        y: goal.1,
    };

    if !tile_fits(grid, goal.0, goal.1, bbox) {
        return None;
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<Node, Node> = HashMap::new();
    let mut g_score: HashMap<Node, i32> = HashMap::new();

    g_score.insert(start_node, 0);
    open_set.push(ScoredNode {
        node: start_node,
        f_score: heuristic(start, goal),
    });

    while let Some(current) = open_set.pop() {
        if current.node == goal_node {
            return Some(reconstruct_path(&came_from, current.node));
        }

        let current_g = *g_score.get(&current.node).unwrap_or(&i32::MAX);

        for (dx, dy) in [(0, 1), (0, -1), (1, 0), (-1, 0)] {
            let nx = current.node.x + dx;
            let ny = current.node.y + dy;
            let neighbor = Node { x: nx, y: ny };

            if !tile_fits(grid, nx, ny, bbox) {
                continue;
            }

            let tentative_g = current_g + 1;
            let neighbor_g = *g_score.get(&neighbor).unwrap_or(&i32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.node);
                g_score.insert(neighbor, tentative_g);
                open_set.push(ScoredNode {
                    node: neighbor,
                    f_score: tentative_g + heuristic((nx, ny), goal),
                });
            }
        }
    }

    None // No path found
}

/// Walkability check, box-aware when a collision box is supplied
fn tile_fits(grid: &Grid, tx: i32, ty: i32, bbox: Option<&CollisionBox>) -> bool {
    if !grid.is_walkable(tx, ty) {
        return false;
    }
    match bbox {
        Some(bbox) => {
            let center = Grid::tile_center(tx, ty);
            !grid.collides_with_box(bbox, center.x, center.y)
        }
        None => true,
    }
}

/// Manhattan distance heuristic
fn heuristic(from: (i32, i32), to: (i32, i32)) -> i32 {
    (from.0 - to.0).abs() + (from.1 - to.1).abs()
}

/// Reconstruct the path from came_from map
fn reconstruct_path(came_from: &HashMap<Node, Node>, mut current: Node) -> Vec<(i32, i32)> {
    let mut path = vec![(current.x, current.y)];

    while let Some(&prev) = came_from.get(&current) {
        path.push((prev.x, prev.y));
        current = prev;
    }

    path.reverse();
    // Remove the start position
    if !path.is_empty() {
        path.remove(0);
    }
    path
}
