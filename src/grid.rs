//! Tile map with collision queries and world/tile coordinate conversion.

use glam::Vec2;

use crate::components::CollisionBox;
use crate::constants::TILE_SIZE;

pub struct Grid {
    pub width: usize,
    pub height: usize,
    /// Row-major solidity flags (true = blocks movement)
    solid: Vec<bool>,
}

impl Grid {
    /// An open arena with a one-tile solid border
    pub fn new(width: usize, height: usize) -> Self {
        let mut grid = Self {
            width,
            height,
            solid: vec![false; width * height],
        };
        for x in 0..width as i32 {
            grid.set_solid(x, 0, true);
            grid.set_solid(x, height as i32 - 1, true);
        }
        for y in 0..height as i32 {
            grid.set_solid(0, y, true);
            grid.set_solid(width as i32 - 1, y, true);
        }
        grid
    }

    /// Build a grid from ASCII rows: '#' is solid, anything else is floor.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut grid = Self {
            width,
            height,
            solid: vec![false; width * height],
        };
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    grid.set_solid(x as i32, y as i32, true);
                }
            }
        }
        grid
    }

    pub fn set_solid(&mut self, x: i32, y: i32, solid: bool) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        self.solid[y as usize * self.width + x as usize] = solid;
    }

    /// Out-of-bounds tiles are solid
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return true;
        }
        self.solid[y as usize * self.width + x as usize]
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        !self.is_solid(x, y)
    }

    /// Check whether a collision box placed at the given world position
    /// overlaps any solid tile.
    pub fn collides_with_box(&self, bbox: &CollisionBox, x: f32, y: f32) -> bool {
        // Shrink the far edges so that exactly touching a tile boundary does
        // not count as overlapping the next tile
        const EDGE_EPSILON: f32 = 0.001;

        let left = x + bbox.offset_x;
        let top = y + bbox.offset_y;
        let right = left + bbox.width;
        let bottom = top + bbox.height;

        let tx0 = (left / TILE_SIZE).floor() as i32;
        let ty0 = (top / TILE_SIZE).floor() as i32;
        let tx1 = ((right - EDGE_EPSILON) / TILE_SIZE).floor() as i32;
        let ty1 = ((bottom - EDGE_EPSILON) / TILE_SIZE).floor() as i32;

        for ty in ty0..=ty1 {
            for tx in tx0..=tx1 {
                if self.is_solid(tx, ty) {
                    return true;
                }
            }
        }
        false
    }

    /// World position to containing tile coordinates
    pub fn world_to_tile(pos: Vec2) -> (i32, i32) {
        (
            (pos.x / TILE_SIZE).floor() as i32,
            (pos.y / TILE_SIZE).floor() as i32,
        )
    }

    /// Pixel center of a tile
    pub fn tile_center(tx: i32, ty: i32) -> Vec2 {
        Vec2::new(
            (tx as f32 + 0.5) * TILE_SIZE,
            (ty as f32 + 0.5) * TILE_SIZE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_is_solid() {
        let grid = Grid::new(8, 8);
        assert!(grid.is_solid(0, 0));
        assert!(grid.is_solid(7, 3));
        assert!(grid.is_walkable(3, 3));
    }

    #[test]
    fn test_out_of_bounds_is_solid() {
        let grid = Grid::new(8, 8);
        assert!(grid.is_solid(-1, 4));
        assert!(grid.is_solid(4, 100));
    }

    #[test]
    fn test_tile_roundtrip() {
        let center = Grid::tile_center(3, 5);
        assert_eq!(Grid::world_to_tile(center), (3, 5));
    }

    #[test]
    fn test_box_collides_near_wall() {
        let grid = Grid::new(8, 8);
        let bbox = CollisionBox::centered(20.0, 20.0);

        // Center of tile (2, 2) - well clear of the border
        let open = Grid::tile_center(2, 2);
        assert!(!grid.collides_with_box(&bbox, open.x, open.y));

        // Box overlapping the left border wall
        assert!(grid.collides_with_box(&bbox, TILE_SIZE + 5.0, open.y));
    }

    #[test]
    fn test_box_edge_touch_does_not_collide() {
        let grid = Grid::new(8, 8);
        let bbox = CollisionBox::centered(20.0, 20.0);

        // Right edge of the box exactly at the wall boundary
        let x = 2.0 * TILE_SIZE - 10.0;
        let mut grid = grid;
        grid.set_solid(2, 2, true);
        let y = Grid::tile_center(2, 2).y;
        assert!(!grid.collides_with_box(&bbox, x, y));
        assert!(grid.collides_with_box(&bbox, x + 1.0, y));
    }
}
