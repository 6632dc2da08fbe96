use rand::Rng;
use thiserror::Error;

use super::atlas::{TileAtlas, TILE_SIZE};
use super::rendering::blit_region;

/// The one tile ID that blocks movement.
pub const WALL_TILE_ID: u16 = 25;
/// Walkable floor variants drawn uniformly when a cell is not a wall.
pub const FLOOR_TILE_IDS: [u16; 4] = [21, 22, 23, 24];

/// One wall per this many cells, on average.
const WALL_CHANCE_DENOMINATOR: u32 = 10;
/// Actor hitbox spans this fraction of a tile; corners are sampled at
/// `position` and `position + TILE_SIZE * HITBOX_SCALE` per axis.
const HITBOX_SCALE: f32 = 0.9;

#[derive(Debug, Error)]
pub enum TilemapError {
    #[error("map dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("position ({x}, {y}) is outside the map pixel bounds")]
    OutOfBounds { x: f32, y: f32 },
}

/// Tile-ID grid plus the solidity mask derived from it and the composed
/// RGBA render surface. The grid and the mask always have identical
/// dimensions and are rewritten together in `generate`.
#[derive(Debug)]
pub struct TileMap {
    width: u32,
    height: u32,
    tiles: Vec<u16>,
    solid: Vec<bool>,
    surface: Vec<u8>,
}

impl TileMap {
    pub fn new(width: u32, height: u32) -> Result<Self, TilemapError> {
        if width == 0 || height == 0 {
            return Err(TilemapError::InvalidDimensions { width, height });
        }
        let cells = width as usize * height as usize;
        let surface_bytes = cells * (TILE_SIZE as usize * TILE_SIZE as usize) * 4;
        Ok(Self {
            width,
            height,
            tiles: vec![FLOOR_TILE_IDS[0]; cells],
            solid: vec![false; cells],
            surface: vec![0; surface_bytes],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_width(&self) -> u32 {
        self.width * TILE_SIZE
    }

    pub fn pixel_height(&self) -> u32 {
        self.height * TILE_SIZE
    }

    /// The composed map image, `pixel_width() * pixel_height()` RGBA8.
    pub fn surface(&self) -> &[u8] {
        &self.surface
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<u16> {
        self.index_of(x, y).map(|index| self.tiles[index])
    }

    pub fn solid_at(&self, x: u32, y: u32) -> Option<bool> {
        self.index_of(x, y).map(|index| self.solid[index])
    }

    fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Rolls a fresh layout: each cell is a wall with probability
    /// 1 in `WALL_CHANCE_DENOMINATOR`, otherwise a uniform floor
    /// variant. The solidity mask is rewritten in the same pass and the
    /// render surface is recomposed from `atlas`. Deterministic under a
    /// reseeded RNG; rate limiting between calls is the caller's job.
    pub fn generate(&mut self, atlas: &TileAtlas, rng: &mut impl Rng) {
        for index in 0..self.tiles.len() {
            let id = if rng.random_ratio(1, WALL_CHANCE_DENOMINATOR) {
                WALL_TILE_ID
            } else {
                FLOOR_TILE_IDS[rng.random_range(0..FLOOR_TILE_IDS.len())]
            };
            self.tiles[index] = id;
            self.solid[index] = id == WALL_TILE_ID;
        }
        self.compose_surface(atlas);
    }

    fn compose_surface(&mut self, atlas: &TileAtlas) {
        let surface_width = self.pixel_width();
        let surface_height = self.pixel_height();
        for cell_y in 0..self.height {
            for cell_x in 0..self.width {
                let id = self.tiles[cell_y as usize * self.width as usize + cell_x as usize];
                let rect = atlas.tile_rect(id);
                blit_region(
                    &mut self.surface,
                    surface_width,
                    surface_height,
                    atlas.rgba(),
                    atlas.width(),
                    atlas.height(),
                    rect.x,
                    rect.y,
                    TILE_SIZE,
                    TILE_SIZE,
                    (cell_x * TILE_SIZE) as i32,
                    (cell_y * TILE_SIZE) as i32,
                    None,
                );
            }
        }
    }

    /// Samples the four corners of the scaled hitbox anchored at
    /// `(x, y)` pixels and reports whether any lands on a solid cell.
    /// A corner resolving outside the grid is a bounds error; callers
    /// are expected to have clamped positions already. This is a
    /// 4-point approximation, not a swept test: a solid strip thinner
    /// than the corner spacing can pass undetected between samples.
    pub fn is_hit(&self, x: f32, y: f32) -> Result<bool, TilemapError> {
        let extent = TILE_SIZE as f32 * HITBOX_SCALE;
        for corner_y in 0..2u32 {
            for corner_x in 0..2u32 {
                let sample_x = x + extent * corner_x as f32;
                let sample_y = y + extent * corner_y as f32;
                let cell_x = (sample_x / TILE_SIZE as f32).floor();
                let cell_y = (sample_y / TILE_SIZE as f32).floor();
                if cell_x < 0.0
                    || cell_y < 0.0
                    || cell_x >= self.width as f32
                    || cell_y >= self.height as f32
                {
                    return Err(TilemapError::OutOfBounds {
                        x: sample_x,
                        y: sample_y,
                    });
                }
                if self.solid[cell_y as usize * self.width as usize + cell_x as usize] {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    #[cfg(test)]
    pub(crate) fn set_solid_for_test(&mut self, x: u32, y: u32, solid: bool) {
        let index = self.index_of(x, y).expect("cell in bounds");
        self.solid[index] = solid;
        self.tiles[index] = if solid { WALL_TILE_ID } else { FLOOR_TILE_IDS[0] };
    }
}
