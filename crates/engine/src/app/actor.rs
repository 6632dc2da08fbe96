use std::f32::consts::FRAC_1_SQRT_2;

use super::atlas::TILE_SIZE;
use super::tilemap::{TileMap, TilemapError};
use super::world::Vec2;

/// Handle into the world's actor registry. Registration is append-only,
/// so a handle stays valid for the lifetime of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Player,
    Enemy,
}

/// Linear tile ID into the character atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteId(pub u16);

#[derive(Debug, Clone)]
pub struct Actor {
    pub role: ActorRole,
    pub position: Vec2,
    pub speed: f32,
    pub sprite: SpriteId,
}

impl Actor {
    pub fn new(role: ActorRole, position: Vec2, speed: f32, sprite: SpriteId) -> Self {
        Self {
            role,
            position,
            speed,
            sprite,
        }
    }

    /// Moves along the intent vector `(dx, dy)` scaled by `speed`, one
    /// axis at a time against `map`. X resolves first; the Y test then
    /// sees the committed X, so a blocked axis slides instead of
    /// stopping the whole move. Diagonal intent is normalized so the
    /// travelled distance matches a cardinal step. Candidates are
    /// clamped to the map interior before the collision test.
    pub fn move_by(&mut self, map: &TileMap, dx: f32, dy: f32) -> Result<(), TilemapError> {
        let (dx, dy) = if dx != 0.0 && dy != 0.0 {
            (dx * FRAC_1_SQRT_2, dy * FRAC_1_SQRT_2)
        } else {
            (dx, dy)
        };

        let max_x = (map.width() - 1) as f32 * TILE_SIZE as f32;
        let max_y = (map.height() - 1) as f32 * TILE_SIZE as f32;

        let candidate_x = (self.position.x + self.speed * dx).clamp(0.0, max_x);
        if !map.is_hit(candidate_x, self.position.y)? {
            self.position.x = candidate_x;
        }

        let candidate_y = (self.position.y + self.speed * dy).clamp(0.0, max_y);
        if !map.is_hit(self.position.x, candidate_y)? {
            self.position.y = candidate_y;
        }

        Ok(())
    }

    /// Teleports to `(x, y)` clamped to the map interior, skipping the
    /// collision test. Spawning uses this; walls are escaped by the
    /// first ordinary move.
    pub fn place(&mut self, map: &TileMap, x: f32, y: f32) {
        let max_x = (map.width() - 1) as f32 * TILE_SIZE as f32;
        let max_y = (map.height() - 1) as f32 * TILE_SIZE as f32;
        self.position = Vec2 {
            x: x.clamp(0.0, max_x),
            y: y.clamp(0.0, max_y),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_map() -> TileMap {
        TileMap::new(8, 8).expect("map")
    }

    fn actor_at(x: f32, y: f32) -> Actor {
        Actor::new(ActorRole::Player, Vec2 { x, y }, 3.0, SpriteId(0))
    }

    #[test]
    fn cardinal_move_advances_by_speed() {
        let map = open_map();
        let mut actor = actor_at(64.0, 64.0);
        actor.move_by(&map, 1.0, 0.0).expect("move");
        assert_eq!(actor.position, Vec2 { x: 67.0, y: 64.0 });
    }

    #[test]
    fn diagonal_move_is_normalized() {
        let map = open_map();
        let mut actor = actor_at(64.0, 64.0);
        actor.move_by(&map, 1.0, 1.0).expect("move");

        let step = 3.0 * FRAC_1_SQRT_2;
        assert_eq!(actor.position, Vec2 { x: 64.0 + step, y: 64.0 + step });

        // Per-frame displacement magnitude matches a cardinal step.
        let travelled = (step * step + step * step).sqrt();
        assert!((travelled - 3.0).abs() < 1e-5);
    }

    #[test]
    fn blocked_axis_slides_along_the_open_one() {
        let mut map = open_map();
        // Wall to the right of the actor; below stays open.
        map.set_solid_for_test(3, 2, true);
        let mut actor = actor_at(66.0, 64.0);

        actor.move_by(&map, 1.0, 1.0).expect("move");

        // X candidate 66 + 3/sqrt(2) reaches into cell 3 via the far
        // corner and is rejected; Y commits from the unchanged X.
        assert_eq!(actor.position.x, 66.0);
        assert_eq!(actor.position.y, 64.0 + 3.0 * FRAC_1_SQRT_2);
    }

    #[test]
    fn y_test_uses_the_committed_x() {
        let mut map = open_map();
        // Wall diagonally ahead only; row 2 and column 2 stay open.
        map.set_solid_for_test(3, 3, true);
        let mut actor = actor_at(66.0, 66.0);

        actor.move_by(&map, 1.0, 1.0).expect("move");

        // X commits: its far corner reaches column 3 but only row 2,
        // which is open. The Y candidate's far corner then lands in
        // (3,3) because it is tested at the committed X; from the old
        // X it would only have seen the open (2,3).
        assert_eq!(actor.position.x, 66.0 + 3.0 * FRAC_1_SQRT_2);
        assert_eq!(actor.position.y, 66.0);
    }

    #[test]
    fn candidates_clamp_to_the_map_interior() {
        let map = open_map();
        let mut actor = actor_at(0.0, 0.0);
        actor.move_by(&map, -1.0, -1.0).expect("move");
        assert_eq!(actor.position, Vec2 { x: 0.0, y: 0.0 });

        let max = 7.0 * 32.0;
        let mut actor = actor_at(max, max);
        actor.move_by(&map, 1.0, 1.0).expect("move");
        assert_eq!(actor.position, Vec2 { x: max, y: max });
    }

    #[test]
    fn place_clamps_without_collision_test() {
        let mut map = open_map();
        map.set_solid_for_test(2, 2, true);
        let mut actor = actor_at(0.0, 0.0);

        actor.place(&map, 64.0, 64.0);
        assert_eq!(actor.position, Vec2 { x: 64.0, y: 64.0 });

        actor.place(&map, -50.0, 1e6);
        assert_eq!(actor.position, Vec2 { x: 0.0, y: 7.0 * 32.0 });
    }

    #[test]
    fn zero_intent_is_a_no_op() {
        let map = open_map();
        let mut actor = actor_at(40.0, 40.0);
        actor.move_by(&map, 0.0, 0.0).expect("move");
        assert_eq!(actor.position, Vec2 { x: 40.0, y: 40.0 });
    }
}
