use rand::Rng;
use tracing::info;

use super::actor::{Actor, ActorId};
use super::atlas::TileAtlas;
use super::camera::Camera;
use super::rendering::Viewport;
use super::tilemap::{TileMap, TilemapError};

/// 2D position or extent in map pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// The simulation state: one tilemap, an append-only actor registry and
/// an optional follow camera. Actors are never removed, so an `ActorId`
/// handed out by `register` stays valid until the world is dropped.
pub struct World {
    tilemap: TileMap,
    actors: Vec<Actor>,
    camera: Option<Camera>,
}

impl World {
    pub fn new(tilemap: TileMap) -> Self {
        Self {
            tilemap,
            actors: Vec::new(),
            camera: None,
        }
    }

    pub fn tilemap(&self) -> &TileMap {
        &self.tilemap
    }

    pub fn register(&mut self, actor: Actor) -> ActorId {
        let id = ActorId(self.actors.len());
        self.actors.push(actor);
        id
    }

    /// Registry view in registration order.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.0)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id.0)
    }

    /// Routes a movement intent to the identified actor; an unknown id
    /// is a silent no-op.
    pub fn move_actor(&mut self, id: ActorId, dx: f32, dy: f32) -> Result<(), TilemapError> {
        match self.actors.get_mut(id.0) {
            Some(actor) => actor.move_by(&self.tilemap, dx, dy),
            None => Ok(()),
        }
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    /// Draw-time offset; zero when no camera is installed.
    pub fn camera_offset(&self) -> Vec2 {
        self.camera
            .as_ref()
            .map(Camera::offset)
            .unwrap_or_default()
    }

    /// Steps the camera toward its target. Nothing happens when no
    /// camera is installed or the target id is unknown.
    pub fn update_camera(&mut self, viewport: Viewport) {
        let map_pixel_size = Vec2 {
            x: self.tilemap.pixel_width() as f32,
            y: self.tilemap.pixel_height() as f32,
        };
        if let Some(camera) = self.camera.as_mut() {
            if let Some(target) = self.actors.get(camera.target().0) {
                camera.update(target.position, map_pixel_size, viewport);
            }
        }
    }

    /// Rerolls the map layout in place. Actor positions are untouched;
    /// anyone now standing inside a wall walks free on the next move.
    pub fn regenerate_map(&mut self, atlas: &TileAtlas, rng: &mut impl Rng) {
        self.tilemap.generate(atlas, rng);
        info!(
            width = self.tilemap.width(),
            height = self.tilemap.height(),
            "map_regenerated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::actor::{ActorRole, SpriteId};
    use super::*;

    fn world() -> World {
        World::new(TileMap::new(8, 8).expect("map"))
    }

    fn actor_at(x: f32, y: f32) -> Actor {
        Actor::new(ActorRole::Enemy, Vec2 { x, y }, 3.0, SpriteId(0))
    }

    #[test]
    fn registration_preserves_order_and_ids() {
        let mut world = world();
        let first = world.register(actor_at(0.0, 0.0));
        let second = world.register(actor_at(32.0, 0.0));
        let third = world.register(actor_at(64.0, 0.0));

        assert_eq!((first, second, third), (ActorId(0), ActorId(1), ActorId(2)));
        assert_eq!(world.actors().len(), 3);
        assert_eq!(world.actors()[1].position, Vec2 { x: 32.0, y: 0.0 });
        assert_eq!(world.actor(second).expect("actor").position.x, 32.0);
    }

    #[test]
    fn move_actor_routes_to_the_identified_actor() {
        let mut world = world();
        let mover = world.register(actor_at(64.0, 64.0));
        let bystander = world.register(actor_at(0.0, 0.0));

        world.move_actor(mover, 1.0, 0.0).expect("move");

        assert_eq!(world.actor(mover).expect("actor").position.x, 67.0);
        assert_eq!(world.actor(bystander).expect("actor").position.x, 0.0);
    }

    #[test]
    fn move_actor_with_unknown_id_is_a_no_op() {
        let mut world = world();
        world.move_actor(ActorId(42), 1.0, 1.0).expect("no-op");
        assert!(world.actors().is_empty());
    }

    #[test]
    fn camera_offset_defaults_to_zero_without_a_camera() {
        let world = world();
        assert_eq!(world.camera_offset(), Vec2::default());
    }

    #[test]
    fn update_camera_follows_the_installed_target() {
        let mut world = world();
        let target = world.register(actor_at(0.0, 0.0));
        world.set_camera(Camera::new(target, 10.0, 20.0));

        // Target pinned at the origin inside the leading margin: the
        // near correction fires and the clamp pins it back to zero.
        world.update_camera(Viewport {
            width: 128,
            height: 128,
        });
        assert_eq!(world.camera_offset(), Vec2::default());

        // Target at the far corner of an 8x8 map against a small view.
        world.actor_mut(target).expect("actor").position = Vec2 { x: 224.0, y: 224.0 };
        world.update_camera(Viewport {
            width: 128,
            height: 128,
        });
        assert!(world.camera_offset().x < 0.0);
        assert!(world.camera_offset().y < 0.0);
    }

    #[test]
    fn update_camera_with_unknown_target_changes_nothing() {
        let mut world = world();
        world.set_camera(Camera::new(ActorId(9), 10.0, 20.0));
        world.update_camera(Viewport {
            width: 128,
            height: 128,
        });
        assert_eq!(world.camera_offset(), Vec2::default());
    }
}
