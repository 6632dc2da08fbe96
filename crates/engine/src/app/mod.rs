mod actor;
mod atlas;
mod camera;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod tilemap;
mod world;

pub use actor::{Actor, ActorId, ActorRole, SpriteId};
pub use atlas::{AtlasError, AtlasRect, TileAtlas, TILE_SIZE};
pub use camera::Camera;
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig, Session};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{Renderer, Viewport, COLOR_KEY};
pub use tilemap::{TileMap, TilemapError, FLOOR_TILE_IDS, WALL_TILE_ID};
pub use world::{Vec2, World};
