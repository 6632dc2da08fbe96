mod config;
mod session;

use std::path::Path;
use std::process::ExitCode;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use engine::{
    resolve_project_root, run_app, Actor, ActorRole, AppError, AtlasError, Camera, LoopConfig,
    SpriteId, StartupError, TileAtlas, TileMap, TilemapError, Vec2, World, COLOR_KEY,
    FLOOR_TILE_IDS, TILE_SIZE, WALL_TILE_ID,
};

use config::Config;
use session::PlaySession;

/// Character atlas fallback layout: a 6x6 grid of colored figures.
const FALLBACK_CHARACTER_GRID: u32 = 6;
const PLAYER_SPRITE_COLUMN: u32 = 1;
const PLAYER_SPRITE_ROW: u32 = 1;
const PLAYER_SPEED: f32 = 3.0;
const ENEMY_SPEED: f32 = 3.0;

#[derive(Debug, Error)]
enum GameError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Atlas(#[from] AtlasError),
    #[error(transparent)]
    Tilemap(#[from] TilemapError),
    #[error(transparent)]
    App(#[from] AppError),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(error = %error, "fatal");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), GameError> {
    let root = resolve_project_root()?;
    let config = Config::load_or_default(&root.join("overworld.json"));
    info!(root = %root.display(), ?config, "startup");

    let tile_atlas = load_atlas_or_fallback(
        &root.join("assets").join("tileset.png"),
        fallback_tileset_atlas,
    )?;
    let character_atlas = load_atlas_or_fallback(
        &root.join("assets").join("characters.png"),
        fallback_character_atlas,
    )?;

    let mut rng = match config.rng_seed {
        Some(seed) => {
            info!(seed, "seeded_rng");
            Pcg32::seed_from_u64(seed)
        }
        None => Pcg32::from_rng(&mut rand::rng()),
    };

    let mut tilemap = TileMap::new(config.map_width, config.map_height)?;
    tilemap.generate(&tile_atlas, &mut rng);
    let mut world = World::new(tilemap);

    let player = world.register(Actor::new(
        ActorRole::Player,
        Vec2::default(),
        PLAYER_SPEED,
        character_sprite(PLAYER_SPRITE_COLUMN, PLAYER_SPRITE_ROW, &character_atlas),
    ));

    let max_x = (config.map_width - 1) as f32 * TILE_SIZE as f32;
    let max_y = (config.map_height - 1) as f32 * TILE_SIZE as f32;
    let enemy_ids: Vec<_> = (0..config.enemy_count)
        .map(|_| {
            let column = rng.random_range(0..FALLBACK_CHARACTER_GRID);
            let row = rng.random_range(0..FALLBACK_CHARACTER_GRID);
            let mut enemy = Actor::new(
                ActorRole::Enemy,
                Vec2::default(),
                ENEMY_SPEED,
                character_sprite(column, row, &character_atlas),
            );
            enemy.place(
                world.tilemap(),
                rng.random_range(0.0..=max_x),
                rng.random_range(0.0..=max_y),
            );
            world.register(enemy)
        })
        .collect();
    info!(enemy_count = enemy_ids.len(), "world_populated");

    world.set_camera(Camera::new(
        player,
        config.camera_spacing,
        config.camera_dampening,
    ));

    let play = PlaySession::new(
        player,
        &enemy_ids,
        &world,
        tile_atlas,
        Pcg32::from_rng(&mut rng),
        config.camera_spacing,
        config.camera_dampening,
    );

    let loop_config = LoopConfig {
        window_width: config.window_width,
        window_height: config.window_height,
        target_fps: config.target_fps,
        ..LoopConfig::default()
    };
    run_app(loop_config, world, play, character_atlas)?;
    Ok(())
}

fn character_sprite(column: u32, row: u32, atlas: &TileAtlas) -> SpriteId {
    SpriteId((row * atlas.columns() + column) as u16)
}

fn load_atlas_or_fallback(
    path: &Path,
    fallback: fn() -> Result<TileAtlas, AtlasError>,
) -> Result<TileAtlas, AtlasError> {
    match TileAtlas::load_png(path) {
        Ok(atlas) => {
            info!(path = %path.display(), width = atlas.width(), height = atlas.height(), "atlas_loaded");
            Ok(atlas)
        }
        Err(error) => {
            warn!(path = %path.display(), error = %error, "atlas_load_failed_using_fallback");
            fallback()
        }
    }
}

/// Procedural tileset covering the generated IDs: flat floor shades
/// for the walkable variants and a dark block for the wall.
fn fallback_tileset_atlas() -> Result<TileAtlas, AtlasError> {
    let columns = 8u32;
    let rows = 4u32;
    let width = columns * TILE_SIZE;
    let height = rows * TILE_SIZE;
    let mut rgba = vec![0u8; (width * height * 4) as usize];

    for id in 0..(columns * rows) as u16 {
        let color = if id == WALL_TILE_ID {
            [60, 60, 72, 255]
        } else if FLOOR_TILE_IDS.contains(&id) {
            let shade = 150 + (id % 4) as u8 * 12;
            [shade, shade.saturating_sub(20), 90, 255]
        } else {
            [40, 40, 40, 255]
        };
        fill_tile(&mut rgba, width, id as u32 % columns, id as u32 / columns, color);
    }
    TileAtlas::from_rgba(width, height, rgba)
}

/// Procedural character sheet: one colored figure per cell on the
/// color-key background so the surroundings show through.
fn fallback_character_atlas() -> Result<TileAtlas, AtlasError> {
    let grid = FALLBACK_CHARACTER_GRID;
    let width = grid * TILE_SIZE;
    let height = grid * TILE_SIZE;
    let key = [COLOR_KEY[0], COLOR_KEY[1], COLOR_KEY[2], 255];
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        rgba.extend_from_slice(&key);
    }

    for row in 0..grid {
        for column in 0..grid {
            let color = [
                40 + (column * 36) as u8,
                60 + (row * 30) as u8,
                200u8.saturating_sub((column * row) as u8 * 5),
                255,
            ];
            fill_tile_inset(&mut rgba, width, column, row, 6, color);
        }
    }
    TileAtlas::from_rgba(width, height, rgba)
}

fn fill_tile(rgba: &mut [u8], atlas_width: u32, column: u32, row: u32, color: [u8; 4]) {
    fill_tile_inset(rgba, atlas_width, column, row, 0, color);
}

fn fill_tile_inset(
    rgba: &mut [u8],
    atlas_width: u32,
    column: u32,
    row: u32,
    inset: u32,
    color: [u8; 4],
) {
    for y in inset..TILE_SIZE - inset {
        for x in inset..TILE_SIZE - inset {
            let px = column * TILE_SIZE + x;
            let py = row * TILE_SIZE + y;
            let index = ((py * atlas_width + px) * 4) as usize;
            rgba[index..index + 4].copy_from_slice(&color);
        }
    }
}
