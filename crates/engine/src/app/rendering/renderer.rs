use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::atlas::{TileAtlas, TILE_SIZE};
use crate::app::world::World;

use super::blit::{blit_region, blit_rgba, Viewport, COLOR_KEY};

const CLEAR_COLOR: [u8; 4] = [128, 128, 128, 255];

/// Owns the window surface and the CPU framebuffer, and turns a world
/// into pixels: clear, map surface at the camera offset, then actors
/// painter-sorted by Y so the lower sprite draws in front.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    actor_atlas: TileAtlas,
    draw_order: Vec<usize>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, actor_atlas: TileAtlas) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            actor_atlas,
            draw_order: Vec::new(),
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn render_world(&mut self, world: &World) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let offset = world.camera_offset();
        let offset_x = offset.x.round() as i32;
        let offset_y = offset.y.round() as i32;

        let frame = self.pixels.frame_mut();
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }

        let map = world.tilemap();
        blit_rgba(
            frame,
            self.viewport.width,
            self.viewport.height,
            map.surface(),
            map.pixel_width(),
            map.pixel_height(),
            offset_x,
            offset_y,
        );

        collect_y_sorted_draw_order(world, &mut self.draw_order);
        for actor_index in self.draw_order.iter().copied() {
            let actor = &world.actors()[actor_index];
            let rect = self.actor_atlas.tile_rect(actor.sprite.0);
            blit_region(
                frame,
                self.viewport.width,
                self.viewport.height,
                self.actor_atlas.rgba(),
                self.actor_atlas.width(),
                self.actor_atlas.height(),
                rect.x,
                rect.y,
                TILE_SIZE,
                TILE_SIZE,
                actor.position.x.round() as i32 + offset_x,
                actor.position.y.round() as i32 + offset_y,
                Some(COLOR_KEY),
            );
        }

        self.pixels.render()
    }
}

/// Painter's order: ascending Y, registration order breaking ties. The
/// sort is stable so equal rows never flicker between frames.
fn collect_y_sorted_draw_order(world: &World, out: &mut Vec<usize>) {
    out.clear();
    out.extend(0..world.actors().len());
    out.sort_by(|left, right| {
        world.actors()[*left]
            .position
            .y
            .total_cmp(&world.actors()[*right].position.y)
    });
}
