mod blit;
mod renderer;

pub use blit::{Viewport, COLOR_KEY};
pub(crate) use blit::{blit_region, blit_rgba};
pub use renderer::Renderer;
