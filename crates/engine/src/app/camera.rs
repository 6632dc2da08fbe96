use super::actor::ActorId;
use super::atlas::TILE_SIZE;
use super::rendering::Viewport;
use super::world::Vec2;

/// Damped dead-zone follow camera. The offset is added to world
/// positions at draw time, so it goes negative as the view scrolls
/// right and down. Each axis is corrected independently: while the
/// target's screen position stays at least `spacing` pixels from both
/// viewport edges (accounting for one tile of target extent on the far
/// side) the offset does not change at all.
#[derive(Debug, Clone)]
pub struct Camera {
    target: ActorId,
    spacing: f32,
    dampening: f32,
    offset: Vec2,
}

impl Camera {
    pub fn new(target: ActorId, spacing: f32, dampening: f32) -> Self {
        Self {
            target,
            spacing,
            dampening,
            offset: Vec2::default(),
        }
    }

    pub fn target(&self) -> ActorId {
        self.target
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Adopts `next`'s target and follow parameters while keeping the
    /// current offset, so a target change glides instead of snapping.
    pub fn switch_to(&mut self, next: &Camera) {
        self.target = next.target;
        self.spacing = next.spacing;
        self.dampening = next.dampening;
    }

    /// One follow step toward `target_position`, then the map-bound
    /// clamp. Correction per frame is the dead-zone deficit divided by
    /// `dampening`, so the view eases in rather than snapping.
    pub fn update(&mut self, target_position: Vec2, map_pixel_size: Vec2, viewport: Viewport) {
        self.offset.x = corrected_axis_offset(
            self.offset.x,
            target_position.x,
            self.spacing,
            self.dampening,
            viewport.width as f32,
        );
        self.offset.y = corrected_axis_offset(
            self.offset.y,
            target_position.y,
            self.spacing,
            self.dampening,
            viewport.height as f32,
        );
        self.offset.x = clamped_axis_offset(self.offset.x, map_pixel_size.x, viewport.width as f32);
        self.offset.y =
            clamped_axis_offset(self.offset.y, map_pixel_size.y, viewport.height as f32);
    }
}

/// Follow correction for one axis. The near deficit is how far the
/// target's screen position sits inside the leading margin; the far
/// deficit accounts for `spacing` plus one tile of target extent at the
/// trailing edge. At most one deficit is negative in any given frame.
fn corrected_axis_offset(
    offset: f32,
    target: f32,
    spacing: f32,
    dampening: f32,
    viewport_extent: f32,
) -> f32 {
    let screen_pos = target + offset;
    let mut corrected = offset;

    let near_deficit = screen_pos - spacing;
    if near_deficit < 0.0 {
        corrected += near_deficit.abs() / dampening;
    }

    let far_deficit = viewport_extent - screen_pos - spacing - TILE_SIZE as f32;
    if far_deficit < 0.0 {
        corrected -= far_deficit.abs() / dampening;
    }

    corrected
}

/// Pins the offset so the view never shows space outside the map. When
/// the map is narrower than the viewport the bounds cross and the axis
/// pins to zero, anchoring the map at the near edge.
fn clamped_axis_offset(offset: f32, map_extent: f32, viewport_extent: f32) -> f32 {
    offset.max(-(map_extent - viewport_extent)).min(0.0)
}
