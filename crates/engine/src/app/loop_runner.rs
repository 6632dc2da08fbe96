use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::atlas::TileAtlas;
use super::input::{ActionStates, InputAction, InputSnapshot};
use super::metrics::MetricsAccumulator;
use super::rendering::Renderer;
use super::world::World;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_fps: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Overworld".to_string(),
            window_width: 1280,
            window_height: 720,
            target_fps: 60,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Per-frame game logic. The loop hands each session tick the input
/// snapshot for that frame and mutable access to the world; the camera
/// update and the draw happen after the tick returns.
pub trait Session {
    fn tick(&mut self, input: &InputSnapshot, world: &mut World);
}

/// Opens the window and drives the frame loop until quit. Every frame
/// runs exactly one session tick, then the camera step and the draw,
/// then sleeps off whatever remains of the frame budget. A slow frame
/// simply ships late; there is no tick catch-up, so simulation speed
/// degrades with the frame rate instead of bursting.
pub fn run_app<S: Session>(
    config: LoopConfig,
    mut world: World,
    mut session: S,
    actor_atlas: TileAtlas,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window, actor_atlas).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_fps = config.target_fps.max(1);
    let frame_budget = Duration::from_secs_f64(1.0 / target_fps as f64);
    let metrics_log_interval = if config.metrics_log_interval.is_zero() {
        Duration::from_secs(1)
    } else {
        config.metrics_log_interval
    };
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut input_collector = InputCollector::default();

    info!(
        target_fps,
        frame_budget_ms = frame_budget.as_millis() as u64,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        actor_count = world.actors().len(),
        "loop_config"
    );

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_keyboard_input(&event);
                        if input_collector.quit_requested {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let frame_start = Instant::now();

                        let input_snapshot = input_collector.snapshot_for_tick();
                        session.tick(&input_snapshot, &mut world);
                        world.update_camera(renderer.viewport());

                        if let Err(error) = renderer.render_world(&world) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }

                        let work = frame_start.elapsed();
                        let idle = frame_idle_wait(work, frame_budget);
                        if idle > Duration::ZERO {
                            thread::sleep(idle);
                        }

                        metrics_accumulator.record_frame(work, idle);
                        if let Some(snapshot) = metrics_accumulator.maybe_snapshot(Instant::now())
                        {
                            info!(
                                fps = snapshot.fps,
                                work_ms = snapshot.work_ms,
                                idle_ms = snapshot.idle_ms,
                                actor_count = world.actors().len(),
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// The remainder of the frame budget after the frame's work, zero when
/// the frame overran.
fn frame_idle_wait(work: Duration, frame_budget: Duration) -> Duration {
    frame_budget.saturating_sub(work)
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    follow_player_key_is_down: bool,
    follow_player_pressed_edge: bool,
    follow_enemy_key_is_down: bool,
    follow_enemy_pressed_edge: bool,
    regenerate_key_is_down: bool,
    regenerate_pressed_edge: bool,
}

impl InputCollector {
    fn handle_keyboard_input(&mut self, key_event: &winit::event::KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        match key_event.physical_key {
            PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
                self.action_states.set(InputAction::MoveUp, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            PhysicalKey::Code(KeyCode::Digit1) => {
                handle_edge_key_state(
                    key_event.state,
                    &mut self.follow_player_key_is_down,
                    &mut self.follow_player_pressed_edge,
                );
            }
            PhysicalKey::Code(KeyCode::Digit2) => {
                handle_edge_key_state(
                    key_event.state,
                    &mut self.follow_enemy_key_is_down,
                    &mut self.follow_enemy_pressed_edge,
                );
            }
            PhysicalKey::Code(KeyCode::KeyR) => {
                handle_edge_key_state(
                    key_event.state,
                    &mut self.regenerate_key_is_down,
                    &mut self.regenerate_pressed_edge,
                );
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                self.action_states.set(InputAction::Quit, is_pressed);
                if is_pressed {
                    self.quit_requested = true;
                }
            }
            _ => {}
        }
    }

    /// Builds the snapshot for this frame's tick; press edges report
    /// once and reset.
    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.action_states,
            self.follow_player_pressed_edge,
            self.follow_enemy_pressed_edge,
            self.regenerate_pressed_edge,
        );
        self.follow_player_pressed_edge = false;
        self.follow_enemy_pressed_edge = false;
        self.regenerate_pressed_edge = false;
        snapshot
    }
}

fn handle_edge_key_state(state: ElementState, is_down: &mut bool, pressed_edge: &mut bool) {
    match state {
        ElementState::Pressed => {
            if !*is_down {
                *pressed_edge = true;
            }
            *is_down = true;
        }
        ElementState::Released => *is_down = false,
    }
}
