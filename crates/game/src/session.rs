use std::time::{Duration, Instant};

use rand::Rng;
use rand_pcg::Pcg32;
use tracing::{info, warn};

use engine::{ActorId, Camera, InputAction, InputSnapshot, Session, TileAtlas, Vec2, World};

/// Map regenerations closer together than this are dropped.
const REGEN_MIN_INTERVAL: Duration = Duration::from_millis(500);
/// How far an enemy patrols from its spawn point, in pixels.
const WANDER_RANGE: f32 = 96.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WanderAxis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy)]
struct WanderState {
    home: Vec2,
    axis: WanderAxis,
    direction: f32,
}

impl WanderState {
    fn new(home: Vec2, axis: WanderAxis) -> Self {
        Self {
            home,
            axis,
            direction: 1.0,
        }
    }

    fn intent(&self) -> (f32, f32) {
        match self.axis {
            WanderAxis::Horizontal => (self.direction, 0.0),
            WanderAxis::Vertical => (0.0, self.direction),
        }
    }
}

/// Turns around at the patrol bounds or when the last move was eaten
/// by a wall.
fn next_wander_direction(state: WanderState, position: Vec2, moved: bool) -> f32 {
    let displacement = match state.axis {
        WanderAxis::Horizontal => position.x - state.home.x,
        WanderAxis::Vertical => position.y - state.home.y,
    };
    if !moved || displacement * state.direction >= WANDER_RANGE {
        -state.direction
    } else {
        state.direction
    }
}

fn regen_allowed(last_regen: Option<Instant>, now: Instant) -> bool {
    match last_regen {
        Some(last) => now.saturating_duration_since(last) >= REGEN_MIN_INTERVAL,
        None => true,
    }
}

/// Drives the playable world: player movement from held keys, enemy
/// patrols, camera retargeting on the number keys and map regeneration
/// on R.
pub struct PlaySession {
    player: ActorId,
    enemies: Vec<(ActorId, WanderState)>,
    tracked_enemy: usize,
    tile_atlas: TileAtlas,
    rng: Pcg32,
    last_regen: Option<Instant>,
    camera_spacing: f32,
    camera_dampening: f32,
}

impl PlaySession {
    pub fn new(
        player: ActorId,
        enemy_ids: &[ActorId],
        world: &World,
        tile_atlas: TileAtlas,
        mut rng: Pcg32,
        camera_spacing: f32,
        camera_dampening: f32,
    ) -> Self {
        let enemies = enemy_ids
            .iter()
            .map(|&id| {
                let home = world
                    .actor(id)
                    .map(|actor| actor.position)
                    .unwrap_or_default();
                let axis = if rng.random_ratio(1, 2) {
                    WanderAxis::Horizontal
                } else {
                    WanderAxis::Vertical
                };
                (id, WanderState::new(home, axis))
            })
            .collect();
        Self {
            player,
            enemies,
            tracked_enemy: 0,
            tile_atlas,
            rng,
            last_regen: None,
            camera_spacing,
            camera_dampening,
        }
    }

    fn player_intent(input: &InputSnapshot) -> (f32, f32) {
        let axis = |negative: InputAction, positive: InputAction| {
            let mut value = 0.0;
            if input.is_down(negative) {
                value -= 1.0;
            }
            if input.is_down(positive) {
                value += 1.0;
            }
            value
        };
        (
            axis(InputAction::MoveLeft, InputAction::MoveRight),
            axis(InputAction::MoveUp, InputAction::MoveDown),
        )
    }

    fn move_player(&mut self, input: &InputSnapshot, world: &mut World) {
        let (dx, dy) = Self::player_intent(input);
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        if let Err(error) = world.move_actor(self.player, dx, dy) {
            warn!(error = %error, "player_movement_rejected");
        }
    }

    fn move_enemies(&mut self, world: &mut World) {
        for (id, state) in &mut self.enemies {
            let before = match world.actor(*id) {
                Some(actor) => actor.position,
                None => continue,
            };
            let (dx, dy) = state.intent();
            if let Err(error) = world.move_actor(*id, dx, dy) {
                warn!(error = %error, "enemy_movement_rejected");
                continue;
            }
            let after = match world.actor(*id) {
                Some(actor) => actor.position,
                None => continue,
            };
            state.direction = next_wander_direction(*state, after, after != before);
        }
    }

    fn retarget_camera(&mut self, input: &InputSnapshot, world: &mut World) {
        let next_target = if input.follow_player_pressed() {
            Some(self.player)
        } else if input.follow_enemy_pressed() && !self.enemies.is_empty() {
            let (id, _) = self.enemies[self.tracked_enemy];
            self.tracked_enemy = (self.tracked_enemy + 1) % self.enemies.len();
            Some(id)
        } else {
            None
        };

        if let Some(target) = next_target {
            let next = Camera::new(target, self.camera_spacing, self.camera_dampening);
            if let Some(camera) = world.camera_mut() {
                camera.switch_to(&next);
                info!(target = target.0, "camera_retargeted");
            }
        }
    }

    fn maybe_regenerate(&mut self, input: &InputSnapshot, world: &mut World) {
        if !input.regenerate_pressed() {
            return;
        }
        let now = Instant::now();
        if !regen_allowed(self.last_regen, now) {
            info!("map_regeneration_throttled");
            return;
        }
        self.last_regen = Some(now);
        world.regenerate_map(&self.tile_atlas, &mut self.rng);
    }
}

impl Session for PlaySession {
    fn tick(&mut self, input: &InputSnapshot, world: &mut World) {
        self.move_player(input, world);
        self.move_enemies(world);
        self.retarget_camera(input, world);
        self.maybe_regenerate(input, world);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use engine::{Actor, ActorRole, SpriteId, TileMap};

    use super::*;

    fn test_atlas() -> TileAtlas {
        TileAtlas::from_rgba(256, 128, vec![80; 256 * 128 * 4]).expect("atlas")
    }

    fn world_with_player() -> (World, ActorId) {
        let mut world = World::new(TileMap::new(16, 16).expect("map"));
        let player = world.register(Actor::new(
            ActorRole::Player,
            Vec2 { x: 160.0, y: 160.0 },
            3.0,
            SpriteId(0),
        ));
        (world, player)
    }

    fn spawn_enemy(world: &mut World, x: f32, y: f32) -> ActorId {
        world.register(Actor::new(
            ActorRole::Enemy,
            Vec2 { x, y },
            3.0,
            SpriteId(1),
        ))
    }

    fn session(player: ActorId, enemy_ids: &[ActorId], world: &World) -> PlaySession {
        PlaySession::new(
            player,
            enemy_ids,
            world,
            test_atlas(),
            Pcg32::seed_from_u64(5),
            10.0,
            20.0,
        )
    }

    #[test]
    fn held_keys_move_the_player() {
        let (mut world, player) = world_with_player();
        let mut play = session(player, &[], &world);

        let input = InputSnapshot::default().with_action(InputAction::MoveRight);
        play.tick(&input, &mut world);

        assert_eq!(world.actor(player).expect("player").position.x, 163.0);
    }

    #[test]
    fn opposing_keys_cancel_out() {
        let (mut world, player) = world_with_player();
        let mut play = session(player, &[], &world);

        let input = InputSnapshot::default()
            .with_action(InputAction::MoveLeft)
            .with_action(InputAction::MoveRight)
            .with_action(InputAction::MoveDown);
        play.tick(&input, &mut world);

        let position = world.actor(player).expect("player").position;
        assert_eq!(position.x, 160.0);
        assert_eq!(position.y, 163.0);
    }

    #[test]
    fn enemies_patrol_and_turn_at_the_range_bound() {
        let (mut world, player) = world_with_player();
        let enemy = spawn_enemy(&mut world, 64.0, 64.0);
        let mut play = session(player, &[enemy], &world);

        let input = InputSnapshot::default();
        let start = world.actor(enemy).expect("enemy").position;
        for _ in 0..200 {
            play.tick(&input, &mut world);
            let position = world.actor(enemy).expect("enemy").position;
            let displacement =
                (position.x - start.x).abs().max((position.y - start.y).abs());
            assert!(displacement <= WANDER_RANGE + 3.0);
        }
        // Still inside the map and moving; the patrol never stalls at
        // the bound.
        let final_position = world.actor(enemy).expect("enemy").position;
        assert_ne!(final_position, start);
    }

    #[test]
    fn wander_direction_flips_when_blocked() {
        let state = WanderState::new(Vec2 { x: 64.0, y: 64.0 }, WanderAxis::Horizontal);
        let stuck = next_wander_direction(state, Vec2 { x: 70.0, y: 64.0 }, false);
        assert_eq!(stuck, -1.0);

        let moving = next_wander_direction(state, Vec2 { x: 70.0, y: 64.0 }, true);
        assert_eq!(moving, 1.0);

        let at_bound = next_wander_direction(
            state,
            Vec2 {
                x: 64.0 + WANDER_RANGE,
                y: 64.0,
            },
            true,
        );
        assert_eq!(at_bound, -1.0);
    }

    #[test]
    fn follow_keys_retarget_the_camera_and_cycle_enemies() {
        let (mut world, player) = world_with_player();
        let first_enemy = spawn_enemy(&mut world, 32.0, 32.0);
        let second_enemy = spawn_enemy(&mut world, 96.0, 96.0);
        world.set_camera(Camera::new(player, 10.0, 20.0));
        let mut play = session(player, &[first_enemy, second_enemy], &world);

        let follow_enemy = InputSnapshot::default().with_follow_enemy();
        play.tick(&follow_enemy, &mut world);
        assert_eq!(world.camera().expect("camera").target(), first_enemy);

        play.tick(&follow_enemy, &mut world);
        assert_eq!(world.camera().expect("camera").target(), second_enemy);

        play.tick(&follow_enemy, &mut world);
        assert_eq!(world.camera().expect("camera").target(), first_enemy);

        let follow_player = InputSnapshot::default().with_follow_player();
        play.tick(&follow_player, &mut world);
        assert_eq!(world.camera().expect("camera").target(), player);
    }

    #[test]
    fn rapid_regenerate_presses_are_throttled() {
        let (mut world, player) = world_with_player();
        let mut play = session(player, &[], &world);

        let regen = InputSnapshot::default().with_regenerate();
        play.tick(&regen, &mut world);
        let first = play.last_regen.expect("regen ran");

        play.tick(&regen, &mut world);
        assert_eq!(play.last_regen, Some(first));
    }

    #[test]
    fn regen_allowed_respects_the_minimum_interval() {
        let base = Instant::now();
        assert!(regen_allowed(None, base));
        assert!(!regen_allowed(Some(base), base + Duration::from_millis(100)));
        assert!(regen_allowed(Some(base), base + REGEN_MIN_INTERVAL));
    }
}
