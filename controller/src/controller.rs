//! Per-frame controller tick
//!
//! Runs look, ground probe, locomotion and respawn in that order against whatever
//! physics service it is handed. Called exactly once per rendered frame.

use bevy::prelude::*;

use crate::config::MovementConfig;
use crate::ground::GroundSensor;
use crate::input::InputState;
use crate::locomotion::{wish_velocity, Locomotion, StepContext};
use crate::look::{LookController, Orientation};
use crate::physics::{BodyHandle, PhysicsWorld};
use crate::respawn::RespawnGuard;

/// What the frame driver and camera need after a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControllerOutput {
    pub orientation: Orientation,
    /// Body position plus the eye offset, in controller space.
    pub eye_position: Vec3,
    pub grounded: bool,
    pub jumped: bool,
    pub respawned: bool,
}

/// The player controller. Owns the body handle and all per-player state.
#[derive(Resource)]
pub struct FpsController {
    body: BodyHandle,
    config: MovementConfig,
    look: LookController,
    sensor: GroundSensor,
    locomotion: Box<dyn Locomotion>,
    respawn: RespawnGuard,
}

impl FpsController {
    /// Expects a config that already passed [`MovementConfig::validate`].
    pub fn new(config: MovementConfig, body: BodyHandle) -> Self {
        let locomotion = config.strategy.build(&config);
        debug!("Player controller using {} locomotion", locomotion.name());
        Self {
            body,
            look: LookController::new(config.initial_yaw),
            sensor: GroundSensor::new(config.probe),
            respawn: RespawnGuard::new(config.respawn_threshold, config.respawn_position()),
            locomotion,
            config,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn orientation(&self) -> Orientation {
        self.look.orientation()
    }

    /// Advance the controller by one frame.
    pub fn tick(
        &mut self,
        dt: f32,
        input: &mut InputState,
        world: &mut dyn PhysicsWorld,
    ) -> ControllerOutput {
        let config = &self.config;
        let controls = input.sample(&config.bindings);

        // --- Look ---
        self.look
            .apply_mouse_delta(input.take_mouse_delta(), config.mouse_sensitivity);
        self.look
            .apply_key_look(dt, config.key_look_speed, controls.look);
        let orientation = self.look.orientation();

        // --- Ground ---
        let half_height = config.body.half_height();
        let position = world.position(self.body);
        let grounded = self.sensor.probe(world, self.body, position, half_height);

        // --- Locomotion ---
        let ctx = StepContext {
            dt,
            body: self.body,
            wish: wish_velocity(
                &controls,
                orientation.yaw,
                config.walk_speed,
                config.run_speed,
            ),
            jump: controls.jump,
            grounded,
        };
        let report = self.locomotion.step(&ctx, world);
        if report.consume_jump {
            input.release(&config.bindings.jump);
        }

        // --- Respawn ---
        let respawn = self.respawn.tick(world.position(self.body));
        if let Some(respawn) = respawn {
            info!(
                "Player fell below y={}; respawning at {:?}",
                self.respawn.threshold(),
                respawn.position
            );
            respawn.apply(world, self.body);
            self.locomotion.reset();
        }

        ControllerOutput {
            orientation,
            eye_position: world.position(self.body) + Vec3::Y * config.eye_offset,
            grounded,
            jumped: report.jumped,
            respawned: respawn.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strategy;
    use crate::testing::ScriptedWorld;

    const DT: f32 = 1.0 / 60.0;
    const HALF_HEIGHT: f32 = 1.1;

    /// Input replay harness shared by both strategies.
    struct Harness {
        controller: FpsController,
        input: InputState,
        world: ScriptedWorld,
        gravity: f32,
    }

    impl Harness {
        fn new(strategy: Strategy) -> Self {
            let config = MovementConfig {
                strategy,
                initial_yaw: 0.0,
                respawn_position: [0.0, HALF_HEIGHT, 0.0],
                ..default()
            };
            config.validate().unwrap();
            let mut world = ScriptedWorld::on_floor(HALF_HEIGHT);
            world.kinematic = strategy == Strategy::CollideAndSlide;
            Self {
                gravity: config.gravity,
                controller: FpsController::new(config, world.body()),
                input: InputState::default(),
                world,
            }
        }

        fn press(&mut self, key: KeyCode) {
            self.input.set_held(key, true);
        }

        fn release(&mut self, key: KeyCode) {
            self.input.set_held(key, false);
        }

        /// Tick the controller, then let the physics double step.
        fn run(&mut self, ticks: usize) -> Vec<ControllerOutput> {
            (0..ticks)
                .map(|_| {
                    let output = self.controller.tick(DT, &mut self.input, &mut self.world);
                    self.world.step(DT, self.gravity);
                    output
                })
                .collect()
        }
    }

    const STRATEGIES: [Strategy; 2] = [Strategy::VelocityBody, Strategy::CollideAndSlide];

    #[test]
    fn test_walk_forward_both_strategies() {
        for strategy in STRATEGIES {
            let mut harness = Harness::new(strategy);
            harness.press(KeyCode::KeyW);
            harness.run(60);

            let position = harness.world.position;
            assert!((position.z - 5.0).abs() < 0.05, "{strategy:?}: z={}", position.z);
            assert!(position.x.abs() < 1e-4, "{strategy:?}: x={}", position.x);
            assert!((position.y - HALF_HEIGHT).abs() < 1e-3, "{strategy:?}: y={}", position.y);
        }
    }

    #[test]
    fn test_forward_velocity_scenario() {
        let mut harness = Harness::new(Strategy::VelocityBody);
        harness.world.floor_y = None;
        harness.world.velocity = Vec3::new(0.0, -2.0, 0.0);
        harness.press(KeyCode::KeyW);

        harness
            .controller
            .tick(DT, &mut harness.input, &mut harness.world);

        assert!((harness.world.velocity - Vec3::new(0.0, -2.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn test_diagonal_velocity_scenario() {
        let mut harness = Harness::new(Strategy::VelocityBody);
        harness.world.velocity = Vec3::new(0.0, -0.5, 0.0);
        harness.world.floor_y = None;
        harness.press(KeyCode::KeyW);
        harness.press(KeyCode::KeyD);

        harness
            .controller
            .tick(DT, &mut harness.input, &mut harness.world);

        let v = harness.world.velocity;
        assert!((v.x - 3.5355).abs() < 1e-3);
        assert!((v.z - 3.5355).abs() < 1e-3);
        assert_eq!(v.y, -0.5);
    }

    #[test]
    fn test_run_modifier_speed() {
        let mut harness = Harness::new(Strategy::VelocityBody);
        harness.press(KeyCode::KeyW);
        harness.press(KeyCode::KeyA);
        harness.press(KeyCode::ShiftLeft);
        harness.run(1);
        let v = harness.world.velocity_writes[0];
        assert!((Vec2::new(v.x, v.z).length() - 10.0).abs() < 1e-4);

        harness.release(KeyCode::ShiftLeft);
        harness.run(1);
        let v = harness.world.velocity_writes[1];
        assert!((Vec2::new(v.x, v.z).length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_held_jump_fires_once_while_grounded() {
        // No physics step: the body never leaves the floor, so only the edge trigger
        // prevents repeated impulses.
        let mut harness = Harness::new(Strategy::VelocityBody);
        harness.press(KeyCode::Space);

        let outputs: Vec<_> = (0..5)
            .map(|_| {
                // Floor absorbs whatever vertical speed the last tick wrote
                harness.world.velocity = Vec3::ZERO;
                harness
                    .controller
                    .tick(DT, &mut harness.input, &mut harness.world)
            })
            .collect();

        assert!(outputs.iter().all(|o| o.grounded));
        assert_eq!(outputs.iter().filter(|o| o.jumped).count(), 1);
        let impulses = harness
            .world
            .velocity_writes
            .iter()
            .filter(|v| v.y == 7.0)
            .count();
        assert_eq!(impulses, 1);
    }

    #[test]
    fn test_new_press_jumps_again_after_landing() {
        let mut harness = Harness::new(Strategy::VelocityBody);
        harness.press(KeyCode::Space);
        let first = harness.run(120);
        assert_eq!(first.iter().filter(|o| o.jumped).count(), 1);
        assert!(first.last().unwrap().grounded, "should have landed");

        harness.release(KeyCode::Space);
        harness.press(KeyCode::Space);
        let second = harness.run(1);
        assert!(second[0].jumped);
    }

    #[test]
    fn test_tap_jump_once_both_strategies() {
        for strategy in STRATEGIES {
            let mut harness = Harness::new(strategy);
            harness.press(KeyCode::Space);
            let mut outputs = harness.run(1);
            harness.release(KeyCode::Space);
            outputs.extend(harness.run(90));

            assert_eq!(
                outputs.iter().filter(|o| o.jumped).count(),
                1,
                "{strategy:?}"
            );
            let final_y = harness.world.position.y;
            assert!(
                (final_y - HALF_HEIGHT).abs() < 1e-3,
                "{strategy:?} landed at {final_y}"
            );
        }
    }

    #[test]
    fn test_fall_off_edge_respawns_both_strategies() {
        for strategy in STRATEGIES {
            let mut harness = Harness::new(strategy);
            harness.world.floor_extent = 2.0;
            harness.press(KeyCode::KeyW);

            let outputs = harness.run(200);
            let index = outputs
                .iter()
                .position(|o| o.respawned)
                .unwrap_or_else(|| panic!("{strategy:?} never respawned"));

            assert_eq!(
                harness.world.teleports[0],
                Vec3::new(0.0, HALF_HEIGHT, 0.0),
                "{strategy:?}"
            );
            // Eye reported from the spawn point on the respawn frame
            assert!((outputs[index].eye_position.y - (HALF_HEIGHT + 1.4)).abs() < 1e-5);
            // No residual fall speed on the frame after the teleport
            let next = index + 1;
            match strategy {
                Strategy::VelocityBody => {
                    let writes = &harness.world.velocity_writes;
                    assert!(writes.iter().any(|v| *v == Vec3::ZERO));
                }
                Strategy::CollideAndSlide => {
                    let move_after = harness.world.slide_moves[next];
                    assert!(move_after.y > -14.0 * DT * DT - 1e-6, "{move_after:?}");
                }
            }
        }
    }

    #[test]
    fn test_respawn_cancels_queued_slide_move() {
        let mut harness = Harness::new(Strategy::CollideAndSlide);
        harness.world.floor_extent = 2.0;
        harness.press(KeyCode::KeyW);

        let mut respawned = false;
        for _ in 0..200 {
            let output = harness
                .controller
                .tick(DT, &mut harness.input, &mut harness.world);
            if output.respawned {
                respawned = true;
                break;
            }
            harness.world.step(DT, harness.gravity);
        }
        assert!(respawned);

        // The fall displacement queued earlier in the respawn frame is gone
        assert!(harness.world.slide_moves.last().unwrap().y < 0.0);
        assert_eq!(harness.world.pending_move, None);
        harness.world.step(DT, harness.gravity);
        assert_eq!(harness.world.position, Vec3::new(0.0, HALF_HEIGHT, 0.0));
    }

    #[test]
    fn test_mouse_look_rotates_movement() {
        let mut harness = Harness::new(Strategy::VelocityBody);
        harness.input.set_pointer_locked(true);
        // Quarter turn to the right at 0.002 rad/px
        harness
            .input
            .accumulate_mouse(Vec2::new(std::f32::consts::FRAC_PI_2 / 0.002, 0.0));
        harness.press(KeyCode::KeyW);

        let output = harness.run(1)[0];

        assert!((output.orientation.yaw - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
        let v = harness.world.velocity_writes[0];
        assert!((v.x - 5.0).abs() < 1e-3);
        assert!(v.z.abs() < 1e-3);
    }

    #[test]
    fn test_mouse_ignored_without_pointer_lock() {
        let mut harness = Harness::new(Strategy::CollideAndSlide);
        harness.input.accumulate_mouse(Vec2::new(500.0, 500.0));
        let output = harness.run(1)[0];
        assert_eq!(output.orientation, Orientation::default());
    }

    #[test]
    fn test_eye_position_follows_body() {
        let mut harness = Harness::new(Strategy::VelocityBody);
        harness.world.position = Vec3::new(3.0, 4.0, 5.0);
        harness.world.floor_y = None;
        let output = harness
            .controller
            .tick(DT, &mut harness.input, &mut harness.world);
        assert!((output.eye_position - Vec3::new(3.0, 5.4, 5.0)).length() < 1e-5);
        assert!(!output.grounded);
    }
}
