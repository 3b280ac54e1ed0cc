//! Bevy integration
//!
//! Wires the controller into the app schedule and adapts it to `bevy_rapier3d`.
//!
//! Frame order (all in `Update`, Rapier steps afterwards in `PostUpdate`):
//! input messages -> controller tick -> camera pose.

use bevy::input::keyboard::KeyboardInput;
use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow, WindowFocused};
use bevy_rapier3d::prelude::*;

use crate::config::{MovementConfig, Strategy};
use crate::controller::{ControllerOutput, FpsController};
use crate::input::InputState;
use crate::look::Orientation;
use crate::physics::{BodyHandle, PhysicsWorld, RayHit};

// =============================================================================
// COMPONENTS & RESOURCES
// =============================================================================

/// Marker for the simulated player capsule.
#[derive(Component)]
pub struct PlayerBody;

/// Marker for the camera posed from the controller output.
#[derive(Component)]
pub struct PlayerCamera;

/// Latest camera pose published by the controller tick (Bevy world space).
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct ViewPose {
    pub eye: Vec3,
    pub rotation: Quat,
}

impl ViewPose {
    pub fn from_output(output: &ControllerOutput) -> Self {
        Self {
            eye: to_bevy(output.eye_position),
            rotation: camera_rotation(output.orientation),
        }
    }
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControllerSet {
    Input,
    Tick,
    Camera,
}

// =============================================================================
// COORDINATES
// =============================================================================

// Controller space has yaw 0 looking down +Z with +X on the right. Bevy's camera looks
// down -Z with +X on the right, so the two frames differ by a Z mirror.

/// Controller space -> Bevy world space.
pub fn to_bevy(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, -v.z)
}

/// Bevy world space -> controller space.
pub fn from_bevy(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, -v.z)
}

/// Camera rotation for an orientation (positive yaw turns right, positive pitch looks down).
pub fn camera_rotation(orientation: Orientation) -> Quat {
    Quat::from_euler(EulerRot::YXZ, -orientation.yaw, -orientation.pitch, 0.0)
}

// =============================================================================
// PLUGIN
// =============================================================================

/// Adds the player controller. Panics on an invalid config: bad tuning should stop the
/// game at startup, not misbehave mid-frame.
pub struct ControllerPlugin {
    pub config: MovementConfig,
}

impl ControllerPlugin {
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }
}

impl Plugin for ControllerPlugin {
    fn build(&self, app: &mut App) {
        if let Err(e) = self.config.validate() {
            panic!("Invalid controller config: {e}");
        }

        app.insert_resource(self.config.clone())
            .init_resource::<InputState>()
            .init_resource::<ViewPose>()
            .configure_sets(
                Update,
                (ControllerSet::Input, ControllerSet::Tick, ControllerSet::Camera).chain(),
            )
            .add_systems(Startup, spawn_player)
            .add_systems(
                Update,
                (
                    handle_focus_changes,
                    manage_pointer_lock,
                    read_keyboard_input,
                    read_mouse_motion,
                )
                    .chain()
                    .in_set(ControllerSet::Input),
            )
            .add_systems(
                Update,
                drive_controller
                    .in_set(ControllerSet::Tick)
                    .run_if(resource_exists::<FpsController>),
            )
            .add_systems(Update, sync_camera.in_set(ControllerSet::Camera))
            .add_systems(Update, apply_gravity);
    }
}

// =============================================================================
// SPAWNING
// =============================================================================

/// Spawn the player capsule for the configured strategy. Returns the body entity.
pub fn spawn_player_body(commands: &mut Commands, config: &MovementConfig) -> Entity {
    let body = &config.body;
    let mut entity = commands.spawn((
        PlayerBody,
        Name::new("Player Body"),
        Transform::from_translation(to_bevy(config.respawn_position())),
        Collider::capsule_y(body.segment_half_height(), body.radius),
        Velocity::zero(),
        Friction {
            coefficient: body.friction,
            combine_rule: CoefficientCombineRule::Min,
        },
        Restitution {
            coefficient: body.restitution,
            combine_rule: CoefficientCombineRule::Min,
        },
    ));

    match config.strategy {
        Strategy::VelocityBody => {
            entity.insert((
                RigidBody::Dynamic,
                // Never tumble
                LockedAxes::ROTATION_LOCKED,
                ColliderMassProperties::Mass(body.mass),
                Ccd::enabled(),
                Sleeping::disabled(),
            ));
        }
        Strategy::CollideAndSlide => {
            entity.insert((
                RigidBody::KinematicPositionBased,
                KinematicCharacterController {
                    offset: CharacterLength::Absolute(0.01),
                    max_slope_climb_angle: 45.0_f32.to_radians(),
                    min_slope_slide_angle: 30.0_f32.to_radians(),
                    snap_to_ground: Some(CharacterLength::Absolute(0.1)),
                    autostep: Some(CharacterAutostep {
                        max_height: CharacterLength::Absolute(0.4),
                        min_width: CharacterLength::Absolute(0.2),
                        include_dynamic_bodies: false,
                    }),
                    ..default()
                },
            ));
        }
    }

    entity.id()
}

fn spawn_player(mut commands: Commands, config: Res<MovementConfig>) {
    let body = spawn_player_body(&mut commands, &config);
    let controller = FpsController::new(config.clone(), BodyHandle(body));

    let pose = ViewPose {
        eye: to_bevy(config.respawn_position() + Vec3::Y * config.eye_offset),
        rotation: camera_rotation(controller.orientation()),
    };
    commands.spawn((
        PlayerCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            near: 0.1,
            ..default()
        }),
        Transform::from_translation(pose.eye).with_rotation(pose.rotation),
    ));

    info!(
        "Spawned player ({:?}) at {:?}",
        config.strategy,
        config.respawn_position()
    );
    commands.insert_resource(pose);
    commands.insert_resource(controller);
}

/// Push the configured gravity into every new Rapier context.
fn apply_gravity(
    config: Res<MovementConfig>,
    mut contexts: Query<&mut RapierConfiguration, Added<RapierConfiguration>>,
) {
    for mut rapier_config in &mut contexts {
        rapier_config.gravity = Vec3::Y * config.gravity;
        debug!("Rapier gravity set to {}", config.gravity);
    }
}

// =============================================================================
// INPUT
// =============================================================================

/// Key-down/key-up messages -> held-key table. OS key repeats are not new presses.
fn read_keyboard_input(mut keys: MessageReader<KeyboardInput>, mut input: ResMut<InputState>) {
    for event in keys.read() {
        if event.repeat {
            continue;
        }
        input.set_held(event.key_code, event.state.is_pressed());
    }
}

fn read_mouse_motion(mut motion: MessageReader<MouseMotion>, mut input: ResMut<InputState>) {
    for event in motion.read() {
        input.accumulate_mouse(event.delta);
    }
}

/// Click into the window to lock the pointer, Escape to release it.
fn manage_pointer_lock(
    mut cursors: Query<&mut CursorOptions, With<PrimaryWindow>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut input: ResMut<InputState>,
) {
    let Ok(mut cursor) = cursors.single_mut() else {
        return;
    };

    if mouse_button.just_pressed(MouseButton::Left) && !input.pointer_locked() {
        cursor.grab_mode = CursorGrabMode::Locked;
        cursor.visible = false;
        input.set_pointer_locked(true);
        debug!("Pointer locked");
    } else if keyboard.just_pressed(KeyCode::Escape) && input.pointer_locked() {
        cursor.grab_mode = CursorGrabMode::None;
        cursor.visible = true;
        input.set_pointer_locked(false);
        debug!("Pointer released");
    }
}

/// Key-up messages never arrive for keys released while unfocused, so drop everything.
fn handle_focus_changes(
    mut focus: MessageReader<WindowFocused>,
    mut cursors: Query<&mut CursorOptions, With<PrimaryWindow>>,
    mut input: ResMut<InputState>,
) {
    for event in focus.read() {
        if event.focused {
            continue;
        }
        input.clear();
        input.set_pointer_locked(false);
        if let Ok(mut cursor) = cursors.single_mut() {
            cursor.grab_mode = CursorGrabMode::None;
            cursor.visible = true;
        }
    }
}

// =============================================================================
// RAPIER ADAPTER
// =============================================================================

/// [`PhysicsWorld`] over the player body's components and a Rapier ray query.
pub struct RapierWorld<'a, F> {
    pub transform: Mut<'a, Transform>,
    pub velocity: Mut<'a, Velocity>,
    pub character: Option<Mut<'a, KinematicCharacterController>>,
    /// `grounded` from the character controller's last resolved move.
    pub supported: bool,
    /// (origin, direction, max distance, excluded entity) -> hit distance, Bevy space.
    pub cast: F,
}

impl<F> PhysicsWorld for RapierWorld<'_, F>
where
    F: Fn(Vec3, Vec3, f32, Option<Entity>) -> Option<f32>,
{
    fn linear_velocity(&self, _body: BodyHandle) -> Vec3 {
        from_bevy(self.velocity.linvel)
    }

    fn set_linear_velocity(&mut self, _body: BodyHandle, velocity: Vec3) {
        self.velocity.linvel = to_bevy(velocity);
    }

    fn position(&self, _body: BodyHandle) -> Vec3 {
        from_bevy(self.transform.translation)
    }

    fn set_position(&mut self, _body: BodyHandle, position: Vec3) {
        self.transform.translation = to_bevy(position);
        // Rapier would otherwise sweep this frame's queued move on top of the teleport
        if let Some(character) = self.character.as_mut() {
            character.translation = None;
        }
    }

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<BodyHandle>,
    ) -> Option<RayHit> {
        (self.cast)(
            to_bevy(origin),
            to_bevy(direction),
            max_distance,
            exclude.map(|handle| handle.0),
        )
        .map(|distance| RayHit { distance })
    }

    fn move_and_slide(&mut self, _body: BodyHandle, translation: Vec3) {
        if let Some(character) = self.character.as_mut() {
            character.translation = Some(to_bevy(translation));
        }
    }

    fn is_supported(&self, _body: BodyHandle) -> bool {
        self.supported
    }
}

/// Solid-ray filter that skips the given rigid body.
fn ray_filter(exclude: Option<Entity>) -> QueryFilter<'static> {
    let filter = QueryFilter::default();
    match exclude {
        Some(entity) => filter.exclude_rigid_body(entity),
        None => filter,
    }
}

type PlayerBodyData = (
    &'static mut Transform,
    &'static mut Velocity,
    Option<&'static mut KinematicCharacterController>,
    Option<&'static KinematicCharacterControllerOutput>,
);

/// The frame driver: one controller tick per rendered frame.
fn drive_controller(
    time: Res<Time>,
    mut input: ResMut<InputState>,
    mut controller: ResMut<FpsController>,
    mut pose: ResMut<ViewPose>,
    rapier: ReadRapierContext,
    mut bodies: Query<PlayerBodyData, With<PlayerBody>>,
    mut last_warn_time: Local<f32>,
) {
    let now = time.elapsed_secs();
    let mut warn_throttled = |what: &str| {
        if now - *last_warn_time > 1.0 {
            warn!("drive_controller: {what}; skipping player tick");
            *last_warn_time = now;
        }
    };

    let Ok(context) = rapier.single() else {
        warn_throttled("no Rapier context");
        return;
    };
    let body = controller.body();
    let Ok((transform, velocity, character, character_output)) = bodies.get_mut(body.0) else {
        warn_throttled("player body missing");
        return;
    };

    let mut world = RapierWorld {
        transform,
        velocity,
        character,
        supported: character_output.is_some_and(|output| output.grounded),
        cast: |origin: Vec3, direction: Vec3, max_distance: f32, exclude: Option<Entity>| {
            context
                .cast_ray(origin, direction, max_distance, true, ray_filter(exclude))
                .map(|(_, distance)| distance)
        },
    };

    let output = controller.tick(time.delta_secs(), &mut input, &mut world);
    *pose = ViewPose::from_output(&output);
}

fn sync_camera(pose: Res<ViewPose>, mut cameras: Query<&mut Transform, With<PlayerCamera>>) {
    for mut transform in &mut cameras {
        transform.translation = pose.eye;
        transform.rotation = pose.rotation;
    }
}
