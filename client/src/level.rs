//! Blockout level
//!
//! Static untextured geometry: an open ground slab with drop-offs on every side, a raised
//! deck under the spawn point with a ramp down, and a few crates to walk into.

use bevy::light::{light_consts::lux, DirectionalLightShadowMap};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Static box: (center, full size, color).
struct Block {
    center: Vec3,
    size: Vec3,
    color: Color,
}

impl Block {
    const fn new(center: Vec3, size: Vec3, color: Color) -> Self {
        Self { center, size, color }
    }
}

const GROUND: Color = Color::srgb(0.45, 0.47, 0.42);
const DECK: Color = Color::srgb(0.62, 0.55, 0.45);
const CRATE: Color = Color::srgb(0.55, 0.38, 0.22);

// Bevy world space. The player spawns above the deck at (-14, 13, -27).
const BLOCKS: [Block; 9] = [
    // Ground, 80 x 80, top at y = 0
    Block::new(Vec3::new(0.0, -0.5, 0.0), Vec3::new(80.0, 1.0, 80.0), GROUND),
    // Deck under the spawn point, top at y = 8
    Block::new(Vec3::new(-14.0, 7.5, -27.0), Vec3::new(14.0, 1.0, 14.0), DECK),
    // Deck pillars
    Block::new(Vec3::new(-20.0, 3.5, -33.0), Vec3::new(1.0, 7.0, 1.0), DECK),
    Block::new(Vec3::new(-8.0, 3.5, -33.0), Vec3::new(1.0, 7.0, 1.0), DECK),
    Block::new(Vec3::new(-20.0, 3.5, -21.0), Vec3::new(1.0, 7.0, 1.0), DECK),
    Block::new(Vec3::new(-8.0, 3.5, -21.0), Vec3::new(1.0, 7.0, 1.0), DECK),
    // Crates on the ground
    Block::new(Vec3::new(4.0, 0.5, -6.0), Vec3::new(1.0, 1.0, 1.0), CRATE),
    Block::new(Vec3::new(6.0, 1.0, -8.0), Vec3::new(2.0, 2.0, 2.0), CRATE),
    Block::new(Vec3::new(-2.0, 0.25, 4.0), Vec3::new(3.0, 0.5, 3.0), CRATE),
];

/// Ramp from the deck's +Z edge down to the ground.
const RAMP_LENGTH: f32 = 18.0;
const RAMP_WIDTH: f32 = 4.0;

pub fn spawn_level(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(DirectionalLightShadowMap { size: 1024 });

    for block in &BLOCKS {
        commands.spawn((
            Name::new("Level Block"),
            Mesh3d(meshes.add(Cuboid::from_size(block.size))),
            MeshMaterial3d(materials.add(block.color)),
            Transform::from_translation(block.center),
            RigidBody::Fixed,
            Collider::cuboid(block.size.x / 2.0, block.size.y / 2.0, block.size.z / 2.0),
        ));
    }

    // Ramp: rises 8 m over its length, top edge meets the deck
    let rise = 8.0_f32;
    let run = (RAMP_LENGTH * RAMP_LENGTH - rise * rise).sqrt();
    let angle = (rise / RAMP_LENGTH).asin();
    let center = Vec3::new(-14.0, rise / 2.0, -20.0 + run / 2.0);
    commands.spawn((
        Name::new("Ramp"),
        Mesh3d(meshes.add(Cuboid::new(RAMP_WIDTH, 0.3, RAMP_LENGTH))),
        MeshMaterial3d(materials.add(DECK)),
        Transform::from_translation(center).with_rotation(Quat::from_rotation_x(angle)),
        RigidBody::Fixed,
        Collider::cuboid(RAMP_WIDTH / 2.0, 0.15, RAMP_LENGTH / 2.0),
    ));

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            shadows_enabled: true,
            illuminance: lux::AMBIENT_DAYLIGHT,
            ..default()
        },
        Transform::from_xyz(20.0, 40.0, 20.0).looking_to(Vec3::new(-1.0, -2.0, -1.0), Vec3::Y),
    ));
    commands.insert_resource(AmbientLight {
        brightness: 400.0,
        ..default()
    });

    info!("Blockout level spawned ({} blocks + ramp)", BLOCKS.len());
}
