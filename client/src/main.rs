//! FPS controller demo client - window, physics, blockout level and the player

mod level;

use std::path::{Path, PathBuf};

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier3d::prelude::*;
use controller::{ControllerPlugin, MovementConfig};

const CONFIG_FILE: &str = "controller.ron";

/// Get the asset path - for bundled macOS apps, use path relative to executable
fn get_asset_path() -> String {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let bundled_assets = exe_dir.join("assets");
            if bundled_assets.exists() {
                info!("Using bundled assets at: {:?}", bundled_assets);
                return bundled_assets.to_string_lossy().to_string();
            }
        }
    }
    // Development layout
    "assets".to_string()
}

/// Where `controller.ron` lives. `cargo run` resolves assets against the crate dir, same
/// as Bevy's asset server.
fn config_path(asset_path: &str) -> PathBuf {
    match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(manifest_dir) if Path::new(asset_path).is_relative() => {
            Path::new(&manifest_dir).join(asset_path).join(CONFIG_FILE)
        }
        _ => Path::new(asset_path).join(CONFIG_FILE),
    }
}

/// Tuning from `path`, or the built-in defaults when the file is absent.
/// A present but broken file is fatal.
///
/// Call after `DefaultPlugins` so the log lines reach the subscriber.
fn load_config(path: &Path) -> MovementConfig {
    if !path.exists() {
        info!("No {:?}; using default controller tuning", path);
        return MovementConfig::default();
    }

    match MovementConfig::load(path) {
        Ok(config) => {
            info!("Loaded controller tuning from {:?}", path);
            config
        }
        Err(e) => panic!("Failed to load {}: {e}", path.display()),
    }
}

fn main() {
    let asset_path = get_asset_path();
    let config_file = config_path(&asset_path);

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "FPS Controller".to_string(),
                    resolution: WindowResolution::new(1280, 720),
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                file_path: asset_path,
                ..default()
            }),
    );

    // Physics steps in PostUpdate, after the controller has written this frame's motion
    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
    app.add_plugins(ControllerPlugin::new(load_config(&config_file)));

    app.add_systems(Startup, level::spawn_level);

    app.run();
}
