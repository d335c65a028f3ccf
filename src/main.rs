//! Squad Shooter - Entry Point
//!
//! Loads enemy archetypes, rooms and tuning from `assets/data/` and runs the
//! first room of `level1`.

use bevy::prelude::*;
use bevy_kira_audio::AudioPlugin as KiraAudioPlugin;
use bevy_rapier3d::prelude::*;

fn main() {
    App::new()
        // Bevy default plugins, audio goes through kira instead
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Squad Shooter".to_string(),
                        resolution: (1280.0, 720.0).into(),
                        ..default()
                    }),
                    ..default()
                })
                .disable::<bevy::audio::AudioPlugin>(),
        )

        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())

        // Audio
        .add_plugins(KiraAudioPlugin)

        // Our game plugin
        .add_plugins(squad_shooter::SquadShooterPlugin)

        .run();
}
