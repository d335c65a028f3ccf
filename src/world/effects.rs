//! Feedback cues raised by the simulation for audio, VFX and UI.

use bevy::prelude::*;

use super::services::EffectsSink;
use crate::enemies::EnemyId;

/// Sounds the simulation can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    EnemyScream,
    MeleeSwing,
    ShotgunShot,
    SniperShot,
    BossSniperShot,
    CoinAppear,
}

impl SoundCue {
    /// Asset path of the clip, relative to `assets/`.
    pub fn asset_path(self) -> &'static str {
        match self {
            SoundCue::EnemyScream => "sounds/enemy_scream.ogg",
            SoundCue::MeleeSwing => "sounds/melee_swing.ogg",
            SoundCue::ShotgunShot => "sounds/shot_shotgun.ogg",
            SoundCue::SniperShot => "sounds/shot_sniper.ogg",
            SoundCue::BossSniperShot => "sounds/shot_boss_sniper.ogg",
            SoundCue::CoinAppear => "sounds/coin_appear.ogg",
        }
    }
}

/// Laser colour while a sniper boss is aiming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AimPhase {
    /// Warning phase, the boss still tracks the player.
    Yellow,
    /// Lock phase, the shot is about to be fired.
    Red,
}

/// What a projectile ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactSurface {
    Player,
    Wall,
}

/// A single piece of feedback for the presentation layer.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum CombatCue {
    HitFlash { enemy: EnemyId },
    FloatingText { enemy: EnemyId, text: String, position: Vec3 },
    HealthChanged { enemy: EnemyId, fraction: f32 },
    HealthBarDetached { enemy: EnemyId },
    Sound { sound: SoundCue, position: Vec3, volume: f32 },
    RagdollActivated { enemy: EnemyId, impulse_point: Vec3, force: f32, radius: f32 },
    RagdollReleased { enemy: EnemyId },
    MuzzleFlash { enemy: EnemyId },
    Reloaded { enemy: EnemyId },
    AimChanged { enemy: EnemyId, aiming: bool },
    LaserAimed { enemy: EnemyId, path: Vec<Vec3>, phase: AimPhase },
    LaserHidden { enemy: EnemyId },
    ProjectileImpact { position: Vec3, surface: ImpactSurface },
}

impl CombatCue {
    pub fn sound(sound: SoundCue, position: Vec3) -> Self {
        CombatCue::Sound {
            sound,
            position,
            volume: 1.0,
        }
    }
}

/// Collects cues during a tick so they can be forwarded afterwards.
#[derive(Debug, Default, Clone)]
pub struct CueBuffer {
    pub cues: Vec<CombatCue>,
}

impl CueBuffer {
    pub fn drain(&mut self) -> std::vec::Drain<'_, CombatCue> {
        self.cues.drain(..)
    }

    pub fn count(&self, predicate: impl Fn(&CombatCue) -> bool) -> usize {
        self.cues.iter().filter(|c| predicate(c)).count()
    }
}

impl EffectsSink for CueBuffer {
    fn emit(&mut self, cue: CombatCue) {
        self.cues.push(cue);
    }
}
