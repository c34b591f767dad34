//! Data-driven game balance
//!
//! Every magic number the simulation uses lives here so it can be tweaked from
//! JSON without touching code. Units: pixels, pixels/second, seconds.
//! Missing JSON fields keep their default values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::settings::ConfigError;
use crate::sim::{BossVariant, GruntKind};

/// Root tuning table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub physics: PhysicsTuning,
    pub player: PlayerTuning,
    pub shot: ShotTuning,
    pub grunts: GruntTable,
    pub grunt_ai: GruntAiTuning,
    pub bosses: BossTable,
    pub boss_ai: BossAiTuning,
    pub rhythm: RhythmTuning,
    pub pickups: PickupTuning,
    pub star: StarTuning,
    pub intermission: IntermissionTuning,
}

impl Tuning {
    /// Parse a (possibly partial) tuning table
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a tuning table from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&text)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    pub fn grunt(&self, kind: GruntKind) -> &GruntStats {
        match kind {
            GruntKind::Hater => &self.grunts.hater,
            GruntKind::Rival => &self.grunts.rival,
            GruntKind::Flyer => &self.grunts.flyer,
            GruntKind::Sniper => &self.grunts.sniper,
        }
    }

    pub fn boss(&self, variant: BossVariant) -> &BossStats {
        match variant {
            BossVariant::Shooter => &self.bosses.shooter,
            BossVariant::Conductor => &self.bosses.conductor,
            BossVariant::Maestro => &self.bosses.maestro,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub view_width: f32,
    pub world_height: f32,
    /// An actor whose top passes world_height + fall_margin is out of the world
    pub fall_margin: f32,
    /// Distance from the stage's right edge that counts as reaching the exit
    pub exit_margin: f32,
    /// Fraction of the camera gap closed each frame
    pub camera_smoothing: f32,
    /// Player sits at this fraction of the view from the left edge
    pub camera_lead: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            view_width: crate::consts::VIEW_WIDTH,
            world_height: crate::consts::WORLD_HEIGHT,
            fall_margin: 50.0,
            exit_margin: 50.0,
            camera_smoothing: 0.1,
            camera_lead: 1.0 / 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity: f32,
    pub max_fall_speed: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 2880.0,
            max_fall_speed: 1200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub jump_speed: f32,
    pub max_health: i32,
    pub invincibility: f32,
    pub attack_cooldown: f32,
    pub attack_hold: f32,
    /// Attack pose held after the ultimate strike is released
    pub ultimate_hold: f32,
    pub charge_max: u32,
    pub charge_per_hit: u32,
    /// Upward speed given after a stomp
    pub stomp_bounce: f32,
    /// How far below an enemy's top edge the player's feet may be and still stomp
    pub stomp_tolerance: f32,
    /// Horizontal push applied on contact damage
    pub contact_push: f32,
    pub run_frame: f32,
    pub crouch_frame: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: 64.0,
            height: 96.0,
            speed: 360.0,
            jump_speed: 1080.0,
            max_health: 3,
            invincibility: 1.5,
            attack_cooldown: 0.35,
            attack_hold: 0.3,
            ultimate_hold: 0.5,
            charge_max: 100,
            charge_per_hit: 15,
            stomp_bounce: 600.0,
            stomp_tolerance: 30.0,
            contact_push: 5.0,
            run_frame: 0.15,
            crouch_frame: 0.25,
        }
    }
}

/// Player's regular projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotTuning {
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    pub damage: i32,
    /// Spawn offset from the player's centre in the facing direction
    pub spawn_offset: f32,
    /// Distance outside the view/world after which projectiles are dropped
    pub bounds_margin: f32,
    /// Hard lifetime cap for any projectile
    pub max_lifetime: f32,
}

impl Default for ShotTuning {
    fn default() -> Self {
        Self {
            speed: 720.0,
            width: 40.0,
            height: 20.0,
            damage: 1,
            spawn_offset: 30.0,
            bounds_margin: 200.0,
            max_lifetime: 6.0,
        }
    }
}

/// Per-kind grunt stat block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GruntStats {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub health: i32,
    pub damage: i32,
    pub detection_range: f32,
    pub score: u64,
    /// Ranged kinds only
    pub shot_speed: f32,
    pub shot_cooldown: f32,
}

impl Default for GruntStats {
    fn default() -> Self {
        GruntTable::default().hater
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GruntTable {
    pub hater: GruntStats,
    pub rival: GruntStats,
    pub flyer: GruntStats,
    pub sniper: GruntStats,
}

impl Default for GruntTable {
    fn default() -> Self {
        Self {
            hater: GruntStats {
                width: 48.0,
                height: 64.0,
                speed: 120.0,
                health: 2,
                damage: 1,
                detection_range: 300.0,
                score: 100,
                shot_speed: 0.0,
                shot_cooldown: 0.0,
            },
            rival: GruntStats {
                width: 56.0,
                height: 80.0,
                speed: 180.0,
                health: 3,
                damage: 1,
                detection_range: 400.0,
                score: 200,
                shot_speed: 0.0,
                shot_cooldown: 0.0,
            },
            flyer: GruntStats {
                width: 48.0,
                height: 48.0,
                speed: 150.0,
                health: 1,
                damage: 1,
                detection_range: 350.0,
                score: 150,
                shot_speed: 0.0,
                shot_cooldown: 0.0,
            },
            sniper: GruntStats {
                width: 56.0,
                height: 80.0,
                speed: 0.0,
                health: 3,
                damage: 1,
                detection_range: 500.0,
                score: 250,
                shot_speed: 420.0,
                shot_cooldown: 2.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GruntAiTuning {
    pub patrol_distance: f32,
    /// Chasing stops inside this horizontal distance
    pub dead_zone_stop: f32,
    /// Chasing resumes only beyond this horizontal distance
    pub dead_zone_resume: f32,
    pub melee_range: f32,
    pub melee_hold: f32,
    pub ranged_hold: f32,
    pub min_separation: f32,
    pub death_linger: f32,
    pub hit_flash: f32,
    pub run_frame: f32,
    pub hover_height: f32,
    pub hover_amplitude: f32,
    /// Radians per second
    pub hover_frequency: f32,
}

impl Default for GruntAiTuning {
    fn default() -> Self {
        Self {
            patrol_distance: 100.0,
            dead_zone_stop: 25.0,
            dead_zone_resume: 45.0,
            melee_range: 80.0,
            melee_hold: 0.3,
            ranged_hold: 0.5,
            min_separation: 10.0,
            death_linger: 2.0,
            hit_flash: 0.1,
            run_frame: 0.2,
            hover_height: 160.0,
            hover_amplitude: 24.0,
            hover_frequency: 3.0,
        }
    }
}

/// Per-variant boss stat block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossStats {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub health: i32,
    pub damage: i32,
    pub score: u64,
    pub shot_speed: f32,
    pub shot_damage: i32,
    pub attack_cooldown: f32,
}

impl Default for BossStats {
    fn default() -> Self {
        BossTable::default().shooter
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTable {
    pub shooter: BossStats,
    pub conductor: BossStats,
    pub maestro: BossStats,
}

impl Default for BossTable {
    fn default() -> Self {
        Self {
            shooter: BossStats {
                width: 128.0,
                height: 160.0,
                speed: 120.0,
                health: 20,
                damage: 2,
                score: 1000,
                shot_speed: 480.0,
                shot_damage: 1,
                attack_cooldown: 2.0,
            },
            conductor: BossStats {
                width: 128.0,
                height: 160.0,
                speed: 140.0,
                health: 30,
                damage: 2,
                score: 1500,
                shot_speed: 420.0,
                shot_damage: 1,
                attack_cooldown: 2.2,
            },
            maestro: BossStats {
                width: 144.0,
                height: 176.0,
                speed: 150.0,
                health: 40,
                damage: 2,
                score: 2500,
                shot_speed: 450.0,
                shot_damage: 1,
                attack_cooldown: 2.4,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossAiTuning {
    /// Health ratio at or below which phase 2 starts
    pub phase2_ratio: f32,
    /// Health ratio at or below which phase 3 starts
    pub phase3_ratio: f32,
    /// Cooldown shrinks by this fraction per phase above 1
    pub cooldown_step: f32,
    pub follow_distance: f32,
    pub attack_hold: f32,
    pub run_frame: f32,
    /// Vertical spacing between the shots of a double/triple volley
    pub volley_spacing: f32,
    pub shot_size: f32,
}

impl Default for BossAiTuning {
    fn default() -> Self {
        Self {
            phase2_ratio: 0.6,
            phase3_ratio: 0.3,
            cooldown_step: 0.2,
            follow_distance: 150.0,
            attack_hold: 0.4,
            run_frame: 0.25,
            volley_spacing: 30.0,
            shot_size: 24.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmTuning {
    pub note_count: u32,
    pub spawn_interval: f32,
    pub fall_speed: f32,
    pub note_size: f32,
    pub track_top: f32,
    pub hit_line: f32,
    pub best_window: f32,
    pub good_window: f32,
    pub ok_window: f32,
    pub base_damage: i32,
    pub best_bonus: i32,
    pub good_bonus: i32,
    pub ok_bonus: i32,
    /// How many extra targets the ultimate strike may pass through
    pub ultimate_pierce: u32,
    /// Multiplier on the regular shot speed
    pub ultimate_speed_factor: f32,
    /// Multiplier on the player's size
    pub ultimate_size_factor: f32,
    pub feedback_duration: f32,
}

impl RhythmTuning {
    /// A target this far past the hit line can no longer be hit
    pub fn miss_distance(&self) -> f32 {
        self.ok_window + self.note_size
    }
}

impl Default for RhythmTuning {
    fn default() -> Self {
        Self {
            note_count: 8,
            spawn_interval: 0.8,
            fall_speed: 240.0,
            note_size: 50.0,
            track_top: 150.0,
            hit_line: 490.0,
            best_window: 15.0,
            good_window: 35.0,
            ok_window: 55.0,
            base_damage: 3,
            best_bonus: 3,
            good_bonus: 2,
            ok_bonus: 1,
            ultimate_pierce: 0,
            ultimate_speed_factor: 1.5,
            ultimate_size_factor: 2.0,
            feedback_duration: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupTuning {
    pub size: f32,
    pub note_score: u64,
    pub ampli_score: u64,
    pub mediator_charge: u32,
    pub heal: i32,
}

impl Default for PickupTuning {
    fn default() -> Self {
        Self {
            size: 32.0,
            note_score: 50,
            ampli_score: 100,
            mediator_charge: 25,
            heal: 1,
        }
    }
}

/// Mystery block and star power
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarTuning {
    pub block_size: f32,
    pub size: f32,
    pub slide_speed: f32,
    pub pop_speed: f32,
    pub bounce_speed: f32,
    pub gravity_scale: f32,
    pub duration: f32,
    pub max_lifetime: f32,
}

impl Default for StarTuning {
    fn default() -> Self {
        Self {
            block_size: 48.0,
            size: 40.0,
            slide_speed: 180.0,
            pop_speed: 480.0,
            bounce_speed: 600.0,
            gravity_scale: 0.6,
            duration: 10.0,
            max_lifetime: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntermissionTuning {
    pub boss_intro: f32,
    pub celebration: f32,
    /// Part of the celebration spent panning the camera to the boss
    pub celebration_pan: f32,
    pub celebration_zoom: f32,
    pub damage_number_life: f32,
    pub damage_number_rise: f32,
}

impl Default for IntermissionTuning {
    fn default() -> Self {
        Self {
            boss_intro: 6.0,
            celebration: 5.0,
            celebration_pan: 2.0,
            celebration_zoom: 1.5,
            damage_number_life: 1.5,
            damage_number_rise: 40.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning =
            Tuning::from_json(r#"{ "grunt_ai": { "dead_zone_resume": 60.0 }, "rhythm": { "ultimate_pierce": 2 } }"#)
                .unwrap();
        assert_eq!(tuning.grunt_ai.dead_zone_resume, 60.0);
        assert_eq!(tuning.grunt_ai.dead_zone_stop, 25.0);
        assert_eq!(tuning.rhythm.ultimate_pierce, 2);
        assert_eq!(tuning.rhythm.note_count, 8);
        assert_eq!(tuning.physics, PhysicsTuning::default());
    }

    #[test]
    fn test_hysteresis_thresholds_ordered() {
        let ai = GruntAiTuning::default();
        assert!(ai.dead_zone_resume > ai.dead_zone_stop);
    }

    #[test]
    fn test_rhythm_windows_nested() {
        let r = RhythmTuning::default();
        assert!(r.best_window < r.good_window && r.good_window < r.ok_window);
        assert!(r.miss_distance() > r.ok_window);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }
}
