//! Level and stage data
//!
//! Levels are JSON files holding one or more stages. Every field has a
//! default so partially written stages still load; a file that cannot be
//! read or parsed at all is reported as a `LevelError`.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::actor::{BossVariant, GruntKind};
use super::body::Rect;
use super::state::PickupKind;
use crate::consts::{DEFAULT_GROUND_Y, DEFAULT_STAGE_WIDTH, VIEW_WIDTH, WORLD_HEIGHT};

/// Errors raised while loading level data
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid level JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("stage {0} not found in level")]
    StageNotFound(u32),
    #[error("level has no stages")]
    NoStages,
}

/// What a static rectangle is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Floor segment: everything lands on it, walkers patrol it
    Ground,
    /// Floating platform: only the player stands on it
    Ledge,
    /// Bumped from below once to release a star
    MysteryBlock,
}

/// Static, immutable stage rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub rect: Rect,
    pub surface: Surface,
}

impl Platform {
    pub fn new(rect: Rect, surface: Surface) -> Self {
        Self { rect, surface }
    }

    #[inline]
    pub fn is_ground(&self) -> bool {
        self.surface == Surface::Ground
    }
}

/// A level file: a sequence of stages plus rewards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    #[serde(default = "default_id")]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stages: Vec<StageData>,
    #[serde(default)]
    pub rewards: Rewards,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rewards {
    #[serde(default)]
    pub completion_score: u64,
    /// Ascending score thresholds, one star each
    #[serde(default)]
    pub stars_thresholds: Vec<u64>,
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: LevelData = serde_json::from_str(json)?;
        if level.stages.is_empty() {
            return Err(LevelError::NoStages);
        }
        Ok(level)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let level = Self::from_json(&text)?;
        log::info!(
            "Loaded level {} '{}' ({} stages) from {}",
            level.id,
            level.name,
            level.stages.len(),
            path.as_ref().display()
        );
        Ok(level)
    }

    pub fn stage(&self, stage_id: u32) -> Result<&StageData, LevelError> {
        self.stages
            .iter()
            .find(|s| s.stage_id == stage_id)
            .ok_or(LevelError::StageNotFound(stage_id))
    }

    /// Stage following `stage_id`, if any
    pub fn next_stage(&self, stage_id: u32) -> Option<&StageData> {
        self.stages
            .iter()
            .filter(|s| s.stage_id > stage_id)
            .min_by_key(|s| s.stage_id)
    }

    /// Stars earned for a final score (0..=3)
    pub fn stars_for_score(&self, score: u64) -> u8 {
        let stars = self
            .rewards
            .stars_thresholds
            .iter()
            .filter(|&&threshold| score >= threshold)
            .count();
        stars.min(3) as u8
    }
}

/// One playable stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageData {
    #[serde(default = "default_id")]
    pub stage_id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default)]
    pub player_spawn: SpawnPoint,
    #[serde(default)]
    pub ground_segments: Vec<GroundSegment>,
    #[serde(default)]
    pub platforms: Vec<PlatformData>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    #[serde(default)]
    pub pickups: Vec<PickupSpawn>,
    #[serde(default)]
    pub mystery_blocks: Vec<BlockSpawn>,
    #[serde(default)]
    pub boss: Option<BossSpawn>,
    #[serde(default)]
    pub is_boss_stage: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    #[serde(default = "default_spawn_x")]
    pub x: f32,
    #[serde(default = "default_ground_y")]
    pub y: f32,
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self {
            x: default_spawn_x(),
            y: default_ground_y(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundSegment {
    #[serde(default)]
    pub x: f32,
    #[serde(default = "default_ground_y")]
    pub y: f32,
    #[serde(default = "default_segment_width")]
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformData {
    #[serde(default)]
    pub x: f32,
    #[serde(default = "default_platform_y")]
    pub y: f32,
    #[serde(default = "default_platform_width")]
    pub width: f32,
    #[serde(default = "default_platform_height")]
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    #[serde(default)]
    pub x: f32,
    #[serde(rename = "type", default = "default_enemy_type")]
    pub kind: String,
}

impl EnemySpawn {
    /// Decoded kind; unknown names fall back to a hater
    pub fn grunt_kind(&self) -> GruntKind {
        match self.kind.to_ascii_lowercase().as_str() {
            "hater" => GruntKind::Hater,
            "rival" => GruntKind::Rival,
            "flyer" | "flying" | "groupie" => GruntKind::Flyer,
            "sniper" | "rival_shooter" | "shooter" => GruntKind::Sniper,
            other => {
                log::warn!("Unknown enemy type '{other}', spawning a hater");
                GruntKind::Hater
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupSpawn {
    #[serde(default)]
    pub x: f32,
    #[serde(default = "default_platform_y")]
    pub y: f32,
    #[serde(rename = "type", default = "default_pickup_type")]
    pub kind: String,
}

impl PickupSpawn {
    /// Decoded kind; unknown names fall back to a note
    pub fn pickup_kind(&self) -> PickupKind {
        match self.kind.to_ascii_lowercase().as_str() {
            "note" => PickupKind::Note,
            "mediator" => PickupKind::Mediator,
            "ampli" => PickupKind::Ampli,
            "health" | "heart" => PickupKind::Health,
            other => {
                log::warn!("Unknown pickup type '{other}', spawning a note");
                PickupKind::Note
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockSpawn {
    #[serde(default)]
    pub x: f32,
    #[serde(default = "default_platform_y")]
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossSpawn {
    #[serde(default = "default_boss_x")]
    pub x: f32,
    #[serde(rename = "type", default = "default_boss_type")]
    pub kind: String,
}

impl BossSpawn {
    /// Decoded variant; unknown names fall back to the shooter
    pub fn variant(&self) -> BossVariant {
        match self.kind.to_ascii_lowercase().as_str() {
            "shooter" | "boss" | "boss1" => BossVariant::Shooter,
            "conductor" | "boss2" => BossVariant::Conductor,
            "maestro" | "boss3" => BossVariant::Maestro,
            other => {
                log::warn!("Unknown boss type '{other}', spawning the shooter");
                BossVariant::Shooter
            }
        }
    }
}

impl StageData {
    /// Runtime geometry in a fixed order: ground, ledges, then mystery blocks
    pub fn build_platforms(&self, block_size: f32) -> Vec<Platform> {
        let ground = self.ground_segments.iter().map(|g| {
            // Ground runs past the bottom of the world so nothing slips under it
            let height = WORLD_HEIGHT - g.y + 100.0;
            Platform::new(Rect::new(g.x, g.y, g.width, height), Surface::Ground)
        });
        let ledges = self
            .platforms
            .iter()
            .map(|p| Platform::new(Rect::new(p.x, p.y, p.width, p.height), Surface::Ledge));
        let blocks = self
            .mystery_blocks
            .iter()
            .map(|b| Platform::new(Rect::new(b.x, b.y, block_size, block_size), Surface::MysteryBlock));
        ground.chain(ledges).chain(blocks).collect()
    }

    /// Top of the ground segment under `x`, or the default ground line over a pit
    pub fn ground_at(&self, x: f32) -> f32 {
        self.ground_segments
            .iter()
            .filter(|g| x >= g.x && x < g.x + g.width)
            .map(|g| g.y)
            .reduce(f32::min)
            .unwrap_or(DEFAULT_GROUND_Y)
    }

    /// Feet position of the player spawn
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(self.player_spawn.x, self.player_spawn.y)
    }

    /// Boss stages without an explicit boss record get the default one
    pub fn boss_spawn(&self) -> Option<BossSpawn> {
        match (&self.boss, self.is_boss_stage) {
            (Some(boss), _) => Some(boss.clone()),
            (None, true) => Some(BossSpawn {
                x: default_boss_x(),
                kind: default_boss_type(),
            }),
            (None, false) => None,
        }
    }

    /// Small built-in stage: two ground runs over a pit, a ledge, a mystery block
    pub fn demo() -> Self {
        Self {
            stage_id: 1,
            name: "Garage Gig".to_string(),
            width: DEFAULT_STAGE_WIDTH,
            player_spawn: SpawnPoint::default(),
            ground_segments: vec![
                GroundSegment { x: 0.0, y: DEFAULT_GROUND_Y, width: 1400.0 },
                GroundSegment { x: 1550.0, y: DEFAULT_GROUND_Y, width: 1450.0 },
            ],
            platforms: vec![PlatformData { x: 600.0, y: 450.0, width: 200.0, height: 30.0 }],
            enemies: vec![
                EnemySpawn { x: 900.0, kind: "hater".to_string() },
                EnemySpawn { x: 1800.0, kind: "rival".to_string() },
                EnemySpawn { x: 2200.0, kind: "flyer".to_string() },
                EnemySpawn { x: 2600.0, kind: "sniper".to_string() },
            ],
            pickups: vec![
                PickupSpawn { x: 400.0, y: 560.0, kind: "note".to_string() },
                PickupSpawn { x: 680.0, y: 400.0, kind: "mediator".to_string() },
                PickupSpawn { x: 2000.0, y: 560.0, kind: "ampli".to_string() },
            ],
            mystery_blocks: vec![BlockSpawn { x: 300.0, y: 440.0 }],
            boss: None,
            is_boss_stage: false,
        }
    }
}

fn default_id() -> u32 {
    1
}

fn default_width() -> f32 {
    DEFAULT_STAGE_WIDTH
}

fn default_spawn_x() -> f32 {
    100.0
}

fn default_ground_y() -> f32 {
    DEFAULT_GROUND_Y
}

fn default_segment_width() -> f32 {
    1000.0
}

fn default_platform_y() -> f32 {
    400.0
}

fn default_platform_width() -> f32 {
    150.0
}

fn default_platform_height() -> f32 {
    30.0
}

fn default_enemy_type() -> String {
    "hater".to_string()
}

fn default_pickup_type() -> String {
    "note".to_string()
}

fn default_boss_x() -> f32 {
    VIEW_WIDTH - 200.0
}

fn default_boss_type() -> String {
    "shooter".to_string()
}
