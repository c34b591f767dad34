//! Game state and core simulation types
//!
//! The state owns every live actor and projectile. Nothing else keeps them
//! across a frame boundary; removal during a frame only marks entities, and
//! `compact` drops them at the end of the frame.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::actor::{Actor, ActorId, ActorState};
use super::body::{Body, Rect};
use super::events::GameEvent;
use super::level::{Platform, StageData};
use super::projectile::{Projectile, ProjectileId};
use super::rhythm::{HitTier, RhythmSequencer};
use crate::tuning::{Tuning, WorldTuning};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Nothing advances until resumed
    Paused,
    /// Scripted full-pause sequence (boss intro, boss celebration)
    Intermission,
    /// Exit reached or celebration finished
    StageComplete,
    /// Player died
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    /// Score
    Note,
    /// Ultimate charge
    Mediator,
    /// Big score
    Ampli,
    /// Restores health
    Health,
}

/// Static collectible; consumed on first overlap
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub rect: Rect,
    pub kind: PickupKind,
    pub(crate) collected: bool,
}

impl Pickup {
    pub fn is_collected(&self) -> bool {
        self.collected
    }
}

/// Star released by a mystery block: slides, bounces, grants star power
#[derive(Debug, Clone, PartialEq)]
pub struct StarItem {
    pub body: Body,
    /// Seconds before it vanishes uncollected
    pub ttl: f32,
}

/// Floating damage number (cosmetic)
#[derive(Debug, Clone, PartialEq)]
pub struct DamageNumber {
    pub at: Vec2,
    pub amount: i32,
    pub age: f32,
}

/// Rhythm / ultimate text shown briefly over the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Tier(HitTier),
    Miss,
    Damage(i32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackLabel {
    pub feedback: Feedback,
    pub remaining: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntermissionKind {
    /// Boss stage opening
    BossIntro,
    /// Boss defeated: camera pans to the boss, then the stage completes
    Celebration { focus: Vec2 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intermission {
    pub kind: IntermissionKind,
    pub elapsed: f32,
    pub duration: f32,
}

impl Intermission {
    /// 0..=1
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Horizontal scrolling camera
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    pub x: f32,
}

impl Camera {
    /// Camera x that keeps `focus_x` at the lead fraction of the view
    pub fn target_for(focus_x: f32, stage_width: f32, world: &WorldTuning) -> f32 {
        let max_x = (stage_width - world.view_width).max(0.0);
        (focus_x - world.view_width * world.camera_lead).clamp(0.0, max_x)
    }

    /// Close `rate` of the gap to `target`
    pub fn ease_toward(&mut self, target: f32, rate: f32) {
        self.x += (target - self.x) * rate;
    }
}

/// What the player brings into the next stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerCarry {
    pub health: i32,
    pub charge: u32,
    pub score: u64,
}

/// Complete simulation state of one stage
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub stage_id: u32,
    pub stage_width: f32,
    pub is_boss_stage: bool,
    /// Static geometry: ground, ledges, mystery blocks
    pub platforms: Vec<Platform>,
    /// Platform indices of mystery blocks already bumped
    pub spent_blocks: Vec<usize>,
    pub player: Actor,
    /// Grunts and bosses, sorted by id
    pub enemies: Vec<Actor>,
    /// Sorted by id
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub star_item: Option<StarItem>,
    pub rhythm: RhythmSequencer,
    pub intermission: Option<Intermission>,
    pub phase: GamePhase,
    pub camera: Camera,
    pub score: u64,
    pub damage_numbers: Vec<DamageNumber>,
    pub feedback: Option<FeedbackLabel>,
    /// Simulation frame counter
    pub frame: u64,
    /// Events emitted since the last drain
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    pub(crate) boss_id: Option<ActorId>,
    next_id: u32,
}

impl GameState {
    /// Build the live world for `stage`
    pub fn new(stage: &StageData, tuning: Tuning, seed: u64) -> Self {
        let platforms = stage.build_platforms(tuning.star.block_size);
        let player = Actor::player(ActorId(0), stage.spawn_point(), &tuning);

        let mut state = Self {
            seed,
            stage_id: stage.stage_id,
            stage_width: stage.width,
            is_boss_stage: stage.is_boss_stage,
            platforms,
            spent_blocks: Vec::new(),
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            star_item: None,
            rhythm: RhythmSequencer::default(),
            intermission: None,
            phase: GamePhase::Playing,
            camera: Camera::default(),
            score: 0,
            damage_numbers: Vec::new(),
            feedback: None,
            frame: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            boss_id: None,
            next_id: 1,
            tuning,
        };

        for spawn in &stage.enemies {
            let id = state.next_actor_id();
            let ground = stage.ground_at(spawn.x);
            let grunt = Actor::grunt(id, spawn.grunt_kind(), spawn.x, ground, &state.tuning);
            state.enemies.push(grunt);
        }

        let size = state.tuning.pickups.size;
        state.pickups = stage
            .pickups
            .iter()
            .map(|p| Pickup {
                rect: Rect::from_center(Vec2::new(p.x, p.y), size, size),
                kind: p.pickup_kind(),
                collected: false,
            })
            .collect();

        if let Some(spawn) = stage.boss_spawn() {
            let id = state.next_actor_id();
            let ground = stage.ground_at(spawn.x);
            state
                .enemies
                .push(Actor::boss(id, spawn.variant(), spawn.x, ground, &state.tuning));
            state.boss_id = Some(id);
        }

        if state.is_boss_stage {
            state.intermission = Some(Intermission {
                kind: IntermissionKind::BossIntro,
                elapsed: 0.0,
                duration: state.tuning.intermission.boss_intro,
            });
            state.phase = GamePhase::Intermission;
            state.events.push(GameEvent::IntermissionStarted);
        }

        let focus = state.player.center().x;
        state.camera.x = Camera::target_for(focus, state.stage_width, &state.tuning.world);

        log::info!(
            "Stage {} loaded: width {}, {} platforms, {} enemies, {} pickups{}",
            stage.stage_id,
            stage.width,
            state.platforms.len(),
            state.enemies.len(),
            state.pickups.len(),
            if state.boss_id.is_some() { ", boss" } else { "" }
        );
        state
    }

    /// Build the stage with health, charge and score carried over
    pub fn with_carry(stage: &StageData, tuning: Tuning, seed: u64, carry: PlayerCarry) -> Self {
        let mut state = Self::new(stage, tuning, seed);
        state.player.health = carry.health.clamp(1, state.player.max_health);
        if let Some(role) = state.player.player_role_mut() {
            role.charge = carry.charge.min(role.charge_max);
        }
        state.score = carry.score;
        state
    }

    /// Snapshot of what carries into the next stage
    pub fn carry(&self) -> PlayerCarry {
        PlayerCarry {
            health: self.player.health,
            charge: self.player.player_role().map_or(0, |p| p.charge),
            score: self.score,
        }
    }

    /// Allocate a new actor ID
    pub fn next_actor_id(&mut self) -> ActorId {
        ActorId(self.next_entity_id())
    }

    /// Allocate a new projectile ID
    pub fn next_projectile_id(&mut self) -> ProjectileId {
        ProjectileId(self.next_entity_id())
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a projectile to the live set and announce it
    pub fn spawn_projectile(&mut self, projectile: Projectile) {
        self.events.push(GameEvent::ProjectileFired {
            projectile: projectile.id,
            faction: projectile.faction,
            kind: projectile.kind,
        });
        self.projectiles.push(projectile);
    }

    pub fn enemy(&self, id: ActorId) -> Option<&Actor> {
        self.enemies.iter().find(|e| e.id == id && !e.removed)
    }

    pub fn enemy_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.enemies.iter_mut().find(|e| e.id == id && !e.removed)
    }

    /// The stage boss while it is still in the live set
    pub fn boss(&self) -> Option<&Actor> {
        self.boss_id.and_then(|id| self.enemy(id))
    }

    /// Last known centre of the boss, also on the frame it was removed
    pub fn boss_center(&self) -> Option<Vec2> {
        let id = self.boss_id?;
        self.enemies.iter().find(|e| e.id == id).map(|b| b.center())
    }

    /// Whether this stage's boss has been beaten (killed or fallen out)
    pub fn boss_defeated(&self) -> bool {
        self.boss_id.is_some() && self.boss().is_none_or(|b| b.is_dead())
    }

    /// Area outside which projectiles are dropped: the view plus a margin
    pub fn live_area(&self) -> Rect {
        let margin = self.tuning.shot.bounds_margin;
        let world = &self.tuning.world;
        Rect::new(
            self.camera.x - margin,
            -margin,
            world.view_width + margin * 2.0,
            world.world_height + margin * 2.0,
        )
    }

    pub fn is_block_spent(&self, platform_index: usize) -> bool {
        self.spent_blocks.contains(&platform_index)
    }

    pub fn add_damage_number(&mut self, at: Vec2, amount: i32) {
        self.damage_numbers.push(DamageNumber { at, amount, age: 0.0 });
    }

    pub fn show_feedback(&mut self, feedback: Feedback) {
        self.feedback = Some(FeedbackLabel {
            feedback,
            remaining: self.tuning.rhythm.feedback_duration,
        });
    }

    /// Take every event emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop everything marked for removal, keeping id order
    pub fn compact(&mut self) {
        self.enemies.retain(|e| !e.removed);
        self.projectiles.retain(|p| !p.removed);
        self.pickups.retain(|p| !p.collected);
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
    }

    /// True once the stage is over either way
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::StageComplete | GamePhase::GameOver)
    }

    /// Player is mid-ultimate
    pub fn player_channeling(&self) -> bool {
        self.player.state == ActorState::Channeling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{BossSpawn, StageData};

    #[test]
    fn test_new_stage_spawns_entities() {
        let stage = StageData::demo();
        let state = GameState::new(&stage, Tuning::default(), 1);
        assert_eq!(state.enemies.len(), 4);
        assert_eq!(state.pickups.len(), 3);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.rect().bottom(), 620.0);
        assert!(state.enemies.windows(2).all(|w| w[0].id < w[1].id));
        assert!(state.boss().is_none());
        assert!(!state.boss_defeated());
    }

    #[test]
    fn test_boss_stage_opens_with_intermission() {
        let mut stage = StageData::demo();
        stage.is_boss_stage = true;
        stage.boss = Some(BossSpawn { x: 2000.0, kind: "conductor".to_string() });
        let state = GameState::new(&stage, Tuning::default(), 1);
        assert_eq!(state.phase, GamePhase::Intermission);
        assert!(matches!(
            state.intermission.map(|i| i.kind),
            Some(IntermissionKind::BossIntro)
        ));
        assert!(state.boss().is_some_and(|b| b.is_boss()));
    }

    #[test]
    fn test_carry_over_between_stages() {
        let stage = StageData::demo();
        let carry = PlayerCarry { health: 2, charge: 140, score: 900 };
        let state = GameState::with_carry(&stage, Tuning::default(), 1, carry);
        assert_eq!(state.player.health, 2);
        assert_eq!(state.carry(), PlayerCarry { health: 2, charge: 100, score: 900 });
    }

    #[test]
    fn test_camera_target_clamps_to_stage() {
        let world = WorldTuning::default();
        assert_eq!(Camera::target_for(100.0, 3000.0, &world), 0.0);
        assert_eq!(Camera::target_for(2990.0, 3000.0, &world), 1720.0);
        assert_eq!(Camera::target_for(500.0, 800.0, &world), 0.0);
    }

    #[test]
    fn test_compact_drops_marked_entities() {
        let stage = StageData::demo();
        let mut state = GameState::new(&stage, Tuning::default(), 1);
        let first = state.enemies[0].id;
        state.enemies[0].mark_removed();
        state.pickups[0].collected = true;
        assert!(state.enemy(first).is_none());
        state.compact();
        assert_eq!(state.enemies.len(), 3);
        assert_eq!(state.pickups.len(), 2);
    }
}
