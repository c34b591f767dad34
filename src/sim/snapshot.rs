//! Read-only view of a frame for renderers and HUDs
//!
//! Built from `GameState` after a tick; holds plain copies so the host can
//! keep it across the next tick.

use serde::Serialize;

use super::actor::{Actor, BossVariant, GruntKind, Role};
use super::body::{Facing, Rect};
use super::level::Surface;
use super::projectile::{Faction, ProjectileKind};
use super::rhythm::RhythmTarget;
use super::state::{DamageNumber, FeedbackLabel, GamePhase, GameState, IntermissionKind, PickupKind};
use super::timers::TimerId;
use crate::consts::LANE_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTag {
    Player,
    Grunt(GruntKind),
    Boss(BossVariant),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActorView {
    pub id: u32,
    pub role: RoleTag,
    pub rect: Rect,
    pub facing: Facing,
    pub anim: &'static str,
    pub frame: u32,
    /// Hit flash or invincibility blink
    pub flashing: bool,
    pub health_ratio: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileView {
    pub rect: Rect,
    pub faction: Faction,
    pub kind: ProjectileKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformView {
    pub rect: Rect,
    pub surface: Surface,
    /// Mystery block already used
    pub spent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupView {
    pub rect: Rect,
    pub kind: PickupKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BossBar {
    pub health: i32,
    pub max_health: i32,
    pub phase: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hud {
    pub health: i32,
    pub max_health: i32,
    pub charge: u32,
    pub charge_max: u32,
    pub score: u64,
    /// Seconds of star power left
    pub star_power: f32,
    pub debug_invincible: bool,
    pub boss: Option<BossBar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RhythmView {
    pub lanes: usize,
    pub targets: Vec<RhythmTarget>,
    pub held: [bool; LANE_COUNT],
    pub track_top: f32,
    pub hit_line: f32,
    /// Best, good and ok half-widths
    pub windows: [f32; 3],
    pub spawned: u32,
    pub quota: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntermissionView {
    pub kind: IntermissionKind,
    pub progress: f32,
    /// Camera zoom the renderer should apply
    pub zoom: f32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub frame: u64,
    pub phase: GamePhase,
    pub camera_x: f32,
    /// Player first, then enemies by id
    pub actors: Vec<ActorView>,
    pub projectiles: Vec<ProjectileView>,
    pub platforms: Vec<PlatformView>,
    pub pickups: Vec<PickupView>,
    pub star_item: Option<Rect>,
    pub hud: Hud,
    pub rhythm: Option<RhythmView>,
    pub feedback: Option<FeedbackLabel>,
    pub damage_numbers: Vec<DamageNumber>,
    pub intermission: Option<IntermissionView>,
}

fn actor_view(actor: &Actor) -> ActorView {
    let role = match &actor.role {
        Role::Player(_) => RoleTag::Player,
        Role::Grunt(g) => RoleTag::Grunt(g.kind),
        Role::Boss(b) => RoleTag::Boss(b.variant),
    };
    ActorView {
        id: actor.id.0,
        role,
        rect: actor.rect(),
        facing: actor.facing,
        anim: actor.anim_key(),
        frame: actor.anim.frame,
        flashing: actor.timers.is_running(TimerId::HitFlash) || actor.timers.is_running(TimerId::Invincibility),
        health_ratio: actor.health as f32 / actor.max_health.max(1) as f32,
    }
}

/// Build the render view of `state`
pub fn build_snapshot(state: &GameState) -> RenderSnapshot {
    let mut actors = Vec::with_capacity(1 + state.enemies.len());
    actors.push(actor_view(&state.player));
    actors.extend(state.enemies.iter().filter(|e| !e.is_removed()).map(actor_view));

    let projectiles = state
        .projectiles
        .iter()
        .filter(|p| p.is_live())
        .map(|p| ProjectileView {
            rect: p.rect,
            faction: p.faction,
            kind: p.kind,
        })
        .collect();

    let platforms = state
        .platforms
        .iter()
        .enumerate()
        .map(|(i, p)| PlatformView {
            rect: p.rect,
            surface: p.surface,
            spent: state.is_block_spent(i),
        })
        .collect();

    let pickups = state
        .pickups
        .iter()
        .filter(|p| !p.is_collected())
        .map(|p| PickupView { rect: p.rect, kind: p.kind })
        .collect();

    let role = state.player.player_role();
    let hud = Hud {
        health: state.player.health,
        max_health: state.player.max_health,
        charge: role.map_or(0, |r| r.charge),
        charge_max: role.map_or(0, |r| r.charge_max),
        score: state.score,
        star_power: state.player.timers.get(TimerId::StarPower),
        debug_invincible: role.is_some_and(|r| r.debug_invincible),
        boss: state.boss().filter(|b| !b.is_dead()).map(|b| BossBar {
            health: b.health,
            max_health: b.max_health,
            phase: b.phase(),
        }),
    };

    let t = &state.tuning.rhythm;
    let rhythm = state.rhythm.session().map(|s| RhythmView {
        lanes: LANE_COUNT,
        targets: s.targets().to_vec(),
        held: s.held(),
        track_top: t.track_top,
        hit_line: t.hit_line,
        windows: [t.best_window, t.good_window, t.ok_window],
        spawned: s.spawned(),
        quota: t.note_count,
    });

    let zoom = state.tuning.intermission.celebration_zoom;
    let intermission = state.intermission.map(|i| IntermissionView {
        kind: i.kind,
        progress: i.progress(),
        zoom: match i.kind {
            IntermissionKind::Celebration { .. } => 1.0 + (zoom - 1.0) * i.progress(),
            IntermissionKind::BossIntro => 1.0,
        },
    });

    RenderSnapshot {
        frame: state.frame,
        phase: state.phase,
        camera_x: state.camera.x,
        actors,
        projectiles,
        platforms,
        pickups,
        star_item: state.star_item.as_ref().map(|s| s.body.rect),
        hud,
        rhythm,
        feedback: state.feedback,
        damage_numbers: state.damage_numbers.clone(),
        intermission,
    }
}
