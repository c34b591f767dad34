//! Discrete simulation events for audio, UI and rendering collaborators
//!
//! Events are appended during `tick` and drained by the host after each frame.

use glam::Vec2;

use super::actor::{ActorId, BossVariant};
use super::projectile::{Faction, ProjectileId, ProjectileKind};
use super::rhythm::HitTier;
use super::state::PickupKind;

/// Why an actor died
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Projectile,
    Stomp,
    Contact,
    FellOut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Jumped { actor: ActorId },
    Damaged { actor: ActorId, amount: i32, remaining: i32, at: Vec2 },
    Died { actor: ActorId, cause: DeathCause, score: u64 },
    Stomped { actor: ActorId },
    ProjectileFired { projectile: ProjectileId, faction: Faction, kind: ProjectileKind },
    PickupCollected { kind: PickupKind },
    BlockBumped { at: Vec2 },
    StarPowerGained,
    UltimateActivated,
    RhythmHit { lane: usize, tier: HitTier },
    RhythmMiss { lane: usize },
    UltimateResolved { total_damage: i32 },
    BossPhaseChanged { actor: ActorId, phase: u8 },
    BossDefeated { actor: ActorId, variant: BossVariant },
    IntermissionStarted,
    IntermissionEnded,
    Paused,
    Resumed,
    StageCompleted,
    PlayerDied,
}
