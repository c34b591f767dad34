//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod actor;
pub mod body;
pub mod boss;
pub mod collision;
pub mod combat;
pub mod events;
pub mod grunt;
pub mod items;
pub mod level;
pub mod player;
pub mod projectile;
pub mod rhythm;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod timers;

pub use actor::{Actor, ActorId, ActorState, BossVariant, GruntKind, Role};
pub use body::{Body, Facing, Rect};
pub use events::{DeathCause, GameEvent};
pub use level::{LevelData, LevelError, Platform, StageData, Surface};
pub use projectile::{Faction, Projectile, ProjectileId, ProjectileKind};
pub use rhythm::{HitTier, Judgement, RhythmSequencer, SessionPhase, UltimateStrike};
pub use snapshot::{RenderSnapshot, build_snapshot};
pub use state::{GamePhase, GameState, PickupKind, PlayerCarry};
pub use tick::{TickInput, tick};
