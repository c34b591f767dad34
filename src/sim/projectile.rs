//! Projectiles: straight shots, seeking shots and the ultimate strike
//!
//! A projectile's velocity is fixed at spawn (seeking shots aim once at the
//! target's position). Every projectile is dropped when it leaves the live
//! area, when its lifetime runs out, or on a hit with no pierce left.

use glam::Vec2;

use super::actor::ActorId;
use super::body::Rect;

/// Stable projectile handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectileId(pub u32);

/// Who fired it; projectiles only hit the opposing side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Faction {
    Player,
    Enemy,
    Boss,
}

impl Faction {
    /// Whether this faction's projectiles damage the player
    pub fn hostile_to_player(self) -> bool {
        !matches!(self, Faction::Player)
    }
}

/// Renderer hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    /// Player's regular note shot
    Shot,
    /// Released at the end of the rhythm ultimate
    Ultimate,
    /// Grunt shot aimed at the player
    Seeker,
    /// Boss pattern shot
    BossShot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    pub rect: Rect,
    /// Pixels per second
    pub vel: Vec2,
    pub damage: i32,
    pub faction: Faction,
    pub kind: ProjectileKind,
    /// Extra targets it may pass through
    pub pierce: u32,
    /// Targets already struck (a piercing shot hits each target once)
    pub hit_memory: Vec<ActorId>,
    /// Seconds left before it expires
    pub ttl: f32,
    pub(crate) removed: bool,
}

impl Projectile {
    /// Projectile centred on `center` moving at `vel`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ProjectileId,
        faction: Faction,
        kind: ProjectileKind,
        center: Vec2,
        size: Vec2,
        vel: Vec2,
        damage: i32,
        ttl: f32,
    ) -> Self {
        Self {
            id,
            rect: Rect::from_center(center, size.x, size.y),
            vel,
            damage,
            faction,
            kind,
            pierce: 0,
            hit_memory: Vec::new(),
            ttl,
            removed: false,
        }
    }

    pub fn with_pierce(mut self, pierce: u32) -> Self {
        self.pierce = pierce;
        self
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        !self.removed
    }

    pub fn mark_removed(&mut self) {
        self.removed = true;
    }

    /// Whether `target` was already struck by this projectile
    pub fn has_hit(&self, target: ActorId) -> bool {
        self.hit_memory.contains(&target)
    }

    /// Record a hit on `target`; returns true if the projectile is used up
    pub fn strike(&mut self, target: ActorId) -> bool {
        self.hit_memory.push(target);
        if self.pierce == 0 {
            self.removed = true;
            true
        } else {
            self.pierce -= 1;
            false
        }
    }

    /// Move and age; drops the projectile outside `live_area` or past its lifetime
    pub fn advance(&mut self, dt: f32, live_area: &Rect) {
        if self.removed {
            return;
        }
        self.rect.x += self.vel.x * dt;
        self.rect.y += self.vel.y * dt;
        self.ttl -= dt;
        if self.ttl <= 0.0 || !self.rect.intersects(live_area) {
            self.removed = true;
        }
    }
}

/// Velocity of `speed` pointing from `from` to `to`; straight left if they coincide
pub fn aim(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    let delta = to - from;
    if delta.length_squared() > f32::EPSILON {
        delta.normalize() * speed
    } else {
        Vec2::new(-speed, 0.0)
    }
}

/// Velocity of `speed` at `angle` radians (0 = right, y down)
pub fn radial(angle: f32, speed: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin()) * speed
}
