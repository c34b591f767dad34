//! Actors: every health-bearing entity (player, grunts, bosses)
//!
//! Role-specific data lives in the `Role` variant; behavior is dispatched on
//! the variant by the player, grunt and boss modules.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, Facing, Rect};
use super::timers::{AnimClock, TimerId, Timers};
use crate::tuning::{BossStats, GruntStats, Tuning};

/// Stable actor handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(pub u32);

/// Discrete behavior state, also the animation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActorState {
    #[default]
    Idle,
    Run,
    /// Jumping, falling or flying
    Airborne,
    Crouch,
    Attack,
    /// Player during the rhythm ultimate
    Channeling,
    Hurt,
    Dead,
}

/// Grunt variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GruntKind {
    /// Walker: patrols and chases
    #[default]
    Hater,
    /// Faster, tougher walker
    Rival,
    /// Hovers around a baseline, ignores gravity
    Flyer,
    /// Stands still and fires seeking shots
    Sniper,
}

impl GruntKind {
    pub fn is_ranged(self) -> bool {
        matches!(self, GruntKind::Sniper)
    }

    pub fn flies(self) -> bool {
        matches!(self, GruntKind::Flyer)
    }
}

/// Boss variants, each with its own attack pattern table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BossVariant {
    #[default]
    Shooter,
    Conductor,
    Maestro,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRole {
    /// Ultimate meter
    pub charge: u32,
    pub charge_max: u32,
    pub crouching: bool,
    pub stand_height: f32,
    /// Never takes damage (debug toggle)
    pub debug_invincible: bool,
}

impl PlayerRole {
    pub fn add_charge(&mut self, amount: u32) {
        self.charge = (self.charge + amount).min(self.charge_max);
    }

    pub fn charge_full(&self) -> bool {
        self.charge >= self.charge_max
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GruntRole {
    pub kind: GruntKind,
    pub stats: GruntStats,
    /// Patrol is anchored here
    pub spawn_x: f32,
    /// -1.0 or 1.0
    pub patrol_dir: f32,
    /// Hysteresis latch: true while outside the dead-zone and closing in
    pub chasing: bool,
    /// Flyers: top of the rect when the hover offset is zero
    pub hover_base: f32,
    /// Flyers: seconds since spawn, drives the hover offset
    pub hover_clock: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BossRole {
    pub variant: BossVariant,
    pub stats: BossStats,
    /// 1..=3, never decreases
    pub phase: u8,
    /// Running angle for the spiral pattern (radians)
    pub spiral_angle: f32,
}

/// Role-specific stat block
#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    Player(PlayerRole),
    Grunt(GruntRole),
    Boss(BossRole),
}

/// A health-bearing simulated entity
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: ActorId,
    pub body: Body,
    pub facing: Facing,
    pub health: i32,
    pub max_health: i32,
    pub state: ActorState,
    pub timers: Timers,
    pub anim: AnimClock,
    pub role: Role,
    /// Marked for compaction at the end of the frame
    pub(crate) removed: bool,
}

impl Actor {
    fn new(id: ActorId, rect: Rect, health: i32, role: Role) -> Self {
        Self {
            id,
            body: Body::new(rect),
            facing: Facing::Right,
            health,
            max_health: health,
            state: ActorState::Idle,
            timers: Timers::default(),
            anim: AnimClock::default(),
            role,
            removed: false,
        }
    }

    /// Player standing with the middle of its feet at `spawn`
    pub fn player(id: ActorId, spawn: Vec2, tuning: &Tuning) -> Self {
        let t = &tuning.player;
        let rect = Rect::from_midbottom(spawn.x, spawn.y, t.width, t.height);
        Self::new(
            id,
            rect,
            t.max_health,
            Role::Player(PlayerRole {
                charge: 0,
                charge_max: t.charge_max,
                crouching: false,
                stand_height: t.height,
                debug_invincible: false,
            }),
        )
    }

    /// Grunt centred on `x` with its feet at `ground_y` (flyers hover above it)
    pub fn grunt(id: ActorId, kind: GruntKind, x: f32, ground_y: f32, tuning: &Tuning) -> Self {
        let stats = tuning.grunt(kind).clone();
        let mut rect = Rect::from_midbottom(x, ground_y, stats.width, stats.height);
        if kind.flies() {
            rect.y -= tuning.grunt_ai.hover_height;
        }
        let health = stats.health;
        let mut actor = Self::new(
            id,
            rect,
            health,
            Role::Grunt(GruntRole {
                kind,
                stats,
                spawn_x: rect.x,
                patrol_dir: 1.0,
                chasing: false,
                hover_base: rect.y,
                hover_clock: 0.0,
            }),
        );
        if kind.flies() {
            actor.state = ActorState::Airborne;
        }
        actor
    }

    /// Boss centred on `x` standing at `ground_y`; the first attack comes one full cooldown in
    pub fn boss(id: ActorId, variant: BossVariant, x: f32, ground_y: f32, tuning: &Tuning) -> Self {
        let stats = tuning.boss(variant).clone();
        let rect = Rect::from_midbottom(x, ground_y, stats.width, stats.height);
        let health = stats.health;
        let cooldown = stats.attack_cooldown;
        let mut actor = Self::new(
            id,
            rect,
            health,
            Role::Boss(BossRole {
                variant,
                stats,
                phase: 1,
                spiral_angle: 0.0,
            }),
        );
        actor.facing = Facing::Left;
        actor.timers.set(TimerId::AttackCooldown, cooldown);
        actor
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.body.rect
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.body.rect.center()
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.state == ActorState::Dead
    }

    /// Alive and not marked for removal: takes part in combat
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.removed && !self.is_dead()
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn is_player(&self) -> bool {
        matches!(self.role, Role::Player(_))
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.role, Role::Boss(_))
    }

    pub fn player_role(&self) -> Option<&PlayerRole> {
        match &self.role {
            Role::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn player_role_mut(&mut self) -> Option<&mut PlayerRole> {
        match &mut self.role {
            Role::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn boss_role(&self) -> Option<&BossRole> {
        match &self.role {
            Role::Boss(b) => Some(b),
            _ => None,
        }
    }

    /// Boss phase (1 for everything that is not a boss)
    pub fn phase(&self) -> u8 {
        self.boss_role().map_or(1, |b| b.phase)
    }

    /// Damage dealt on body contact
    pub fn contact_damage(&self) -> i32 {
        match &self.role {
            Role::Player(_) => 0,
            Role::Grunt(g) => g.stats.damage,
            Role::Boss(b) => b.stats.damage,
        }
    }

    /// Score awarded for the kill
    pub fn score_value(&self) -> u64 {
        match &self.role {
            Role::Player(_) => 0,
            Role::Grunt(g) => g.stats.score,
            Role::Boss(b) => b.stats.score,
        }
    }

    pub fn has_star_power(&self) -> bool {
        self.timers.is_running(TimerId::StarPower)
    }

    /// Whether a hit would currently land
    pub fn is_vulnerable(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        if self.timers.is_running(TimerId::Invincibility) || self.has_star_power() {
            return false;
        }
        !self.player_role().is_some_and(|p| p.debug_invincible)
    }

    /// Apply `amount` damage; returns true if this hit killed the actor
    ///
    /// Ignored while invulnerable or already dead. Health is clamped at zero,
    /// boss phase only ever moves forward, and a fatal hit cancels the hurt
    /// and attack timers in favor of the death linger.
    pub fn take_damage(&mut self, amount: i32, tuning: &Tuning) -> bool {
        if amount <= 0 || !self.is_vulnerable() {
            return false;
        }

        self.health = (self.health - amount).clamp(0, self.max_health);
        self.timers.set(TimerId::HitFlash, tuning.grunt_ai.hit_flash);
        if self.is_player() {
            self.timers.set(TimerId::Invincibility, tuning.player.invincibility);
        }
        self.update_boss_phase(tuning);

        if self.health == 0 {
            self.die(tuning);
            return true;
        }
        if !matches!(self.state, ActorState::Attack | ActorState::Channeling) {
            self.state = ActorState::Hurt;
        }
        false
    }

    /// Restore health up to the maximum; the dead stay dead
    pub fn heal(&mut self, amount: i32) {
        if self.is_dead() || amount <= 0 {
            return;
        }
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Enter the terminal dead state immediately
    pub fn die(&mut self, tuning: &Tuning) {
        if self.is_dead() {
            return;
        }
        self.health = 0;
        self.state = ActorState::Dead;
        self.body.vel.x = 0.0;
        self.timers.clear(TimerId::HitFlash);
        self.timers.clear(TimerId::AttackHold);
        self.timers.clear(TimerId::Invincibility);
        self.timers.clear(TimerId::StarPower);
        if !self.is_player() {
            self.timers.set(TimerId::DeathLinger, tuning.grunt_ai.death_linger);
        }
    }

    /// Drop from the live set at the next compaction
    pub fn mark_removed(&mut self) {
        self.removed = true;
    }

    fn update_boss_phase(&mut self, tuning: &Tuning) {
        let ratio = self.health as f32 / self.max_health.max(1) as f32;
        if let Role::Boss(boss) = &mut self.role {
            let target = phase_for_ratio(ratio, tuning.boss_ai.phase2_ratio, tuning.boss_ai.phase3_ratio);
            boss.phase = boss.phase.max(target);
        }
    }

    /// Replace a movement state by `Hurt` while the hit flash runs
    pub(crate) fn settle_state(&mut self, candidate: ActorState) {
        self.state = match candidate {
            ActorState::Idle | ActorState::Run if self.timers.is_running(TimerId::HitFlash) => ActorState::Hurt,
            other => other,
        };
    }

    /// Step the looping walk/crouch/fly cycle; other states hold frame 0
    pub(crate) fn advance_anim(&mut self, dt: f32, tuning: &Tuning) {
        let frame_time = match (&self.role, self.state) {
            (Role::Player(_), ActorState::Run) => tuning.player.run_frame,
            (Role::Player(_), ActorState::Crouch) => tuning.player.crouch_frame,
            (Role::Grunt(_), ActorState::Run | ActorState::Airborne) => tuning.grunt_ai.run_frame,
            (Role::Boss(_), ActorState::Run) => tuning.boss_ai.run_frame,
            _ => {
                self.anim.reset();
                return;
            }
        };
        self.anim.advance(dt, frame_time, 2);
    }

    /// Animation key for the renderer
    pub fn anim_key(&self) -> &'static str {
        let flying = matches!(&self.role, Role::Grunt(g) if g.kind.flies());
        match self.state {
            ActorState::Idle => "idle",
            ActorState::Run => "run",
            ActorState::Airborne if flying => "fly",
            ActorState::Airborne => "jump",
            ActorState::Crouch => "crouch",
            ActorState::Attack => "attack",
            ActorState::Channeling => "ultimate",
            ActorState::Hurt => "hurt",
            ActorState::Dead => "dead",
        }
    }
}

/// Boss phase for a health ratio: 1 above `phase2`, 2 down to `phase3`, then 3
pub fn phase_for_ratio(ratio: f32, phase2: f32, phase3: f32) -> u8 {
    if ratio <= phase3 {
        3
    } else if ratio <= phase2 {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tuning() -> Tuning {
        Tuning::default()
    }

    #[test]
    fn test_grunt_dies_on_second_hit() {
        let t = tuning();
        let mut hater = Actor::grunt(ActorId(1), GruntKind::Hater, 500.0, 620.0, &t);
        assert_eq!(hater.health, 2);
        assert!(!hater.take_damage(1, &t));
        assert_eq!(hater.health, 1);
        assert!(!hater.is_dead());
        assert!(hater.take_damage(1, &t));
        assert!(hater.is_dead());
        assert!(hater.timers.is_running(TimerId::DeathLinger));
        assert!(!hater.timers.is_running(TimerId::HitFlash));
    }

    #[test]
    fn test_dead_actor_ignores_damage_and_heal() {
        let t = tuning();
        let mut hater = Actor::grunt(ActorId(1), GruntKind::Hater, 500.0, 620.0, &t);
        assert!(hater.take_damage(5, &t));
        assert_eq!(hater.health, 0);
        assert!(!hater.take_damage(1, &t));
        hater.heal(3);
        assert_eq!(hater.health, 0);
        assert!(!hater.is_active());
    }

    #[test]
    fn test_player_invincibility_blocks_second_hit() {
        let t = tuning();
        let mut player = Actor::player(ActorId(0), Vec2::new(100.0, 620.0), &t);
        player.take_damage(1, &t);
        assert_eq!(player.health, 2);
        assert!(player.timers.is_running(TimerId::Invincibility));
        player.take_damage(1, &t);
        assert_eq!(player.health, 2);
    }

    #[test]
    fn test_boss_phases_follow_health_ratio() {
        let t = tuning();
        let mut boss = Actor::boss(ActorId(9), BossVariant::Shooter, 1000.0, 620.0, &t);
        assert_eq!(boss.max_health, 20);
        boss.take_damage(7, &t);
        assert_eq!(boss.health, 13);
        assert_eq!(boss.phase(), 1);
        boss.take_damage(1, &t);
        assert_eq!(boss.health, 12);
        assert_eq!(boss.phase(), 2);
        boss.take_damage(6, &t);
        assert_eq!(boss.health, 6);
        assert_eq!(boss.phase(), 3);

        // A synthetic heal never walks the phase back
        boss.heal(20);
        assert_eq!(boss.health, 20);
        assert_eq!(boss.phase(), 3);
        boss.take_damage(1, &t);
        assert_eq!(boss.phase(), 3);
    }

    #[test]
    fn test_hurt_state_on_non_fatal_hit() {
        let t = tuning();
        let mut rival = Actor::grunt(ActorId(2), GruntKind::Rival, 0.0, 620.0, &t);
        rival.take_damage(1, &t);
        assert_eq!(rival.state, ActorState::Hurt);
        rival.settle_state(ActorState::Run);
        assert_eq!(rival.state, ActorState::Hurt);
        rival.timers.advance(1.0);
        rival.settle_state(ActorState::Run);
        assert_eq!(rival.state, ActorState::Run);
    }

    #[test]
    fn test_flyer_spawns_above_ground() {
        let t = tuning();
        let flyer = Actor::grunt(ActorId(3), GruntKind::Flyer, 0.0, 620.0, &t);
        assert!(flyer.rect().bottom() < 620.0 - t.grunt_ai.hover_height + 1.0);
        assert_eq!(flyer.anim_key(), "fly");
    }

    proptest! {
        #[test]
        fn prop_health_stays_in_bounds(ops in prop::collection::vec((any::<bool>(), 0i32..10), 0..40)) {
            let t = tuning();
            let mut boss = Actor::boss(ActorId(1), BossVariant::Maestro, 0.0, 620.0, &t);
            let mut last_phase = boss.phase();
            for (is_damage, amount) in ops {
                if is_damage {
                    boss.take_damage(amount, &t);
                } else {
                    boss.heal(amount);
                }
                prop_assert!(boss.health >= 0 && boss.health <= boss.max_health);
                prop_assert!(boss.phase() >= last_phase);
                last_phase = boss.phase();
            }
        }
    }
}
