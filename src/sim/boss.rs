//! Boss behavior: follow the player, attack on a phase-scaled cooldown with
//! a pattern drawn from the variant's table

use std::f32::consts::{FRAC_PI_4, TAU};

use glam::Vec2;
use rand::Rng;

use super::actor::{ActorState, BossVariant, Role};
use super::body::Facing;
use super::collision::{self, Solids};
use super::projectile::{self, Faction, Projectile, ProjectileKind};
use super::state::GameState;
use super::timers::TimerId;
use crate::tuning::BossAiTuning;

/// One boss attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// `n` aimed shots stacked vertically
    Volley(u8),
    /// Fan of five aimed shots
    Spread,
    /// Ring of twelve
    Circle,
    /// Three straight shots at different heights in the facing direction
    Wave,
    /// Ring of eight
    Burst,
    /// Six shots from a rotating start angle
    Spiral,
    /// Shots dropping from above the player
    Rain,
    /// Four diagonal shots
    Cross,
}

/// Pattern with its relative draw weight
pub type Weighted = (Pattern, u32);

const SHOOTER: [Weighted; 3] = [(Pattern::Volley(1), 2), (Pattern::Volley(2), 2), (Pattern::Volley(3), 1)];
const CONDUCTOR: [Weighted; 3] = [(Pattern::Spread, 2), (Pattern::Circle, 1), (Pattern::Wave, 2)];
const MAESTRO: [Weighted; 4] = [
    (Pattern::Burst, 2),
    (Pattern::Spiral, 2),
    (Pattern::Rain, 1),
    (Pattern::Cross, 1),
];

/// Patterns the variant may use in `phase`: one in phase 1, two in phase 2, all in phase 3
pub fn patterns_for(variant: BossVariant, phase: u8) -> &'static [Weighted] {
    let table: &'static [Weighted] = match variant {
        BossVariant::Shooter => &SHOOTER,
        BossVariant::Conductor => &CONDUCTOR,
        BossVariant::Maestro => &MAESTRO,
    };
    let unlocked = match phase {
        0 | 1 => 1,
        2 => 2,
        _ => table.len(),
    };
    &table[..unlocked.min(table.len())]
}

/// Pick from `eligible` by weight; `roll` is in `0..total weight`
pub fn choose_pattern(eligible: &[Weighted], mut roll: u32) -> Option<Pattern> {
    for &(pattern, weight) in eligible {
        if roll < weight {
            return Some(pattern);
        }
        roll -= weight;
    }
    None
}

/// Seconds until the next attack in `phase`
pub fn cooldown_for(base: f32, phase: u8, ai: &BossAiTuning) -> f32 {
    let modifier = 1.0 - (phase.max(1) - 1) as f32 * ai.cooldown_step;
    base * modifier.max(0.1)
}

/// Origin and velocity of every shot a pattern fires
pub fn pattern_shots(
    pattern: Pattern,
    origin: Vec2,
    target: Vec2,
    facing: Facing,
    speed: f32,
    spiral_angle: f32,
    ai: &BossAiTuning,
) -> Vec<(Vec2, Vec2)> {
    let aim_angle = {
        let v = projectile::aim(origin, target, 1.0);
        v.y.atan2(v.x)
    };
    match pattern {
        Pattern::Volley(n) => {
            let n = i32::from(n);
            (0..n)
                .map(|i| {
                    let from = origin + Vec2::new(0.0, (i - n / 2) as f32 * ai.volley_spacing);
                    (from, projectile::aim(from, target, speed))
                })
                .collect()
        }
        Pattern::Spread => (-2..=2)
            .map(|i| (origin, projectile::radial(aim_angle + i as f32 * 0.26, speed)))
            .collect(),
        Pattern::Circle => ring(origin, 12, 0.0, speed),
        Pattern::Wave => (-1..=1)
            .map(|i| {
                let from = origin + Vec2::new(0.0, i as f32 * ai.volley_spacing * 2.0);
                (from, Vec2::new(facing.dir() * speed, 0.0))
            })
            .collect(),
        Pattern::Burst => ring(origin, 8, 0.0, speed),
        Pattern::Spiral => ring(origin, 6, spiral_angle, speed),
        Pattern::Rain => (-2..=2)
            .map(|i| {
                let from = Vec2::new(target.x + i as f32 * ai.volley_spacing * 2.0, ai.shot_size);
                (from, Vec2::new(0.0, speed))
            })
            .collect(),
        Pattern::Cross => ring(origin, 4, FRAC_PI_4, speed),
    }
}

fn ring(origin: Vec2, count: u32, start: f32, speed: f32) -> Vec<(Vec2, Vec2)> {
    (0..count)
        .map(|i| (origin, projectile::radial(start + TAU * i as f32 / count as f32, speed)))
        .collect()
}

/// Advance the stage boss one frame
pub fn update(state: &mut GameState, dt: f32) {
    let Some(boss_id) = state.boss_id else {
        return;
    };
    let target = state.player.center();
    let player_alive = state.player.is_active();
    let stage_width = state.stage_width;
    let physics = &state.tuning.physics;
    let ai = &state.tuning.boss_ai;

    let Some(boss) = state.enemies.iter_mut().find(|e| e.id == boss_id && !e.removed) else {
        return;
    };

    boss.body.apply_gravity(physics.gravity, physics.max_fall_speed, dt);
    collision::move_vertical(&mut boss.body, dt, &state.platforms, Solids::GroundOnly);
    if boss.is_dead() {
        boss.body.vel.x = 0.0;
        return;
    }

    let center = boss.center();
    boss.facing = Facing::toward(center.x, target.x);
    let follow = player_alive && (target.x - center.x).abs() > ai.follow_distance;
    let speed = match &boss.role {
        Role::Boss(b) => b.stats.speed,
        _ => 0.0,
    };
    let vx = if follow { boss.facing.dir() * speed } else { 0.0 };
    boss.body.vel.x = vx;
    collision::move_horizontal(&mut boss.body, vx * dt, &state.platforms, Solids::GroundOnly);
    let max_x = (stage_width - boss.body.rect.w).max(0.0);
    boss.body.rect.x = boss.body.rect.x.clamp(0.0, max_x);

    let mut volley = Vec::new();
    let mut shot_damage = 0;
    if player_alive && !boss.timers.is_running(TimerId::AttackCooldown) {
        let facing = boss.facing;
        let origin = boss.center();
        let phase = boss.phase();
        if let Role::Boss(role) = &mut boss.role {
            let eligible = patterns_for(role.variant, role.phase);
            let total: u32 = eligible.iter().map(|(_, w)| w).sum();
            let roll = state.rng.random_range(0..total.max(1));
            let pattern = choose_pattern(eligible, roll).unwrap_or(Pattern::Volley(1));
            volley = pattern_shots(pattern, origin, target, facing, role.stats.shot_speed, role.spiral_angle, ai);
            shot_damage = role.stats.shot_damage;
            if pattern == Pattern::Spiral {
                role.spiral_angle = (role.spiral_angle + 0.35) % TAU;
            }
            let cooldown = cooldown_for(role.stats.attack_cooldown, phase, ai);
            boss.timers.set(TimerId::AttackCooldown, cooldown);
            boss.timers.set(TimerId::AttackHold, ai.attack_hold);
            log::debug!("Boss phase {phase} fires {pattern:?}");
        }
    }

    let next = if boss.timers.is_running(TimerId::AttackHold) {
        ActorState::Attack
    } else if vx != 0.0 {
        ActorState::Run
    } else {
        ActorState::Idle
    };
    boss.settle_state(next);

    let size = Vec2::splat(state.tuning.boss_ai.shot_size);
    let ttl = state.tuning.shot.max_lifetime;
    for (from, vel) in volley {
        let id = state.next_projectile_id();
        let shot = Projectile::new(id, Faction::Boss, ProjectileKind::BossShot, from, size, vel, shot_damage, ttl);
        state.spawn_projectile(shot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::level::{BossSpawn, StageData};
    use crate::tuning::Tuning;

    fn boss_state(kind: &str) -> GameState {
        let mut stage = StageData::demo();
        stage.enemies.clear();
        stage.pickups.clear();
        stage.mystery_blocks.clear();
        stage.platforms.clear();
        stage.is_boss_stage = true;
        stage.boss = Some(BossSpawn { x: 1080.0, kind: kind.to_string() });
        GameState::new(&stage, Tuning::default(), 11)
    }

    #[test]
    fn test_phase_gates_patterns() {
        assert_eq!(patterns_for(BossVariant::Shooter, 1), &[(Pattern::Volley(1), 2)]);
        assert_eq!(patterns_for(BossVariant::Conductor, 2).len(), 2);
        assert_eq!(patterns_for(BossVariant::Maestro, 3).len(), 4);
        assert_eq!(patterns_for(BossVariant::Maestro, 1)[0].0, Pattern::Burst);
    }

    #[test]
    fn test_weighted_choice() {
        let table = patterns_for(BossVariant::Shooter, 3);
        assert_eq!(choose_pattern(table, 0), Some(Pattern::Volley(1)));
        assert_eq!(choose_pattern(table, 1), Some(Pattern::Volley(1)));
        assert_eq!(choose_pattern(table, 2), Some(Pattern::Volley(2)));
        assert_eq!(choose_pattern(table, 4), Some(Pattern::Volley(3)));
        assert_eq!(choose_pattern(table, 5), None);
    }

    #[test]
    fn test_cooldown_shrinks_with_phase() {
        let ai = BossAiTuning::default();
        assert!((cooldown_for(2.0, 1, &ai) - 2.0).abs() < 1e-5);
        assert!((cooldown_for(2.0, 2, &ai) - 1.6).abs() < 1e-5);
        assert!((cooldown_for(2.0, 3, &ai) - 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_volley_is_stacked_and_aimed() {
        let ai = BossAiTuning::default();
        let origin = Vec2::new(1000.0, 500.0);
        let target = Vec2::new(200.0, 500.0);
        let shots = pattern_shots(Pattern::Volley(3), origin, target, Facing::Left, 480.0, 0.0, &ai);
        assert_eq!(shots.len(), 3);
        assert_eq!(shots[0].0.y, 470.0);
        assert_eq!(shots[1].0.y, 500.0);
        assert_eq!(shots[2].0.y, 530.0);
        for (_, vel) in shots {
            assert!(vel.x < 0.0);
            assert!((vel.length() - 480.0).abs() < 1e-2);
        }
    }

    #[test]
    fn test_ring_patterns_have_fixed_counts() {
        let ai = BossAiTuning::default();
        let o = Vec2::ZERO;
        let t = Vec2::X;
        assert_eq!(pattern_shots(Pattern::Circle, o, t, Facing::Right, 1.0, 0.0, &ai).len(), 12);
        assert_eq!(pattern_shots(Pattern::Burst, o, t, Facing::Right, 1.0, 0.0, &ai).len(), 8);
        assert_eq!(pattern_shots(Pattern::Cross, o, t, Facing::Right, 1.0, 0.0, &ai).len(), 4);
        let rain = pattern_shots(Pattern::Rain, o, t, Facing::Right, 300.0, 0.0, &ai);
        assert!(rain.iter().all(|(_, v)| *v == Vec2::new(0.0, 300.0)));
    }

    #[test]
    fn test_boss_follows_and_faces_player() {
        let mut state = boss_state("shooter");
        let start = state.boss().unwrap().center().x;
        for _ in 0..30 {
            update(&mut state, SIM_DT);
        }
        let boss = state.boss().unwrap();
        assert_eq!(boss.facing, Facing::Left);
        assert!(boss.center().x < start);
        assert_eq!(boss.state, ActorState::Run);
    }

    #[test]
    fn test_first_attack_waits_one_cooldown() {
        let mut state = boss_state("shooter");
        let mut fired_at = None;
        for frame in 0..200 {
            update(&mut state, SIM_DT);
            if let Some(boss) = state.enemy_mut(state.boss_id.unwrap()) {
                boss.timers.advance(SIM_DT);
            }
            if fired_at.is_none() && !state.projectiles.is_empty() {
                fired_at = Some(frame);
            }
        }
        let frame = fired_at.unwrap();
        assert!((119..=122).contains(&frame));
        assert_eq!(state.projectiles[0].faction, Faction::Boss);
    }
}
