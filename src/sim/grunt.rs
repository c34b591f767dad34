//! Grunt behavior: patrol, chase with a hysteresis dead-zone, melee pose,
//! hovering flyers and stationary snipers

use glam::Vec2;

use super::actor::{Actor, ActorState, GruntKind, Role};
use super::body::Facing;
use super::collision::{self, Solids};
use super::level::Platform;
use super::projectile::{self, Faction, Projectile, ProjectileKind};
use super::state::GameState;
use super::timers::TimerId;
use crate::tuning::Tuning;

/// A sniper shot requested during the grunt pass, spawned once the pass ends
struct ShotRequest {
    from: Vec2,
    to: Vec2,
    speed: f32,
    damage: i32,
}

/// Advance every live grunt one frame
pub fn update(state: &mut GameState, dt: f32) {
    let target = state.player.is_active().then(|| state.player.center());
    let stage_width = state.stage_width;

    let mut requests = Vec::new();
    for grunt in state.enemies.iter_mut().filter(|e| !e.removed && !e.is_boss()) {
        if let Some(request) = update_one(grunt, target, &state.platforms, stage_width, &state.tuning, dt) {
            requests.push(request);
        }
    }

    for request in requests {
        let id = state.next_projectile_id();
        let size = state.tuning.shot.height;
        let projectile = Projectile::new(
            id,
            Faction::Enemy,
            ProjectileKind::Seeker,
            request.from,
            Vec2::splat(size),
            projectile::aim(request.from, request.to, request.speed),
            request.damage,
            state.tuning.shot.max_lifetime,
        );
        state.spawn_projectile(projectile);
    }
}

fn update_one(
    grunt: &mut Actor,
    target: Option<Vec2>,
    platforms: &[Platform],
    stage_width: f32,
    tuning: &Tuning,
    dt: f32,
) -> Option<ShotRequest> {
    let physics = &tuning.physics;
    let ai = &tuning.grunt_ai;

    // Corpses drop to the ground and wait for the death linger
    if grunt.is_dead() {
        grunt.body.vel.x = 0.0;
        grunt.body.apply_gravity(physics.gravity, physics.max_fall_speed, dt);
        collision::move_vertical(&mut grunt.body, dt, platforms, Solids::GroundOnly);
        return None;
    }

    let Role::Grunt(role) = &mut grunt.role else {
        return None;
    };
    let center = grunt.body.rect.center();
    let in_range = target.filter(|t| (t.x - center.x).abs() <= role.stats.detection_range);
    let distance = in_range.map(|t| (t.x - center.x).abs());

    if role.kind.flies() {
        role.hover_clock += dt;
        grunt.body.rect.y = role.hover_base + (role.hover_clock * ai.hover_frequency).sin() * ai.hover_amplitude;
        grunt.body.vel.y = 0.0;
        grunt.body.grounded = false;
    } else {
        grunt.body.apply_gravity(physics.gravity, physics.max_fall_speed, dt);
        collision::move_vertical(&mut grunt.body, dt, platforms, Solids::GroundOnly);
    }

    let mut request = None;
    let mut vx = 0.0;
    if role.kind == GruntKind::Sniper {
        if let Some(t) = in_range {
            grunt.facing = Facing::toward(center.x, t.x);
            if !grunt.timers.is_running(TimerId::AttackCooldown) {
                grunt.timers.set(TimerId::AttackCooldown, role.stats.shot_cooldown);
                grunt.timers.set(TimerId::AttackHold, ai.ranged_hold);
                request = Some(ShotRequest {
                    from: center,
                    to: t,
                    speed: role.stats.shot_speed,
                    damage: role.stats.damage,
                });
            }
        }
    } else if grunt.body.grounded || role.kind.flies() {
        match (in_range, distance) {
            (Some(t), Some(d)) => {
                // Hysteresis: stop inside the small radius, resume only past the larger one
                if role.chasing && d < ai.dead_zone_stop {
                    role.chasing = false;
                } else if !role.chasing && d > ai.dead_zone_resume {
                    role.chasing = true;
                }
                grunt.facing = Facing::toward(center.x, t.x);
                if role.chasing {
                    vx = grunt.facing.dir() * role.stats.speed;
                }
                if d < ai.melee_range && !grunt.timers.is_running(TimerId::AttackHold) {
                    grunt.timers.set(TimerId::AttackHold, ai.melee_hold);
                }
            }
            _ => {
                role.chasing = false;
                let offset = grunt.body.rect.x - role.spawn_x;
                if offset > ai.patrol_distance {
                    role.patrol_dir = -1.0;
                } else if offset < -ai.patrol_distance {
                    role.patrol_dir = 1.0;
                }
                grunt.facing = if role.patrol_dir < 0.0 { Facing::Left } else { Facing::Right };
                vx = role.patrol_dir * role.stats.speed;
            }
        }
    }

    grunt.body.vel.x = vx;
    let dx = vx * dt;
    if role.kind.flies() {
        grunt.body.rect.x += dx;
    } else if dx != 0.0 && collision::move_horizontal(&mut grunt.body, dx, platforms, Solids::GroundOnly) {
        role.patrol_dir = -role.patrol_dir;
    }
    let max_x = (stage_width - grunt.body.rect.w).max(0.0);
    grunt.body.rect.x = grunt.body.rect.x.clamp(0.0, max_x);

    let next = if grunt.timers.is_running(TimerId::AttackHold) {
        ActorState::Attack
    } else if role.kind.flies() || !grunt.body.grounded {
        ActorState::Airborne
    } else if vx != 0.0 {
        ActorState::Run
    } else {
        ActorState::Idle
    };
    grunt.settle_state(next);
    request
}

/// Push grounded non-boss enemies apart until they keep `min_separation`
///
/// Each push is split evenly between the two actors, so the outcome does
/// not depend on iteration order.
pub fn separate(state: &mut GameState) {
    let min_gap = state.tuning.grunt_ai.min_separation;
    let eligible: Vec<usize> = state
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_active() && !e.is_boss() && e.body.grounded)
        .map(|(i, _)| i)
        .collect();

    let mut shift = vec![0.0f32; state.enemies.len()];
    for (n, &i) in eligible.iter().enumerate() {
        for &j in &eligible[n + 1..] {
            let a = state.enemies[i].rect();
            let b = state.enemies[j].rect();
            let vertical_overlap = a.top() < b.bottom() && b.top() < a.bottom();
            if !vertical_overlap {
                continue;
            }
            // The lower id goes left when the centres coincide
            let (left, right) = if a.center_x() <= b.center_x() { (i, j) } else { (j, i) };
            let (lr, rr) = (state.enemies[left].rect(), state.enemies[right].rect());
            let gap = rr.left() - lr.right();
            if gap < min_gap {
                let half = (min_gap - gap) * 0.5;
                shift[left] -= half;
                shift[right] += half;
            }
        }
    }

    let max_x = state.stage_width;
    for (enemy, dx) in state.enemies.iter_mut().zip(shift) {
        if dx != 0.0 {
            let limit = (max_x - enemy.body.rect.w).max(0.0);
            enemy.body.rect.x = (enemy.body.rect.x + dx).clamp(0.0, limit);
        }
    }
}
