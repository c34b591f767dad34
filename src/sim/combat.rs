//! Combat resolution: projectile hits, stomps, contact damage and pickups
//!
//! Runs once per frame after movement and fall-out checks. Player projectiles
//! are resolved first, then hostile projectiles, then body contact. Within
//! contact the stomp test always comes before contact damage.

use glam::Vec2;

use super::actor::Role;
use super::events::{DeathCause, GameEvent};
use super::items;
use super::projectile::Faction;
use super::state::GameState;

/// Resolve every hit of the frame
pub fn resolve(state: &mut GameState) {
    player_projectiles(state);
    hostile_projectiles(state);
    contact(state);
    items::collect(state);
}

fn player_projectiles(state: &mut GameState) {
    for pi in 0..state.projectiles.len() {
        if !state.projectiles[pi].is_live() || state.projectiles[pi].faction != Faction::Player {
            continue;
        }
        for ei in 0..state.enemies.len() {
            let enemy = &state.enemies[ei];
            let shot = &state.projectiles[pi];
            if !enemy.is_active() || shot.has_hit(enemy.id) || !shot.rect.intersects(&enemy.rect()) {
                continue;
            }
            let (target, damage) = (enemy.id, shot.damage);
            let used_up = state.projectiles[pi].strike(target);
            if damage_enemy(state, ei, damage, DeathCause::Projectile) {
                let per_hit = state.tuning.player.charge_per_hit;
                if let Some(role) = state.player.player_role_mut() {
                    role.add_charge(per_hit);
                }
            }
            if used_up {
                break;
            }
        }
    }
}

fn hostile_projectiles(state: &mut GameState) {
    for pi in 0..state.projectiles.len() {
        let shot = &state.projectiles[pi];
        if !shot.is_live() || !shot.faction.hostile_to_player() || !state.player.is_active() {
            continue;
        }
        if !shot.rect.intersects(&state.player.rect()) {
            continue;
        }
        let damage = shot.damage;
        let player_id = state.player.id;
        state.projectiles[pi].strike(player_id);
        damage_player(state, damage);
    }
}

fn contact(state: &mut GameState) {
    let tolerance = state.tuning.player.stomp_tolerance;
    let bounce = state.tuning.player.stomp_bounce;
    let push = state.tuning.player.contact_push;

    for ei in 0..state.enemies.len() {
        if !state.player.is_active() {
            return;
        }
        let enemy = &state.enemies[ei];
        let player_rect = state.player.rect();
        if !enemy.is_active() || !player_rect.intersects(&enemy.rect()) {
            continue;
        }
        let enemy_rect = enemy.rect();
        let is_boss = enemy.is_boss();
        let damage = enemy.contact_damage();
        let descending = state.player.body.vel.y > 0.0;

        if !is_boss && descending && player_rect.bottom() <= enemy_rect.top() + tolerance {
            let id = enemy.id;
            kill_enemy(state, ei, DeathCause::Stomp);
            state.events.push(GameEvent::Stomped { actor: id });
            state.player.body.vel.y = -bounce;
            state.player.body.rect.y = enemy_rect.top() - player_rect.h;
            state.player.body.grounded = false;
            continue;
        }

        if !is_boss && state.player.has_star_power() {
            kill_enemy(state, ei, DeathCause::Contact);
            continue;
        }

        if damage_player(state, damage) {
            // Knock the player away from the enemy's centre
            let dir = if player_rect.center_x() < enemy_rect.center_x() { -1.0 } else { 1.0 };
            let max_x = (state.stage_width - player_rect.w).max(0.0);
            let x = (state.player.body.rect.x + dir * push).clamp(0.0, max_x);
            state.player.body.rect.x = x;
        }
    }
}

/// Apply damage to the player; returns whether it landed
fn damage_player(state: &mut GameState, amount: i32) -> bool {
    if !state.player.is_vulnerable() || amount <= 0 {
        return false;
    }
    state.player.take_damage(amount, &state.tuning);
    let at = top_center(state.player.rect().center(), state.player.rect().h);
    state.events.push(GameEvent::Damaged {
        actor: state.player.id,
        amount,
        remaining: state.player.health,
        at,
    });
    state.add_damage_number(at, amount);
    log::debug!("Player hit for {amount}, {} left", state.player.health);
    true
}

/// Apply damage to the enemy at `index`; returns whether it landed
fn damage_enemy(state: &mut GameState, index: usize, amount: i32, cause: DeathCause) -> bool {
    let enemy = &mut state.enemies[index];
    if !enemy.is_vulnerable() || amount <= 0 {
        return false;
    }
    let phase_before = enemy.phase();
    let killed = enemy.take_damage(amount, &state.tuning);
    let (id, remaining, phase) = (enemy.id, enemy.health, enemy.phase());
    let at = top_center(enemy.center(), enemy.rect().h);

    state.events.push(GameEvent::Damaged { actor: id, amount, remaining, at });
    state.add_damage_number(at, amount);
    if phase != phase_before {
        state.events.push(GameEvent::BossPhaseChanged { actor: id, phase });
        log::info!("Boss entered phase {phase}");
    }
    if killed {
        on_enemy_killed(state, index, cause);
    }
    true
}

/// Kill the enemy at `index` outright
fn kill_enemy(state: &mut GameState, index: usize, cause: DeathCause) {
    state.enemies[index].die(&state.tuning);
    on_enemy_killed(state, index, cause);
}

fn on_enemy_killed(state: &mut GameState, index: usize, cause: DeathCause) {
    let enemy = &state.enemies[index];
    let (id, score) = (enemy.id, enemy.score_value());
    let variant = match &enemy.role {
        Role::Boss(b) => Some(b.variant),
        _ => None,
    };

    state.score += score;
    state.events.push(GameEvent::Died { actor: id, cause, score });
    if let Some(variant) = variant {
        state.events.push(GameEvent::BossDefeated { actor: id, variant });
        log::info!("Boss {variant:?} defeated");
    }
}

fn top_center(center: Vec2, height: f32) -> Vec2 {
    Vec2::new(center.x, center.y - height * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::{Actor, ActorState, BossVariant, GruntKind};
    use crate::sim::body::Rect;
    use crate::sim::projectile::{Projectile, ProjectileKind};
    use crate::sim::level::StageData;
    use crate::sim::timers::TimerId;
    use crate::tuning::Tuning;

    fn empty_state() -> GameState {
        let mut stage = StageData::demo();
        stage.enemies.clear();
        stage.pickups.clear();
        stage.mystery_blocks.clear();
        stage.platforms.clear();
        GameState::new(&stage, Tuning::default(), 21)
    }

    fn add_grunt(state: &mut GameState, kind: GruntKind, x: f32) -> usize {
        let id = state.next_actor_id();
        let grunt = Actor::grunt(id, kind, x, 620.0, &state.tuning);
        state.enemies.push(grunt);
        state.enemies.len() - 1
    }

    fn player_shot(state: &mut GameState, at: Vec2, damage: i32) {
        let id = state.next_projectile_id();
        let p = Projectile::new(
            id,
            Faction::Player,
            ProjectileKind::Shot,
            at,
            Vec2::new(40.0, 20.0),
            Vec2::new(720.0, 0.0),
            damage,
            6.0,
        );
        state.spawn_projectile(p);
    }

    #[test]
    fn test_enemy_dies_on_second_hit() {
        let mut state = empty_state();
        let i = add_grunt(&mut state, GruntKind::Hater, 900.0);
        let at = state.enemies[i].center();

        player_shot(&mut state, at, 1);
        resolve(&mut state);
        assert!(!state.enemies[i].is_dead());
        assert_eq!(state.enemies[i].health, 1);
        assert!(state.projectiles.iter().all(|p| !p.is_live()));
        assert_eq!(state.player.player_role().unwrap().charge, 15);

        player_shot(&mut state, at, 1);
        resolve(&mut state);
        assert!(state.enemies[i].is_dead());
        assert_eq!(state.score, 100);
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::Died { cause: DeathCause::Projectile, .. })));
    }

    #[test]
    fn test_piercing_shot_hits_each_target_once() {
        let mut state = empty_state();
        let a = add_grunt(&mut state, GruntKind::Rival, 900.0);
        let b = add_grunt(&mut state, GruntKind::Rival, 910.0);
        let at = state.enemies[a].center();
        player_shot(&mut state, at, 1);
        state.projectiles[0].pierce = 1;

        resolve(&mut state);
        resolve(&mut state);
        assert_eq!(state.enemies[a].health, 2);
        assert_eq!(state.enemies[b].health, 2);
        assert!(!state.projectiles[0].is_live());
    }

    #[test]
    fn test_dead_enemies_are_not_hit() {
        let mut state = empty_state();
        let i = add_grunt(&mut state, GruntKind::Hater, 900.0);
        state.enemies[i].die(&Tuning::default());
        let at = state.enemies[i].center();
        player_shot(&mut state, at, 1);
        resolve(&mut state);
        assert!(state.projectiles[0].is_live());
    }

    #[test]
    fn test_hostile_shot_damages_player_once() {
        let mut state = empty_state();
        let id = state.next_projectile_id();
        let center = state.player.center();
        state.spawn_projectile(Projectile::new(
            id,
            Faction::Enemy,
            ProjectileKind::Seeker,
            center,
            Vec2::splat(20.0),
            Vec2::ZERO,
            1,
            6.0,
        ));
        resolve(&mut state);
        assert_eq!(state.player.health, 2);
        assert!(!state.projectiles[0].is_live());
        assert!(state.player.timers.is_running(TimerId::Invincibility));
    }

    #[test]
    fn test_stomp_kills_and_bounces_without_damage() {
        let mut state = empty_state();
        let i = add_grunt(&mut state, GruntKind::Rival, 400.0);
        let enemy = state.enemies[i].rect();
        state.player.body.rect = Rect::from_midbottom(enemy.center_x(), enemy.top() + 10.0, 64.0, 96.0);
        state.player.body.vel.y = 300.0;

        resolve(&mut state);
        assert!(state.enemies[i].is_dead());
        assert_eq!(state.player.health, 3);
        assert_eq!(state.player.body.vel.y, -state.tuning.player.stomp_bounce);
        assert_eq!(state.player.rect().bottom(), enemy.top());
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::Stomped { .. })));
    }

    #[test]
    fn test_side_contact_damages_and_pushes() {
        let mut state = empty_state();
        let i = add_grunt(&mut state, GruntKind::Hater, 400.0);
        let enemy = state.enemies[i].rect();
        state.player.body.rect = Rect::from_midbottom(enemy.left() - 20.0, 620.0, 64.0, 96.0);
        let x = state.player.rect().x;
        resolve(&mut state);
        assert_eq!(state.player.health, 2);
        assert_eq!(state.player.rect().x, x - 5.0);
        assert!(!state.enemies[i].is_dead());

        // Invincibility covers the next frame of contact
        resolve(&mut state);
        assert_eq!(state.player.health, 2);
    }

    #[test]
    fn test_boss_cannot_be_stomped() {
        let mut state = empty_state();
        let id = state.next_actor_id();
        let boss = Actor::boss(id, BossVariant::Shooter, 600.0, 620.0, &state.tuning);
        state.enemies.push(boss);
        let rect = state.enemies[0].rect();
        state.player.body.rect = Rect::from_midbottom(rect.center_x(), rect.top() + 10.0, 64.0, 96.0);
        state.player.body.vel.y = 300.0;
        resolve(&mut state);
        assert!(!state.enemies[0].is_dead());
        assert_eq!(state.player.health, 1);
    }

    #[test]
    fn test_star_power_contact_kills_grunts() {
        let mut state = empty_state();
        let i = add_grunt(&mut state, GruntKind::Rival, 400.0);
        state.player.timers.set(TimerId::StarPower, 5.0);
        let enemy = state.enemies[i].rect();
        state.player.body.rect = Rect::from_midbottom(enemy.left(), 620.0, 64.0, 96.0);
        resolve(&mut state);
        assert_eq!(state.enemies[i].state, ActorState::Dead);
        assert_eq!(state.player.health, 3);
    }

    #[test]
    fn test_boss_phase_change_event() {
        let mut state = empty_state();
        let id = state.next_actor_id();
        let boss = Actor::boss(id, BossVariant::Shooter, 900.0, 620.0, &state.tuning);
        state.enemies.push(boss);
        let at = state.enemies[0].center();
        player_shot(&mut state, at, 8);
        resolve(&mut state);
        assert_eq!(state.enemies[0].phase(), 2);
        assert!(state.events.contains(&GameEvent::BossPhaseChanged { actor: id, phase: 2 }));
    }
}
