//! Fixed timestep simulation tick
//!
//! Core frame scheduler. A running full-pause sub-mode (rhythm session or
//! intermission) is the only thing updated while it lasts. Otherwise the
//! frame runs in a fixed order: input, physics and AI, separation,
//! fall-out deaths, combat, camera, timers, completion, player death.

use super::boss;
use super::combat;
use super::events::{DeathCause, GameEvent};
use super::grunt;
use super::items;
use super::player;
use super::rhythm::SessionPhase;
use super::state::{Camera, Feedback, GamePhase, GameState, Intermission, IntermissionKind};
use super::timers::TimerId;
use crate::consts::LANE_COUNT;

/// Input commands for a single tick (deterministic)
///
/// Movement flags and rhythm lanes are held states. `attack`, `ultimate`,
/// `pause` and `toggle_invincible` are edges: true only on the frame the key
/// went down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub crouch: bool,
    pub attack: bool,
    /// Start the rhythm ultimate (needs a full charge meter)
    pub ultimate: bool,
    pub pause: bool,
    /// Debug: player ignores all damage
    pub toggle_invincible: bool,
    /// Rhythm lanes, only read while a session runs
    pub lanes: [bool; LANE_COUNT],
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.is_finished() {
        return;
    }
    state.frame += 1;

    // Full-pause sub-modes
    if state.rhythm.is_active() {
        update_rhythm(state, input, dt);
        return;
    }
    if state.intermission.is_some() {
        update_intermission(state, dt);
        return;
    }

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }
    if state.phase != GamePhase::Playing {
        return;
    }

    if input.toggle_invincible {
        if let Some(role) = state.player.player_role_mut() {
            role.debug_invincible = !role.debug_invincible;
            log::info!("Debug invincibility {}", if role.debug_invincible { "on" } else { "off" });
        }
    }

    // Input
    if input.ultimate && player::activate_ultimate(state) {
        return;
    }
    player::apply_input(state, input);

    // Physics and AI
    player::integrate(state, dt);
    grunt::update(state, dt);
    boss::update(state, dt);
    let live_area = state.live_area();
    for projectile in &mut state.projectiles {
        projectile.advance(dt, &live_area);
    }
    items::update_star_item(state, dt);
    grunt::separate(state);

    check_fall_deaths(state);
    combat::resolve(state);

    let target = Camera::target_for(state.player.center().x, state.stage_width, &state.tuning.world);
    let smoothing = state.tuning.world.camera_smoothing;
    state.camera.ease_toward(target, smoothing);

    advance_timers(state, dt);
    player::select_state(state);

    check_completion(state);
    check_player_death(state);
    state.compact();
}

fn update_rhythm(state: &mut GameState, input: &TickInput, dt: f32) {
    advance_feedback(state, dt);

    let first_new = state.events.len();
    let phase = state
        .rhythm
        .update(dt, input.lanes, &state.tuning.rhythm, &mut state.rng, &mut state.events);

    let latest = state.events[first_new..].iter().rev().find_map(|e| match e {
        GameEvent::RhythmHit { tier, .. } => Some(Feedback::Tier(*tier)),
        GameEvent::RhythmMiss { .. } => Some(Feedback::Miss),
        _ => None,
    });
    if let Some(feedback) = latest {
        state.show_feedback(feedback);
    }

    if phase == Some(SessionPhase::Resolving) {
        if let Some(strike) = state.rhythm.finish(&state.tuning.rhythm) {
            player::release_ultimate(state, strike);
        }
    }
}

fn update_intermission(state: &mut GameState, dt: f32) {
    let Some(intermission) = state.intermission.as_mut() else {
        return;
    };
    intermission.elapsed += dt;
    let (kind, finished) = (intermission.kind, intermission.is_finished());

    if let IntermissionKind::Celebration { focus } = kind {
        let target = Camera::target_for(focus.x, state.stage_width, &state.tuning.world);
        let rate = (dt / state.tuning.intermission.celebration_pan.max(dt)).min(1.0);
        state.camera.ease_toward(target, rate);
    }

    if !finished {
        return;
    }
    state.intermission = None;
    state.events.push(GameEvent::IntermissionEnded);
    match kind {
        IntermissionKind::BossIntro => state.phase = GamePhase::Playing,
        IntermissionKind::Celebration { .. } => {
            state.phase = GamePhase::StageComplete;
            state.events.push(GameEvent::StageCompleted);
            log::info!("Stage {} complete, score {}", state.stage_id, state.score);
        }
    }
}

/// Begin the boss celebration with the camera panning to the boss
fn start_celebration(state: &mut GameState) {
    let focus = state.boss_center().unwrap_or(state.player.center());
    state.intermission = Some(Intermission {
        kind: IntermissionKind::Celebration { focus },
        elapsed: 0.0,
        duration: state.tuning.intermission.celebration,
    });
    state.phase = GamePhase::Intermission;
    state.events.push(GameEvent::IntermissionStarted);
}

fn check_fall_deaths(state: &mut GameState) {
    let limit = state.tuning.world.world_height + state.tuning.world.fall_margin;

    if !state.player.is_dead() && state.player.rect().top() > limit {
        state.player.die(&state.tuning);
        log::info!("Player fell out of the world");
    }

    for enemy in state.enemies.iter_mut().filter(|e| !e.removed) {
        if enemy.rect().top() <= limit {
            continue;
        }
        let was_alive = !enemy.is_dead();
        enemy.die(&state.tuning);
        enemy.mark_removed();
        if was_alive {
            state.events.push(GameEvent::Died {
                actor: enemy.id,
                cause: DeathCause::FellOut,
                score: 0,
            });
            if let Some(b) = enemy.boss_role() {
                state.events.push(GameEvent::BossDefeated {
                    actor: enemy.id,
                    variant: b.variant,
                });
                log::info!("Boss fell out of the world");
            }
        }
    }
}

/// Count down actor timers and cosmetic effects
fn advance_timers(state: &mut GameState, dt: f32) {
    state.player.timers.advance(dt);
    state.player.advance_anim(dt, &state.tuning);

    for enemy in state.enemies.iter_mut().filter(|e| !e.removed) {
        let expired = enemy.timers.advance(dt);
        if expired.contains(&TimerId::DeathLinger) {
            enemy.mark_removed();
        }
        enemy.advance_anim(dt, &state.tuning);
    }

    let life = state.tuning.intermission.damage_number_life;
    let rise = state.tuning.intermission.damage_number_rise;
    for number in &mut state.damage_numbers {
        number.age += dt;
        number.at.y -= rise * dt;
    }
    state.damage_numbers.retain(|n| n.age < life);

    advance_feedback(state, dt);
}

fn advance_feedback(state: &mut GameState, dt: f32) {
    if let Some(label) = state.feedback.as_mut() {
        label.remaining -= dt;
        if label.remaining <= 0.0 {
            state.feedback = None;
        }
    }
}

fn check_completion(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    if state.boss_defeated() {
        start_celebration(state);
        return;
    }
    if state.is_boss_stage {
        return;
    }
    let exit = state.stage_width - state.tuning.world.exit_margin;
    if state.player.is_active() && state.player.rect().right() >= exit {
        state.phase = GamePhase::StageComplete;
        state.events.push(GameEvent::StageCompleted);
        log::info!("Stage {} complete, score {}", state.stage_id, state.score);
    }
}

fn check_player_death(state: &mut GameState) {
    if state.phase == GamePhase::Playing && state.player.is_dead() {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::PlayerDied);
        log::info!("Game over at frame {}, score {}", state.frame, state.score);
    }
}
