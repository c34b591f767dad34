//! Player state machine: movement, crouch, jump, shots and the ultimate

use glam::Vec2;

use super::actor::{ActorState, Role};
use super::body::Facing;
use super::collision::{self, Solids};
use super::events::GameEvent;
use super::items;
use super::level::Surface;
use super::projectile::{Faction, Projectile, ProjectileKind};
use super::rhythm::UltimateStrike;
use super::state::{Feedback, GameState};
use super::tick::TickInput;
use super::timers::TimerId;

/// Turn this frame's input into velocity, crouch, jump and attack intents
pub fn apply_input(state: &mut GameState, input: &TickInput) {
    if state.player.is_dead() {
        return;
    }
    let (run_speed, jump_speed) = (state.tuning.player.speed, state.tuning.player.jump_speed);
    let grounded = state.player.body.grounded;

    let Role::Player(role) = &mut state.player.role else {
        return;
    };
    let was_crouching = role.crouching;
    if input.crouch && grounded {
        role.crouching = true;
        if !was_crouching {
            let half = role.stand_height * 0.5;
            state.player.body.rect.set_height_keep_bottom(half);
        }
    } else if was_crouching {
        try_stand(state);
    }

    let crouching = state.player.player_role().is_some_and(|p| p.crouching);
    let speed = if crouching { run_speed * 0.5 } else { run_speed };
    let mut vx = 0.0;
    if input.left {
        vx = -speed;
        state.player.facing = Facing::Left;
    }
    if input.right {
        vx = speed;
        state.player.facing = Facing::Right;
    }
    state.player.body.vel.x = vx;

    if input.jump && grounded && !crouching {
        state.player.body.vel.y = -jump_speed;
        state.player.body.grounded = false;
        state.events.push(GameEvent::Jumped { actor: state.player.id });
    }

    if input.attack {
        fire_shot(state);
    }
}

/// Stand back up if the full-height box is clear of geometry
fn try_stand(state: &mut GameState) {
    let Some(stand_height) = state.player.player_role().map(|p| p.stand_height) else {
        return;
    };
    let mut standing = state.player.body.rect;
    standing.set_height_keep_bottom(stand_height);
    if collision::fits(&standing, &state.platforms, Solids::All) {
        state.player.body.rect = standing;
        if let Some(role) = state.player.player_role_mut() {
            role.crouching = false;
        }
    }
}

/// Fire a regular shot if the cooldown allows; returns whether one was fired
pub fn fire_shot(state: &mut GameState) -> bool {
    let crouching = state.player.player_role().is_some_and(|p| p.crouching);
    if state.player.is_dead() || crouching || state.player.timers.is_running(TimerId::AttackCooldown) {
        return false;
    }

    let id = state.next_projectile_id();
    let player = &state.player;
    let shot = &state.tuning.shot;
    let dir = player.facing.dir();
    let center = Vec2::new(player.center().x + shot.spawn_offset * dir, player.center().y);
    let projectile = Projectile::new(
        id,
        Faction::Player,
        ProjectileKind::Shot,
        center,
        Vec2::new(shot.width, shot.height),
        Vec2::new(shot.speed * dir, 0.0),
        shot.damage,
        shot.max_lifetime,
    );
    state.spawn_projectile(projectile);

    let t = &state.tuning.player;
    state.player.timers.set(TimerId::AttackCooldown, t.attack_cooldown);
    state.player.timers.set(TimerId::AttackHold, t.attack_hold);
    state.player.state = ActorState::Attack;
    true
}

/// Integrate gravity and resolve the player against every platform
pub fn integrate(state: &mut GameState, dt: f32) {
    let physics = &state.tuning.physics;
    let player = &mut state.player;
    if player.is_dead() {
        return;
    }
    player.body.apply_gravity(physics.gravity, physics.max_fall_speed, dt);

    let dx = player.body.vel.x * dt;
    collision::move_horizontal(&mut player.body, dx, &state.platforms, Solids::All);
    // Stay inside the stage horizontally
    let max_x = (state.stage_width - player.body.rect.w).max(0.0);
    player.body.rect.x = player.body.rect.x.clamp(0.0, max_x);

    let contact = collision::move_vertical(&mut player.body, dt, &state.platforms, Solids::All);

    // Falling while crouched restores full height
    if !player.body.grounded {
        if let Role::Player(role) = &mut player.role {
            if role.crouching {
                role.crouching = false;
                player.body.rect.set_height_keep_bottom(role.stand_height);
            }
        }
    }

    if let Some(index) = contact.bumped {
        let is_block = state.platforms[index].surface == Surface::MysteryBlock;
        if is_block && !state.is_block_spent(index) {
            items::bump_block(state, index);
        }
    }
}

/// Pick the discrete state from physics, crouch and the attack hold
pub fn select_state(state: &mut GameState) {
    let player = &mut state.player;
    if player.is_dead() || player.state == ActorState::Channeling {
        return;
    }
    let crouching = player.player_role().is_some_and(|p| p.crouching);
    let next = if player.timers.is_running(TimerId::AttackHold) {
        ActorState::Attack
    } else if !player.body.grounded {
        ActorState::Airborne
    } else if crouching {
        ActorState::Crouch
    } else if player.body.vel.x != 0.0 {
        ActorState::Run
    } else {
        ActorState::Idle
    };
    player.settle_state(next);
}

/// Try to open a rhythm session; refused while one runs or the meter is not full
pub fn activate_ultimate(state: &mut GameState) -> bool {
    if state.rhythm.is_active() || state.player.is_dead() {
        return false;
    }
    let full = state.player.player_role().is_some_and(|p| p.charge_full());
    if !full {
        return false;
    }
    if !state.rhythm.start(&state.tuning.rhythm) {
        return false;
    }
    if let Some(role) = state.player.player_role_mut() {
        role.charge = 0;
    }
    state.player.body.vel.x = 0.0;
    state.player.state = ActorState::Channeling;
    state.events.push(GameEvent::UltimateActivated);
    log::info!("Ultimate activated");
    true
}

/// Fire the strike a finished rhythm session produced
pub fn release_ultimate(state: &mut GameState, strike: UltimateStrike) {
    let id = state.next_projectile_id();
    let rhythm = &state.tuning.rhythm;
    let shot = &state.tuning.shot;
    let player_t = &state.tuning.player;
    let player = &state.player;

    let dir = player.facing.dir();
    let size = Vec2::new(player_t.width, player_t.height) * rhythm.ultimate_size_factor;
    let projectile = Projectile::new(
        id,
        Faction::Player,
        ProjectileKind::Ultimate,
        player.center(),
        size,
        Vec2::new(shot.speed * rhythm.ultimate_speed_factor * dir, 0.0),
        strike.total_damage,
        shot.max_lifetime,
    )
    .with_pierce(strike.pierce);

    let hold = player_t.ultimate_hold;
    state.spawn_projectile(projectile);
    state.player.state = ActorState::Attack;
    state.player.timers.set(TimerId::AttackHold, hold);
    state.show_feedback(Feedback::Damage(strike.total_damage));
    state.events.push(GameEvent::UltimateResolved {
        total_damage: strike.total_damage,
    });
    log::info!(
        "Ultimate resolved: {} damage ({} hits)",
        strike.total_damage,
        strike
            .results
            .iter()
            .filter(|r| matches!(r, super::rhythm::Judgement::Hit(_)))
            .count()
    );
}
