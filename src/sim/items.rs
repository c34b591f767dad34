//! Pickups, mystery blocks and the star item

use glam::Vec2;

use super::body::{Body, Rect};
use super::collision::{self, Solids};
use super::events::GameEvent;
use super::state::{GameState, PickupKind, StarItem};
use super::timers::TimerId;

/// Spend a mystery block and release its star on top of it
pub fn bump_block(state: &mut GameState, platform_index: usize) {
    let Some(block) = state.platforms.get(platform_index).map(|p| p.rect) else {
        return;
    };
    state.spent_blocks.push(platform_index);

    let star = &state.tuning.star;
    let mut body = Body::new(Rect::from_midbottom(block.center_x(), block.top(), star.size, star.size));
    body.vel = Vec2::new(star.slide_speed, -star.pop_speed);
    state.star_item = Some(StarItem {
        body,
        ttl: star.max_lifetime,
    });
    state.events.push(GameEvent::BlockBumped {
        at: Vec2::new(block.center_x(), block.top()),
    });
    log::debug!("Mystery block {platform_index} bumped");
}

/// Slide and bounce the star; it bounces off anything it lands on
pub fn update_star_item(state: &mut GameState, dt: f32) {
    let Some(item) = state.star_item.as_mut() else {
        return;
    };
    let physics = &state.tuning.physics;
    let star = &state.tuning.star;

    item.body.apply_gravity(
        physics.gravity * star.gravity_scale,
        physics.max_fall_speed * star.gravity_scale,
        dt,
    );
    let dx = item.body.vel.x * dt;
    if collision::move_horizontal(&mut item.body, dx, &state.platforms, Solids::All) {
        item.body.vel.x = -item.body.vel.x;
    }
    if collision::move_vertical(&mut item.body, dt, &state.platforms, Solids::All).grounded() {
        item.body.vel.y = -star.bounce_speed;
    }

    item.ttl -= dt;
    let fell_out = item.body.rect.top() > state.tuning.world.world_height + state.tuning.world.fall_margin;
    if item.ttl <= 0.0 || fell_out {
        state.star_item = None;
    }
}

/// Apply a pickup's one-shot effect to the player and score
pub fn apply_pickup(state: &mut GameState, kind: PickupKind) {
    let t = &state.tuning.pickups;
    match kind {
        PickupKind::Note => state.score += t.note_score,
        PickupKind::Ampli => state.score += t.ampli_score,
        PickupKind::Mediator => {
            let charge = t.mediator_charge;
            if let Some(role) = state.player.player_role_mut() {
                role.add_charge(charge);
            }
        }
        PickupKind::Health => {
            let heal = t.heal;
            state.player.heal(heal);
        }
    }
    state.events.push(GameEvent::PickupCollected { kind });
}

/// Consume every pickup (and the star) the player overlaps
pub fn collect(state: &mut GameState) {
    if !state.player.is_active() {
        return;
    }
    let player_rect = state.player.rect();

    let mut collected = Vec::new();
    for pickup in state.pickups.iter_mut().filter(|p| !p.collected) {
        if player_rect.intersects(&pickup.rect) {
            pickup.collected = true;
            collected.push(pickup.kind);
        }
    }
    for kind in collected {
        apply_pickup(state, kind);
    }

    let touched_star = state
        .star_item
        .as_ref()
        .is_some_and(|item| player_rect.intersects(&item.body.rect));
    if touched_star {
        state.star_item = None;
        let duration = state.tuning.star.duration;
        state.player.timers.set(TimerId::StarPower, duration);
        state.events.push(GameEvent::StarPowerGained);
        log::info!("Star power for {duration:.1}s");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::level::{Surface, StageData};
    use crate::sim::state::Pickup;
    use crate::tuning::Tuning;

    fn state() -> GameState {
        let mut stage = StageData::demo();
        stage.enemies.clear();
        stage.pickups.clear();
        GameState::new(&stage, Tuning::default(), 9)
    }

    #[test]
    fn test_pickup_effects() {
        let mut state = state();
        state.player.health = 1;
        for kind in [PickupKind::Note, PickupKind::Ampli, PickupKind::Mediator, PickupKind::Health] {
            apply_pickup(&mut state, kind);
        }
        assert_eq!(state.score, 150);
        assert_eq!(state.player.player_role().unwrap().charge, 25);
        assert_eq!(state.player.health, 2);

        state.player.health = 3;
        apply_pickup(&mut state, PickupKind::Health);
        assert_eq!(state.player.health, 3);
    }

    #[test]
    fn test_collect_consumes_once() {
        let mut state = state();
        let center = state.player.center();
        state.pickups.push(Pickup {
            rect: Rect::from_center(center, 32.0, 32.0),
            kind: PickupKind::Note,
            collected: false,
        });
        collect(&mut state);
        collect(&mut state);
        assert_eq!(state.score, 50);
        state.compact();
        assert!(state.pickups.is_empty());
    }

    #[test]
    fn test_block_releases_one_star_and_grants_star_power() {
        let mut state = state();
        let index = state
            .platforms
            .iter()
            .position(|p| p.surface == Surface::MysteryBlock)
            .unwrap();
        bump_block(&mut state, index);
        assert!(state.is_block_spent(index));
        assert!(state.star_item.is_some());

        for _ in 0..10 {
            update_star_item(&mut state, SIM_DT);
        }
        assert!(state.star_item.is_some());

        let star_center = state.star_item.as_ref().unwrap().body.center();
        state.player.body.rect = Rect::from_center(star_center, 64.0, 96.0);
        collect(&mut state);
        assert!(state.star_item.is_none());
        assert!(state.player.has_star_power());
        assert!(!state.player.is_vulnerable());
    }

    #[test]
    fn test_star_bounces_off_ground() {
        let mut state = state();
        let mut body = Body::new(Rect::new(100.0, 560.0, 40.0, 40.0));
        body.vel = Vec2::new(180.0, 600.0);
        state.star_item = Some(StarItem { body, ttl: 10.0 });
        update_star_item(&mut state, SIM_DT);
        let item = state.star_item.as_ref().unwrap();
        assert_eq!(item.body.rect.bottom(), 620.0);
        assert_eq!(item.body.vel.y, -state.tuning.star.bounce_speed);
    }
}
