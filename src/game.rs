//! Host-facing game driver
//!
//! Wraps one stage's `GameState` with the control map. Hosts call `update`
//! once per frame with the names of the keys currently held; `Game` turns
//! them into a `TickInput` (with one-shot actions reduced to press edges),
//! advances the simulation and hands back the frame's events.

use crate::settings::{Action, ControlMap};
use crate::sim::{
    GameEvent, GamePhase, GameState, LevelData, LevelError, RenderSnapshot, StageData, TickInput, build_snapshot, tick,
};
use crate::tuning::Tuning;

pub struct Game {
    state: GameState,
    controls: ControlMap,
    /// Level-triggered input of the previous frame, for edge detection
    prev_held: TickInput,
    level: Option<LevelData>,
}

/// Keep movement held, but fire one-shot actions only on the press frame
fn press_edges(held: &TickInput, prev: &TickInput) -> TickInput {
    TickInput {
        attack: held.attack && !prev.attack,
        ultimate: held.ultimate && !prev.ultimate,
        pause: held.pause && !prev.pause,
        toggle_invincible: held.toggle_invincible && !prev.toggle_invincible,
        ..*held
    }
}

impl Game {
    /// Play a single stage
    pub fn new(stage: &StageData, tuning: Tuning, controls: ControlMap, seed: u64) -> Self {
        log::info!("Starting stage {} '{}' (seed {seed})", stage.stage_id, stage.name);
        Self {
            state: GameState::new(stage, tuning, seed),
            controls,
            prev_held: TickInput::default(),
            level: None,
        }
    }

    /// Play `stage_id` of a level, with later stages reachable through `advance_stage`
    pub fn from_level(
        level: LevelData,
        stage_id: u32,
        tuning: Tuning,
        controls: ControlMap,
        seed: u64,
    ) -> Result<Self, LevelError> {
        let mut game = Self::new(level.stage(stage_id)?, tuning, controls, seed);
        game.level = Some(level);
        Ok(game)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn controls(&self) -> &ControlMap {
        &self.controls
    }

    /// Rebind one action; takes effect on the next update
    pub fn remap<S: AsRef<str>>(&mut self, action: Action, keys: &[S]) {
        self.controls.remap(action, keys);
    }

    pub fn set_controls(&mut self, controls: ControlMap) {
        self.controls = controls;
    }

    /// Advance one frame from the host's held keys
    pub fn update<S: AsRef<str>>(&mut self, held_keys: &[S], dt: f32) -> Vec<GameEvent> {
        let held = self.controls.resolve(held_keys);
        let input = press_edges(&held, &self.prev_held);
        self.prev_held = held;
        self.update_with_input(&input, dt)
    }

    /// Advance one frame from an already edge-reduced input
    pub fn update_with_input(&mut self, input: &TickInput, dt: f32) -> Vec<GameEvent> {
        tick(&mut self.state, input, dt);
        self.state.drain_events()
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        build_snapshot(&self.state)
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Stars earned so far, when playing a level with reward thresholds
    pub fn stars(&self) -> Option<u8> {
        self.level.as_ref().map(|l| l.stars_for_score(self.state.score))
    }

    /// Move to the next stage of the level once this one is complete
    ///
    /// Health, charge and score carry over. Returns false when the stage is
    /// still running, was lost, or was the last one.
    pub fn advance_stage(&mut self) -> bool {
        if self.state.phase != GamePhase::StageComplete {
            return false;
        }
        let Some(next) = self.level.as_ref().and_then(|l| l.next_stage(self.state.stage_id)) else {
            log::info!("Level finished with score {}", self.state.score);
            return false;
        };

        let carry = self.state.carry();
        let seed = self.state.seed.wrapping_add(u64::from(next.stage_id));
        log::info!("Advancing to stage {} '{}'", next.stage_id, next.name);
        self.state = GameState::with_carry(next, self.state.tuning.clone(), seed, carry);
        self.prev_held = TickInput::default();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::{Faction, PlayerCarry};

    fn demo_game() -> Game {
        Game::new(&StageData::demo(), Tuning::default(), ControlMap::default(), 7)
    }

    fn two_stage_level() -> LevelData {
        let first = StageData::demo();
        let mut second = StageData::demo();
        second.stage_id = 2;
        second.name = "Club Night".to_string();
        LevelData {
            id: 1,
            name: "Tour".to_string(),
            stages: vec![first, second],
            rewards: Default::default(),
        }
    }

    fn player_shots(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::ProjectileFired { faction: Faction::Player, .. }))
            .count()
    }

    #[test]
    fn test_held_attack_fires_once() {
        let mut game = demo_game();
        let mut shots = 0;
        for _ in 0..60 {
            shots += player_shots(&game.update(&["j"], SIM_DT));
        }
        assert_eq!(shots, 1);

        // Release, then press again after the cooldown
        game.update::<&str>(&[], SIM_DT);
        shots += player_shots(&game.update(&["j"], SIM_DT));
        assert_eq!(shots, 2);
    }

    #[test]
    fn test_held_pause_toggles_once() {
        let mut game = demo_game();
        for _ in 0..10 {
            game.update(&["escape"], SIM_DT);
        }
        assert_eq!(game.phase(), GamePhase::Paused);

        game.update::<&str>(&[], SIM_DT);
        let events = game.update(&["escape"], SIM_DT);
        assert!(events.contains(&GameEvent::Resumed));
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_movement_is_held() {
        let mut game = demo_game();
        let start = game.state().player.body.rect.x;
        for _ in 0..30 {
            game.update(&["right"], SIM_DT);
        }
        assert!(game.state().player.body.rect.x > start + 50.0);
    }

    #[test]
    fn test_remap_takes_effect() {
        let mut game = demo_game();
        game.remap(Action::Right, &["l"]);
        let start = game.state().player.body.rect.x;
        for _ in 0..10 {
            game.update(&["right"], SIM_DT);
        }
        assert_eq!(game.state().player.body.rect.x, start);

        for _ in 0..10 {
            game.update(&["L"], SIM_DT);
        }
        assert!(game.state().player.body.rect.x > start);
    }

    #[test]
    fn test_advance_stage_carries_progress() {
        let mut game = Game::from_level(two_stage_level(), 1, Tuning::default(), ControlMap::default(), 3).unwrap();
        assert!(!game.advance_stage());

        game.state.score = 450;
        game.state.player.health = 2;
        game.state.phase = GamePhase::StageComplete;
        assert!(game.advance_stage());
        assert_eq!(game.state().stage_id, 2);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(
            game.state().carry(),
            PlayerCarry { health: 2, charge: 0, score: 450 }
        );

        // Last stage
        game.state.phase = GamePhase::StageComplete;
        assert!(!game.advance_stage());
    }

    #[test]
    fn test_unknown_stage_is_error() {
        let result = Game::from_level(two_stage_level(), 9, Tuning::default(), ControlMap::default(), 3);
        assert!(matches!(result, Err(LevelError::StageNotFound(9))));
    }

    #[test]
    fn test_stars_need_a_level() {
        let mut level = two_stage_level();
        level.rewards.stars_thresholds = vec![100, 500, 1000];
        let mut game = Game::from_level(level, 1, Tuning::default(), ControlMap::default(), 3).unwrap();
        game.state.score = 600;
        assert_eq!(game.stars(), Some(2));
        assert_eq!(demo_game().stars(), None);
    }
}
