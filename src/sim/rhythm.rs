//! Rhythm sequencer for the ultimate attack
//!
//! While a session runs the rest of the simulation is frozen. Targets spawn
//! into random lanes at a fixed cadence and fall toward the hit line; a lane
//! press judges the nearest target in that lane against nested tolerance
//! windows. Once every target has spawned and been hit or missed the session
//! resolves into a single strike carrying the accumulated damage.
//!
//! Lifecycle: inactive (no session) → `Active` → `Resolving` → inactive.

use rand::Rng;

use super::events::GameEvent;
use crate::consts::LANE_COUNT;
use crate::tuning::RhythmTuning;

/// Timing grade of a successful press, tightest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HitTier {
    Best,
    Good,
    Ok,
}

impl HitTier {
    /// Bonus damage added to the strike
    pub fn bonus(self, tuning: &RhythmTuning) -> i32 {
        match self {
            HitTier::Best => tuning.best_bonus,
            HitTier::Good => tuning.good_bonus,
            HitTier::Ok => tuning.ok_bonus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HitTier::Best => "PERFECT!",
            HitTier::Good => "GOOD!",
            HitTier::Ok => "OK",
        }
    }
}

/// Grade a press `distance` pixels from the hit line; window edges are inclusive
pub fn judge(distance: f32, tuning: &RhythmTuning) -> Option<HitTier> {
    let distance = distance.abs();
    if distance <= tuning.best_window {
        Some(HitTier::Best)
    } else if distance <= tuning.good_window {
        Some(HitTier::Good)
    } else if distance <= tuning.ok_window {
        Some(HitTier::Ok)
    } else {
        None
    }
}

/// Outcome recorded for each target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgement {
    Hit(HitTier),
    Miss,
}

/// A falling note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RhythmTarget {
    pub lane: usize,
    /// Track position; reaches the hit line at `RhythmTuning::hit_line`
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Spawning and judging
    Active,
    /// Quota spawned and every target resolved; waiting to release the strike
    Resolving,
}

/// The single high-damage strike a finished session produces
#[derive(Debug, Clone, PartialEq)]
pub struct UltimateStrike {
    pub total_damage: i32,
    pub pierce: u32,
    pub results: Vec<Judgement>,
}

/// State of one ultimate attempt
#[derive(Debug, Clone, PartialEq)]
pub struct RhythmSession {
    phase: SessionPhase,
    spawned: u32,
    quota: u32,
    targets: Vec<RhythmTarget>,
    total_damage: i32,
    held: [bool; LANE_COUNT],
    results: Vec<Judgement>,
    spawn_timer: f32,
}

impl RhythmSession {
    fn new(tuning: &RhythmTuning) -> Self {
        Self {
            phase: SessionPhase::Active,
            spawned: 0,
            quota: tuning.note_count,
            targets: Vec::new(),
            total_damage: tuning.base_damage,
            held: [false; LANE_COUNT],
            results: Vec::new(),
            spawn_timer: 0.0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    pub fn targets(&self) -> &[RhythmTarget] {
        &self.targets
    }

    pub fn total_damage(&self) -> i32 {
        self.total_damage
    }

    pub fn results(&self) -> &[Judgement] {
        &self.results
    }

    pub fn held(&self) -> [bool; LANE_COUNT] {
        self.held
    }

    /// Judge a press in `lane` against the nearest target there
    ///
    /// A press with no target inside the widest window changes nothing.
    pub fn press(&mut self, lane: usize, tuning: &RhythmTuning) -> Option<HitTier> {
        if self.phase != SessionPhase::Active || lane >= LANE_COUNT {
            return None;
        }
        let (index, distance) = self
            .targets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.lane == lane)
            .map(|(i, t)| (i, (t.y - tuning.hit_line).abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        let tier = judge(distance, tuning)?;
        self.targets.remove(index);
        self.total_damage += tier.bonus(tuning);
        self.results.push(Judgement::Hit(tier));
        Some(tier)
    }

    /// Advance one frame: lane presses first, then spawning, falling and misses
    fn update(
        &mut self,
        dt: f32,
        lanes: [bool; LANE_COUNT],
        tuning: &RhythmTuning,
        rng: &mut impl Rng,
        events: &mut Vec<GameEvent>,
    ) {
        if self.phase != SessionPhase::Active {
            return;
        }

        for (lane, &down) in lanes.iter().enumerate() {
            if down && !self.held[lane] {
                if let Some(tier) = self.press(lane, tuning) {
                    log::debug!("Rhythm lane {lane}: {}", tier.label());
                    events.push(GameEvent::RhythmHit { lane, tier });
                }
            }
        }
        self.held = lanes;

        self.spawn_timer += dt;
        if self.spawn_timer >= tuning.spawn_interval && self.spawned < self.quota {
            self.spawn_timer = 0.0;
            let lane = rng.random_range(0..LANE_COUNT);
            self.targets.push(RhythmTarget { lane, y: tuning.track_top });
            self.spawned += 1;
        }

        let miss_line = tuning.hit_line + tuning.miss_distance();
        let results = &mut self.results;
        self.targets.retain_mut(|target| {
            target.y += tuning.fall_speed * dt;
            if target.y > miss_line {
                results.push(Judgement::Miss);
                events.push(GameEvent::RhythmMiss { lane: target.lane });
                false
            } else {
                true
            }
        });

        if self.spawned >= self.quota && self.targets.is_empty() {
            self.phase = SessionPhase::Resolving;
        }
    }
}

/// Owner of the (at most one) rhythm session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RhythmSequencer {
    session: Option<RhythmSession>,
}

impl RhythmSequencer {
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&RhythmSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut RhythmSession> {
        self.session.as_mut()
    }

    /// Begin a session; refused (and the running one untouched) if one exists
    pub fn start(&mut self, tuning: &RhythmTuning) -> bool {
        if self.session.is_some() {
            return false;
        }
        self.session = Some(RhythmSession::new(tuning));
        true
    }

    /// Advance the running session by one frame and report its phase
    pub fn update(
        &mut self,
        dt: f32,
        lanes: [bool; LANE_COUNT],
        tuning: &RhythmTuning,
        rng: &mut impl Rng,
        events: &mut Vec<GameEvent>,
    ) -> Option<SessionPhase> {
        let session = self.session.as_mut()?;
        session.update(dt, lanes, tuning, rng, events);
        Some(session.phase)
    }

    /// Consume a resolving session into its strike
    pub fn finish(&mut self, tuning: &RhythmTuning) -> Option<UltimateStrike> {
        if self.session.as_ref()?.phase != SessionPhase::Resolving {
            return None;
        }
        let session = self.session.take()?;
        Some(UltimateStrike {
            total_damage: session.total_damage,
            pierce: tuning.ultimate_pierce,
            results: session.results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn tuning() -> RhythmTuning {
        RhythmTuning::default()
    }

    fn session_with_target(lane: usize, y: f32) -> RhythmSession {
        let mut s = RhythmSession::new(&tuning());
        s.targets.push(RhythmTarget { lane, y });
        s
    }

    #[test]
    fn test_judge_boundaries_are_inclusive() {
        let t = tuning();
        assert_eq!(judge(0.0, &t), Some(HitTier::Best));
        assert_eq!(judge(15.0, &t), Some(HitTier::Best));
        assert_eq!(judge(15.5, &t), Some(HitTier::Good));
        assert_eq!(judge(-35.0, &t), Some(HitTier::Good));
        assert_eq!(judge(35.1, &t), Some(HitTier::Ok));
        assert_eq!(judge(55.0, &t), Some(HitTier::Ok));
        assert_eq!(judge(55.1, &t), None);
    }

    #[test]
    fn test_press_on_hit_line_is_best() {
        let t = tuning();
        let mut s = session_with_target(1, t.hit_line);
        assert_eq!(s.press(1, &t), Some(HitTier::Best));
        assert_eq!(s.total_damage(), t.base_damage + t.best_bonus);
        assert!(s.targets().is_empty());
        assert_eq!(s.results(), &[Judgement::Hit(HitTier::Best)]);
    }

    #[test]
    fn test_press_at_good_boundary_is_good() {
        let t = tuning();
        let mut s = session_with_target(0, t.hit_line - t.good_window);
        assert_eq!(s.press(0, &t), Some(HitTier::Good));
        assert_eq!(s.total_damage(), t.base_damage + t.good_bonus);
    }

    #[test]
    fn test_press_without_target_is_noop() {
        let t = tuning();
        let mut s = session_with_target(2, t.hit_line);
        let before = s.clone();
        assert_eq!(s.press(0, &t), None);
        assert_eq!(s, before);

        // Target in the lane but outside every window
        let mut s = session_with_target(0, t.track_top);
        let before = s.clone();
        assert_eq!(s.press(0, &t), None);
        assert_eq!(s, before);
    }

    #[test]
    fn test_press_picks_nearest_target() {
        let t = tuning();
        let mut s = session_with_target(1, t.hit_line - 50.0);
        s.targets.push(RhythmTarget { lane: 1, y: t.hit_line + 5.0 });
        assert_eq!(s.press(1, &t), Some(HitTier::Best));
        assert_eq!(s.targets().len(), 1);
        assert_eq!(s.targets()[0].y, t.hit_line - 50.0);
    }

    #[test]
    fn test_start_is_idempotent_while_active() {
        let t = tuning();
        let mut seq = RhythmSequencer::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut events = Vec::new();
        assert!(seq.start(&t));
        for _ in 0..60 {
            seq.update(SIM_DT, [false; LANE_COUNT], &t, &mut rng, &mut events);
        }
        let snapshot = seq.session().cloned();
        assert_eq!(snapshot.as_ref().map(|s| s.spawned()), Some(1));
        assert!(!seq.start(&t));
        assert_eq!(seq.session().cloned(), snapshot);
    }

    #[test]
    fn test_held_lane_only_presses_once() {
        let t = tuning();
        let mut seq = RhythmSequencer::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        seq.start(&t);
        let session = seq.session_mut().unwrap();
        session.targets.push(RhythmTarget { lane: 0, y: t.hit_line });
        session.targets.push(RhythmTarget { lane: 0, y: t.hit_line + 10.0 });

        seq.update(SIM_DT, [true, false, false], &t, &mut rng, &mut events);
        seq.update(SIM_DT, [true, false, false], &t, &mut rng, &mut events);
        let hits = events.iter().filter(|e| matches!(e, GameEvent::RhythmHit { .. })).count();
        assert_eq!(hits, 1);

        seq.update(SIM_DT, [false, false, false], &t, &mut rng, &mut events);
        seq.update(SIM_DT, [true, false, false], &t, &mut rng, &mut events);
        let hits = events.iter().filter(|e| matches!(e, GameEvent::RhythmHit { .. })).count();
        assert_eq!(hits, 2);
    }

    #[test]
    fn test_session_resolves_on_the_frame_the_last_target_is_missed() {
        let t = tuning();
        let mut seq = RhythmSequencer::default();
        let mut rng = Pcg32::seed_from_u64(42);
        seq.start(&t);

        let mut frame = 0;
        loop {
            frame += 1;
            assert!(frame < 10_000, "session never resolved");
            let mut events = Vec::new();
            let phase = seq.update(SIM_DT, [false; LANE_COUNT], &t, &mut rng, &mut events);
            let session = seq.session().unwrap();
            let resolved = session.results().len() as u32;
            if phase == Some(SessionPhase::Resolving) {
                assert_eq!(session.spawned(), 8);
                assert_eq!(resolved, 8);
                assert!(events.iter().any(|e| matches!(e, GameEvent::RhythmMiss { .. })));
                break;
            }
            assert!(session.spawned() < 8 || resolved < 8);
        }

        let strike = seq.finish(&t).unwrap();
        assert_eq!(strike.total_damage, t.base_damage);
        assert_eq!(strike.results, vec![Judgement::Miss; 8]);
        assert_eq!(strike.pierce, t.ultimate_pierce);
        assert!(!seq.is_active());
    }

    #[test]
    fn test_session_resolves_on_the_frame_the_last_target_is_hit() {
        let t = tuning();
        let mut seq = RhythmSequencer::default();
        let mut rng = Pcg32::seed_from_u64(3);
        seq.start(&t);

        let mut frame = 0;
        let mut lanes = [false; LANE_COUNT];
        loop {
            frame += 1;
            assert!(frame < 10_000, "session never resolved");
            let mut events = Vec::new();
            let phase = seq.update(SIM_DT, lanes, &t, &mut rng, &mut events);
            if phase == Some(SessionPhase::Resolving) {
                let session = seq.session().unwrap();
                assert_eq!(session.spawned(), 8);
                assert_eq!(session.results().len(), 8);
                assert!(events.iter().any(|e| matches!(e, GameEvent::RhythmHit { .. })));
                break;
            }
            // Press a lane on the frame after its target enters the best window
            lanes = [false; LANE_COUNT];
            for target in seq.session().unwrap().targets() {
                if (target.y - t.hit_line).abs() <= t.best_window {
                    lanes[target.lane] = true;
                }
            }
        }
        let strike = seq.finish(&t).unwrap();
        assert!(strike.total_damage > t.base_damage);
    }

    #[test]
    fn test_finish_refused_while_active() {
        let t = tuning();
        let mut seq = RhythmSequencer::default();
        assert!(seq.finish(&t).is_none());
        seq.start(&t);
        assert!(seq.finish(&t).is_none());
        assert!(seq.is_active());
    }
}
