//! Per-actor countdown timers with explicit identities
//!
//! Every timer an actor carries is advanced in a single pass per frame
//! (`Timers::advance`), which reports the timers that ran out in a fixed
//! order so expiry handling is the same every frame.

/// Identity of a countdown timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerId {
    /// Damage is ignored while running
    Invincibility = 0,
    /// Cosmetic flash after taking damage
    HitFlash = 1,
    /// Attack pose overrides movement states while running
    AttackHold = 2,
    /// Next attack is refused while running
    AttackCooldown = 3,
    /// Dead actor is purged when this runs out
    DeathLinger = 4,
    /// Star power: invulnerable, contact kills
    StarPower = 5,
}

impl TimerId {
    pub const COUNT: usize = 6;

    /// Expiry order used by `Timers::advance`
    pub const ALL: [TimerId; Self::COUNT] = [
        TimerId::Invincibility,
        TimerId::HitFlash,
        TimerId::AttackHold,
        TimerId::AttackCooldown,
        TimerId::DeathLinger,
        TimerId::StarPower,
    ];
}

/// Set of countdowns in seconds; zero means not running
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Timers {
    remaining: [f32; TimerId::COUNT],
}

impl Timers {
    pub fn set(&mut self, id: TimerId, seconds: f32) {
        self.remaining[id as usize] = seconds.max(0.0);
    }

    pub fn clear(&mut self, id: TimerId) {
        self.remaining[id as usize] = 0.0;
    }

    #[inline]
    pub fn get(&self, id: TimerId) -> f32 {
        self.remaining[id as usize]
    }

    #[inline]
    pub fn is_running(&self, id: TimerId) -> bool {
        self.remaining[id as usize] > 0.0
    }

    /// Count every running timer down by `dt`, returning those that reached zero
    pub fn advance(&mut self, dt: f32) -> Vec<TimerId> {
        let mut expired = Vec::new();
        for id in TimerId::ALL {
            let slot = &mut self.remaining[id as usize];
            if *slot > 0.0 {
                *slot -= dt;
                if *slot <= 0.0 {
                    *slot = 0.0;
                    expired.push(id);
                }
            }
        }
        expired
    }
}

/// Looping animation frame counter
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimClock {
    pub frame: u32,
    elapsed: f32,
}

impl AnimClock {
    /// Advance by `dt`, stepping to the next of `frames` frames every `frame_time`
    pub fn advance(&mut self, dt: f32, frame_time: f32, frames: u32) {
        if frames == 0 || frame_time <= 0.0 {
            return;
        }
        self.elapsed += dt;
        while self.elapsed >= frame_time {
            self.elapsed -= frame_time;
            self.frame = (self.frame + 1) % frames;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
