use rand::Rng;
use rand::seq::IteratorRandom;
use std::time::{Duration, Instant};
use tracing::debug;

pub const GAME_DURATION: Duration = Duration::from_secs(30);
/// Grace period before the first wave.
pub const FIRST_SPAWN_DELAY: Duration = Duration::from_millis(100);
const POINTS_PER_HIT: u32 = 10;

/// Slot keys, laid out as three keyboard rows so the field mirrors the hand.
pub const SLOT_KEYS: [&str; 3] = ["qwerty", "asdfgh", "zxcvbn"];
pub const COLUMNS: usize = 6;
pub const SLOT_COUNT: usize = 18;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty
{
    Easy,
    Medium,
    Hard,
    Ultra,
}

impl Difficulty
{
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Ultra,
    ];

    /// Time between two waves.
    pub fn spawn_interval(self) -> Duration
    {
        match self {
            Difficulty::Easy => Duration::from_millis(1500),
            Difficulty::Medium => Duration::from_millis(1000),
            Difficulty::Hard => Duration::from_millis(700),
            Difficulty::Ultra => Duration::from_millis(400),
        }
    }

    /// How long a target stays up before it counts as a miss.
    pub fn lifetime(self) -> Duration
    {
        match self {
            Difficulty::Easy => Duration::from_millis(3000),
            Difficulty::Medium => Duration::from_millis(2000),
            Difficulty::Hard => Duration::from_millis(1500),
            Difficulty::Ultra => Duration::from_millis(800),
        }
    }

    pub fn targets_per_wave(self) -> usize
    {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::Ultra => 4,
        }
    }

    pub fn name(self) -> &'static str
    {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Ultra => "ultra",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String>
    {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|d| d.name()).collect();
                format!("Unknown difficulty '{value}'. Expected one of: {}", names.join(", "))
            })
    }
}

/// Slot index for a key, if the key belongs to the field.
pub fn slot_for_key(key: char) -> Option<usize>
{
    let key = key.to_ascii_lowercase();
    SLOT_KEYS
        .iter()
        .flat_map(|row| row.chars())
        .position(|slot_key| slot_key == key)
}

pub fn key_for_slot(slot: usize) -> Option<char>
{
    SLOT_KEYS.iter().flat_map(|row| row.chars()).nth(slot)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Press
{
    Hit,
    Miss,
    Ignored,
}

/// Targets live in fixed slots, each holding the instant it expires.
pub struct Field
{
    difficulty: Difficulty,
    slots: [Option<Instant>; SLOT_COUNT],
    score: u32,
    hits: u32,
    misses: u32,
    started_at: Instant,
    next_wave_at: Instant,
}

impl Field
{
    pub fn new(difficulty: Difficulty, now: Instant) -> Self
    {
        Self {
            difficulty,
            slots: [None; SLOT_COUNT],
            score: 0,
            hits: 0,
            misses: 0,
            started_at: now,
            next_wave_at: now + FIRST_SPAWN_DELAY,
        }
    }

    pub fn difficulty(&self) -> Difficulty
    {
        self.difficulty
    }

    pub fn score(&self) -> u32
    {
        self.score
    }

    pub fn hits(&self) -> u32
    {
        self.hits
    }

    pub fn misses(&self) -> u32
    {
        self.misses
    }

    /// Whole-percent accuracy; 0 before any hit or miss.
    pub fn accuracy(&self) -> u32
    {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0;
        }
        ((self.hits as f64 / total as f64) * 100.0).round() as u32
    }

    pub fn ends_at(&self) -> Instant
    {
        self.started_at + GAME_DURATION
    }

    pub fn remaining(&self, now: Instant) -> Duration
    {
        self.ends_at().saturating_duration_since(now)
    }

    pub fn is_over(&self, now: Instant) -> bool
    {
        now >= self.ends_at()
    }

    pub fn is_lit(&self, slot: usize) -> bool
    {
        self.slots.get(slot).is_some_and(Option::is_some)
    }

    /// How far a lit target is through its lifetime, from 0.0 to 1.0.
    pub fn urgency(&self, slot: usize, now: Instant) -> Option<f32>
    {
        let expires_at = (*self.slots.get(slot)?)?;
        let lifetime = self.difficulty.lifetime().as_secs_f32();
        let left = expires_at.saturating_duration_since(now).as_secs_f32();
        Some((1.0 - left / lifetime).clamp(0.0, 1.0))
    }

    /// Expires targets, then spawns any waves that are due. Expiries after
    /// the clock runs out are not charged, and the field clears at the end.
    pub fn tick(&mut self, rng: &mut impl Rng, now: Instant)
    {
        let cutoff = now.min(self.ends_at());
        for slot in self.slots.iter_mut() {
            if slot.is_some_and(|expires_at| expires_at <= cutoff) {
                *slot = None;
                self.misses += 1;
            }
        }

        if self.is_over(now) {
            self.slots = [None; SLOT_COUNT];
            return;
        }

        while self.next_wave_at <= now {
            let at = self.next_wave_at;
            self.spawn_wave(rng, at);
            self.next_wave_at += self.difficulty.spawn_interval();
        }
    }

    fn spawn_wave(&mut self, rng: &mut impl Rng, at: Instant)
    {
        let free = (0..SLOT_COUNT).filter(|&slot| self.slots[slot].is_none());
        let chosen = free.choose_multiple(rng, self.difficulty.targets_per_wave());
        let expires_at = at + self.difficulty.lifetime();
        for &slot in &chosen {
            self.slots[slot] = Some(expires_at);
        }
        debug!(targets = chosen.len(), "wave spawned");
    }

    pub fn press(&mut self, slot: usize, now: Instant) -> Press
    {
        if self.is_over(now) || slot >= SLOT_COUNT {
            return Press::Ignored;
        }

        match self.slots[slot] {
            Some(expires_at) if expires_at > now => {
                self.slots[slot] = None;
                self.hits += 1;
                self.score += POINTS_PER_HIT;
                Press::Hit
            }
            _ => {
                self.misses += 1;
                Press::Miss
            }
        }
    }
}
