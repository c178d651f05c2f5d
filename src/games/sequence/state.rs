use rand::Rng;
use std::time::{Duration, Instant};
use tracing::info;

pub const NEXT_LEVEL_DELAY: Duration = Duration::from_millis(1500);
const POINTS_PER_LEVEL: u32 = 10;

/// Per-level knobs. Sequences grow, show faster and draw from a wider range
/// as the level rises, each up to a cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelConfig
{
    pub length: usize,
    /// Display time budgeted per number; the whole sequence shows for
    /// `per_number × length`.
    pub per_number: Duration,
    /// Numbers are drawn from `1..=range`.
    pub range: u32,
}

impl LevelConfig
{
    pub fn for_level(level: u32) -> Self
    {
        Self {
            length: (3 + level as usize / 2).min(10),
            per_number: Duration::from_millis(1000u64.saturating_sub(50 * level as u64).max(400)),
            range: (9 + level / 3).min(50),
        }
    }

    pub fn display_time(&self) -> Duration
    {
        self.per_number * self.length as u32
    }
}

pub fn generate_sequence(rng: &mut impl Rng, config: LevelConfig) -> Vec<u32>
{
    (0..config.length)
        .map(|_| rng.gen_range(1..=config.range))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase
{
    Showing,
    Entering,
    Cleared,
    Over,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entry
{
    Ignored,
    Correct,
    Cleared { points: u32 },
    Wrong { expected: u32 },
}

pub struct Game
{
    level: u32,
    score: u32,
    sequence: Vec<u32>,
    entered: Vec<u32>,
    phase: Phase,
    phase_started: Instant,
}

impl Game
{
    pub fn new(rng: &mut impl Rng, now: Instant) -> Self
    {
        let config = LevelConfig::for_level(1);
        Self {
            level: 1,
            score: 0,
            sequence: generate_sequence(rng, config),
            entered: Vec::new(),
            phase: Phase::Showing,
            phase_started: now,
        }
    }

    pub fn level(&self) -> u32
    {
        self.level
    }

    pub fn score(&self) -> u32
    {
        self.score
    }

    pub fn sequence(&self) -> &[u32]
    {
        &self.sequence
    }

    pub fn entered(&self) -> &[u32]
    {
        &self.entered
    }

    pub fn phase(&self) -> Phase
    {
        self.phase
    }

    pub fn config(&self) -> LevelConfig
    {
        LevelConfig::for_level(self.level)
    }

    pub fn tick(&mut self, rng: &mut impl Rng, now: Instant)
    {
        let elapsed = now.saturating_duration_since(self.phase_started);
        match self.phase {
            Phase::Showing if elapsed >= self.config().display_time() => {
                self.set_phase(Phase::Entering, now);
            }
            Phase::Cleared if elapsed >= NEXT_LEVEL_DELAY => self.start_level(rng, now),
            _ => {}
        }
    }

    pub fn enter(&mut self, value: u32, now: Instant) -> Entry
    {
        if self.phase != Phase::Entering {
            return Entry::Ignored;
        }

        let expected = self.sequence[self.entered.len()];
        self.entered.push(value);
        if value != expected {
            info!(level = self.level, score = self.score, "sequence game over");
            self.set_phase(Phase::Over, now);
            return Entry::Wrong { expected };
        }

        if self.entered.len() < self.sequence.len() {
            return Entry::Correct;
        }

        let points = self.level * POINTS_PER_LEVEL;
        self.score += points;
        self.level += 1;
        self.set_phase(Phase::Cleared, now);
        Entry::Cleared { points }
    }

    pub fn restart(&mut self, rng: &mut impl Rng, now: Instant)
    {
        *self = Self::new(rng, now);
    }

    fn start_level(&mut self, rng: &mut impl Rng, now: Instant)
    {
        self.sequence = generate_sequence(rng, self.config());
        self.entered.clear();
        self.set_phase(Phase::Showing, now);
    }

    fn set_phase(&mut self, phase: Phase, now: Instant)
    {
        self.phase = phase;
        self.phase_started = now;
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entering(sequence: &[u32], start: Instant) -> Game
    {
        Game {
            level: 1,
            score: 0,
            sequence: sequence.to_vec(),
            entered: Vec::new(),
            phase: Phase::Entering,
            phase_started: start,
        }
    }

    #[test]
    fn level_table_grows_to_its_caps()
    {
        let first = LevelConfig::for_level(1);
        assert_eq!(first.length, 3);
        assert_eq!(first.per_number, Duration::from_millis(950));
        assert_eq!(first.range, 9);

        let tenth = LevelConfig::for_level(10);
        assert_eq!(tenth.length, 8);
        assert_eq!(tenth.per_number, Duration::from_millis(500));
        assert_eq!(tenth.range, 12);

        let late = LevelConfig::for_level(200);
        assert_eq!(late.length, 10);
        assert_eq!(late.per_number, Duration::from_millis(400));
        assert_eq!(late.range, 50);
    }

    #[test]
    fn generated_numbers_stay_in_range()
    {
        let mut rng = StdRng::seed_from_u64(8);
        for level in [1, 4, 9, 30, 150] {
            let config = LevelConfig::for_level(level);
            for _ in 0..100 {
                let sequence = generate_sequence(&mut rng, config);
                assert_eq!(sequence.len(), config.length);
                assert!(sequence.iter().all(|n| (1..=config.range).contains(n)), "{sequence:?}");
            }
        }
    }

    #[test]
    fn input_waits_for_the_display_to_end()
    {
        let mut rng = StdRng::seed_from_u64(9);
        let start = Instant::now();
        let mut game = Game::new(&mut rng, start);
        let first = game.sequence()[0];
        assert_eq!(game.enter(first, start), Entry::Ignored);

        game.tick(&mut rng, start + Duration::from_millis(2849));
        assert_eq!(game.phase(), Phase::Showing);
        game.tick(&mut rng, start + Duration::from_millis(2850));
        assert_eq!(game.phase(), Phase::Entering);
        assert_eq!(game.enter(first, start), Entry::Correct);
    }

    #[test]
    fn full_sequence_clears_the_level()
    {
        let mut rng = StdRng::seed_from_u64(10);
        let start = Instant::now();
        let mut game = entering(&[4, 2, 7], start);
        assert_eq!(game.enter(4, start), Entry::Correct);
        assert_eq!(game.enter(2, start), Entry::Correct);
        assert_eq!(game.enter(7, start), Entry::Cleared { points: 10 });
        assert_eq!((game.level(), game.score()), (2, 10));

        game.tick(&mut rng, start + Duration::from_millis(1499));
        assert_eq!(game.phase(), Phase::Cleared);
        game.tick(&mut rng, start + NEXT_LEVEL_DELAY);
        assert_eq!(game.phase(), Phase::Showing);
        assert!(game.entered().is_empty());
        assert_eq!(game.sequence().len(), LevelConfig::for_level(2).length);
    }

    #[test]
    fn wrong_number_ends_the_game()
    {
        let mut rng = StdRng::seed_from_u64(11);
        let start = Instant::now();
        let mut game = entering(&[4, 2, 7], start);
        game.enter(4, start);
        assert_eq!(game.enter(3, start), Entry::Wrong { expected: 2 });
        assert_eq!(game.phase(), Phase::Over);
        assert_eq!(game.enter(7, start), Entry::Ignored);

        game.restart(&mut rng, start);
        assert_eq!((game.level(), game.score(), game.phase()), (1, 0, Phase::Showing));
    }
}
