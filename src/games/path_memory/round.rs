use super::Difficulty;
use super::generator::generate_path;
use std::time::{Duration, Instant};
use tracing::info;

/// Time between two path cells lighting up. The board stays lit one extra
/// step after the last cell.
pub const STEP_DELAY: Duration = Duration::from_millis(600);
pub const ANSWER_DISPLAY: Duration = Duration::from_secs(3);
pub const NEXT_LEVEL_DELAY: Duration = Duration::from_millis(1500);

const FAILURE_PENALTY: u32 = 5;
const POINTS_PER_LEVEL: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome
{
    Completed,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase
{
    Displaying,
    AwaitingInput,
    Resolved(Outcome),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection
{
    Ignored,
    Correct,
    Resolved(Outcome),
}

/// One watch-then-repeat round over a fixed path.
pub struct Round
{
    path: Vec<usize>,
    picked: Vec<usize>,
    phase: Phase,
    started_at: Instant,
}

impl Round
{
    pub fn new(path: Vec<usize>, started_at: Instant) -> Self
    {
        Self {
            path,
            picked: Vec::new(),
            phase: Phase::Displaying,
            started_at,
        }
    }

    pub fn path(&self) -> &[usize]
    {
        &self.path
    }

    pub fn picked(&self) -> &[usize]
    {
        &self.picked
    }

    pub fn phase(&self) -> Phase
    {
        self.phase
    }

    pub fn display_duration(&self) -> Duration
    {
        STEP_DELAY * (self.path.len() as u32 + 1)
    }

    pub fn tick(&mut self, now: Instant)
    {
        if self.phase == Phase::Displaying
            && now.saturating_duration_since(self.started_at) >= self.display_duration()
        {
            self.phase = Phase::AwaitingInput;
        }
    }

    /// Path prefix lit at `now`. Empty once the display is over.
    pub fn revealed(&self, now: Instant) -> &[usize]
    {
        if self.phase != Phase::Displaying {
            return &[];
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        if elapsed >= self.display_duration() {
            return &[];
        }
        let steps = (elapsed.as_millis() / STEP_DELAY.as_millis()) as usize + 1;
        &self.path[..steps.min(self.path.len())]
    }

    pub fn select(&mut self, cell: usize) -> Selection
    {
        if self.phase != Phase::AwaitingInput || self.picked.contains(&cell) {
            return Selection::Ignored;
        }

        self.picked.push(cell);
        let step = self.picked.len() - 1;
        if self.path.get(step) != Some(&cell) {
            self.phase = Phase::Resolved(Outcome::Failed);
            return Selection::Resolved(Outcome::Failed);
        }

        if self.picked.len() == self.path.len() {
            self.phase = Phase::Resolved(Outcome::Completed);
            return Selection::Resolved(Outcome::Completed);
        }

        Selection::Correct
    }
}

/// Level and score across rounds. Each round gets a freshly generated path.
pub struct Session
{
    difficulty: Difficulty,
    level: u32,
    score: u32,
    round: Round,
    resolved_at: Option<Instant>,
}

impl Session
{
    pub fn new(difficulty: Difficulty, now: Instant) -> Self
    {
        Self {
            difficulty,
            level: 1,
            score: 0,
            round: Self::fresh_round(difficulty, now),
            resolved_at: None,
        }
    }

    fn fresh_round(difficulty: Difficulty, now: Instant) -> Round
    {
        Round::new(
            generate_path(difficulty.grid_size(), difficulty.path_length()),
            now,
        )
    }

    pub fn difficulty(&self) -> Difficulty
    {
        self.difficulty
    }

    pub fn level(&self) -> u32
    {
        self.level
    }

    pub fn score(&self) -> u32
    {
        self.score
    }

    pub fn round(&self) -> &Round
    {
        &self.round
    }

    pub fn tick(&mut self, now: Instant)
    {
        self.round.tick(now);

        if self.round.phase() == Phase::Resolved(Outcome::Completed)
            && self
                .resolved_at
                .is_some_and(|at| now.saturating_duration_since(at) >= NEXT_LEVEL_DELAY)
        {
            self.level += 1;
            self.start_round(now);
        }
    }

    pub fn select(&mut self, cell: usize, now: Instant) -> Selection
    {
        let selection = self.round.select(cell);
        match selection {
            Selection::Resolved(Outcome::Completed) => {
                self.score += self.level * POINTS_PER_LEVEL;
                self.resolved_at = Some(now);
                info!(level = self.level, score = self.score, "path completed");
            }
            Selection::Resolved(Outcome::Failed) => {
                self.score = self.score.saturating_sub(FAILURE_PENALTY);
                self.resolved_at = Some(now);
                info!(level = self.level, score = self.score, "path failed");
            }
            Selection::Correct | Selection::Ignored => {}
        }
        selection
    }

    /// After a miss, the correct path stays on screen for a few seconds.
    pub fn showing_answer(&self, now: Instant) -> bool
    {
        self.round.phase() == Phase::Resolved(Outcome::Failed)
            && self
                .resolved_at
                .is_some_and(|at| now.saturating_duration_since(at) < ANSWER_DISPLAY)
    }

    pub fn restart(&mut self, now: Instant)
    {
        self.start_round(now);
    }

    pub fn new_game(&mut self, now: Instant)
    {
        self.level = 1;
        self.score = 0;
        self.start_round(now);
    }

    fn start_round(&mut self, now: Instant)
    {
        self.round = Self::fresh_round(self.difficulty, now);
        self.resolved_at = None;
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn awaiting(path: Vec<usize>, start: Instant) -> Round
    {
        let mut round = Round::new(path, start);
        round.tick(start + round.display_duration());
        round
    }

    #[test]
    fn path_lights_up_one_step_at_a_time()
    {
        let start = Instant::now();
        let round = Round::new(vec![4, 1, 2, 5], start);
        assert_eq!(round.revealed(start), &[4]);
        assert_eq!(round.revealed(start + Duration::from_millis(599)), &[4]);
        assert_eq!(round.revealed(start + Duration::from_millis(600)), &[4, 1]);
        assert_eq!(round.revealed(start + Duration::from_millis(2000)), &[4, 1, 2, 5]);
        assert_eq!(round.revealed(start + Duration::from_millis(2999)), &[4, 1, 2, 5]);
        assert!(round.revealed(start + Duration::from_millis(3000)).is_empty());
    }

    #[test]
    fn input_ignored_while_displaying()
    {
        let start = Instant::now();
        let mut round = Round::new(vec![4, 1, 2, 5], start);
        assert_eq!(round.select(4), Selection::Ignored);
        assert!(round.picked().is_empty());

        round.tick(start + Duration::from_millis(2999));
        assert_eq!(round.phase(), Phase::Displaying);
        round.tick(start + Duration::from_millis(3000));
        assert_eq!(round.phase(), Phase::AwaitingInput);
    }

    #[test]
    fn correct_sequence_completes()
    {
        let mut round = awaiting(vec![0, 1, 3, 2], Instant::now());
        assert_eq!(round.select(0), Selection::Correct);
        assert_eq!(round.select(1), Selection::Correct);
        assert_eq!(round.select(3), Selection::Correct);
        assert_eq!(round.select(2), Selection::Resolved(Outcome::Completed));
        assert_eq!(round.phase(), Phase::Resolved(Outcome::Completed));
        assert_eq!(round.select(2), Selection::Ignored);
    }

    #[test]
    fn wrong_cell_fails_round()
    {
        let mut round = awaiting(vec![4, 1, 2, 5], Instant::now());
        assert_eq!(round.select(4), Selection::Correct);
        assert_eq!(round.select(7), Selection::Resolved(Outcome::Failed));
        assert_eq!(round.phase(), Phase::Resolved(Outcome::Failed));
        assert_eq!(round.select(1), Selection::Ignored);
    }

    #[test]
    fn repeated_cell_is_ignored()
    {
        let mut round = awaiting(vec![4, 1, 2, 5], Instant::now());
        assert_eq!(round.select(4), Selection::Correct);
        assert_eq!(round.select(4), Selection::Ignored);
        assert_eq!(round.picked(), &[4]);
    }

    fn play_through(session: &mut Session, now: Instant) -> Instant
    {
        let ready = now + session.round().display_duration();
        session.tick(ready);
        let path = session.round().path().to_vec();
        for cell in path {
            session.select(cell, ready);
        }
        ready
    }

    #[test]
    fn session_awards_level_points_and_advances()
    {
        let start = Instant::now();
        let mut session = Session::new(Difficulty::Easy, start);
        assert_eq!(session.round().path().len(), 4);

        let done = play_through(&mut session, start);
        assert_eq!(session.score(), 10);
        assert_eq!(session.level(), 1);

        session.tick(done + Duration::from_millis(1499));
        assert_eq!(session.level(), 1);
        session.tick(done + NEXT_LEVEL_DELAY);
        assert_eq!(session.level(), 2);
        assert_eq!(session.round().phase(), Phase::Displaying);

        play_through(&mut session, done + NEXT_LEVEL_DELAY);
        assert_eq!(session.score(), 30);
    }

    #[test]
    fn session_penalty_never_goes_negative()
    {
        let start = Instant::now();
        let mut session = Session::new(Difficulty::Medium, start);
        let ready = start + session.round().display_duration();
        session.tick(ready);

        let wrong = (0..16)
            .find(|cell| *cell != session.round().path()[0])
            .unwrap();
        assert_eq!(
            session.select(wrong, ready),
            Selection::Resolved(Outcome::Failed)
        );
        assert_eq!(session.score(), 0);
        assert!(session.showing_answer(ready));
        assert!(!session.showing_answer(ready + ANSWER_DISPLAY));

        // a failed round waits for an explicit restart
        session.tick(ready + Duration::from_secs(10));
        assert_eq!(session.round().phase(), Phase::Resolved(Outcome::Failed));
    }

    #[test]
    fn failure_after_success_costs_five()
    {
        let start = Instant::now();
        let mut session = Session::new(Difficulty::Easy, start);
        let done = play_through(&mut session, start);
        session.tick(done + NEXT_LEVEL_DELAY);

        let next = done + NEXT_LEVEL_DELAY;
        let ready = next + session.round().display_duration();
        session.tick(ready);
        let wrong = (0..9)
            .find(|cell| *cell != session.round().path()[0])
            .unwrap();
        session.select(wrong, ready);
        assert_eq!(session.score(), 5);
        assert_eq!(session.level(), 2);
    }

    #[test]
    fn restart_and_new_game()
    {
        let start = Instant::now();
        let mut session = Session::new(Difficulty::Hard, start);
        let done = play_through(&mut session, start);
        session.tick(done + NEXT_LEVEL_DELAY);
        assert_eq!(session.level(), 2);

        session.restart(done + Duration::from_secs(5));
        assert_eq!(session.level(), 2);
        assert_eq!(session.score(), 10);
        assert_eq!(session.round().phase(), Phase::Displaying);
        assert_eq!(session.round().path().len(), 8);

        session.new_game(done + Duration::from_secs(6));
        assert_eq!(session.level(), 1);
        assert_eq!(session.score(), 0);
    }
}
