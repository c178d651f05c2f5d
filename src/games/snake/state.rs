use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::info;

/// Cells per side of the square playfield.
pub const GRID: i32 = 20;
pub const POINTS_PER_FOOD: u32 = 10;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);
pub const MIN_INTERVAL: Duration = Duration::from_millis(40);
pub const MAX_INTERVAL: Duration = Duration::from_millis(400);
const INTERVAL_STEP: Duration = Duration::from_millis(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pos
{
    pub x: i32,
    pub y: i32,
}

impl Pos
{
    pub const fn new(x: i32, y: i32) -> Self
    {
        Self { x, y }
    }

    fn moved(self, direction: Direction) -> Self
    {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    fn inside(self) -> bool
    {
        (0..GRID).contains(&self.x) && (0..GRID).contains(&self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction
{
    Up,
    Down,
    Left,
    Right,
}

impl Direction
{
    fn delta(self) -> (i32, i32)
    {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    fn opposite(self) -> Self
    {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step
{
    Moved,
    Ate,
    Crashed,
    /// The snake is already dead; nothing moved.
    Over,
}

pub struct Snake
{
    /// Head first.
    body: VecDeque<Pos>,
    heading: Direction,
    queued: Direction,
    food: Pos,
    score: u32,
    alive: bool,
}

impl Snake
{
    /// A one-cell snake in the middle of the field heading right.
    pub fn new(rng: &mut impl Rng) -> Self
    {
        let mut snake = Self {
            body: VecDeque::from([Pos::new(GRID / 2, GRID / 2)]),
            heading: Direction::Right,
            queued: Direction::Right,
            food: Pos::new(0, 0),
            score: 0,
            alive: true,
        };
        if let Some(food) = snake.random_free_cell(rng) {
            snake.food = food;
        }
        snake
    }

    pub fn body(&self) -> &VecDeque<Pos>
    {
        &self.body
    }

    pub fn head(&self) -> Pos
    {
        self.body[0]
    }

    pub fn food(&self) -> Pos
    {
        self.food
    }

    pub fn score(&self) -> u32
    {
        self.score
    }

    pub fn is_alive(&self) -> bool
    {
        self.alive
    }

    /// Queues a turn for the next step. Turning straight back into the last
    /// moved direction is refused.
    pub fn turn(&mut self, direction: Direction) -> bool
    {
        if direction == self.heading.opposite() {
            return false;
        }
        self.queued = direction;
        true
    }

    pub fn step(&mut self, rng: &mut impl Rng) -> Step
    {
        if !self.alive {
            return Step::Over;
        }

        self.heading = self.queued;
        let head = self.head().moved(self.heading);
        if !head.inside() {
            self.alive = false;
            return Step::Crashed;
        }

        let eating = head == self.food;
        // The tail cell frees up during this step unless the snake grows.
        let solid = if eating { self.body.len() } else { self.body.len() - 1 };
        if self.body.iter().take(solid).any(|part| *part == head) {
            self.alive = false;
            return Step::Crashed;
        }

        self.body.push_front(head);
        if !eating {
            self.body.pop_back();
            return Step::Moved;
        }

        self.score += POINTS_PER_FOOD;
        match self.random_free_cell(rng) {
            Some(food) => self.food = food,
            None => {
                info!(score = self.score, "snake fills the field");
                self.alive = false;
            }
        }
        Step::Ate
    }

    fn random_free_cell(&self, rng: &mut impl Rng) -> Option<Pos>
    {
        let free: Vec<Pos> = (0..GRID)
            .flat_map(|y| (0..GRID).map(move |x| Pos::new(x, y)))
            .filter(|cell| !self.body.contains(cell))
            .collect();
        free.choose(rng).copied()
    }
}

/// Converts elapsed wall time into whole snake steps, carrying the remainder
/// so the pace does not drift with the render tick.
pub struct Pacer
{
    interval: Duration,
    carried: Duration,
    last: Option<Instant>,
}

impl Pacer
{
    pub fn new() -> Self
    {
        Self {
            interval: DEFAULT_INTERVAL,
            carried: Duration::ZERO,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration
    {
        self.interval
    }

    pub fn faster(&mut self)
    {
        self.interval = self.interval.saturating_sub(INTERVAL_STEP).max(MIN_INTERVAL);
    }

    pub fn slower(&mut self)
    {
        self.interval = (self.interval + INTERVAL_STEP).min(MAX_INTERVAL);
    }

    /// Steps owed since the previous call.
    pub fn due(&mut self, now: Instant) -> u32
    {
        let last = *self.last.get_or_insert(now);
        self.carried += now.saturating_duration_since(last);
        self.last = Some(now);

        let mut steps = 0;
        while self.carried >= self.interval {
            self.carried -= self.interval;
            steps += 1;
        }
        steps
    }

    pub fn reset(&mut self)
    {
        self.carried = Duration::ZERO;
        self.last = None;
    }
}

impl Default for Pacer
{
    fn default() -> Self
    {
        Self::new()
    }
}
