pub mod state;

use crate::games::player_name;
use crate::scores::ScoreRecord;
use crate::terminal::{self, Rgb, TICK_MS, TerminalGuard};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use state::{Direction, GRID, Pacer, Pos, Snake, Step};
use std::io::Stdout;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const FIELD: Rgb = Rgb::new(25, 30, 45);
const HEAD: Rgb = Rgb::new(40, 220, 120);
const BODY: Rgb = Rgb::new(20, 140, 80);
const FOOD: Rgb = Rgb::new(230, 80, 80);

/// Snake has a single ruleset; this labels its score table rows.
const MODE: &str = "classic";

pub struct SnakeConfig
{
    player: String,
}

impl SnakeConfig
{
    pub fn from_args(args: &[String]) -> Result<Self, String>
    {
        let mut name: Option<String> = None;
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--name" {
                let value = iter
                    .next()
                    .ok_or_else(|| "Expected value after --name".to_string())?;
                name = Some(value.clone());
            } else if let Some(rest) = arg.strip_prefix("--name=") {
                name = Some(rest.to_string());
            } else {
                return Err(format!("Unknown snake option '{arg}'"));
            }
        }

        Ok(Self {
            player: player_name(name),
        })
    }
}

/// Best run of the session, kept across restarts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct BestRun
{
    score: u32,
    seconds: u64,
}

impl BestRun
{
    fn offer(&mut self, score: u32, seconds: u64)
    {
        if score > self.score || (score == self.score && seconds < self.seconds) {
            *self = Self { score, seconds };
        }
    }
}

pub fn run_with_config(config: SnakeConfig) -> Result<Option<ScoreRecord>, String>
{
    let mut term = TerminalGuard::enter().map_err(|err| err.to_string())?;
    let mut rng = rand::thread_rng();
    let mut snake = Snake::new(&mut rng);
    let mut pacer = Pacer::new();
    let mut best = BestRun::default();
    let mut run_started = Instant::now();
    let mut run_ended: Option<Instant> = None;
    let mut last_tick = Instant::now();
    info!("snake started");

    loop {
        let now = Instant::now();

        match handle_input(&mut snake, &mut pacer)? {
            Action::Quit => break,
            Action::Restart if !snake.is_alive() => {
                snake = Snake::new(&mut rng);
                pacer.reset();
                run_started = now;
                run_ended = None;
            }
            _ => {}
        }

        if snake.is_alive() {
            for _ in 0..pacer.due(now) {
                let step = snake.step(&mut rng);
                if step == Step::Ate {
                    debug!(score = snake.score(), length = snake.body().len(), "food eaten");
                }
                if !snake.is_alive() {
                    let seconds = now.saturating_duration_since(run_started).as_secs();
                    info!(score = snake.score(), seconds, ?step, "snake run over");
                    best.offer(snake.score(), seconds);
                    run_ended = Some(now);
                    break;
                }
            }
        }

        if last_tick.elapsed() >= Duration::from_millis(TICK_MS) {
            let elapsed = run_ended
                .unwrap_or(now)
                .saturating_duration_since(run_started);
            draw_ui(term.stdout(), &snake, &pacer, best, elapsed)?;
            last_tick = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(1));
    }

    if snake.is_alive() {
        best.offer(snake.score(), run_started.elapsed().as_secs());
    }
    draw_summary(term.stdout(), best)?;
    terminal::wait_for_space()?;

    if best.score == 0 {
        return Ok(None);
    }
    Ok(Some(ScoreRecord::new(&config.player, best.score, best.seconds, MODE)))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action
{
    Continue,
    Restart,
    Quit,
}

fn handle_input(snake: &mut Snake, pacer: &mut Pacer) -> Result<Action, String>
{
    let mut action = Action::Continue;
    while event::poll(Duration::from_millis(0)).map_err(|err| err.to_string())? {
        if let Event::Key(KeyEvent { code, modifiers, .. }) =
            event::read().map_err(|err| err.to_string())?
        {
            match code {
                KeyCode::Esc => return Ok(Action::Quit),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(Action::Quit)
                }
                KeyCode::Up | KeyCode::Char('w') => {
                    snake.turn(Direction::Up);
                }
                KeyCode::Down | KeyCode::Char('s') => {
                    snake.turn(Direction::Down);
                }
                KeyCode::Left | KeyCode::Char('a') => {
                    snake.turn(Direction::Left);
                }
                KeyCode::Right | KeyCode::Char('d') => {
                    snake.turn(Direction::Right);
                }
                KeyCode::Char('+') | KeyCode::Char('=') => pacer.faster(),
                KeyCode::Char('-') => pacer.slower(),
                KeyCode::Char(' ') | KeyCode::Enter => action = Action::Restart,
                _ => {}
            }
        }
    }

    Ok(action)
}

fn draw_ui(
    stdout: &mut Stdout,
    snake: &Snake,
    pacer: &Pacer,
    best: BestRun,
    elapsed: Duration,
) -> Result<(), String>
{
    let mut lines = Vec::new();
    lines.push("Mind Games - Snake".to_string());
    lines.push(format!(
        "Score: {}  Best: {}  Length: {}  Speed: {}ms  Time: {}s",
        snake.score(),
        best.score.max(snake.score()),
        snake.body().len(),
        pacer.interval().as_millis(),
        elapsed.as_secs()
    ));
    lines.push(String::new());

    for y in 0..GRID {
        let mut line = String::new();
        for x in 0..GRID {
            let cell = Pos::new(x, y);
            let color = if cell == snake.head() {
                HEAD
            } else if snake.body().contains(&cell) {
                BODY
            } else if cell == snake.food() {
                FOOD
            } else {
                FIELD
            };
            line.push_str(&terminal::paint("  ", color));
        }
        lines.push(line);
    }

    lines.push(String::new());
    if snake.is_alive() {
        lines.push("Arrows/WASD steer, +/- change speed. Esc quits.".to_string());
    } else {
        lines.push(format!("Game over with {} points!", snake.score()));
        lines.push("Press SPACE to play again or Esc to quit.".to_string());
    }

    terminal::draw_lines(stdout, &lines)
}

fn draw_summary(stdout: &mut Stdout, best: BestRun) -> Result<(), String>
{
    let lines = vec![
        "Snake over".to_string(),
        String::new(),
        format!("Best score: {}", best.score),
        format!("Best run time: {}s", best.seconds),
        String::new(),
        "Press SPACE to exit.".to_string(),
    ];
    terminal::draw_lines(stdout, &lines)
}
