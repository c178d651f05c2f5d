pub mod generator;
pub mod round;

use crate::games::player_name;
use crate::scores::ScoreRecord;
use crate::terminal::{self, Rgb, TICK_MS, TerminalGuard};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use round::{Outcome, Phase, Session};
use std::io::Stdout;
use std::time::{Duration, Instant};
use tracing::info;

const LIT: Rgb = Rgb::new(230, 190, 30);
const IDLE: Rgb = Rgb::new(50, 60, 80);
const HIT: Rgb = Rgb::new(0, 150, 70);
const MISS: Rgb = Rgb::new(170, 30, 30);
const ANSWER: Rgb = Rgb::new(40, 90, 220);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty
{
    Easy,
    Medium,
    Hard,
    Insane,
    Ultra,
}

impl Difficulty
{
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Insane,
        Difficulty::Ultra,
    ];

    pub fn grid_size(self) -> usize
    {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 4,
            Difficulty::Hard => 5,
            Difficulty::Insane => 6,
            Difficulty::Ultra => 7,
        }
    }

    pub fn path_length(self) -> usize
    {
        match self {
            Difficulty::Easy => 4,
            Difficulty::Medium => 6,
            Difficulty::Hard => 8,
            Difficulty::Insane => 12,
            Difficulty::Ultra => 16,
        }
    }

    pub fn name(self) -> &'static str
    {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Insane => "insane",
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

pub struct PathMemoryConfig
{
    difficulty: Difficulty,
    player: String,
}

impl PathMemoryConfig
{
    pub fn from_args(args: &[String]) -> Result<Self, String>
    {
        let mut difficulty = Difficulty::Easy;
        let mut name: Option<String> = None;
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--difficulty" {
                let value = iter
                    .next()
                    .ok_or_else(|| "Expected value after --difficulty".to_string())?;
                difficulty = Difficulty::parse(value)?;
            } else if let Some(rest) = arg.strip_prefix("--difficulty=") {
                difficulty = Difficulty::parse(rest)?;
            } else if arg == "--name" {
                let value = iter
                    .next()
                    .ok_or_else(|| "Expected value after --name".to_string())?;
                name = Some(value.clone());
            } else if let Some(rest) = arg.strip_prefix("--name=") {
                name = Some(rest.to_string());
            } else {
                return Err(format!("Unknown path option '{arg}'"));
            }
        }

        Ok(Self {
            difficulty,
            player: player_name(name),
        })
    }
}

/// Runs path memory until the player quits. Returns the record to submit to
/// the high-score table, if any points were scored.
pub fn run_with_config(config: PathMemoryConfig) -> Result<Option<ScoreRecord>, String>
{
    let mut term = TerminalGuard::enter().map_err(|err| err.to_string())?;
    let start = Instant::now();
    let mut session = Session::new(config.difficulty, start);
    let size = config.difficulty.grid_size();
    let mut cursor = (size * size) / 2;
    let mut last_tick = Instant::now();
    info!(difficulty = config.difficulty.name(), "path memory started");

    loop {
        let now = Instant::now();
        session.tick(now);

        if handle_input(&mut session, &mut cursor, now)? {
            break;
        }

        if last_tick.elapsed() >= Duration::from_millis(TICK_MS) {
            draw_ui(term.stdout(), &session, cursor, now)?;
            last_tick = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(1));
    }

    let seconds = start.elapsed().as_secs();
    draw_summary(term.stdout(), &session, seconds)?;
    terminal::wait_for_space()?;

    if session.score() == 0 {
        return Ok(None);
    }
    Ok(Some(
        ScoreRecord::new(&config.player, session.score(), seconds, config.difficulty.name())
            .with_level(session.level()),
    ))
}

fn handle_input(session: &mut Session, cursor: &mut usize, now: Instant) -> Result<bool, String>
{
    let size = session.difficulty().grid_size();
    let cells = size * size;
    while event::poll(Duration::from_millis(0)).map_err(|err| err.to_string())? {
        if let Event::Key(KeyEvent { code, modifiers, .. }) =
            event::read().map_err(|err| err.to_string())?
        {
            match code {
                KeyCode::Esc => return Ok(true),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(true)
                }
                KeyCode::Up => *cursor = terminal::step_cursor(*cursor, size, cells, -1, 0),
                KeyCode::Down => *cursor = terminal::step_cursor(*cursor, size, cells, 1, 0),
                KeyCode::Left => *cursor = terminal::step_cursor(*cursor, size, cells, 0, -1),
                KeyCode::Right => *cursor = terminal::step_cursor(*cursor, size, cells, 0, 1),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    session.select(*cursor, now);
                }
                KeyCode::Char('r') => session.restart(now),
                KeyCode::Char('n') => session.new_game(now),
                _ => {}
            }
        }
    }

    Ok(false)
}

fn draw_ui(
    stdout: &mut Stdout,
    session: &Session,
    cursor: usize,
    now: Instant,
) -> Result<(), String>
{
    let difficulty = session.difficulty();
    let round = session.round();
    let size = difficulty.grid_size();
    let revealed = round.revealed(now);
    let showing_answer = session.showing_answer(now);
    let phase = round.phase();

    let mut lines = Vec::new();
    lines.push("Mind Games - Path Memory".to_string());
    lines.push(format!(
        "Difficulty: {} ({}x{}, {} steps)",
        difficulty.name(),
        size,
        size,
        difficulty.path_length()
    ));
    lines.push(format!("Level: {}  Score: {}", session.level(), session.score()));
    lines.push(String::new());

    for row in 0..size {
        let mut line = String::new();
        for col in 0..size {
            let cell = row * size + col;
            let step = round.path().iter().position(|c| *c == cell);
            let (color, label) = if showing_answer && step.is_some() {
                (ANSWER, step.map(|s| format!("{:>2}", s + 1)).unwrap_or_default())
            } else if revealed.contains(&cell) {
                (LIT, "  ".to_string())
            } else if round.picked().contains(&cell) {
                (if step.is_some() { HIT } else { MISS }, "  ".to_string())
            } else {
                (IDLE, "  ".to_string())
            };
            let text = if cell == cursor && phase == Phase::AwaitingInput {
                format!("[{label}]")
            } else {
                format!(" {label} ")
            };
            line.push_str(&terminal::paint(&text, color));
            line.push(' ');
        }
        lines.push(line);
        lines.push(String::new());
    }

    lines.push(format!(
        "Progress: {}/{}",
        round.picked().len(),
        round.path().len()
    ));
    lines.push(status_line(phase, showing_answer).to_string());
    lines.push("Arrows move, Enter picks. r retries, n new game, Esc quits.".to_string());

    terminal::draw_lines(stdout, &lines)
}

fn status_line(phase: Phase, showing_answer: bool) -> &'static str
{
    match phase {
        Phase::Displaying => "Watch the path...",
        Phase::AwaitingInput => "Your turn! Repeat the path in order.",
        Phase::Resolved(Outcome::Completed) => "Path complete! Next level coming up.",
        Phase::Resolved(Outcome::Failed) if showing_answer => {
            "Wrong cell! This is the path you should have followed."
        }
        Phase::Resolved(Outcome::Failed) => "Press r to try again or n for a new game.",
    }
}

fn draw_summary(stdout: &mut Stdout, session: &Session, seconds: u64) -> Result<(), String>
{
    let lines = vec![
        "Game over".to_string(),
        String::new(),
        format!("Difficulty: {}", session.difficulty().name()),
        format!("Level reached: {}", session.level()),
        format!("Score: {}", session.score()),
        format!("Time: {}s", seconds),
        String::new(),
        "Press SPACE to exit.".to_string(),
    ];
    terminal::draw_lines(stdout, &lines)
}
