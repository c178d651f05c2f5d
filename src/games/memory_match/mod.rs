pub mod board;

use crate::games::player_name;
use crate::scores::ScoreRecord;
use crate::terminal::{self, Rgb, TICK_MS, TerminalGuard};
use board::{Board, Difficulty, Flip, Theme};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::io::Stdout;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How long a flipped pair stays visible before it is settled.
const REVEAL_DELAY: Duration = Duration::from_millis(600);

const FACE_DOWN: Rgb = Rgb::new(50, 60, 80);
const FACE_UP: Rgb = Rgb::new(60, 90, 160);
const MATCHED: Rgb = Rgb::new(0, 120, 60);

pub struct MemoryMatchConfig
{
    difficulty: Difficulty,
    theme: Theme,
    player: String,
}

impl MemoryMatchConfig
{
    pub fn from_args(args: &[String]) -> Result<Self, String>
    {
        let mut difficulty = Difficulty::Easy;
        let mut theme = Theme::Animals;
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
            } else if arg == "--theme" {
                let value = iter
                    .next()
                    .ok_or_else(|| "Expected value after --theme".to_string())?;
                theme = Theme::parse(value)?;
            } else if let Some(rest) = arg.strip_prefix("--theme=") {
                theme = Theme::parse(rest)?;
            } else if arg == "--name" {
                let value = iter
                    .next()
                    .ok_or_else(|| "Expected value after --name".to_string())?;
                name = Some(value.clone());
            } else if let Some(rest) = arg.strip_prefix("--name=") {
                name = Some(rest.to_string());
            } else {
                return Err(format!("Unknown match option '{arg}'"));
            }
        }

        Ok(Self {
            difficulty,
            theme,
            player: player_name(name),
        })
    }
}

pub fn run_with_config(config: MemoryMatchConfig) -> Result<Option<ScoreRecord>, String>
{
    let mut term = TerminalGuard::enter().map_err(|err| err.to_string())?;
    let mut rng = rand::thread_rng();
    let mut board = Board::new(board::generate_deck(
        &mut rng,
        config.difficulty,
        config.theme,
    ));
    let columns = config.difficulty.columns();
    let start = Instant::now();
    let mut finished_at: Option<Instant> = None;
    let mut pair_flipped_at: Option<Instant> = None;
    let mut cursor = 0usize;
    let mut last_tick = Instant::now();
    info!(
        difficulty = config.difficulty.name(),
        theme = config.theme.name(),
        "memory match started"
    );

    loop {
        let now = Instant::now();

        if let Some(at) = pair_flipped_at {
            if now.saturating_duration_since(at) >= REVEAL_DELAY {
                let resolution = board.resolve();
                debug!(?resolution, score = board.score(), "pair settled");
                pair_flipped_at = None;
            }
        }

        if board.is_complete() {
            finished_at = Some(now);
            break;
        }

        let quit = handle_input(&mut board, &mut cursor, columns, now, &mut pair_flipped_at)?;
        if quit {
            break;
        }

        if last_tick.elapsed() >= Duration::from_millis(TICK_MS) {
            let elapsed = now.saturating_duration_since(start);
            draw_ui(term.stdout(), &config, &board, cursor, elapsed)?;
            last_tick = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(1));
    }

    let seconds = finished_at
        .unwrap_or_else(Instant::now)
        .saturating_duration_since(start)
        .as_secs();
    let completed = board.is_complete();
    info!(completed, score = board.score(), moves = board.moves(), "memory match over");
    draw_summary(term.stdout(), &config, &board, seconds, completed)?;
    terminal::wait_for_space()?;

    if !completed || board.score() == 0 {
        return Ok(None);
    }
    Ok(Some(
        ScoreRecord::new(&config.player, board.score(), seconds, config.difficulty.name())
            .with_moves(board.moves()),
    ))
}

fn handle_input(
    board: &mut Board,
    cursor: &mut usize,
    columns: usize,
    now: Instant,
    pair_flipped_at: &mut Option<Instant>,
) -> Result<bool, String>
{
    let len = board.cards().len();
    while event::poll(Duration::from_millis(0)).map_err(|err| err.to_string())? {
        if let Event::Key(KeyEvent { code, modifiers, .. }) =
            event::read().map_err(|err| err.to_string())?
        {
            match code {
                KeyCode::Esc => return Ok(true),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(true)
                }
                KeyCode::Up => *cursor = terminal::step_cursor(*cursor, columns, len, -1, 0),
                KeyCode::Down => *cursor = terminal::step_cursor(*cursor, columns, len, 1, 0),
                KeyCode::Left => *cursor = terminal::step_cursor(*cursor, columns, len, 0, -1),
                KeyCode::Right => *cursor = terminal::step_cursor(*cursor, columns, len, 0, 1),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    if board.flip(*cursor) == Flip::Pair {
                        *pair_flipped_at = Some(now);
                    }
                }
                _ => {}
            }
        }
    }

    Ok(false)
}

fn draw_ui(
    stdout: &mut Stdout,
    config: &MemoryMatchConfig,
    board: &Board,
    cursor: usize,
    elapsed: Duration,
) -> Result<(), String>
{
    let matched = board.cards().iter().filter(|card| card.matched).count() / 2;
    let pairs = board.cards().len() / 2;

    let mut lines = Vec::new();
    lines.push("Mind Games - Memory Match".to_string());
    lines.push(format!(
        "Difficulty: {}  Theme: {}",
        config.difficulty.name(),
        config.theme
    ));
    lines.push(format!(
        "Score: {}  Moves: {}  Pairs: {}/{}  Time: {}s",
        board.score(),
        board.moves(),
        matched,
        pairs,
        elapsed.as_secs()
    ));
    lines.push(String::new());

    for (row_idx, row) in board.cards().chunks(config.difficulty.columns()).enumerate() {
        let mut line = String::new();
        for (col_idx, card) in row.iter().enumerate() {
            let index = row_idx * config.difficulty.columns() + col_idx;
            let (face, color) = if card.matched {
                (card.symbol, MATCHED)
            } else if card.face_up {
                (card.symbol, FACE_UP)
            } else {
                ("??", FACE_DOWN)
            };
            let text = if index == cursor {
                format!("[{face}]")
            } else {
                format!(" {face} ")
            };
            line.push_str(&terminal::paint(&text, color));
            line.push(' ');
        }
        lines.push(line);
        lines.push(String::new());
    }

    if board.has_pending_pair() {
        lines.push("Checking pair...".to_string());
    } else {
        lines.push("Find all the pairs!".to_string());
    }
    lines.push("Arrows move, Enter flips. Esc quits.".to_string());

    terminal::draw_lines(stdout, &lines)
}

fn draw_summary(
    stdout: &mut Stdout,
    config: &MemoryMatchConfig,
    board: &Board,
    seconds: u64,
    completed: bool,
) -> Result<(), String>
{
    let lines = vec![
        if completed {
            "All pairs found!".to_string()
        } else {
            "Game abandoned".to_string()
        },
        String::new(),
        format!("Difficulty: {}  Theme: {}", config.difficulty.name(), config.theme),
        format!("Score: {}", board.score()),
        format!("Moves: {}", board.moves()),
        format!("Time: {}s", seconds),
        String::new(),
        "Press SPACE to exit.".to_string(),
    ];
    terminal::draw_lines(stdout, &lines)
}
