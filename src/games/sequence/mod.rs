pub mod state;

use crate::games::player_name;
use crate::scores::ScoreRecord;
use crate::terminal::{self, TICK_MS, TerminalGuard};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use state::{Entry, Game, Phase};
use std::io::Stdout;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Sequence recall has one ruleset; this labels its score table rows.
const MODE: &str = "classic";

/// Longest number the player can type; ranges top out at two digits.
const MAX_DIGITS: usize = 2;

pub struct SequenceConfig
{
    player: String,
}

impl SequenceConfig
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
                return Err(format!("Unknown sequence option '{arg}'"));
            }
        }

        Ok(Self {
            player: player_name(name),
        })
    }
}

pub fn run_with_config(config: SequenceConfig) -> Result<Option<ScoreRecord>, String>
{
    let mut term = TerminalGuard::enter().map_err(|err| err.to_string())?;
    let mut rng = rand::thread_rng();
    let start = Instant::now();
    let mut game = Game::new(&mut rng, start);
    let mut typed = String::new();
    let mut last_entry = Entry::Ignored;
    let mut best: Option<(u32, u32)> = None;
    let mut last_tick = Instant::now();
    info!("sequence recall started");

    loop {
        let now = Instant::now();
        game.tick(&mut rng, now);

        match handle_input(&mut typed)? {
            Input::Quit => break,
            Input::Submit(value) => {
                last_entry = game.enter(value, now);
                debug!(?last_entry, level = game.level(), "number entered");
                if game.phase() == Phase::Over {
                    best = Some(best_of(best, game.score(), game.level()));
                }
            }
            Input::Restart if game.phase() == Phase::Over => {
                game.restart(&mut rng, now);
                last_entry = Entry::Ignored;
            }
            _ => {}
        }

        if last_tick.elapsed() >= Duration::from_millis(TICK_MS) {
            draw_ui(term.stdout(), &game, &typed, last_entry)?;
            last_tick = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(1));
    }

    if game.phase() != Phase::Over {
        best = Some(best_of(best, game.score(), game.level()));
    }
    let seconds = start.elapsed().as_secs();
    let (score, level) = best.unwrap_or_default();
    draw_summary(term.stdout(), score, level, seconds)?;
    terminal::wait_for_space()?;

    if score == 0 {
        return Ok(None);
    }
    Ok(Some(
        ScoreRecord::new(&config.player, score, seconds, MODE).with_level(level),
    ))
}

/// Higher score wins; a tie goes to the higher level.
fn best_of(best: Option<(u32, u32)>, score: u32, level: u32) -> (u32, u32)
{
    match best {
        Some(current) if current >= (score, level) => current,
        _ => (score, level),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Input
{
    Nothing,
    Submit(u32),
    Restart,
    Quit,
}

fn handle_input(typed: &mut String) -> Result<Input, String>
{
    while event::poll(Duration::from_millis(0)).map_err(|err| err.to_string())? {
        if let Event::Key(KeyEvent { code, modifiers, .. }) =
            event::read().map_err(|err| err.to_string())?
        {
            match code {
                KeyCode::Esc => return Ok(Input::Quit),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(Input::Quit)
                }
                KeyCode::Char(ch) if ch.is_ascii_digit() && typed.len() < MAX_DIGITS => {
                    typed.push(ch);
                }
                KeyCode::Backspace => {
                    typed.pop();
                }
                KeyCode::Enter => {
                    let value = typed.parse::<u32>().ok();
                    typed.clear();
                    if let Some(value) = value {
                        return Ok(Input::Submit(value));
                    }
                }
                KeyCode::Char(' ') => return Ok(Input::Restart),
                _ => {}
            }
        }
    }

    Ok(Input::Nothing)
}

fn draw_ui(stdout: &mut Stdout, game: &Game, typed: &str, last_entry: Entry) -> Result<(), String>
{
    let config = game.config();
    let mut lines = Vec::new();
    lines.push("Mind Games - Sequence Recall".to_string());
    lines.push(format!(
        "Level: {}  Score: {}  Numbers: 1-{}",
        game.level(),
        game.score(),
        config.range
    ));
    lines.push(String::new());

    let shown: Vec<String> = match game.phase() {
        Phase::Showing | Phase::Over => game.sequence().iter().map(u32::to_string).collect(),
        Phase::Entering | Phase::Cleared => {
            game.entered().iter().map(u32::to_string).collect()
        }
    };
    lines.push(format!("  {}", shown.join("  ")));
    lines.push(String::new());

    match game.phase() {
        Phase::Showing => lines.push("Memorize the sequence...".to_string()),
        Phase::Entering => {
            lines.push(format!(
                "Your turn! Number {} of {}: {}_",
                game.entered().len() + 1,
                game.sequence().len(),
                typed
            ));
        }
        Phase::Cleared => {
            if let Entry::Cleared { points } = last_entry {
                lines.push(format!("Level complete! +{points} points"));
            }
        }
        Phase::Over => {
            if let Entry::Wrong { expected } = last_entry {
                lines.push(format!("Wrong! The next number was {expected}."));
            }
            lines.push("Press SPACE to play again.".to_string());
        }
    }
    lines.push("Type a number and press Enter. Esc quits.".to_string());

    terminal::draw_lines(stdout, &lines)
}

fn draw_summary(stdout: &mut Stdout, score: u32, level: u32, seconds: u64) -> Result<(), String>
{
    let lines = vec![
        "Sequence recall over".to_string(),
        String::new(),
        format!("Best score: {}", score),
        format!("Level reached: {}", level),
        format!("Time: {}s", seconds),
        String::new(),
        "Press SPACE to exit.".to_string(),
    ];
    terminal::draw_lines(stdout, &lines)
}
