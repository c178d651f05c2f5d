pub mod quiz;

use crate::games::player_name;
use crate::scores::ScoreRecord;
use crate::terminal::{self, TICK_MS, TerminalGuard};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use quiz::{Feedback, GAME_DURATION, Quiz};
use std::io::Stdout;
use std::time::{Duration, Instant};
use tracing::info;

/// The quiz always runs against the same clock; this labels its score rows.
const MODE: &str = "60s";

/// Largest answer is 144 (12 × 12), but leave room for a wrong guess.
const MAX_DIGITS: usize = 4;

pub struct MathConfig
{
    player: String,
}

impl MathConfig
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
                return Err(format!("Unknown math option '{arg}'"));
            }
        }

        Ok(Self {
            player: player_name(name),
        })
    }
}

pub fn run_with_config(config: MathConfig) -> Result<Option<ScoreRecord>, String>
{
    let mut term = TerminalGuard::enter().map_err(|err| err.to_string())?;
    let mut rng = rand::thread_rng();
    let start = Instant::now();
    let mut quiz = Quiz::new(&mut rng, start);
    let mut typed = String::new();
    let mut notice: Option<&'static str> = None;
    let mut last_tick = Instant::now();
    info!("math challenge started");

    let completed = loop {
        let now = Instant::now();
        quiz.tick(&mut rng, now);
        if quiz.is_over(now) {
            break true;
        }

        match handle_input(&mut typed)? {
            Input::Quit => break false,
            Input::Submit(text) => match text.parse::<u32>() {
                Ok(value) => {
                    notice = None;
                    quiz.answer(value, now);
                }
                Err(_) => notice = Some("Type a valid number!"),
            },
            Input::Nothing => {}
        }

        if last_tick.elapsed() >= Duration::from_millis(TICK_MS) {
            draw_ui(term.stdout(), &quiz, &typed, notice, now)?;
            last_tick = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(1));
    };

    let seconds = start.elapsed().as_secs().min(GAME_DURATION.as_secs());
    let misses = quiz.answered() - quiz.correct();
    info!(
        completed,
        score = quiz.score(),
        correct = quiz.correct(),
        answered = quiz.answered(),
        "math challenge over"
    );
    draw_summary(term.stdout(), &quiz, completed)?;
    terminal::wait_for_space()?;

    if quiz.score() == 0 {
        return Ok(None);
    }
    Ok(Some(
        ScoreRecord::new(&config.player, quiz.score(), seconds, MODE)
            .with_hits(quiz.correct(), misses),
    ))
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Input
{
    Nothing,
    Submit(String),
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
                KeyCode::Enter => return Ok(Input::Submit(std::mem::take(typed))),
                _ => {}
            }
        }
    }

    Ok(Input::Nothing)
}

fn draw_ui(
    stdout: &mut Stdout,
    quiz: &Quiz,
    typed: &str,
    notice: Option<&str>,
    now: Instant,
) -> Result<(), String>
{
    let mut lines = Vec::new();
    lines.push("Mind Games - Math Challenge".to_string());
    lines.push(format!(
        "Score: {}  Correct: {}/{}  Time left: {}s",
        quiz.score(),
        quiz.correct(),
        quiz.answered(),
        quiz.remaining(now).as_secs()
    ));
    lines.push(String::new());
    lines.push(format!("  {} = {}_", quiz.question(), typed));
    lines.push(String::new());

    match (quiz.feedback(), notice) {
        (Some(Feedback::Correct), _) => lines.push("Correct! +10 points".to_string()),
        (Some(Feedback::Wrong { answer }), _) => {
            lines.push(format!("Wrong! The answer was {answer}"));
        }
        (None, Some(notice)) => lines.push(notice.to_string()),
        (None, None) => lines.push(String::new()),
    }
    lines.push("Type the answer and press Enter. Esc quits.".to_string());

    terminal::draw_lines(stdout, &lines)
}

fn draw_summary(stdout: &mut Stdout, quiz: &Quiz, completed: bool) -> Result<(), String>
{
    let lines = vec![
        if completed {
            "Time's up!".to_string()
        } else {
            "Challenge abandoned".to_string()
        },
        String::new(),
        format!("Score: {}", quiz.score()),
        format!("Correct answers: {}/{}", quiz.correct(), quiz.answered()),
        String::new(),
        "Press SPACE to exit.".to_string(),
    ];
    terminal::draw_lines(stdout, &lines)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn config_accepts_both_name_forms()
    {
        let split = MathConfig::from_args(&["--name".to_string(), "eva".to_string()]).unwrap();
        assert_eq!(split.player, "eva");
        let inline = MathConfig::from_args(&["--name=lia".to_string()]).unwrap();
        assert_eq!(inline.player, "lia");
        assert!(MathConfig::from_args(&["--time=30".to_string()]).is_err());
    }
}
