pub mod field;

use crate::games::player_name;
use crate::scores::ScoreRecord;
use crate::terminal::{self, Rgb, TICK_MS, TerminalGuard};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use field::{COLUMNS, Difficulty, Field, GAME_DURATION, SLOT_COUNT, key_for_slot, slot_for_key};
use std::io::Stdout;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const EMPTY: Rgb = Rgb::new(40, 45, 60);

pub struct ReflexConfig
{
    difficulty: Difficulty,
    player: String,
}

impl ReflexConfig
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
                return Err(format!("Unknown reflex option '{arg}'"));
            }
        }

        Ok(Self {
            difficulty,
            player: player_name(name),
        })
    }
}

pub fn run_with_config(config: ReflexConfig) -> Result<Option<ScoreRecord>, String>
{
    let mut term = TerminalGuard::enter().map_err(|err| err.to_string())?;
    let mut rng = rand::thread_rng();
    let start = Instant::now();
    let mut field = Field::new(config.difficulty, start);
    let mut last_tick = Instant::now();
    info!(difficulty = config.difficulty.name(), "reflex started");

    let completed = loop {
        let now = Instant::now();
        field.tick(&mut rng, now);
        if field.is_over(now) {
            break true;
        }

        if handle_input(&mut field, now)? {
            break false;
        }

        if last_tick.elapsed() >= Duration::from_millis(TICK_MS) {
            draw_ui(term.stdout(), &field, now)?;
            last_tick = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(1));
    };

    let seconds = start.elapsed().as_secs().min(GAME_DURATION.as_secs());
    info!(
        completed,
        score = field.score(),
        hits = field.hits(),
        misses = field.misses(),
        "reflex over"
    );
    draw_summary(term.stdout(), &field, completed)?;
    terminal::wait_for_space()?;

    if field.score() == 0 {
        return Ok(None);
    }
    Ok(Some(
        ScoreRecord::new(&config.player, field.score(), seconds, config.difficulty.name())
            .with_hits(field.hits(), field.misses()),
    ))
}

fn handle_input(field: &mut Field, now: Instant) -> Result<bool, String>
{
    while event::poll(Duration::from_millis(0)).map_err(|err| err.to_string())? {
        if let Event::Key(KeyEvent { code, modifiers, .. }) =
            event::read().map_err(|err| err.to_string())?
        {
            match code {
                KeyCode::Esc => return Ok(true),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(true)
                }
                KeyCode::Char(ch) => {
                    if let Some(slot) = slot_for_key(ch) {
                        let press = field.press(slot, now);
                        debug!(slot, ?press, "slot pressed");
                    }
                }
                _ => {}
            }
        }
    }

    Ok(false)
}

fn draw_ui(stdout: &mut Stdout, field: &Field, now: Instant) -> Result<(), String>
{
    let mut lines = Vec::new();
    lines.push("Mind Games - Reflex".to_string());
    lines.push(format!(
        "Difficulty: {}  Time left: {}s",
        field.difficulty().name(),
        field.remaining(now).as_secs()
    ));
    lines.push(format!(
        "Score: {}  Hits: {}  Misses: {}  Accuracy: {}%",
        field.score(),
        field.hits(),
        field.misses(),
        field.accuracy()
    ));
    lines.push(String::new());

    let slots: Vec<usize> = (0..SLOT_COUNT).collect();
    for (row_idx, row) in slots.chunks(COLUMNS).enumerate() {
        let mut line = " ".repeat(row_idx * 2);
        for &slot in row {
            let key = key_for_slot(slot).unwrap_or(' ');
            let color = field
                .urgency(slot, now)
                .map(color_for_urgency)
                .unwrap_or(EMPTY);
            line.push_str(&terminal::paint(&format!("  {key}  "), color));
            line.push(' ');
        }
        lines.push(line);
        lines.push(String::new());
    }

    lines.push("Press the key of each lit target before it fades. Esc quits.".to_string());

    terminal::draw_lines(stdout, &lines)
}

/// Fresh targets are green and turn yellow, then orange, then red as they age.
fn color_for_urgency(progress: f32) -> Rgb
{
    let progress = progress.clamp(0.0, 1.0);
    let green = Rgb::new(0, 200, 0);
    let yellow = Rgb::new(230, 210, 0);
    let orange = Rgb::new(240, 120, 0);
    let red = Rgb::new(220, 0, 0);

    if progress < 0.33 {
        lerp_color(green, yellow, progress / 0.33)
    } else if progress < 0.66 {
        lerp_color(yellow, orange, (progress - 0.33) / 0.33)
    } else {
        lerp_color(orange, red, (progress - 0.66) / 0.34)
    }
}

fn lerp_color(start: Rgb, end: Rgb, t: f32) -> Rgb
{
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Rgb::new(mix(start.r, end.r), mix(start.g, end.g), mix(start.b, end.b))
}

fn draw_summary(stdout: &mut Stdout, field: &Field, completed: bool) -> Result<(), String>
{
    let lines = vec![
        if completed {
            "Time's up!".to_string()
        } else {
            "Game abandoned".to_string()
        },
        String::new(),
        format!("Difficulty: {}", field.difficulty().name()),
        format!("Score: {}", field.score()),
        format!("Hits: {}  Misses: {}", field.hits(), field.misses()),
        format!("Accuracy: {}%", field.accuracy()),
        String::new(),
        "Press SPACE to exit.".to_string(),
    ];
    terminal::draw_lines(stdout, &lines)
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn args(values: &[&str]) -> Vec<String>
    {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn config_parses_difficulty_and_name()
    {
        let config = ReflexConfig::from_args(&args(&["--difficulty", "ultra", "--name=zé"])).unwrap();
        assert_eq!(config.difficulty, Difficulty::Ultra);
        assert_eq!(config.player, "zé");
        assert_eq!(ReflexConfig::from_args(&[]).unwrap().difficulty, Difficulty::Easy);
    }

    #[test]
    fn config_rejects_bad_input()
    {
        assert!(ReflexConfig::from_args(&args(&["--difficulty=insane"])).is_err());
        assert!(ReflexConfig::from_args(&args(&["--targets=3"])).is_err());
    }

    #[test]
    fn urgency_colour_runs_green_to_red()
    {
        assert_eq!(color_for_urgency(0.0), Rgb::new(0, 200, 0));
        assert_eq!(color_for_urgency(1.0), Rgb::new(220, 0, 0));
        assert_eq!(color_for_urgency(-3.0), color_for_urgency(0.0));
        let middle = color_for_urgency(0.5);
        assert!(middle.r > 200 && middle.b == 0, "{middle:?}");
    }

    #[test]
    fn difficulty_table_tightens()
    {
        let table: Vec<_> = Difficulty::ALL
            .iter()
            .map(|d| (d.spawn_interval().as_millis(), d.lifetime().as_millis(), d.targets_per_wave()))
            .collect();
        assert_eq!(
            table,
            vec![(1500, 3000, 1), (1000, 2000, 2), (700, 1500, 3), (400, 800, 4)]
        );
    }
}
