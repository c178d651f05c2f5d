mod games;
mod logging;
mod scores;
mod terminal;

use scores::{ScoreRecord, ScoreStore};
use std::env;
use tracing::{info, warn};

fn main()
{
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String>
{
    logging::init()?;

    let mut args = env::args().skip(1);
    let command = args.next();
    let rest: Vec<String> = args.collect();
    match command.as_deref() {
        None => interactive_menu(),
        Some("list") => {
            list_games();
            Ok(())
        }
        Some("scores") => show_scores(rest.first().map(String::as_str)),
        Some(name) if games::find(name).is_some_and(|game| game.name == name) => {
            run_game(name, &rest)
        }
        Some("-h") | Some("--help") => {
            print_help();
            Ok(())
        }
        Some(other) => Err(format!("Unknown command '{other}'. Run with --help.")),
    }
}

fn run_game(name: &str, args: &[String]) -> Result<(), String>
{
    info!(game = name, "starting game");
    let record = match name {
        "path" => {
            let config = games::path_memory::PathMemoryConfig::from_args(args)?;
            games::path_memory::run_with_config(config)?
        }
        "match" => {
            let config = games::memory_match::MemoryMatchConfig::from_args(args)?;
            games::memory_match::run_with_config(config)?
        }
        "snake" => {
            let config = games::snake::SnakeConfig::from_args(args)?;
            games::snake::run_with_config(config)?
        }
        "sequence" => {
            let config = games::sequence::SequenceConfig::from_args(args)?;
            games::sequence::run_with_config(config)?
        }
        "math" => {
            let config = games::math::MathConfig::from_args(args)?;
            games::math::run_with_config(config)?
        }
        "reflex" => {
            let config = games::reflex::ReflexConfig::from_args(args)?;
            games::reflex::run_with_config(config)?
        }
        _ => return Err(format!("Unknown game '{name}'. Run with --help.")),
    };

    match record {
        Some(record) => submit_score(name, record),
        None => Ok(()),
    }
}

fn open_store() -> ScoreStore
{
    let path = ScoreStore::default_path();
    match ScoreStore::load(&path) {
        Ok(store) => store,
        Err(err) => {
            warn!(error = %err, "starting with an empty score table");
            eprintln!("Warning: couldn't read high scores ({err}). Starting a fresh table.");
            ScoreStore::empty(path)
        }
    }
}

fn submit_score(game: &str, record: ScoreRecord) -> Result<(), String>
{
    let mut store = open_store();
    let score = record.score;
    match store.submit(game, record) {
        Some(rank) => {
            store.save().map_err(|err| err.to_string())?;
            info!(game, score, rank, "high score saved");
            println!("New high score! #{rank} with {score} points.");
        }
        None => println!("Final score: {score}. Not enough for the top table this time."),
    }
    println!("Scores are kept in {}", store.path().display());
    Ok(())
}

fn show_scores(game: Option<&str>) -> Result<(), String>
{
    let selected = match game {
        Some(name) => vec![
            games::find(name).ok_or_else(|| format!("Unknown game '{name}'. Run with --help."))?,
        ],
        None => games::registry(),
    };

    let store = open_store();
    for game in selected {
        println!("{} high scores", game.title);
        let records = store.board(game.name).map(|board| board.records()).unwrap_or(&[]);
        if records.is_empty() {
            println!("  (none yet)");
        }
        for (idx, record) in records.iter().enumerate() {
            let detail = score_detail(record);
            println!(
                "  {}. {:<12} {:>5} pts  {:>4}s  {:<9} {}",
                idx + 1,
                record.name,
                record.score,
                record.seconds,
                record.difficulty,
                detail
            );
        }
        println!();
    }
    Ok(())
}

fn score_detail(record: &ScoreRecord) -> String
{
    if let Some(level) = record.level {
        return format!("level {level}");
    }
    if let Some(moves) = record.moves {
        return format!("{moves} moves");
    }
    match (record.hits, record.accuracy()) {
        (Some(hits), Some(accuracy)) => format!("{hits} hits, {accuracy}%"),
        _ => String::new(),
    }
}

fn interactive_menu() -> Result<(), String>
{
    let registry = games::registry();
    println!("Mind Games");
    println!();
    println!("Select a game:");
    for (idx, game) in registry.iter().enumerate() {
        println!("  {}. {} - {}", idx + 1, game.title, game.description);
    }
    println!("  s. High scores");
    println!();
    print!("Enter number or name (default 1, q to quit): ");
    std::io::Write::flush(&mut std::io::stdout())
        .map_err(|err| format!("Failed to flush stdout: {err}"))?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .map_err(|err| format!("Failed to read input: {err}"))?;
    let choice = input.trim();

    if choice.is_empty() {
        return run_game(registry[0].name, &[]);
    }
    if choice.eq_ignore_ascii_case("q") {
        return Ok(());
    }
    if choice.eq_ignore_ascii_case("s") {
        return show_scores(None);
    }
    if let Ok(index) = choice.parse::<usize>() {
        if index >= 1 && index <= registry.len() {
            return run_game(registry[index - 1].name, &[]);
        }
    }

    match games::find(choice) {
        Some(game) => run_game(game.name, &[]),
        None => Err("Invalid selection.".to_string()),
    }
}

fn list_games()
{
    println!("Available games:");
    for game in games::registry() {
        println!("  {:<8} - {}", game.name, game.description);
    }
}

fn print_help()
{
    println!("mind-games");
    println!("\nUsage:");
    println!("  mind-games list");
    println!("  mind-games path [--difficulty=easy|medium|hard|insane|ultra] [--name=NAME]");
    println!("  mind-games match [--difficulty=very-easy|easy|medium|hard|insane]");
    println!("                   [--theme=animals|fruits|sports] [--name=NAME]");
    println!("  mind-games snake [--name=NAME]");
    println!("  mind-games sequence [--name=NAME]");
    println!("  mind-games math [--name=NAME]");
    println!("  mind-games reflex [--difficulty=easy|medium|hard|ultra] [--name=NAME]");
    println!("  mind-games scores [path|match|snake|sequence|math|reflex]");
    println!("\nNotes:");
    println!("  High scores go to ./mind-games-scores.json; set {} to move them.", scores::SCORES_ENV);
    println!("  Set {} to a file path to write logs (filter with RUST_LOG).", logging::LOG_ENV);
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn score_detail_picks_the_recorded_stat()
    {
        let base = ScoreRecord::new("ana", 40, 30, "easy");
        assert_eq!(score_detail(&base.clone().with_level(4)), "level 4");
        assert_eq!(score_detail(&base.clone().with_moves(12)), "12 moves");
        assert_eq!(score_detail(&base.clone().with_hits(3, 1)), "3 hits, 75%");
        assert_eq!(score_detail(&base), "");
    }
}
