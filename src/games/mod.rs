pub mod math;
pub mod memory_match;
pub mod path_memory;
pub mod reflex;
pub mod sequence;
pub mod snake;

use std::env;

const DEFAULT_PLAYER: &str = "Player";

pub struct GameDescriptor
{
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub fn registry() -> Vec<GameDescriptor>
{
    vec![
        GameDescriptor {
            name: "path",
            title: "Path Memory",
            description: "Watch a path light up on the grid, then repeat it",
        },
        GameDescriptor {
            name: "match",
            title: "Memory Match",
            description: "Flip cards two at a time and find every pair",
        },
        GameDescriptor {
            name: "snake",
            title: "Snake",
            description: "Steer the snake to the food without hitting walls or yourself",
        },
        GameDescriptor {
            name: "sequence",
            title: "Sequence Recall",
            description: "Memorize a row of numbers and type it back",
        },
        GameDescriptor {
            name: "math",
            title: "Math Challenge",
            description: "Answer as many sums as you can in 60 seconds",
        },
        GameDescriptor {
            name: "reflex",
            title: "Reflex",
            description: "Press the key of each target before it fades",
        },
    ]
}

pub fn find(name: &str) -> Option<GameDescriptor>
{
    registry()
        .into_iter()
        .find(|game| game.name.eq_ignore_ascii_case(name))
}

/// `--name` wins, then `USER`/`USERNAME`, then a generic placeholder.
pub fn player_name(explicit: Option<String>) -> String
{
    explicit
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .or_else(|| env::var("USER").ok().filter(|name| !name.is_empty()))
        .or_else(|| env::var("USERNAME").ok().filter(|name| !name.is_empty()))
        .unwrap_or_else(|| DEFAULT_PLAYER.to_string())
}
