use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

pub const SCORES_ENV: &str = "MIND_GAMES_SCORES";
const DEFAULT_SCORES_FILE: &str = "mind-games-scores.json";

/// Entries kept per game.
pub const TABLE_SIZE: usize = 5;

#[derive(Debug, Error)]
pub enum ScoreError
{
    #[error("failed to access score file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("score file {} is not valid: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord
{
    pub name: String,
    pub score: u32,
    pub seconds: u64,
    pub difficulty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moves: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub misses: Option<u32>,
    /// Unix seconds.
    pub recorded_at: u64,
}

impl ScoreRecord
{
    pub fn new(name: &str, score: u32, seconds: u64, difficulty: &str) -> Self
    {
        let recorded_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        Self {
            name: name.to_string(),
            score,
            seconds,
            difficulty: difficulty.to_string(),
            level: None,
            moves: None,
            hits: None,
            misses: None,
            recorded_at,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self
    {
        self.level = Some(level);
        self
    }

    pub fn with_moves(mut self, moves: u32) -> Self
    {
        self.moves = Some(moves);
        self
    }

    pub fn with_hits(mut self, hits: u32, misses: u32) -> Self
    {
        self.hits = Some(hits);
        self.misses = Some(misses);
        self
    }

    /// Whole-percent hit rate, when hits were recorded at all.
    pub fn accuracy(&self) -> Option<u32>
    {
        let hits = self.hits?;
        let total = hits + self.misses.unwrap_or(0);
        if total == 0 {
            return Some(0);
        }
        Some(((hits as f64 / total as f64) * 100.0).round() as u32)
    }
}

/// Best results for one game, highest score first, faster time on ties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreBoard
{
    records: Vec<ScoreRecord>,
}

impl ScoreBoard
{
    pub fn records(&self) -> &[ScoreRecord]
    {
        &self.records
    }

    /// Returns the 1-based rank when the record made the table.
    pub fn submit(&mut self, record: ScoreRecord) -> Option<usize>
    {
        let position = self
            .records
            .iter()
            .position(|existing| {
                record.score > existing.score
                    || (record.score == existing.score && record.seconds < existing.seconds)
            })
            .unwrap_or(self.records.len());

        if position >= TABLE_SIZE {
            return None;
        }
        self.records.insert(position, record);
        self.records.truncate(TABLE_SIZE);
        Some(position + 1)
    }
}

pub struct ScoreStore
{
    path: PathBuf,
    boards: BTreeMap<String, ScoreBoard>,
}

impl ScoreStore
{
    pub fn default_path() -> PathBuf
    {
        env::var_os(SCORES_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCORES_FILE))
    }

    pub fn empty(path: impl Into<PathBuf>) -> Self
    {
        Self {
            path: path.into(),
            boards: BTreeMap::new(),
        }
    }

    /// A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ScoreError>
    {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no score file yet");
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(ScoreError::Io { path, source }),
        };
        let mut boards: BTreeMap<String, ScoreBoard> = match serde_json::from_str(&text) {
            Ok(boards) => boards,
            Err(source) => return Err(ScoreError::Json { path, source }),
        };
        for board in boards.values_mut() {
            board.records.sort_by(|a, b| b.score.cmp(&a.score).then(a.seconds.cmp(&b.seconds)));
            board.records.truncate(TABLE_SIZE);
        }
        Ok(Self { path, boards })
    }

    pub fn path(&self) -> &Path
    {
        &self.path
    }

    pub fn board(&self, game: &str) -> Option<&ScoreBoard>
    {
        self.boards.get(game)
    }

    pub fn submit(&mut self, game: &str, record: ScoreRecord) -> Option<usize>
    {
        self.boards.entry(game.to_string()).or_default().submit(record)
    }

    /// Writes to a sibling temp file, then renames over the real one.
    pub fn save(&self) -> Result<(), ScoreError>
    {
        let io_err = |source: io::Error| ScoreError::Io {
            path: self.path.clone(),
            source,
        };
        let text = serde_json::to_string_pretty(&self.boards).map_err(|source| {
            ScoreError::Json {
                path: self.path.clone(),
                source,
            }
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), "scores saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use rand::Rng;

    fn record(name: &str, score: u32, seconds: u64) -> ScoreRecord
    {
        ScoreRecord::new(name, score, seconds, "easy")
    }

    fn scratch_file() -> PathBuf
    {
        let id = rand::thread_rng().gen_range(0..u64::MAX);
        env::temp_dir()
            .join(format!("mind-games-test-{id:x}"))
            .join("scores.json")
    }

    #[test]
    fn board_orders_by_score_then_time()
    {
        let mut board = ScoreBoard::default();
        assert_eq!(board.submit(record("a", 20, 50)), Some(1));
        assert_eq!(board.submit(record("b", 40, 90)), Some(1));
        assert_eq!(board.submit(record("c", 20, 30)), Some(2));
        assert_eq!(board.submit(record("d", 20, 30)), Some(3));

        let names: Vec<&str> = board.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "d", "a"]);
    }

    #[test]
    fn board_keeps_top_five()
    {
        let mut board = ScoreBoard::default();
        for score in [10, 20, 30, 40, 50] {
            board.submit(record("p", score, 10));
        }
        assert_eq!(board.submit(record("low", 5, 1)), None);
        assert_eq!(board.submit(record("high", 45, 1)), Some(2));
        assert_eq!(board.records().len(), TABLE_SIZE);
        assert_eq!(board.records().last().map(|r| r.score), Some(20));
    }

    #[test]
    fn accuracy_rounds_to_whole_percent()
    {
        assert_eq!(record("a", 10, 1).accuracy(), None);
        assert_eq!(record("a", 10, 1).with_hits(2, 1).accuracy(), Some(67));
        assert_eq!(record("a", 0, 1).with_hits(0, 0).accuracy(), Some(0));
    }

    #[test]
    fn records_without_hit_counts_still_load()
    {
        let json = r#"{"name":"ana","score":10,"seconds":5,"difficulty":"easy","recorded_at":1}"#;
        let record: ScoreRecord = serde_json::from_str(json).unwrap();
        assert_eq!((record.hits, record.misses, record.level), (None, None, None));
    }

    #[test]
    fn missing_file_loads_empty()
    {
        let store = ScoreStore::load(scratch_file()).unwrap();
        assert!(store.board("path").is_none());
    }

    #[test]
    fn store_survives_a_save_and_load()
    {
        let path = scratch_file();
        let mut store = ScoreStore::empty(&path);
        store.submit("path", record("ana", 30, 42).with_level(3));
        store.submit("match", record("bia", 60, 80).with_moves(9));
        store.submit("reflex", record("caio", 70, 30).with_hits(7, 3));
        store.save().unwrap();

        let loaded = ScoreStore::load(&path).unwrap();
        let path_board = loaded.board("path").unwrap();
        assert_eq!(path_board.records()[0].name, "ana");
        assert_eq!(path_board.records()[0].level, Some(3));
        assert_eq!(path_board.records()[0].moves, None);
        assert_eq!(loaded.board("match").unwrap().records()[0].moves, Some(9));
        let reflex = &loaded.board("reflex").unwrap().records()[0];
        assert_eq!((reflex.hits, reflex.misses), (Some(7), Some(3)));

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("\"moves\": null"));

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn malformed_file_is_an_error()
    {
        let path = scratch_file();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let err = ScoreStore::load(&path).err().unwrap();
        assert!(matches!(err, ScoreError::Json { .. }));
        assert!(err.to_string().contains("scores.json"));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
