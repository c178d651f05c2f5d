use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

const MATCH_POINTS: u32 = 10;
const MISS_PENALTY: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty
{
    VeryEasy,
    Easy,
    Medium,
    Hard,
    Insane,
}

impl Difficulty
{
    pub const ALL: [Difficulty; 5] = [
        Difficulty::VeryEasy,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Insane,
    ];

    pub fn card_count(self) -> usize
    {
        match self {
            Difficulty::VeryEasy => 4,
            Difficulty::Easy => 8,
            Difficulty::Medium => 12,
            Difficulty::Hard => 16,
            Difficulty::Insane => 20,
        }
    }

    pub fn columns(self) -> usize
    {
        match self {
            Difficulty::VeryEasy => 2,
            Difficulty::Insane => 5,
            _ => 4,
        }
    }

    pub fn name(self) -> &'static str
    {
        match self {
            Difficulty::VeryEasy => "very-easy",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Insane => "insane",
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

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme
{
    Animals,
    Fruits,
    Sports,
}

impl Theme
{
    pub const ALL: [Theme; 3] = [Theme::Animals, Theme::Fruits, Theme::Sports];

    pub fn symbols(self) -> &'static [&'static str; 10]
    {
        match self {
            Theme::Animals => &["🐶", "🐱", "🐰", "🦊", "🐻", "🐼", "🦁", "🐸", "🐵", "🐧"],
            Theme::Fruits => &["🍎", "🍌", "🍇", "🍉", "🍊", "🥝", "🍓", "🍍", "🥭", "🍒"],
            Theme::Sports => &["⚽", "🏀", "🎾", "🏈", "🏐", "🥏", "🥎", "🏒", "🏓", "🤿"],
        }
    }

    pub fn name(self) -> &'static str
    {
        match self {
            Theme::Animals => "animals",
            Theme::Fruits => "fruits",
            Theme::Sports => "sports",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String>
    {
        Self::ALL
            .into_iter()
            .find(|theme| theme.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("Unknown theme '{value}'. Expected animals, fruits or sports"))
    }
}

impl fmt::Display for Theme
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card
{
    pub symbol: &'static str,
    pub face_up: bool,
    pub matched: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flip
{
    Ignored,
    First,
    /// Two cards are face up and wait for `Board::resolve`.
    Pair,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution
{
    Match,
    Miss,
}

/// Paired tiles, shuffled. Symbols come from the front of the theme list.
pub fn generate_deck(rng: &mut impl Rng, difficulty: Difficulty, theme: Theme) -> Vec<Card>
{
    let pairs = difficulty.card_count() / 2;
    let mut deck: Vec<Card> = theme
        .symbols()
        .iter()
        .take(pairs)
        .flat_map(|symbol| [*symbol, *symbol])
        .map(|symbol| Card {
            symbol,
            face_up: false,
            matched: false,
        })
        .collect();
    deck.shuffle(rng);
    deck
}

pub struct Board
{
    cards: Vec<Card>,
    pending: Vec<usize>,
    moves: u32,
    score: u32,
}

impl Board
{
    pub fn new(cards: Vec<Card>) -> Self
    {
        Self {
            cards,
            pending: Vec::with_capacity(2),
            moves: 0,
            score: 0,
        }
    }

    pub fn cards(&self) -> &[Card]
    {
        &self.cards
    }

    pub fn moves(&self) -> u32
    {
        self.moves
    }

    pub fn score(&self) -> u32
    {
        self.score
    }

    pub fn has_pending_pair(&self) -> bool
    {
        self.pending.len() == 2
    }

    pub fn is_complete(&self) -> bool
    {
        !self.cards.is_empty() && self.cards.iter().all(|card| card.matched)
    }

    pub fn flip(&mut self, index: usize) -> Flip
    {
        if self.has_pending_pair() || self.is_complete() {
            return Flip::Ignored;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return Flip::Ignored;
        };
        if card.face_up || card.matched {
            return Flip::Ignored;
        }

        card.face_up = true;
        self.pending.push(index);
        if self.pending.len() == 2 {
            self.moves += 1;
            Flip::Pair
        } else {
            Flip::First
        }
    }

    /// Settles the face-up pair. `None` when no pair is waiting.
    pub fn resolve(&mut self) -> Option<Resolution>
    {
        if !self.has_pending_pair() {
            return None;
        }
        let (a, b) = (self.pending[0], self.pending[1]);
        self.pending.clear();

        if self.cards[a].symbol == self.cards[b].symbol {
            self.cards[a].matched = true;
            self.cards[b].matched = true;
            self.score += MATCH_POINTS;
            Some(Resolution::Match)
        } else {
            self.cards[a].face_up = false;
            self.cards[b].face_up = false;
            self.score = self.score.saturating_sub(MISS_PENALTY);
            Some(Resolution::Miss)
        }
    }
}
