use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

pub const GAME_DURATION: Duration = Duration::from_secs(60);
pub const FEEDBACK_DELAY: Duration = Duration::from_secs(1);
const POINTS_PER_ANSWER: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation
{
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation
{
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    pub fn symbol(self) -> char
    {
        match self {
            Operation::Add => '+',
            Operation::Subtract => '-',
            Operation::Multiply => '×',
            Operation::Divide => '÷',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Question
{
    pub left: u32,
    pub right: u32,
    pub operation: Operation,
    pub answer: u32,
}

impl fmt::Display for Question
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{} {} {}", self.left, self.operation.symbol(), self.right)
    }
}

/// One question with a whole, non-negative answer.
///
/// Sums use operands in 1..=50, differences a minuend in 20..=119 and a smaller
/// subtrahend, products a times table up to 12, and quotients are built from
/// the answer so the division is exact.
pub fn generate_question(rng: &mut impl Rng) -> Question
{
    let operation = *Operation::ALL.choose(rng).unwrap_or(&Operation::Add);
    let (left, right, answer) = match operation {
        Operation::Add => {
            let (a, b) = (rng.gen_range(1..=50), rng.gen_range(1..=50));
            (a, b, a + b)
        }
        Operation::Subtract => {
            let a = rng.gen_range(20..=119);
            let b = rng.gen_range(1..=a);
            (a, b, a - b)
        }
        Operation::Multiply => {
            let (a, b) = (rng.gen_range(1..=12), rng.gen_range(1..=12));
            (a, b, a * b)
        }
        Operation::Divide => {
            let divisor = rng.gen_range(1..=10);
            let quotient = rng.gen_range(1..=10);
            (divisor * quotient, divisor, quotient)
        }
    };
    Question {
        left,
        right,
        operation,
        answer,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback
{
    Correct,
    Wrong { answer: u32 },
}

/// A timed run of questions. Each answer is shown for a moment before the
/// next question appears.
pub struct Quiz
{
    question: Question,
    score: u32,
    correct: u32,
    answered: u32,
    started_at: Instant,
    feedback: Option<(Feedback, Instant)>,
}

impl Quiz
{
    pub fn new(rng: &mut impl Rng, now: Instant) -> Self
    {
        Self {
            question: generate_question(rng),
            score: 0,
            correct: 0,
            answered: 0,
            started_at: now,
            feedback: None,
        }
    }

    pub fn question(&self) -> Question
    {
        self.question
    }

    pub fn score(&self) -> u32
    {
        self.score
    }

    pub fn correct(&self) -> u32
    {
        self.correct
    }

    pub fn answered(&self) -> u32
    {
        self.answered
    }

    pub fn feedback(&self) -> Option<Feedback>
    {
        self.feedback.map(|(feedback, _)| feedback)
    }

    pub fn remaining(&self, now: Instant) -> Duration
    {
        GAME_DURATION.saturating_sub(now.saturating_duration_since(self.started_at))
    }

    pub fn is_over(&self, now: Instant) -> bool
    {
        self.remaining(now).is_zero()
    }

    pub fn tick(&mut self, rng: &mut impl Rng, now: Instant)
    {
        if let Some((_, shown_at)) = self.feedback {
            if now.saturating_duration_since(shown_at) >= FEEDBACK_DELAY {
                self.feedback = None;
                self.question = generate_question(rng);
            }
        }
    }

    /// `None` while feedback is showing or once time is up.
    pub fn answer(&mut self, value: u32, now: Instant) -> Option<Feedback>
    {
        if self.feedback.is_some() || self.is_over(now) {
            return None;
        }

        self.answered += 1;
        let feedback = if value == self.question.answer {
            self.correct += 1;
            self.score += POINTS_PER_ANSWER;
            Feedback::Correct
        } else {
            Feedback::Wrong {
                answer: self.question.answer,
            }
        };
        debug!(question = %self.question, value, ?feedback, "answer checked");
        self.feedback = Some((feedback, now));
        Some(feedback)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn quiz_on(question: Question, start: Instant) -> Quiz
    {
        Quiz {
            question,
            score: 0,
            correct: 0,
            answered: 0,
            started_at: start,
            feedback: None,
        }
    }

    fn sum(left: u32, right: u32) -> Question
    {
        Question {
            left,
            right,
            operation: Operation::Add,
            answer: left + right,
        }
    }

    #[test]
    fn questions_have_whole_answers_in_range()
    {
        let mut rng = StdRng::seed_from_u64(21);
        let mut seen = Vec::new();
        for _ in 0..2000 {
            let q = generate_question(&mut rng);
            let recomputed = match q.operation {
                Operation::Add => {
                    assert!((1..=50).contains(&q.left) && (1..=50).contains(&q.right));
                    q.left + q.right
                }
                Operation::Subtract => {
                    assert!((20..=119).contains(&q.left) && (1..=q.left).contains(&q.right));
                    q.left - q.right
                }
                Operation::Multiply => {
                    assert!(q.left <= 12 && q.right <= 12);
                    q.left * q.right
                }
                Operation::Divide => {
                    assert!((1..=10).contains(&q.right));
                    assert_eq!(q.left % q.right, 0, "{q} is not exact");
                    q.left / q.right
                }
            };
            assert_eq!(q.answer, recomputed, "{q}");
            if !seen.contains(&q.operation) {
                seen.push(q.operation);
            }
        }
        assert_eq!(seen.len(), Operation::ALL.len());
    }

    #[test]
    fn question_renders_with_symbol()
    {
        let q = Question {
            left: 12,
            right: 4,
            operation: Operation::Divide,
            answer: 3,
        };
        assert_eq!(q.to_string(), "12 ÷ 4");
    }

    #[test]
    fn right_and_wrong_answers()
    {
        let mut rng = StdRng::seed_from_u64(22);
        let start = Instant::now();
        let mut quiz = quiz_on(sum(2, 3), start);
        assert_eq!(quiz.answer(5, start), Some(Feedback::Correct));
        assert_eq!(quiz.answer(5, start), None);

        quiz.tick(&mut rng, start + FEEDBACK_DELAY);
        assert!(quiz.feedback().is_none());
        let expected = quiz.question().answer;
        assert_eq!(
            quiz.answer(expected + 1, start + FEEDBACK_DELAY),
            Some(Feedback::Wrong { answer: expected })
        );
        assert_eq!((quiz.score(), quiz.correct(), quiz.answered()), (10, 1, 2));
    }

    #[test]
    fn answers_stop_when_time_runs_out()
    {
        let start = Instant::now();
        let mut quiz = quiz_on(sum(1, 1), start);
        assert_eq!(quiz.remaining(start + Duration::from_secs(45)), Duration::from_secs(15));
        assert!(quiz.is_over(start + GAME_DURATION));
        assert_eq!(quiz.answer(2, start + GAME_DURATION), None);
        assert_eq!(quiz.answered(), 0);
    }
}
