//! The read-only pool of questions a quiz draws from.
//!
//! The bank is loaded once at startup. An external JSON file may supply the
//! questions; when it is missing or unusable the built-in astronomy set is
//! used instead. Each record in the file looks like:
//!
//! ```json
//! { "question": "...", "answers": ["a", "b", "c", "d"], "correct": 1, "explanation": "..." }
//! ```

use std::{fs, path::Path};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::BankError;

/// Every question offers exactly this many answers.
pub const OPTION_COUNT: usize = 4;

/// A single multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub correct: usize,
    pub explanation: Option<String>,
}

/// On-disk shape of a question, validated into a [`Question`].
#[derive(Debug, Deserialize)]
struct QuestionRecord {
    question: String,
    answers: Vec<String>,
    correct: i64,
    #[serde(default)]
    explanation: Option<String>,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = String;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        let answer_count = record.answers.len();
        let options: [String; OPTION_COUNT] = record
            .answers
            .try_into()
            .map_err(|_| format!("expected {OPTION_COUNT} answers, found {answer_count}"))?;

        let correct = usize::try_from(record.correct)
            .ok()
            .filter(|index| *index < OPTION_COUNT)
            .ok_or_else(|| format!("correct index {} is out of range", record.correct))?;

        Ok(Self {
            text: record.question,
            options,
            correct,
            explanation: record.explanation.filter(|text| !text.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Loads questions from `path`, falling back to [`QuestionBank::defaults`]
    /// on any failure.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(bank) => {
                info!(path = %path.display(), count = bank.len(), "loaded question bank");
                bank
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "using default questions");
                Self::defaults()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, BankError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parses a JSON array of question records.
    ///
    /// Malformed entries are skipped with a warning. The whole document fails
    /// only when it is not an array or nothing valid remains.
    pub fn from_json(raw: &str) -> Result<Self, BankError> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(raw)?;

        let questions: Vec<Question> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                let parsed = serde_json::from_value::<QuestionRecord>(entry)
                    .map_err(|err| err.to_string())
                    .and_then(Question::try_from);
                match parsed {
                    Ok(question) => Some(question),
                    Err(reason) => {
                        warn!(position, %reason, "skipping malformed question");
                        None
                    }
                }
            })
            .collect();

        if questions.is_empty() {
            return Err(BankError::Empty);
        }
        Ok(Self { questions })
    }

    pub fn from_questions(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// The built-in question set.
    pub fn defaults() -> Self {
        let questions = DEFAULT_QUESTIONS
            .iter()
            .map(|(text, options, correct)| Question {
                text: (*text).to_string(),
                options: options.map(str::to_string),
                correct: *correct,
                explanation: None,
            })
            .collect();
        Self { questions }
    }

    pub fn all(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

const DEFAULT_QUESTIONS: &[(&str, [&str; OPTION_COUNT], usize)] = &[
    (
        "What is the largest planet in our solar system?",
        ["Earth", "Jupiter", "Saturn", "Neptune"],
        1,
    ),
    (
        "Which planet is known as the Red Planet?",
        ["Venus", "Mars", "Jupiter", "Mercury"],
        1,
    ),
    (
        "What is the closest star to Earth?",
        ["Alpha Centauri", "Sirius", "The Sun", "Betelgeuse"],
        2,
    ),
    ("How many moons does Earth have?", ["0", "1", "2", "3"], 1),
    (
        "What is the name of NASA's most famous space telescope?",
        ["Kepler", "Spitzer", "Hubble", "Chandra"],
        2,
    ),
    (
        "Which planet has the most moons?",
        ["Jupiter", "Saturn", "Uranus", "Neptune"],
        1,
    ),
    (
        "What is the hottest planet in our solar system?",
        ["Mercury", "Venus", "Mars", "Jupiter"],
        1,
    ),
    (
        "What does NASA stand for?",
        [
            "National Air and Space Administration",
            "National Aeronautics and Space Administration",
            "North American Space Agency",
            "National Astronomy and Space Association",
        ],
        1,
    ),
    (
        "Which galaxy contains our solar system?",
        ["Andromeda", "Milky Way", "Whirlpool", "Sombrero"],
        1,
    ),
    (
        "What is the smallest planet in our solar system?",
        ["Mercury", "Venus", "Mars", "Pluto"],
        0,
    ),
    (
        "How long does it take for light from the Sun to reach Earth?",
        ["8 seconds", "8 minutes", "8 hours", "8 days"],
        1,
    ),
    (
        "What is the Great Red Spot on Jupiter?",
        ["A moon", "A storm", "A crater", "A mountain"],
        1,
    ),
    (
        "Which planet is tilted on its side?",
        ["Mars", "Saturn", "Uranus", "Neptune"],
        2,
    ),
    (
        "What is the name of the first artificial satellite?",
        ["Explorer 1", "Sputnik 1", "Vanguard 1", "Luna 1"],
        1,
    ),
    (
        "How many astronauts have walked on the Moon?",
        ["6", "8", "10", "12"],
        3,
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_well_formed() {
        let bank = QuestionBank::defaults();
        assert_eq!(bank.len(), 15);
        assert!(bank.all().iter().all(|q| q.correct < OPTION_COUNT));
    }

    #[test]
    fn parses_records_with_optional_explanation() {
        let raw = r#"[
            {"question": "Q1", "answers": ["a", "b", "c", "d"], "correct": 2},
            {"question": "Q2", "answers": ["a", "b", "c", "d"], "correct": 0, "explanation": "because"}
        ]"#;
        let bank = QuestionBank::from_json(raw).expect("valid bank");

        assert_eq!(bank.len(), 2);
        assert_eq!(bank.all()[0].correct, 2);
        assert_eq!(bank.all()[0].explanation, None);
        assert_eq!(bank.all()[1].explanation.as_deref(), Some("because"));
    }

    #[test]
    fn blank_explanations_are_dropped() {
        let raw = r#"[
            {"question": "Q1", "answers": ["a", "b", "c", "d"], "correct": 1, "explanation": ""},
            {"question": "Q2", "answers": ["a", "b", "c", "d"], "correct": 1, "explanation": "   "},
            {"question": "Q3", "answers": ["a", "b", "c", "d"], "correct": 1, "explanation": null}
        ]"#;
        let bank = QuestionBank::from_json(raw).expect("valid bank");

        assert_eq!(bank.len(), 3);
        assert!(bank.all().iter().all(|q| q.explanation.is_none()));
    }

    #[test]
    fn skips_malformed_entries() {
        let raw = r#"[
            {"question": "three answers", "answers": ["a", "b", "c"], "correct": 0},
            {"question": "bad index", "answers": ["a", "b", "c", "d"], "correct": 4},
            {"question": "negative", "answers": ["a", "b", "c", "d"], "correct": -1},
            {"answers": ["a", "b", "c", "d"], "correct": 0},
            {"question": "kept", "answers": ["a", "b", "c", "d"], "correct": 3}
        ]"#;
        let bank = QuestionBank::from_json(raw).expect("one valid entry");

        assert_eq!(bank.len(), 1);
        assert_eq!(bank.all()[0].text, "kept");
    }

    #[test]
    fn rejects_documents_without_valid_questions() {
        assert!(matches!(
            QuestionBank::from_json("[]"),
            Err(BankError::Empty)
        ));
        assert!(matches!(
            QuestionBank::from_json(r#"{"question": "not a list"}"#),
            Err(BankError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("missing-{}.json", nanoid::nanoid!()));
        let bank = QuestionBank::load(&path);
        assert_eq!(bank.all(), QuestionBank::defaults().all());
    }

    #[test]
    fn loads_questions_from_file() {
        let path = std::env::temp_dir().join(format!("bank-{}.json", nanoid::nanoid!()));
        fs::write(
            &path,
            r#"[{"question": "From disk", "answers": ["a", "b", "c", "d"], "correct": 1}]"#,
        )
        .expect("write question file");

        let bank = QuestionBank::load(&path);
        let _ = fs::remove_file(&path);

        assert_eq!(bank.len(), 1);
        assert_eq!(bank.all()[0].text, "From disk");
    }

    #[test]
    fn garbage_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("garbage-{}.json", nanoid::nanoid!()));
        fs::write(&path, "not json at all").expect("write question file");

        let bank = QuestionBank::load(&path);
        let _ = fs::remove_file(&path);

        assert_eq!(bank.len(), QuestionBank::defaults().len());
    }
}
