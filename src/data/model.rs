use std::fs;
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::template::definition::QuestionId;

/// One recorded answer: the chosen value, in whatever shape the question's
/// input type stores it, plus free-form notes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Answer {
    pub choice: Value,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Answer {
    pub fn new(choice: Value) -> Self {
        Self {
            choice,
            notes: None,
        }
    }
}

/// Recorded answers keyed by question id rendered as a string, matching the
/// JSON format the answering layer produces.
pub type AnswerMap = AHashMap<String, Answer>;

/// Looks up the answer for a question; the map keys are stringified ids.
pub fn answer_for(answers: &AnswerMap, question: QuestionId) -> Option<&Answer> {
    answers.get(&question.to_string())
}

/// Loads an answer map from a JSON file.
pub fn load_answers<P: AsRef<Path>>(path: P) -> Result<AnswerMap, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let answers = serde_json::from_str(&content)?;
    Ok(answers)
}
