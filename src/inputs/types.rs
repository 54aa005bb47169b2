//! The default input types.
//!
//! Semantics worth knowing:
//! * `bool`, `choice` and the two "not listed" types are the only ones that
//!   can steer branching.
//! * External-vocabulary lookups are out of scope; the "ext" types keep
//!   their branching and validation behavior but draw labels from the
//!   question's canned answers instead of a remote cache.

use chrono::NaiveDate;
use serde_json::Value;

use super::{InputType, InputTypeRegistry, QuestionContext, is_falsy, join_with_and};

/// Registers every default input type on `registry`.
pub fn register_default_input_types(registry: &mut InputTypeRegistry) {
    registry.register(Box::new(BoolInput));
    registry.register(Box::new(ChoiceInput));
    registry.register(Box::new(MultipleChoiceOneTextInput));
    registry.register(Box::new(DateRangeInput));
    registry.register(Box::new(ReasonInput));
    registry.register(Box::new(ShortFreetextInput));
    registry.register(Box::new(PositiveIntegerInput));
    registry.register(Box::new(DateInput));
    registry.register(Box::new(ChoiceNotListedInput));
    registry.register(Box::new(MultipleChoiceNotListedOneTextInput));
}

fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_iso_date(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok())
}

/// Shared framing behavior for atomic types: stringify and wrap.
fn framed_atomic_answer(question: &QuestionContext, choice: &Value) -> String {
    if is_falsy(choice) {
        return question.optional_canned_answer();
    }
    question.frame_canned_answer(&value_as_string(choice))
}

/// A branch-capable question answerable with "Yes" or "No".
struct BoolInput;

impl InputType for BoolInput {
    fn id(&self) -> &'static str {
        "bool"
    }

    fn branching_possible(&self) -> bool {
        true
    }

    fn validate_choice(&self, question: &QuestionContext, choice: &Value) -> bool {
        if question.optional && choice.is_null() {
            return true;
        }
        choice.as_str().is_some_and(|s| s == "Yes" || s == "No")
    }

    fn serialize_condition(&self, choice: &Value) -> Option<String> {
        if choice == &Value::Bool(true) {
            return Some("Yes".to_string());
        }
        let spelled = value_as_string(choice).to_lowercase();
        if matches!(spelled.as_str(), "true" | "yes" | "on") {
            Some("Yes".to_string())
        } else {
            Some("No".to_string())
        }
    }

    fn transition_choice(&self, choice: &Value) -> Option<String> {
        match choice {
            Value::Null | Value::Array(_) => None,
            other => self.serialize_condition(other),
        }
    }

    fn choices(&self, _question: &QuestionContext) -> Vec<(String, String)> {
        vec![
            ("Yes".to_string(), "Yes".to_string()),
            ("No".to_string(), "No".to_string()),
        ]
    }

    fn is_valid_design(&self, question: &QuestionContext) -> bool {
        let mut keys = question.canned_keys();
        keys.sort_unstable();
        keys == ["No", "Yes"]
    }
}

/// A branch-capable question answerable with one of a small set of choices.
struct ChoiceInput;

impl InputType for ChoiceInput {
    fn id(&self) -> &'static str {
        "choice"
    }

    fn branching_possible(&self) -> bool {
        true
    }

    fn validate_choice(&self, question: &QuestionContext, choice: &Value) -> bool {
        if question.optional && choice.is_null() {
            return true;
        }
        choice
            .as_str()
            .is_some_and(|s| question.canned_keys().contains(&s))
    }

    fn serialize_condition(&self, choice: &Value) -> Option<String> {
        choice.as_str().map(str::to_string)
    }

    fn transition_choice(&self, choice: &Value) -> Option<String> {
        choice.as_str().map(str::to_string)
    }

    fn choices(&self, question: &QuestionContext) -> Vec<(String, String)> {
        question
            .canned_answers
            .iter()
            .map(|canned| {
                let label = if canned.canned_text.is_empty() {
                    canned.choice.clone()
                } else {
                    canned.canned_text.clone()
                };
                (canned.choice.clone(), label)
            })
            .collect()
    }

    fn is_valid_design(&self, question: &QuestionContext) -> bool {
        question.canned_answers.len() > 1
    }
}

/// A non-branch-capable question answerable with one or more choices,
/// rendered as a single "a, b and c" text.
struct MultipleChoiceOneTextInput;

impl InputType for MultipleChoiceOneTextInput {
    fn id(&self) -> &'static str {
        "multichoiceonetext"
    }

    fn validate_choice(&self, question: &QuestionContext, choice: &Value) -> bool {
        let picked: Vec<&str> = match choice {
            Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
            Value::Null => Vec::new(),
            _ => return false,
        };
        if question.optional && picked.is_empty() {
            return true;
        }
        let keys = question.canned_keys();
        !picked.is_empty() && picked.iter().all(|p| keys.contains(p))
    }

    fn canned_answer(&self, question: &QuestionContext, choice: &Value) -> String {
        if is_falsy(choice) {
            return question.optional_canned_answer();
        }
        let picked: Vec<String> = match choice {
            Value::Array(items) => items.iter().map(value_as_string).collect(),
            single => vec![value_as_string(single)],
        };
        question.frame_canned_answer(&join_with_and(&picked))
    }

    fn choices(&self, question: &QuestionContext) -> Vec<(String, String)> {
        question
            .canned_answers
            .iter()
            .map(|canned| (canned.choice.clone(), canned.choice.clone()))
            .collect()
    }

    fn is_valid_design(&self, question: &QuestionContext) -> bool {
        question.canned_answers.len() > 1
    }
}

/// A non-branch-capable question answerable with a date range.
struct DateRangeInput;

const DATERANGE_DEFAULT_FRAMING: &str = "From {start} to {end}";

impl InputType for DateRangeInput {
    fn id(&self) -> &'static str {
        "daterange"
    }

    fn validate_choice(&self, question: &QuestionContext, choice: &Value) -> bool {
        if question.optional && is_falsy(choice) {
            return true;
        }
        let Value::Object(range) = choice else {
            return false;
        };
        ["start", "end"]
            .iter()
            .all(|key| range.get(*key).is_some_and(parse_iso_date))
    }

    fn canned_answer(&self, question: &QuestionContext, choice: &Value) -> String {
        if is_falsy(choice) {
            return question.optional_canned_answer();
        }
        let framing = if question.framing_text.is_empty() {
            DATERANGE_DEFAULT_FRAMING
        } else {
            question.framing_text
        };
        let part = |key: &str| {
            choice
                .get(key)
                .map(value_as_string)
                .unwrap_or_default()
        };
        framing
            .replace("{start}", &part("start"))
            .replace("{end}", &part("end"))
    }
}

/// A non-branch-capable question answerable with plaintext.
struct ReasonInput;

impl InputType for ReasonInput {
    fn id(&self) -> &'static str {
        "reason"
    }

    fn allows_notes(&self) -> bool {
        false
    }

    fn validate_choice(&self, question: &QuestionContext, choice: &Value) -> bool {
        question.optional || !is_falsy(choice)
    }

    fn canned_answer(&self, question: &QuestionContext, choice: &Value) -> String {
        framed_atomic_answer(question, choice)
    }
}

/// A non-branch-capable question answerable with a short plaintext.
struct ShortFreetextInput;

impl InputType for ShortFreetextInput {
    fn id(&self) -> &'static str {
        "shortfreetext"
    }

    fn allows_notes(&self) -> bool {
        false
    }

    fn validate_choice(&self, question: &QuestionContext, choice: &Value) -> bool {
        question.optional || !is_falsy(choice)
    }

    fn canned_answer(&self, question: &QuestionContext, choice: &Value) -> String {
        framed_atomic_answer(question, choice)
    }
}

/// A non-branch-capable question answerable with a non-negative integer.
struct PositiveIntegerInput;

impl InputType for PositiveIntegerInput {
    fn id(&self) -> &'static str {
        "positiveinteger"
    }

    fn validate_choice(&self, question: &QuestionContext, choice: &Value) -> bool {
        if question.optional && choice.is_null() {
            return true;
        }
        match choice {
            Value::Number(n) => n.as_f64().is_some_and(|f| f >= 0.0),
            Value::String(s) => s.trim().parse::<i64>().is_ok_and(|v| v >= 0),
            _ => false,
        }
    }

    fn canned_answer(&self, question: &QuestionContext, choice: &Value) -> String {
        framed_atomic_answer(question, choice)
    }
}

/// A non-branch-capable question answerable with an ISO date ("YYYY-mm-dd").
struct DateInput;

impl InputType for DateInput {
    fn id(&self) -> &'static str {
        "date"
    }

    fn validate_choice(&self, question: &QuestionContext, choice: &Value) -> bool {
        if question.optional && choice.is_null() {
            return true;
        }
        parse_iso_date(choice)
    }

    fn canned_answer(&self, question: &QuestionContext, choice: &Value) -> String {
        framed_atomic_answer(question, choice)
    }
}

/// Shared condition handling for the "not listed" composite types: the
/// stored choice is an object with a `not-listed` boolean next to the
/// picked value(s), and only that boolean steers branching.
fn not_listed_transition_choice(choice: &Value) -> Option<String> {
    let Value::Object(fields) = choice else {
        return None;
    };
    let not_listed = fields.get("not-listed").is_some_and(|v| !is_falsy(v));
    if not_listed {
        Some("not-listed".to_string())
    } else {
        Some("False".to_string())
    }
}

fn not_listed_serialize_condition(choice: &Value) -> Option<String> {
    let Value::Object(fields) = choice else {
        return None;
    };
    let not_listed = fields.get("not-listed").is_some_and(|v| !is_falsy(v));
    Some(if not_listed { "True" } else { "False" }.to_string())
}

/// A branch-capable single choice with an extra "not listed" escape hatch.
struct ChoiceNotListedInput;

impl InputType for ChoiceNotListedInput {
    fn id(&self) -> &'static str {
        "extchoicenotlisted"
    }

    fn branching_possible(&self) -> bool {
        true
    }

    fn validate_choice(&self, question: &QuestionContext, choice: &Value) -> bool {
        if question.optional && is_falsy(choice) {
            return true;
        }
        let Value::Object(fields) = choice else {
            return false;
        };
        let picked = fields.get("choices").and_then(Value::as_str).unwrap_or("");
        let not_listed = fields.get("not-listed").is_some_and(|v| !is_falsy(v));
        question.canned_keys().contains(&picked) || not_listed
    }

    fn serialize_condition(&self, choice: &Value) -> Option<String> {
        not_listed_serialize_condition(choice)
    }

    fn transition_choice(&self, choice: &Value) -> Option<String> {
        not_listed_transition_choice(choice)
    }

    fn canned_answer(&self, question: &QuestionContext, choice: &Value) -> String {
        if is_falsy(choice) {
            return question.optional_canned_answer();
        }
        let picked = choice.get("choices").and_then(Value::as_str).unwrap_or("");
        let not_listed = choice.get("not-listed").is_some_and(|v| !is_falsy(v));

        let mut parts = Vec::new();
        if !picked.is_empty() {
            let label = match question.canned_text_for(picked) {
                Some(text) if !text.is_empty() => text.to_string(),
                _ => picked.to_string(),
            };
            parts.push(question.frame_canned_answer(&label));
        }
        if not_listed {
            let canned = question.canned_text_for("not-listed").unwrap_or_default();
            if !canned.is_empty() && canned != "not-listed" {
                parts.push(canned.to_string());
            } else {
                parts.push("Not found in the list".to_string());
            }
        }
        parts.join(" ")
    }

    fn choices(&self, question: &QuestionContext) -> Vec<(String, String)> {
        question
            .canned_answers
            .iter()
            .map(|canned| (canned.choice.clone(), canned.choice.clone()))
            .collect()
    }

    fn is_valid_design(&self, question: &QuestionContext) -> bool {
        !question.canned_answers.is_empty()
    }
}

/// A branch-capable multiple choice with an extra "not listed" escape hatch.
struct MultipleChoiceNotListedOneTextInput;

impl InputType for MultipleChoiceNotListedOneTextInput {
    fn id(&self) -> &'static str {
        "extmultichoicenotlistedonetext"
    }

    fn branching_possible(&self) -> bool {
        true
    }

    fn validate_choice(&self, question: &QuestionContext, choice: &Value) -> bool {
        if question.optional && is_falsy(choice) {
            return true;
        }
        let Value::Object(fields) = choice else {
            return false;
        };
        let picked: Vec<&str> = match fields.get("choices") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                log::error!("choice is in wrong format: input 'extmultichoicenotlistedonetext', choice {other}");
                return false;
            }
        };
        let not_listed = fields.get("not-listed").is_some_and(|v| !is_falsy(v));
        let keys = question.canned_keys();
        picked.iter().all(|p| keys.contains(p)) || not_listed
    }

    fn serialize_condition(&self, choice: &Value) -> Option<String> {
        not_listed_serialize_condition(choice)
    }

    fn transition_choice(&self, choice: &Value) -> Option<String> {
        not_listed_transition_choice(choice)
    }

    fn canned_answer(&self, question: &QuestionContext, choice: &Value) -> String {
        if is_falsy(choice) {
            return question.optional_canned_answer();
        }
        let picked: Vec<String> = match choice.get("choices") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    let raw = value_as_string(item);
                    match question.canned_text_for(&raw) {
                        Some(text) if !text.is_empty() => text.to_string(),
                        _ => raw,
                    }
                })
                .collect(),
            _ => Vec::new(),
        };
        let not_listed = choice.get("not-listed").is_some_and(|v| !is_falsy(v));

        let mut parts = Vec::new();
        if !picked.is_empty() {
            parts.push(question.frame_canned_answer(&join_with_and(&picked)));
        }
        if not_listed {
            let canned = question.canned_text_for("not-listed").unwrap_or_default();
            if !canned.is_empty() && canned != "not-listed" {
                parts.push(canned.to_string());
            }
        }
        parts.join(" ")
    }

    fn choices(&self, question: &QuestionContext) -> Vec<(String, String)> {
        question
            .canned_answers
            .iter()
            .map(|canned| (canned.choice.clone(), canned.choice.clone()))
            .collect()
    }

    fn is_valid_design(&self, question: &QuestionContext) -> bool {
        !question.canned_answers.is_empty()
    }
}
