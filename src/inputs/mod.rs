//! Input types: the per-question answer schemas.
//!
//! A question stores only a string key naming its input type. The behavior
//! behind that key (how to validate a stored choice, how to turn it into a
//! transition condition, how to render it as canned text) lives in an
//! [`InputType`] implementation, looked up through an [`InputTypeRegistry`].
//!
//! The registry is an explicit object injected into the template builder,
//! never a global: tests and embedders construct their own, register custom
//! types, and pass it in.

mod types;

use std::fmt;

use ahash::AHashMap;
use itertools::Itertools;
use serde_json::Value;

use crate::template::definition::CannedAnswerDefinition;

pub use types::register_default_input_types;

/// What an input type gets to know about the question it serves.
pub struct QuestionContext<'a> {
    pub optional: bool,
    pub framing_text: &'a str,
    pub optional_canned_text: &'a str,
    /// The question's canned answers, in presentation order.
    pub canned_answers: &'a [&'a CannedAnswerDefinition],
}

impl QuestionContext<'_> {
    /// Canned text for an unanswered optional question, empty otherwise.
    pub fn optional_canned_answer(&self) -> String {
        if self.optional {
            self.optional_canned_text.to_string()
        } else {
            String::new()
        }
    }

    /// Wraps an answer in the question's framing text, if any.
    pub fn frame_canned_answer(&self, answer: &str) -> String {
        if self.framing_text.is_empty() {
            answer.to_string()
        } else {
            self.framing_text.replacen("{}", answer, 1)
        }
    }

    pub fn canned_keys(&self) -> Vec<&str> {
        self.canned_answers
            .iter()
            .map(|canned| canned.choice.as_str())
            .collect()
    }

    pub fn canned_text_for(&self, choice: &str) -> Option<&str> {
        self.canned_answers
            .iter()
            .find(|canned| canned.choice == choice)
            .map(|canned| canned.canned_text.as_str())
    }
}

/// Defines the contract for one answer schema.
///
/// The capability set mirrors what traversal and text generation need:
/// validation of a stored choice, the normalized condition strings, canned
/// text, and the selectable choices. Everything takes the choice as a
/// [`serde_json::Value`] because the stored shape is type-dependent.
pub trait InputType: Send + Sync {
    /// The registry key, e.g. `"bool"`.
    fn id(&self) -> &'static str;

    /// Whether answers to this type can steer branching.
    fn branching_possible(&self) -> bool {
        false
    }

    /// Whether the answering UI should offer a notes field.
    fn allows_notes(&self) -> bool {
        true
    }

    /// Checks a stored choice against the question's schema.
    fn validate_choice(&self, question: &QuestionContext, choice: &Value) -> bool;

    /// Converts a choice into the lookup key used against canned answers.
    fn serialize_condition(&self, _choice: &Value) -> Option<String> {
        None
    }

    /// Converts a choice into the condition used to pick a transition.
    /// Always `None` for non-branching types.
    fn transition_choice(&self, _choice: &Value) -> Option<String> {
        None
    }

    /// Human-readable canned text for a recorded choice.
    ///
    /// The default covers single-choice types: an unset choice falls back to
    /// the optional canned text, a single canned answer always wins, and
    /// otherwise the serialized condition picks the canned answer whose text
    /// (or choice, when the text is empty) is returned.
    fn canned_answer(&self, question: &QuestionContext, choice: &Value) -> String {
        if is_falsy(choice) {
            return question.optional_canned_answer();
        }
        if question.canned_answers.is_empty() {
            return String::new();
        }
        if let [only] = question.canned_answers {
            return only.canned_text.clone();
        }
        if let Some(key) = self.serialize_condition(choice) {
            if let Some(canned) = question
                .canned_answers
                .iter()
                .find(|canned| canned.choice == key)
            {
                if canned.canned_text.is_empty() {
                    return key;
                }
                return canned.canned_text.clone();
            }
        }
        String::new()
    }

    /// The selectable choices as `(value, label)` pairs. Types without an
    /// enumerable choice set return nothing.
    fn choices(&self, _question: &QuestionContext) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Loose design-validity check: does the question carry the extra data
    /// (canned answers, mostly) this type needs to validate an answer?
    /// A noop for primitive types.
    fn is_valid_design(&self, _question: &QuestionContext) -> bool {
        true
    }
}

/// Explicit lookup table from input-type key to behavior.
pub struct InputTypeRegistry {
    slots: Vec<Box<dyn InputType>>,
    by_id: AHashMap<String, usize>,
}

impl InputTypeRegistry {
    /// A registry without any types. Useful for tests that want full
    /// control over what is registered.
    pub fn empty() -> Self {
        Self {
            slots: Vec::new(),
            by_id: AHashMap::new(),
        }
    }

    /// A registry with all default input types registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        register_default_input_types(&mut registry);
        registry
    }

    /// Registers an input type, replacing any previous one with the same id.
    pub fn register(&mut self, input_type: Box<dyn InputType>) {
        let id = input_type.id().to_string();
        match self.by_id.get(&id) {
            Some(&slot) => self.slots[slot] = input_type,
            None => {
                self.by_id.insert(id, self.slots.len());
                self.slots.push(input_type);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&dyn InputType> {
        self.by_id.get(id).map(|&slot| self.slots[slot].as_ref())
    }

    /// The slot index for an id, stable for the life of the registry.
    /// Templates store this per question so lookups cannot fail later.
    pub fn slot_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn by_slot(&self, slot: usize) -> &dyn InputType {
        self.slots[slot].as_ref()
    }

    /// The registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        self.by_id.keys().map(String::as_str).sorted().collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for InputTypeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for InputTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputTypeRegistry")
            .field("types", &self.ids())
            .finish()
    }
}

/// Python-style falsiness over JSON values: null, false, zero, and empty
/// strings/arrays/objects all count as unset.
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
    }
}

/// Joins items as "a, b and c".
pub(crate) fn join_with_and(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., tail] => format!("{} and {}", head.join(", "), tail),
    }
}
