use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TemplateBuildError;
use crate::flow::{Transition, TransitionCategory};

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

define_id!(
    /// Stable identifier of a question.
    QuestionId
);
define_id!(
    /// Stable identifier of a section.
    SectionId
);
define_id!(
    /// Stable identifier of a stored explicit branch.
    BranchId
);
define_id!(
    /// Stable identifier of a canned answer.
    CannedAnswerId
);

fn default_true() -> bool {
    true
}

/// The complete, canonical definition of a question template, ready to be
/// built into a [`Template`](crate::template::Template). This is the target
/// structure for any custom data model conversion, and the shape of the JSON
/// import/export format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub sections: Vec<SectionDefinition>,
    pub questions: Vec<QuestionDefinition>,
    #[serde(default)]
    pub canned_answers: Vec<CannedAnswerDefinition>,
    #[serde(default)]
    pub branches: Vec<BranchDefinition>,
}

/// Defines an ordered container of questions.
///
/// Sections nest via `super_section`; nesting depth and whether the section
/// branches are derived at build time, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDefinition {
    pub id: SectionId,
    pub title: String,
    #[serde(default)]
    pub label: String,
    pub position: u32,
    #[serde(default)]
    pub introductory_text: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub super_section: Option<SectionId>,
    /// An optional section can be skipped as a whole; it carries a synthetic
    /// boolean toggle question at position 0.
    #[serde(default)]
    pub optional: bool,
}

/// Defines a single question, one node of the graph.
///
/// Position 0 is reserved for the toggle question of an optional section;
/// ordinary questions start at position 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDefinition {
    pub id: QuestionId,
    pub section: SectionId,
    pub position: u32,
    /// Key into the input-type registry, e.g. `"bool"` or `"choice"`.
    pub input_type: String,
    pub question: String,
    #[serde(default)]
    pub label: String,
    /// Wrapped around the serialized answer when generating canned text.
    #[serde(default)]
    pub framing_text: String,
    #[serde(default)]
    pub help_text: String,
    /// Canned text to use when an optional question was left unanswered.
    #[serde(default)]
    pub optional_canned_text: String,
    #[serde(default)]
    pub optional: bool,
    /// A question on the trunk is visited regardless of branching choices.
    #[serde(default = "default_true")]
    pub on_trunk: bool,
    /// Whether the answering UI offers a notes field for this question.
    #[serde(default)]
    pub has_notes: bool,
}

impl QuestionDefinition {
    /// Whether this question is the skip toggle of an optional section.
    pub fn is_section_toggle(&self) -> bool {
        self.position == 0 && self.input_type == "bool"
    }
}

/// Defines one allowed answer value for a question, optionally bound to an
/// explicit branch that fires when this value is chosen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannedAnswerDefinition {
    pub id: CannedAnswerId,
    pub question: QuestionId,
    #[serde(default)]
    pub position: Option<u32>,
    pub choice: String,
    #[serde(default)]
    pub canned_text: String,
    #[serde(default)]
    pub transition: Option<BranchId>,
}

/// Defines a stored override edge: from `current_question`, on `condition`,
/// go to `next_question` instead of the next question by position.
///
/// An empty `condition` is unconditional. A missing `next_question` means
/// "leave the section here". Branches are unique on the whole
/// `(current_question, category, condition, next_question)` tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchDefinition {
    pub id: BranchId,
    pub current_question: QuestionId,
    pub category: TransitionCategory,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub next_question: Option<QuestionId>,
}

impl BranchDefinition {
    /// The same `(current, category, condition, next)` tuple as `other`,
    /// regardless of id.
    pub fn duplicates(&self, other: &BranchDefinition) -> bool {
        self.current_question == other.current_question
            && self.category == other.category
            && self.condition == other.condition
            && self.next_question == other.next_question
    }

    /// This branch as a transition. An empty condition becomes the
    /// unconditional `None` choice.
    pub fn to_transition(&self) -> Transition {
        Transition {
            category: self.category,
            current: self.current_question,
            choice: (!self.condition.is_empty()).then(|| self.condition.clone()),
            next: self.next_question,
        }
    }
}

const TOGGLE_PLACEHOLDER_TEXT: &str = "(Template designer please update)";

impl TemplateDefinition {
    /// Loads a definition from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TemplateBuildError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| TemplateBuildError::JsonParseError(e.to_string()))?;
        Self::from_json(&content)
    }

    /// Parses a definition from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, TemplateBuildError> {
        serde_json::from_str(content).map_err(|e| TemplateBuildError::JsonParseError(e.to_string()))
    }

    pub fn section(&self, id: SectionId) -> Option<&SectionDefinition> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn question(&self, id: QuestionId) -> Option<&QuestionDefinition> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn branch(&self, id: BranchId) -> Option<&BranchDefinition> {
        self.branches.iter().find(|b| b.id == id)
    }

    /// Adds a branch, rejecting a duplicate of an existing
    /// `(current, category, condition, next)` tuple.
    pub fn add_branch(&mut self, branch: BranchDefinition) -> Result<(), TemplateBuildError> {
        if self.branches.iter().any(|b| b.duplicates(&branch)) {
            return Err(TemplateBuildError::DuplicateBranch(branch.id));
        }
        self.branches.push(branch);
        Ok(())
    }

    /// Removes a branch and clears any canned-answer link to it. Returns
    /// whether the branch existed.
    pub fn remove_branch(&mut self, id: BranchId) -> bool {
        let before = self.branches.len();
        self.branches.retain(|b| b.id != id);
        for canned in &mut self.canned_answers {
            if canned.transition == Some(id) {
                canned.transition = None;
            }
        }
        self.branches.len() != before
    }

    /// Appends a question to its section. A zero id gets the next free one,
    /// a zero position lands one past the section's last question.
    pub fn add_question(&mut self, mut question: QuestionDefinition) -> QuestionId {
        if question.id == QuestionId(0) {
            question.id = self.next_question_id();
        }
        if question.position == 0 {
            let last = self
                .questions
                .iter()
                .filter(|q| q.section == question.section)
                .map(|q| q.position)
                .max()
                .unwrap_or(0);
            question.position = last + 1;
        }
        let id = question.id;
        self.questions.push(question);
        id
    }

    /// Appends a canned answer to its question. A zero id gets the next
    /// free one, a missing position lands after the question's last.
    pub fn add_canned_answer(&mut self, mut canned: CannedAnswerDefinition) -> CannedAnswerId {
        if canned.id == CannedAnswerId(0) {
            canned.id = self.next_canned_answer_id();
        }
        if canned.position.is_none() {
            let last = self
                .canned_answers
                .iter()
                .filter(|c| c.question == canned.question)
                .filter_map(|c| c.position)
                .max()
                .unwrap_or(0);
            canned.position = Some(last + 1);
        }
        let id = canned.id;
        self.canned_answers.push(canned);
        id
    }

    /// Renumbers the questions of a section to consecutive positions,
    /// preserving their relative order. A toggle question keeps position 0;
    /// everything else is packed from 1 upward.
    pub fn renumber_questions(&mut self, section: SectionId) {
        let mut ordered: Vec<usize> = (0..self.questions.len())
            .filter(|&i| self.questions[i].section == section)
            .collect();
        ordered.sort_by_key(|&i| self.questions[i].position);
        let mut position = 1;
        for index in ordered {
            if self.questions[index].is_section_toggle() {
                self.questions[index].position = 0;
                continue;
            }
            self.questions[index].position = position;
            position += 1;
        }
    }

    fn next_question_id(&self) -> QuestionId {
        QuestionId(self.questions.iter().map(|q| q.id.0).max().unwrap_or(0) + 1)
    }

    fn next_canned_answer_id(&self) -> CannedAnswerId {
        CannedAnswerId(self.canned_answers.iter().map(|c| c.id.0).max().unwrap_or(0) + 1)
    }

    fn next_branch_id(&self) -> BranchId {
        BranchId(self.branches.iter().map(|b| b.id.0).max().unwrap_or(0) + 1)
    }

    /// Brings section toggles in line with each section's `optional` flag.
    ///
    /// An optional section without a position-0 boolean question gets one
    /// materialized, together with its Yes/No canned answers and the branch
    /// that jumps past the section on "No". A toggle left behind in a
    /// section that is no longer optional is removed again.
    pub fn ensure_section_toggles(&mut self) {
        let sections: Vec<(SectionId, bool)> =
            self.sections.iter().map(|s| (s.id, s.optional)).collect();
        for (section_id, optional) in sections {
            let toggle = self
                .questions
                .iter()
                .find(|q| q.section == section_id && q.is_section_toggle())
                .map(|q| q.id);
            match (optional, toggle) {
                (true, None) => self.materialize_toggle(section_id),
                (false, Some(question_id)) => self.remove_question(question_id),
                _ => {}
            }
        }
    }

    fn materialize_toggle(&mut self, section_id: SectionId) {
        let question_id = self.next_question_id();
        let help_text = format!(
            "{TOGGLE_PLACEHOLDER_TEXT}This is an optional section. \
             If you select \"No\", this section will be skipped."
        );
        self.questions.push(QuestionDefinition {
            id: question_id,
            section: section_id,
            position: 0,
            input_type: "bool".to_string(),
            question: TOGGLE_PLACEHOLDER_TEXT.to_string(),
            label: String::new(),
            framing_text: String::new(),
            help_text,
            optional_canned_text: String::new(),
            optional: false,
            on_trunk: true,
            has_notes: false,
        });
        for choice in ["Yes", "No"] {
            self.canned_answers.push(CannedAnswerDefinition {
                id: self.next_canned_answer_id(),
                question: question_id,
                position: None,
                choice: choice.to_string(),
                canned_text: choice.to_string(),
                transition: None,
            });
        }
        self.branches.push(BranchDefinition {
            id: self.next_branch_id(),
            current_question: question_id,
            category: TransitionCategory::Last,
            condition: "No".to_string(),
            next_question: None,
        });
    }

    /// Removes a question together with its canned answers and any branch
    /// that starts from it.
    pub fn remove_question(&mut self, id: QuestionId) {
        self.questions.retain(|q| q.id != id);
        self.canned_answers.retain(|c| c.question != id);
        self.branches.retain(|b| b.current_question != id);
    }
}
