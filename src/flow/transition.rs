use std::fmt;

use serde::{Deserialize, Serialize};

use crate::template::definition::QuestionId;

/// Where a transition comes from.
///
/// The category tags the provenance of an edge, not its behavior: traversal
/// treats all categories alike and only the lookup key (source and choice)
/// decides which transition fires. Legacy spellings from older exports are
/// accepted on input and normalized on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionCategory {
    /// Implicit fallback edge to the next question by position.
    #[serde(rename = "position", alias = "Node-edgeless")]
    Position,
    /// End of section, either implicit (nothing follows by position) or
    /// stored as a branch without a target.
    #[serde(rename = "last", alias = "Last")]
    Last,
    /// Edge bound to a specific canned answer.
    CannedAnswer,
    /// Free-standing stored override edge.
    #[serde(alias = "Edge")]
    ExplicitBranch,
}

impl fmt::Display for TransitionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransitionCategory::Position => "position",
            TransitionCategory::Last => "last",
            TransitionCategory::CannedAnswer => "CannedAnswer",
            TransitionCategory::ExplicitBranch => "ExplicitBranch",
        };
        write!(f, "{label}")
    }
}

/// One possible move out of a question.
///
/// Two transitions are equal iff all four fields match structurally; the
/// duplicate suppression and override logic of [`TransitionMap`] rely on
/// this.
///
/// `choice` is the normalized answer condition this move responds to, with
/// `None` meaning "unconditional fallback". `next` is the destination
/// question, with `None` meaning "leave the section here".
///
/// [`TransitionMap`]: crate::flow::TransitionMap
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub category: TransitionCategory,
    pub current: QuestionId,
    pub choice: Option<String>,
    pub next: Option<QuestionId>,
}

impl Transition {
    pub fn new(
        category: TransitionCategory,
        current: QuestionId,
        choice: Option<String>,
        next: Option<QuestionId>,
    ) -> Self {
        Self {
            category,
            current,
            choice,
            next,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let choice = self.choice.as_deref().unwrap_or("*");
        match self.next {
            Some(next) => write!(
                f,
                "{} -[{}: {}]-> {}",
                self.current, self.category, choice, next
            ),
            None => write!(f, "{} -[{}: {}]-> (exit)", self.current, self.category, choice),
        }
    }
}

/// A node in a section path. `Exit` is the synthetic node reached by
/// transitions that jump past the end of the section.
///
/// Ordering puts questions before the exit sentinel so that sorted path
/// lists come out stable across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathNode {
    Question(QuestionId),
    Exit,
}

impl PathNode {
    /// The question id, unless this is the exit sentinel.
    pub fn question(self) -> Option<QuestionId> {
        match self {
            PathNode::Question(id) => Some(id),
            PathNode::Exit => None,
        }
    }
}

impl From<Option<QuestionId>> for PathNode {
    fn from(id: Option<QuestionId>) -> Self {
        id.map_or(PathNode::Exit, PathNode::Question)
    }
}

impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathNode::Question(id) => write!(f, "{id}"),
            PathNode::Exit => write!(f, "(exit)"),
        }
    }
}
