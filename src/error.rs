use crate::template::definition::{BranchId, QuestionId, SectionId};
use thiserror::Error;

/// Errors that can occur while building a [`Template`](crate::template::Template)
/// from its definition records.
#[derive(Error, Debug, Clone)]
pub enum TemplateBuildError {
    #[error("Failed to parse template JSON: {0}")]
    JsonParseError(String),

    #[error("Question '{question_id}' belongs to section '{section_id}', which does not exist")]
    UnknownSection {
        question_id: QuestionId,
        section_id: SectionId,
    },

    #[error("Question '{question_id}' has an unregistered input type: '{type_name}'")]
    UnknownInputType {
        question_id: QuestionId,
        type_name: String,
    },

    #[error("Section '{section_id}' has more than one question at position {position}")]
    DuplicateQuestionPosition {
        section_id: SectionId,
        position: u32,
    },

    #[error("More than one section sits at position {position}")]
    DuplicateSectionPosition { position: u32 },

    #[error(
        "Question '{question_id}' sits at position 0 of section '{section_id}', which is reserved for the toggle of an optional section"
    )]
    ReservedPosition {
        question_id: QuestionId,
        section_id: SectionId,
    },

    #[error(
        "Section '{section_id}' is optional but has no boolean toggle question at position 0"
    )]
    MissingSectionToggle { section_id: SectionId },

    #[error("Branch '{branch_id}' starts from question '{question_id}', which does not exist")]
    UnknownBranchSource {
        branch_id: BranchId,
        question_id: QuestionId,
    },

    #[error("Branch '{0}' duplicates another branch with the same source, category, condition and target")]
    DuplicateBranch(BranchId),

    #[error("Canned answer '{choice}' belongs to question '{question_id}', which does not exist")]
    UnknownCannedAnswerQuestion {
        question_id: QuestionId,
        choice: String,
    },

    #[error("Canned answer '{choice}' is linked to branch '{branch_id}', which does not exist")]
    UnknownCannedAnswerBranch {
        branch_id: BranchId,
        choice: String,
    },

    #[error("Section '{section_id}' names '{super_section_id}' as its super section, which does not exist")]
    UnknownSuperSection {
        section_id: SectionId,
        super_section_id: SectionId,
    },

    #[error("Section '{section_id}' is nested inside itself")]
    CyclicSectionNesting { section_id: SectionId },
}

/// Errors that can occur during graph traversal and path enumeration.
#[derive(Error, Debug, Clone)]
pub enum TraversalError {
    #[error(
        "No transition out of question '{question_id}' matches condition '{condition}'; the template may have changed since the answer was recorded"
    )]
    UnresolvedCondition {
        question_id: QuestionId,
        condition: String,
    },

    #[error(
        "A branch from question '{current_id}' points at question '{missing_id}', which no longer exists in the template"
    )]
    DanglingBranchTarget {
        current_id: QuestionId,
        missing_id: QuestionId,
    },

    #[error("Question '{0}' does not exist in the template")]
    UnknownQuestion(QuestionId),

    #[error("Section '{0}' does not exist in the template")]
    UnknownSection(SectionId),

    #[error("There are no paths from question '{start_id}' to {}", end_label(.end_id))]
    NoPathsFound {
        start_id: QuestionId,
        end_id: Option<QuestionId>,
    },

    #[error("Path enumeration exceeded the configured budget of {0} paths")]
    PathBudgetExceeded(usize),
}

fn end_label(end: &Option<QuestionId>) -> String {
    match end {
        Some(id) => format!("question '{id}'"),
        None => "the end of the section".to_string(),
    }
}

/// Errors that can occur when converting a custom user format into a
/// veiviser [`TemplateDefinition`](crate::template::definition::TemplateDefinition).
#[derive(Error, Debug, Clone)]
pub enum TemplateConversionError {
    #[error("Invalid custom data: {0}")]
    ValidationError(String),
}

/// Errors that can occur while saving or loading a compiled graph artifact.
#[derive(Error, Debug, Clone)]
pub enum ArtifactError {
    #[error("Failed to encode graph artifact: {0}")]
    Encode(String),

    #[error("Failed to decode graph artifact: {0}")]
    Decode(String),

    #[error("Failed to access '{path}': {message}")]
    Io { path: String, message: String },
}
