//! Common test utilities for building template definitions and answers.
use serde_json::Value;
use veiviser::prelude::*;

/// Creates a question with the given coordinates and sensible defaults.
#[allow(dead_code)]
pub fn question(id: u32, section: u32, position: u32, input_type: &str) -> QuestionDefinition {
    QuestionDefinition {
        id: QuestionId(id),
        section: SectionId(section),
        position,
        input_type: input_type.to_string(),
        question: format!("Question {}", id),
        label: String::new(),
        framing_text: String::new(),
        help_text: String::new(),
        optional_canned_text: String::new(),
        optional: false,
        on_trunk: true,
        has_notes: false,
    }
}

/// Creates a topmost section with the given coordinates.
#[allow(dead_code)]
pub fn section(id: u32, position: u32, title: &str) -> SectionDefinition {
    SectionDefinition {
        id: SectionId(id),
        title: title.to_string(),
        label: String::new(),
        position,
        introductory_text: String::new(),
        comment: String::new(),
        super_section: None,
        optional: false,
    }
}

/// Creates a canned answer, optionally bound to a branch.
#[allow(dead_code)]
pub fn canned(id: u32, question: u32, choice: &str, transition: Option<u32>) -> CannedAnswerDefinition {
    CannedAnswerDefinition {
        id: CannedAnswerId(id),
        question: QuestionId(question),
        position: Some(id),
        choice: choice.to_string(),
        canned_text: String::new(),
        transition: transition.map(BranchId),
    }
}

/// Creates an explicit branch. An empty condition is unconditional, a
/// missing target jumps past the section.
#[allow(dead_code)]
pub fn branch(
    id: u32,
    current: u32,
    category: TransitionCategory,
    condition: &str,
    next: Option<u32>,
) -> BranchDefinition {
    BranchDefinition {
        id: BranchId(id),
        current_question: QuestionId(current),
        category,
        condition: condition.to_string(),
        next_question: next.map(QuestionId),
    }
}

/// Records an answer for a question.
#[allow(dead_code)]
pub fn answer(answers: &mut AnswerMap, id: u32, choice: Value) {
    answers.insert(id.to_string(), Answer::new(choice));
}

/// Creates a template with one section holding one question.
#[allow(dead_code)]
pub fn single_question_template() -> TemplateDefinition {
    TemplateDefinition {
        title: "Single".to_string(),
        sections: vec![section(1, 1, "Only")],
        questions: vec![question(1, 1, 1, "shortfreetext")],
        ..Default::default()
    }
}

/// Creates a template with one section holding three questions in a row,
/// with no explicit branches.
#[allow(dead_code)]
pub fn linear_template() -> TemplateDefinition {
    TemplateDefinition {
        title: "Linear".to_string(),
        sections: vec![section(1, 1, "All")],
        questions: vec![
            question(1, 1, 1, "shortfreetext"),
            question(2, 1, 2, "reason"),
            question(3, 1, 3, "positiveinteger"),
        ],
        ..Default::default()
    }
}

/// Creates the "shortcut" pattern:
///
/// q1 (bool) answered "Yes" jumps straight to q3, answered "No" falls
/// through to q2 by position. q2 sits off trunk since "Yes" skips it.
#[allow(dead_code)]
pub fn shortcut_template() -> TemplateDefinition {
    let mut detour = question(2, 1, 2, "reason");
    detour.on_trunk = false;
    TemplateDefinition {
        title: "Shortcut".to_string(),
        sections: vec![section(1, 1, "Branching")],
        questions: vec![question(1, 1, 1, "bool"), detour, question(3, 1, 3, "reason")],
        canned_answers: vec![
            canned(1, 1, "Yes", Some(1)),
            canned(2, 1, "No", None),
        ],
        branches: vec![branch(1, 1, TransitionCategory::CannedAnswer, "Yes", Some(3))],
        ..Default::default()
    }
}

/// Creates the "shortcut to last" pattern: q1 (bool) answered "Yes"
/// jumps past the end of the section, leaving q2 unvisited.
#[allow(dead_code)]
pub fn shortcut_to_last_template() -> TemplateDefinition {
    let mut detour = question(2, 1, 2, "reason");
    detour.on_trunk = false;
    TemplateDefinition {
        title: "Shortcut to last".to_string(),
        sections: vec![section(1, 1, "Branching"), section(2, 2, "After")],
        questions: vec![question(1, 1, 1, "bool"), detour, question(3, 2, 1, "reason")],
        canned_answers: vec![
            canned(1, 1, "Yes", Some(1)),
            canned(2, 1, "No", None),
        ],
        branches: vec![branch(1, 1, TransitionCategory::CannedAnswer, "Yes", None)],
        ..Default::default()
    }
}

/// Creates the "implicit diamond" pattern:
///
/// q1 (choice "Left"/"Right") falls through to q2 by position or jumps to
/// q3 on "Right"; both arms converge on q4, q2 via an unconditional
/// explicit branch and q3 by position. Both arms sit off trunk.
#[allow(dead_code)]
pub fn diamond_template() -> TemplateDefinition {
    let mut left = question(2, 1, 2, "reason");
    left.on_trunk = false;
    let mut right = question(3, 1, 3, "reason");
    right.on_trunk = false;
    TemplateDefinition {
        title: "Diamond".to_string(),
        sections: vec![section(1, 1, "Branching")],
        questions: vec![
            question(1, 1, 1, "choice"),
            left,
            right,
            question(4, 1, 4, "reason"),
        ],
        canned_answers: vec![
            canned(1, 1, "Left", None),
            canned(2, 1, "Right", Some(1)),
        ],
        branches: vec![
            branch(1, 1, TransitionCategory::CannedAnswer, "Right", Some(3)),
            branch(2, 2, TransitionCategory::ExplicitBranch, "", Some(4)),
        ],
        ..Default::default()
    }
}

/// Creates a template whose first section is optional, with the toggle
/// question and its skip branch written out, followed by an ordinary
/// section.
#[allow(dead_code)]
pub fn optional_section_template() -> TemplateDefinition {
    let mut details = section(1, 1, "Details");
    details.optional = true;
    let mut toggle = question(10, 1, 0, "bool");
    toggle.question = "Do you want to answer this section?".to_string();
    TemplateDefinition {
        title: "Optional".to_string(),
        sections: vec![details, section(2, 2, "Wrap up")],
        questions: vec![toggle, question(11, 1, 1, "reason"), question(21, 2, 1, "shortfreetext")],
        canned_answers: vec![
            canned(1, 10, "Yes", None),
            canned(2, 10, "No", None),
        ],
        branches: vec![branch(1, 10, TransitionCategory::Last, "No", None)],
        ..Default::default()
    }
}

/// Creates a template with nested sections:
///
/// "Plan" (with two subsections "Storage" and "Backup") followed by the
/// topmost "Ethics". Section positions are unique across the template.
/// Each section holds one question.
#[allow(dead_code)]
pub fn nested_sections_template() -> TemplateDefinition {
    let mut storage = section(2, 2, "Storage");
    storage.super_section = Some(SectionId(1));
    let mut backup = section(3, 3, "Backup");
    backup.super_section = Some(SectionId(1));
    TemplateDefinition {
        title: "Nested".to_string(),
        sections: vec![section(1, 1, "Plan"), storage, backup, section(4, 4, "Ethics")],
        questions: vec![
            question(1, 1, 1, "shortfreetext"),
            question(2, 2, 1, "reason"),
            question(3, 3, 1, "reason"),
            question(4, 4, 1, "reason"),
        ],
        ..Default::default()
    }
}

/// Builds a definition into a template, panicking on any design error.
#[allow(dead_code)]
pub fn build(definition: TemplateDefinition) -> Template {
    Template::builder(definition)
        .build()
        .expect("Failed to build template")
}
