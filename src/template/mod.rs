//! Template building and querying.
//!
//! A [`TemplateDefinition`] is the raw, serializable record set: sections,
//! questions, canned answers and explicit branches. A [`Template`] is the
//! checked and indexed form of those records, built once via
//! [`Template::builder`] and then queried freely: every traversal operation
//! is a pure function of the immutable template plus a caller-supplied
//! answer snapshot.

pub mod artifact;
pub mod conversion;
pub mod definition;
mod paths;
mod traversal;

pub use artifact::*;
pub use conversion::*;
pub use definition::*;
pub use traversal::{Question, Section};

use ahash::AHashMap;

use crate::error::{TemplateBuildError, TraversalError};
use crate::inputs::{InputType, InputTypeRegistry};

/// Default cap on the number of paths enumerated per section.
pub const DEFAULT_PATH_BUDGET: usize = 10_000;

/// A checked, indexed question template, ready for traversal.
///
/// Holds the definition records together with lookup tables resolved at
/// build time: id indexes, per-section question order, per-question branch
/// and canned-answer order, and the input-type slot of every question.
#[derive(Debug)]
pub struct Template {
    definition: TemplateDefinition,
    registry: InputTypeRegistry,
    path_budget: Option<usize>,
    section_index: AHashMap<SectionId, usize>,
    question_index: AHashMap<QuestionId, usize>,
    questions_by_section: AHashMap<SectionId, Vec<usize>>,
    branches_by_source: AHashMap<QuestionId, Vec<usize>>,
    canned_by_question: AHashMap<QuestionId, Vec<usize>>,
    input_slots: Vec<usize>,
    ordered_section_ids: Vec<SectionId>,
}

/// Configures and builds a [`Template`].
pub struct TemplateBuilder {
    definition: TemplateDefinition,
    registry: InputTypeRegistry,
    path_budget: Option<usize>,
}

impl TemplateBuilder {
    pub fn new(definition: TemplateDefinition) -> Self {
        Self {
            definition,
            registry: InputTypeRegistry::with_defaults(),
            path_budget: Some(DEFAULT_PATH_BUDGET),
        }
    }

    /// Replaces the default input-type registry wholesale.
    pub fn with_registry(mut self, registry: InputTypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Registers a single additional input type on top of the defaults.
    pub fn with_input_type(mut self, input_type: Box<dyn InputType>) -> Self {
        self.registry.register(input_type);
        self
    }

    /// Caps path enumeration per section; `None` removes the cap.
    pub fn with_path_budget(mut self, budget: Option<usize>) -> Self {
        self.path_budget = budget;
        self
    }

    /// Checks the definition records and resolves the lookup tables.
    ///
    /// Rejected here: a question in an unknown section or with an
    /// unregistered input type, two questions or two sections sharing a
    /// position, an ordinary question at the reserved position 0, an
    /// optional section without its toggle, a branch from an unknown
    /// question, duplicate branches, a canned answer naming an unknown
    /// question or branch, and broken or cyclic section nesting. Branch
    /// *targets* are deliberately not checked: a dangling target is
    /// reported during traversal, so a broken template can still be loaded
    /// and inspected.
    pub fn build(self) -> Result<Template, TemplateBuildError> {
        let definition = self.definition;
        let registry = self.registry;

        let mut section_index = AHashMap::new();
        for (index, section) in definition.sections.iter().enumerate() {
            section_index.insert(section.id, index);
        }
        for section in &definition.sections {
            if let Some(super_id) = section.super_section {
                if !section_index.contains_key(&super_id) {
                    return Err(TemplateBuildError::UnknownSuperSection {
                        section_id: section.id,
                        super_section_id: super_id,
                    });
                }
            }
        }

        // Section positions order the whole template, so they are unique
        // across it, not merely within one nesting level.
        let mut section_positions: Vec<u32> =
            definition.sections.iter().map(|s| s.position).collect();
        section_positions.sort_unstable();
        for pair in section_positions.windows(2) {
            if pair[0] == pair[1] {
                return Err(TemplateBuildError::DuplicateSectionPosition { position: pair[0] });
            }
        }

        let ordered_section_ids = flatten_sections(&definition.sections);
        if ordered_section_ids.len() != definition.sections.len() {
            let reachable: AHashMap<SectionId, ()> =
                ordered_section_ids.iter().map(|&id| (id, ())).collect();
            for section in &definition.sections {
                if !reachable.contains_key(&section.id) {
                    return Err(TemplateBuildError::CyclicSectionNesting {
                        section_id: section.id,
                    });
                }
            }
        }

        let mut question_index = AHashMap::new();
        let mut questions_by_section: AHashMap<SectionId, Vec<usize>> = AHashMap::new();
        let mut input_slots = Vec::with_capacity(definition.questions.len());
        for (index, question) in definition.questions.iter().enumerate() {
            let Some(&section_slot) = section_index.get(&question.section) else {
                return Err(TemplateBuildError::UnknownSection {
                    question_id: question.id,
                    section_id: question.section,
                });
            };
            if question.position == 0 && !definition.sections[section_slot].optional {
                return Err(TemplateBuildError::ReservedPosition {
                    question_id: question.id,
                    section_id: question.section,
                });
            }
            let Some(slot) = registry.slot_of(&question.input_type) else {
                return Err(TemplateBuildError::UnknownInputType {
                    question_id: question.id,
                    type_name: question.input_type.clone(),
                });
            };
            question_index.insert(question.id, index);
            questions_by_section
                .entry(question.section)
                .or_default()
                .push(index);
            input_slots.push(slot);
        }
        for (&section_id, indexes) in &mut questions_by_section {
            indexes.sort_by_key(|&i| definition.questions[i].position);
            for pair in indexes.windows(2) {
                let position = definition.questions[pair[0]].position;
                if position == definition.questions[pair[1]].position {
                    return Err(TemplateBuildError::DuplicateQuestionPosition {
                        section_id,
                        position,
                    });
                }
            }
        }
        for section in &definition.sections {
            if !section.optional {
                continue;
            }
            let has_toggle = questions_by_section
                .get(&section.id)
                .and_then(|indexes| indexes.first())
                .map(|&i| &definition.questions[i])
                .is_some_and(QuestionDefinition::is_section_toggle);
            if !has_toggle {
                return Err(TemplateBuildError::MissingSectionToggle {
                    section_id: section.id,
                });
            }
        }

        let mut branches_by_source: AHashMap<QuestionId, Vec<usize>> = AHashMap::new();
        for (index, branch) in definition.branches.iter().enumerate() {
            if !question_index.contains_key(&branch.current_question) {
                return Err(TemplateBuildError::UnknownBranchSource {
                    branch_id: branch.id,
                    question_id: branch.current_question,
                });
            }
            if definition.branches[..index]
                .iter()
                .any(|earlier| earlier.duplicates(branch))
            {
                return Err(TemplateBuildError::DuplicateBranch(branch.id));
            }
            branches_by_source
                .entry(branch.current_question)
                .or_default()
                .push(index);
        }
        for indexes in branches_by_source.values_mut() {
            indexes.sort_by_key(|&i| definition.branches[i].id);
        }

        let mut canned_by_question: AHashMap<QuestionId, Vec<usize>> = AHashMap::new();
        for (index, canned) in definition.canned_answers.iter().enumerate() {
            if !question_index.contains_key(&canned.question) {
                return Err(TemplateBuildError::UnknownCannedAnswerQuestion {
                    question_id: canned.question,
                    choice: canned.choice.clone(),
                });
            }
            if let Some(branch_id) = canned.transition {
                if definition.branch(branch_id).is_none() {
                    return Err(TemplateBuildError::UnknownCannedAnswerBranch {
                        branch_id,
                        choice: canned.choice.clone(),
                    });
                }
            }
            canned_by_question
                .entry(canned.question)
                .or_default()
                .push(index);
        }
        for indexes in canned_by_question.values_mut() {
            // Position is optional; unpositioned canned answers sort last.
            indexes.sort_by_key(|&i| {
                let canned = &definition.canned_answers[i];
                (canned.position.is_none(), canned.position, canned.id)
            });
        }

        log::info!(
            "Built template '{}': {} sections, {} questions, {} branches",
            definition.title,
            definition.sections.len(),
            definition.questions.len(),
            definition.branches.len()
        );
        Ok(Template {
            definition,
            registry,
            path_budget: self.path_budget,
            section_index,
            question_index,
            questions_by_section,
            branches_by_source,
            canned_by_question,
            input_slots,
            ordered_section_ids,
        })
    }
}

/// Flattens the section hierarchy: topmost sections by position, each
/// followed by its subsections, depth first.
fn flatten_sections(sections: &[SectionDefinition]) -> Vec<SectionId> {
    let mut children: AHashMap<Option<SectionId>, Vec<&SectionDefinition>> = AHashMap::new();
    for section in sections {
        children.entry(section.super_section).or_default().push(section);
    }
    for group in children.values_mut() {
        group.sort_by_key(|s| s.position);
    }
    let mut ordered = Vec::with_capacity(sections.len());
    let mut stack: Vec<SectionId> = children
        .get(&None)
        .map(|topmost| topmost.iter().rev().map(|s| s.id).collect())
        .unwrap_or_default();
    while let Some(id) = stack.pop() {
        ordered.push(id);
        if let Some(subsections) = children.get(&Some(id)) {
            stack.extend(subsections.iter().rev().map(|s| s.id));
        }
    }
    ordered
}

impl Template {
    pub fn builder(definition: TemplateDefinition) -> TemplateBuilder {
        TemplateBuilder::new(definition)
    }

    pub fn title(&self) -> &str {
        &self.definition.title
    }

    pub fn description(&self) -> &str {
        &self.definition.description
    }

    /// The raw definition records this template was built from.
    pub fn definition(&self) -> &TemplateDefinition {
        &self.definition
    }

    pub fn registry(&self) -> &InputTypeRegistry {
        &self.registry
    }

    pub fn path_budget(&self) -> Option<usize> {
        self.path_budget
    }

    pub fn section(&self, id: SectionId) -> Option<Section<'_>> {
        self.section_index
            .get(&id)
            .map(|&index| Section::new(self, &self.definition.sections[index]))
    }

    pub fn question(&self, id: QuestionId) -> Option<Question<'_>> {
        self.question_index
            .get(&id)
            .map(|&index| Question::new(self, &self.definition.questions[index]))
    }

    /// Like [`Template::section`], but an absent id is an error.
    pub fn require_section(&self, id: SectionId) -> Result<Section<'_>, TraversalError> {
        self.section(id).ok_or(TraversalError::UnknownSection(id))
    }

    /// Like [`Template::question`], but an absent id is an error.
    pub fn require_question(&self, id: QuestionId) -> Result<Question<'_>, TraversalError> {
        self.question(id).ok_or(TraversalError::UnknownQuestion(id))
    }

    /// The sections in hierarchy order: topmost sections by position, each
    /// followed by its subsections, depth first.
    pub fn ordered_sections(&self) -> Vec<Section<'_>> {
        self.ordered_section_ids
            .iter()
            .filter_map(|&id| self.section(id))
            .collect()
    }

    /// All questions, in section hierarchy order and by position within
    /// each section.
    pub fn questions(&self) -> Vec<Question<'_>> {
        self.ordered_section_ids
            .iter()
            .flat_map(|id| self.question_indexes_of(*id))
            .map(|&index| Question::new(self, &self.definition.questions[index]))
            .collect()
    }

    /// The section with the lowest position, over the whole template.
    pub fn first_section(&self) -> Option<Section<'_>> {
        self.definition
            .sections
            .iter()
            .min_by_key(|s| s.position)
            .map(|record| Section::new(self, record))
    }

    /// The section with the highest position, over the whole template.
    pub fn last_section(&self) -> Option<Section<'_>> {
        self.definition
            .sections
            .iter()
            .max_by_key(|s| s.position)
            .map(|record| Section::new(self, record))
    }

    /// The first question of the first section, if that section has any.
    pub fn first_question(&self) -> Option<Question<'_>> {
        self.first_section()?.first_question()
    }

    pub fn is_empty(&self) -> bool {
        self.definition.questions.is_empty()
    }

    fn section_record(&self, id: SectionId) -> &SectionDefinition {
        &self.definition.sections[self.section_index[&id]]
    }

    fn question_indexes_of(&self, section: SectionId) -> &[usize] {
        self.questions_by_section
            .get(&section)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn branch_indexes_of(&self, question: QuestionId) -> &[usize] {
        self.branches_by_source
            .get(&question)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn canned_indexes_of(&self, question: QuestionId) -> &[usize] {
        self.canned_by_question
            .get(&question)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn strategy_of(&self, question: QuestionId) -> &dyn InputType {
        let index = self.question_index[&question];
        self.registry.by_slot(self.input_slots[index])
    }
}
