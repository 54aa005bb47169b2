//! Path enumeration over sections, answer validity, and canned-text
//! generation.
//!
//! A section's paths are every way the branching graph allows an answerer
//! to move from its first question to its end. Validity of a branching
//! section hinges on these: the recorded answers must form one complete,
//! legal path whose questions are all answered validly.

use ahash::AHashSet;
use serde::Serialize;
use serde_json::Value;

use crate::data::AnswerMap;
use crate::error::TraversalError;
use crate::flow::PathNode;
use crate::graph;
use crate::template::definition::{QuestionId, SectionId};
use crate::template::traversal::{Question, Section};
use crate::template::Template;

/// The generated text for one answered (or skipped) question.
#[derive(Debug, Clone, Serialize)]
pub struct CannedText {
    pub question: String,
    pub text: String,
    pub choice: Value,
    pub notes: Option<String>,
}

/// The generated text of one section: its presentation fields plus the
/// per-question texts.
#[derive(Debug, Clone, Serialize)]
pub struct SectionCannedText {
    pub section: SectionId,
    pub full_title: String,
    pub introductory_text: String,
    pub texts: Vec<CannedText>,
}

impl<'t> Question<'t> {
    /// Whether the recorded answers hold a valid answer for this question.
    /// An unanswered question only validates when optional.
    pub fn validate_data(&self, answers: &AnswerMap) -> bool {
        if answers.is_empty() {
            return false;
        }
        match self.answer(answers) {
            None => self.record().optional,
            Some(answer) => {
                self.context_with(|ctx| self.input_type().validate_choice(ctx, &answer.choice))
            }
        }
    }

    /// The canned text for this question's recorded answer.
    pub fn generate_canned_text(&self, answers: &AnswerMap) -> CannedText {
        let answer = self.answer(answers).cloned().unwrap_or_default();
        let text = self.context_with(|ctx| self.input_type().canned_answer(ctx, &answer.choice));
        CannedText {
            question: self.to_string(),
            text,
            choice: answer.choice,
            notes: answer.notes,
        }
    }
}

impl<'t> Section<'t> {
    /// Every path through this section, from its first question to wherever
    /// the graph falls off the section's end.
    ///
    /// An empty section has no paths, which is normal. Exceeding the
    /// template's path budget is an error, never a silent truncation.
    pub fn find_all_paths(&self) -> Result<Vec<Vec<QuestionId>>, TraversalError> {
        let Some(first) = self.first_question() else {
            return Ok(Vec::new());
        };
        let map = self.generate_transition_map();
        let adjacency = map.as_adjacency();
        let budget = self.template().path_budget();
        let mut paths = Vec::new();
        for path in graph::dfs_paths(&adjacency, PathNode::Question(first.id()), None) {
            if let Some(budget) = budget {
                if paths.len() >= budget {
                    return Err(TraversalError::PathBudgetExceeded(budget));
                }
            }
            paths.push(path.iter().copied().filter_map(PathNode::question).collect());
        }
        // Discovery order depends on hash seeding; sort for stable output.
        paths.sort();
        Ok(paths)
    }

    /// The shortest set of questions an answerer must visit: the on-trunk
    /// questions, widened by whatever off-trunk questions the recorded
    /// answers actually reached.
    pub fn find_minimal_path(&self, answers: Option<&AnswerMap>) -> Vec<Question<'t>> {
        match answers {
            None => self.on_trunk_questions(),
            Some(answers) if answers.is_empty() => self.on_trunk_questions(),
            Some(answers) => self
                .questions()
                .into_iter()
                .filter(|q| q.record().on_trunk || q.is_answered(answers))
                .collect(),
        }
    }

    /// Replays the recorded answers from the first question and returns the
    /// ids visited, stopping at the first unanswered question. An answer no
    /// transition matches also stops the path.
    pub fn generate_complete_path_from_data(
        &self,
        answers: &AnswerMap,
    ) -> Result<Vec<QuestionId>, TraversalError> {
        let Some(mut question) = self.first_question() else {
            return Ok(Vec::new());
        };
        let mut path = Vec::new();
        loop {
            if !question.is_answered(answers) || path.contains(&question.id()) {
                break;
            }
            path.push(question.id());
            let next = match question.next_question_within(answers) {
                Ok(next) => next,
                Err(TraversalError::UnresolvedCondition { .. }) => None,
                Err(error) => return Err(error),
            };
            match next {
                Some(next) => question = next,
                None => break,
            }
        }
        Ok(path)
    }

    /// Whether `path` is one of the section's complete paths.
    pub fn is_complete_path(&self, path: &[QuestionId]) -> Result<bool, TraversalError> {
        Ok(self.find_all_paths()?.iter().any(|p| p == path))
    }

    /// Whether `path` is complete and every question on it answered
    /// validly: the path must be covered by `valids` and disjoint from
    /// `invalids`.
    pub fn is_valid_and_complete_path(
        &self,
        path: &[QuestionId],
        valids: &AHashSet<QuestionId>,
        invalids: &AHashSet<QuestionId>,
    ) -> Result<bool, TraversalError> {
        if !self.is_complete_path(path)? {
            return Ok(false);
        }
        let on_path: AHashSet<QuestionId> = path.iter().copied().collect();
        Ok(on_path.is_subset(valids) && on_path.is_disjoint(invalids))
    }

    /// Splits the section's questions into the sets the recorded answers
    /// are valid and invalid for. Optional questions start out valid.
    pub fn find_validity_of_questions(
        &self,
        answers: &AnswerMap,
    ) -> (AHashSet<QuestionId>, AHashSet<QuestionId>) {
        let questions = self.questions();
        let mut valids: AHashSet<QuestionId> = questions
            .iter()
            .filter(|q| q.record().optional)
            .map(Question::id)
            .collect();
        if answers.is_empty() {
            let invalids = questions
                .iter()
                .filter(|q| !q.record().optional)
                .map(Question::id)
                .collect();
            return (valids, invalids);
        }
        let mut invalids = AHashSet::new();
        for question in &questions {
            if question.validate_data(answers) {
                valids.insert(question.id());
            } else {
                invalids.insert(question.id());
            }
        }
        (valids, invalids)
    }

    /// Whether the recorded answers answer this section fully and validly.
    ///
    /// A skipped optional section is valid as a whole. A section without
    /// branching needs every question valid; a branching section needs the
    /// recorded answers to form one complete, legal path of valid answers.
    pub fn validate_data(&self, answers: &AnswerMap) -> Result<bool, TraversalError> {
        if self.is_empty() {
            return Ok(true);
        }
        if answers.is_empty() {
            return Ok(false);
        }
        if self.is_skipped(answers) {
            return Ok(true);
        }
        let (valids, invalids) = self.find_validity_of_questions(answers);
        if !self.branching() {
            return Ok(invalids.is_empty());
        }
        let path = self.generate_complete_path_from_data(answers)?;
        self.is_valid_and_complete_path(&path, &valids, &invalids)
    }

    /// The canned texts of this section. A skipped section renders only
    /// its toggle question; otherwise every question after the toggle
    /// position renders.
    pub fn generate_canned_text(&self, answers: &AnswerMap) -> Vec<CannedText> {
        let questions: Vec<Question<'t>> = if self.is_skipped(answers) {
            self.optional_section_question().into_iter().collect()
        } else {
            self.questions()
                .into_iter()
                .filter(|q| q.position() > 0)
                .collect()
        };
        questions
            .iter()
            .map(|q| q.generate_canned_text(answers))
            .collect()
    }
}

impl Template {
    /// The canned text of the whole template, section by section in
    /// hierarchy order.
    pub fn generate_canned_text(&self, answers: &AnswerMap) -> Vec<SectionCannedText> {
        self.ordered_sections()
            .iter()
            .map(|section| SectionCannedText {
                section: section.id(),
                full_title: section.full_title(),
                introductory_text: section.record().introductory_text.clone(),
                texts: section.generate_canned_text(answers),
            })
            .collect()
    }

    /// Answer keys that name no question of this template.
    pub fn list_unknown_answers(&self, answers: &AnswerMap) -> Vec<String> {
        let mut unknown: Vec<String> = answers
            .keys()
            .filter(|key| {
                key.parse::<u32>()
                    .map(QuestionId)
                    .map_or(true, |id| self.question(id).is_none())
            })
            .cloned()
            .collect();
        unknown.sort_unstable();
        unknown
    }

    /// Splits the sections into the sets the recorded answers are valid
    /// and invalid for. Sections containing optional questions start out
    /// valid.
    pub fn find_validity_of_sections(
        &self,
        answers: &AnswerMap,
    ) -> Result<(AHashSet<SectionId>, AHashSet<SectionId>), TraversalError> {
        let sections = self.ordered_sections();
        let mut valids: AHashSet<SectionId> = sections
            .iter()
            .filter(|s| s.questions().iter().any(|q| q.record().optional))
            .map(Section::id)
            .collect();
        if answers.is_empty() {
            let invalids = sections
                .iter()
                .map(Section::id)
                .filter(|id| !valids.contains(id))
                .collect();
            return Ok((valids, invalids));
        }
        let mut invalids = AHashSet::new();
        for section in &sections {
            if section.validate_data(answers)? {
                valids.insert(section.id());
            } else {
                invalids.insert(section.id());
            }
        }
        Ok((valids, invalids))
    }

    /// Whether the recorded answers answer the whole template fully and
    /// validly.
    pub fn validate_data(&self, answers: &AnswerMap) -> Result<bool, TraversalError> {
        if answers.is_empty() {
            return Ok(false);
        }
        let (_, invalids) = self.find_validity_of_sections(answers)?;
        Ok(invalids.is_empty())
    }

    /// Loose design check over every question: branching-capable types
    /// need the canned answers their conditions come from.
    pub fn is_design_valid(&self) -> bool {
        self.questions().iter().all(|question| {
            let valid = question.context_with(|ctx| question.input_type().is_valid_design(ctx));
            if !valid {
                log::warn!(
                    "question #{} has an invalid '{}' design",
                    question.id(),
                    question.record().input_type
                );
            }
            valid
        })
    }
}
