//! Views over a built template and the movement operations between
//! questions: next, previous, and the forward walks that replay recorded
//! answers.
//!
//! The forward direction is cheap: once an answer is fixed, the transition
//! out of a question is unambiguous. The backward direction is
//! reconstructed by walking forward from the last answered on-trunk
//! question and testing which path reaches the current question. That
//! asymmetry is deliberate.

use std::fmt;

use crate::data::{Answer, AnswerMap, answer_for};
use crate::error::TraversalError;
use crate::flow::{Transition, TransitionCategory, TransitionMap};
use crate::inputs::{InputType, QuestionContext, is_falsy};
use crate::template::definition::{
    BranchDefinition, CannedAnswerDefinition, QuestionDefinition, QuestionId, SectionDefinition,
    SectionId,
};
use crate::template::Template;

/// A question of a built template, bundled with the input-type strategy
/// resolved for it.
#[derive(Clone, Copy)]
pub struct Question<'t> {
    template: &'t Template,
    record: &'t QuestionDefinition,
}

/// A section of a built template.
#[derive(Clone, Copy)]
pub struct Section<'t> {
    template: &'t Template,
    record: &'t SectionDefinition,
}

impl fmt::Debug for Question<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Question")
            .field("id", &self.record.id)
            .field("position", &self.record.position)
            .field("input_type", &self.record.input_type)
            .finish()
    }
}

impl fmt::Debug for Section<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("id", &self.record.id)
            .field("position", &self.record.position)
            .field("title", &self.record.title)
            .finish()
    }
}

impl PartialEq for Question<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.record.id == other.record.id
    }
}

impl Eq for Question<'_> {}

impl PartialEq for Section<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.record.id == other.record.id
    }
}

impl Eq for Section<'_> {}

impl fmt::Display for Question<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.record.label.is_empty() {
            write!(f, "{}", self.record.question)
        } else {
            write!(f, "{} {}", self.record.label, self.record.question)
        }
    }
}

impl fmt::Display for Section<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.template.title(), self.full_title())
    }
}

impl<'t> Question<'t> {
    pub(super) fn new(template: &'t Template, record: &'t QuestionDefinition) -> Self {
        Self { template, record }
    }

    pub fn id(&self) -> QuestionId {
        self.record.id
    }

    pub fn position(&self) -> u32 {
        self.record.position
    }

    pub fn record(&self) -> &'t QuestionDefinition {
        self.record
    }

    pub fn section(&self) -> Section<'t> {
        Section::new(self.template, self.template.section_record(self.record.section))
    }

    /// The input-type strategy backing this question.
    pub fn input_type(&self) -> &'t dyn InputType {
        self.template.strategy_of(self.record.id)
    }

    pub fn is_section_toggle(&self) -> bool {
        self.record.is_section_toggle()
    }

    /// The question's canned answers, in presentation order.
    pub fn canned_answers(&self) -> Vec<&'t CannedAnswerDefinition> {
        self.template
            .canned_indexes_of(self.record.id)
            .iter()
            .map(|&index| &self.template.definition().canned_answers[index])
            .collect()
    }

    /// The explicit branches out of this question, in id order.
    pub fn branches(&self) -> Vec<&'t BranchDefinition> {
        self.template
            .branch_indexes_of(self.record.id)
            .iter()
            .map(|&index| &self.template.definition().branches[index])
            .collect()
    }

    pub(super) fn context_with<R>(&self, f: impl FnOnce(&QuestionContext) -> R) -> R {
        let canned = self.canned_answers();
        let context = QuestionContext {
            optional: self.record.optional,
            framing_text: &self.record.framing_text,
            optional_canned_text: &self.record.optional_canned_text,
            canned_answers: &canned,
        };
        f(&context)
    }

    pub fn answer<'a>(&self, answers: &'a AnswerMap) -> Option<&'a Answer> {
        answer_for(answers, self.record.id)
    }

    pub fn is_answered(&self, answers: &AnswerMap) -> bool {
        self.answer(answers).is_some()
    }

    /// The normalized condition string for this question's recorded answer,
    /// used to look up a transition. `None` when unanswered, or when the
    /// input type cannot steer branching.
    pub fn condition(&self, answers: &AnswerMap) -> Option<String> {
        let answer = self.answer(answers)?;
        self.input_type().transition_choice(&answer.choice)
    }

    /// All questions after this one in the same section, by position.
    pub fn all_following_questions(&self) -> Vec<Question<'t>> {
        self.section()
            .questions()
            .into_iter()
            .filter(|q| q.position() > self.record.position)
            .collect()
    }

    /// All questions before this one in the same section, by position.
    pub fn all_preceding_questions(&self) -> Vec<Question<'t>> {
        self.section()
            .questions()
            .into_iter()
            .filter(|q| q.position() < self.record.position)
            .collect()
    }

    /// The next on-trunk question after this one in the same section.
    pub fn next_on_trunk(&self) -> Option<Question<'t>> {
        self.all_following_questions()
            .into_iter()
            .find(|q| q.record.on_trunk)
    }

    /// The potential moves out of this question.
    ///
    /// Nothing follows by position: a single implicit `last` transition and
    /// nothing else. Otherwise the implicit `position` fallback to the next
    /// question in order, plus every explicit branch.
    pub fn potential_next_transitions(&self) -> Vec<Transition> {
        let following = self.all_following_questions();
        let Some(next_by_position) = following.first() else {
            return vec![Transition::new(
                TransitionCategory::Last,
                self.record.id,
                None,
                None,
            )];
        };
        let mut transitions = vec![Transition::new(
            TransitionCategory::Position,
            self.record.id,
            None,
            Some(next_by_position.id()),
        )];
        transitions.extend(self.branches().iter().map(|b| b.to_transition()));
        transitions
    }

    /// The potential next questions, without transition metadata.
    pub fn potential_next_questions(&self) -> Vec<QuestionId> {
        let mut next: Vec<QuestionId> = self
            .potential_next_transitions()
            .into_iter()
            .filter_map(|t| t.next)
            .collect();
        next.sort_unstable();
        next.dedup();
        next
    }

    /// The transition map out of this single question: the potential set,
    /// with explicit branches re-added last so they own contested
    /// `(current, choice)` slots.
    pub fn generate_transition_map(&self) -> TransitionMap {
        let mut map = TransitionMap::new();
        for transition in self.potential_next_transitions() {
            map.add(transition);
        }
        for branch in self.branches() {
            map.add(branch.to_transition());
        }
        map
    }

    /// The next question given the recorded answers.
    ///
    /// Selects a transition by the condition derived from this question's
    /// answer. A transition without a target means "leave the section":
    /// with `in_section` set that is the end of the walk, otherwise the
    /// walk continues at the first question of the next non-empty section.
    ///
    /// A transition pointing at a question that no longer exists is
    /// [`TraversalError::DanglingBranchTarget`]; an answer no transition
    /// matches is [`TraversalError::UnresolvedCondition`].
    pub fn next_question(
        &self,
        answers: &AnswerMap,
        in_section: bool,
    ) -> Result<Option<Question<'t>>, TraversalError> {
        let map = self.generate_transition_map();
        let condition = self.condition(answers);
        let transition = map.select_transition(self.record.id, condition.as_deref())?;
        if let Some(next_id) = transition.and_then(|t| t.next) {
            return match self.template.question(next_id) {
                Some(next) => {
                    log::debug!("next_question: found #{next_id}");
                    Ok(Some(next))
                }
                None => Err(TraversalError::DanglingBranchTarget {
                    current_id: self.record.id,
                    missing_id: next_id,
                }),
            };
        }
        if in_section {
            log::debug!("next_question: last in section");
            return Ok(None);
        }
        Ok(self.section().first_question_in_next_section())
    }

    /// [`next_question`](Question::next_question) bounded to this
    /// question's own section.
    pub fn next_question_within(
        &self,
        answers: &AnswerMap,
    ) -> Result<Option<Question<'t>>, TraversalError> {
        self.next_question(answers, true)
    }

    pub fn has_prev_question(&self) -> bool {
        !self.all_preceding_questions().is_empty()
            || self.section().prev_nonempty_section().is_some()
    }

    /// The candidate previous questions, narrowed by position.
    ///
    /// The positionally-previous question, when on trunk, is the only
    /// candidate. Otherwise every question from the last preceding
    /// on-trunk question up to this one is a candidate, and the recorded
    /// answers have to disambiguate.
    pub fn potential_prev_questions(&self) -> Vec<Question<'t>> {
        let preceding = self.all_preceding_questions();
        let Some(previous) = preceding.last() else {
            return Vec::new();
        };
        if previous.record.on_trunk {
            return vec![*previous];
        }
        let Some(last_on_trunk) = preceding.iter().rfind(|q| q.record.on_trunk) else {
            log::warn!(
                "potential_prev_questions: no on-trunk question before #{}",
                self.record.id
            );
            return Vec::new();
        };
        let from = last_on_trunk.position();
        preceding
            .into_iter()
            .filter(|q| q.position() >= from)
            .collect()
    }

    /// The best previous question given the recorded answers.
    ///
    /// A single candidate is returned directly. Multiple candidates are
    /// disambiguated by replaying the recorded decision trail forward from
    /// the last answered on-trunk question before this one. With no
    /// preceding question at all and `in_section` unset, the walk falls
    /// back to the previous non-empty section.
    pub fn prev_question(
        &self,
        answers: &AnswerMap,
        in_section: bool,
    ) -> Result<Option<Question<'t>>, TraversalError> {
        let candidates = self.potential_prev_questions();
        if candidates.is_empty() {
            if in_section {
                return Ok(None);
            }
            return self.best_prev_question_in_prev_section(answers);
        }
        if let [only] = candidates.as_slice() {
            log::debug!("prev_question: single candidate #{}", only.id());
            return Ok(Some(*only));
        }
        let on_trunk_answered: Vec<Question<'t>> = self
            .section()
            .on_trunk_questions()
            .into_iter()
            .filter(|q| q.position() < self.record.position && q.is_answered(answers))
            .collect();
        let Some(previous_answered) = on_trunk_answered.last() else {
            return Ok(None);
        };
        self.template.walk_forward(*previous_answered, *self, answers)
    }

    /// [`prev_question`](Question::prev_question) bounded to this
    /// question's own section.
    pub fn prev_question_within(
        &self,
        answers: &AnswerMap,
    ) -> Result<Option<Question<'t>>, TraversalError> {
        self.prev_question(answers, true)
    }

    fn best_prev_question_in_prev_section(
        &self,
        answers: &AnswerMap,
    ) -> Result<Option<Question<'t>>, TraversalError> {
        let section = self.section();
        if let Some(found) = section.last_answered_question_in_prev_section(answers)? {
            log::debug!("prev_question: last answered in previous section: #{}", found.id());
            return Ok(Some(found));
        }
        Ok(section.last_on_trunk_question_in_prev_section())
    }
}

impl<'t> Section<'t> {
    pub(super) fn new(template: &'t Template, record: &'t SectionDefinition) -> Self {
        Self { template, record }
    }

    pub(super) fn template(&self) -> &'t Template {
        self.template
    }

    pub fn id(&self) -> SectionId {
        self.record.id
    }

    pub fn position(&self) -> u32 {
        self.record.position
    }

    pub fn record(&self) -> &'t SectionDefinition {
        self.record
    }

    pub fn title(&self) -> &'t str {
        &self.record.title
    }

    /// The label and title together, when a label is set.
    pub fn full_title(&self) -> String {
        if self.record.label.is_empty() {
            self.record.title.clone()
        } else {
            format!("{} {}", self.record.label, self.record.title)
        }
    }

    pub fn is_optional(&self) -> bool {
        self.record.optional
    }

    pub fn super_section(&self) -> Option<Section<'t>> {
        self.record
            .super_section
            .and_then(|id| self.template.section(id))
    }

    /// The topmost section this one nests under, or itself.
    pub fn topmost_section(&self) -> Section<'t> {
        let mut current = *self;
        while let Some(parent) = current.super_section() {
            current = parent;
        }
        current
    }

    /// Nesting depth, starting at 1 for topmost sections.
    pub fn depth(&self) -> u32 {
        let mut depth = 1;
        let mut current = *self;
        while let Some(parent) = current.super_section() {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Whether traversal through this section can branch: it is optional
    /// (the toggle skips it) or some question in it has an explicit branch.
    pub fn branching(&self) -> bool {
        self.record.optional
            || self
                .questions()
                .iter()
                .any(|q| !q.branches().is_empty())
    }

    /// The section's questions, by position.
    pub fn questions(&self) -> Vec<Question<'t>> {
        self.template
            .question_indexes_of(self.record.id)
            .iter()
            .map(|&index| Question::new(self.template, &self.template.definition().questions[index]))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.template.question_indexes_of(self.record.id).is_empty()
    }

    pub fn first_question(&self) -> Option<Question<'t>> {
        self.questions().into_iter().next()
    }

    /// The last question by position. Usually
    /// [`last_on_trunk_question`](Section::last_on_trunk_question) is the
    /// better jump target, since this one may sit on a branch the answers
    /// never visit.
    pub fn last_question(&self) -> Option<Question<'t>> {
        self.questions().into_iter().next_back()
    }

    pub fn on_trunk_questions(&self) -> Vec<Question<'t>> {
        self.questions()
            .into_iter()
            .filter(|q| q.record().on_trunk)
            .collect()
    }

    pub fn last_on_trunk_question(&self) -> Option<Question<'t>> {
        self.on_trunk_questions().into_iter().next_back()
    }

    /// The toggle question of an optional section.
    pub fn optional_section_question(&self) -> Option<Question<'t>> {
        if !self.record.optional {
            return None;
        }
        self.questions().into_iter().find(|q| q.position() == 0)
    }

    /// Whether the recorded answers skip this section: it is optional and
    /// its toggle is unanswered or answered "No".
    pub fn is_skipped(&self, answers: &AnswerMap) -> bool {
        if !self.record.optional {
            return false;
        }
        let Some(toggle) = self.optional_section_question() else {
            return false;
        };
        let Some(answer) = toggle.answer(answers) else {
            return true;
        };
        if is_falsy(&answer.choice) {
            return true;
        }
        toggle.input_type().serialize_condition(&answer.choice).as_deref() == Some("No")
    }

    pub fn is_answered(&self, answers: &AnswerMap) -> bool {
        self.questions().iter().any(|q| q.is_answered(answers))
    }

    /// The section's answered questions, by position.
    pub fn answered_questions(&self, answers: &AnswerMap) -> Vec<Question<'t>> {
        self.questions()
            .into_iter()
            .filter(|q| q.is_answered(answers))
            .collect()
    }

    /// The last question the recorded answers actually reached.
    ///
    /// Starts from the last answered on-trunk question and, when answered
    /// off-trunk questions follow it, walks forward along the recorded
    /// answers to find them.
    pub fn last_answered_question(
        &self,
        answers: &AnswerMap,
    ) -> Result<Option<Question<'t>>, TraversalError> {
        let answered = self.answered_questions(answers);
        let Some(end) = answered.last() else {
            log::debug!("last_answered_question: nothing answered");
            return Ok(None);
        };
        let Some(last) = answered.iter().rfind(|q| q.record().on_trunk) else {
            return Ok(None);
        };
        if last == end {
            return Ok(Some(*last));
        }
        self.template.last_answered_from(*last, answers).map(Some)
    }

    /// All sections after this one, by position over the whole template.
    pub fn all_next_sections(&self) -> Vec<Section<'t>> {
        let mut next: Vec<Section<'t>> = self
            .template
            .definition()
            .sections
            .iter()
            .filter(|s| s.position > self.record.position)
            .map(|record| Section::new(self.template, record))
            .collect();
        next.sort_by_key(Section::position);
        next
    }

    /// All sections before this one, by descending position.
    pub fn all_prev_sections(&self) -> Vec<Section<'t>> {
        let mut prev: Vec<Section<'t>> = self
            .template
            .definition()
            .sections
            .iter()
            .filter(|s| s.position < self.record.position)
            .map(|record| Section::new(self.template, record))
            .collect();
        prev.sort_by_key(Section::position);
        prev.reverse();
        prev
    }

    pub fn next_section(&self) -> Option<Section<'t>> {
        self.all_next_sections().into_iter().next()
    }

    /// The next section that actually has questions. A better jump target
    /// than [`next_section`](Section::next_section), since it must
    /// eventually be visited anyway.
    pub fn next_nonempty_section(&self) -> Option<Section<'t>> {
        self.all_next_sections().into_iter().find(|s| !s.is_empty())
    }

    pub fn prev_section(&self) -> Option<Section<'t>> {
        self.all_prev_sections().into_iter().next()
    }

    pub fn prev_nonempty_section(&self) -> Option<Section<'t>> {
        self.all_prev_sections().into_iter().find(|s| !s.is_empty())
    }

    /// First question of the next non-empty section. Always on trunk,
    /// always safe to jump to.
    pub fn first_question_in_next_section(&self) -> Option<Question<'t>> {
        match self.next_nonempty_section() {
            Some(section) => section.first_question(),
            None => {
                log::debug!("first_question_in_next_section: last section of the template");
                None
            }
        }
    }

    pub fn last_question_in_prev_section(&self) -> Option<Question<'t>> {
        self.prev_nonempty_section()?.last_question()
    }

    pub fn last_on_trunk_question_in_prev_section(&self) -> Option<Question<'t>> {
        self.prev_nonempty_section()?.last_on_trunk_question()
    }

    pub fn last_answered_question_in_prev_section(
        &self,
        answers: &AnswerMap,
    ) -> Result<Option<Question<'t>>, TraversalError> {
        match self.prev_nonempty_section() {
            Some(section) => section.last_answered_question(answers),
            None => Ok(None),
        }
    }

    /// The transition map over the whole section.
    pub fn generate_transition_map(&self) -> TransitionMap {
        self.transition_map_between(None, None)
    }

    /// The transition map over the questions in `[start, end)` by
    /// position.
    ///
    /// Explicit branches are added first; the implicit potential
    /// transitions only fill slots no branch claimed, so an explicit
    /// branch is never overwritten by a positional fallback.
    pub fn transition_map_between(
        &self,
        start: Option<Question<'_>>,
        end: Option<Question<'_>>,
    ) -> TransitionMap {
        let from = start.map(|q| q.position());
        let to = end.map(|q| q.position());
        let questions: Vec<Question<'t>> = self
            .questions()
            .into_iter()
            .filter(|q| from.is_none_or(|p| q.position() >= p))
            .filter(|q| to.is_none_or(|p| q.position() < p))
            .collect();
        let mut map = TransitionMap::new();
        for question in &questions {
            for branch in question.branches() {
                map.add(branch.to_transition());
            }
        }
        for question in &questions {
            for transition in question.potential_next_transitions() {
                if !map.has_transition_for(transition.current, transition.choice.as_deref()) {
                    map.add(transition);
                }
            }
        }
        map
    }
}

impl Template {
    /// Walks forward from `start` along the recorded answers and returns
    /// the question whose answer leads directly to `end`.
    ///
    /// Enumerates the candidate paths between the two questions, then
    /// forward-steps each path: a step that leaves the path discards the
    /// path, a step that cannot be resolved skips the question. Both
    /// questions must belong to the same section.
    pub fn walk_forward<'t>(
        &'t self,
        start: Question<'t>,
        end: Question<'t>,
        answers: &AnswerMap,
    ) -> Result<Option<Question<'t>>, TraversalError> {
        debug_assert_eq!(start.section().id(), end.section().id());
        let map = start.section().transition_map_between(Some(start), Some(end));
        let paths = match map.find_paths(start.id(), Some(end.id())) {
            Ok(paths) => paths,
            Err(TraversalError::NoPathsFound { .. }) => return Ok(None),
            Err(error) => return Err(error),
        };
        for path in paths {
            log::debug!("walk_forward: trying path of {} nodes", path.len());
            let questions: Vec<QuestionId> = path.iter().filter_map(|n| n.question()).collect();
            for &question_id in &questions {
                let Some(question) = self.question(question_id) else {
                    continue;
                };
                let next = match question.next_question_within(answers) {
                    Ok(next) => next,
                    Err(TraversalError::UnresolvedCondition { .. }) => continue,
                    Err(error) => return Err(error),
                };
                match next {
                    Some(next) if next.id() == end.id() => {
                        log::debug!("walk_forward: found #{}", question_id);
                        return Ok(Some(question));
                    }
                    Some(next) if !questions.contains(&next.id()) => break,
                    Some(_) => {}
                    None => break,
                }
            }
        }
        log::debug!("walk_forward: not found");
        Ok(None)
    }

    /// Walks forward from `start` along the recorded answers, within
    /// `start`'s section, and returns the last answered question reached.
    /// An unresolvable answer stops the walk at the question before it.
    pub fn last_answered_from<'t>(
        &'t self,
        start: Question<'t>,
        answers: &AnswerMap,
    ) -> Result<Question<'t>, TraversalError> {
        let mut current = start;
        let mut seen = vec![start.id()];
        loop {
            let next = match current.next_question_within(answers) {
                Ok(next) => next,
                Err(TraversalError::UnresolvedCondition { .. }) => return Ok(current),
                Err(error) => return Err(error),
            };
            match next {
                Some(next) if next.is_answered(answers) && !seen.contains(&next.id()) => {
                    seen.push(next.id());
                    current = next;
                }
                _ => return Ok(current),
            }
        }
    }
}
