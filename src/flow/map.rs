use ahash::AHashMap;

use crate::error::TraversalError;
use crate::flow::{PathNode, Transition};
use crate::graph::{self, Adjacency};
use crate::template::definition::QuestionId;

/// Lookup table over the possible moves out of a set of questions.
///
/// Keeps transitions twice: an ordered list in insertion order, used for
/// serialization and enumeration, and a nested map `current -> choice ->
/// transition` for O(1) answers to "where do I go from here". [`add`]
/// maintains both sides.
///
/// [`add`]: TransitionMap::add
#[derive(Debug, Clone, Default)]
pub struct TransitionMap {
    transitions: Vec<Transition>,
    map: AHashMap<QuestionId, AHashMap<Option<String>, Transition>>,
}

impl TransitionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map by [`add`](TransitionMap::add)ing every transition in
    /// iteration order; later same-key transitions overwrite earlier ones.
    pub fn from_transitions<I>(transitions: I) -> Self
    where
        I: IntoIterator<Item = Transition>,
    {
        let mut map = Self::new();
        for transition in transitions {
            map.add(transition);
        }
        map
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// The transitions in insertion order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// All transitions out of `start`, keyed by choice.
    pub fn get_transitions(
        &self,
        start: QuestionId,
    ) -> Option<&AHashMap<Option<String>, Transition>> {
        self.map.get(&start)
    }

    /// Whether a transition is already recorded for this `(current, choice)`
    /// slot. Used by map generation to avoid overwriting an existing branch.
    pub fn has_transition_for(&self, current: QuestionId, choice: Option<&str>) -> bool {
        self.map
            .get(&current)
            .is_some_and(|by_choice| by_choice.contains_key(&choice.map(str::to_string)))
    }

    /// Inserts a transition.
    ///
    /// An exact duplicate is a no-op. A transition sharing `(current,
    /// choice)` with a recorded one replaces it, in both the list and the
    /// lookup table: whichever was added last wins. Callers sequence their
    /// adds so that explicit branches end up owning contested slots.
    pub fn add(&mut self, transition: Transition) {
        log::trace!("adding {transition} to transition map");
        let by_choice = self.map.entry(transition.current).or_default();
        match by_choice.get(&transition.choice) {
            Some(existing) if *existing == transition => return,
            Some(existing) => {
                let stale = existing.clone();
                self.transitions.retain(|t| *t != stale);
            }
            None => {}
        }
        by_choice.insert(transition.choice.clone(), transition.clone());
        self.transitions.push(transition);
    }

    /// Picks the transition out of `start` for a resolved answer condition.
    ///
    /// Precedence, in order:
    /// 1. if `start` has exactly one transition, it wins regardless of the
    ///    requested condition;
    /// 2. exact match on `condition`;
    /// 3. the unconditional (`None`-keyed) fallback.
    ///
    /// `Ok(None)` means `start` has no transitions at all, a normal terminal
    /// state. An unmatched condition with no fallback is
    /// [`TraversalError::UnresolvedCondition`]: the template has probably
    /// changed since the answer was recorded.
    pub fn select_transition(
        &self,
        start: QuestionId,
        condition: Option<&str>,
    ) -> Result<Option<&Transition>, TraversalError> {
        if self.transitions.is_empty() {
            return Ok(None);
        }
        let Some(by_choice) = self.map.get(&start) else {
            return Ok(None);
        };
        if by_choice.len() == 1 {
            return Ok(by_choice.values().next());
        }
        let exact = condition.map(str::to_string);
        if let Some(transition) = by_choice.get(&exact) {
            return Ok(Some(transition));
        }
        if let Some(transition) = by_choice.get(&None) {
            return Ok(Some(transition));
        }
        Err(TraversalError::UnresolvedCondition {
            question_id: start,
            condition: condition.unwrap_or_default().to_string(),
        })
    }

    /// The bare adjacency list over the recorded transitions, with exits
    /// mapped to [`PathNode::Exit`]. Mostly for debugging and rendering.
    pub fn as_adjacency(&self) -> Adjacency<PathNode> {
        let mut adjacency: Adjacency<PathNode> = AHashMap::new();
        for transition in &self.transitions {
            adjacency
                .entry(PathNode::Question(transition.current))
                .or_default()
                .insert(PathNode::from(transition.next));
        }
        adjacency
    }

    /// Enumerates every simple path from `start`, stopping at `end` when one
    /// is given and keeping only the paths that reach it.
    pub fn find_paths(
        &self,
        start: QuestionId,
        end: Option<QuestionId>,
    ) -> Result<Vec<Vec<PathNode>>, TraversalError> {
        self.find_paths_capped(start, end, None)
    }

    /// [`find_paths`](TransitionMap::find_paths) with an optional cap on the
    /// number of collected paths; exceeding the cap is an error, never a
    /// silent truncation.
    pub fn find_paths_capped(
        &self,
        start: QuestionId,
        end: Option<QuestionId>,
        cap: Option<usize>,
    ) -> Result<Vec<Vec<PathNode>>, TraversalError> {
        if !self.map.contains_key(&start) {
            return Err(TraversalError::NoPathsFound {
                start_id: start,
                end_id: end,
            });
        }
        let adjacency = self.as_adjacency();
        let start_node = PathNode::Question(start);
        let end_node = end.map(PathNode::Question);
        let mut paths = Vec::new();
        for path in graph::dfs_paths(&adjacency, start_node, end_node) {
            if let Some(end_node) = end_node {
                if !path.contains(&end_node) {
                    continue;
                }
            }
            if let Some(cap) = cap {
                if paths.len() >= cap {
                    return Err(TraversalError::PathBudgetExceeded(cap));
                }
            }
            paths.push(path);
        }
        if paths.is_empty() {
            return Err(TraversalError::NoPathsFound {
                start_id: start,
                end_id: end,
            });
        }
        // Discovery order depends on hash seeding; sort for stable output.
        paths.sort();
        Ok(paths)
    }

    /// The transitions as a plain list, for serialization.
    pub fn to_list(&self) -> Vec<Transition> {
        self.transitions.clone()
    }

    /// Rebuilds a map from the result of [`to_list`](TransitionMap::to_list).
    pub fn from_list(transitions: Vec<Transition>) -> Self {
        Self::from_transitions(transitions)
    }
}
