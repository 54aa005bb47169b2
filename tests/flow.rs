//! Tests for transition bookkeeping and selection.
mod common;

use veiviser::flow::PathNode;
use veiviser::prelude::*;

fn canned_transition(current: u32, choice: &str, next: Option<u32>) -> Transition {
    Transition::new(
        TransitionCategory::CannedAnswer,
        QuestionId(current),
        Some(choice.to_string()),
        next.map(QuestionId),
    )
}

fn position_transition(current: u32, next: u32) -> Transition {
    Transition::new(
        TransitionCategory::Position,
        QuestionId(current),
        None,
        Some(QuestionId(next)),
    )
}

fn last_transition(current: u32) -> Transition {
    Transition::new(TransitionCategory::Last, QuestionId(current), None, None)
}

fn q(id: u32) -> PathNode {
    PathNode::Question(QuestionId(id))
}

#[test]
fn test_add_is_idempotent() {
    let mut map = TransitionMap::new();
    let transition = canned_transition(1, "Yes", Some(2));
    map.add(transition.clone());
    map.add(transition);
    assert_eq!(map.len(), 1);
}

#[test]
fn test_add_replaces_contested_slot() {
    let mut map = TransitionMap::new();
    map.add(canned_transition(1, "Yes", Some(2)));
    map.add(canned_transition(1, "Yes", Some(3)));

    // The later transition owns the slot, in the list and the lookup table.
    assert_eq!(map.len(), 1);
    assert_eq!(map.transitions()[0].next, Some(QuestionId(3)));
    let selected = map
        .select_transition(QuestionId(1), Some("Yes"))
        .expect("Failed to select transition");
    assert_eq!(selected.expect("Expected a transition").next, Some(QuestionId(3)));
}

#[test]
fn test_select_transition_precedence() {
    let map = TransitionMap::from_transitions([
        canned_transition(1, "Yes", Some(3)),
        position_transition(1, 2),
    ]);

    // Exact condition match wins.
    let exact = map
        .select_transition(QuestionId(1), Some("Yes"))
        .expect("Failed to select transition");
    assert_eq!(exact.expect("Expected a transition").next, Some(QuestionId(3)));

    // An unmatched condition falls back to the unconditional slot.
    let fallback = map
        .select_transition(QuestionId(1), Some("Maybe"))
        .expect("Failed to select transition");
    assert_eq!(fallback.expect("Expected a transition").next, Some(QuestionId(2)));

    // So does no condition at all.
    let unanswered = map
        .select_transition(QuestionId(1), None)
        .expect("Failed to select transition");
    assert_eq!(unanswered.expect("Expected a transition").next, Some(QuestionId(2)));
}

#[test]
fn test_select_transition_single_wins_regardless() {
    let map = TransitionMap::from_transitions([canned_transition(1, "Yes", Some(2))]);
    let selected = map
        .select_transition(QuestionId(1), Some("No"))
        .expect("Failed to select transition");
    assert_eq!(selected.expect("Expected a transition").next, Some(QuestionId(2)));
}

#[test]
fn test_select_transition_unresolved_condition() {
    let map = TransitionMap::from_transitions([
        canned_transition(1, "Yes", Some(2)),
        canned_transition(1, "No", Some(3)),
    ]);
    let result = map.select_transition(QuestionId(1), Some("Maybe"));
    match result.err().unwrap() {
        TraversalError::UnresolvedCondition { question_id, condition } => {
            assert_eq!(question_id, QuestionId(1));
            assert_eq!(condition, "Maybe");
        }
        _ => panic!("Expected UnresolvedCondition error"),
    }
}

#[test]
fn test_select_transition_terminal() {
    let empty = TransitionMap::new();
    let selected = empty
        .select_transition(QuestionId(1), Some("Yes"))
        .expect("Failed to select transition");
    assert!(selected.is_none());

    // A question the map does not know is terminal too.
    let map = TransitionMap::from_transitions([last_transition(2)]);
    let selected = map
        .select_transition(QuestionId(1), None)
        .expect("Failed to select transition");
    assert!(selected.is_none());
}

#[test]
fn test_has_transition_for() {
    let map = TransitionMap::from_transitions([canned_transition(1, "Yes", Some(2))]);
    assert!(map.has_transition_for(QuestionId(1), Some("Yes")));
    assert!(!map.has_transition_for(QuestionId(1), None));
    assert!(!map.has_transition_for(QuestionId(2), Some("Yes")));
}

#[test]
fn test_find_paths_sorted() {
    let map = TransitionMap::from_transitions([
        canned_transition(1, "Yes", Some(3)),
        position_transition(1, 2),
        position_transition(2, 3),
        last_transition(3),
    ]);
    let paths = map
        .find_paths(QuestionId(1), None)
        .expect("Failed to find paths");
    assert_eq!(
        paths,
        vec![
            vec![q(1), q(2), q(3), PathNode::Exit],
            vec![q(1), q(3), PathNode::Exit],
        ]
    );
}

#[test]
fn test_find_paths_bounded_by_end() {
    let map = TransitionMap::from_transitions([
        canned_transition(1, "Yes", Some(3)),
        position_transition(1, 2),
        position_transition(2, 3),
        last_transition(3),
    ]);
    let paths = map
        .find_paths(QuestionId(2), Some(QuestionId(3)))
        .expect("Failed to find paths");
    assert_eq!(paths, vec![vec![q(2), q(3)]]);
}

#[test]
fn test_find_paths_none_found() {
    let map = TransitionMap::from_transitions([position_transition(1, 2)]);

    let result = map.find_paths(QuestionId(7), None);
    match result.err().unwrap() {
        TraversalError::NoPathsFound { start_id, end_id } => {
            assert_eq!(start_id, QuestionId(7));
            assert_eq!(end_id, None);
        }
        _ => panic!("Expected NoPathsFound error"),
    }

    // A reachable start with an unreachable end also comes up empty.
    let result = map.find_paths(QuestionId(1), Some(QuestionId(9)));
    match result.err().unwrap() {
        TraversalError::NoPathsFound { start_id, end_id } => {
            assert_eq!(start_id, QuestionId(1));
            assert_eq!(end_id, Some(QuestionId(9)));
        }
        _ => panic!("Expected NoPathsFound error"),
    }
}

#[test]
fn test_find_paths_capped() {
    let map = TransitionMap::from_transitions([
        canned_transition(1, "Yes", Some(3)),
        position_transition(1, 2),
        position_transition(2, 3),
        last_transition(3),
    ]);

    let result = map.find_paths_capped(QuestionId(1), None, Some(1));
    match result.err().unwrap() {
        TraversalError::PathBudgetExceeded(budget) => assert_eq!(budget, 1),
        _ => panic!("Expected PathBudgetExceeded error"),
    }

    // A generous cap collects everything.
    let paths = map
        .find_paths_capped(QuestionId(1), None, Some(10))
        .expect("Failed to find paths");
    assert_eq!(paths.len(), 2);
}

#[test]
fn test_list_round_trip() {
    let map = TransitionMap::from_transitions([
        canned_transition(1, "Yes", Some(2)),
        canned_transition(1, "No", Some(3)),
        last_transition(2),
    ]);
    let rebuilt = TransitionMap::from_list(map.to_list());
    assert_eq!(rebuilt.len(), map.len());
    assert_eq!(rebuilt.transitions(), map.transitions());
}

#[test]
fn test_transition_serde() {
    let transition = canned_transition(1, "Yes", Some(2));
    let json = serde_json::to_string(&transition).expect("Failed to serialize transition");
    let back: Transition = serde_json::from_str(&json).expect("Failed to deserialize transition");
    assert_eq!(back, transition);

    // Legacy category spellings parse, current ones are written.
    let legacy: TransitionCategory =
        serde_json::from_str("\"Node-edgeless\"").expect("Failed to parse legacy category");
    assert_eq!(legacy, TransitionCategory::Position);
    let edge: TransitionCategory =
        serde_json::from_str("\"Edge\"").expect("Failed to parse legacy category");
    assert_eq!(edge, TransitionCategory::ExplicitBranch);
    let written =
        serde_json::to_string(&TransitionCategory::Position).expect("Failed to serialize category");
    assert_eq!(written, "\"position\"");
}

#[test]
fn test_transition_display() {
    let transition = canned_transition(1, "Yes", Some(2));
    assert_eq!(transition.to_string(), "1 -[CannedAnswer: Yes]-> 2");

    let exit = last_transition(3);
    assert_eq!(exit.to_string(), "3 -[last: *]-> (exit)");
}
