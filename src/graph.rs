//! Low-level search primitives over adjacency-list graphs.
//!
//! Every function here works on a plain `AHashMap<N, AHashSet<N>>` adjacency
//! list and is generic over the node type. The primitives never allocate a
//! full path set up front: [`dfs_paths`] returns a lazy iterator driven by an
//! explicit work stack, so callers that only need the first matching path do
//! not pay for all of them.
//!
//! None of these functions validate their input beyond what they need.
//! Callers that receive adjacency lists from untrusted sources should check
//! [`is_valid_graph_format`] first; the traversal itself tolerates missing
//! nodes by treating them as dead ends.

use std::hash::Hash;

use ahash::{AHashMap, AHashSet};

/// An adjacency list: every node maps to its set of direct successors.
pub type Adjacency<N> = AHashMap<N, AHashSet<N>>;

/// Checks that every node referenced as a destination also appears as a key.
///
/// An empty graph is valid. This is a pure predicate; it never mutates and
/// never fails.
pub fn is_valid_graph_format<N: Copy + Eq + Hash>(graph: &Adjacency<N>) -> bool {
    graph
        .values()
        .flatten()
        .all(|next| graph.contains_key(next))
}

/// Returns the set of nodes with no incoming edge.
///
/// Computed as all keys minus everything that appears in any out-set.
pub fn find_start_nodes<N: Copy + Eq + Hash>(graph: &Adjacency<N>) -> AHashSet<N> {
    let destinations: AHashSet<N> = graph.values().flatten().copied().collect();
    graph
        .keys()
        .filter(|node| !destinations.contains(node))
        .copied()
        .collect()
}

/// Returns the set of nodes with no outgoing edge.
pub fn find_end_nodes<N: Copy + Eq + Hash>(graph: &Adjacency<N>) -> AHashSet<N> {
    graph
        .iter()
        .filter(|(_, successors)| successors.is_empty())
        .map(|(node, _)| *node)
        .collect()
}

/// Returns the set of nodes that take part in no edge at all.
pub fn find_isolated_nodes<N: Copy + Eq + Hash>(graph: &Adjacency<N>) -> AHashSet<N> {
    let destinations: AHashSet<N> = graph.values().flatten().copied().collect();
    graph
        .iter()
        .filter(|(node, successors)| successors.is_empty() && !destinations.contains(node))
        .map(|(node, _)| *node)
        .collect()
}

/// Checks that a graph is usable for branching traversal.
///
/// * valid format per [`is_valid_graph_format`]
/// * exactly one start node
/// * no isolated nodes
pub fn is_valid_branching_graph<N: Copy + Eq + Hash>(graph: &Adjacency<N>) -> bool {
    is_valid_graph_format(graph)
        && find_start_nodes(graph).len() == 1
        && find_isolated_nodes(graph).is_empty()
}

/// Lazily enumerates all simple paths from `start`, depth first.
///
/// A path ends at a node with no successors, at a node missing from the
/// adjacency list, or at `end` when one is given. A node already on the
/// current path is never revisited, so the iterator terminates even on
/// cyclic input. A `start` that is not a key yields nothing.
///
/// When `end` is given, paths that dead-end before reaching it are still
/// yielded; use [`dfs_paths_between`] to keep only the paths that contain it.
pub fn dfs_paths<N: Copy + Eq + Hash>(
    graph: &Adjacency<N>,
    start: N,
    end: Option<N>,
) -> DfsPaths<'_, N> {
    let stack = if graph.contains_key(&start) {
        vec![(start, vec![start])]
    } else {
        Vec::new()
    };
    DfsPaths { graph, end, stack }
}

/// Collects the simple paths from `start` that pass through `end`.
pub fn dfs_paths_between<N: Copy + Eq + Hash>(
    graph: &Adjacency<N>,
    start: N,
    end: N,
) -> Vec<Vec<N>> {
    dfs_paths(graph, start, Some(end))
        .filter(|path| path.contains(&end))
        .collect()
}

/// Iterator returned by [`dfs_paths`]. Restartable by calling [`dfs_paths`]
/// again; holds no state besides its work stack.
pub struct DfsPaths<'a, N> {
    graph: &'a Adjacency<N>,
    end: Option<N>,
    stack: Vec<(N, Vec<N>)>,
}

impl<N: Copy + Eq + Hash> Iterator for DfsPaths<'_, N> {
    type Item = Vec<N>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, path)) = self.stack.pop() {
            let successors = match self.graph.get(&node) {
                Some(successors) if !successors.is_empty() => successors,
                // No out-edges recorded: this path is maximal.
                _ => return Some(path),
            };
            if self.end == Some(node) {
                return Some(path);
            }
            for &next in successors {
                if !path.contains(&next) {
                    let mut branched = path.clone();
                    branched.push(next);
                    self.stack.push((next, branched));
                }
            }
        }
        None
    }
}
