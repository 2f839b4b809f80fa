//! Path finder module.
//!
//! This module contains the path search algorithms over the server
//! graph adjacency. Neighbours are iterated in ascending id order, so
//! both searches are deterministic: BFS gives the shortest path that
//! comes first in that order, DFS gives the first path found by
//! descending neighbours in that order, which is not necessarily a
//! shortest one.

use log::trace;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

/// Represents the adjacency sets of the graph, by node id.
pub type Adjacency = BTreeMap<String, BTreeSet<String>>;

type Parents<'a> = HashMap<&'a str, Option<&'a str>>;

fn neighbours<'a>(adj: &'a Adjacency, node: &str) -> impl Iterator<Item = &'a str> {
    adj.get(node).into_iter().flatten().map(String::as_str)
}

/// Rebuilds the path leading to the given goal by following the
/// parents back to the start node.
fn build_path(parents: &Parents, goal: &str) -> Vec<String> {
    let mut path = Vec::new();
    let mut node = Some(goal);

    while let Some(id) = node {
        path.push(id.to_owned());
        node = parents.get(id).copied().flatten();
    }

    path.reverse();
    path
}

/// Finds a shortest path (in hops) from start to goal, using a
/// breadth-first search. Returns an empty path if the goal cannot be
/// reached.
pub fn bfs_path(adj: &Adjacency, start: &str, goal: &str) -> Vec<String> {
    let mut parents: Parents = HashMap::from([(start, None)]);
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        if node == goal {
            break;
        }
        for next in neighbours(adj, node) {
            if !parents.contains_key(next) {
                parents.insert(next, Some(node));
                queue.push_back(next);
            }
        }
    }

    if !parents.contains_key(goal) {
        trace!("no bfs path from {} to {}", start, goal);
        return Vec::new();
    }

    let path = build_path(&parents, goal);
    trace!("bfs path from {} to {}: {:?}", start, goal, path);
    path
}

/// Finds a path from start to goal using a depth-first search. The
/// search keeps its own stack of pending neighbours, so long chains
/// of servers cannot overflow the thread stack. Returns an empty path
/// if the goal cannot be reached.
pub fn dfs_path(adj: &Adjacency, start: &str, goal: &str) -> Vec<String> {
    let mut visited = HashSet::from([start]);
    let mut parents: Parents = HashMap::from([(start, None)]);
    let mut stack = vec![(start, neighbours(adj, start))];
    let mut found = start == goal;

    while !found {
        let (node, next_nodes) = match stack.last_mut() {
            Some(frame) => frame,
            None => break,
        };

        match next_nodes.find(|next| !visited.contains(next)) {
            Some(next) => {
                parents.insert(next, Some(*node));
                if next == goal {
                    found = true;
                } else {
                    visited.insert(next);
                    stack.push((next, neighbours(adj, next)));
                }
            }
            None => {
                stack.pop();
            }
        }
    }

    if !found {
        trace!("no dfs path from {} to {}", start, goal);
        return Vec::new();
    }

    let path = build_path(&parents, goal);
    trace!("dfs path from {} to {}: {:?}", start, goal, path);
    path
}
