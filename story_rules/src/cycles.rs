//! Cycle detection over directed edges picked out of an arbitrary edge list.

use std::collections::{BTreeMap, HashSet};

/// Find one cycle among the edges accepted by `select`.
///
/// `select` maps an edge to its `(source, target)` pair, or `None` to leave it
/// out of the graph. The returned path starts and ends at the same node, e.g.
/// `["a", "b", "c", "a"]`. Search order is deterministic: start nodes are
/// visited in sorted order and neighbours in edge order.
pub fn find_cycle<'a, E, F>(edges: &'a [E], select: F) -> Option<Vec<String>>
where
    F: Fn(&'a E) -> Option<(&'a str, &'a str)>,
{
    let mut adjacency: BTreeMap<&'a str, Vec<&'a str>> = BTreeMap::new();
    for (source, target) in edges.iter().filter_map(select) {
        adjacency.entry(source).or_default().push(target);
    }

    let mut search = Search {
        adjacency: &adjacency,
        in_progress: HashSet::new(),
        done: HashSet::new(),
        path: Vec::new(),
    };

    for &start in adjacency.keys() {
        if search.done.contains(start) {
            continue;
        }
        if let Some(cycle) = search.visit(start) {
            return Some(cycle);
        }
    }
    None
}

struct Search<'g, 'a> {
    adjacency: &'g BTreeMap<&'a str, Vec<&'a str>>,
    /// Nodes on the current recursion path.
    in_progress: HashSet<&'a str>,
    /// Nodes whose descendants are fully explored.
    done: HashSet<&'a str>,
    path: Vec<&'a str>,
}

impl<'g, 'a> Search<'g, 'a> {
    fn visit(&mut self, node: &'a str) -> Option<Vec<String>> {
        self.in_progress.insert(node);
        self.path.push(node);

        let adjacency = self.adjacency;
        for &next in adjacency.get(node).into_iter().flatten() {
            if self.done.contains(next) {
                continue;
            }
            if self.in_progress.contains(next) {
                let start = self.path.iter().position(|n| *n == next)?;
                let mut cycle: Vec<String> =
                    self.path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(next.to_string());
                return Some(cycle);
            }
            if let Some(cycle) = self.visit(next) {
                return Some(cycle);
            }
        }

        self.path.pop();
        self.in_progress.remove(node);
        self.done.insert(node);
        None
    }
}
