//! Cycle detection over parent links.

use std::collections::HashSet;

use stagewire_proto::Id;

/// Check whether giving `node` the parent `new_parent` would create a cycle.
///
/// Walks the chain upward from `new_parent` using `parent_of`, with `node`
/// already marked visited, and reports `true` as soon as a node repeats.
/// Nodes unknown to `parent_of` count as roots. Cost is proportional to the
/// depth of the chain.
pub fn detect_cycle(
    parent_of: impl Fn(Id) -> Option<Id>,
    node: Id,
    new_parent: Option<Id>,
) -> bool {
    let mut visited = HashSet::from([node]);
    let mut current = new_parent;

    while let Some(id) = current {
        if !visited.insert(id) {
            return true;
        }
        current = parent_of(id);
    }

    false
}
