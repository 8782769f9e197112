//! FILENAME: engine/src/dependency_graph.rs
//! PURPOSE: Tracks the directed graph of cell-to-cell references.
//! CONTEXT: Every formula edge is stored twice: forward (which cells does
//! this formula read?) and reverse (whose formulas read this cell?). The
//! forward direction answers the cycle question before an edit commits;
//! the reverse direction enumerates the cells whose memoized values go
//! stale after it does. The two maps are mirror images by construction,
//! and only the sheet's edit protocol mutates them.
//!
//! USAGE:
//! 1. Before committing a formula change, ask `creates_cycle()` with the
//!    cell's coordinate and the references the new formula would read.
//! 2. On commit, `rewire()` replaces the cell's forward edges and their
//!    reverse mirrors in one step.
//! 3. After commit, walk `reverse_closure()` to drop stale caches.

use std::collections::{HashMap, HashSet};

use crate::position::Position;

/// Both directions of every reference edge on the sheet.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Forward edges: the cells each formula cell reads. A cell with no
    /// formula (or a constant formula) has no entry at all.
    referenced: HashMap<Position, HashSet<Position>>,

    /// Reverse edges: for each cell, the formula cells that read it.
    /// Entries disappear as soon as their set would become empty.
    dependents: HashMap<Position, HashSet<Position>>,
}

impl DependencyGraph {
    /// Creates a new, empty dependency graph.
    pub fn new() -> Self {
        DependencyGraph::default()
    }

    /// Replaces the forward edges of `cell` with `new_refs`, mirroring the
    /// change on the reverse side. Reverse edges pointing *at* `cell` are
    /// untouched: other formulas keep reading it no matter what it holds.
    ///
    /// # Note
    /// Acyclicity is the caller's contract; check `creates_cycle()` first.
    pub fn rewire(&mut self, cell: Position, new_refs: HashSet<Position>) {
        self.drop_edges(cell);

        for &target in &new_refs {
            self.dependents.entry(target).or_default().insert(cell);
        }
        if !new_refs.is_empty() {
            self.referenced.insert(cell, new_refs);
        }
    }

    /// Unwinds the forward edges of `cell`, used when it stops holding a
    /// formula or is removed from the sheet outright.
    pub fn drop_edges(&mut self, cell: Position) {
        let Some(old_refs) = self.referenced.remove(&cell) else {
            return;
        };

        for target in old_refs {
            let now_empty = self.dependents.get_mut(&target).map_or(false, |readers| {
                readers.remove(&cell);
                readers.is_empty()
            });
            if now_empty {
                self.dependents.remove(&target);
            }
        }
    }

    /// The cells `cell`'s formula directly reads, if it reads any.
    pub fn references_of(&self, cell: Position) -> Option<&HashSet<Position>> {
        self.referenced.get(&cell)
    }

    /// The formula cells that directly read `cell`, if there are any.
    pub fn dependents_of(&self, cell: Position) -> Option<&HashSet<Position>> {
        self.dependents.get(&cell)
    }

    /// Would a formula on `cell` reading `new_refs` close a loop?
    ///
    /// It would exactly when `cell` is reachable from one of the new
    /// references along existing forward edges; seeding the search with
    /// the whole candidate set also covers the degenerate self-reference,
    /// which pops immediately and matches. The graph itself is untouched,
    /// so a rejected edit leaves nothing to undo.
    pub fn creates_cycle(&self, cell: Position, new_refs: &HashSet<Position>) -> bool {
        let mut pending: Vec<Position> = new_refs.iter().copied().collect();
        let mut seen: HashSet<Position> = HashSet::new();

        while let Some(next) = pending.pop() {
            if next == cell {
                return true;
            }
            if !seen.insert(next) {
                continue;
            }
            if let Some(further) = self.referenced.get(&next) {
                pending.extend(further.iter().copied());
            }
        }

        false
    }

    /// Every cell whose formula transitively reads `cell`; this is the set
    /// whose memoized values an edit of `cell` invalidates. The walk is
    /// driven by first-insertion, so a cell shared by several paths (a
    /// diamond) is expanded once and the traversal always terminates.
    pub fn reverse_closure(&self, cell: Position) -> HashSet<Position> {
        let mut closure = HashSet::new();
        let mut pending = vec![cell];

        while let Some(next) = pending.pop() {
            if let Some(readers) = self.dependents.get(&next) {
                for &reader in readers {
                    if closure.insert(reader) {
                        pending.push(reader);
                    }
                }
            }
        }

        closure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(reference: &str) -> Position {
        Position::from_string(reference).unwrap()
    }

    fn refs(references: &[&str]) -> HashSet<Position> {
        references.iter().map(|r| pos(r)).collect()
    }

    #[test]
    fn test_rewire_mirrors_both_directions() {
        let mut graph = DependencyGraph::new();

        // C1 = A1 + B1
        graph.rewire(pos("C1"), refs(&["A1", "B1"]));

        assert_eq!(graph.references_of(pos("C1")), Some(&refs(&["A1", "B1"])));
        assert_eq!(graph.dependents_of(pos("A1")), Some(&refs(&["C1"])));
        assert_eq!(graph.dependents_of(pos("B1")), Some(&refs(&["C1"])));
    }

    #[test]
    fn test_rewire_replaces_old_edges() {
        let mut graph = DependencyGraph::new();

        graph.rewire(pos("C1"), refs(&["A1", "B1"]));
        graph.rewire(pos("C1"), refs(&["B1"]));

        assert_eq!(graph.references_of(pos("C1")), Some(&refs(&["B1"])));
        // A1 lost its only reader; the reverse entry is gone entirely
        assert_eq!(graph.dependents_of(pos("A1")), None);
        assert_eq!(graph.dependents_of(pos("B1")), Some(&refs(&["C1"])));
    }

    #[test]
    fn test_rewire_keeps_edges_aimed_at_the_cell() {
        let mut graph = DependencyGraph::new();

        // B1 reads A1; A1 then becomes a formula of its own
        graph.rewire(pos("B1"), refs(&["A1"]));
        graph.rewire(pos("A1"), refs(&["D4"]));

        assert_eq!(graph.dependents_of(pos("A1")), Some(&refs(&["B1"])));
    }

    #[test]
    fn test_drop_edges_forgets_the_cell() {
        let mut graph = DependencyGraph::new();

        graph.rewire(pos("C1"), refs(&["A1", "B1"]));
        graph.drop_edges(pos("C1"));

        assert_eq!(graph.references_of(pos("C1")), None);
        assert_eq!(graph.dependents_of(pos("A1")), None);
        assert_eq!(graph.dependents_of(pos("B1")), None);
    }

    #[test]
    fn test_drop_edges_on_untracked_cell_is_a_noop() {
        let mut graph = DependencyGraph::new();
        graph.rewire(pos("B1"), refs(&["A1"]));

        graph.drop_edges(pos("J10"));
        assert_eq!(graph.dependents_of(pos("A1")), Some(&refs(&["B1"])));
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let graph = DependencyGraph::new();
        assert!(graph.creates_cycle(pos("A1"), &refs(&["A1"])));
    }

    #[test]
    fn test_two_cell_cycle() {
        let mut graph = DependencyGraph::new();

        // B1 = A1; then A1 = B1 would loop
        graph.rewire(pos("B1"), refs(&["A1"]));
        assert!(graph.creates_cycle(pos("A1"), &refs(&["B1"])));
    }

    #[test]
    fn test_cycle_through_a_chain() {
        let mut graph = DependencyGraph::new();

        // C1 = B1, B1 = A1; closing A1 = C1 loops through both
        graph.rewire(pos("B1"), refs(&["A1"]));
        graph.rewire(pos("C1"), refs(&["B1"]));
        assert!(graph.creates_cycle(pos("A1"), &refs(&["C1"])));
    }

    #[test]
    fn test_shared_reading_is_not_a_cycle() {
        let mut graph = DependencyGraph::new();

        graph.rewire(pos("B1"), refs(&["A1"]));

        // Two formulas reading the same cell is fine, and so is reading a
        // formula cell
        assert!(!graph.creates_cycle(pos("C1"), &refs(&["A1"])));
        assert!(!graph.creates_cycle(pos("C1"), &refs(&["B1"])));
        // Reading several cells of an existing chain still closes no loop
        assert!(!graph.creates_cycle(pos("C1"), &refs(&["A1", "B1"])));
    }

    #[test]
    fn test_reverse_closure_follows_chains() {
        let mut graph = DependencyGraph::new();

        graph.rewire(pos("B1"), refs(&["A1"]));
        graph.rewire(pos("C1"), refs(&["B1"]));

        assert_eq!(graph.reverse_closure(pos("A1")), refs(&["B1", "C1"]));
        assert_eq!(graph.reverse_closure(pos("B1")), refs(&["C1"]));
    }

    #[test]
    fn test_reverse_closure_visits_diamonds_once() {
        let mut graph = DependencyGraph::new();

        // B1 and C1 both read A1; D1 reads both
        graph.rewire(pos("B1"), refs(&["A1"]));
        graph.rewire(pos("C1"), refs(&["A1"]));
        graph.rewire(pos("D1"), refs(&["B1", "C1"]));

        assert_eq!(
            graph.reverse_closure(pos("A1")),
            refs(&["B1", "C1", "D1"])
        );
    }

    #[test]
    fn test_reverse_closure_of_unread_cell_is_empty() {
        let graph = DependencyGraph::new();
        assert!(graph.reverse_closure(pos("A1")).is_empty());
    }
}
