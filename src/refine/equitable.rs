use crate::partition::{Cell, Partition};
use crate::refine::Refinable;
use log::trace;
use std::collections::{BTreeMap, VecDeque};

/// Arrangement of the sub-cells created when a cell is split by invariant.
/// Affects the search order of the discrete refiner, but not the automorphism group it finds.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SplitOrder {
    /// Sub-cells by ascending invariant.
    #[default]
    Forward,
    /// Sub-cells by descending invariant.
    Reverse,
}

/// Refines partitions to the coarsest equitable partition reachable by repeatedly splitting cells
/// by their vertices' invariants with respect to a target block.
#[derive(Clone, Debug)]
pub struct EquitablePartitionRefiner<'a, R: Refinable> {
    refinable: &'a R,
    split_order: SplitOrder,
}

impl<'a, R: Refinable> EquitablePartitionRefiner<'a, R> {
    pub fn new(refinable: &'a R) -> Self {
        Self::with_split_order(refinable, SplitOrder::default())
    }

    pub fn with_split_order(refinable: &'a R, split_order: SplitOrder) -> Self {
        Self { refinable, split_order }
    }

    pub fn split_order(&self) -> SplitOrder { self.split_order }

    pub fn refinable(&self) -> &'a R { self.refinable }

    /// Equitable refinement of `coarser`. Deterministic for a given partition, refinable and split
    /// order, and returns the input unchanged if it is already equitable.
    pub fn refine(&self, coarser: &Partition) -> Partition {
        let n = self.refinable.vertex_count();
        let mut finer = coarser.clone();
        let mut targets = finer.cells().cloned().collect::<VecDeque<_>>();

        while let Some(target) = targets.pop_front() {
            let mut index = 0;
            while index < finer.len() && finer.len() < n {
                if !finer.is_discrete_cell(index) {
                    index += self.split(&mut finer, index, &target, &mut targets);
                }
                index += 1;
            }
            if finer.len() == n {
                break;
            }
        }
        finer
    }

    /// Splits cell `index` by invariant with respect to `target`, queueing all resulting cells.
    /// Returns the number of cells added.
    fn split(&self, finer: &mut Partition, index: usize, target: &Cell, targets: &mut VecDeque<Cell>) -> usize {
        let mut invariants = BTreeMap::<R::Invariant, Cell>::new();
        for &u in finer.cell(index) {
            invariants.entry(self.refinable.neighbours_in_block(target, u)).or_default().insert(u);
        }
        if invariants.len() < 2 {
            return 0;
        }

        trace!("splitting cell {index} into {} by {:?}", invariants.len(), invariants.keys());
        let added = invariants.len() - 1;
        let mut cells = invariants.into_values().collect::<Vec<_>>();
        if self.split_order == SplitOrder::Reverse {
            cells.reverse();
        }
        finer.remove_cell(index);
        for (offset, cell) in cells.into_iter().enumerate() {
            targets.push_back(cell.clone());
            finer.insert_cell(index + offset, cell);
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutable::graph::tests::{cycle, path, random_graph, star};
    use crate::permutable::graph::Graph;
    use crate::permutable::Permutable;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn refine(graph: &Graph, split_order: SplitOrder) -> String {
        EquitablePartitionRefiner::with_split_order(graph, split_order)
            .refine(&Partition::unit(graph.len())).to_string()
    }

    #[test]
    fn path_splits_ends_from_middle() {
        assert_eq!(refine(&path(4), SplitOrder::Forward), "[0,3|1,2]");
        assert_eq!(refine(&path(4), SplitOrder::Reverse), "[1,2|0,3]");
        assert_eq!(refine(&path(5), SplitOrder::Forward), "[0,4|2|1,3]");
    }

    #[test]
    fn star_splits_center_from_leaves() {
        assert_eq!(refine(&star(4), SplitOrder::Forward), "[1,2,3|0]");
        assert_eq!(refine(&star(4), SplitOrder::Reverse), "[0|1,2,3]");
    }

    #[test]
    fn regular_graphs_stay_unsplit() {
        assert_eq!(refine(&cycle(6), SplitOrder::Forward), "[0,1,2,3,4,5]");
        assert_eq!(refine(&Graph::plain(3, []), SplitOrder::Forward), "[0,1,2]");
    }

    #[test]
    fn multiplicities_are_distinguished() {
        // Vertex 1 has a double edge to 0 and a single edge to 2, vertex 3 the reverse.
        let mut graph = path(5);
        graph.insert_edge((0, 1), 2);
        graph.insert_edge((3, 4), 2);
        let refined = EquitablePartitionRefiner::new(&graph).refine(&Partition::unit(5));
        assert!(refined.in_same_cell(0, 4));
        assert!(refined.in_same_cell(1, 3));
        assert!(!refined.in_same_cell(0, 1));

        let mut asymmetric = path(5);
        asymmetric.insert_edge((0, 1), 2);
        let refined = EquitablePartitionRefiner::new(&asymmetric).refine(&Partition::unit(5));
        assert!(refined.is_discrete());
    }

    #[test]
    fn cells_are_only_ever_split() {
        let graph = star(5);
        let coarser = Partition::from_str("[0,1|2,3,4]").unwrap();
        let finer = EquitablePartitionRefiner::new(&graph).refine(&coarser);
        assert_eq!(finer.to_string(), "[1|0|2,3,4]");
    }

    #[test]
    fn discrete_partitions_are_returned_as_is() {
        let graph = path(4);
        let discrete = Partition::from_str("[3|1|0|2]").unwrap();
        assert_eq!(EquitablePartitionRefiner::new(&graph).refine(&discrete), discrete);
        assert_eq!(EquitablePartitionRefiner::new(&Graph::plain(0, [])).refine(&Partition::unit(0)), Partition::new());
    }

    proptest! {
        #[test]
        fn refinement_is_idempotent_and_deterministic(len in 1usize..16, seed in any::<u64>(), reverse in any::<bool>()) {
            let graph = random_graph(len, 0.3, 2, seed);
            let split_order = if reverse { SplitOrder::Reverse } else { SplitOrder::Forward };
            let refiner = EquitablePartitionRefiner::with_split_order(&graph, split_order);
            let once = refiner.refine(&graph.initial_partition());
            prop_assert_eq!(refiner.refine(&once), once.clone());
            prop_assert_eq!(refiner.refine(&graph.initial_partition()), once.clone());
            prop_assert_eq!(once.number_of_elements(), len);
        }
    }
}
