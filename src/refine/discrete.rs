//! Canonical labelling and automorphism group search by individualization and refinement.
//!
//! The search tree branches on the vertices of the first non-discrete cell of each equitable
//! partition. Leaves are discrete partitions, read as permutations from positions to vertices.
//! The best leaf maximizes the half-matrix string, the connectivity of all position pairs `i < j`
//! in row-major order. Leaves equal to the best one yield automorphisms, which are collected in a
//! [`PermutationGroup`] and used to skip branches equivalent to ones already explored.

use crate::group::PermutationGroup;
use crate::partition::{DisjointSetForest, Partition};
use crate::permutable::Permutation;
use crate::refine::{EquitablePartitionRefiner, Refinable};
use itertools::Itertools;
use log::{debug, trace};
use std::cmp::Ordering;

/// Search state for one refinable object. Reusable for another run after [`Self::setup`].
///
/// Queries return `None` (or `false`) until [`Self::refine`] has run.
#[derive(Clone, Debug)]
pub struct DiscretePartitionRefiner<'a, R: Refinable> {
    refinable: &'a R,
    equitable: EquitablePartitionRefiner<'a, R>,
    group: PermutationGroup,
    best: Option<Permutation>,
    first: Option<Permutation>,
    nodes: usize,
}

impl<'a, R: Refinable> DiscretePartitionRefiner<'a, R> {
    /// Refiner with a trivial group and a forward equitable refiner.
    pub fn new(refinable: &'a R) -> Self {
        Self {
            refinable,
            equitable: EquitablePartitionRefiner::new(refinable),
            group: PermutationGroup::new(refinable.vertex_count()),
            best: None,
            first: None,
            nodes: 0,
        }
    }

    /// Clears all results and starts over from the given group, whose elements are assumed to be
    /// automorphisms that preserve the initial partition of the next run.
    pub fn setup(&mut self, group: PermutationGroup, equitable: EquitablePartitionRefiner<'a, R>) {
        assert_eq!(group.len(), self.vertex_count());
        self.group = group;
        self.equitable = equitable;
        self.best = None;
        self.first = None;
        self.nodes = 0;
    }

    pub fn vertex_count(&self) -> usize { self.refinable.vertex_count() }

    /// Runs the search from the given initial partition, usually the vertices grouped by label.
    pub fn refine(&mut self, partition: &Partition) {
        assert_eq!(partition.number_of_elements(), self.vertex_count());
        self.search(partition);
        debug!("explored {} search nodes on {} vertices, automorphism group order {}",
            self.nodes, self.vertex_count(), self.group.order());
    }

    fn search(&mut self, coarser: &Partition) {
        self.nodes += 1;
        let n = self.vertex_count();
        let finer = self.equitable.refine(coarser);

        if finer.len() == n {
            let leaf = finer.to_permutation();
            let Some(best) = &self.best else {
                trace!("first leaf {leaf}");
                self.first = Some(leaf.clone());
                self.best = Some(leaf);
                return;
            };
            match self.compare_rowwise(best, &leaf) {
                Ordering::Greater => {
                    trace!("better leaf {leaf}");
                    self.best = Some(leaf);
                }
                Ordering::Equal => {
                    let automorphism = best.invert().multiply(&leaf);
                    trace!("automorphism {}", automorphism.to_cycle_string());
                    self.group.enter(automorphism);
                }
                Ordering::Less => {}
            }
            return;
        }

        let Some(k) = finer.first_non_discrete_cell() else { return };
        if let Some(best) = &self.best {
            if self.compare_rowwise(best, &finer.set_as_permutation(k)) == Ordering::Less {
                return;
            }
        }

        let mut block = finer.copy_block(k);
        for v in 0..n {
            if !block.contains(&v) {
                continue;
            }
            let next = finer.split_before(k, v);
            self.search(&next);

            // Vertices in the orbit of v under the automorphisms fixing the first k cells lead to
            // equivalent subtrees.
            self.group.change_base(&Self::base_from_prefix(&next, k + 1, n));
            for g in self.group.left_transversal(k) {
                block.remove(&g.get(v));
            }
        }
    }

    /// Compares the half-matrix strings of `best` and `candidate`. `Greater` means the candidate is
    /// better. A candidate shorter than `best` is a labelling prefix: the comparison stops at the
    /// first pair involving a position the prefix does not fix, so no leaf below a `Less` prefix
    /// can beat `best`.
    fn compare_rowwise(&self, best: &Permutation, candidate: &Permutation) -> Ordering {
        let (m, n) = (candidate.len(), best.len());
        for i in 0..m {
            for j in i + 1..n {
                if j == m {
                    return Ordering::Equal;
                }
                let x = self.refinable.connectivity(best.get(i), best.get(j));
                let y = self.refinable.connectivity(candidate.get(i), candidate.get(j));
                if x != y {
                    return y.cmp(&x);
                }
            }
        }
        Ordering::Equal
    }

    /// Base starting with the first elements of the first `up_to` cells, completed by the
    /// remaining vertices in the order given by swapping them into place.
    fn base_from_prefix(partition: &Partition, up_to: usize, n: usize) -> Permutation {
        let mut perm = (0..n).collect_vec();
        let mut inv = (0..n).collect_vec();
        for j in 0..up_to {
            let x = partition.first_in_cell(j);
            let i = inv[x];
            let h = perm[j];
            perm[j] = x;
            perm[i] = h;
            inv[h] = i;
            inv[x] = j;
        }
        Permutation::from(perm)
    }

    /// Labelling with the greatest half-matrix string. Maps positions to vertices.
    pub fn best(&self) -> Option<&Permutation> { self.best.as_ref() }

    /// First leaf reached by the search.
    pub fn first(&self) -> Option<&Permutation> { self.first.as_ref() }

    /// Whether the input is already in canonical order, i.e. the best labelling is the identity.
    pub fn is_canonical(&self) -> bool {
        self.best.as_ref().is_some_and(Permutation::is_identity)
    }

    pub fn automorphism_group(&self) -> &PermutationGroup { &self.group }

    pub fn into_automorphism_group(self) -> PermutationGroup { self.group }

    /// Orbits of the automorphism group, cells sorted by their smallest element.
    pub fn automorphism_partition(&self) -> Partition {
        let n = self.vertex_count();
        let mut forest = DisjointSetForest::new(n);
        let mut sets = n;
        'generators: for g in self.group.generators() {
            for x in 0..n {
                if forest.make_union(x, g.get(x)) {
                    sets -= 1;
                    if sets <= 1 {
                        break 'generators;
                    }
                }
            }
        }
        let mut partition = Partition::from_cells(forest.sets());
        partition.order();
        partition
    }

    /// Connectivity of all position pairs `i < j` under `permutation`, concatenated row by row.
    pub fn half_matrix_string(&self, permutation: &Permutation) -> String {
        let n = permutation.len();
        (0..n).flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .map(|(i, j)| self.refinable.connectivity(permutation.get(i), permutation.get(j)))
            .join("")
    }

    /// Half-matrix string of the input order. Equal to the best one iff the input is canonical up to
    /// automorphism.
    pub fn canonical_half_matrix(&self) -> String {
        self.half_matrix_string(&Permutation::identity(self.vertex_count()))
    }

    pub fn best_half_matrix_string(&self) -> Option<String> {
        self.best.as_ref().map(|p| self.half_matrix_string(p))
    }

    pub fn first_half_matrix_string(&self) -> Option<String> {
        self.first.as_ref().map(|p| self.half_matrix_string(p))
    }
}
