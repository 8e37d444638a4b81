//! Canonical orderings and automorphism groups of permutable objects.

use crate::group::PermutationGroup;
use crate::partition::Partition;
use crate::permutable::graph::{Graph, Label};
use crate::permutable::{Permutable, Permutation};
use crate::refine::{DiscretePartitionRefiner, Refinable};

/// Results of one discrete refinement run.
#[derive(Clone, Debug)]
pub struct Automorphisms {
    pub group: PermutationGroup,
    /// Relabelling into canonical order: `x.permuted(&canon)` is the canonical form of `x`.
    pub canon: Permutation,
    /// Inverse of `canon`, mapping canonical positions to original vertices.
    pub decanon: Permutation,
    pub orbits: Partition,
    /// Base-2 logarithm of the group order.
    pub bits: f64,
}

impl PartialEq for Automorphisms {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group && self.canon == other.canon
    }
}

impl Eq for Automorphisms {}

impl<R: Refinable> From<DiscretePartitionRefiner<'_, R>> for Automorphisms {
    /// Falls back to the identity labelling if the refiner has not run.
    fn from(refiner: DiscretePartitionRefiner<'_, R>) -> Self {
        let decanon = refiner.best().cloned().unwrap_or_else(|| Permutation::identity(refiner.vertex_count()));
        let orbits = refiner.automorphism_partition();
        let group = refiner.into_automorphism_group();
        Self { bits: group.order_log2(), canon: decanon.invert(), decanon, orbits, group }
    }
}

/// Object whose relabellings all share one canonical form.
pub trait Canonizable: Permutable {
    /// Relabelling that takes the object to its canonical form.
    fn canon(&self) -> Permutation;

    fn canonized_and_canon(&self) -> (Self, Permutation) {
        let canon = self.canon();
        (self.permuted(&canon), canon)
    }

    fn canonized(&self) -> Self {
        self.canonized_and_canon().0
    }

    /// Equal canonical forms. Objects of different sizes are never isomorphic.
    fn is_isomorphic(&self, other: &Self) -> bool
    where
        Self: Eq,
    {
        self.len() == other.len() && self.canonized() == other.canonized()
    }

    /// Relabels the object randomly and checks that the canonical form is unchanged.
    /// Returns the relabelled object and its canon.
    #[cfg(test)]
    fn check_relabelled_canon(&self, seed: u64) -> (Self, Permutation)
    where
        Self: Eq + std::fmt::Debug,
    {
        self.test_left_group_action_axioms(seed);

        let relabelled = &Permutation::random(self.len(), seed) * self;
        let (canonized, canon) = relabelled.canonized_and_canon();
        assert_eq!(canonized, self.canonized());
        assert_eq!(&canon * &relabelled, canonized);
        assert!(relabelled.is_isomorphic(self));
        (relabelled, canon)
    }
}

/// Object whose automorphisms and canonical form come out of one search.
pub trait AutCanonizable: Permutable {
    fn automorphism_group(&self) -> PermutationGroup {
        self.automorphisms().group
    }

    /// Group, canon and orbits of a single refinement run.
    fn automorphisms(&self) -> Automorphisms;

    /// Checks the canon of a random relabelling and that the group consists of automorphisms.
    #[cfg(test)]
    fn test(&self, seed: u64)
    where
        Self: Eq + std::fmt::Debug,
    {
        let (y, y_canon) = Canonizable::check_relabelled_canon(self, seed);
        let y_aut = y.automorphisms();
        assert_eq!(y_aut.canon, y_canon);
        assert_eq!(y_aut.decanon, y_canon.invert());
        let x_aut = self.automorphisms();
        assert_eq!(y_aut.group.order(), x_aut.group.order());
        assert_eq!(y_aut.orbits.len(), x_aut.orbits.len());
        assert!((y_aut.bits - x_aut.bits).abs() < 1e-9);
        for g in x_aut.group.generators() {
            assert_eq!(&g * self, *self, "{g} is not an automorphism");
        }
    }
}

impl<T: AutCanonizable> Canonizable for T {
    fn canon(&self) -> Permutation { self.automorphisms().canon }
}

impl<N: Label> AutCanonizable for Graph<N> {
    fn automorphisms(&self) -> Automorphisms {
        let mut refiner = DiscretePartitionRefiner::new(self);
        refiner.refine(&self.initial_partition());
        refiner.into()
    }
}
