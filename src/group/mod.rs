//! Permutation groups in compact Schreier-Sims form.
//!
//! A group G on `0..n` is stored as a stabilizer chain G = G_0 ⊇ G_1 ⊇ ... ⊇ G_n = {id} for a base
//! `b_0, ..., b_{n-1}`, where G_i fixes `b_0, ..., b_{i-1}`. Row `i` of the table holds a left
//! transversal of G_{i+1} in G_i: entry `(i, j)` is the unique stored element of G_i sending `b_i`
//! to `j`, if any. Every group element factors uniquely as `u_0 ∘ u_1 ∘ ... ∘ u_{n-1}` with `u_i`
//! taken from row `i`.
//!
//! See Kreher & Stinson: Combinatorial Algorithms, ch. 6.

use crate::permutable::Permutation;
use log::trace;
use std::ops::Index;

/// Visitor for [`PermutationGroup::apply`].
pub trait Backtracker {
    fn apply_to(&mut self, p: &Permutation);

    /// Checked before every leaf and before every descent; enumeration stops once true.
    fn is_finished(&self) -> bool { false }
}

impl<F: FnMut(&Permutation)> Backtracker for F {
    fn apply_to(&mut self, p: &Permutation) { self(p) }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PermutationGroup {
    len: usize,
    base: Permutation,
    /// Row-major `len × len` transversal table.
    table: Vec<Option<Permutation>>,
}

impl PermutationGroup {
    /// Trivial group with base `0, ..., len - 1`.
    pub fn new(len: usize) -> Self {
        Self::with_base(Permutation::identity(len))
    }

    /// Trivial group with the given base.
    pub fn with_base(base: Permutation) -> Self {
        let len = base.len();
        let mut table = vec![None; len * len];
        for i in 0..len {
            table[i * len + base.get(i)] = Some(Permutation::identity(len));
        }
        Self { len, base, table }
    }

    /// Group generated by the given permutations.
    pub fn from_generators(len: usize, generators: impl IntoIterator<Item=Permutation>) -> Self {
        let mut group = Self::new(len);
        for g in generators {
            assert_eq!(g.len(), len);
            group.enter(g);
        }
        group
    }

    /// Full symmetric group, generated by the transposition (0 1) and the cycle (0 1 ... len-1).
    pub fn symmetric(len: usize) -> Self {
        if len < 2 {
            return Self::new(len);
        }
        let mut transposition = (0..len).collect::<Vec<_>>();
        transposition.swap(0, 1);
        let cycle = (0..len).map(|i| (i + 1) % len).collect::<Vec<_>>();
        Self::from_generators(len, [Permutation::from(transposition), Permutation::from(cycle)])
    }

    /// Number of points acted on.
    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn base(&self) -> &Permutation { &self.base }

    pub fn get(&self, i: usize, j: usize) -> Option<&Permutation> {
        self.table[i * self.len + j].as_ref()
    }

    fn row(&self, i: usize) -> impl Iterator<Item=&Permutation> + '_ {
        self.table[i * self.len..(i + 1) * self.len].iter().flatten()
    }

    /// Stored transversal elements of row `i`.
    pub fn left_transversal(&self, i: usize) -> Vec<&Permutation> {
        self.row(i).collect()
    }

    /// Size of the orbit of base point `i` under G_i.
    pub fn orbit_len(&self, i: usize) -> usize {
        self.row(i).count()
    }

    /// Group order, saturating at `u128::MAX`.
    pub fn order(&self) -> u128 {
        (0..self.len).fold(1u128, |total, i| total.saturating_mul(self.orbit_len(i) as u128))
    }

    /// Base-2 logarithm of the group order. Does not overflow.
    pub fn order_log2(&self) -> f64 {
        (0..self.len).map(|i| (self.orbit_len(i) as f64).log2()).sum()
    }

    /// All non-identity transversal elements. Together they generate the group.
    pub fn generators(&self) -> Vec<Permutation> {
        self.table.iter().flatten().filter(|g| !g.is_identity()).cloned().collect()
    }

    /// Sifts `g` through the chain in place. Returns the depth reached, which is `len` iff `g` is
    /// a member. Otherwise `g` is left reduced, fixing the base points before that depth.
    fn sift(&self, g: &mut Permutation) -> usize {
        for i in 0..self.len {
            let x = g.get(self.base.get(i));
            match self.get(i, x) {
                None => return i,
                Some(h) => *g = g.multiply(&h.invert()),
            }
        }
        self.len
    }

    /// Sifting depth of `g`, `len` iff `g` is a member of the group.
    pub fn test(&self, g: &Permutation) -> usize {
        self.sift(&mut g.clone())
    }

    pub fn contains(&self, g: &Permutation) -> bool {
        self.test(g) == self.len
    }

    /// Stored entries together with their row.
    fn entries(&self) -> impl Iterator<Item=(usize, &Permutation)> + '_ {
        self.table.iter().enumerate().filter_map(|(k, g)| g.as_ref().map(|g| (k / self.len, g)))
    }

    /// Adds `g` to the group, closing the table under composition.
    ///
    /// For entries `u` of row `j` and `s` of row `k >= j`, the product `u.multiply(s)` is sifted once the
    /// later of the two is installed. The table then satisfies the Schreier-Sims condition: every
    /// row is a full transversal of its stabilizer.
    pub fn enter(&mut self, g: Permutation) {
        let mut pending = vec![g];
        while let Some(mut g) = pending.pop() {
            let i = self.sift(&mut g);
            if i == self.len {
                continue;
            }
            let x = g.get(self.base.get(i));
            trace!("entering {} at ({i}, {x})", g.to_cycle_string());
            self.table[i * self.len + x] = Some(g.clone());

            for (j, h) in self.entries().filter(|(_, h)| !h.is_identity()) {
                if j <= i {
                    pending.push(h.multiply(&g));
                }
                if j >= i {
                    pending.push(g.multiply(h));
                }
            }
        }
    }

    /// Rebuilds the chain for a different base, keeping the same group.
    pub fn change_base(&mut self, new_base: &Permutation) {
        assert_eq!(new_base.len(), self.len);
        let mut h = PermutationGroup::with_base(new_base.clone());
        let first_difference = self.base.first_index_of_difference(new_base);

        for j in first_difference..self.len {
            for g in self.row(j) {
                h.enter(g.clone());
            }
        }

        // Rows before the first difference are valid for the new base as well.
        for j in 0..first_difference {
            let hj = h.base.get(j);
            for g in self.row(j) {
                h.table[j * self.len + g.get(hj)] = Some(g.clone());
            }
        }

        *self = h;
    }

    /// Depth-first enumeration of all group elements.
    pub fn apply(&self, backtracker: &mut impl Backtracker) {
        self.backtrack(0, Permutation::identity(self.len), backtracker);
    }

    fn backtrack(&self, l: usize, g: Permutation, backtracker: &mut impl Backtracker) {
        if backtracker.is_finished() {
            return;
        }
        if l == self.len {
            backtracker.apply_to(&g);
            return;
        }
        for h in self.row(l) {
            self.backtrack(l + 1, h.multiply(&g), backtracker);
            if backtracker.is_finished() {
                return;
            }
        }
    }

    pub fn all(&self) -> Vec<Permutation> {
        let mut all = vec![];
        self.apply(&mut |p: &Permutation| all.push(p.clone()));
        all
    }

    /// One representative of every left coset of `subgroup`, which must be a subgroup of `self`.
    pub fn transversal(&self, subgroup: &PermutationGroup) -> Vec<Permutation> {
        struct TransversalBacktracker<'a> {
            subgroup: &'a PermutationGroup,
            index: u128,
            results: Vec<Permutation>,
        }

        impl Backtracker for TransversalBacktracker<'_> {
            fn apply_to(&mut self, p: &Permutation) {
                let represented = self.results.iter().any(|f| self.subgroup.contains(&p.multiply(&f.invert())));
                if !represented {
                    self.results.push(p.clone());
                }
            }

            fn is_finished(&self) -> bool {
                self.results.len() as u128 >= self.index
            }
        }

        let mut backtracker = TransversalBacktracker {
            subgroup,
            index: self.order() / subgroup.order(),
            results: vec![],
        };
        self.apply(&mut backtracker);
        backtracker.results
    }
}

impl Index<(usize, usize)> for PermutationGroup {
    type Output = Option<Permutation>;

    fn index(&self, (i, j): (usize, usize)) -> &Option<Permutation> {
        &self.table[i * self.len + j]
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::permutable::FHashSet;
    use itertools::Itertools;
    use proptest::prelude::*;

    /// All products of the generators, by breadth-first search.
    fn closure(len: usize, generators: &[Permutation]) -> Vec<Permutation> {
        let mut seen = FHashSet::default();
        seen.insert(Permutation::identity(len));
        let mut queue = vec![Permutation::identity(len)];
        while let Some(g) = queue.pop() {
            for s in generators {
                let h = g.multiply(s);
                if seen.insert(h.clone()) {
                    queue.push(h);
                }
            }
        }
        seen.into_iter().sorted().collect()
    }

    pub fn assert_closed_under_products(group: &PermutationGroup) {
        let all = group.all();
        let elements = all.iter().cloned().collect::<FHashSet<_>>();
        assert_eq!(elements.len() as u128, group.order());
        for (g, h) in all.iter().cartesian_product(&all) {
            assert!(elements.contains(&g.multiply(h)), "{g} * {h} is missing");
        }
    }

    /// Random permutation of the first `support` points, fixing the rest.
    fn random_on_prefix(len: usize, support: usize, seed: u64) -> Permutation {
        Permutation::from(Permutation::random(support, seed).values().iter().copied().chain(support..len).collect_vec())
    }

    fn factorial(n: usize) -> u128 {
        (1..=n as u128).product()
    }

    #[test]
    fn symmetric_group_orders() {
        let factorials = [1, 1, 2, 6, 24, 120, 720, 5040];
        for (n, &expected) in factorials.iter().enumerate() {
            assert_eq!(PermutationGroup::symmetric(n).order(), expected, "Sym({n})");
        }
        assert_eq!(PermutationGroup::symmetric(12).order(), factorial(12));
        assert!((PermutationGroup::symmetric(6).order_log2() - 720f64.log2()).abs() < 1e-9);
    }

    #[test]
    fn large_orders_do_not_overflow() {
        assert!(factorial(21) > u64::MAX as u128);
        assert_eq!(PermutationGroup::symmetric(21).order(), factorial(21));
    }

    #[test]
    fn identity_entries_on_base() {
        let group = PermutationGroup::symmetric(5);
        for i in 0..5 {
            assert!(group.get(i, group.base().get(i)).unwrap().is_identity());
            assert!(group[(i, group.base().get(i))].is_some());
        }
    }

    #[test]
    fn all_elements_are_distinct_members() {
        let group = PermutationGroup::symmetric(4);
        let all = group.all();
        assert_eq!(all.len(), 24);
        assert_eq!(all.iter().unique().count(), 24);
        assert!(all.iter().all(|g| group.contains(g)));
        assert!(all.iter().all(|g| Permutation::from_values(g.values().to_vec()).is_ok()));
    }

    #[test]
    fn cyclic_group() {
        let rotation = Permutation::from(vec![1, 2, 3, 4, 0]);
        let group = PermutationGroup::from_generators(5, [rotation.clone()]);
        assert_eq!(group.order(), 5);
        assert!(group.contains(&rotation.multiply(&rotation)));
        assert!(!group.contains(&Permutation::from(vec![1, 0, 2, 3, 4])));
        assert_eq!(group.test(&Permutation::from(vec![0, 2, 1, 3, 4])), 1);
    }

    #[test]
    fn dihedral_group() {
        let rotation = Permutation::from(vec![1, 2, 3, 0]);
        let reflection = Permutation::from(vec![0, 3, 2, 1]);
        let group = PermutationGroup::from_generators(4, [rotation, reflection]);
        assert_eq!(group.order(), 8);
        let all = group.all();
        assert!(all.iter().all(|g| all.contains(&g.invert())));
        assert!(all.iter().cartesian_product(&all).all(|(g, h)| group.contains(&g.multiply(h))));
    }

    #[test]
    fn products_across_rows_are_entered() {
        let generators = [Permutation::from(vec![0, 1, 3, 2]), Permutation::from(vec![3, 0, 2, 1])];
        let group = PermutationGroup::from_generators(4, generators.clone());
        assert_eq!(group.order(), 24);
        assert_eq!(group.all().into_iter().sorted().collect_vec(), closure(4, &generators));
        assert_closed_under_products(&group);
    }

    #[test]
    fn direct_product_of_symmetric_groups() {
        let generators = [vec![1, 0, 2, 3, 4, 5], vec![1, 2, 0, 3, 4, 5], vec![0, 1, 2, 4, 3, 5], vec![0, 1, 2, 4, 5, 3]];
        let group = PermutationGroup::from_generators(6, generators.map(Permutation::from));
        assert_eq!(group.order(), 36);
        assert_closed_under_products(&group);
    }

    #[test]
    fn entering_members_changes_nothing() {
        let mut group = PermutationGroup::symmetric(4);
        let before = group.clone();
        for g in before.all() {
            group.enter(g);
        }
        assert_eq!(group, before);
    }

    #[test]
    fn change_base_preserves_group() {
        let rotation = Permutation::from(vec![1, 2, 3, 4, 5, 0]);
        let reflection = Permutation::from(vec![0, 5, 4, 3, 2, 1]);
        let mut group = PermutationGroup::from_generators(6, [rotation, reflection]);
        let elements = group.all().into_iter().sorted().collect_vec();

        for new_base in [vec![3, 1, 2, 0, 4, 5], vec![0, 1, 5, 2, 3, 4], vec![5, 4, 3, 2, 1, 0]] {
            let new_base = Permutation::from(new_base);
            group.change_base(&new_base);
            assert_eq!(group.base(), &new_base);
            assert_eq!(group.order(), 12);
            assert_eq!(group.all().into_iter().sorted().collect_vec(), elements);
            for i in 0..6 {
                for g in group.left_transversal(i) {
                    assert!((0..i).all(|k| g.get(new_base.get(k)) == new_base.get(k)));
                }
            }
        }
    }

    #[test]
    fn transversal_has_one_element_per_coset() {
        let group = PermutationGroup::symmetric(4);
        let subgroup = PermutationGroup::from_generators(4, [Permutation::from(vec![1, 2, 3, 0])]);
        let transversal = group.transversal(&subgroup);
        assert_eq!(transversal.len(), 6);
        for (f, g) in transversal.iter().tuple_combinations() {
            assert!(!subgroup.contains(&g.multiply(&f.invert())));
        }
    }

    #[test]
    fn enumeration_stops_when_finished() {
        struct FirstThree(Vec<Permutation>);

        impl Backtracker for FirstThree {
            fn apply_to(&mut self, p: &Permutation) { self.0.push(p.clone()) }
            fn is_finished(&self) -> bool { self.0.len() >= 3 }
        }

        let mut first_three = FirstThree(vec![]);
        PermutationGroup::symmetric(5).apply(&mut first_three);
        assert_eq!(first_three.0.len(), 3);
    }

    #[test]
    fn trivial_groups() {
        for n in 0..4 {
            let group = PermutationGroup::new(n);
            assert_eq!(group.order(), 1);
            assert_eq!(group.all(), vec![Permutation::identity(n)]);
            assert!(group.generators().is_empty());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]
        #[test]
        fn generated_group_is_the_closure(len in 1usize..=7, supports in prop::collection::vec(1usize..=7, 1..4), seed in any::<u64>()) {
            let generators = supports.iter().enumerate().
                map(|(k, &support)| random_on_prefix(len, support.min(len), seed.wrapping_add(k as u64))).collect_vec();
            let expected = closure(len, &generators);

            let group = PermutationGroup::from_generators(len, generators.clone());
            prop_assert_eq!(group.order(), expected.len() as u128);
            prop_assert_eq!(group.all().into_iter().sorted().collect_vec(), expected.clone());

            let mut rebased = PermutationGroup::with_base(Permutation::random(len, seed));
            for g in generators {
                rebased.enter(g);
            }
            prop_assert_eq!(rebased.order(), expected.len() as u128);
            rebased.change_base(&Permutation::random(len, seed.wrapping_add(1)));
            prop_assert_eq!(rebased.all().into_iter().sorted().collect_vec(), expected);
        }
    }
}
