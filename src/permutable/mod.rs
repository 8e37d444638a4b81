//! Permutations and ordered objects / permutable classes.
use crate::error::{Error, Result};
use fxhash::FxBuildHasher;
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::{Index, Mul};

pub mod graph;

pub(crate) type FBuildHasher = FxBuildHasher;
pub(crate) type FHashMap<K, V> = HashMap<K, V, FBuildHasher>;
pub(crate) type FHashSet<K> = HashSet<K, FBuildHasher>;

/// An ordered object. Each type implementing this represents a permutable class.
pub trait Permutable: Clone {
    /// Length of the ordered object. The order of the corresponding permutable class.
    fn len(&self) -> usize;

    /// Swap two indices of the ordered object.
    fn swap(&mut self, i: usize, j: usize);

    /// Permutes the ordered object by a given permutation, moving index `i` to `p[i]`.
    /// By default, this is implemented based on swap.
    fn permuted(&self, p: &Permutation) -> Self {
        self._permuted_from_swap(p)
    }

    fn _permuted_from_swap(&self, x: &Permutation) -> Self {
        assert_eq!(self.len(), x.len());
        let mut p = Permutation::identity(self.len());
        let mut p_inv = Permutation::identity(self.len());
        let mut out = self.clone();
        for i in (0..self.len()).rev() {
            let xi = x.get(i);
            let j = p_inv.get(xi);
            let pi = p.get(i);
            p_inv.0.swap(pi, xi);
            out.swap(pi, xi);
            p.0.swap(i, j);
        }

        out
    }

    /// Relabels the ordered object by a random permutation uniformly sampled with the given seed.
    fn shuffled(&self, seed: u64) -> Self {
        self.permuted(&Permutation::random(self.len(), seed))
    }

    /// Test left group action axioms for this ordered object.
    /// Any implementation should pass this test for any ordered object and seed.
    #[cfg(test)]
    fn test_left_group_action_axioms(&self, seed: u64)
    where
        Self: Eq + fmt::Debug,
    {
        let p0 = Permutation::random(self.len(), seed);
        let p1 = Permutation::random(self.len(), seed + 1);
        assert_eq!(self.permuted(&p0).len(), self.len());
        assert_eq!(&self.permuted(&Permutation::identity(self.len())), self);
        assert_eq!(self.permuted(&p0).permuted(&p1), self.permuted(&p0.multiply(&p1)));
        assert_eq!(self.permuted(&p0), self._permuted_from_swap(&p0));
    }
}

impl<T: Clone> Permutable for Vec<T> {
    fn len(&self) -> usize { Vec::len(self) }

    fn swap(&mut self, i: usize, j: usize) {
        self.as_mut_slice().swap(i, j);
    }

    fn permuted(&self, x: &Permutation) -> Self {
        assert_eq!(Vec::len(self), x.len());
        let mut out = self.clone();
        for i in 0..Vec::len(self) {
            out[x.get(i)] = self[i].clone();
        }
        out
    }
}

/// A bijection on `0..len`, densely represented: `values[i]` is the image of `i`.
///
/// The length is fixed at construction. `From<Vec<usize>>` is unchecked apart from a debug range
/// check, use [`Permutation::from_values`] for validation. Labelling prefixes built during refinement
/// (see [`crate::partition::Partition::set_as_permutation`]) reuse this type without being
/// bijections.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Permutation(Vec<usize>);

impl From<Vec<usize>> for Permutation {
    fn from(values: Vec<usize>) -> Self {
        debug_assert!(values.iter().all(|&x| x < values.len()));
        Self(values)
    }
}

impl Permutation {
    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    /// Checked construction, failing unless `values` is a bijection on `0..values.len()`.
    pub fn from_values(values: Vec<usize>) -> Result<Self> {
        let mut seen = vec![false; values.len()];
        let is_bijection = values.iter().all(|&x| x < seen.len() && !std::mem::replace(&mut seen[x], true));
        if !is_bijection {
            return Err(Error::InvalidPermutation { len: values.len(), values });
        }
        Ok(Self(values))
    }

    /// Prefix construction without the bijection check, used for partial labellings.
    pub(crate) fn prefix(values: Vec<usize>) -> Self {
        Self(values)
    }

    /// Seeded uniform sample.
    pub fn random(len: usize, seed: u64) -> Self {
        let mut values = (0..len).collect_vec();
        values.shuffle(&mut Pcg64Mcg::seed_from_u64(seed));
        Self(values)
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn get(&self, i: usize) -> usize { self.0[i] }

    pub fn set(&mut self, i: usize, value: usize) {
        self.0[i] = value;
    }

    /// Overwrites all values with those of `other`, which must have the same length.
    pub fn set_to(&mut self, other: &Permutation) -> Result<()> {
        if other.len() != self.len() {
            return Err(Error::LengthMismatch { expected: self.len(), actual: other.len() });
        }
        self.0.copy_from_slice(&other.0);
        Ok(())
    }

    pub fn values(&self) -> &[usize] { &self.0 }

    pub fn iter(&self) -> impl ExactSizeIterator<Item=usize> + '_ {
        self.0.iter().cloned()
    }

    /// Composition applying `self` first, then `other`: `result[i] = other[self[i]]`.
    pub fn multiply(&self, other: &Permutation) -> Permutation {
        assert_eq!(self.len(), other.len());
        Self(self.0.iter().map(|&x| other.0[x]).collect())
    }

    pub fn invert(&self) -> Permutation {
        let mut out = vec![0; self.len()];
        for (i, &x) in self.0.iter().enumerate() {
            out[x] = i;
        }
        Self(out)
    }

    pub fn is_identity(&self) -> bool {
        self.iter().enumerate().all(|(i, x)| i == x)
    }

    /// Elements reachable from `element` by repeated application, in visiting order.
    pub fn orbit(&self, element: usize) -> Vec<usize> {
        let mut orbit = vec![element];
        let mut next = self.0[element];
        while next != element {
            orbit.push(next);
            next = self.0[next];
        }
        orbit
    }

    /// Lowest index at which the two permutations differ, or the length if they agree.
    pub fn first_index_of_difference(&self, other: &Permutation) -> usize {
        self.iter().zip(other.iter()).take_while(|(x, y)| x == y).count()
    }

    /// Disjoint cycles including fixed points, each starting at its smallest element.
    pub fn cycles(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.len()];
        let mut cycles = vec![];
        for i in 0..self.len() {
            if visited[i] {
                continue;
            }
            let cycle = self.orbit(i);
            for &x in &cycle {
                visited[x] = true;
            }
            cycles.push(cycle);
        }
        cycles
    }

    pub fn to_cycle_string(&self) -> String {
        self.cycles().iter().map(|c| format!("({})", c.iter().join(", "))).join("")
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

impl Index<usize> for Permutation {
    type Output = usize;

    fn index(&self, i: usize) -> &usize { &self.0[i] }
}

impl Mul<usize> for &Permutation {
    type Output = usize;

    fn mul(self, rhs: usize) -> usize { self.get(rhs) }
}

impl<P: Permutable> Mul<&P> for &Permutation {
    type Output = P;

    fn mul(self, rhs: &P) -> P { P::permuted(rhs, self) }
}
