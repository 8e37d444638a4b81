//! Undirected graphs with vertex labels and edge multiplicities, the refinable objects of this crate.

use crate::partition::{Cell, Partition};
use crate::permutable::{FHashMap, FHashSet, Permutable, Permutation};
use crate::refine::Refinable;
use itertools::Itertools;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use rayon::prelude::*;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::iter::repeat_n;

pub type EdgeIndex = (usize, usize);
/// Edge together with its multiplicity.
pub type Edge = (EdgeIndex, usize);
/// Neighbors of a vertex, mapped to the multiplicity of the connecting edge.
pub type NeighborMap = FHashMap<usize, usize>;

/// Vertex label, such as an element symbol.
pub trait Label: Clone + Debug + Ord + Send + Sync {}
impl<T: Clone + Debug + Ord + Send + Sync> Label for T {}

/// Ordered undirected graph without self-loops. Multiplicities are positive.
#[derive(Clone, Eq, PartialEq)]
pub struct Graph<N: Label = ()> {
    pub nodes: Vec<(N, NeighborMap)>,
}

impl<N: Label> From<Vec<(N, NeighborMap)>> for Graph<N> {
    fn from(nodes: Vec<(N, NeighborMap)>) -> Self {
        let out = Self { nodes };
        out.verify_is_undirected();
        out
    }
}

impl<N: Label> Graph<N> {
    /// Only in debug build since the check is quadratic in the degree.
    fn verify_is_undirected(&self) {
        debug_assert!(self.nodes.iter().enumerate().all(|(i, (_, ne))|
            !ne.contains_key(&i) && ne.iter().all(|(j, m)| *m > 0 && self.nodes[*j].1.get(&i) == Some(m))));
    }

    pub fn empty(nodes: impl IntoIterator<Item=N>) -> Self {
        nodes.into_iter().map(|n| (n, NeighborMap::default())).collect_vec().into()
    }

    pub fn new(nodes: impl IntoIterator<Item=N>, edges: impl IntoIterator<Item=Edge>) -> Self {
        let mut x = Self::empty(nodes);
        for (e, m) in edges {
            assert!(x.insert_edge(e, m).is_none(), "Duplicate edge {:?}", e);
        }
        x
    }

    /// Erdős–Rényi graph on the given nodes, with multiplicities uniform in `1..=max_multiplicity`.
    pub fn random(nodes: impl IntoIterator<Item=N>, edge_prob: f64, max_multiplicity: usize, seed: u64) -> Self {
        assert!(max_multiplicity > 0);
        let mut rng = Pcg64Mcg::seed_from_u64(seed);
        let mut x = Self::empty(nodes);
        for (i, j) in (0..x.len()).tuple_combinations() {
            if rng.gen_bool(edge_prob) {
                let m = rng.gen_range(1..=max_multiplicity);
                x.insert_edge((i, j), m);
            }
        }
        x
    }

    /// Inserts or overwrites an edge, returning the previous multiplicity.
    pub fn insert_edge(&mut self, (i, j): EdgeIndex, multiplicity: usize) -> Option<usize> {
        assert_ne!(i, j, "Self-loops are not supported");
        assert!(multiplicity > 0, "Multiplicity of edge {:?} must be positive", (i, j));
        assert!(j < self.len());
        let out = self.nodes[i].1.insert(j, multiplicity);
        assert_eq!(out, self.nodes[j].1.insert(i, multiplicity));
        out
    }

    pub fn remove_edge(&mut self, (i, j): EdgeIndex) -> Option<usize> {
        let out = self.nodes[i].1.remove(&j);
        assert_eq!(out, self.nodes[j].1.remove(&i));
        out
    }

    pub fn edge(&self, (i, j): EdgeIndex) -> Option<usize> {
        self.nodes[i].1.get(&j).cloned()
    }

    pub fn has_edge(&self, (i, j): &EdgeIndex) -> bool {
        self.nodes[*i].1.contains_key(j)
    }

    /// Edges with `i < j`, sorted.
    pub fn edges(&self) -> Vec<Edge> {
        self.nodes.iter().enumerate().flat_map(|(i, (_, ne))|
            ne.iter().filter(move |&(&j, _)| i < j).map(move |(&j, &m)| ((i, j), m))).sorted_unstable().collect()
    }

    pub fn node_labels(&self) -> impl ExactSizeIterator<Item=N> + '_ {
        self.nodes.iter().map(|(n, _)| n.clone())
    }

    pub fn degrees(&self) -> impl Iterator<Item=usize> + '_ {
        self.nodes.iter().map(|(_, ne)| ne.len())
    }

    pub fn num_edges(&self) -> usize {
        self.degrees().sum::<usize>() / 2
    }

    /// Vertices grouped by label, cells ordered by ascending label.
    pub fn initial_partition(&self) -> Partition {
        Partition::from_labels(&self.node_labels().collect_vec())
    }
}

impl Graph {
    pub fn plain(len: usize, edges: impl IntoIterator<Item=EdgeIndex>) -> Self {
        Graph::new(repeat_n((), len), edges.into_iter().map(|e| (e, 1)))
    }
}

impl<N: Label> Permutable for Graph<N> {
    fn len(&self) -> usize { self.nodes.len() }

    fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }

        self.nodes.swap(i, j);
        let nei = self.nodes[i].1.clone();
        let nej = self.nodes[j].1.clone();
        let mut neighbors = nei.keys().chain(nej.keys()).collect::<FHashSet<_>>();
        neighbors.insert(&i);
        neighbors.insert(&j);
        for n in neighbors {
            let ne = &mut self.nodes[*n].1;
            let ei = ne.remove(&j);
            let ej = ne.remove(&i);
            if let Some(ei) = ei {
                ne.insert(i, ei);
            }
            if let Some(ej) = ej {
                ne.insert(j, ej);
            }
        }
    }

    fn permuted(&self, p: &Permutation) -> Self {
        assert_eq!(self.len(), p.len());
        self.nodes.permuted(p).into_par_iter().
            map(|(n, ne)| (n, ne.into_iter().
                map(|(j, m)| (p.get(j), m)).collect())).collect::<Vec<_>>().into()
    }
}

impl<N: Label> Refinable for Graph<N> {
    /// Number of neighbors in the block per multiplicity: entry `m - 1` counts edges of
    /// multiplicity `m`. Without trailing zeros, so plain graphs yield `[count]` or `[]`.
    type Invariant = Vec<usize>;

    fn vertex_count(&self) -> usize { self.len() }

    fn connectivity(&self, i: usize, j: usize) -> usize {
        self.edge((i, j)).unwrap_or(0)
    }

    fn neighbours_in_block(&self, block: &Cell, vertex: usize) -> Vec<usize> {
        let mut counts = vec![];
        for (j, &m) in &self.nodes[vertex].1 {
            if block.contains(j) {
                if counts.len() < m {
                    counts.resize(m, 0);
                }
                counts[m - 1] += 1;
            }
        }
        counts
    }
}

impl<N: Label> Debug for Graph<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let edges = self.edges();

        fn universal<S: Eq>(items: impl IntoIterator<Item=S>) -> Option<S> {
            let mut iter = items.into_iter();
            let first = iter.next()?;
            iter.all(|x| x == first).then_some(first)
        }

        let nodes_str = if let Some(label) = universal(self.node_labels()) {
            format!("all {:?}", label)
        } else {
            format!("{:?}", self.node_labels().collect_vec())
        };
        let edges_str = if let Some(m) = universal(edges.iter().map(|(_, m)| *m)) {
            format!("all {:?} at {:?}", m, edges.iter().map(|(e, _)| *e).collect_vec())
        } else {
            format!("{:?}", edges)
        };

        write!(f, "N={}: {nodes_str}, E={}: {edges_str}", self.len(), edges.len())
    }
}

/// Line graph of a [`Graph`]: vertices are the graph's edges, connected iff they share an endpoint.
/// Its automorphisms act on edges, such as bonds of a molecule.
#[derive(Clone, Debug)]
pub struct EdgeGraph<'a, N: Label = ()> {
    graph: &'a Graph<N>,
    edges: Vec<Edge>,
}

impl<'a, N: Label> EdgeGraph<'a, N> {
    pub fn new(graph: &'a Graph<N>) -> Self {
        Self { graph, edges: graph.edges() }
    }

    /// Edges in vertex order of this line graph.
    pub fn edges(&self) -> &[Edge] { &self.edges }

    fn share_endpoint(&self, a: usize, b: usize) -> bool {
        let ((i, j), _) = self.edges[a];
        let ((k, l), _) = self.edges[b];
        a != b && (i == k || i == l || j == k || j == l)
    }

    /// Edges grouped by multiplicity and the sorted labels of their endpoints.
    pub fn initial_partition(&self) -> Partition {
        let labels = self.edges.iter().map(|&((i, j), m)| {
            let (a, b) = (self.graph.nodes[i].0.clone(), self.graph.nodes[j].0.clone());
            (m, a.clone().min(b.clone()), a.max(b))
        }).collect_vec();
        Partition::from_labels(&labels)
    }
}

impl<N: Label> Refinable for EdgeGraph<'_, N> {
    type Invariant = usize;

    fn vertex_count(&self) -> usize { self.edges.len() }

    fn connectivity(&self, a: usize, b: usize) -> usize {
        self.share_endpoint(a, b) as usize
    }

    fn neighbours_in_block(&self, block: &Cell, edge: usize) -> usize {
        block.iter().filter(|&&other| self.share_endpoint(edge, other)).count()
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::refine::DiscretePartitionRefiner;

    pub fn cycle(len: usize) -> Graph {
        Graph::plain(len, (0..len).map(|i| (i, (i + 1) % len)))
    }

    pub fn path(len: usize) -> Graph {
        Graph::plain(len, (1..len).map(|i| (i - 1, i)))
    }

    /// Center 0 with leaves `1..len`.
    pub fn star(len: usize) -> Graph {
        Graph::plain(len, (1..len).map(|i| (0, i)))
    }

    pub fn random_graph(len: usize, edge_prob: f64, max_multiplicity: usize, seed: u64) -> Graph {
        Graph::random(repeat_n((), len), edge_prob, max_multiplicity, seed)
    }

    #[test]
    fn edges_and_degrees() {
        let mut graph = cycle(4);
        assert_eq!(graph.edges(), vec![((0, 1), 1), ((0, 3), 1), ((1, 2), 1), ((2, 3), 1)]);
        assert_eq!(graph.num_edges(), 4);
        assert_eq!(graph.insert_edge((2, 1), 3), Some(1));
        assert_eq!(graph.edge((1, 2)), Some(3));
        assert_eq!(graph.remove_edge((3, 0)), Some(1));
        assert!(!graph.has_edge(&(0, 3)));
        assert_eq!(graph.degrees().collect_vec(), vec![1, 2, 2, 1]);
        assert_eq!(format!("{:?}", graph), "N=4: all (), E=3: [((0, 1), 1), ((1, 2), 3), ((2, 3), 1)]");
        assert_eq!(format!("{:?}", path(3)), "N=3: all (), E=2: all 1 at [(0, 1), (1, 2)]");
    }

    #[test]
    #[should_panic]
    fn rejects_self_loops() {
        Graph::plain(2, [(1, 1)]);
    }

    #[test]
    fn left_group_action_axioms() {
        for seed in 0..10 {
            random_graph(12, 0.3, 3, seed).test_left_group_action_axioms(seed);
        }
        let labelled = Graph::new(["C", "O", "N", "C"], [((0, 1), 2), ((1, 2), 1), ((2, 3), 1)]);
        labelled.test_left_group_action_axioms(0);
        let mut swapped = labelled.clone();
        swapped.swap(0, 3);
        assert_eq!(swapped, labelled.permuted(&Permutation::from(vec![3, 1, 2, 0])));
    }

    #[test]
    fn invariant_counts_neighbors_by_multiplicity() {
        let graph = Graph::new(repeat_n((), 5), [((0, 1), 1), ((0, 2), 2), ((0, 3), 2), ((0, 4), 3)]);
        let all = (0..5).collect::<Cell>();
        assert_eq!(graph.neighbours_in_block(&all, 0), vec![1, 2, 1]);
        assert_eq!(graph.neighbours_in_block(&Cell::from([1, 2]), 0), vec![1, 1]);
        assert_eq!(graph.neighbours_in_block(&Cell::from([2]), 0), vec![0, 1]);
        assert_eq!(graph.neighbours_in_block(&Cell::from([2, 3, 4]), 1), vec![]);
        assert_eq!(graph.connectivity(2, 0), 2);
        assert_eq!(graph.connectivity(2, 3), 0);
    }

    #[test]
    fn initial_partition_groups_labels() {
        let graph = Graph::new(["O", "C", "C", "H"], [((0, 1), 2), ((1, 2), 1), ((2, 3), 1)]);
        assert_eq!(graph.initial_partition().to_string(), "[1,2|3|0]");
        assert_eq!(path(3).initial_partition().to_string(), "[0,1,2]");
    }

    #[test]
    fn random_graphs_are_seeded() {
        let graph = random_graph(20, 0.5, 2, 7);
        assert_eq!(graph, random_graph(20, 0.5, 2, 7));
        assert!(graph.edges().iter().all(|&(_, m)| (1..=2).contains(&m)));
        assert_eq!(random_graph(20, 0., 2, 7).num_edges(), 0);
        assert_eq!(random_graph(20, 1., 1, 7).num_edges(), 190);
    }

    #[test]
    fn edge_automorphisms() {
        let star = star(4);
        let edges = EdgeGraph::new(&star);
        assert_eq!(edges.vertex_count(), 3);
        let mut refiner = DiscretePartitionRefiner::new(&edges);
        refiner.refine(&edges.initial_partition());
        assert_eq!(refiner.automorphism_group().order(), 6);

        let path = path(4);
        let edges = EdgeGraph::new(&path);
        let mut refiner = DiscretePartitionRefiner::new(&edges);
        refiner.refine(&edges.initial_partition());
        assert_eq!(refiner.automorphism_group().order(), 2);
        assert_eq!(refiner.automorphism_partition().to_string(), "[0,2|1]");

        let mut bonds = cycle(4);
        bonds.insert_edge((0, 1), 2);
        let edges = EdgeGraph::new(&bonds);
        assert_eq!(edges.initial_partition().to_string(), "[1,2,3|0]");
        let mut refiner = DiscretePartitionRefiner::new(&edges);
        refiner.refine(&edges.initial_partition());
        assert_eq!(refiner.automorphism_group().order(), 2);
    }
}
