//! Benchmark computing automorphism groups of random Erdős–Rényi graphs.

use crate::canon::Automorphisms;
use crate::group::PermutationGroup;
use crate::partition::Partition;
use crate::permutable::graph::{EdgeGraph, Graph};
use crate::refine::{DiscretePartitionRefiner, EquitablePartitionRefiner, Refinable, SplitOrder};
use clap::Parser;
use itertools::Itertools;
use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::io::{stdout, Write};
use timeit::timeit_loops;

macro_rules! print_flush {
    ( $($t:tt)* ) => {
        {
            print!($($t)*);
            stdout().flush().unwrap();
        }
    }
}

#[derive(Clone, Debug, Parser, PartialEq)]
pub struct Config {
    /// Number of random graphs.
    #[arg(short, long, default_value = "100")]
    pub graphs: usize,

    /// Number of vertices per graph.
    #[arg(short, long, default_value = "20")]
    pub nodes: usize,

    /// Probability of each vertex pair being connected.
    #[arg(short, long, default_value = "0.1")]
    pub edge_prob: f64,

    /// Edge multiplicities are drawn uniformly from 1 up to this value.
    #[arg(short, long, default_value = "1")]
    pub max_multiplicity: usize,

    /// Number of vertex labels, drawn uniformly. 1 for unlabelled graphs.
    #[arg(short, long, default_value = "1")]
    pub labels: usize,

    /// Seed for generating the graphs.
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// Split cells by descending instead of ascending invariant.
    #[arg(long)]
    pub reverse: bool,

    /// Additionally compute edge automorphisms via line graphs.
    #[arg(long)]
    pub edges: bool,

    #[arg(short, long)]
    /// Number of threads to use for parallelism. By default, the number of logical CPUs is used.
    pub threads: Option<usize>,
}

impl Config {
    pub fn split_order(&self) -> SplitOrder {
        if self.reverse { SplitOrder::Reverse } else { SplitOrder::Forward }
    }

    /// Random graphs with labels `0..labels`, reproducible from the seed.
    pub fn graphs(&self) -> Vec<Graph<usize>> {
        assert!(self.labels > 0, "At least one label is required.");
        (0..self.graphs as u64).into_par_iter().map(|i| {
            let seed = self.seed.wrapping_add(i);
            let mut rng = Pcg64Mcg::seed_from_u64(seed);
            let labels = (0..self.nodes).map(|_| rng.gen_range(0..self.labels)).collect_vec();
            Graph::random(labels, self.edge_prob, self.max_multiplicity, seed)
        }).collect()
    }

    /// Automorphisms with this configuration's split order.
    pub fn automorphisms<R: Refinable>(&self, refinable: &R, partition: &Partition) -> Automorphisms {
        let mut refiner = DiscretePartitionRefiner::new(refinable);
        refiner.setup(PermutationGroup::new(refinable.vertex_count()),
                      EquitablePartitionRefiner::with_split_order(refinable, self.split_order()));
        refiner.refine(partition);
        refiner.into()
    }
}

/// Totals over all graphs of a benchmark run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    /// Sum of log2 automorphism group orders.
    pub symmetry: f64,
    pub orbits: usize,
    pub canonical: usize,
    pub edge_symmetry: Option<f64>,
    pub edge_orbits: Option<usize>,
}

pub struct Benchmark {
    pub config: Config,
}

impl Benchmark {
    pub fn timed_run(&self) -> Summary {
        let mut summary = Summary::default();
        let time = timeit_loops!(1, { summary = self.run(); });
        println!("Finished in {time:.1}s.");
        summary
    }

    /// Runs on a dedicated pool if a thread count is configured, so repeated runs can differ in it.
    pub fn run(&self) -> Summary {
        let Some(threads) = self.config.threads else { return self.run_in_current_pool() };
        match ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| self.run_in_current_pool()),
            Err(err) => {
                warn!("using the global thread pool, could not build one with {threads} threads: {err}");
                self.run_in_current_pool()
            }
        }
    }

    fn run_in_current_pool(&self) -> Summary {
        let graphs = self.config.graphs();
        info!("generated {} graphs with {} vertices and {} edges in total",
            graphs.len(), graphs.iter().map(|g| g.nodes.len()).sum::<usize>(), graphs.iter().map(Graph::num_edges).sum::<usize>());

        print!("graphs nodes edge_prob labels split symmetry orbits canonical sec ");
        if self.config.edges {
            print!("edge_symmetry edge_orbits edge_sec ");
        }
        println!();
        print_flush!("{} {} {} {} {:?} ", graphs.len(), self.config.nodes, self.config.edge_prob, self.config.labels, self.config.split_order());

        let mut automorphisms = vec![];
        let sec = timeit_loops!(1, {
            automorphisms = graphs.par_iter().map(|g| self.config.automorphisms(g, &g.initial_partition())).collect::<Vec<_>>();
        });
        let mut summary = Summary {
            symmetry: automorphisms.iter().map(|a| a.bits).sum(),
            orbits: automorphisms.iter().map(|a| a.orbits.len()).sum(),
            canonical: automorphisms.iter().filter(|a| a.canon.is_identity()).count(),
            ..Summary::default()
        };
        print_flush!("{} {} {} {sec} ", summary.symmetry, summary.orbits, summary.canonical);

        if self.config.edges {
            let mut edge_automorphisms = vec![];
            let edge_sec = timeit_loops!(1, {
                edge_automorphisms = graphs.par_iter().map(|g| {
                    let edges = EdgeGraph::new(g);
                    self.config.automorphisms(&edges, &edges.initial_partition())
                }).collect::<Vec<_>>();
            });
            let edge_symmetry = edge_automorphisms.iter().map(|a| a.bits).sum::<f64>();
            let edge_orbits = edge_automorphisms.iter().map(|a| a.orbits.len()).sum::<usize>();
            print_flush!("{edge_symmetry} {edge_orbits} {edge_sec} ");
            summary.edge_symmetry = Some(edge_symmetry);
            summary.edge_orbits = Some(edge_orbits);
        }
        println!();
        summary
    }
}
