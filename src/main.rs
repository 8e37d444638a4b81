use clap::Parser;
use partition_refinement::bench::{Benchmark, Config};

/// Benchmark for automorphism groups and canonical labellings of random Erdős–Rényi graphs,
/// computed by discrete partition refinement. Set RUST_LOG=debug for per-graph search statistics.
#[derive(Clone, Debug, Parser, PartialEq)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    config: Config,
}

fn main() {
    env_logger::init();
    Benchmark { config: Args::parse().config }.timed_run();
}
