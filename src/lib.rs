pub mod error;
pub mod permutable;
pub mod partition;
pub mod group;
pub mod refine;
pub mod canon;

pub use canon::{AutCanonizable, Automorphisms, Canonizable};
pub use error::{Error, Result};
pub use group::{Backtracker, PermutationGroup};
pub use partition::{Cell, DisjointSetForest, Partition};
pub use permutable::*;
pub use refine::{DiscretePartitionRefiner, EquitablePartitionRefiner, Refinable, SplitOrder};

#[cfg(any(test, feature = "bench"))]
pub mod bench;
