//! Ordered partitions of vertex sets, as refined by the equitable and discrete refiners.
//!
//! A partition is an ordered sequence of disjoint cells. Cell order drives the search in
//! [`crate::refine::discrete`]; [`Partition::order`] sorts cells by their smallest element and is
//! only used to compare partitions, such as orbit partitions.
//!
//! Partitions print as `[0,1|2,3]`: cells in their current order separated by `|`,
//! each cell's elements ascending and separated by `,`. Parsing accepts the same syntax.

use crate::error::{Error, Result};
use crate::permutable::Permutation;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

pub mod forest;

pub use forest::DisjointSetForest;

/// A set of vertex indices, kept sorted so that the first element is well-defined.
pub type Cell = BTreeSet<usize>;

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Partition {
    cells: Vec<Cell>,
}

impl Partition {
    /// Partition without any cells.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single cell containing `0..len`, or no cells for `len == 0`.
    pub fn unit(len: usize) -> Self {
        if len == 0 {
            return Self::new();
        }
        Self { cells: vec![(0..len).collect()] }
    }

    pub fn from_cells<C: IntoIterator<Item=usize>>(cells: impl IntoIterator<Item=C>) -> Self {
        Self { cells: cells.into_iter().map(|c| c.into_iter().collect()).collect() }
    }

    /// Groups indices with equal labels into cells, ordered by ascending label.
    pub fn from_labels<L: Ord>(labels: &[L]) -> Self {
        let mut cells = BTreeMap::<&L, Cell>::new();
        for (i, label) in labels.iter().enumerate() {
            cells.entry(label).or_default().insert(i);
        }
        Self { cells: cells.into_values().collect() }
    }

    /// Number of cells.
    pub fn len(&self) -> usize { self.cells.len() }

    pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    pub fn number_of_elements(&self) -> usize {
        self.cells.iter().map(Cell::len).sum()
    }

    pub fn cells(&self) -> impl ExactSizeIterator<Item=&Cell> + '_ {
        self.cells.iter()
    }

    pub fn cell(&self, index: usize) -> &Cell { &self.cells[index] }

    /// Owned copy of a cell, safe to hold while the partition changes.
    pub fn copy_block(&self, index: usize) -> Cell { self.cells[index].clone() }

    pub fn first_in_cell(&self, index: usize) -> usize {
        *self.cells[index].first().expect("empty cell")
    }

    pub fn is_discrete(&self) -> bool {
        self.cells.iter().all(|c| c.len() == 1)
    }

    pub fn is_discrete_cell(&self, index: usize) -> bool {
        self.cells[index].len() == 1
    }

    /// Index of the first cell with more than one element, or `None` if the partition is discrete.
    pub fn first_non_discrete_cell(&self) -> Option<usize> {
        (0..self.len()).find(|&i| !self.is_discrete_cell(i))
    }

    pub fn add_cell(&mut self, elements: impl IntoIterator<Item=usize>) {
        self.cells.push(elements.into_iter().collect());
    }

    pub fn add_singleton_cell(&mut self, element: usize) {
        self.cells.push(Cell::from([element]));
    }

    /// Adds an element to an existing cell, or appends it as a singleton if there is no such cell.
    pub fn add_to_cell(&mut self, index: usize, element: usize) {
        if index < self.len() {
            self.cells[index].insert(element);
        } else {
            self.add_singleton_cell(element);
        }
    }

    pub fn insert_cell(&mut self, index: usize, cell: Cell) {
        self.cells.insert(index, cell);
    }

    pub fn remove_cell(&mut self, index: usize) -> Cell {
        self.cells.remove(index)
    }

    /// Sorts the cells by their smallest element.
    pub fn order(&mut self) {
        self.cells.sort_unstable_by_key(|c| c.first().copied());
    }

    pub fn in_same_cell(&self, i: usize, j: usize) -> bool {
        self.cells.iter().any(|c| c.contains(&i) && c.contains(&j))
    }

    /// The permutation sending position `i` to the element of cell `i`. Only valid for discrete partitions.
    pub fn to_permutation(&self) -> Permutation {
        debug_assert!(self.is_discrete());
        Permutation::from(self.cells.iter().map(|c| *c.first().expect("empty cell")).collect_vec())
    }

    /// Labelling prefix built from the smallest element of each of the first `up_to` cells.
    /// Not a bijection unless the partition is discrete and `up_to` covers all cells.
    pub fn set_as_permutation(&self, up_to: usize) -> Permutation {
        Permutation::prefix((0..up_to).map(|i| self.first_in_cell(i)).collect())
    }

    /// New partition with cell `index` replaced by `{element}` followed by the rest of the cell.
    pub fn split_before(&self, index: usize, element: usize) -> Partition {
        self.split(index, element, true)
    }

    /// New partition with cell `index` replaced by the rest of the cell followed by `{element}`.
    pub fn split_after(&self, index: usize, element: usize) -> Partition {
        self.split(index, element, false)
    }

    fn split(&self, index: usize, element: usize, singleton_first: bool) -> Partition {
        let mut rest = self.copy_block(index);
        assert!(rest.remove(&element), "{element} is not in cell {index} of {self}");
        let singleton = Cell::from([element]);
        let (a, b) = if singleton_first { (singleton, rest) } else { (rest, singleton) };
        let mut cells = Vec::with_capacity(self.len() + 1);
        cells.extend(self.cells[..index].iter().cloned());
        cells.push(a);
        cells.push(b);
        cells.extend(self.cells[index + 1..].iter().cloned());
        Partition { cells }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.cells.iter().map(|c| c.iter().join(",")).join("|"))
    }
}

impl FromStr for Partition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::EmptyPartitionString);
        }
        let inner = s.strip_prefix('[').and_then(|s| s.strip_suffix(']')).
            ok_or_else(|| Error::UnbracketedPartitionString { input: s.to_string() })?;
        if inner.trim().is_empty() {
            return Ok(Partition::new());
        }

        let mut seen = BTreeSet::new();
        let mut partition = Partition::new();
        for cell in inner.split('|') {
            let mut elements = Cell::new();
            for element in cell.split(',') {
                let parsed = element.trim().parse::<usize>().map_err(|_|
                    Error::InvalidPartitionElement { input: s.to_string(), element: element.to_string() })?;
                if !seen.insert(parsed) {
                    return Err(Error::DuplicatePartitionElement { input: s.to_string(), element: parsed });
                }
                elements.insert(parsed);
            }
            partition.cells.push(elements);
        }
        Ok(partition)
    }
}
