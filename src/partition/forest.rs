//! Union-find used to coalesce vertex orbits into the automorphism partition.

/// Disjoint-set forest over `0..len`. A negative entry marks a root and holds the negated set size,
/// a non-negative entry is the index of the parent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisjointSetForest {
    forest: Vec<isize>,
}

impl DisjointSetForest {
    pub fn new(len: usize) -> Self {
        Self { forest: vec![-1; len] }
    }

    pub fn len(&self) -> usize { self.forest.len() }

    pub fn is_empty(&self) -> bool { self.forest.is_empty() }

    /// Raw parent entry of an element.
    pub fn get(&self, element: usize) -> isize { self.forest[element] }

    pub fn root(&self, mut element: usize) -> usize {
        while self.forest[element] >= 0 {
            element = self.forest[element] as usize;
        }
        element
    }

    /// Union by size. Returns false if both elements already were in the same set.
    pub fn make_union(&mut self, x: usize, y: usize) -> bool {
        let x_root = self.root(x);
        let y_root = self.root(y);
        if x_root == y_root {
            return false;
        }
        // Sizes are negative, so the smaller entry is the larger set.
        let (big, small) = if self.forest[x_root] < self.forest[y_root] { (x_root, y_root) } else { (y_root, x_root) };
        self.forest[big] += self.forest[small];
        self.forest[small] = big as isize;
        true
    }

    pub fn num_sets(&self) -> usize {
        self.forest.iter().filter(|&&x| x < 0).count()
    }

    /// All sets in order of their roots, each with ascending elements.
    pub fn sets(&self) -> Vec<Vec<usize>> {
        let roots = (0..self.len()).filter(|&i| self.forest[i] < 0).collect::<Vec<_>>();
        let mut index_of_root = vec![usize::MAX; self.len()];
        let mut sets = roots.iter().enumerate().map(|(index, &root)| {
            index_of_root[root] = index;
            Vec::with_capacity(-self.forest[root] as usize)
        }).collect::<Vec<_>>();
        for element in 0..self.len() {
            sets[index_of_root[self.root(element)]].push(element);
        }
        sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons() {
        let forest = DisjointSetForest::new(3);
        assert_eq!(forest.sets(), vec![vec![0], vec![1], vec![2]]);
        assert_eq!(forest.get(1), -1);
        assert_eq!(forest.root(2), 2);
    }

    #[test]
    fn unions() {
        let mut forest = DisjointSetForest::new(6);
        assert!(forest.make_union(0, 3));
        assert!(forest.make_union(4, 1));
        assert!(forest.make_union(3, 5));
        assert!(!forest.make_union(5, 0));
        assert_eq!(forest.root(5), forest.root(0));
        assert_eq!(forest.num_sets(), 3);
        let mut sets = forest.sets();
        sets.sort();
        assert_eq!(sets, vec![vec![0, 3, 5], vec![1, 4], vec![2]]);
    }

    #[test]
    fn larger_set_absorbs_smaller() {
        let mut forest = DisjointSetForest::new(4);
        forest.make_union(1, 2);
        forest.make_union(1, 3);
        forest.make_union(0, 1);
        let root = forest.root(0);
        assert_eq!(forest.get(root), -4);
        assert_eq!(forest.root(1), root);
        assert_eq!(forest.get(0), root as isize);
    }
}
