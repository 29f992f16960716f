//! Flat-array union-find with path compression and union by rank.
//!
//! The board keeps two of these: one over corners (connectivity, for loop
//! detection) and one over cells (forced-equivalence classes).  Their index
//! spaces are unrelated; mixing them is a category error, which is why the
//! board never exposes raw roots from one next to the other.

/// Disjoint sets over `0..len`.  Near-constant `find`/`union`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnionFind {
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(len: usize) -> UnionFind {
        UnionFind {
            parent: (0..len as u32).collect(),
            rank: vec![0; len],
        }
    }

    /// Root of the set containing `item`, with path halving.
    pub fn find(&mut self, item: usize) -> usize {
        let mut x = item;
        while self.parent[x] as usize != x {
            let grandparent = self.parent[self.parent[x] as usize];
            self.parent[x] = grandparent;
            x = grandparent as usize;
        }
        x
    }

    /// Merge the sets containing `a` and `b`.
    ///
    /// Returns `Some((kept, absorbed))` roots when a merge happened, `None`
    /// when the two items were already in the same set.  The caller moves
    /// any per-set metadata from `absorbed` to `kept`.
    pub fn union(&mut self, a: usize, b: usize) -> Option<(usize, usize)> {
        let mut ra = self.find(a);
        let mut rb = self.find(b);

        if ra == rb {
            return None;
        }

        if self.rank[ra] < self.rank[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra as u32;
        if self.rank[ra] == self.rank[rb] {
            self.rank[ra] += 1;
        }

        Some((ra, rb))
    }
}

#[cfg(test)]
mod tests {
    use super::UnionFind;

    #[test]
    fn merges_and_detects_existing_sets() {
        let mut uf = UnionFind::new(5);

        assert!(uf.union(0, 1).is_some());
        assert!(uf.union(1, 2).is_some());
        assert!(uf.union(0, 2).is_none());

        assert_eq!(uf.find(0), uf.find(2));
        assert_ne!(uf.find(0), uf.find(3));
    }

    #[test]
    fn union_reports_the_absorbed_root() {
        let mut uf = UnionFind::new(4);

        let (kept, absorbed) = uf.union(0, 1).unwrap();
        assert_ne!(kept, absorbed);
        assert_eq!(uf.find(absorbed), kept);
    }
}
