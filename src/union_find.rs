//! Disjoint-set forest used to track stone connectivity.
//!
//! Elements are plain indices. The board maps a cell to `row * size + col`
//! and reserves two extra indices for the synthetic edge elements, so a win
//! check is a single `connected(EDGE_START, EDGE_END)` query.
//!
//! Elements are registered lazily on first reference and the structure only
//! grows: there is no way to split a set. Board copies clone it wholesale.

use std::collections::HashMap;

/// Index of an element in the forest.
pub type Element = usize;

/// Union by rank with path halving.
#[derive(Clone, Debug, Default)]
pub struct UnionFind {
    /// Parent link per element; `None` until the element is first referenced.
    parent: Vec<Option<Element>>,
    rank: Vec<u8>,
    /// Elements that take part in unions but are left out of [`groups`].
    ///
    /// [`groups`]: UnionFind::groups
    ignored: Vec<Element>,
}

impl UnionFind {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forest with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            parent: vec![None; capacity],
            rank: vec![0; capacity],
            ignored: Vec::new(),
        }
    }

    /// Exclude the given elements from group enumeration.
    pub fn set_ignored_elements(&mut self, ignored: &[Element]) {
        self.ignored = ignored.to_vec();
    }

    /// Number of registered elements.
    pub fn len(&self) -> usize {
        self.parent.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.iter().all(Option::is_none)
    }

    fn register(&mut self, x: Element) {
        if x >= self.parent.len() {
            self.parent.resize(x + 1, None);
            self.rank.resize(x + 1, 0);
        }
        if self.parent[x].is_none() {
            self.parent[x] = Some(x);
            self.rank[x] = 0;
        }
    }

    /// Representative of `x`'s set, registering `x` if it is new.
    pub fn find(&mut self, x: Element) -> Element {
        self.register(x);
        let mut x = x;
        loop {
            let p = self.parent[x].unwrap_or(x);
            if p == x {
                return x;
            }
            let gp = self.parent[p].unwrap_or(p);
            // Path halving: point x at its grandparent and continue from there.
            self.parent[x] = Some(gp);
            x = gp;
        }
    }

    /// Representative of `x` without compressing paths or registering `x`.
    ///
    /// An element that was never referenced is its own singleton set.
    pub fn root(&self, x: Element) -> Element {
        let mut x = x;
        while let Some(Some(p)) = self.parent.get(x) {
            if *p == x {
                break;
            }
            x = *p;
        }
        x
    }

    /// Merge the sets containing `x` and `y`.
    ///
    /// Returns `false` when they were already in the same set.
    pub fn join(&mut self, x: Element, y: Element) -> bool {
        let rx = self.find(x);
        let ry = self.find(y);
        if rx == ry {
            return false;
        }

        match self.rank[rx].cmp(&self.rank[ry]) {
            std::cmp::Ordering::Less => self.parent[rx] = Some(ry),
            std::cmp::Ordering::Greater => self.parent[ry] = Some(rx),
            std::cmp::Ordering::Equal => {
                self.parent[rx] = Some(ry);
                self.rank[ry] += 1;
            }
        }
        true
    }

    pub fn connected(&mut self, x: Element, y: Element) -> bool {
        self.find(x) == self.find(y)
    }

    /// Read-only variant of [`connected`](UnionFind::connected).
    pub fn same_set(&self, x: Element, y: Element) -> bool {
        self.root(x) == self.root(y)
    }

    /// Enumerate every set by representative.
    ///
    /// Ignored elements still determine which set their neighbors belong to
    /// but never appear in a member list, so a set made only of ignored
    /// elements shows up with no members.
    pub fn groups(&self) -> HashMap<Element, Vec<Element>> {
        let mut groups: HashMap<Element, Vec<Element>> = HashMap::new();
        for (x, parent) in self.parent.iter().enumerate() {
            if parent.is_none() {
                continue;
            }
            let members = groups.entry(self.root(x)).or_default();
            if !self.ignored.contains(&x) {
                members.push(x);
            }
        }
        groups
    }
}
