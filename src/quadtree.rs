// Copyright 2017 Matthew Plant. This file is part of MGF2D.
//
// MGF2D is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// MGF2D is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with MGF2D. If not, see <http://www.gnu.org/licenses/>.

//! A region quadtree for finding candidate collision pairs.
//!
//! The tree knows nothing about particles or interactions; it stores opaque
//! copyable keys next to their bounds. Callers turn the pairs it reports into
//! interactions.

use crate::bounds::*;
use crate::collision::*;

/// Number of items a node holds before it is split.
pub const NODE_CAPACITY: usize = 4;

/// Nodes at this depth are never split.
pub const MAX_DEPTH: usize = 8;

struct Node<T> {
    region: AABB,
    items: Vec<(T, AABB)>,
    children: Option<Box<[Node<T>; 4]>>,
}

/// Items are pushed down to a child only if they lie strictly inside it, so
/// that bounds touching a split line stay with the parent.
fn fits(region: &AABB, bounds: &AABB) -> bool {
    let (lower, upper) = (region.lower(), region.upper());
    let (b_lower, b_upper) = (bounds.lower(), bounds.upper());
    lower.x < b_lower.x && lower.y < b_lower.y && upper.x > b_upper.x && upper.y > b_upper.y
}

impl<T: Copy> Node<T> {
    fn new(region: AABB) -> Self {
        Node {
            region,
            items: Vec::new(),
            children: None,
        }
    }

    fn insert(&mut self, item: T, bounds: AABB, depth: usize) {
        if let Some(ref mut children) = self.children {
            for child in children.iter_mut() {
                if fits(&child.region, &bounds) {
                    return child.insert(item, bounds, depth + 1);
                }
            }
            self.items.push((item, bounds));
            return;
        }
        self.items.push((item, bounds));
        if self.items.len() > NODE_CAPACITY && depth < MAX_DEPTH {
            self.split(depth);
        }
    }

    fn split(&mut self, depth: usize) {
        let [a, b, c, d] = self.region.quadrants();
        self.children = Some(Box::new([
            Node::new(a),
            Node::new(b),
            Node::new(c),
            Node::new(d),
        ]));
        for (item, bounds) in std::mem::replace(&mut self.items, Vec::new()) {
            self.insert(item, bounds, depth);
        }
    }

    fn query<F: FnMut(T)>(&self, bounds: &AABB, callback: &mut F) {
        if !self.region.overlaps(bounds) {
            return;
        }
        for &(item, ref item_bounds) in self.items.iter() {
            if item_bounds.overlaps(bounds) {
                callback(item);
            }
        }
        if let Some(ref children) = self.children {
            for child in children.iter() {
                child.query(bounds, callback);
            }
        }
    }

    fn pairs(&self, ancestors: &mut Vec<(T, AABB)>, out: &mut Vec<(T, T)>) {
        for (i, &(item, ref bounds)) in self.items.iter().enumerate() {
            for &(other, ref other_bounds) in ancestors.iter().chain(self.items[..i].iter()) {
                if bounds.overlaps(other_bounds) {
                    out.push((other, item));
                }
            }
        }
        if let Some(ref children) = self.children {
            let depth = ancestors.len();
            ancestors.extend(self.items.iter().cloned());
            for child in children.iter() {
                child.pairs(ancestors, out);
            }
            ancestors.truncate(depth);
        }
    }
}

/// A quadtree over a fixed region of space.
pub struct QuadTree<T> {
    root: Node<T>,
    len: usize,
}

impl<T: Copy> QuadTree<T> {
    /// Construct an empty tree covering `region`.
    pub fn new(region: AABB) -> Self {
        QuadTree {
            root: Node::new(region),
            len: 0,
        }
    }

    /// Construct a tree whose region encloses every item, and insert them.
    pub fn enclosing<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (T, AABB)>,
    {
        let items: Vec<(T, AABB)> = items.into_iter().collect();
        let region = items
            .iter()
            .map(|&(_, bounds)| bounds)
            .fold(None, |acc: Option<AABB>, b| {
                Some(acc.map_or(b, |acc| AABB::combine(&acc, &b)))
            })
            .unwrap_or(AABB::from_corners([-1.0, -1.0].into(), [1.0, 1.0].into()));
        // Pad the region so nothing touches its border.
        let mut tree = QuadTree::new(region + 1.0);
        for (item, bounds) in items {
            tree.insert(item, bounds);
        }
        tree
    }

    #[inline(always)]
    pub fn region(&self) -> AABB {
        self.root.region
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts an item. Returns false, leaving the tree unchanged, if the
    /// bounds do not fit in the tree's region.
    pub fn insert(&mut self, item: T, bounds: AABB) -> bool {
        if !self.root.region.contains(&bounds) {
            return false;
        }
        self.root.insert(item, bounds, 0);
        self.len += 1;
        true
    }

    /// Calls `callback` with every item whose bounds overlap `bounds`.
    pub fn query<F: FnMut(T)>(&self, bounds: &AABB, mut callback: F) {
        self.root.query(bounds, &mut callback);
    }

    /// Every pair of items with overlapping bounds, each pair reported once.
    pub fn candidate_pairs(&self) -> Vec<(T, T)> {
        let mut out = Vec::new();
        self.root.pairs(&mut Vec::new(), &mut out);
        out
    }

    pub fn clear(&mut self) {
        self.root = Node::new(self.root.region);
        self.len = 0;
    }
}
