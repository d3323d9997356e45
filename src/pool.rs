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

use std::mem;

#[derive(Clone, Debug)]
enum Slot<T> {
    Free { next_free: Option<usize> },
    Occupied(T),
}

/// Growable array whose entries keep their index when other entries are
/// removed. Freed indices are reused by later pushes.
#[derive(Clone, Debug)]
pub struct Pool<T> {
    len: usize,
    free_list: Option<usize>,
    slots: Vec<Slot<T>>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Pool::new()
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Pool {
            len: 0,
            free_list: None,
            slots: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Push a new item, reusing the most recently freed index if there is
    /// one.
    pub fn push(&mut self, item: T) -> usize {
        self.len += 1;
        match self.free_list {
            Some(i) => {
                self.free_list = match self.slots[i] {
                    Slot::Free { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list points at occupied slot {}", i),
                };
                self.slots[i] = Slot::Occupied(item);
                i
            }
            None => {
                self.slots.push(Slot::Occupied(item));
                self.slots.len() - 1
            }
        }
    }

    /// Removes the item at `i`, returning None if the slot is not occupied.
    pub fn remove(&mut self, i: usize) -> Option<T> {
        if !self.contains(i) {
            return None;
        }
        let freed = Slot::Free { next_free: self.free_list };
        self.free_list = Some(i);
        self.len -= 1;
        match mem::replace(&mut self.slots[i], freed) {
            Slot::Occupied(item) => Some(item),
            Slot::Free { .. } => None,
        }
    }

    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        match self.slots.get(i) {
            Some(Slot::Occupied(_)) => true,
            _ => false,
        }
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        match self.slots.get(i) {
            Some(Slot::Occupied(item)) => Some(item),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        match self.slots.get_mut(i) {
            Some(Slot::Occupied(item)) => Some(item),
            _ => None,
        }
    }

    /// Iterates over occupied entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied(item) => Some((i, item)),
            Slot::Free { .. } => None,
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied(item) => Some((i, item)),
            Slot::Free { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    mod pool {
        use crate::pool::*;

        fn values(pool: &Pool<usize>) -> Vec<usize> {
            pool.iter().map(|(_, &v)| v).collect()
        }

        #[test]
        fn test_stable_indices() {
            let mut pool: Pool<usize> = Pool::new();
            let ids: Vec<usize> = (0..4).map(|i| pool.push(i * 10)).collect();
            assert_eq!(ids, vec![0, 1, 2, 3]);

            assert_eq!(pool.remove(1), Some(10));
            assert_eq!(pool.remove(2), Some(20));
            assert_eq!(pool.len(), 2);
            assert_eq!(pool.get(0), Some(&0));
            assert_eq!(pool.get(3), Some(&30));
            assert_eq!(values(&pool), vec![0, 30]);
        }

        #[test]
        fn test_reuse_freed() {
            let mut pool: Pool<usize> = Pool::new();
            for i in 0..8 {
                pool.push(i);
            }
            for i in 0..4 {
                pool.remove(i * 2);
            }
            assert_eq!(values(&pool), vec![1, 3, 5, 7]);
            // Most recently freed slot first.
            assert_eq!(pool.push(100), 6);
            assert_eq!(pool.push(101), 4);
            assert_eq!(values(&pool), vec![1, 3, 101, 5, 100, 7]);
            assert_eq!(pool.push(102), 2);
            assert_eq!(pool.push(103), 0);
            assert_eq!(pool.push(104), 8);
            assert_eq!(pool.len(), 9);
        }

        #[test]
        fn test_missing() {
            let mut pool: Pool<usize> = Pool::new();
            let id = pool.push(5);
            assert!(pool.contains(id));
            assert_eq!(pool.remove(id), Some(5));
            assert!(!pool.contains(id));
            assert_eq!(pool.remove(id), None);
            assert_eq!(pool.remove(40), None);
            assert_eq!(pool.get(id), None);
            assert!(pool.get_mut(40).is_none());
            assert!(pool.is_empty());
        }

        #[test]
        fn test_iter_mut() {
            let mut pool: Pool<usize> = (0..6).fold(Pool::new(), |mut p, i| {
                p.push(i);
                p
            });
            pool.remove(2);
            for (i, v) in pool.iter_mut() {
                *v += i * 100;
            }
            assert_eq!(values(&pool), vec![0, 101, 303, 404, 505]);
        }
    }
}
