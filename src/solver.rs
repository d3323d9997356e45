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

use smallvec::SmallVec;

use crate::geom::COLLISION_EPSILON;

/// A small dense linear system `A x = b` whose solution is constrained to be
/// non-negative.
///
/// Rows correspond to contacts sharing a body, so systems are usually tiny
/// and live on the stack.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedSystem {
    n: usize,
    a: SmallVec<[f32; 16]>,
    b: SmallVec<[f32; 4]>,
}

impl ProjectedSystem {
    /// Construct an n by n system of zeros.
    pub fn new(n: usize) -> Self {
        let mut a = SmallVec::with_capacity(n * n);
        a.resize(n * n, 0.0);
        let mut b = SmallVec::with_capacity(n);
        b.resize(n, 0.0);
        ProjectedSystem { n, a, b }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline(always)]
    pub fn coeff(&self, row: usize, col: usize) -> f32 {
        self.a[row * self.n + col]
    }

    #[inline(always)]
    pub fn set_coeff(&mut self, row: usize, col: usize, v: f32) {
        self.a[row * self.n + col] = v;
    }

    #[inline(always)]
    pub fn set_rhs(&mut self, row: usize, v: f32) {
        self.b[row] = v;
    }

    /// Solves the system by projected Gauss-Seidel.
    ///
    /// Each sweep updates one unknown at a time against the latest values of
    /// the others, clamping the accumulated value at zero. Rows with a zero
    /// diagonal are left at zero. Sweeping stops once no unknown moves by more
    /// than `tolerance` relative to the largest unknown, or after `iterations`
    /// sweeps.
    pub fn solve(&self, iterations: usize, tolerance: f32) -> SmallVec<[f32; 4]> {
        let mut x: SmallVec<[f32; 4]> = SmallVec::with_capacity(self.n);
        x.resize(self.n, 0.0);
        for _ in 0..iterations {
            let mut max_delta = 0.0f32;
            for i in 0..self.n {
                let diag = self.coeff(i, i);
                if diag <= COLLISION_EPSILON {
                    continue;
                }
                let residual = (0..self.n).fold(self.b[i], |r, k| r - self.coeff(i, k) * x[k]);
                let prev = x[i];
                x[i] = (prev + residual / diag).max(0.0);
                max_delta = max_delta.max((x[i] - prev).abs());
            }
            let scale = x.iter().fold(1.0f32, |m, v| m.max(v.abs()));
            if max_delta <= tolerance * scale {
                break;
            }
        }
        x
    }
}
