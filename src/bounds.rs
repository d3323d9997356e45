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

use std::ops::{Add, Sub};

use cgmath::{EuclideanSpace, Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::collision::*;
use crate::geom::*;
use crate::physics::*;

/// A type that can overlap, contain, and be combined with one another.
pub trait Bound
    : Copy
    + Add<Vector2<f32>, Output = Self>
    + Sub<Vector2<f32>, Output = Self>
    + Add<f32, Output = Self>           // Scalar extend
    + Overlaps<Self>
    + Contains<Self>
{
    /// Produce a bound that encloses the two arguments.
    fn combine(a: &Self, b: &Self) -> Self;
}

/// A type that can be decomposed into a bound.
pub trait BoundedBy<B: Bound> {
    fn bounds(&self) -> B;
}

/// All geometries that satisfy Bound are bounded by themselves.
impl<B: Bound> BoundedBy<B> for B {
    #[inline(always)]
    fn bounds(&self) -> B {
        *self
    }
}

/// An axis aligned bounding box, described by its center and half extents.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    pub c: Point2<f32>,
    pub r: Vector2<f32>,
}

impl AABB {
    /// Construct an AABB from its lower and upper corners.
    pub fn from_corners(lower: Point2<f32>, upper: Point2<f32>) -> Self {
        AABB {
            c: lower.midpoint(upper),
            r: (upper - lower) * 0.5,
        }
    }

    pub fn area(&self) -> f32 {
        4.0 * self.r.x * self.r.y
    }

    #[inline(always)]
    pub fn lower(&self) -> Point2<f32> {
        self.c - self.r
    }

    #[inline(always)]
    pub fn upper(&self) -> Point2<f32> {
        self.c + self.r
    }

    /// The box itself, if it is axis aligned (up to quarter turns).
    pub fn aligned(b: &OrientedBox) -> Option<AABB> {
        b.aligned_extents().map(|r| AABB { c: b.c, r })
    }

    /// Splits the box into four equal quadrants, ordered counter-clockwise
    /// from the upper right.
    pub fn quadrants(&self) -> [AABB; 4] {
        let r = self.r * 0.5;
        [
            AABB { c: self.c + Vector2::new(r.x, r.y), r },
            AABB { c: self.c + Vector2::new(-r.x, r.y), r },
            AABB { c: self.c + Vector2::new(-r.x, -r.y), r },
            AABB { c: self.c + Vector2::new(r.x, -r.y), r },
        ]
    }
}

impl Add<Vector2<f32>> for AABB {
    type Output = Self;

    fn add(self, v: Vector2<f32>) -> Self {
        AABB { c: self.c + v, ..self }
    }
}

impl Sub<Vector2<f32>> for AABB {
    type Output = Self;

    fn sub(self, v: Vector2<f32>) -> Self {
        AABB { c: self.c - v, ..self }
    }
}

impl Add<f32> for AABB {
    type Output = Self;

    /// Extend AABB
    fn add(self, s: f32) -> Self {
        AABB { r: self.r + Vector2::new(s, s), ..self }
    }
}

impl Overlaps<AABB> for AABB {
    fn overlaps(&self, rhs: &AABB) -> bool {
        (self.c.x - rhs.c.x).abs() <= self.r.x + rhs.r.x
            && (self.c.y - rhs.c.y).abs() <= self.r.y + rhs.r.y
    }
}

impl Contains<AABB> for AABB {
    fn contains(&self, rhs: &AABB) -> bool {
        let (lower, upper) = (self.lower(), self.upper());
        let (rhs_lower, rhs_upper) = (rhs.lower(), rhs.upper());
        lower.x <= rhs_lower.x
            && lower.y <= rhs_lower.y
            && upper.x >= rhs_upper.x
            && upper.y >= rhs_upper.y
    }
}

impl Contains<Point2<f32>> for AABB {
    fn contains(&self, p: &Point2<f32>) -> bool {
        (p.x - self.c.x).abs() <= self.r.x && (p.y - self.c.y).abs() <= self.r.y
    }
}

impl Bound for AABB {
    fn combine(a: &AABB, b: &AABB) -> AABB {
        let (a_lower, a_upper) = (a.lower(), a.upper());
        let (b_lower, b_upper) = (b.lower(), b.upper());
        AABB::from_corners(
            Point2::new(a_lower.x.min(b_lower.x), a_lower.y.min(b_lower.y)),
            Point2::new(a_upper.x.max(b_upper.x), a_upper.y.max(b_upper.y)),
        )
    }
}

impl BoundedBy<AABB> for Circle {
    fn bounds(&self) -> AABB {
        AABB {
            c: self.c,
            r: Vector2::new(self.r, self.r),
        }
    }
}

impl BoundedBy<AABB> for OrientedBox {
    fn bounds(&self) -> AABB {
        let (lo_x, hi_x) = self.project(Vector2::unit_x());
        let (lo_y, hi_y) = self.project(Vector2::unit_y());
        AABB::from_corners(Point2::new(lo_x, lo_y), Point2::new(hi_x, hi_y))
    }
}

impl BoundedBy<AABB> for Segment {
    fn bounds(&self) -> AABB {
        AABB::from_corners(
            Point2::new(self.a.x.min(self.b.x), self.a.y.min(self.b.y)),
            Point2::new(self.a.x.max(self.b.x), self.a.y.max(self.b.y)),
        )
    }
}

impl BoundedBy<AABB> for RigidBody {
    fn bounds(&self) -> AABB {
        if let Some(circle) = self.as_circle() {
            return circle.bounds();
        }
        let verts = self.vertices();
        let first = verts.first().cloned().unwrap_or(self.position());
        let (lower, upper) = verts.iter().fold((first, first), |(lo, hi), v| {
            (
                Point2::new(lo.x.min(v.x), lo.y.min(v.y)),
                Point2::new(hi.x.max(v.x), hi.y.max(v.y)),
            )
        });
        AABB::from_corners(lower, upper)
    }
}

#[cfg(test)]
mod tests {
    mod aabb {
        use approx::assert_relative_eq;
        use cgmath::{Point2, Vector2};
        use std::f32::consts::PI;

        use crate::bounds::*;

        fn aabb(x: f32, y: f32, rx: f32, ry: f32) -> AABB {
            AABB { c: Point2::new(x, y), r: Vector2::new(rx, ry) }
        }

        #[test]
        fn test_overlaps() {
            assert!(aabb(0.0, 0.0, 1.0, 1.0).overlaps(&aabb(1.5, 1.5, 1.0, 1.0)));
            assert!(!aabb(0.0, 0.0, 1.0, 1.0).overlaps(&aabb(2.5, 0.0, 1.0, 1.0)));
            assert!(!aabb(0.0, 0.0, 1.0, 1.0).overlaps(&aabb(0.0, -2.5, 1.0, 1.0)));
        }

        #[test]
        fn test_contains() {
            let big = aabb(0.0, 0.0, 64.0, 64.0);
            assert!(big.contains(&aabb(0.0, 0.0, 5.0, 5.0)));
            assert!(!big.contains(&aabb(62.0, 0.0, 5.0, 5.0)));
            assert!(big.contains(&Point2::new(-64.0, 10.0)));
            assert!(!big.contains(&Point2::new(-64.5, 10.0)));
        }

        #[test]
        fn test_combine() {
            let a = aabb(0.0, 0.0, 1.0, 1.0);
            let b = aabb(3.0, 1.0, 1.0, 2.0);
            let c = AABB::combine(&a, &b);
            assert_eq!(c.lower(), Point2::new(-1.0, -1.0));
            assert_eq!(c.upper(), Point2::new(4.0, 3.0));
            assert!(c.contains(&a) && c.contains(&b));
            assert_eq!(c.area(), 20.0);
        }

        #[test]
        fn test_offsets() {
            let a = aabb(0.0, 0.0, 1.0, 1.0);
            assert_eq!((a + Vector2::new(2.0, 0.0)).c, Point2::new(2.0, 0.0));
            assert_eq!((a - Vector2::new(2.0, 0.0)).c, Point2::new(-2.0, 0.0));
            assert_eq!((a + 0.5).r, Vector2::new(1.5, 1.5));
            assert_eq!(a.bounds(), a);
        }

        #[test]
        fn test_quadrants() {
            let q = aabb(0.0, 0.0, 2.0, 2.0).quadrants();
            assert_eq!(q[0], aabb(1.0, 1.0, 1.0, 1.0));
            assert_eq!(q[2], aabb(-1.0, -1.0, 1.0, 1.0));
        }

        #[test]
        fn test_body_bounds() {
            let c = RigidBody::circle(1.0, Point2::new(1.0, 2.0), 0.0, 0.5);
            assert_eq!(c.bounds(), aabb(1.0, 2.0, 0.5, 0.5));

            let floor = RigidBody::line(STATIC_MASS, Point2::new(10.0, 0.0), Point2::new(-10.0, 0.0));
            assert_eq!(floor.bounds(), aabb(0.0, 0.0, 10.0, 0.0));

            let diamond = RigidBody::rect(1.0, Point2::new(0.0, 0.0), PI / 4.0, Vector2::new(1.0, 1.0));
            let b = diamond.bounds();
            assert_relative_eq!(b.r, Vector2::new(2.0f32.sqrt(), 2.0f32.sqrt()), epsilon = 1e-5);
            let oriented = diamond.as_box().unwrap().bounds();
            assert_relative_eq!(oriented.r, b.r, epsilon = 1e-5);
        }

        #[test]
        fn test_aligned() {
            let b = OrientedBox { c: Point2::new(0.0, 0.0), r: Vector2::new(2.0, 1.0), rot: 0.0 };
            assert_eq!(AABB::aligned(&b), Some(aabb(0.0, 0.0, 2.0, 1.0)));
            assert_eq!(AABB::aligned(&OrientedBox { rot: 0.3, ..b }), None);
        }
    }
}
