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

//! The Gilbert-Johnson-Keerthi overlap test.
//!
//! GJK searches the Minkowski difference of two convex geometries for the
//! point closest to the origin. The geometries overlap exactly when the
//! difference contains the origin.

use std::fmt;

use cgmath::{EuclideanSpace, InnerSpace, Point2, Vector2, Zero};

use crate::geom::*;

/// Upper bound on the number of support points evaluated by one GJK query.
pub const GJK_MAX_ITERATIONS: usize = 32;

/// A search stops once a new support point improves the squared distance by
/// less than this fraction.
const GJK_TOLERANCE: f32 = 0.0001;

/// The Minkowski difference `a - b` of two convex geometries.
pub struct MinkowskiDiff<'a, A: Convex + ?Sized, B: Convex + ?Sized> {
    pub a: &'a A,
    pub b: &'a B,
}

impl<'a, A: Convex + ?Sized, B: Convex + ?Sized> Convex for MinkowskiDiff<'a, A, B> {
    fn support(&self, d: Vector2<f32>) -> Point2<f32> {
        Point2::from_vec(self.a.support(d) - self.b.support(-d))
    }

    fn center(&self) -> Point2<f32> {
        Point2::from_vec(self.a.center() - self.b.center())
    }
}

/// A point, segment or triangle of support points.
pub struct Simplex {
    points: [Point2<f32>; 3],
    state: &'static dyn SimplexState,
}

impl fmt::Debug for Simplex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = match self.state.len() {
            1 => "Vertex",
            2 => "Edge",
            _ => "Triangle",
        };
        write!(f, "Simplex {{ state: {}, points: {:?} }}", state, self.points())
    }
}

impl From<Point2<f32>> for Simplex {
    fn from(p: Point2<f32>) -> Self {
        Simplex {
            points: [p, Point2::origin(), Point2::origin()],
            state: &VERTEX,
        }
    }
}

impl From<(Point2<f32>, Point2<f32>)> for Simplex {
    fn from(p: (Point2<f32>, Point2<f32>)) -> Self {
        Simplex {
            points: [p.0, p.1, Point2::origin()],
            state: &EDGE,
        }
    }
}

impl From<(Point2<f32>, Point2<f32>, Point2<f32>)> for Simplex {
    fn from(p: (Point2<f32>, Point2<f32>, Point2<f32>)) -> Self {
        Simplex {
            points: [p.0, p.1, p.2],
            state: &TRIANGLE,
        }
    }
}

impl Simplex {
    /// The support points currently held.
    pub fn points(&self) -> &[Point2<f32>] {
        &self.points[..self.state.len()]
    }

    /// Reduces the simplex to its feature closest to the origin and returns
    /// the closest point on it as a vector.
    pub fn reduce(&mut self) -> Vector2<f32> {
        let (closest, next) = self.state.min_norm(&mut self.points);
        self.state = next;
        closest
    }

    /// Finds the closest point on the shape to the origin. The zero vector is
    /// returned once the simplex encloses the origin.
    pub fn closest_point_to_origin<S: Convex + ?Sized>(&mut self, shape: &S) -> Vector2<f32> {
        let mut closest = self.reduce();
        for _ in 0..GJK_MAX_ITERATIONS {
            let dist2 = closest.magnitude2();
            if dist2 < COLLISION_EPSILON {
                return Vector2::zero();
            }
            let support = shape.support(-closest);
            if dist2 - closest.dot(support.to_vec()) <= GJK_TOLERANCE * dist2 {
                return closest;
            }
            self.state = self.state.add_point(&mut self.points, support);
            closest = self.reduce();
        }
        closest
    }
}

trait SimplexState {
    fn len(&self) -> usize;

    /// Reduces the simplex to the feature closest to the origin, returning the
    /// closest point and the state describing what remains.
    fn min_norm(&self, simp: &mut [Point2<f32>; 3]) -> (Vector2<f32>, &'static dyn SimplexState);

    /// Appends a point, returning the grown state.
    fn add_point(&self, simp: &mut [Point2<f32>; 3], p: Point2<f32>) -> &'static dyn SimplexState;
}

struct VertexSimplex {}
struct EdgeSimplex {}
struct TriangleSimplex {}

static VERTEX: VertexSimplex = VertexSimplex {};
static EDGE: EdgeSimplex = EdgeSimplex {};
static TRIANGLE: TriangleSimplex = TriangleSimplex {};

impl SimplexState for VertexSimplex {
    fn len(&self) -> usize {
        1
    }

    fn min_norm(&self, simp: &mut [Point2<f32>; 3]) -> (Vector2<f32>, &'static dyn SimplexState) {
        (simp[0].to_vec(), &VERTEX)
    }

    fn add_point(&self, simp: &mut [Point2<f32>; 3], p: Point2<f32>) -> &'static dyn SimplexState {
        simp[1] = p;
        &EDGE
    }
}

impl SimplexState for EdgeSimplex {
    fn len(&self) -> usize {
        2
    }

    fn min_norm(&self, simp: &mut [Point2<f32>; 3]) -> (Vector2<f32>, &'static dyn SimplexState) {
        let a = simp[0].to_vec();
        let ab = simp[1] - simp[0];
        let t = ab.dot(-a);
        if t <= 0.0 {
            return (a, &VERTEX);
        }
        let denom = ab.magnitude2();
        if t >= denom {
            simp[0] = simp[1];
            return (simp[0].to_vec(), &VERTEX);
        }
        (a + ab * (t / denom), &EDGE)
    }

    fn add_point(&self, simp: &mut [Point2<f32>; 3], p: Point2<f32>) -> &'static dyn SimplexState {
        simp[2] = p;
        &TRIANGLE
    }
}

impl SimplexState for TriangleSimplex {
    fn len(&self) -> usize {
        3
    }

    fn min_norm(&self, simp: &mut [Point2<f32>; 3]) -> (Vector2<f32>, &'static dyn SimplexState) {
        let (a, b, c) = (simp[0].to_vec(), simp[1].to_vec(), simp[2].to_vec());
        let ab = b - a;
        let ac = c - a;
        let d1 = ab.dot(-a);
        let d2 = ac.dot(-a);

        // Vertex region A
        if d1 <= 0.0 && d2 <= 0.0 {
            return (a, &VERTEX);
        }

        // Vertex region B
        let d3 = ab.dot(-b);
        let d4 = ac.dot(-b);
        if d3 >= 0.0 && d4 <= d3 {
            simp[0] = simp[1];
            return (b, &VERTEX);
        }

        // Edge region AB
        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return (a + ab * v, &EDGE);
        }

        // Vertex region C
        let d5 = ab.dot(-c);
        let d6 = ac.dot(-c);
        if d6 >= 0.0 && d5 <= d6 {
            simp[0] = simp[2];
            return (c, &VERTEX);
        }

        // Edge region AC
        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            simp[1] = simp[2];
            return (a + ac * w, &EDGE);
        }

        // Edge region BC
        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            simp[0] = simp[2];
            return (b + (c - b) * w, &EDGE);
        }

        // The origin lies within the triangle.
        (Vector2::zero(), &TRIANGLE)
    }

    fn add_point(&self, simp: &mut [Point2<f32>; 3], p: Point2<f32>) -> &'static dyn SimplexState {
        simp[2] = p;
        &TRIANGLE
    }
}

fn closest_difference<A, B>(a: &A, b: &B) -> Vector2<f32>
where
    A: Convex + ?Sized,
    B: Convex + ?Sized,
{
    let diff = MinkowskiDiff { a, b };
    // Search from b's center toward a's.
    let d = try_normalize(-diff.center().to_vec()).unwrap_or(Vector2::unit_x());
    Simplex::from(diff.support(d)).closest_point_to_origin(&diff)
}

/// Returns true if the two geometries overlap. Geometries that merely touch
/// are considered overlapping.
pub fn gjk<A, B>(a: &A, b: &B) -> bool
where
    A: Convex + ?Sized,
    B: Convex + ?Sized,
{
    closest_difference(a, b).magnitude2() < COLLISION_EPSILON
}

/// Returns the distance between two geometries, or zero if they overlap.
pub fn gjk_distance<A, B>(a: &A, b: &B) -> f32
where
    A: Convex + ?Sized,
    B: Convex + ?Sized,
{
    closest_difference(a, b).magnitude()
}
