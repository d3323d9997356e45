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

use cgmath::{EuclideanSpace, InnerSpace, MetricSpace, Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Squared magnitudes and distances below this value are considered zero.
pub const COLLISION_EPSILON: f32 = 0.000001;

/// Axis components of a direction smaller than this are replaced by it when
/// the direction is scaled onto the boundary of a box.
pub const AXIS_NUDGE: f32 = 0.0001;

/// Rotates a vector counter-clockwise by `angle` radians.
pub fn rotate(v: Vector2<f32>, angle: f32) -> Vector2<f32> {
    if angle == 0.0 {
        return v;
    }
    let (sin, cos) = angle.sin_cos();
    Vector2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// The vector rotated a quarter turn counter-clockwise.
#[inline(always)]
pub fn perp(v: Vector2<f32>) -> Vector2<f32> {
    Vector2::new(-v.y, v.x)
}

/// Normalizes `v`, or returns None if it is too short to have a direction.
pub fn try_normalize(v: Vector2<f32>) -> Option<Vector2<f32>> {
    if v.magnitude2() <= COLLISION_EPSILON * COLLISION_EPSILON {
        None
    } else {
        Some(v.normalize())
    }
}

/// A convex geometry that can be searched with a support function.
///
/// Any type implementing Convex can be handed to the GJK routines in the
/// `simplex` module.
pub trait Convex {
    /// Returns the point of the geometry furthest along `d`. `d` need not be
    /// normalized.
    fn support(&self, d: Vector2<f32>) -> Point2<f32>;

    /// A point guaranteed to lie within the geometry.
    fn center(&self) -> Point2<f32>;
}

/// The geometric payload of a body. Positions and rotations are kept by the
/// owning `RigidBody`; everything stored here is relative to them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// A circle of radius `r`. A radius of zero describes a point mass.
    Circle { r: f32 },
    /// A box described by its half width and half height.
    Rect { half_extents: Vector2<f32> },
    /// A convex polygon with counter-clockwise (or clockwise, but consistent)
    /// vertices relative to the body position. Two vertices form a segment.
    Polygon { local: Vec<Vector2<f32>> },
}

impl Shape {
    /// Computes the world space vertices of the shape for the given pose.
    /// Circles have none.
    pub fn world_vertices(&self, position: Point2<f32>, rotation: f32) -> Vec<Point2<f32>> {
        match self {
            &Shape::Circle { .. } => Vec::new(),
            &Shape::Rect { half_extents: h } => {
                [
                    Vector2::new(-h.x, -h.y),
                    Vector2::new(h.x, -h.y),
                    Vector2::new(h.x, h.y),
                    Vector2::new(-h.x, h.y),
                ]
                    .iter()
                    .map(|&corner| position + rotate(corner, rotation))
                    .collect()
            },
            &Shape::Polygon { ref local } => {
                local
                    .iter()
                    .map(|&v| position + rotate(v, rotation))
                    .collect()
            },
        }
    }
}

/// Returns the vertex of `vertices` furthest along `d`.
pub fn furthest_vertex(vertices: &[Point2<f32>], d: Vector2<f32>) -> Option<Point2<f32>> {
    let mut best: Option<(Point2<f32>, f32)> = None;
    for &v in vertices.iter() {
        let dist = v.to_vec().dot(d);
        match best {
            Some((_, best_dist)) if best_dist >= dist => (),
            _ => best = Some((v, dist)),
        }
    }
    best.map(|(v, _)| v)
}

/// Finds the point on the boundary of a box centered at the origin reached by
/// scaling `d` until it meets the half extent of its dominant axis.
///
/// Direction components with a magnitude below `AXIS_NUDGE` are replaced with
/// `±AXIS_NUDGE`.
pub fn box_edge_point(half_extents: Vector2<f32>, d: Vector2<f32>) -> Vector2<f32> {
    let nudge = |x: f32| if x.abs() < AXIS_NUDGE {
        AXIS_NUDGE.copysign(x)
    } else {
        x
    };
    let d = Vector2::new(nudge(d.x), nudge(d.y));
    let t = (half_extents.x / d.x.abs()).min(half_extents.y / d.y.abs());
    d * t
}

/// Clamps a point expressed in the local frame of a box onto the box.
pub fn box_clamp(half_extents: Vector2<f32>, p: Vector2<f32>) -> Vector2<f32> {
    Vector2::new(
        p.x.max(-half_extents.x).min(half_extents.x),
        p.y.max(-half_extents.y).min(half_extents.y),
    )
}

/// A circle placed in world space.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub c: Point2<f32>,
    pub r: f32,
}

/// A box placed in world space, rotated `rot` radians about its center.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox {
    pub c: Point2<f32>,
    /// Half extents along the box's own axes.
    pub r: Vector2<f32>,
    pub rot: f32,
}

impl OrientedBox {
    /// Expresses a world space point in the frame of the box.
    pub fn to_local(&self, p: Point2<f32>) -> Vector2<f32> {
        rotate(p - self.c, -self.rot)
    }

    pub fn to_world(&self, v: Vector2<f32>) -> Point2<f32> {
        self.c + rotate(v, self.rot)
    }

    /// The box's x and y axes in world space.
    pub fn axes(&self) -> [Vector2<f32>; 2] {
        [
            rotate(Vector2::unit_x(), self.rot),
            rotate(Vector2::unit_y(), self.rot),
        ]
    }

    /// See `box_edge_point`.
    pub fn edge_point(&self, d: Vector2<f32>) -> Point2<f32> {
        self.to_world(box_edge_point(self.r, rotate(d, -self.rot)))
    }

    /// The interval covered by the box when projected onto `axis`.
    pub fn project(&self, axis: Vector2<f32>) -> (f32, f32) {
        let [u, v] = self.axes();
        let center = self.c.to_vec().dot(axis);
        let radius = self.r.x * u.dot(axis).abs() + self.r.y * v.dot(axis).abs();
        (center - radius, center + radius)
    }

    /// Half extents along the world axes, if the box is rotated by a multiple
    /// of a quarter turn.
    pub fn aligned_extents(&self) -> Option<Vector2<f32>> {
        let (sin, cos) = self.rot.sin_cos();
        if sin.abs() < COLLISION_EPSILON {
            Some(self.r)
        } else if cos.abs() < COLLISION_EPSILON {
            Some(Vector2::new(self.r.y, self.r.x))
        } else {
            None
        }
    }
}

/// Segments are lines with finite length.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Point2<f32>,
    pub b: Point2<f32>,
}

impl From<(Point2<f32>, Point2<f32>)> for Segment {
    fn from(p: (Point2<f32>, Point2<f32>)) -> Self {
        Segment { a: p.0, b: p.1 }
    }
}

impl Segment {
    pub fn midpoint(&self) -> Point2<f32> {
        self.a.midpoint(self.b)
    }

    /// Unit normal of the segment, a quarter turn counter-clockwise from
    /// `b - a`. Degenerate segments return the y axis.
    pub fn normal(&self) -> Vector2<f32> {
        try_normalize(perp(self.b - self.a)).unwrap_or(Vector2::new(0.0, 1.0))
    }

    /// The point on the segment closest to `p`.
    pub fn closest_point(&self, p: Point2<f32>) -> Point2<f32> {
        let ab = self.b - self.a;
        let denom = ab.magnitude2();
        if denom < COLLISION_EPSILON {
            return self.a;
        }
        let t = ((p - self.a).dot(ab) / denom).max(0.0).min(1.0);
        self.a + ab * t
    }

    /// Intersection point of two segments, if they cross or touch.
    pub fn intersection(&self, other: &Segment) -> Option<Point2<f32>> {
        let (a, b, c, d) = (self.a, self.b, other.a, other.b);
        let a1 = signed_tri_area(a, b, d);
        let a2 = signed_tri_area(a, b, c);
        if a1 * a2 <= 0.0 {
            let a3 = signed_tri_area(c, d, a);
            let a4 = a3 + a2 - a1;
            if a3 * a4 <= 0.0 {
                let denom = a3 - a4;
                if denom.abs() < COLLISION_EPSILON {
                    // Overlapping collinear segments have an endpoint on each other.
                    return self.collinear_overlap(other);
                }
                return Some(a + (b - a) * (a3 / denom));
            }
        }
        None
    }

    fn collinear_overlap(&self, other: &Segment) -> Option<Point2<f32>> {
        [self.a, self.b, other.a, other.b]
            .iter()
            .cloned()
            .find(|&p| {
                self.closest_point(p).distance2(p) < COLLISION_EPSILON
                    && other.closest_point(p).distance2(p) < COLLISION_EPSILON
            })
    }
}

/// Twice the signed area of the triangle `abc`; positive when counter-clockwise.
pub fn signed_tri_area(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> f32 {
    (a.x - c.x) * (b.y - c.y) - (a.y - c.y) * (b.x - c.x)
}
