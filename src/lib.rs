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

//! A low-level 2D collision and impulse resolution library intended for use
//! in 2D video game development.
//!
//! # Collision detection overview
//!
//! Bodies are circles, boxes, line segments or convex polygons, all described
//! by `RigidBody`. Collision detection comes in a few forms:
//!
//! - `Overlaps`: whether or not two objects overlap. Defined for bounding
//!   boxes and for rigid bodies.
//! - `Contains`: whether one bounding box completely contains another object.
//! - `collide`: a `CollisionPoint` with the normal from the first body toward
//!   the second, the signed distance between them, and whether they collide.
//!   Pairs of shapes with a closed form solution are resolved analytically;
//!   everything else falls back to GJK.
//!
//! # Physics overview
//!
//! A `System` owns `Particle`s, which pair a body with a velocity, an
//! accumulated force and a restitution coefficient. Interactions declared
//! between particles are expanded into impulses and force transfers by
//! `System::expand_interactions`. Finding which particles should interact is
//! left to the caller; `QuadTree` provides candidate pairs.

pub extern crate cgmath;

mod bounds;
pub use crate::bounds::*;

mod collision;
pub use crate::collision::*;

mod error;
pub use crate::error::*;

mod geom;
pub use crate::geom::*;

mod physics;
pub use crate::physics::*;

mod pool;
pub use crate::pool::*;

mod quadtree;
pub use crate::quadtree::*;

mod simplex;
pub use crate::simplex::*;

mod solver;
pub use crate::solver::*;

mod system;
pub use crate::system::*;
