//! Nearest-hit ray casting over a triangle mesh, accelerated by a bounding
//! volume hierarchy, and the per-vertex interior distance field computed
//! with it (see [`interior::InteriorDistances`]).

use nalgebra::{Vector2, Vector3};

pub mod builder;
pub mod bvh;
pub mod geometry;
pub mod interior;
pub mod mesh;

pub type Pos = Vector3<f32>;
pub type TexCoord = Vector2<f32>;
