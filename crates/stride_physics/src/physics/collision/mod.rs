//! Collision geometry and narrow-phase tests
//!
//! Shapes store their geometry in model space and transform to world
//! space on-demand during tests; only conservative axis-aligned bounds
//! are cached between queries.
//!
//! # Module Organization
//!
//! - [`primitives`] - Basic geometric primitives (rays, bounds, triangles)
//! - [`shape`] - The closed collider variant set with per-shape raycasts
//! - [`mesh`] - Triangle caches built from interleaved mesh buffers
//! - [`heightfield`] - Terrain-backed heightfield shapes
//! - [`contact`] - Static overlap tests with penetration contacts

pub mod primitives;
pub mod shape;
pub mod mesh;
pub mod heightfield;
pub mod contact;

// Re-export commonly used types
pub use primitives::{Aabb, Obb, Ray, Triangle};
pub use shape::{CapsuleAxis, ColliderShape, ShapeKind};
pub use mesh::{MeshData, MeshError, TriangleCache};
pub use heightfield::{HeightSource, HeightfieldShape};
pub use contact::Contact;
