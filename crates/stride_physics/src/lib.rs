//! # Stride Physics
//!
//! Entity-attached collision detection and character movement resolution
//! for interactive 3D applications.
//!
//! ## Features
//!
//! - **Shape Model**: boxes, spheres, capsules, triangle meshes, and
//!   terrain heightfields attached to scene entities
//! - **Broadphase Registry**: cached conservative world bounds with
//!   stable index+generation shape handles
//! - **Query Façade**: ray casts, capsule sweeps, and static overlap
//!   queries with layer and trigger filtering
//! - **Character Resolver**: capsule agents with ground snapping, step
//!   and slope handling, sliding collision response, and depenetration
//!
//! ## Quick Start
//!
//! ```rust
//! use stride_physics::prelude::*;
//!
//! let mut world = CollisionWorld::new();
//! let floor = world.register_collider(
//!     EntityId::new(0, 0),
//!     ColliderShape::Box { half_extents: Vec3::new(50.0, 0.5, 50.0) },
//!     Vec3::zeros(),
//!     CollisionLayers::ENVIRONMENT,
//!     false,
//!     Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
//! );
//!
//! let mut agent = CharacterController::new(
//!     EntityId::new(1, 0),
//!     CharacterConfig::default(),
//! );
//! let mut transform = Transform::from_position(Vec3::new(0.0, 0.9, 0.0));
//! agent.movement(&world, &mut transform, Vec3::new(1.0, 0.0, 0.0), 1.0 / 60.0);
//! # assert!(world.has_collider(floor));
//! ```

// Core modules
pub mod foundation;
pub mod config;
pub mod scene;
pub mod physics;

pub use config::{Config, ConfigError};
pub use scene::{EntityId, TransformSource};

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        foundation::math::{Quat, Transform, Vec3},
        physics::{
            CapsuleAxis, CharacterConfig, CharacterController, ColliderShape,
            CollisionEvents, CollisionLayers, CollisionPair, CollisionWorld, Contact,
            HeightSource, HeightfieldShape, MeshData, MeshError, Ray, RaycastHit,
            ShapeHandle, ShapeKind, SweepHit, TriangleCache, TriggerPolicy,
        },
        scene::{EntityId, TransformSource},
    };
}
