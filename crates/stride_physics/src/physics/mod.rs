//! Physics module: collision detection and character movement
//!
//! Split into the classic two phases: a broadphase that shortlists
//! candidates through cached conservative bounds, and narrow-phase
//! shape tests that produce exact hits and contacts. The character
//! resolver sits on top and consumes only the query façade.

pub mod collision;
pub mod collision_layers;
pub mod collision_world;
pub mod events;
pub mod character;

pub use collision::{
    Aabb,
    CapsuleAxis,
    ColliderShape,
    Contact,
    HeightSource,
    HeightfieldShape,
    MeshData,
    MeshError,
    Obb,
    Ray,
    ShapeKind,
    Triangle,
    TriangleCache,
};
pub use collision_layers::CollisionLayers;
pub use collision_world::{
    CollisionWorld, RaycastHit, ShapeHandle, SweepHit, TriggerPolicy,
};
pub use events::{CollisionEvents, CollisionPair, PairEvent};
pub use character::{CharacterConfig, CharacterController};
