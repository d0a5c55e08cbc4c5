//! Character movement resolution
//!
//! A per-agent resolver layered on top of the collision world's query
//! façade: ground detection, slope and step handling, sliding collision
//! response, depenetration, and jump/gravity integration.

pub mod config;
pub mod controller;

pub use config::CharacterConfig;
pub use controller::CharacterController;
