//! Collision layer system for filtering collision detection
//!
//! Queries and pair detection filter shapes through a layer bit and a
//! mask of layers the caller cares about.

/// Collision layer definitions for efficient filtering
pub struct CollisionLayers;

impl CollisionLayers {
    /// No collision layer
    pub const NONE: u32 = 0;

    /// All collision layers
    pub const ALL: u32 = 0xFFFF_FFFF;

    /// Default layer for uncategorized shapes
    pub const DEFAULT: u32 = 1 << 0;

    /// Static environment geometry
    pub const ENVIRONMENT: u32 = 1 << 1;

    /// Character agents
    pub const CHARACTER: u32 = 1 << 2;

    /// Trigger volumes (no physical response)
    pub const TRIGGER: u32 = 1 << 3;

    /// Debris and small dynamic objects
    pub const DEBRIS: u32 = 1 << 4;

    /// Terrain heightfields
    pub const TERRAIN: u32 = 1 << 5;

    /// First bit of the user-defined custom band (bits 8-31)
    pub const CUSTOM_BASE: u32 = 1 << 8;

    /// Check if two shapes should collide based on their layers and masks
    ///
    /// A's layer must be in B's mask and B's layer must be in A's mask.
    pub fn should_collide(layer_a: u32, mask_a: u32, layer_b: u32, mask_b: u32) -> bool {
        (layer_a & mask_b) != 0 && (layer_b & mask_a) != 0
    }

    /// Helper to create a mask from multiple layers
    pub fn mask(layers: &[u32]) -> u32 {
        layers.iter().fold(0, |acc, &layer| acc | layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_collide_mutual() {
        let a_layer = CollisionLayers::CHARACTER;
        let a_mask = CollisionLayers::ENVIRONMENT;
        let b_layer = CollisionLayers::ENVIRONMENT;
        let b_mask = CollisionLayers::CHARACTER;
        assert!(CollisionLayers::should_collide(a_layer, a_mask, b_layer, b_mask));
    }

    #[test]
    fn test_should_not_collide_one_way() {
        let a_layer = CollisionLayers::CHARACTER;
        let a_mask = CollisionLayers::ENVIRONMENT;
        let b_layer = CollisionLayers::ENVIRONMENT;
        let b_mask = CollisionLayers::DEBRIS; // Not character
        assert!(!CollisionLayers::should_collide(a_layer, a_mask, b_layer, b_mask));
    }

    #[test]
    fn test_mask_creation() {
        let mask = CollisionLayers::mask(&[
            CollisionLayers::CHARACTER,
            CollisionLayers::ENVIRONMENT,
        ]);
        assert_eq!(mask, CollisionLayers::CHARACTER | CollisionLayers::ENVIRONMENT);
    }
}
