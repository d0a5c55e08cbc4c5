//! Heightfield collision shape
//!
//! The terrain itself lives in an external collaborator; this shape only
//! holds a sampling handle and a conservative bounding region. Raycasts
//! march the ray in fixed steps against the height callback and refine
//! the crossing with a short binary search.

use std::fmt;
use std::sync::Arc;

use crate::foundation::math::Vec3;
use super::primitives::{Aabb, Ray};

/// Number of binary-search refinement rounds after a crossing is found
const REFINE_ROUNDS: u32 = 8;

/// Hard cap on march steps per raycast
const MAX_MARCH_STEPS: u32 = 256;

/// Minimum sampling distance for normal estimation
const NORMAL_SAMPLE_FLOOR: f32 = 0.05;

/// Height-sampling interface into the terrain collaborator
pub trait HeightSource {
    /// Sample the terrain height at a world-space XZ position
    fn sample_height(&self, world_x: f32, world_z: f32) -> f32;

    /// Spacing between the terrain's underlying samples
    ///
    /// Drives the march step and the central-difference width for normal
    /// estimation.
    fn sample_spacing(&self) -> f32;
}

/// A heightfield collision shape referencing a terrain height source
#[derive(Clone)]
pub struct HeightfieldShape {
    source: Arc<dyn HeightSource>,
    half_extents: Vec3,
}

impl HeightfieldShape {
    /// Create a heightfield shape over a terrain source
    ///
    /// `half_extents` declare the conservative region (around the owning
    /// entity's origin) that broadphase bounds are derived from.
    pub fn new(source: Arc<dyn HeightSource>, half_extents: Vec3) -> Self {
        Self { source, half_extents }
    }

    /// Conservative local-space bounds of the covered region
    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_center_extents(Vec3::zeros(), self.half_extents)
    }

    /// Declared half-extents of the covered region
    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    /// Sample the terrain height under a world-space point
    pub fn height_at(&self, world_x: f32, world_z: f32) -> f32 {
        self.source.sample_height(world_x, world_z)
    }

    /// Estimate the surface normal at a world-space XZ position
    ///
    /// Central-difference over the height samples; the sampling distance
    /// never drops below a small floor to keep the estimate out of
    /// numerical noise.
    pub fn normal_at(&self, world_x: f32, world_z: f32) -> Vec3 {
        let d = self.source.sample_spacing().max(NORMAL_SAMPLE_FLOOR);
        let height_nx = self.source.sample_height(world_x - d, world_z);
        let height_px = self.source.sample_height(world_x + d, world_z);
        let height_nz = self.source.sample_height(world_x, world_z - d);
        let height_pz = self.source.sample_height(world_x, world_z + d);
        Vec3::new(height_nx - height_px, 2.0 * d, height_nz - height_pz).normalize()
    }

    /// Ray-march this heightfield
    ///
    /// Steps along the ray at the terrain's sample spacing until the ray
    /// point drops to or below the sampled height, then runs a fixed
    /// number of binary-search rounds to pin the crossing. Returns
    /// `(distance, point, normal)` or `None` within `max_distance`.
    /// A ray that already starts below the surface reports a hit at
    /// distance zero.
    pub fn intersect_ray(&self, ray: &Ray, max_distance: f32) -> Option<(f32, Vec3, Vec3)> {
        let below = |t: f32| -> bool {
            let p = ray.point_at(t);
            p.y <= self.source.sample_height(p.x, p.z)
        };

        if below(0.0) {
            let p = ray.origin;
            return Some((0.0, p, self.normal_at(p.x, p.z)));
        }

        let step = (self.source.sample_spacing())
            .max(max_distance / MAX_MARCH_STEPS as f32)
            .max(f32::EPSILON);

        let mut t_prev = 0.0f32;
        let mut t = step;
        let mut crossing = None;
        while t_prev < max_distance {
            let t_clamped = t.min(max_distance);
            if below(t_clamped) {
                crossing = Some((t_prev, t_clamped));
                break;
            }
            t_prev = t_clamped;
            t += step;
        }

        let (mut lo, mut hi) = crossing?;
        for _ in 0..REFINE_ROUNDS {
            let mid = (lo + hi) * 0.5;
            if below(mid) {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let distance = hi;
        let point = ray.point_at(distance);
        Some((distance, point, self.normal_at(point.x, point.z)))
    }
}

impl fmt::Debug for HeightfieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeightfieldShape")
            .field("half_extents", &self.half_extents)
            .field("sample_spacing", &self.source.sample_spacing())
            .finish()
    }
}
