//! High-level collision shape abstractions
//!
//! Shapes store their extents in model space and transform to world space
//! on-demand during queries. The variant set is closed: every query site
//! matches exhaustively over it.

use crate::foundation::math::{Vec3, Transform};
use super::heightfield::HeightfieldShape;
use super::mesh::TriangleCache;
use super::primitives::{ray_sphere, Obb, Ray, GEOM_EPSILON};

/// Sample count along the capsule body for the sampled raycast
///
/// The capsule raycast is an approximation: two exact end-cap sphere
/// tests plus this many sphere samples along the cylinder body, not an
/// exact cylinder intersection.
const CAPSULE_BODY_SAMPLES: u32 = 8;

/// Local axis a capsule's segment runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapsuleAxis {
    /// Capsule runs along local X
    X,
    /// Capsule runs along local Y
    Y,
    /// Capsule runs along local Z
    Z,
}

impl CapsuleAxis {
    /// Unit vector for this axis in local space
    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::new(1.0, 0.0, 0.0),
            Self::Y => Vec3::new(0.0, 1.0, 0.0),
            Self::Z => Vec3::new(0.0, 0.0, 1.0),
        }
    }

    fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Discriminant of a collider shape, for call sites that only need the
/// category (e.g. curved-contact handling in the movement resolver)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Oriented box
    Box,
    /// Sphere
    Sphere,
    /// Capsule
    Capsule,
    /// Triangle mesh
    Mesh,
    /// Heightfield
    Heightfield,
}

impl ShapeKind {
    /// Whether contacts against this shape are curved (sphere-like)
    pub fn is_curved(self) -> bool {
        matches!(self, Self::Sphere | Self::Capsule)
    }
}

/// Collision shape variants (extents stored in model space)
#[derive(Debug, Clone)]
pub enum ColliderShape {
    /// An oriented box with the given half-extents
    Box {
        /// Half-size along each local axis
        half_extents: Vec3,
    },
    /// A sphere with the given radius
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// A capsule along one local axis
    Capsule {
        /// Total height from cap tip to cap tip
        height: f32,
        /// Radius of the body and end caps
        radius: f32,
        /// Local axis the segment runs along
        axis: CapsuleAxis,
    },
    /// A triangle-soup mesh collision cache
    Mesh(TriangleCache),
    /// A heightfield backed by the terrain collaborator
    Heightfield(HeightfieldShape),
}

impl ColliderShape {
    /// The shape's category discriminant
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Box { .. } => ShapeKind::Box,
            Self::Sphere { .. } => ShapeKind::Sphere,
            Self::Capsule { .. } => ShapeKind::Capsule,
            Self::Mesh(_) => ShapeKind::Mesh,
            Self::Heightfield(_) => ShapeKind::Heightfield,
        }
    }

    /// Compute this shape's world-space oriented bounding box
    ///
    /// A pure function of the current world transform, the shape's local
    /// extents, and its local center offset. Non-uniform scale applies to
    /// the half-extents through absolute values: a mirrored transform
    /// never shrinks or flips extents. The signed scale still applies to
    /// the center offset, which does mirror.
    pub fn world_obb(&self, transform: &Transform, local_center: Vec3) -> Obb {
        let abs_scale = transform.scale.abs();
        let orientation = transform.rotation.to_rotation_matrix().into_inner();

        let (local_offset, half_extents) = match self {
            Self::Box { half_extents } => {
                (local_center, half_extents.component_mul(&abs_scale))
            }
            Self::Sphere { radius } => {
                let world_radius = radius * abs_scale.max();
                (local_center, Vec3::from_element(world_radius))
            }
            Self::Capsule { height, radius, axis } => {
                let world_radius = *radius * radial_scale(abs_scale, *axis);
                let along = (height * 0.5 * abs_scale[axis.index()]).max(world_radius);
                let mut half = Vec3::from_element(world_radius);
                half[axis.index()] = along;
                (local_center, half)
            }
            Self::Mesh(cache) => {
                let bounds = cache.local_bounds();
                (
                    local_center + bounds.center(),
                    bounds.extents().component_mul(&abs_scale),
                )
            }
            Self::Heightfield(field) => {
                (local_center, field.half_extents().component_mul(&abs_scale))
            }
        };

        let center =
            transform.position + transform.rotation * local_offset.component_mul(&transform.scale);
        Obb::new(center, half_extents, orientation)
    }

    /// World-space capsule segment endpoints and radius
    ///
    /// Returns `None` for non-capsule shapes.
    pub fn world_capsule_segment(
        &self,
        transform: &Transform,
        local_center: Vec3,
    ) -> Option<(Vec3, Vec3, f32)> {
        let Self::Capsule { height, radius, axis } = self else {
            return None;
        };
        let abs_scale = transform.scale.abs();
        let world_radius = *radius * radial_scale(abs_scale, *axis);
        let half_segment =
            (height * 0.5 * abs_scale[axis.index()] - world_radius).max(0.0);
        let center =
            transform.position + transform.rotation * local_center.component_mul(&transform.scale);
        let world_axis = transform.rotation * axis.unit();
        Some((
            center - world_axis * half_segment,
            center + world_axis * half_segment,
            world_radius,
        ))
    }

    /// Test ray intersection against this shape
    ///
    /// Returns `(distance, point, normal)` in world space for the nearest
    /// hit within `max_distance`, or `None`. Degenerate geometry misses;
    /// an empty mesh cache never hits.
    pub fn raycast(
        &self,
        ray: &Ray,
        max_distance: f32,
        transform: &Transform,
        local_center: Vec3,
    ) -> Option<(f32, Vec3, Vec3)> {
        let hit = match self {
            Self::Box { .. } => {
                let obb = self.world_obb(transform, local_center);
                obb.intersect_ray(ray)
                    .map(|(t, normal)| (t, ray.point_at(t), normal))
            }
            Self::Sphere { radius } => {
                let abs_scale = transform.scale.abs();
                let center = transform.position
                    + transform.rotation * local_center.component_mul(&transform.scale);
                ray_sphere(ray, center, radius * abs_scale.max())
            }
            Self::Capsule { .. } => self.raycast_capsule(ray, transform, local_center),
            Self::Mesh(cache) => self.raycast_mesh(cache, ray, transform, local_center),
            Self::Heightfield(field) => field.intersect_ray(ray, max_distance),
        };

        hit.filter(|(t, _, _)| *t <= max_distance)
    }

    /// Sampled capsule raycast: end-cap spheres plus evenly spaced body
    /// sphere samples; the nearest positive candidate wins.
    fn raycast_capsule(
        &self,
        ray: &Ray,
        transform: &Transform,
        local_center: Vec3,
    ) -> Option<(f32, Vec3, Vec3)> {
        let (p1, p2, radius) = self.world_capsule_segment(transform, local_center)?;

        let mut best: Option<(f32, Vec3, Vec3)> = None;
        let mut consider = |candidate: Option<(f32, Vec3, Vec3)>| {
            if let Some((t, point, normal)) = candidate {
                if best.map_or(true, |(best_t, _, _)| t < best_t) {
                    best = Some((t, point, normal));
                }
            }
        };

        consider(ray_sphere(ray, p1, radius));
        consider(ray_sphere(ray, p2, radius));
        for i in 1..=CAPSULE_BODY_SAMPLES {
            let fraction = i as f32 / (CAPSULE_BODY_SAMPLES + 1) as f32;
            let center = p1 + (p2 - p1) * fraction;
            consider(ray_sphere(ray, center, radius));
        }
        best
    }

    /// Mesh raycast: OBB pre-reject, then Möller-Trumbore over the cached
    /// triangles with the ray transformed into local space once.
    fn raycast_mesh(
        &self,
        cache: &TriangleCache,
        ray: &Ray,
        transform: &Transform,
        local_center: Vec3,
    ) -> Option<(f32, Vec3, Vec3)> {
        if cache.is_empty() {
            return None;
        }

        // Broadphase pre-test on the shape itself; clearly-missed rays
        // never reach the O(n) triangle scan.
        let obb = self.world_obb(transform, local_center);
        obb.intersect_ray(ray)?;

        let local_origin = transform.inverse_transform_point(ray.origin) - local_center;
        let local_dir = {
            let mut d = transform.inverse_transform_direction(ray.direction);
            for i in 0..3 {
                if transform.scale[i].abs() > f32::EPSILON {
                    d[i] /= transform.scale[i];
                }
            }
            d
        };
        if local_dir.magnitude_squared() < GEOM_EPSILON * GEOM_EPSILON {
            return None;
        }

        // Local t values share the ray parameterization, so the minimum
        // local t is also the nearest world hit.
        let mut best: Option<(f32, Vec3)> = None;
        for triangle in cache.triangles() {
            if let Some((t, _, _)) = triangle.intersect_ray(local_origin, local_dir) {
                if best.map_or(true, |(best_t, _)| t < best_t) {
                    best = Some((t, triangle.normal()));
                }
            }
        }

        let (local_t, local_normal) = best?;
        let local_point = local_origin + local_dir * local_t;
        let world_point = transform.transform_point(local_point + local_center);
        let distance = (world_point - ray.origin).magnitude();

        // Normals transform by the inverse-transpose under non-uniform scale
        let mut scaled_normal = local_normal;
        for i in 0..3 {
            if transform.scale[i].abs() > f32::EPSILON {
                scaled_normal[i] /= transform.scale[i];
            }
        }
        let world_normal = {
            let n = transform.rotation * scaled_normal;
            if n.magnitude_squared() < GEOM_EPSILON * GEOM_EPSILON {
                -ray.direction
            } else {
                n.normalize()
            }
        };

        Some((distance, world_point, world_normal))
    }
}

/// Radius scale for a capsule: the larger of the two axes perpendicular
/// to the capsule's own.
fn radial_scale(abs_scale: Vec3, axis: CapsuleAxis) -> f32 {
    match axis {
        CapsuleAxis::X => abs_scale.y.max(abs_scale.z),
        CapsuleAxis::Y => abs_scale.x.max(abs_scale.z),
        CapsuleAxis::Z => abs_scale.x.max(abs_scale.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, UnitQuaternion};
    use crate::physics::collision::mesh::MeshData;
    use approx::assert_relative_eq;

    fn unit_quad_cache() -> TriangleCache {
        // 2x2 quad in the XY plane, centered at the origin
        let vertices: Vec<f32> = vec![
            -1.0, -1.0, 0.0,
            1.0, -1.0, 0.0,
            1.0, 1.0, 0.0,
            -1.0, 1.0, 0.0,
        ];
        let indices = [0u32, 1, 2, 0, 2, 3];
        TriangleCache::from_submeshes(&[MeshData {
            vertices: &vertices,
            stride: 3,
            position_offset: 0,
            indices: &indices,
        }])
        .unwrap()
    }

    #[test]
    fn test_world_obb_negative_scale_never_flips_extents() {
        let shape = ColliderShape::Box {
            half_extents: Vec3::new(1.0, 2.0, 3.0),
        };
        let mirrored = Transform {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(-2.0, 1.0, -1.0),
        };
        let obb = shape.world_obb(&mirrored, Vec3::zeros());
        assert_relative_eq!(obb.half_extents, Vec3::new(2.0, 2.0, 3.0), epsilon = 1e-6);
    }

    #[test]
    fn test_world_obb_scales_linearly_per_axis() {
        let shape = ColliderShape::Box {
            half_extents: Vec3::new(1.0, 1.0, 1.0),
        };
        let transform = Transform {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(2.0, 3.0, 4.0),
        };
        let obb = shape.world_obb(&transform, Vec3::zeros());
        assert_relative_eq!(obb.half_extents, Vec3::new(2.0, 3.0, 4.0), epsilon = 1e-6);
    }

    #[test]
    fn test_box_raycast_reports_entry_face() {
        let shape = ColliderShape::Box {
            half_extents: Vec3::new(1.0, 1.0, 1.0),
        };
        let transform = Transform::from_position(Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let (t, point, normal) = shape
            .raycast(&ray, 100.0, &transform, Vec3::zeros())
            .unwrap();
        assert_relative_eq!(t, 4.0, epsilon = 1e-5);
        assert_relative_eq!(point, Vec3::new(0.0, 0.0, -4.0), epsilon = 1e-5);
        assert_relative_eq!(normal, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_sphere_raycast_distance_and_normal() {
        let shape = ColliderShape::Sphere { radius: 1.0 };
        let transform = Transform::identity();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let (t, _, normal) = shape
            .raycast(&ray, 100.0, &transform, Vec3::zeros())
            .unwrap();
        assert_relative_eq!(t, 4.0, epsilon = 1e-5);
        assert_relative_eq!(normal, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_capsule_raycast_hits_body_between_samples() {
        let shape = ColliderShape::Capsule {
            height: 2.0,
            radius: 0.5,
            axis: CapsuleAxis::Y,
        };
        let transform = Transform::identity();
        // Aimed at the cylinder body midway up, from +X
        let ray = Ray::new(Vec3::new(5.0, 0.25, 0.0), Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        let (t, _, normal) = shape
            .raycast(&ray, 100.0, &transform, Vec3::zeros())
            .unwrap();
        // Sampled approximation: allow slack beyond the exact 4.5
        assert!(t > 4.3 && t < 4.7, "unexpected hit distance {t}");
        assert!(normal.x > 0.9);
    }

    #[test]
    fn test_capsule_raycast_hits_end_cap_exactly() {
        let shape = ColliderShape::Capsule {
            height: 2.0,
            radius: 0.5,
            axis: CapsuleAxis::Y,
        };
        let transform = Transform::identity();
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0)).unwrap();
        let (t, _, _) = shape
            .raycast(&ray, 100.0, &transform, Vec3::zeros())
            .unwrap();
        // Top cap tip sits at y = 1.0
        assert_relative_eq!(t, 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_mesh_raycast_prefilters_on_obb() {
        let shape = ColliderShape::Mesh(unit_quad_cache());
        let transform = Transform::identity();

        // Clean hit through the quad center
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let (t, point, _) = shape
            .raycast(&ray, 100.0, &transform, Vec3::zeros())
            .unwrap();
        assert_relative_eq!(t, 5.0, epsilon = 1e-4);
        assert_relative_eq!(point, Vec3::zeros(), epsilon = 1e-4);

        // Clearly off to the side: rejected by the bounds pre-test
        let miss = Ray::new(Vec3::new(50.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        assert!(shape.raycast(&miss, 100.0, &transform, Vec3::zeros()).is_none());
    }

    #[test]
    fn test_mesh_raycast_respects_rotation() {
        let shape = ColliderShape::Mesh(unit_quad_cache());
        // Quad rotated to lie in the XZ plane (normal now +Y)
        let rotation = UnitQuaternion::from_axis_angle(
            &Vec3::x_axis(),
            -std::f32::consts::FRAC_PI_2,
        );
        let transform = Transform::from_position_rotation(Vec3::zeros(), rotation);
        let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, -1.0, 0.0)).unwrap();
        let (t, _, normal) = shape
            .raycast(&ray, 100.0, &transform, Vec3::zeros())
            .unwrap();
        assert_relative_eq!(t, 3.0, epsilon = 1e-4);
        assert_relative_eq!(normal.y.abs(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_rays_missing_aabb_never_hit() {
        let shapes: Vec<ColliderShape> = vec![
            ColliderShape::Box { half_extents: Vec3::new(1.0, 1.0, 1.0) },
            ColliderShape::Sphere { radius: 1.0 },
            ColliderShape::Capsule { height: 2.0, radius: 0.5, axis: CapsuleAxis::Y },
            ColliderShape::Mesh(unit_quad_cache()),
        ];
        let transform = Transform::identity();
        let ray = Ray::new(Vec3::new(10.0, 10.0, 10.0), Vec3::new(0.0, 1.0, 0.0)).unwrap();
        for shape in &shapes {
            let aabb = shape.world_obb(&transform, Vec3::zeros()).aabb();
            assert!(aabb.intersect_ray(ray.origin, ray.direction).is_none());
            assert!(shape.raycast(&ray, 100.0, &transform, Vec3::zeros()).is_none());
        }
    }
}
