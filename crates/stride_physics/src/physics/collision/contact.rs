//! Static overlap tests with penetration contacts
//!
//! The kernels here answer "is this capsule overlapping that shape, and
//! how do we push it out": specialized tests for sphere and capsule
//! opponents, an AABB fallback for boxes and meshes' bounding regions,
//! sampled sphere tests against mesh triangles, and a height comparison
//! for terrain. Contact normals always point from the other shape toward
//! the querying capsule.

use crate::foundation::math::{Vec3, Transform};
use super::heightfield::HeightfieldShape;
use super::mesh::TriangleCache;
use super::primitives::{
    closest_point_on_segment, closest_points_segment_segment, Aabb, GEOM_EPSILON,
};
use super::shape::ColliderShape;

/// Sphere samples along the capsule segment for mesh contact tests
const MESH_CONTACT_SAMPLES: u32 = 4;

/// Iterations of the alternating segment/box projection
const SEGMENT_BOX_REFINE: u32 = 4;

/// A contact produced by a static overlap test
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Contact point on the other shape's surface, world space
    pub point: Vec3,
    /// Normal pointing from the other shape toward the querying capsule
    pub normal: Vec3,
    /// Overlap depth along the normal
    pub penetration: f32,
}

/// Test a world-space capsule against a registered shape
///
/// Returns the deepest contact when the volumes overlap, `None`
/// otherwise. Box and mesh opponents that defeat the specialized tests
/// fall back to their axis-aligned envelope.
pub fn capsule_vs_shape(
    p1: Vec3,
    p2: Vec3,
    radius: f32,
    shape: &ColliderShape,
    transform: &Transform,
    local_center: Vec3,
) -> Option<Contact> {
    match shape {
        ColliderShape::Sphere { radius: other_radius } => {
            let abs_scale = transform.scale.abs();
            let center = transform.position
                + transform.rotation * local_center.component_mul(&transform.scale);
            capsule_vs_sphere(p1, p2, radius, center, other_radius * abs_scale.max())
        }
        ColliderShape::Capsule { .. } => {
            let (q1, q2, other_radius) = shape.world_capsule_segment(transform, local_center)?;
            capsule_vs_capsule(p1, p2, radius, q1, q2, other_radius)
        }
        ColliderShape::Box { .. } => {
            let aabb = shape.world_obb(transform, local_center).aabb();
            capsule_vs_aabb(p1, p2, radius, &aabb)
        }
        ColliderShape::Mesh(cache) => {
            capsule_vs_mesh(p1, p2, radius, cache, transform, local_center)
        }
        ColliderShape::Heightfield(field) => capsule_vs_heightfield(p1, p2, radius, field),
    }
}

/// Capsule against a sphere
pub fn capsule_vs_sphere(
    p1: Vec3,
    p2: Vec3,
    radius: f32,
    center: Vec3,
    sphere_radius: f32,
) -> Option<Contact> {
    let on_segment = closest_point_on_segment(p1, p2, center);
    let delta = on_segment - center;
    let distance = delta.magnitude();
    let penetration = radius + sphere_radius - distance;
    if penetration <= 0.0 {
        return None;
    }
    let normal = if distance > GEOM_EPSILON {
        delta / distance
    } else {
        Vec3::new(0.0, 1.0, 0.0) // Concentric; push up
    };
    Some(Contact {
        point: center + normal * sphere_radius,
        normal,
        penetration,
    })
}

/// Capsule against another capsule
pub fn capsule_vs_capsule(
    p1: Vec3,
    p2: Vec3,
    radius: f32,
    q1: Vec3,
    q2: Vec3,
    other_radius: f32,
) -> Option<Contact> {
    let (on_self, on_other) = closest_points_segment_segment(p1, p2, q1, q2);
    let delta = on_self - on_other;
    let distance = delta.magnitude();
    let penetration = radius + other_radius - distance;
    if penetration <= 0.0 {
        return None;
    }
    let normal = if distance > GEOM_EPSILON {
        delta / distance
    } else {
        Vec3::new(0.0, 1.0, 0.0)
    };
    Some(Contact {
        point: on_other + normal * other_radius,
        normal,
        penetration,
    })
}

/// Capsule against an axis-aligned box
///
/// Alternating projection finds the closest segment/box point pair; a
/// segment point inside the box is pushed out through the nearest face.
pub fn capsule_vs_aabb(p1: Vec3, p2: Vec3, radius: f32, aabb: &Aabb) -> Option<Contact> {
    let mut on_segment = (p1 + p2) * 0.5;
    for _ in 0..SEGMENT_BOX_REFINE {
        let on_box = aabb.closest_point(on_segment);
        on_segment = closest_point_on_segment(p1, p2, on_box);
    }
    let on_box = aabb.closest_point(on_segment);

    let delta = on_segment - on_box;
    let distance = delta.magnitude();

    if distance > GEOM_EPSILON {
        let penetration = radius - distance;
        if penetration <= 0.0 {
            return None;
        }
        return Some(Contact {
            point: on_box,
            normal: delta / distance,
            penetration,
        });
    }

    // Segment point inside the box: push out through the nearest face
    let center = aabb.center();
    let extents = aabb.extents();
    let offset = on_segment - center;
    let mut best_axis = 0usize;
    let mut best_depth = f32::MAX;
    for axis in 0..3 {
        let depth = extents[axis] - offset[axis].abs();
        if depth < best_depth {
            best_depth = depth;
            best_axis = axis;
        }
    }
    let mut normal = Vec3::zeros();
    normal[best_axis] = if offset[best_axis] >= 0.0 { 1.0 } else { -1.0 };
    let mut point = on_segment;
    point[best_axis] = center[best_axis] + extents[best_axis] * normal[best_axis];
    Some(Contact {
        point,
        normal,
        penetration: best_depth + radius,
    })
}

/// Capsule against a triangle mesh
///
/// Sphere samples along the capsule segment are tested against the
/// cached local-space triangles, keeping the deepest contact. Non-uniform
/// scale is approximated through the dominant scale axis.
fn capsule_vs_mesh(
    p1: Vec3,
    p2: Vec3,
    radius: f32,
    cache: &TriangleCache,
    transform: &Transform,
    local_center: Vec3,
) -> Option<Contact> {
    if cache.is_empty() {
        return None;
    }

    let uniform_scale = transform.scale.abs().max().max(f32::EPSILON);
    let local_radius = radius / uniform_scale;

    let mut best: Option<(f32, Vec3, Vec3)> = None; // (penetration, point, normal) in local space
    for i in 0..=MESH_CONTACT_SAMPLES {
        let fraction = i as f32 / MESH_CONTACT_SAMPLES as f32;
        let world_sample = p1 + (p2 - p1) * fraction;
        let local_sample = transform.inverse_transform_point(world_sample) - local_center;

        for triangle in cache.triangles() {
            let closest = triangle.closest_point(local_sample);
            let delta = local_sample - closest;
            let distance_sq = delta.magnitude_squared();
            if distance_sq > local_radius * local_radius {
                continue;
            }
            let distance = distance_sq.sqrt();
            let penetration = local_radius - distance;
            let normal = if distance > GEOM_EPSILON {
                delta / distance
            } else {
                let n = triangle.normal();
                if n.dot(&delta) < 0.0 { -n } else { n }
            };
            if best.map_or(true, |(p, _, _)| penetration > p) {
                best = Some((penetration, closest, normal));
            }
        }
    }

    let (local_penetration, local_point, local_normal) = best?;
    let world_normal = (transform.rotation * local_normal).normalize();
    Some(Contact {
        point: transform.transform_point(local_point + local_center),
        normal: world_normal,
        penetration: local_penetration * uniform_scale,
    })
}

/// Capsule against a heightfield
///
/// Compares the capsule's lowest point against the sampled terrain
/// height under it.
fn capsule_vs_heightfield(
    p1: Vec3,
    p2: Vec3,
    radius: f32,
    field: &HeightfieldShape,
) -> Option<Contact> {
    let lower = if p1.y <= p2.y { p1 } else { p2 };
    let ground_height = field.height_at(lower.x, lower.z);
    let bottom = lower.y - radius;
    if bottom >= ground_height {
        return None;
    }
    Some(Contact {
        point: Vec3::new(lower.x, ground_height, lower.z),
        normal: field.normal_at(lower.x, lower.z),
        penetration: ground_height - bottom,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::mesh::MeshData;
    use crate::physics::collision::shape::CapsuleAxis;
    use approx::assert_relative_eq;

    fn vertical_capsule(center: Vec3, height: f32, radius: f32) -> (Vec3, Vec3, f32) {
        let half = (height * 0.5 - radius).max(0.0);
        (
            center - Vec3::new(0.0, half, 0.0),
            center + Vec3::new(0.0, half, 0.0),
            radius,
        )
    }

    #[test]
    fn test_capsule_sphere_overlap_normal_points_at_capsule() {
        let (p1, p2, r) = vertical_capsule(Vec3::new(0.0, 1.0, 0.0), 2.0, 0.5);
        let contact = capsule_vs_sphere(p1, p2, r, Vec3::new(0.8, 1.0, 0.0), 0.5).unwrap();
        assert_relative_eq!(contact.normal, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(contact.penetration, 0.2, epsilon = 1e-5);
    }

    #[test]
    fn test_capsule_sphere_separated() {
        let (p1, p2, r) = vertical_capsule(Vec3::new(0.0, 1.0, 0.0), 2.0, 0.5);
        assert!(capsule_vs_sphere(p1, p2, r, Vec3::new(5.0, 1.0, 0.0), 0.5).is_none());
    }

    #[test]
    fn test_capsule_capsule_parallel_overlap() {
        let (p1, p2, r) = vertical_capsule(Vec3::new(0.0, 1.0, 0.0), 2.0, 0.5);
        let (q1, q2, qr) = vertical_capsule(Vec3::new(0.7, 1.0, 0.0), 2.0, 0.5);
        let contact = capsule_vs_capsule(p1, p2, r, q1, q2, qr).unwrap();
        assert_relative_eq!(contact.normal, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(contact.penetration, 0.3, epsilon = 1e-5);
    }

    #[test]
    fn test_capsule_aabb_side_contact() {
        let aabb = Aabb::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let (p1, p2, r) = vertical_capsule(Vec3::new(1.3, 0.0, 0.0), 2.0, 0.5);
        let contact = capsule_vs_aabb(p1, p2, r, &aabb).unwrap();
        assert_relative_eq!(contact.normal, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(contact.penetration, 0.2, epsilon = 1e-5);
    }

    #[test]
    fn test_capsule_inside_aabb_pushes_through_nearest_face() {
        let aabb = Aabb::from_center_extents(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let (p1, p2, r) = vertical_capsule(Vec3::new(1.5, 0.0, 0.0), 1.0, 0.25);
        let contact = capsule_vs_aabb(p1, p2, r, &aabb).unwrap();
        assert_relative_eq!(contact.normal, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
        // 0.5 to the +X face plus the capsule radius
        assert_relative_eq!(contact.penetration, 0.75, epsilon = 1e-5);
    }

    #[test]
    fn test_capsule_vs_shape_dispatch_mesh_floor() {
        // A ground quad at y = 0
        let vertices: Vec<f32> = vec![
            -5.0, 0.0, -5.0,
            5.0, 0.0, -5.0,
            5.0, 0.0, 5.0,
            -5.0, 0.0, 5.0,
        ];
        let indices = [0u32, 1, 2, 0, 2, 3];
        let cache = TriangleCache::from_submeshes(&[MeshData {
            vertices: &vertices,
            stride: 3,
            position_offset: 0,
            indices: &indices,
        }])
        .unwrap();
        let shape = ColliderShape::Mesh(cache);
        let transform = Transform::identity();

        // Capsule sunk slightly into the floor
        let (p1, p2, r) = vertical_capsule(Vec3::new(0.0, 0.8, 0.0), 2.0, 0.5);
        let contact =
            capsule_vs_shape(p1, p2, r, &shape, &transform, Vec3::zeros()).unwrap();
        assert!(contact.normal.y > 0.9);
        assert_relative_eq!(contact.penetration, 0.2, epsilon = 1e-4);
    }

    #[test]
    fn test_capsule_vs_capsule_shape_dispatch() {
        let shape = ColliderShape::Capsule {
            height: 2.0,
            radius: 0.5,
            axis: CapsuleAxis::Y,
        };
        let transform = Transform::from_position(Vec3::new(0.7, 1.0, 0.0));
        let (p1, p2, r) = vertical_capsule(Vec3::new(0.0, 1.0, 0.0), 2.0, 0.5);
        let contact =
            capsule_vs_shape(p1, p2, r, &shape, &transform, Vec3::zeros()).unwrap();
        assert!(contact.normal.x < -0.9);
    }
}
