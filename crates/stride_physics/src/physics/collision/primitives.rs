//! Primitive collision geometry and intersection algorithms
//!
//! Provides the basic geometric types (rays, bounds, triangles) with
//! intersection testing used by every narrow-phase routine. All tests
//! return `Option` for the "no intersection" case; degenerate inputs
//! (zero-length directions, zero-area triangles, parallel rays) resolve
//! to `None` via epsilon comparisons, never to a panic.

use crate::foundation::math::{Vec3, Mat3};

/// Epsilon for degenerate-geometry detection
pub const GEOM_EPSILON: f32 = 1e-6;

/// A ray for casting and picking
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized on construction)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    ///
    /// Returns `None` for a near-zero direction vector.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let length = direction.magnitude();
        if length < GEOM_EPSILON {
            return None;
        }
        Some(Self {
            origin,
            direction: direction / length,
        })
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Grow this AABB to contain another
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Grow this AABB by a uniform margin on every side
    pub fn inflated(&self, margin: f32) -> Aabb {
        let m = Vec3::new(margin, margin, margin);
        Aabb::new(self.min - m, self.max + m)
    }

    /// Closest point inside the AABB to the given point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Test ray intersection with this AABB using the slab method
    ///
    /// Returns the distance to the entry point if the ray intersects,
    /// `None` otherwise. A ray starting inside returns `Some(0.0)`.
    pub fn intersect_ray(&self, ray_origin: Vec3, ray_dir: Vec3) -> Option<f32> {
        let inv_dir = Vec3::new(
            if ray_dir.x != 0.0 { 1.0 / ray_dir.x } else { f32::INFINITY },
            if ray_dir.y != 0.0 { 1.0 / ray_dir.y } else { f32::INFINITY },
            if ray_dir.z != 0.0 { 1.0 / ray_dir.z } else { f32::INFINITY },
        );

        let t1 = (self.min.x - ray_origin.x) * inv_dir.x;
        let t2 = (self.max.x - ray_origin.x) * inv_dir.x;
        let t3 = (self.min.y - ray_origin.y) * inv_dir.y;
        let t4 = (self.max.y - ray_origin.y) * inv_dir.y;
        let t5 = (self.min.z - ray_origin.z) * inv_dir.z;
        let t6 = (self.max.z - ray_origin.z) * inv_dir.z;

        let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
        let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

        // Ray intersects if tmax >= tmin and tmax >= 0
        if tmax >= tmin && tmax >= 0.0 {
            // Entry distance, or 0 if the origin is inside the box
            Some(tmin.max(0.0))
        } else {
            None
        }
    }
}

/// An oriented bounding box
///
/// Produced fresh per query from the owning entity's world transform;
/// only its axis-aligned envelope is ever cached across queries.
#[derive(Debug, Clone, Copy)]
pub struct Obb {
    /// Center position in world space
    pub center: Vec3,
    /// Half-size along each local axis
    pub half_extents: Vec3,
    /// Rotation matrix whose columns are the box's local axes
    pub orientation: Mat3,
}

impl Obb {
    /// Create a new OBB
    pub fn new(center: Vec3, half_extents: Vec3, orientation: Mat3) -> Self {
        Self { center, half_extents, orientation }
    }

    /// Conservative axis-aligned envelope of this box
    ///
    /// The world-space extent along axis `i` is the sum of the projected
    /// absolute contributions of each local axis, so the result always
    /// fully contains the rotated box.
    pub fn aabb(&self) -> Aabb {
        let mut extents = Vec3::zeros();
        for i in 0..3 {
            extents[i] = (0..3)
                .map(|j| self.orientation[(i, j)].abs() * self.half_extents[j])
                .sum();
        }
        Aabb::from_center_extents(self.center, extents)
    }

    /// Transform a world-space point into this box's local frame
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.orientation.transpose() * (point - self.center)
    }

    /// Closest point on or inside this box to a world-space point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let local = self.to_local(point);
        let clamped = Vec3::new(
            local.x.clamp(-self.half_extents.x, self.half_extents.x),
            local.y.clamp(-self.half_extents.y, self.half_extents.y),
            local.z.clamp(-self.half_extents.z, self.half_extents.z),
        );
        self.center + self.orientation * clamped
    }

    /// Test ray intersection against this box
    ///
    /// The ray is transformed into the box's local frame and slab-tested
    /// there. Returns entry distance and the world-space normal of the
    /// entered face. A ray starting inside reports distance 0 with the
    /// normal opposing the ray.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3)> {
        let local_origin = self.to_local(ray.origin);
        let local_dir = self.orientation.transpose() * ray.direction;

        let mut tmin = f32::NEG_INFINITY;
        let mut tmax = f32::INFINITY;
        let mut entry_axis = 0usize;
        let mut entry_sign = 1.0f32;

        for axis in 0..3 {
            let extent = self.half_extents[axis];
            if local_dir[axis].abs() < GEOM_EPSILON {
                // Parallel to this slab; miss if origin lies outside it
                if local_origin[axis].abs() > extent {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / local_dir[axis];
            let mut t_near = (-extent - local_origin[axis]) * inv;
            let mut t_far = (extent - local_origin[axis]) * inv;
            let mut sign = -1.0;
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
                sign = 1.0;
            }
            if t_near > tmin {
                tmin = t_near;
                entry_axis = axis;
                entry_sign = sign;
            }
            tmax = tmax.min(t_far);
            if tmin > tmax {
                return None;
            }
        }

        if tmax < 0.0 {
            return None;
        }

        if tmin < 0.0 {
            // Origin inside the box
            return Some((0.0, -ray.direction));
        }

        let mut local_normal = Vec3::zeros();
        local_normal[entry_axis] = entry_sign;
        Some((tmin, self.orientation * local_normal))
    }

    /// Test overlap against another box via the separating axis theorem
    ///
    /// Tests the 6 face axes and 9 edge-edge cross products.
    pub fn overlaps(&self, other: &Obb) -> bool {
        let mut axes = [Vec3::zeros(); 15];
        let mut count = 0;
        for i in 0..3 {
            axes[count] = self.orientation.column(i).into_owned();
            count += 1;
            axes[count] = other.orientation.column(i).into_owned();
            count += 1;
        }
        for i in 0..3 {
            for j in 0..3 {
                let a = self.orientation.column(i).into_owned();
                let b = other.orientation.column(j).into_owned();
                axes[count] = a.cross(&b);
                count += 1;
            }
        }

        let delta = other.center - self.center;
        for axis in &axes[..count] {
            let length_sq = axis.magnitude_squared();
            if length_sq < GEOM_EPSILON {
                continue; // Degenerate cross product, skip
            }
            let axis = axis / length_sq.sqrt();

            let project = |obb: &Obb| -> f32 {
                (0..3)
                    .map(|i| {
                        let col = obb.orientation.column(i).into_owned();
                        (axis.dot(&col) * obb.half_extents[i]).abs()
                    })
                    .sum()
            };

            if delta.dot(&axis).abs() > project(self) + project(other) {
                return false;
            }
        }
        true
    }
}

/// A triangle for collision detection
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    /// First vertex
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Calculates the normal of the triangle (right-hand rule)
    ///
    /// Zero-area triangles return a zero vector rather than NaN.
    pub fn normal(&self) -> Vec3 {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let cross = edge1.cross(&edge2);
        if cross.magnitude_squared() < GEOM_EPSILON * GEOM_EPSILON {
            return Vec3::zeros();
        }
        cross.normalize()
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Möller-Trumbore ray-triangle intersection algorithm
    ///
    /// Returns `(t, u, v)` barycentric coordinates if hit, `None`
    /// otherwise. Back faces are included; rays parallel to the plane
    /// and zero-area triangles miss.
    ///
    /// See: "Fast, Minimum Storage Ray/Triangle Intersection" by
    /// Möller & Trumbore.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<(f32, f32, f32)> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = direction.cross(&edge2);
        let a = edge1.dot(&h);

        // Ray parallel to triangle (or degenerate triangle)?
        if a.abs() < GEOM_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = origin - self.v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        if t >= 0.0 {
            Some((t, u, v))
        } else {
            None // Behind ray origin
        }
    }

    /// Get the closest point on the triangle to a given point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let v0_to_point = point - self.v0;

        let d1 = edge1.dot(&v0_to_point);
        let d2 = edge2.dot(&v0_to_point);
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.v0;
        }

        let v1_to_point = point - self.v1;
        let d3 = edge1.dot(&v1_to_point);
        let d4 = edge2.dot(&v1_to_point);
        if d3 >= 0.0 && d4 <= d3 {
            return self.v1;
        }

        let v2_to_point = point - self.v2;
        let d5 = edge1.dot(&v2_to_point);
        let d6 = edge2.dot(&v2_to_point);
        if d6 >= 0.0 && d5 <= d6 {
            return self.v2;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let t = d1 / (d1 - d3);
            return self.v0 + edge1 * t;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return self.v0 + edge2 * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return self.v1 + (self.v2 - self.v1) * w;
        }

        // Point projects inside the triangle
        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        self.v0 + edge1 * v + edge2 * w
    }
}

/// Closest point on a segment to a given point
pub fn closest_point_on_segment(a: Vec3, b: Vec3, point: Vec3) -> Vec3 {
    let ab = b - a;
    let length_sq = ab.magnitude_squared();
    if length_sq < GEOM_EPSILON * GEOM_EPSILON {
        return a; // Degenerate segment
    }
    let t = ((point - a).dot(&ab) / length_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest points between two segments
///
/// Returns `(point_on_first, point_on_second)` using the standard
/// clamped formulation; parallel and degenerate segments fall back to
/// endpoint projections.
pub fn closest_points_segment_segment(
    p1: Vec3,
    q1: Vec3,
    p2: Vec3,
    q2: Vec3,
) -> (Vec3, Vec3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.magnitude_squared();
    let e = d2.magnitude_squared();
    let f = d2.dot(&r);

    let eps = GEOM_EPSILON * GEOM_EPSILON;

    if a < eps && e < eps {
        return (p1, p2); // Both segments degenerate
    }

    let (s, t);
    if a < eps {
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d1.dot(&r);
        if e < eps {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;

            let s_unclamped = if denom > eps {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0 // Parallel segments
            };

            let t_unclamped = (b * s_unclamped + f) / e;
            if t_unclamped < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t_unclamped > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            } else {
                t = t_unclamped;
                s = s_unclamped;
            }
        }
    }

    (p1 + d1 * s, p2 + d2 * t)
}

/// Test ray intersection against a sphere
///
/// Closed-form quadratic solution; returns the nearest positive root
/// with its hit point and outward normal, `None` when the ray misses or
/// points away.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<(f32, Vec3, Vec3)> {
    let oc = ray.origin - center;

    // Solve: |origin + t*direction - center|^2 = radius^2
    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * oc.dot(&ray.direction);
    let c = oc.dot(&oc) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_discriminant = discriminant.sqrt();
    let t1 = (-b - sqrt_discriminant) / (2.0 * a);
    let t2 = (-b + sqrt_discriminant) / (2.0 * a);

    // Use the closest positive intersection
    let t = if t1 > 0.0 {
        t1
    } else if t2 > 0.0 {
        t2
    } else {
        return None; // Sphere entirely behind the origin
    };

    let hit_point = ray.point_at(t);
    let offset = hit_point - center;
    let normal = if offset.magnitude_squared() > GEOM_EPSILON * GEOM_EPSILON {
        offset.normalize()
    } else {
        -ray.direction
    };

    Some((t, hit_point, normal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ray_rejects_zero_direction() {
        assert!(Ray::new(Vec3::zeros(), Vec3::zeros()).is_none());
    }

    #[test]
    fn test_ray_sphere_through_center() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let (t, point, normal) = ray_sphere(&ray, Vec3::zeros(), 1.0).unwrap();
        assert_relative_eq!(t, 4.0, epsilon = 1e-5);
        assert_relative_eq!(point, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
        assert_relative_eq!(normal, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_ray_sphere_behind_origin_misses() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(ray_sphere(&ray, Vec3::zeros(), 1.0).is_none());
    }

    #[test]
    fn test_moller_trumbore_centroid_hit() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let centroid = tri.centroid();
        let origin = centroid + Vec3::new(0.0, 0.0, 3.0);
        let (t, u, v) = tri
            .intersect_ray(origin, Vec3::new(0.0, 0.0, -1.0))
            .unwrap();
        assert_relative_eq!(t, 3.0, epsilon = 1e-5);
        assert_relative_eq!(u, 1.0 / 3.0, epsilon = 1e-5);
        assert_relative_eq!(v, 1.0 / 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_moller_trumbore_parallel_ray_misses() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        // Direction lies in the triangle plane
        assert!(tri
            .intersect_ray(Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_aabb_slab_entry_distance() {
        let aabb = Aabb::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let t = aabb
            .intersect_ray(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0))
            .unwrap();
        assert_relative_eq!(t, 4.0, epsilon = 1e-5);

        // Origin inside reports zero
        let inside = aabb.intersect_ray(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(inside, 0.0);

        assert!(aabb
            .intersect_ray(Vec3::new(5.0, 5.0, 5.0), Vec3::new(0.0, 0.0, -1.0))
            .is_none());
    }

    #[test]
    fn test_obb_aabb_contains_rotated_box() {
        let rotation = nalgebra::Rotation3::from_axis_angle(
            &Vec3::y_axis(),
            std::f32::consts::FRAC_PI_4,
        );
        let obb = Obb::new(
            Vec3::zeros(),
            Vec3::new(1.0, 1.0, 1.0),
            rotation.into_inner(),
        );
        let aabb = obb.aabb();
        // A unit cube rotated 45 degrees about Y spans sqrt(2) in X and Z
        let expected = std::f32::consts::SQRT_2;
        assert_relative_eq!(aabb.max.x, expected, epsilon = 1e-5);
        assert_relative_eq!(aabb.max.z, expected, epsilon = 1e-5);
        assert_relative_eq!(aabb.max.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_obb_ray_face_normal() {
        let obb = Obb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Mat3::identity());
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        let (t, normal) = obb.intersect_ray(&ray).unwrap();
        assert_relative_eq!(t, 4.0, epsilon = 1e-5);
        assert_relative_eq!(normal, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_obb_sat_overlap() {
        let a = Obb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Mat3::identity());
        let b = Obb::new(
            Vec3::new(1.5, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Mat3::identity(),
        );
        let c = Obb::new(
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Mat3::identity(),
        );
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_segment_segment_closest_perpendicular() {
        let (p, q) = closest_points_segment_segment(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, -1.0),
            Vec3::new(0.0, 2.0, 1.0),
        );
        assert_relative_eq!(p, Vec3::zeros(), epsilon = 1e-5);
        assert_relative_eq!(q, Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_segment_point_clamps_to_endpoint() {
        let closest = closest_point_on_segment(
            Vec3::zeros(),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(5.0, 1.0, 0.0),
        );
        assert_relative_eq!(closest, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_triangle_closest_point_regions() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        // Inside projects straight down
        let inside = tri.closest_point(Vec3::new(0.25, 0.25, 5.0));
        assert_relative_eq!(inside, Vec3::new(0.25, 0.25, 0.0), epsilon = 1e-5);
        // Beyond a vertex clamps to it
        let vertex = tri.closest_point(Vec3::new(-1.0, -1.0, 0.0));
        assert_relative_eq!(vertex, Vec3::zeros(), epsilon = 1e-5);
    }
}
