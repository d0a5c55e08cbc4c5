//! Math utilities and types
//!
//! Provides fundamental math types for 3D collision and movement code.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion, UnitQuaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point.component_mul(&self.scale)
    }

    /// Apply the inverse of this transform to a point
    ///
    /// Scale components with near-zero magnitude are left undivided to
    /// avoid producing infinities.
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        let unrotated = self.rotation.inverse() * (point - self.position);
        let mut local = unrotated;
        for i in 0..3 {
            if self.scale[i].abs() > f32::EPSILON {
                local[i] /= self.scale[i];
            }
        }
        local
    }

    /// Apply the inverse rotation of this transform to a direction
    pub fn inverse_transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation.inverse() * direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_round_trip() {
        let transform = Transform::identity();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(transform.transform_point(p), p, epsilon = 1e-6);
        assert_relative_eq!(transform.inverse_transform_point(p), p, epsilon = 1e-6);
    }

    #[test]
    fn test_transform_point_with_scale_and_translation() {
        let transform = Transform {
            position: Vec3::new(10.0, 0.0, 0.0),
            rotation: Quat::identity(),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };
        let p = Vec3::new(1.0, 1.0, 1.0);
        assert_relative_eq!(
            transform.transform_point(p),
            Vec3::new(12.0, 2.0, 2.0),
            epsilon = 1e-6
        );

        let back = transform.inverse_transform_point(transform.transform_point(p));
        assert_relative_eq!(back, p, epsilon = 1e-5);
    }

    #[test]
    fn test_inverse_transform_with_rotation() {
        let rotation = UnitQuaternion::from_axis_angle(
            &Vec3::y_axis(),
            std::f32::consts::FRAC_PI_2,
        );
        let transform = Transform::from_position_rotation(Vec3::new(0.0, 0.0, 5.0), rotation);

        let world = transform.transform_point(Vec3::new(1.0, 0.0, 0.0));
        let local = transform.inverse_transform_point(world);
        assert_relative_eq!(local, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }
}
