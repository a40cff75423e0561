//! Math utilities and types
//!
//! Provides the math types used by transforms and culling.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix4,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Bounding sphere used for culling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center of the sphere
    pub center: Vec3,
    /// Radius of the sphere; negative means invalid
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Whether the sphere has been given real extents
    pub fn is_valid(&self) -> bool {
        self.radius >= 0.0
    }

    /// Transform the sphere into another space
    ///
    /// The radius is scaled by the largest axis scale of the matrix so the
    /// result still encloses the original volume under non-uniform scaling.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let center = matrix.transform_point(&Point3::from(self.center)).coords;
        let scale_x = Vec3::new(matrix.m11, matrix.m21, matrix.m31).magnitude();
        let scale_y = Vec3::new(matrix.m12, matrix.m22, matrix.m32).magnitude();
        let scale_z = Vec3::new(matrix.m13, matrix.m23, matrix.m33).magnitude();
        let scale = scale_x.max(scale_y).max(scale_z);

        Self {
            center,
            radius: self.radius * scale,
        }
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            center: Vec3::zeros(),
            radius: -1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_sphere_is_invalid() {
        assert!(!Sphere::default().is_valid());
        assert!(Sphere::new(Vec3::zeros(), 0.0).is_valid());
    }

    #[test]
    fn test_sphere_transform() {
        let sphere = Sphere::new(Vec3::new(1.0, 0.0, 0.0), 2.0);
        let matrix = Mat4::new_translation(&Vec3::new(0.0, 5.0, 0.0))
            * Mat4::new_nonuniform_scaling(&Vec3::new(1.0, 3.0, 1.0));

        let moved = sphere.transformed(&matrix);
        assert_relative_eq!(moved.center, Vec3::new(1.0, 5.0, 0.0));
        assert_relative_eq!(moved.radius, 6.0);
    }
}
