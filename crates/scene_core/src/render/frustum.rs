//! View frustum for visibility culling

use crate::foundation::math::{Mat4, Sphere, Vec3, Vec4};

/// Plane defined by normal and distance from origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (normalized, pointing into the kept half-space)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        let length = normal.magnitude();
        Self {
            normal: normal / length,
            distance: distance / length,
        }
    }

    /// Create a plane from `ax + by + cz + d = 0` coefficients
    pub fn from_coefficients(coefficients: Vec4) -> Self {
        Self::new(coefficients.xyz(), coefficients.w)
    }

    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// Frustum for visibility culling
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    /// Six planes defining the frustum (left, right, bottom, top, near, far)
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Uses the Gribb-Hartmann method for a clip space with depth in
    /// `[-1, 1]`; the planes live in whatever space the matrix maps from.
    pub fn from_matrix(view_projection: &Mat4) -> Self {
        let row = |i: usize| -> Vec4 { view_projection.row(i).transpose() };
        let (x, y, z, w) = (row(0), row(1), row(2), row(3));

        Self::new([
            Plane::from_coefficients(w + x),
            Plane::from_coefficients(w - x),
            Plane::from_coefficients(w + y),
            Plane::from_coefficients(w - y),
            Plane::from_coefficients(w + z),
            Plane::from_coefficients(w - z),
        ])
    }

    /// Check if a sphere is inside or intersects the frustum
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(&sphere.center) >= -sphere.radius)
    }
}
