//! GPU-ready per-instance transform.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// Column-major 4×4 model matrix, 64 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceTransform {
    /// Matrix columns.
    pub model: [[f32; 4]; 4],
}

impl InstanceTransform {
    /// Zero-scale transform written into released slots: every vertex
    /// collapses to the origin so the slot draws nothing.
    pub const HIDDEN: Self = Self {
        model: [[0.0; 4]; 4],
    };

    /// Identity transform.
    pub const IDENTITY: Self = Self {
        model: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Transform for a placement: uniform scale, rotation about +Y, then
    /// translation.
    pub fn from_placement(position: Vec3, rotation_y: f32, scale: f32) -> Self {
        Self::from_mat4(Mat4::from_scale_rotation_translation(
            Vec3::splat(scale),
            Quat::from_rotation_y(rotation_y),
            position,
        ))
    }

    /// Wrap a glam matrix.
    pub fn from_mat4(m: Mat4) -> Self {
        Self {
            model: m.to_cols_array_2d(),
        }
    }

    /// As a glam matrix.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    /// Translation component.
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.model[3][0], self.model[3][1], self.model[3][2])
    }

    /// Length of the X basis column; the uniform scale for placement
    /// transforms.
    pub fn scale(&self) -> f32 {
        Vec3::new(self.model[0][0], self.model[0][1], self.model[0][2]).length()
    }

    /// Whether this transform draws nothing.
    pub fn is_hidden(&self) -> bool {
        self.scale() == 0.0
    }
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_is_64_bytes() {
        assert_eq!(std::mem::size_of::<InstanceTransform>(), 64);
    }

    #[test]
    fn test_from_placement_components() {
        let t = InstanceTransform::from_placement(Vec3::new(1.0, 2.0, 3.0), 0.5, 2.0);
        assert_eq!(t.translation(), Vec3::new(1.0, 2.0, 3.0));
        assert!((t.scale() - 2.0).abs() < 1e-6);
        assert!(!t.is_hidden());
    }

    #[test]
    fn test_rotation_about_y_keeps_up_axis() {
        let t = InstanceTransform::from_placement(Vec3::ZERO, 1.3, 1.0);
        let up = t.to_mat4().transform_vector3(Vec3::Y);
        assert!((up - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_hidden_is_zero_scale() {
        assert!(InstanceTransform::HIDDEN.is_hidden());
        let bytes: &[u8] = bytemuck::bytes_of(&InstanceTransform::HIDDEN);
        assert!(bytes.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_mat4_roundtrip() {
        let m = Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(InstanceTransform::from_mat4(m).to_mat4(), m);
    }
}
