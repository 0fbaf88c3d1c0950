use glam::Vec3;

use crate::registry::CameraState;

/// Ray-generation basis consumed by the kernel.
///
/// The kernel places each pixel on the near-clip rectangle spanned by
/// `right * near_clip_width` and `up * near_clip_height`, centered at
/// `position + forward * near_clip_distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub position: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
    pub near_clip_distance: f32,
    pub near_clip_width: f32,
    pub near_clip_height: f32,
}

impl CameraBasis {
    pub fn compute(camera: &CameraState) -> Self {
        let rotation = camera.rotation.normalize();
        let lens = &camera.lens;

        let near_clip_height = Self::near_clip_height(lens.fov_y_degrees.to_radians(), lens.near_clip);
        let near_clip_width = near_clip_height * lens.aspect;

        Self {
            position: camera.position,
            right: rotation * Vec3::X,
            up: rotation * Vec3::Y,
            forward: rotation * Vec3::NEG_Z,
            near_clip_distance: lens.near_clip,
            near_clip_width: near_clip_width.max(f32::MIN_POSITIVE),
            near_clip_height: near_clip_height.max(f32::MIN_POSITIVE),
        }
    }

    /// Height of the near-clip rectangle for a vertical field of view
    pub fn near_clip_height(fov_y_radians: f32, near_clip_distance: f32) -> f32 {
        (fov_y_radians * 0.5).tan() * near_clip_distance * 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::CameraLens;
    use glam::Quat;

    fn camera(rotation: Quat, fov: f32, aspect: f32, near: f32) -> CameraState {
        CameraState {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation,
            lens: CameraLens { fov_y_degrees: fov, aspect, near_clip: near },
        }
    }

    #[test]
    fn identity_camera_looks_down_negative_z() {
        let basis = CameraBasis::compute(&camera(Quat::IDENTITY, 60.0, 1.0, 0.1));
        assert_eq!(basis.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(basis.right, Vec3::X);
        assert_eq!(basis.up, Vec3::Y);
        assert_eq!(basis.forward, Vec3::NEG_Z);
    }

    #[test]
    fn basis_is_orthonormal_for_any_orientation() {
        let rotations = [
            Quat::from_rotation_y(0.7),
            Quat::from_euler(glam::EulerRot::YXZ, 2.1, -0.4, 0.3),
            Quat::from_axis_angle(Vec3::new(1.0, 1.0, 1.0).normalize(), 4.0),
            // Slightly denormalized input is renormalized.
            Quat::from_xyzw(0.1, 0.2, 0.3, 0.95),
        ];

        for rotation in rotations {
            let basis = CameraBasis::compute(&camera(rotation, 75.0, 1.5, 0.3));
            for axis in [basis.right, basis.up, basis.forward] {
                assert!((axis.length() - 1.0).abs() < 1e-5, "axis {axis:?} not unit length");
            }
            assert!(basis.right.dot(basis.up).abs() < 1e-5);
            assert!(basis.right.dot(basis.forward).abs() < 1e-5);
            assert!(basis.up.dot(basis.forward).abs() < 1e-5);
        }
    }

    #[test]
    fn near_clip_rectangle_follows_field_of_view() {
        for fov in [1.0_f32, 30.0, 60.0, 90.0, 120.0, 179.0] {
            for near in [0.01_f32, 0.1, 1.0, 5.0] {
                let basis = CameraBasis::compute(&camera(Quat::IDENTITY, fov, 1.25, near));
                let expected = 2.0 * near * (fov.to_radians() / 2.0).tan();
                assert!((basis.near_clip_height - expected).abs() <= expected * 1e-5);
                assert!((basis.near_clip_width - basis.near_clip_height * 1.25).abs() <= expected * 1e-5);
                assert_eq!(basis.near_clip_distance, near);
            }
        }
    }

    #[test]
    fn ninety_degrees_spans_twice_the_distance() {
        let basis = CameraBasis::compute(&camera(Quat::IDENTITY, 90.0, 2.0, 1.0));
        assert!((basis.near_clip_height - 2.0).abs() < 1e-5);
        assert!((basis.near_clip_width - 4.0).abs() < 1e-5);
    }

    #[test]
    fn extents_stay_positive() {
        let basis = CameraBasis::compute(&camera(Quat::IDENTITY, 60.0, 1.0, 0.0));
        assert!(basis.near_clip_width > 0.0);
        assert!(basis.near_clip_height > 0.0);
    }
}
