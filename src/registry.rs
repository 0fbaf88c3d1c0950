use glam::{Affine3A, Quat, Vec3};
use raytrace_shared::RaytraceMaterial;

use crate::scene::{CameraLens, Component, SceneNode};

/// One sphere as seen this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeInstance {
    pub position: Vec3,
    pub radius: f32,
    pub material: RaytraceMaterial,
}

/// World-space state of the active camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub rotation: Quat,
    pub lens: CameraLens,
}

/// Scans the scene hierarchy for shape and camera components.
///
/// Nothing is cached: every call rescans the whole subtree, which is cheap for
/// the handful of spheres this pipeline targets.
pub struct ShapeRegistry;

impl ShapeRegistry {
    /// Collect every active sphere under `root` in depth-first pre-order
    pub fn collect(root: &SceneNode) -> Vec<ShapeInstance> {
        let mut shapes = Vec::new();
        root.visit_active(&Affine3A::IDENTITY, &mut |node: &SceneNode, world: &Affine3A| {
            if let Some(Component::Sphere(sphere)) = &node.component {
                shapes.push(ShapeInstance {
                    position: world.translation.into(),
                    radius: sphere.radius,
                    material: sphere.material,
                });
            }
        });
        shapes
    }

    /// First active camera under `root`, in the same order as `collect`
    pub fn find_camera(root: &SceneNode) -> Option<CameraState> {
        let mut found = None;
        root.visit_active(&Affine3A::IDENTITY, &mut |node: &SceneNode, world: &Affine3A| {
            if found.is_some() {
                return;
            }
            if let Some(Component::Camera(lens)) = &node.component {
                let (_, rotation, position) = world.to_scale_rotation_translation();
                found = Some(CameraState { position, rotation, lens: *lens });
            }
        });
        found
    }
}
