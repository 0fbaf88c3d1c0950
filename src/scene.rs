use glam::{Affine3A, Quat, Vec3};
use raytrace_shared::{RaytraceMaterial, RaytracerConfig};

/// Local transform of a scene node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::IDENTITY }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Orient so that -Z points from `translation` towards `target`
    pub fn looking_at(mut self, target: Vec3, up: Vec3) -> Self {
        let forward = (target - self.translation).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);
        self.rotation = Quat::from_mat3(&glam::Mat3::from_cols(right, up, -forward));
        self
    }

    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_rotation_translation(self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Sphere capability: radius and surface of an analytic sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereShape {
    pub radius: f32,
    pub material: RaytraceMaterial,
}

/// Camera capability: projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraLens {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near_clip: f32,
}

impl Default for CameraLens {
    fn default() -> Self {
        Self {
            fov_y_degrees: RaytracerConfig::DEFAULT_FOV_Y_DEGREES,
            aspect: RaytracerConfig::DEFAULT_OUTPUT_WIDTH as f32 / RaytracerConfig::DEFAULT_OUTPUT_HEIGHT as f32,
            near_clip: RaytracerConfig::DEFAULT_NEAR_CLIP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Component {
    Sphere(SphereShape),
    Camera(CameraLens),
}

/// A node in the scene hierarchy
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub active: bool,
    pub component: Option<Component>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            active: true,
            component: None,
            children: Vec::new(),
        }
    }

    pub fn sphere(name: impl Into<String>, position: Vec3, radius: f32, material: RaytraceMaterial) -> Self {
        Self::new(name)
            .with_transform(Transform::from_translation(position))
            .with_component(Component::Sphere(SphereShape { radius, material }))
    }

    pub fn camera(name: impl Into<String>, transform: Transform, lens: CameraLens) -> Self {
        Self::new(name)
            .with_transform(transform)
            .with_component(Component::Camera(lens))
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.component = Some(component);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    #[cfg(test)]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Depth-first search by name, including inactive nodes
    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(name))
    }

    /// Visit every active node in pre-order with its world transform
    pub fn visit_active<F>(&self, parent: &Affine3A, f: &mut F)
    where
        F: FnMut(&SceneNode, &Affine3A),
    {
        if !self.active {
            return;
        }
        let world = *parent * self.transform.to_affine();
        f(self, &world);
        for child in &self.children {
            child.visit_active(&world, f);
        }
    }
}

/// Demo scene used by the binary
pub struct SceneBuilder;

impl SceneBuilder {
    pub fn build_default_scene(aspect: f32) -> SceneNode {
        let camera = SceneNode::camera(
            "Main Camera",
            Transform::from_translation(Vec3::new(0.0, 1.0, 6.0)).looking_at(Vec3::new(0.0, 0.5, 0.0), Vec3::Y),
            CameraLens { aspect, ..CameraLens::default() },
        );

        let orbit = SceneNode::new("Orbit")
            .with_transform(Transform::from_translation(Vec3::new(0.0, 0.5, 0.0)).with_rotation(Quat::from_rotation_y(0.4)))
            .with_child(SceneNode::sphere("Gold", Vec3::new(-1.6, 0.0, 0.0), 0.5, RaytraceMaterial::metal([1.0, 0.8, 0.3, 1.0], 0.9)))
            .with_child(SceneNode::sphere("Red", Vec3::new(0.0, 0.0, 0.0), 0.5, RaytraceMaterial::diffuse([0.8, 0.2, 0.2, 1.0])))
            .with_child(SceneNode::sphere("Chrome", Vec3::new(1.6, 0.0, 0.0), 0.5, RaytraceMaterial::metal([0.9, 0.9, 0.9, 1.0], 0.6)));

        SceneNode::new("Raytracer")
            .with_child(camera)
            .with_child(SceneNode::sphere("Ground", Vec3::new(0.0, -1000.0, 0.0), 1000.0, RaytraceMaterial::diffuse([0.5, 0.5, 0.5, 1.0])))
            .with_child(orbit)
            .with_child(SceneNode::sphere("Lamp", Vec3::new(-2.0, 3.0, -2.0), 0.4, RaytraceMaterial::emissive([1.0, 0.9, 0.6, 1.0], 2.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_at_points_forward_axis_at_target() {
        let transform = Transform::from_translation(Vec3::new(0.0, 0.0, 5.0)).looking_at(Vec3::ZERO, Vec3::Y);
        let forward = transform.rotation * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn visit_skips_inactive_subtrees() {
        let root = SceneNode::new("root")
            .with_child(SceneNode::new("hidden").inactive().with_child(SceneNode::new("grandchild")))
            .with_child(SceneNode::new("shown"));

        let mut names = Vec::new();
        root.visit_active(&Affine3A::IDENTITY, &mut |node: &SceneNode, _: &Affine3A| names.push(node.name.clone()));
        assert_eq!(names, ["root", "shown"]);
    }

    #[test]
    fn find_mut_reaches_nested_nodes() {
        let mut scene = SceneBuilder::build_default_scene(1.0);
        let red = scene.find_mut("Red").unwrap();
        red.active = false;
        assert!(!scene.find_mut("Red").unwrap().active);
        assert!(scene.find_mut("Missing").is_none());
    }
}
