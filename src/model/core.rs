//! Scene graph types produced by the loader

use nalgebra::{Matrix4, Point2, Point3, Rotation3, Vector3};

use super::light::{Camera, Light};
use super::material::MaterialParams;

/// Local transform of a scene group
///
/// Rotation is stored as Euler angles in radians, applied in X, Y, Z order
/// (the combined rotation matrix is `Rx * Ry * Rz`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation
    pub position: Vector3<f64>,
    /// Euler angles (X, Y, Z) in radians
    pub rotation: Vector3<f64>,
    /// Per-axis scale
    pub scale: Vector3<f64>,
}

impl Transform {
    /// The identity transform: no translation, no rotation, unit scale
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// A transform that only rotates
    pub fn from_rotation(rotation: Vector3<f64>) -> Self {
        Self {
            rotation,
            ..Self::identity()
        }
    }

    /// Rotation matrix for the stored Euler angles
    pub fn rotation_matrix(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::x_axis(), self.rotation.x)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), self.rotation.y)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), self.rotation.z)
    }

    /// Compose translation, rotation and scale into a column-vector matrix
    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.position)
            * self.rotation_matrix().to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    /// Check whether this is exactly the identity transform
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// A node in the output hierarchy
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    /// Nested group
    Group(SceneGroup),
    /// Triangle mesh
    Mesh(Mesh),
    /// Light source
    Light(Light),
}

/// A group of scene nodes sharing a local transform
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneGroup {
    /// Local transform relative to the parent group
    pub transform: Transform,
    /// Child nodes in attachment order
    pub children: Vec<SceneNode>,
}

impl SceneGroup {
    /// Create an empty group with the identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct child groups
    pub fn groups(&self) -> impl Iterator<Item = &SceneGroup> {
        self.children.iter().filter_map(|node| match node {
            SceneNode::Group(group) => Some(group),
            _ => None,
        })
    }

    /// Direct child meshes
    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.children.iter().filter_map(|node| match node {
            SceneNode::Mesh(mesh) => Some(mesh),
            _ => None,
        })
    }

    /// Direct child lights
    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.children.iter().filter_map(|node| match node {
            SceneNode::Light(light) => Some(light),
            _ => None,
        })
    }

    /// All meshes in this subtree, depth-first
    pub fn all_meshes(&self) -> Vec<&Mesh> {
        let mut meshes = Vec::new();
        self.collect_meshes(&mut meshes);
        meshes
    }

    fn collect_meshes<'a>(&'a self, out: &mut Vec<&'a Mesh>) {
        for node in &self.children {
            match node {
                SceneNode::Group(group) => group.collect_meshes(out),
                SceneNode::Mesh(mesh) => out.push(mesh),
                SceneNode::Light(_) => {}
            }
        }
    }

    /// All lights in this subtree, depth-first
    pub fn all_lights(&self) -> Vec<&Light> {
        let mut lights: Vec<&Light> = self.lights().collect();
        for group in self.groups() {
            lights.extend(group.all_lights());
        }
        lights
    }
}

/// A triangle with one normal per corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Vertex indices of the three corners
    pub indices: [usize; 3],
    /// Normals of the three corners
    pub normals: [Vector3<f64>; 3],
}

/// A renderable triangle mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Discovery order of the `GeometryModel3D` this mesh came from
    pub model_index: usize,
    /// Vertex positions
    pub vertices: Vec<Point3<f64>>,
    /// Texture coordinates, nominally one per vertex
    pub uvs: Vec<Point2<f64>>,
    /// Triangles
    pub faces: Vec<Face>,
    /// Material parameters
    pub material: MaterialParams,
}

impl Mesh {
    /// Check if the mesh has any triangles
    pub fn has_faces(&self) -> bool {
        !self.faces.is_empty()
    }

    /// Get the number of triangles in the mesh
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Per-face texture coordinates
    ///
    /// Corners whose vertex has no texture coordinate get `(0, 0)`.
    pub fn face_uvs(&self) -> Vec<[Point2<f64>; 3]> {
        let uv = |index: usize| self.uvs.get(index).copied().unwrap_or_else(Point2::origin);
        self.faces
            .iter()
            .map(|face| {
                [
                    uv(face.indices[0]),
                    uv(face.indices[1]),
                    uv(face.indices[2]),
                ]
            })
            .collect()
    }
}

/// Everything delivered to the completion callback of a parse
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedScene {
    /// Root of the scene hierarchy
    pub root: SceneGroup,
    /// Matrix of the first `PerspectiveCamera.Transform`, if any
    pub camera_matrix: Option<Matrix4<f64>>,
    /// First `PerspectiveCamera` of the document, if any
    pub camera: Option<Camera>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity_transform_matrix() {
        let transform = Transform::identity();
        assert!(transform.is_identity());
        assert_eq!(transform.to_matrix(), Matrix4::identity());
    }

    #[test]
    fn test_transform_matrix_applies_scale_then_rotation_then_translation() {
        let transform = Transform {
            position: Vector3::new(10.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, FRAC_PI_2),
            scale: Vector3::new(2.0, 2.0, 2.0),
        };
        let p = transform
            .to_matrix()
            .transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p.x - 10.0).abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn test_face_uvs_default_missing_to_origin() {
        let mesh = Mesh {
            vertices: vec![Point3::origin(); 3],
            uvs: vec![Point2::new(0.25, 0.75)],
            faces: vec![Face {
                indices: [0, 1, 2],
                normals: [Vector3::z(); 3],
            }],
            ..Mesh::default()
        };
        let uvs = mesh.face_uvs();
        assert_eq!(uvs.len(), 1);
        assert_eq!(uvs[0][0], Point2::new(0.25, 0.75));
        assert_eq!(uvs[0][1], Point2::origin());
        assert_eq!(uvs[0][2], Point2::origin());
    }

    #[test]
    fn test_group_queries() {
        let mut inner = SceneGroup::new();
        inner.children.push(SceneNode::Mesh(Mesh::default()));
        let mut root = SceneGroup::new();
        root.children.push(SceneNode::Group(inner));
        root.children.push(SceneNode::Mesh(Mesh::default()));

        assert_eq!(root.groups().count(), 1);
        assert_eq!(root.meshes().count(), 1);
        assert_eq!(root.all_meshes().len(), 2);
        assert!(root.all_lights().is_empty());
    }
}
