//! XAML document walker
//!
//! One parse session walks the element tree once, depth-first. Groups,
//! lights and pending meshes are accumulated in a scene draft owned by
//! the session; texture fetches are dispatched as they are discovered.
//! Once traversal is done the draft is handed to a countdown latch, and the
//! scene is finalized when the last outstanding texture completes.

mod geometry;
mod light;
mod material;
mod resource;
mod transform;

use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::{Matrix4, Point2, Point3, Vector3};

use crate::error::Result;
use crate::latch::CountdownLatch;
use crate::loading::{ErrorSink, TextureCompletion, TextureLoader};
use crate::mesh_ops::{assemble_faces, smooth_vertex_normals};
use crate::model::{
    Camera, Color, Light, LoadedScene, MaterialParams, Mesh, ParserConfig, SceneGroup, SceneNode,
    Texture, TextureMap, Transform,
};
use crate::xml::{Document, Element};

use geometry::extract_geometry;
use light::{LightKind, find_camera, find_camera_matrix, parse_light};
use material::{Brush, parse_brush};
use resource::resolve_reference;
use transform::{apply_scale, find_matrix, parse_axis_angle};

pub use material::parse_color;
pub use resource::resource_key;
pub use transform::{decompose_matrix, tait_bryan_angles};

/// Tags of root children that are traversed
const ROOT_CHILD_TAGS: [&str; 3] = ["Model3DGroup", "ModelVisual3D", "ModelVisual3D.Content"];

/// Classification of an element encountered during traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    /// Transparent wrapper whose children attach to the current group
    Container,
    /// Creates a nested group
    Group,
    /// Transform of the current group
    Transform,
    /// `GeometryModel3D`
    Mesh,
    /// A light source
    Light(LightKind),
    /// Anything else; skipped
    Other,
}

impl NodeKind {
    fn classify(element: &Element) -> Self {
        match element.name.as_str() {
            "Model3DGroup.Children" | "ModelVisual3D.Content" | "ModelVisual3D.Children" => {
                NodeKind::Container
            }
            "Model3DGroup" | "ModelVisual3D" => NodeKind::Group,
            "Model3DGroup.Transform" => NodeKind::Transform,
            "GeometryModel3D" => NodeKind::Mesh,
            name => LightKind::from_tag(name).map_or(NodeKind::Other, NodeKind::Light),
        }
    }
}

/// Index of a group in the draft's arena; the root is `0`
type GroupId = usize;

const ROOT_GROUP: GroupId = 0;

enum ChildSlot {
    Group(GroupId),
    Light(Light),
    Mesh(Mesh),
}

#[derive(Default)]
struct GroupSlot {
    transform: Transform,
    children: Vec<ChildSlot>,
}

/// Image map whose texture may still be in flight
struct PendingTexture {
    url: String,
    slot: Option<Rc<RefCell<Option<Texture>>>>,
}

impl PendingTexture {
    fn finish(self) -> TextureMap {
        let texture = self.slot.and_then(|slot| slot.borrow_mut().take());
        TextureMap {
            url: self.url,
            texture,
        }
    }
}

#[derive(Default)]
struct PendingMaterial {
    color: Option<Color>,
    map: Option<PendingTexture>,
    specular: Option<Color>,
    specular_map: Option<PendingTexture>,
}

impl PendingMaterial {
    fn finish(self) -> MaterialParams {
        MaterialParams {
            color: self.color,
            map: self.map.map(PendingTexture::finish),
            specular: self.specular,
            specular_map: self.specular_map.map(PendingTexture::finish),
        }
    }
}

/// One `GeometryModel3D`, waiting for finalization
struct PendingMesh {
    model_index: usize,
    group: GroupId,
    vertices: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    uvs: Vec<Point2<f64>>,
    indices: Vec<usize>,
    material: PendingMaterial,
}

/// Everything accumulated by one parse session
struct SceneDraft {
    groups: Vec<GroupSlot>,
    meshes: Vec<PendingMesh>,
    camera_matrix: Option<Matrix4<f64>>,
    camera: Option<Camera>,
}

impl SceneDraft {
    fn new() -> Self {
        Self {
            groups: vec![GroupSlot::default()],
            meshes: Vec::new(),
            camera_matrix: None,
            camera: None,
        }
    }

    fn add_group(&mut self, parent: GroupId, transform: Transform) -> GroupId {
        let id = self.groups.len();
        self.groups.push(GroupSlot {
            transform,
            children: Vec::new(),
        });
        self.groups[parent].children.push(ChildSlot::Group(id));
        id
    }

    /// Build meshes and assemble the final hierarchy
    fn finalize(mut self, smooth_normals: bool) -> LoadedScene {
        let pending = std::mem::take(&mut self.meshes);
        let mut built = 0;
        for pending in pending {
            if pending.vertices.is_empty() {
                log::debug!("GeometryModel3D #{} has no geometry, skipping", pending.model_index);
                continue;
            }
            let faces = assemble_faces(&pending.vertices, &pending.normals, &pending.indices);
            let mut mesh = Mesh {
                model_index: pending.model_index,
                vertices: pending.vertices,
                uvs: pending.uvs,
                faces,
                material: pending.material.finish(),
            };
            if smooth_normals {
                smooth_vertex_normals(&mut mesh);
            }
            self.groups[pending.group].children.push(ChildSlot::Mesh(mesh));
            built += 1;
        }

        // Child ids are always greater than their parent's, so building in
        // reverse id order sees every child before its parent.
        let mut finished: Vec<Option<SceneGroup>> = Vec::with_capacity(self.groups.len());
        finished.resize_with(self.groups.len(), || None);
        for (id, slot) in self.groups.into_iter().enumerate().rev() {
            let children = slot
                .children
                .into_iter()
                .filter_map(|child| match child {
                    ChildSlot::Group(child_id) => finished[child_id].take().map(SceneNode::Group),
                    ChildSlot::Light(light) => Some(SceneNode::Light(light)),
                    ChildSlot::Mesh(mesh) => Some(SceneNode::Mesh(mesh)),
                })
                .collect();
            finished[id] = Some(SceneGroup {
                transform: slot.transform,
                children,
            });
        }

        log::debug!("Finalized scene with {} meshes", built);
        LoadedScene {
            root: finished
                .into_iter()
                .next()
                .flatten()
                .unwrap_or_default(),
            camera_matrix: self.camera_matrix,
            camera: self.camera,
        }
    }
}

/// Texture loader plus the latch its completions hold tokens on
struct TextureDispatch<'a> {
    loader: &'a dyn TextureLoader,
    latch: &'a CountdownLatch,
    errors: Option<&'a ErrorSink>,
}

/// Traversal state of one parse session
struct Walker<'a> {
    document: &'a Document,
    base_url: &'a str,
    config: &'a ParserConfig,
    textures: Option<TextureDispatch<'a>>,
    draft: SceneDraft,
}

impl<'a> Walker<'a> {
    /// Locate the scene root and walk it
    fn walk_document(&mut self) {
        let document = self.document;
        let root = document
            .first_element_by_tag_name("Viewport3D.Children")
            .or_else(|| document.first_element_by_tag_name("ModelVisual3D"));

        let Some(root) = root else {
            log::debug!("No Viewport3D.Children or ModelVisual3D found, scene is empty");
            return;
        };
        log::debug!("Scene root is <{}>", root.name);

        // Root-level visuals and groups contribute their children to the root group
        for child in &root.children {
            if ROOT_CHILD_TAGS.contains(&child.name.as_str()) {
                self.walk_children(child, ROOT_GROUP);
            }
        }
    }

    /// Dispatch one node, returning the group later siblings attach to
    fn walk_node(&mut self, node: &Element, group: GroupId) -> GroupId {
        match NodeKind::classify(node) {
            NodeKind::Container => {
                self.walk_children(node, group);
                group
            }
            NodeKind::Group => {
                let child = self.draft.add_group(group, Transform::identity());
                self.walk_children(node, child);
                group
            }
            NodeKind::Transform => self.apply_transform(node, group),
            NodeKind::Mesh => {
                self.add_mesh(node, group);
                group
            }
            NodeKind::Light(kind) => {
                let light = parse_light(node, kind);
                self.draft.groups[group].children.push(ChildSlot::Light(light));
                group
            }
            NodeKind::Other => group,
        }
    }

    fn walk_children(&mut self, node: &Element, group: GroupId) {
        let mut target = group;
        for child in &node.children {
            target = self.walk_node(child, target);
        }
    }

    /// Apply a `Model3DGroup.Transform` to `group`
    ///
    /// The matrix sets the transform of `group`. Each `AxisAngleRotation3D`
    /// nests a rotation-only group inside the previous one, and the scale
    /// override applies to the innermost group. Returns that innermost group,
    /// or `group` itself when there are no rotations.
    fn apply_transform(&mut self, node: &Element, group: GroupId) -> GroupId {
        if let Some(matrix) = find_matrix(node) {
            self.draft.groups[group].transform = decompose_matrix(&matrix);
        }

        let mut target = group;
        for rotation in node.descendants_by_tag_name("AxisAngleRotation3D") {
            match parse_axis_angle(rotation) {
                Some(euler) => {
                    target = self.draft.add_group(target, Transform::from_rotation(euler));
                }
                None => log::debug!("Skipping malformed AxisAngleRotation3D"),
            }
        }

        if let Some(scale) = node.find_child("ScaleTransform3D", true) {
            apply_scale(scale, &mut self.draft.groups[target].transform.scale);
        }
        target
    }

    /// Record a `GeometryModel3D` as a pending mesh of `group`
    fn add_mesh(&mut self, node: &Element, group: GroupId) {
        let document = self.document;
        let model_index = self.draft.meshes.len();

        let geometry = node
            .find_child("MeshGeometry3D", true)
            .or_else(|| resolve_reference(document, node, "Geometry", "MeshGeometry3D"));

        let mut pending = PendingMesh {
            model_index,
            group,
            vertices: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
            material: PendingMaterial::default(),
        };

        if let Some(geometry) = geometry {
            let buffers = extract_geometry(geometry, self.config);
            pending.vertices = buffers.vertices;
            pending.normals = buffers.normals;
            pending.uvs = buffers.uvs;
            pending.indices = buffers.indices;

            let material = resolve_reference(document, node, "Material", "MaterialGroup")
                .or_else(|| node.find_child("MaterialGroup", true))
                .or_else(|| node.find_child("GeometryModel3D.Material", false));
            if let Some(material) = material {
                pending.material = self.parse_material(material);
            }
        } else {
            log::warn!("GeometryModel3D #{} has no resolvable geometry", model_index);
        }

        log::debug!(
            "GeometryModel3D #{}: {} vertices, {} indices",
            model_index,
            pending.vertices.len(),
            pending.indices.len()
        );
        self.draft.meshes.push(pending);
    }

    fn parse_material(&self, material: &Element) -> PendingMaterial {
        let mut params = PendingMaterial::default();

        if let Some(diffuse) = material.find_child("DiffuseMaterial", true) {
            match parse_brush(diffuse) {
                Some(Brush::Solid(color)) => params.color = Some(color),
                Some(Brush::Image(source)) => params.map = Some(self.request_texture(&source)),
                None => {}
            }
        }
        if let Some(specular) = material.find_child("SpecularMaterial", true) {
            match parse_brush(specular) {
                Some(Brush::Solid(color)) => params.specular = Some(color),
                Some(Brush::Image(source)) => {
                    params.specular_map = Some(self.request_texture(&source));
                }
                None => {}
            }
        }
        params
    }

    /// Dispatch a texture fetch for an `ImageSource`, if loading is enabled
    fn request_texture(&self, source: &str) -> PendingTexture {
        let url = format!("{}{}", self.base_url, source);
        let slot = match &self.textures {
            Some(dispatch) if self.config.load_textures() => {
                let slot = Rc::new(RefCell::new(None));
                let completion = TextureCompletion::new(
                    url.clone(),
                    Rc::clone(&slot),
                    dispatch.errors.cloned(),
                    dispatch.latch.token(),
                );
                log::debug!("Requesting texture '{}'", url);
                dispatch.loader.load(&url, completion);
                Some(slot)
            }
            _ => None,
        };
        PendingTexture { url, slot }
    }

    fn camera_pass(&mut self) {
        self.draft.camera_matrix = find_camera_matrix(self.document);
        self.draft.camera = find_camera(self.document);
    }
}

/// Parse a XAML document and deliver the scene to `on_load`
///
/// Returns an error only if the XML itself is malformed, in which case
/// `on_load` is never called. Otherwise `on_load` runs exactly once: before
/// this function returns when no texture is outstanding, or from the last
/// texture completion. Texture failures go to `errors`, when given, before
/// `on_load` runs.
pub(crate) fn parse_document(
    text: &str,
    base_url: &str,
    config: &ParserConfig,
    textures: Option<&dyn TextureLoader>,
    errors: Option<&ErrorSink>,
    on_load: Box<dyn FnOnce(LoadedScene)>,
) -> Result<()> {
    let document = Document::parse(text)?;
    let latch = CountdownLatch::new();
    let traversal = latch.token();

    let mut walker = Walker {
        document: &document,
        base_url,
        config,
        textures: textures.map(|loader| TextureDispatch {
            loader,
            latch: &latch,
            errors,
        }),
        draft: SceneDraft::new(),
    };
    walker.walk_document();
    walker.camera_pass();

    let draft = walker.draft;
    let smooth_normals = config.smooth_vertex_normals();
    latch.arm(move || on_load(draft.finalize(smooth_normals)));
    drop(traversal);
    Ok(())
}
