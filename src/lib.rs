//! # xaml3d
//!
//! A pure Rust loader for XAML 3D scene descriptions.
//!
//! This library reads the 3D subset of XAML (`Viewport3D`, `ModelVisual3D`,
//! `Model3DGroup`, `GeometryModel3D`, lights and cameras) and translates it
//! into an in-memory scene graph of transform groups, triangle meshes,
//! materials and lights, ready to hand to a renderer.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Matrix, axis-angle and scale transforms decomposed into
//!   position/rotation/scale groups
//! - `{StaticResource key}` geometry and material references
//! - Permissive numeric parsing that repairs malformed data instead of failing
//! - Normal synthesis for triangles whose normals are missing
//! - Pluggable document and texture fetching, with finalization deferred
//!   until every texture has completed
//!
//! ## Example
//!
//! ```
//! use xaml3d::parse_str;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let xaml = r##"
//! <ModelVisual3D>
//!   <ModelVisual3D.Content>
//!     <GeometryModel3D>
//!       <GeometryModel3D.Geometry>
//!         <MeshGeometry3D Positions="0,0,0 1,0,0 0,1,0" TriangleIndices="0 1 2"/>
//!       </GeometryModel3D.Geometry>
//!       <GeometryModel3D.Material>
//!         <MaterialGroup><DiffuseMaterial Brush="#FF0000"/></MaterialGroup>
//!       </GeometryModel3D.Material>
//!     </GeometryModel3D>
//!   </ModelVisual3D.Content>
//! </ModelVisual3D>"##;
//!
//! let scene = parse_str(xaml)?;
//! let meshes = scene.root.all_meshes();
//! println!("Scene contains {} meshes", meshes.len());
//! assert_eq!(meshes[0].face_count(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
mod latch;
mod loader;
pub mod loading;
pub mod mesh_ops;
pub mod model;
pub mod parser;
pub mod xml;

pub use error::{Error, Result};
pub use loader::{XamlLoader, base_url_of};
pub use loading::{
    DocumentCallback, DocumentLoader, FsDocumentLoader, FsTextureLoader, Progress,
    ProgressCallback, TextureCompletion, TextureLoader,
};
pub use model::{
    Camera, Color, Face, Light, LoadedScene, MaterialParams, Mesh, ParserConfig, SceneGroup,
    SceneNode, Texture, TextureMap, Transform, next_power_of_two,
};

use std::cell::RefCell;
use std::rc::Rc;

/// Parse XAML text into a scene synchronously
///
/// This uses the default parser configuration. No textures are fetched:
/// every image brush is recorded as a [`TextureMap`] holding only its URL.
///
/// # Example
///
/// ```
/// let scene = xaml3d::parse_str("<ModelVisual3D/>").unwrap();
/// assert!(scene.root.children.is_empty());
/// ```
pub fn parse_str(text: &str) -> Result<LoadedScene> {
    parse_str_with_config(text, &ParserConfig::new())
}

/// Parse XAML text into a scene synchronously with custom configuration
///
/// Texture fetching is never performed, regardless of
/// [`ParserConfig::load_textures`].
pub fn parse_str_with_config(text: &str, config: &ParserConfig) -> Result<LoadedScene> {
    let scene = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&scene);
    parser::parse_document(
        text,
        "",
        config,
        None,
        None,
        Box::new(move |loaded| *sink.borrow_mut() = Some(loaded)),
    )?;

    // Without a texture loader the scene is finalized before parse_document returns
    let loaded = scene.borrow_mut().take();
    loaded.ok_or_else(|| Error::InvalidXml("scene was not finalized".to_string()))
}
