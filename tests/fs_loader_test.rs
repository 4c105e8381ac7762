//! Tests for loading documents and textures from the filesystem

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use tempfile::TempDir;
use xaml3d::{Progress, XamlLoader, base_url_of};

const TEXTURED: &str = r#"<Viewport3D>
  <Viewport3D.Children>
    <ModelVisual3D>
      <ModelVisual3D.Content>
        <GeometryModel3D>
          <MeshGeometry3D Positions="0 0 0 1 0 0 0 1 0" TriangleIndices="0 1 2"/>
          <MaterialGroup>
            <DiffuseMaterial><ImageBrush ImageSource="textures/checker.png"/></DiffuseMaterial>
          </MaterialGroup>
        </GeometryModel3D>
      </ModelVisual3D.Content>
    </ModelVisual3D>
  </Viewport3D.Children>
</Viewport3D>"#;

fn write_scene(dir: &TempDir) -> String {
    fs::create_dir_all(dir.path().join("textures")).unwrap();
    fs::write(dir.path().join("textures/checker.png"), [0x89, b'P', b'N', b'G']).unwrap();
    let path = dir.path().join("scene.xaml");
    fs::write(&path, TEXTURED).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_load_from_filesystem() {
    let dir = TempDir::new().unwrap();
    let url = write_scene(&dir);
    assert!(base_url_of(&url).ends_with('/') || base_url_of(&url).ends_with('\\'));

    let scene = Rc::new(RefCell::new(None));
    let progress = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&scene);
    let events = Rc::clone(&progress);

    XamlLoader::new().load(
        &url,
        move |loaded| *sink.borrow_mut() = Some(loaded),
        Some(Box::new(move |p: Progress| events.borrow_mut().push(p))),
        |err| panic!("unexpected error: {}", err),
    );

    let scene = scene.borrow_mut().take().unwrap();
    let map = scene.root.all_meshes()[0].material.map.clone().unwrap();
    assert!(map.url.ends_with("textures/checker.png"));
    assert_eq!(map.texture.unwrap().data, vec![0x89, b'P', b'N', b'G']);

    let size = TEXTURED.len() as u64;
    assert_eq!(
        *progress.borrow(),
        vec![Progress {
            loaded: size,
            total: Some(size)
        }]
    );
}

#[test]
fn test_missing_texture_file_reports_error_and_still_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scene.xaml");
    fs::write(&path, TEXTURED).unwrap();

    let scene = Rc::new(RefCell::new(None));
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&scene);
    let reported = Rc::clone(&errors);
    XamlLoader::new().load(
        path.to_str().unwrap(),
        move |loaded| *sink.borrow_mut() = Some(loaded),
        None,
        move |err| reported.borrow_mut().push(err),
    );

    let scene = scene.borrow_mut().take().unwrap();
    let map = scene.root.all_meshes()[0].material.map.clone().unwrap();
    assert!(map.texture.is_none());

    let errors = errors.borrow();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), "E1002");
    assert!(errors[0].to_string().contains("checker.png"));
}

#[test]
fn test_missing_document_reports_fetch_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.xaml");

    let error = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&error);
    XamlLoader::new().load(
        path.to_str().unwrap(),
        |_| panic!("scene must not load"),
        None,
        move |err| *sink.borrow_mut() = Some(err),
    );

    let error = error.borrow_mut().take().unwrap();
    assert_eq!(error.code(), "E1002");
    assert!(error.to_string().contains("absent.xaml"));
}

#[test]
fn test_utf16_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("utf16.xaml");
    let mut bytes = vec![0xFF, 0xFE];
    for unit in TEXTURED.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    fs::write(&path, bytes).unwrap();

    let meshes = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&meshes);
    XamlLoader::new().load(
        path.to_str().unwrap(),
        move |loaded| *sink.borrow_mut() = Some(loaded.root.all_meshes().len()),
        None,
        |err| panic!("unexpected error: {}", err),
    );
    assert_eq!(*meshes.borrow(), Some(1));
}

#[test]
fn test_invalid_encoding_reports_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("binary.xaml");
    fs::write(&path, [0xC3, 0x28, 0xA0, 0xA1]).unwrap();

    let code = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&code);
    XamlLoader::new().load(
        path.to_str().unwrap(),
        |_| panic!("scene must not load"),
        None,
        move |err| *sink.borrow_mut() = Some(err.code()),
    );
    assert_eq!(*code.borrow(), Some("E2004"));
}
