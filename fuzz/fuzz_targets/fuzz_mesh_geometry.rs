#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz the numeric attribute repair paths with arbitrary attribute text
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;");
    let xaml = format!(
        r#"<ModelVisual3D><ModelVisual3D.Content><GeometryModel3D><MeshGeometry3D Positions="{0}" Normals="{0}" TextureCoordinates="{0}" TriangleIndices="{0}"/></GeometryModel3D></ModelVisual3D.Content></ModelVisual3D>"#,
        escaped
    );
    if let Ok(scene) = xaml3d::parse_str(&xaml) {
        for mesh in scene.root.all_meshes() {
            let _ = mesh.face_uvs();
        }
    }
});
