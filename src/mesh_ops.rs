//! Triangle assembly and normal operations
//!
//! This module turns the flat buffers read from a `MeshGeometry3D` into
//! faces with per-corner normals, synthesizing normals where the document
//! does not provide them, and optionally smooths normals across faces.

use nalgebra::{Point3, Vector3};

use crate::model::{Face, Mesh};

/// Normal shared by the missing corners of a triangle
///
/// This is the normalized sum of the three vertex positions, i.e. the
/// direction from the origin to the triangle's centroid, not the face's
/// edge cross product. A zero sum yields `+X`.
pub fn synthesize_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    (a.coords + b.coords + c.coords)
        .try_normalize(0.0)
        .unwrap_or_else(Vector3::x)
}

/// Assemble triangles from a flat index list
///
/// Corners whose index has a normal keep it unchanged. When any corner of
/// a triangle lacks a normal, one normal is synthesized for that triangle
/// and assigned to every missing corner.
///
/// A trailing partial triangle is dropped, as is any triangle referencing a
/// vertex that does not exist.
pub fn assemble_faces(
    vertices: &[Point3<f64>],
    normals: &[Vector3<f64>],
    indices: &[usize],
) -> Vec<Face> {
    if indices.len() % 3 != 0 {
        log::warn!(
            "Dropping {} trailing triangle indices (count {} is not a multiple of 3)",
            indices.len() % 3,
            indices.len()
        );
    }

    let mut faces = Vec::with_capacity(indices.len() / 3);
    for chunk in indices.chunks_exact(3) {
        let corners = [chunk[0], chunk[1], chunk[2]];

        if corners.iter().any(|&i| i >= vertices.len()) {
            log::warn!(
                "Invalid triangle indices: {:?}, vertex count: {}",
                corners,
                vertices.len()
            );
            continue;
        }

        let authored = corners.map(|i| normals.get(i).copied());
        let normals = if authored.iter().all(Option::is_some) {
            authored.map(|n| n.unwrap_or_else(Vector3::zeros))
        } else {
            let synthesized = synthesize_normal(
                &vertices[corners[0]],
                &vertices[corners[1]],
                &vertices[corners[2]],
            );
            authored.map(|n| n.unwrap_or(synthesized))
        };

        faces.push(Face {
            indices: corners,
            normals,
        });
    }
    faces
}

/// Calculate the normal vector for a single triangle face
///
/// The normal is the normalized cross product of two edges. A degenerate
/// triangle (zero area) yields a zero vector.
pub fn calculate_face_normal(
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> Vector3<f64> {
    (v1 - v0)
        .cross(&(v2 - v0))
        .try_normalize(0.0)
        .unwrap_or_else(Vector3::zeros)
}

/// Calculate area-weighted vertex normals for a mesh
///
/// For each vertex, the unnormalized cross products of all adjacent faces
/// are summed (the magnitude of each is twice the face area) and the sum is
/// normalized. Vertices not referenced by any non-degenerate face get
/// `(0, 0, 0)`.
pub fn calculate_vertex_normals(mesh: &Mesh) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); mesh.vertices.len()];

    for face in &mesh.faces {
        let [i0, i1, i2] = face.indices;
        if i0 >= mesh.vertices.len() || i1 >= mesh.vertices.len() || i2 >= mesh.vertices.len() {
            continue;
        }

        let v0 = &mesh.vertices[i0];
        let area_weighted_normal = (mesh.vertices[i1] - v0).cross(&(mesh.vertices[i2] - v0));
        if area_weighted_normal.norm() > 0.0 {
            for index in face.indices {
                normals[index] += area_weighted_normal;
            }
        }
    }

    normals
        .into_iter()
        .map(|n| n.try_normalize(0.0).unwrap_or_else(Vector3::zeros))
        .collect()
}

/// Replace every face corner normal with the smooth vertex normal
///
/// Corners whose vertex has no smooth normal (only degenerate faces) keep
/// their current normal.
pub fn smooth_vertex_normals(mesh: &mut Mesh) {
    let smooth = calculate_vertex_normals(mesh);
    for face in &mut mesh.faces {
        for (corner, &index) in face.normals.iter_mut().zip(face.indices.iter()) {
            let normal = smooth[index];
            if normal != Vector3::zeros() {
                *corner = normal;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<Point3<f64>> {
        vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn test_synthesize_normal_is_normalized_position_sum() {
        let v = triangle();
        let n = synthesize_normal(&v[0], &v[1], &v[2]);
        let expected = Vector3::new(1.0, 1.0, 1.0).normalize();
        assert!((n - expected).norm() < 1e-12);
    }

    #[test]
    fn test_synthesize_normal_zero_sum_falls_back_to_x() {
        let n = synthesize_normal(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(-1.0, 0.0, 0.0),
            &Point3::origin(),
        );
        assert_eq!(n, Vector3::x());
    }

    #[test]
    fn test_assemble_faces_keeps_authored_normals() {
        let normals = vec![Vector3::new(0.0, 0.0, 2.0); 3];
        let faces = assemble_faces(&triangle(), &normals, &[0, 1, 2]);
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].normals, [Vector3::new(0.0, 0.0, 2.0); 3]);
    }

    #[test]
    fn test_assemble_faces_fills_only_missing_corners() {
        // Only vertex 0 has a normal
        let normals = vec![Vector3::new(0.0, 1.0, 0.0)];
        let faces = assemble_faces(&triangle(), &normals, &[0, 1, 2]);
        let synthesized = Vector3::new(1.0, 1.0, 1.0).normalize();
        assert_eq!(faces[0].normals[0], Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(faces[0].normals[1], synthesized);
        assert_eq!(faces[0].normals[2], synthesized);
    }

    #[test]
    fn test_assemble_faces_drops_partial_and_invalid_triangles() {
        let faces = assemble_faces(&triangle(), &[], &[0, 1, 2, 0, 1, 9, 2, 1]);
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].indices, [0, 1, 2]);
    }

    #[test]
    fn test_calculate_face_normal_simple() {
        let n = calculate_face_normal(
            &Point3::origin(),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        );
        assert_eq!(n, Vector3::z());
    }

    #[test]
    fn test_calculate_face_normal_degenerate() {
        let n = calculate_face_normal(
            &Point3::origin(),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert_eq!(n, Vector3::zeros());
    }

    #[test]
    fn test_smooth_vertex_normals_flat_quad() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let faces = assemble_faces(&vertices, &[], &[0, 1, 2, 0, 2, 3]);
        let mut mesh = Mesh {
            vertices,
            faces,
            ..Mesh::default()
        };
        smooth_vertex_normals(&mut mesh);
        for face in &mesh.faces {
            for normal in face.normals {
                assert!((normal - Vector3::z()).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_calculate_vertex_normals_unreferenced_vertex() {
        let mut vertices = triangle();
        vertices.push(Point3::new(5.0, 5.0, 5.0));
        let faces = assemble_faces(&vertices, &[], &[0, 1, 2]);
        let mesh = Mesh {
            vertices,
            faces,
            ..Mesh::default()
        };
        let normals = calculate_vertex_normals(&mesh);
        assert_eq!(normals.len(), 4);
        assert_eq!(normals[3], Vector3::zeros());
    }
}
