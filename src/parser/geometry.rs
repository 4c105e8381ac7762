//! `MeshGeometry3D` buffer extraction
//!
//! Numeric attributes are split on runs of spaces and commas. Every parse
//! failure is repaired in place so that buffer lengths stay predictable:
//! failing components become `0`, failing indices become `1`. Negative
//! indices are integers, so they are kept as out-of-range values and the
//! triangles using them are dropped during face assembly.

use nalgebra::{Point2, Point3, Vector3};

use crate::model::ParserConfig;
use crate::xml::Element;

/// Index substituted for triangle-index tokens that are not integers
pub(crate) const FALLBACK_INDEX: usize = 1;

/// Placeholder emitted before a recovered UV pair in legacy padding mode
const LEGACY_UV_PLACEHOLDER: (f64, f64) = (0.5, 0.5);

/// Raw buffers read from one `MeshGeometry3D`
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct GeometryBuffers {
    pub vertices: Vec<Point3<f64>>,
    pub normals: Vec<Vector3<f64>>,
    pub uvs: Vec<Point2<f64>>,
    pub indices: Vec<usize>,
}

/// Read the `Positions`, `Normals`, `TextureCoordinates` and `TriangleIndices` attributes
pub(crate) fn extract_geometry(geometry: &Element, config: &ParserConfig) -> GeometryBuffers {
    let mut buffers = GeometryBuffers::default();

    if let Some(value) = geometry.attribute("Positions") {
        buffers.vertices = parse_positions(value);
    }
    if let Some(value) = geometry.attribute("Normals") {
        buffers.normals = parse_normals(value);
    }
    if let Some(value) = geometry.attribute("TextureCoordinates") {
        buffers.uvs = parse_texture_coordinates(value, config.legacy_uv_padding());
    }
    if let Some(value) = geometry.attribute("TriangleIndices") {
        buffers.indices = parse_triangle_indices(value);
    }

    log::trace!(
        "MeshGeometry3D: {} positions, {} normals, {} uvs, {} indices",
        buffers.vertices.len(),
        buffers.normals.len(),
        buffers.uvs.len(),
        buffers.indices.len()
    );
    buffers
}

/// Split an attribute value on runs of spaces and commas
pub(crate) fn tokenize(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

/// Parse a finite floating-point token
pub(crate) fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parse a float list in groups of `N`; a short trailing group counts as malformed
fn parse_groups<const N: usize>(value: &str) -> Vec<[Option<f64>; N]> {
    let tokens: Vec<&str> = tokenize(value).collect();
    tokens
        .chunks(N)
        .map(|chunk| {
            let mut group = [None; N];
            for (slot, token) in group.iter_mut().zip(chunk) {
                *slot = parse_number(token);
            }
            group
        })
        .collect()
}

/// Parse `Positions`: failing components are replaced with `0`
pub(crate) fn parse_positions(value: &str) -> Vec<Point3<f64>> {
    parse_groups::<3>(value)
        .into_iter()
        .map(|[x, y, z]| {
            Point3::new(x.unwrap_or(0.0), y.unwrap_or(0.0), z.unwrap_or(0.0))
        })
        .collect()
}

/// Parse `Normals`
///
/// Well-formed normals are kept as authored. A malformed normal is rebuilt
/// from its parseable components and normalized; if nothing usable is left
/// it becomes `+X`.
pub(crate) fn parse_normals(value: &str) -> Vec<Vector3<f64>> {
    parse_groups::<3>(value)
        .into_iter()
        .map(|group| match group {
            [Some(x), Some(y), Some(z)] => Vector3::new(x, y, z),
            [x, y, z] => {
                let normal = Vector3::new(x.unwrap_or(0.0), y.unwrap_or(0.0), z.unwrap_or(0.0));
                normal.try_normalize(0.0).unwrap_or_else(Vector3::x)
            }
        })
        .collect()
}

/// Parse `TextureCoordinates`
///
/// Signs are forced positive on every entry. A malformed pair is recovered
/// component-wise; with `legacy_padding` it is additionally preceded by a
/// `(0.5, 0.5)` placeholder entry.
pub(crate) fn parse_texture_coordinates(value: &str, legacy_padding: bool) -> Vec<Point2<f64>> {
    let mut uvs = Vec::new();
    for group in parse_groups::<2>(value) {
        match group {
            [Some(u), Some(v)] => uvs.push(Point2::new(u.abs(), v.abs())),
            [u, v] => {
                if legacy_padding {
                    let (pu, pv) = LEGACY_UV_PLACEHOLDER;
                    uvs.push(Point2::new(pu, pv));
                }
                uvs.push(Point2::new(
                    u.unwrap_or(0.0).abs(),
                    v.unwrap_or(0.0).abs(),
                ));
            }
        }
    }
    uvs
}

/// Parse `TriangleIndices`: tokens that are not integers become [`FALLBACK_INDEX`]
///
/// A negative index maps to `usize::MAX`, which no vertex buffer can satisfy.
pub(crate) fn parse_triangle_indices(value: &str) -> Vec<usize> {
    tokenize(value)
        .map(|token| match token.parse::<i64>() {
            Ok(index) => usize::try_from(index).unwrap_or(usize::MAX),
            Err(_) => FALLBACK_INDEX,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_mixed_separators() {
        let tokens: Vec<&str> = tokenize("  1,2  3 ,, 4\n5\t6 ").collect();
        assert_eq!(tokens, vec!["1", "2", "3", "4", "5", "6"]);
        assert_eq!(tokenize("   ").count(), 0);
    }

    #[test]
    fn test_parse_positions() {
        let positions = parse_positions("0,0,0 1,0,0 0,1,0");
        assert_eq!(
            positions,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0)
            ]
        );
    }

    #[test]
    fn test_parse_positions_partial_recovery() {
        let positions = parse_positions("1 abc 3 4 5 6");
        assert_eq!(positions[0], Point3::new(1.0, 0.0, 3.0));
        assert_eq!(positions[1], Point3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_parse_positions_trailing_group() {
        let positions = parse_positions("1 2 3 4");
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[1], Point3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_empty_attribute_yields_no_entries() {
        assert!(parse_positions("").is_empty());
        assert!(parse_normals("  ").is_empty());
        assert!(parse_texture_coordinates("", false).is_empty());
        assert!(parse_triangle_indices("").is_empty());
    }

    #[test]
    fn test_parse_normals_keeps_valid_unnormalized() {
        let normals = parse_normals("0 0 2");
        assert_eq!(normals, vec![Vector3::new(0.0, 0.0, 2.0)]);
    }

    #[test]
    fn test_parse_normals_partial_is_normalized() {
        let normals = parse_normals("3 x 4");
        assert!((normals[0] - Vector3::new(0.6, 0.0, 0.8)).norm() < 1e-12);
    }

    #[test]
    fn test_zero_normal_defaults_to_positive_x() {
        // Deliberate fix: an unusable normal becomes +X instead of NaN.
        let normals = parse_normals("x y z 0 n 0");
        assert_eq!(normals, vec![Vector3::x(), Vector3::x()]);
    }

    #[test]
    fn test_parse_texture_coordinates_forces_positive() {
        let uvs = parse_texture_coordinates("-0.5 0.25 1 -1", false);
        assert_eq!(uvs, vec![Point2::new(0.5, 0.25), Point2::new(1.0, 1.0)]);
    }

    #[test]
    fn test_malformed_uv_pair_yields_one_entry() {
        // Deliberate fix: one output entry per input pair keeps UVs aligned with vertices.
        let uvs = parse_texture_coordinates("0.1 0.2 bad -0.3 0.4 0.5", false);
        assert_eq!(
            uvs,
            vec![
                Point2::new(0.1, 0.2),
                Point2::new(0.0, 0.3),
                Point2::new(0.4, 0.5)
            ]
        );
    }

    #[test]
    fn test_malformed_uv_pair_legacy_padding() {
        let uvs = parse_texture_coordinates("0.1 0.2 bad -0.3", true);
        assert_eq!(
            uvs,
            vec![
                Point2::new(0.1, 0.2),
                Point2::new(0.5, 0.5),
                Point2::new(0.0, 0.3)
            ]
        );
    }

    #[test]
    fn test_parse_triangle_indices_fallback() {
        let indices = parse_triangle_indices("0 1 2 3 x 5 1.5");
        assert_eq!(indices, vec![0, 1, 2, 3, FALLBACK_INDEX, 5, FALLBACK_INDEX]);
    }

    #[test]
    fn test_negative_index_is_out_of_range() {
        let indices = parse_triangle_indices("0 2 -1");
        assert_eq!(indices, vec![0, 2, usize::MAX]);
        let vertices = parse_positions("0 0 0 1 0 0 0 1 0");
        assert!(crate::mesh_ops::assemble_faces(&vertices, &[], &indices).is_empty());
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        assert_eq!(parse_number("1.5"), Some(1.5));
        assert_eq!(parse_number("-2e3"), Some(-2000.0));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("1.5.2"), None);
    }

    #[test]
    fn test_extract_geometry_reads_all_attributes() {
        let mut element = Element::new("MeshGeometry3D");
        for (name, value) in [
            ("Positions", "0 0 0 1 0 0 0 1 0"),
            ("Normals", "0 0 1 0 0 1 0 0 1"),
            ("TextureCoordinates", "0 0 1 0 0 1"),
            ("TriangleIndices", "0 1 2"),
        ] {
            element.attributes.push(crate::xml::Attribute {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
        let buffers = extract_geometry(&element, &ParserConfig::new());
        assert_eq!(buffers.vertices.len(), 3);
        assert_eq!(buffers.normals.len(), 3);
        assert_eq!(buffers.uvs.len(), 3);
        assert_eq!(buffers.indices, vec![0, 1, 2]);
    }
}
