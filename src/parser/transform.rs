//! Transform node resolution
//!
//! A `Model3DGroup.Transform` may carry a `MatrixTransform3D`, any number of
//! `AxisAngleRotation3D` nodes and a `ScaleTransform3D`. The matrix is
//! decomposed into position, Tait-Bryan rotation and scale; rotation nodes
//! become nested rotation-only groups; the scale node overrides individual
//! scale components.

use nalgebra::{Matrix4, Rotation3, Unit, Vector3};

use super::geometry::{parse_number, tokenize};
use crate::model::Transform;
use crate::xml::Element;

/// Number of components in a XAML 3D matrix
pub(crate) const MATRIX_SIZE: usize = 16;

/// Below this `|cos(angleY)|` the rotation is treated as gimbal-locked
pub(crate) const GIMBAL_LOCK_EPSILON: f64 = 0.0005;

/// Parse a 16-value matrix string
///
/// Returns `None` unless there are exactly 16 finite values.
pub(crate) fn parse_matrix(value: &str) -> Option<[f64; MATRIX_SIZE]> {
    let mut matrix = [0.0; MATRIX_SIZE];
    let mut count = 0;
    for token in tokenize(value) {
        if count == MATRIX_SIZE {
            return None;
        }
        matrix[count] = parse_number(token)?;
        count += 1;
    }
    (count == MATRIX_SIZE).then_some(matrix)
}

/// Build a matrix whose rows are the values in string order
pub(crate) fn matrix_from_values(values: &[f64; MATRIX_SIZE]) -> Matrix4<f64> {
    Matrix4::from_row_slice(values)
}

/// Read the `Matrix` of the `MatrixTransform3D` directly under `node`
pub(crate) fn find_matrix(node: &Element) -> Option<[f64; MATRIX_SIZE]> {
    let matrix_node = node.find_child("MatrixTransform3D", false)?;
    let value = matrix_node.attribute("Matrix")?;
    let matrix = parse_matrix(value);
    if matrix.is_none() {
        log::debug!("Ignoring malformed MatrixTransform3D matrix '{}'", value);
    }
    matrix
}

/// Decompose a XAML matrix into position, rotation and scale
///
/// Translation is taken from values 12..15 as-is. The rotation assumes a
/// pure rotation block; scale comes from the lengths of the basis columns,
/// with the X scale negated for mirroring matrices.
pub fn decompose_matrix(m: &[f64; MATRIX_SIZE]) -> Transform {
    Transform {
        position: Vector3::new(m[12], m[13], m[14]),
        rotation: tait_bryan_angles(m),
        scale: matrix_scale(&matrix_from_values(m)),
    }
}

/// Tait-Bryan (X, Y, Z) angles of the rotation block
pub fn tait_bryan_angles(m: &[f64; MATRIX_SIZE]) -> Vector3<f64> {
    let angle_y = -m[2].clamp(-1.0, 1.0).asin();
    let cos_y = angle_y.cos();

    if cos_y.abs() > GIMBAL_LOCK_EPSILON {
        let angle_x = (m[6] / cos_y).atan2(m[10] / cos_y);
        let angle_z = (m[1] / cos_y).atan2(m[0] / cos_y);
        Vector3::new(angle_x, angle_y, angle_z)
    } else {
        Vector3::new(0.0, angle_y, m[1].atan2(m[5]))
    }
}

fn matrix_scale(matrix: &Matrix4<f64>) -> Vector3<f64> {
    let mut sx = matrix.fixed_view::<3, 1>(0, 0).norm();
    let sy = matrix.fixed_view::<3, 1>(0, 1).norm();
    let sz = matrix.fixed_view::<3, 1>(0, 2).norm();
    if matrix.determinant() < 0.0 {
        sx = -sx;
    }
    Vector3::new(sx, sy, sz)
}

/// Euler angles (X, Y, Z order) of a rotation
pub(crate) fn euler_xyz(rotation: &Rotation3<f64>) -> Vector3<f64> {
    let m = rotation.matrix();
    let m13 = m[(0, 2)].clamp(-1.0, 1.0);
    let y = m13.asin();

    if m13.abs() < 0.999_999_9 {
        Vector3::new((-m[(1, 2)]).atan2(m[(2, 2)]), y, (-m[(0, 1)]).atan2(m[(0, 0)]))
    } else {
        Vector3::new(m[(2, 1)].atan2(m[(1, 1)]), y, 0.0)
    }
}

/// Rotation (as Euler angles) described by an `AxisAngleRotation3D`
///
/// `Axis` must be exactly three comma-separated numbers and `Angle` a
/// number of degrees. A zero axis is ignored.
pub(crate) fn parse_axis_angle(node: &Element) -> Option<Vector3<f64>> {
    let axis_value = node.attribute("Axis")?;
    let parts: Vec<&str> = axis_value.split(',').collect();
    let [x, y, z] = parts.as_slice() else {
        return None;
    };
    let axis = Vector3::new(
        parse_number(x.trim())?,
        parse_number(y.trim())?,
        parse_number(z.trim())?,
    );
    let angle = parse_number(node.attribute("Angle")?.trim())?;

    let axis = Unit::try_new(axis, 0.0)?;
    let rotation = Rotation3::from_axis_angle(&axis, angle.to_radians());
    Some(euler_xyz(&rotation))
}

/// Override scale components from a `ScaleTransform3D`
///
/// Each of `ScaleX`, `ScaleY`, `ScaleZ` is applied independently; missing or
/// unparseable components leave the current value in place.
pub(crate) fn apply_scale(node: &Element, scale: &mut Vector3<f64>) {
    for (axis, name) in ["ScaleX", "ScaleY", "ScaleZ"].into_iter().enumerate() {
        if let Some(value) = node.attribute(name).and_then(|v| parse_number(v.trim())) {
            scale[axis] = value;
        }
    }
}
