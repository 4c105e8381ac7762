//! Light and camera resolution

use nalgebra::{Matrix4, Point3, Vector3};

use super::geometry::{parse_number, tokenize};
use super::material::parse_color;
use super::transform::{find_matrix, matrix_from_values};
use crate::model::{Camera, Color, Light};
use crate::xml::{Document, Element};

/// Kind of light element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LightKind {
    Spot,
    Directional,
    Point,
}

impl LightKind {
    pub(crate) fn from_tag(name: &str) -> Option<Self> {
        match name {
            "SpotLight" => Some(LightKind::Spot),
            "DirectionalLight" => Some(LightKind::Directional),
            "PointLight" => Some(LightKind::Point),
            _ => None,
        }
    }
}

/// Read a three-component vector attribute over a default
///
/// Components that are missing or unparseable keep their default value.
fn vector_attribute(element: &Element, name: &str, default: Vector3<f64>) -> Vector3<f64> {
    let mut vector = default;
    if let Some(value) = element.attribute(name) {
        for (axis, token) in tokenize(value).take(3).enumerate() {
            if let Some(component) = parse_number(token) {
                vector[axis] = component;
            }
        }
    }
    vector
}

/// Build the light described by a `SpotLight`, `DirectionalLight` or `PointLight`
pub(crate) fn parse_light(node: &Element, kind: LightKind) -> Light {
    let color = node
        .attribute("Color")
        .and_then(parse_color)
        .unwrap_or(Color::WHITE);

    let direction = || vector_attribute(node, "Direction", Vector3::z());
    let position = || Point3::from(vector_attribute(node, "Position", Vector3::zeros()));

    match kind {
        LightKind::Spot => Light::Spot {
            color,
            position: position(),
            direction: direction(),
        },
        LightKind::Directional => Light::Directional {
            color,
            direction: direction(),
        },
        LightKind::Point => Light::Point {
            color,
            position: position(),
        },
    }
}

/// Build the camera described by a `PerspectiveCamera`
pub(crate) fn parse_camera(node: &Element) -> Camera {
    let defaults = Camera::default();
    let fov = node
        .attribute("FieldOfView")
        .and_then(|value| parse_number(value.trim()))
        .unwrap_or(defaults.fov);

    Camera {
        position: Point3::from(vector_attribute(node, "Position", defaults.position.coords)),
        up: vector_attribute(node, "UpDirection", defaults.up),
        look: Point3::from(vector_attribute(node, "LookDirection", defaults.look.coords)),
        fov,
        ..defaults
    }
}

/// Camera of the document: the first `PerspectiveCamera`, if any
pub(crate) fn find_camera(document: &Document) -> Option<Camera> {
    document
        .first_element_by_tag_name("PerspectiveCamera")
        .map(parse_camera)
}

/// Matrix of the first `PerspectiveCamera.Transform`, if it holds a valid one
pub(crate) fn find_camera_matrix(document: &Document) -> Option<Matrix4<f64>> {
    let transform = document.first_element_by_tag_name("PerspectiveCamera.Transform")?;
    find_matrix(transform).map(|values| matrix_from_values(&values))
}
