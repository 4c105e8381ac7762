//! Light and camera types

use nalgebra::{Isometry3, Matrix4, Point3, Vector3};

use super::material::Color;

/// A light source attached to a scene group
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// `SpotLight`
    Spot {
        /// Light color
        color: Color,
        /// Light position
        position: Point3<f64>,
        /// Direction the cone points at
        direction: Vector3<f64>,
    },
    /// `DirectionalLight`
    Directional {
        /// Light color
        color: Color,
        /// Direction of the light
        direction: Vector3<f64>,
    },
    /// `PointLight`
    Point {
        /// Light color
        color: Color,
        /// Light position
        position: Point3<f64>,
    },
}

impl Light {
    /// Light color
    pub fn color(&self) -> Color {
        match *self {
            Light::Spot { color, .. } | Light::Directional { color, .. } | Light::Point { color, .. } => {
                color
            }
        }
    }

    /// Position of positional lights
    pub fn position(&self) -> Option<Point3<f64>> {
        match *self {
            Light::Spot { position, .. } | Light::Point { position, .. } => Some(position),
            Light::Directional { .. } => None,
        }
    }

    /// Direction of directed lights
    pub fn direction(&self) -> Option<Vector3<f64>> {
        match *self {
            Light::Spot { direction, .. } | Light::Directional { direction, .. } => {
                Some(direction)
            }
            Light::Point { .. } => None,
        }
    }
}

/// Perspective camera read from `PerspectiveCamera`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye position
    pub position: Point3<f64>,
    /// Up vector
    pub up: Vector3<f64>,
    /// Point the camera looks at (the `LookDirection` value)
    pub look: Point3<f64>,
    /// Vertical field of view in degrees
    pub fov: f64,
    /// Aspect ratio
    pub aspect: f64,
    /// Near clipping plane
    pub near: f64,
    /// Far clipping plane
    pub far: f64,
}

impl Camera {
    /// Default field of view in degrees
    pub const DEFAULT_FOV: f64 = 60.0;
    /// Default near clipping plane
    pub const DEFAULT_NEAR: f64 = 0.1;
    /// Default far clipping plane
    pub const DEFAULT_FAR: f64 = 100_000.0;

    /// World-to-view matrix (right-handed)
    pub fn view_matrix(&self) -> Matrix4<f64> {
        Isometry3::look_at_rh(&self.position, &self.look, &self.up).to_homogeneous()
    }

    /// Perspective projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_perspective(self.aspect, self.fov.to_radians(), self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            up: Vector3::y(),
            look: Point3::new(0.0, 0.0, 1.0),
            fov: Self::DEFAULT_FOV,
            aspect: 1.0,
            near: Self::DEFAULT_NEAR,
            far: Self::DEFAULT_FAR,
        }
    }
}
