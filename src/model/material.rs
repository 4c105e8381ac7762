//! Material and texture types

use std::fmt;

/// A packed 24-bit RGB color (`0xRRGGBB`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    /// Opaque white, the default light color
    pub const WHITE: Color = Color(0xFF_FF_FF);

    /// Create a color from its components
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }

    /// Red component
    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green component
    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue component
    pub fn b(self) -> u8 {
        self.0 as u8
    }

    /// The packed `0xRRGGBB` value
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

/// Image data delivered by a texture loader
///
/// Decoding is left to the host; a loader that decodes can record the
/// pixel dimensions so the host knows what power-of-two size to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// URL the texture was fetched from
    pub url: String,
    /// Raw (typically still encoded) image bytes
    pub data: Vec<u8>,
    /// Decoded width and height in pixels, when known
    pub dimensions: Option<(u32, u32)>,
}

impl Texture {
    /// Create a texture from fetched bytes
    pub fn new(url: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            data,
            dimensions: None,
        }
    }

    /// Record the decoded pixel size
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    /// Size the image must be resized to for power-of-two-only renderers
    ///
    /// Returns `None` when the dimensions are unknown.
    pub fn power_of_two_size(&self) -> Option<(u32, u32)> {
        self.dimensions
            .map(|(w, h)| (next_power_of_two(w), next_power_of_two(h)))
    }

    /// Check whether the image needs resizing before upload
    pub fn needs_power_of_two_resize(&self) -> bool {
        match self.dimensions {
            Some((w, h)) => !w.is_power_of_two() || !h.is_power_of_two(),
            None => false,
        }
    }
}

/// Smallest power of two that is `>= value` (`0` maps to `1`)
pub fn next_power_of_two(value: u32) -> u32 {
    value.checked_next_power_of_two().unwrap_or(1 << 31)
}

/// An image map referenced by a material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureMap {
    /// Resolved image URL (document base URL + `ImageSource`)
    pub url: String,
    /// Loaded texture; `None` when loading was disabled or failed
    pub texture: Option<Texture>,
}

/// Material parameters of a mesh
///
/// Absent fields mean "use the renderer default".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaterialParams {
    /// Diffuse color
    pub color: Option<Color>,
    /// Diffuse image map
    pub map: Option<TextureMap>,
    /// Specular color
    pub specular: Option<Color>,
    /// Specular image map
    pub specular_map: Option<TextureMap>,
}

impl MaterialParams {
    /// Check if no material parameter is set
    pub fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.map.is_none()
            && self.specular.is_none()
            && self.specular_map.is_none()
    }
}
