//! Parser configuration

/// Configuration for parsing XAML documents
///
/// # Example
///
/// ```
/// use xaml3d::ParserConfig;
///
/// let config = ParserConfig::new()
///     .with_texture_loading(false)
///     .with_smooth_vertex_normals(true);
/// assert!(!config.load_textures());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    load_textures: bool,
    smooth_vertex_normals: bool,
    legacy_uv_padding: bool,
}

impl ParserConfig {
    /// Create the default configuration
    ///
    /// Textures are loaded, authored normals are kept, and each malformed
    /// texture-coordinate pair yields exactly one entry.
    pub fn new() -> Self {
        Self {
            load_textures: true,
            smooth_vertex_normals: false,
            legacy_uv_padding: false,
        }
    }

    /// Enable or disable dispatching `ImageBrush` sources to the texture loader
    ///
    /// When disabled, texture maps are recorded by URL only and the scene is
    /// finalized as soon as traversal ends.
    pub fn with_texture_loading(mut self, enabled: bool) -> Self {
        self.load_textures = enabled;
        self
    }

    /// Replace face corner normals with area-weighted smooth vertex normals
    pub fn with_smooth_vertex_normals(mut self, enabled: bool) -> Self {
        self.smooth_vertex_normals = enabled;
        self
    }

    /// Emit a `(0.5, 0.5)` placeholder before each recovered malformed UV pair
    ///
    /// This reproduces the output of older XAML loaders, at the cost of
    /// shifting every later UV relative to its vertex.
    pub fn with_legacy_uv_padding(mut self, enabled: bool) -> Self {
        self.legacy_uv_padding = enabled;
        self
    }

    /// Whether texture sources are dispatched to the texture loader
    pub fn load_textures(&self) -> bool {
        self.load_textures
    }

    /// Whether vertex normals are smoothed after face assembly
    pub fn smooth_vertex_normals(&self) -> bool {
        self.smooth_vertex_normals
    }

    /// Whether malformed UV pairs are padded with a placeholder entry
    pub fn legacy_uv_padding(&self) -> bool {
        self.legacy_uv_padding
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}
