//! Public loading entry points

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::loading::{
    DocumentLoader, ErrorSink, FsDocumentLoader, FsTextureLoader, ProgressCallback,
    TextureLoader, report_error,
};
use crate::model::{LoadedScene, ParserConfig};
use crate::parser::parse_document;
use crate::xml::decode_document;

/// Loads XAML 3D scenes through pluggable document and texture loaders
///
/// # Example
///
/// ```no_run
/// use xaml3d::XamlLoader;
///
/// let loader = XamlLoader::new();
/// loader.load(
///     "models/scene.xaml",
///     |scene| println!("{} meshes", scene.root.all_meshes().len()),
///     None,
///     |err| eprintln!("failed: {}", err),
/// );
/// ```
#[derive(Clone)]
pub struct XamlLoader {
    config: ParserConfig,
    documents: Rc<dyn DocumentLoader>,
    textures: Rc<dyn TextureLoader>,
}

impl XamlLoader {
    /// Create a loader reading documents and textures from the filesystem
    pub fn new() -> Self {
        Self {
            config: ParserConfig::new(),
            documents: Rc::new(FsDocumentLoader),
            textures: Rc::new(FsTextureLoader),
        }
    }

    /// Replace the parser configuration
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the document loader
    pub fn with_document_loader(mut self, loader: impl DocumentLoader + 'static) -> Self {
        self.documents = Rc::new(loader);
        self
    }

    /// Replace the texture loader
    pub fn with_texture_loader(mut self, loader: impl TextureLoader + 'static) -> Self {
        self.textures = Rc::new(loader);
        self
    }

    /// Parser configuration in use
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Fetch the document at `url` and parse it
    ///
    /// Texture `ImageSource`s are resolved against the directory part of
    /// `url` (see [`base_url_of`]). Document fetch, decoding and malformed-XML
    /// errors go to `on_error` and no scene is delivered. Otherwise `on_load`
    /// runs exactly once, after every texture has completed; each texture
    /// that failed to load is passed to `on_error` before that, so `on_error`
    /// may run several times.
    pub fn load<F, E>(
        &self,
        url: &str,
        on_load: F,
        on_progress: Option<ProgressCallback>,
        on_error: E,
    ) where
        F: FnOnce(LoadedScene) + 'static,
        E: FnMut(Error) + 'static,
    {
        let config = self.config.clone();
        let textures = Rc::clone(&self.textures);
        let errors: ErrorSink = Rc::new(RefCell::new(on_error));
        let base_url = base_url_of(url).to_string();
        log::debug!("Loading '{}' (base URL '{}')", url, base_url);

        self.documents.load(
            url,
            Box::new(move |fetched| {
                let outcome = fetched
                    .and_then(|bytes| decode_document(&bytes))
                    .and_then(|text| {
                        parse_document(
                            &text,
                            &base_url,
                            &config,
                            Some(textures.as_ref()),
                            Some(&errors),
                            Box::new(on_load),
                        )
                    });
                if let Err(err) = outcome {
                    log::warn!("Failed to load XAML document: {}", err);
                    report_error(&errors, err);
                }
            }),
            on_progress,
        );
    }

    /// Parse XAML text whose image sources are relative to `base_url`
    ///
    /// Returns an error only if the XML is malformed; otherwise `on_load`
    /// runs exactly once, possibly after this call returns if textures are
    /// still loading. Texture failures are logged and leave the map empty.
    pub fn parse<F>(&self, text: &str, base_url: &str, on_load: F) -> Result<()>
    where
        F: FnOnce(LoadedScene) + 'static,
    {
        parse_document(
            text,
            base_url,
            &self.config,
            Some(self.textures.as_ref()),
            None,
            Box::new(on_load),
        )
    }
}

impl Default for XamlLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Directory part of a URL, including the trailing separator
///
/// Both `/` and `\` count as separators. A URL without one yields `""`.
pub fn base_url_of(url: &str) -> &str {
    url.rfind(['/', '\\']).map_or("", |index| &url[..=index])
}
