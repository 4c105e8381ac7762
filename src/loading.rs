//! Loading facilities for documents and textures
//!
//! The loader never performs I/O itself. Fetching the XAML document and the
//! images referenced by `ImageBrush` elements is delegated to the
//! [`DocumentLoader`] and [`TextureLoader`] traits, so hosts can plug in
//! HTTP clients, asset packs or event-loop driven fetchers. Filesystem
//! implementations are provided for the common case.
//!
//! Both traits are callback based. A loader may complete immediately,
//! inside `load`, or at any later point on the same thread.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::latch::LatchToken;
use crate::model::Texture;

/// Callback receiving the raw bytes of a fetched document
pub type DocumentCallback = Box<dyn FnOnce(Result<Vec<u8>>)>;

/// Callback receiving download progress
pub type ProgressCallback = Box<dyn FnMut(Progress)>;

/// Shared error callback of one `load` call
pub(crate) type ErrorSink = Rc<RefCell<dyn FnMut(Error)>>;

/// Pass `err` to the caller's error callback
///
/// An error raised while that callback is already running is only logged.
pub(crate) fn report_error(sink: &ErrorSink, err: Error) {
    match sink.try_borrow_mut() {
        Ok(mut on_error) => (&mut *on_error)(err),
        Err(_) => log::warn!("Error raised from inside the error callback: {}", err),
    }
}

/// Download progress of a document fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Bytes received so far
    pub loaded: u64,
    /// Total size in bytes, when known
    pub total: Option<u64>,
}

/// Fetches XAML documents
pub trait DocumentLoader {
    /// Start fetching `url`
    ///
    /// `on_load` must be called exactly once, with the document bytes or
    /// the fetch error. `on_progress`, if given, may be called any number
    /// of times before that.
    fn load(&self, url: &str, on_load: DocumentCallback, on_progress: Option<ProgressCallback>);
}

/// Fetches texture images
///
/// # Example
///
/// ```
/// use xaml3d::{Texture, TextureCompletion, TextureLoader};
///
/// /// Serves every image from memory
/// struct InMemory(Vec<u8>);
///
/// impl TextureLoader for InMemory {
///     fn load(&self, url: &str, completion: TextureCompletion) {
///         completion.resolve(Ok(Texture::new(url, self.0.clone())));
///     }
/// }
/// ```
pub trait TextureLoader {
    /// Start fetching the image at `url`
    ///
    /// The scene is finalized once every dispatched completion has been
    /// resolved or dropped. A loader that keeps a completion alive forever
    /// stalls finalization of that document; no timeout is applied.
    fn load(&self, url: &str, completion: TextureCompletion);
}

/// Single-use handle for reporting the outcome of one texture fetch
///
/// Dropping the handle without calling [`resolve`](Self::resolve) counts as
/// a failed fetch.
pub struct TextureCompletion {
    url: String,
    slot: Rc<RefCell<Option<Texture>>>,
    errors: Option<ErrorSink>,
    resolved: bool,
    _token: LatchToken,
}

impl TextureCompletion {
    pub(crate) fn new(
        url: String,
        slot: Rc<RefCell<Option<Texture>>>,
        errors: Option<ErrorSink>,
        token: LatchToken,
    ) -> Self {
        Self {
            url,
            slot,
            errors,
            resolved: false,
            _token: token,
        }
    }

    fn fail(&self, err: Error) {
        log::warn!("Texture '{}' failed to load: {}", self.url, err);
        if let Some(errors) = &self.errors {
            report_error(errors, err);
        }
    }

    /// URL being fetched
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Report the outcome of the fetch
    ///
    /// A failed fetch leaves the material's map without a texture and does
    /// not fail the scene. When the document came from
    /// [`XamlLoader::load`](crate::XamlLoader::load), the error is also passed
    /// to its `on_error` callback before the scene is delivered.
    pub fn resolve(mut self, result: Result<Texture>) {
        self.resolved = true;
        match result {
            Ok(texture) => {
                log::trace!("Texture '{}' loaded ({} bytes)", self.url, texture.data.len());
                *self.slot.borrow_mut() = Some(texture);
            }
            Err(err) => self.fail(err),
        }
    }
}

impl Drop for TextureCompletion {
    fn drop(&mut self) {
        if !self.resolved {
            let err = Error::fetch(self.url.clone(), "texture load was abandoned");
            self.fail(err);
        }
    }
}

/// Reads documents from the local filesystem
///
/// The URL is used as a path. Completion is immediate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDocumentLoader;

impl DocumentLoader for FsDocumentLoader {
    fn load(&self, url: &str, on_load: DocumentCallback, on_progress: Option<ProgressCallback>) {
        match fs::read(url) {
            Ok(bytes) => {
                if let Some(mut on_progress) = on_progress {
                    let size = bytes.len() as u64;
                    on_progress(Progress {
                        loaded: size,
                        total: Some(size),
                    });
                }
                on_load(Ok(bytes));
            }
            Err(err) => on_load(Err(Error::fetch(url, err.to_string()))),
        }
    }
}

/// Reads texture images from the local filesystem
///
/// The image bytes are passed on undecoded. Completion is immediate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTextureLoader;

impl TextureLoader for FsTextureLoader {
    fn load(&self, url: &str, completion: TextureCompletion) {
        let result = fs::read(url)
            .map(|data| Texture::new(url, data))
            .map_err(|err| Error::fetch(url, err.to_string()));
        completion.resolve(result);
    }
}
