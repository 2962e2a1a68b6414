//! Asynchronous texture loading with explicit ready/error states
//!
//! [`TextureLoader::load`] hands back a [`TextureHandle`] immediately and decodes
//! the image on a background thread. The result travels back through a one-shot
//! future and is applied on the frame thread by [`TextureLoader::poll`], so the
//! registry is only ever mutated from one place. Materials hold handles, not
//! pixels, and keep working while their textures are still pending.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};

use futures::channel::oneshot;
use log::{debug, info, warn};
use thiserror::Error;

/// Errors produced while loading a texture
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode texture '{}'", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(
        "texture '{}' has {actual} bytes, expected {expected} for {width}x{height} RGBA",
        path.display()
    )]
    InvalidData {
        path: PathBuf,
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("texture worker for '{}' exited without a result", path.display())]
    Abandoned { path: PathBuf },
    #[error("could not start a texture worker for '{}'", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Decoded RGBA8 pixels
#[derive(Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    /// Wraps raw RGBA8 pixels, checking the buffer matches the dimensions
    pub fn from_rgba(
        path: &Path,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    ) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(TextureError::InvalidData {
                path: path.to_path_buf(),
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }
}

impl fmt::Debug for TextureData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Where texture pixels come from
pub trait TextureSource: Send + Sync + 'static {
    fn fetch(&self, path: &Path) -> Result<TextureData, TextureError>;
}

/// Reads PNG and JPEG files from disk
#[derive(Debug, Default, Clone, Copy)]
pub struct FileTextureSource;

impl TextureSource for FileTextureSource {
    fn fetch(&self, path: &Path) -> Result<TextureData, TextureError> {
        let image = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();

        let (width, height) = image.dimensions();
        TextureData::from_rgba(path, width, height, image.into_raw())
    }
}

/// Reference to a texture owned by a [`TextureLoader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub(crate) u32);

impl TextureHandle {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Lifecycle of a texture load
#[derive(Debug)]
pub enum TextureState {
    Pending,
    Ready(Arc<TextureData>),
    Failed(TextureError),
}

impl TextureState {
    pub fn is_pending(&self) -> bool {
        matches!(self, TextureState::Pending)
    }
}

type LoadResult = Result<TextureData, TextureError>;

struct TextureEntry {
    path: PathBuf,
    state: TextureState,
    receiver: Option<oneshot::Receiver<LoadResult>>,
}

impl TextureEntry {
    fn settle(&mut self, result: LoadResult) {
        self.receiver = None;
        self.state = match result {
            Ok(data) => {
                info!(
                    "Texture '{}' ready ({}x{})",
                    self.path.display(),
                    data.width,
                    data.height
                );
                TextureState::Ready(Arc::new(data))
            }
            Err(err) => {
                warn!("Texture '{}' failed to load: {}", self.path.display(), err);
                TextureState::Failed(err)
            }
        };
    }
}

/// Registry of textures keyed by path
///
/// Loading the same path twice returns the same handle and starts no new work.
pub struct TextureLoader {
    source: Arc<dyn TextureSource>,
    entries: Vec<TextureEntry>,
    by_path: HashMap<PathBuf, TextureHandle>,
}

impl TextureLoader {
    pub fn new(source: impl TextureSource) -> Self {
        Self {
            source: Arc::new(source),
            entries: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    /// Loader backed by image files on disk
    pub fn from_files() -> Self {
        Self::new(FileTextureSource)
    }

    /// Starts loading `path` in the background and returns its handle
    pub fn load(&mut self, path: impl AsRef<Path>) -> TextureHandle {
        let path = path.as_ref().to_path_buf();
        if let Some(&handle) = self.by_path.get(&path) {
            return handle;
        }

        let handle = TextureHandle(self.entries.len() as u32);
        let (sender, receiver) = oneshot::channel();
        let source = Arc::clone(&self.source);
        let worker_path = path.clone();

        let spawned = thread::Builder::new()
            .name(format!("texture-{}", handle.0))
            .spawn(move || {
                let result = source.fetch(&worker_path);
                // The loader may already be gone; nothing to report to then
                let _ = sender.send(result);
            });

        let mut entry = TextureEntry {
            path: path.clone(),
            state: TextureState::Pending,
            receiver: Some(receiver),
        };
        if let Err(source) = spawned {
            entry.settle(Err(TextureError::Spawn {
                path: path.clone(),
                source,
            }));
        }

        debug!("Loading texture '{}' as {:?}", path.display(), handle);
        self.entries.push(entry);
        self.by_path.insert(path, handle);
        handle
    }

    /// Applies every finished load without blocking
    ///
    /// Returns how many textures settled during this call.
    pub fn poll(&mut self) -> usize {
        let mut settled = 0;

        for entry in &mut self.entries {
            let Some(receiver) = entry.receiver.as_mut() else {
                continue;
            };

            let outcome = match receiver.try_recv() {
                Ok(Some(result)) => result,
                Ok(None) => continue,
                Err(oneshot::Canceled) => Err(TextureError::Abandoned {
                    path: entry.path.clone(),
                }),
            };
            entry.settle(outcome);
            settled += 1;
        }

        settled
    }

    /// Blocks until every pending texture has settled
    pub fn wait_all(&mut self) -> usize {
        let mut settled = 0;

        for entry in &mut self.entries {
            let Some(receiver) = entry.receiver.take() else {
                continue;
            };

            let outcome = futures::executor::block_on(receiver).unwrap_or_else(|_| {
                Err(TextureError::Abandoned {
                    path: entry.path.clone(),
                })
            });
            entry.settle(outcome);
            settled += 1;
        }

        settled
    }

    pub fn state(&self, handle: TextureHandle) -> Option<&TextureState> {
        self.entries.get(handle.0 as usize).map(|entry| &entry.state)
    }

    pub fn is_ready(&self, handle: TextureHandle) -> bool {
        matches!(self.state(handle), Some(TextureState::Ready(_)))
    }

    /// Pixels of a ready texture
    pub fn data(&self, handle: TextureHandle) -> Option<Arc<TextureData>> {
        match self.state(handle)? {
            TextureState::Ready(data) => Some(Arc::clone(data)),
            _ => None,
        }
    }

    pub fn path(&self, handle: TextureHandle) -> Option<&Path> {
        self.entries
            .get(handle.0 as usize)
            .map(|entry| entry.path.as_path())
    }

    /// Every handle issued so far, in load order
    pub fn handles(&self) -> impl Iterator<Item = TextureHandle> {
        (0..self.entries.len() as u32).map(TextureHandle)
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.state.is_pending())
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
