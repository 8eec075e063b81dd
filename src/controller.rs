//! Controller Resolution
//!
//! A view either runs under an external controller found at
//! `<controllers_dir>/<ControllerClassName>` or acts as its own controller.
//! Only a missing controller falls back to self; any other failure while
//! looking it up is an error.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::error::{Result, ViewError};

/// Outcome of a controller lookup that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerLookup {
    Found(PathBuf),
    NotFound,
}

impl ControllerLookup {
    /// Whether the view renders under an external controller.
    pub fn is_external(&self) -> bool {
        matches!(self, ControllerLookup::Found(_))
    }
}

pub trait ControllerLoader: Send + Sync {
    fn load(&self, controller_class_name: &str) -> Result<ControllerLookup>;
}

impl<L: ControllerLoader + ?Sized> ControllerLoader for Box<L> {
    fn load(&self, controller_class_name: &str) -> Result<ControllerLookup> {
        (**self).load(controller_class_name)
    }
}

/// File extensions tried for a controller module, in order.
const CONTROLLER_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

/// Looks controllers up on disk the way Node resolves `require()`:
/// `Name.js`, `Name.jsx`, `Name.ts`, `Name.tsx`, then `Name/index.js`.
#[derive(Debug, Clone)]
pub struct FsControllerLoader {
    dir: PathBuf,
}

impl FsControllerLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = CONTROLLER_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", name, ext)))
            .collect();
        paths.push(self.dir.join(name).join("index.js"));
        paths
    }
}

impl ControllerLoader for FsControllerLoader {
    fn load(&self, controller_class_name: &str) -> Result<ControllerLookup> {
        for candidate in self.candidates(controller_class_name) {
            match std::fs::metadata(&candidate) {
                Ok(meta) if meta.is_file() => return Ok(ControllerLookup::Found(candidate)),
                Ok(_) => continue,
                Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                    continue
                }
                Err(e) => {
                    return Err(ViewError::ControllerLoad {
                        path: candidate.display().to_string(),
                        message: e.to_string(),
                    })
                }
            }
        }
        Ok(ControllerLookup::NotFound)
    }
}

/// Memoising front for a loader. Successful lookups, including "not found",
/// are cached per controller name; errors are not, so a later call retries.
pub struct ControllerResolver<L: ControllerLoader> {
    loader: L,
    cache: Mutex<HashMap<String, ControllerLookup>>,
}

impl<L: ControllerLoader> ControllerResolver<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn resolve(&self, controller_class_name: &str) -> Result<ControllerLookup> {
        if let Some(hit) = self.cached(controller_class_name) {
            return Ok(hit);
        }

        let lookup = self.loader.load(controller_class_name)?;
        match &lookup {
            ControllerLookup::Found(path) => {
                info!(controller = %controller_class_name, path = %path.display(), "controller found")
            }
            ControllerLookup::NotFound => {
                debug!(controller = %controller_class_name, "no controller, view controls itself")
            }
        }

        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.insert(controller_class_name.to_string(), lookup.clone());
        Ok(lookup)
    }

    fn cached(&self, controller_class_name: &str) -> Option<ControllerLookup> {
        let cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.get(controller_class_name).cloned()
    }
}
