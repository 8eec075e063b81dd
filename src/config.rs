//! Compile options, loadable from JSON with camelCase keys.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ViewError};

fn default_views_dir() -> PathBuf {
    PathBuf::from("views")
}

fn default_controllers_dir() -> PathBuf {
    PathBuf::from("controllers")
}

fn default_format_modules() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    /// Where generated view modules are written.
    #[serde(default = "default_views_dir")]
    pub views_dir: PathBuf,
    /// Where controller modules are looked up.
    #[serde(default = "default_controllers_dir")]
    pub controllers_dir: PathBuf,
    /// Incremental cache location; no caching when unset.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Re-print emitted modules with the code generator.
    #[serde(default = "default_format_modules")]
    pub format_modules: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            views_dir: default_views_dir(),
            controllers_dir: default_controllers_dir(),
            cache_dir: None,
            format_modules: default_format_modules(),
        }
    }
}

impl CompileOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| ViewError::io(path, e))?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let options = CompileOptions::from_json(r#"{ "viewsDir": "out/views" }"#).unwrap();
        assert_eq!(options.views_dir, PathBuf::from("out/views"));
        assert_eq!(options.controllers_dir, PathBuf::from("controllers"));
        assert_eq!(options.cache_dir, None);
        assert!(options.format_modules);
    }

    #[test]
    fn test_full_options() {
        let options = CompileOptions::from_json(
            r#"{ "viewsDir": "v", "controllersDir": "c", "cacheDir": ".cache", "formatModules": false }"#,
        )
        .unwrap();
        assert_eq!(options.cache_dir, Some(PathBuf::from(".cache")));
        assert!(!options.format_modules);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = CompileOptions::from_json("{ viewsDir: 1 }").unwrap_err();
        assert_eq!(err.code(), crate::error::ERR_CONFIG);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("views.json");
        std::fs::write(&path, r#"{ "controllersDir": "src/ctrl" }"#).unwrap();
        let options = CompileOptions::load(&path).unwrap();
        assert_eq!(options.controllers_dir, PathBuf::from("src/ctrl"));
        assert_eq!(options.views_dir, CompileOptions::default().views_dir);
    }
}
