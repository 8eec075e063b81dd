//! Writer Module
//!
//! Writes compiled view trees to a views directory. Units are written
//! concurrently with `rayon`, one file per class name, and every write
//! returns its paths in tree order.

use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cache::IncrementalCache;
use crate::codegen::{check_module, format_module};
use crate::config::CompileOptions;
use crate::controller::{ControllerLoader, ControllerResolver, FsControllerLoader};
use crate::discovery::{discover_pages, Page};
use crate::emit::{compose_index, compose_module, module_file_name, INDEX_FILE, UTILS_FILE, VIEW_UTILS};
use crate::error::{Result, ViewError};
use crate::view::ComponentNode;

/// `controllers_dir` as seen from `views_dir`, in `require()` form.
pub fn relative_controllers_dir(views_dir: &Path, controllers_dir: &Path) -> String {
    let relative = pathdiff::diff_paths(controllers_dir, views_dir)
        .unwrap_or_else(|| controllers_dir.to_path_buf());
    let relative = relative.to_string_lossy().replace('\\', "/");

    if relative.is_empty() {
        ".".to_string()
    } else if relative.starts_with('.') || relative.starts_with('/') {
        relative
    } else {
        format!("./{}", relative)
    }
}

pub struct ViewWriter {
    views_dir: PathBuf,
    controllers_path: String,
    format_modules: bool,
    resolver: ControllerResolver<Box<dyn ControllerLoader>>,
}

impl ViewWriter {
    pub fn new(options: &CompileOptions) -> Self {
        Self::with_loader(options, FsControllerLoader::new(&options.controllers_dir))
    }

    pub fn with_loader(options: &CompileOptions, loader: impl ControllerLoader + 'static) -> Self {
        Self {
            views_dir: options.views_dir.clone(),
            controllers_path: relative_controllers_dir(&options.views_dir, &options.controllers_dir),
            format_modules: options.format_modules,
            resolver: ControllerResolver::new(Box::new(loader)),
        }
    }

    pub fn views_dir(&self) -> &Path {
        &self.views_dir
    }

    /// The checked (and optionally formatted) module for one view.
    pub fn render_module(&self, view: &ComponentNode) -> Result<String> {
        let code = compose_module(view, &self.controllers_path);
        if self.format_modules {
            format_module(view.class_name(), &code)
        } else {
            check_module(view.class_name(), &code)?;
            Ok(code)
        }
    }

    fn unit_path(&self, view: &ComponentNode) -> PathBuf {
        self.views_dir.join(module_file_name(view.class_name()))
    }

    /// A failed controller lookup is logged and the unit is still written.
    fn write_unit(&self, view: &ComponentNode) -> Result<PathBuf> {
        let external_controller = match self.resolver.resolve(view.controller_class_name()) {
            Ok(lookup) => Some(lookup.is_external()),
            Err(err) => {
                warn!(
                    view = %view.class_name(),
                    code = err.code(),
                    error = %err,
                    "controller lookup failed"
                );
                None
            }
        };
        let code = self.render_module(view)?;
        let path = self.unit_path(view);
        fs::write(&path, code).map_err(|e| ViewError::io(&path, e))?;
        info!(
            view = %view.class_name(),
            path = %path.display(),
            external_controller = ?external_controller,
            "wrote view"
        );
        Ok(path)
    }

    /// Write a view and its whole subtree. Returns one path per node, the
    /// view's own first and then each child subtree in child order.
    ///
    /// Nodes sharing a class name are written once. Fails before writing
    /// anything when two of them differ.
    pub fn write_view(&self, view: &ComponentNode) -> Result<Vec<PathBuf>> {
        let nodes = view.descendants();
        let (units, conflicts) = distinct_units(nodes.iter().copied());
        if let Some(class_name) = conflicts.first() {
            return Err(ViewError::ConflictingView {
                class_name: class_name.to_string(),
            });
        }

        units
            .par_iter()
            .map(|unit| self.write_unit(unit))
            .collect::<Result<Vec<_>>>()?;
        Ok(nodes.iter().map(|node| self.unit_path(node)).collect())
    }

    /// Write every view reachable from `roots` plus `index.js` and `utils.js`.
    ///
    /// Views that share a class name across pages are written once; the
    /// first one in tree order wins.
    pub fn write_all(&self, roots: &[ComponentNode]) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.views_dir).map_err(|e| ViewError::io(&self.views_dir, e))?;

        let (units, conflicts) = distinct_units(roots.iter().flat_map(ComponentNode::descendants));
        for class_name in conflicts {
            warn!(view = %class_name, "conflicting definitions, keeping the first");
        }
        let index_path = self.views_dir.join(INDEX_FILE);
        let utils_path = self.views_dir.join(UTILS_FILE);

        let (written, (index, utils)) = rayon::join(
            || {
                units
                    .par_iter()
                    .map(|view| self.write_unit(view))
                    .collect::<Result<Vec<_>>>()
            },
            || {
                rayon::join(
                    || {
                        fs::write(&index_path, compose_index(units.iter().copied()))
                            .map_err(|e| ViewError::io(&index_path, e))
                    },
                    || fs::write(&utils_path, VIEW_UTILS).map_err(|e| ViewError::io(&utils_path, e)),
                )
            },
        );
        index?;
        utils?;

        let mut paths = vec![index_path, utils_path];
        paths.extend(written?);
        Ok(paths)
    }
}

/// First node per class name in iteration order, plus the class names whose
/// later nodes differ from the first.
fn distinct_units<'a>(
    nodes: impl IntoIterator<Item = &'a ComponentNode>,
) -> (Vec<&'a ComponentNode>, Vec<&'a str>) {
    let mut seen: HashMap<&str, &ComponentNode> = HashMap::new();
    let mut units = Vec::new();
    let mut conflicts = Vec::new();
    for view in nodes {
        match seen.get(view.class_name()) {
            Some(first) => {
                if *first != view && !conflicts.contains(&view.class_name()) {
                    conflicts.push(view.class_name());
                }
            }
            None => {
                seen.insert(view.class_name(), view);
                units.push(view);
            }
        }
    }
    (units, conflicts)
}

fn compile_page(page: &Page, cache: Option<&IncrementalCache>) -> Result<ComponentNode> {
    let markup = page.read()?;
    if let Some(view) = cache.and_then(|c| c.get(&page.path, &page.label, &markup)) {
        return Ok(view);
    }
    let view = ComponentNode::new(&page.label, &markup)?;
    if let Some(cache) = cache {
        cache.set(&page.path, &page.label, &markup, &view)?;
    }
    Ok(view)
}

/// Compile every page under `input_dir` and write the resulting views.
pub fn transpile(input_dir: &Path, options: &CompileOptions) -> Result<Vec<PathBuf>> {
    let pages = discover_pages(input_dir)?;
    let cache = options
        .cache_dir
        .as_ref()
        .map(IncrementalCache::new)
        .transpose()?;

    let views = pages
        .par_iter()
        .map(|page| compile_page(page, cache.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    info!(pages = pages.len(), "compiled pages");

    ViewWriter::new(options).write_all(&views)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_controllers_dir() {
        assert_eq!(
            relative_controllers_dir(Path::new("/app/src/views"), Path::new("/app/src/controllers")),
            "../controllers"
        );
        assert_eq!(
            relative_controllers_dir(Path::new("/app/views"), Path::new("/app/views/ctrl")),
            "./ctrl"
        );
        assert_eq!(relative_controllers_dir(Path::new("/a"), Path::new("/a")), ".");
    }

    fn options(dir: &Path) -> CompileOptions {
        CompileOptions {
            views_dir: dir.to_path_buf(),
            controllers_dir: dir.join("controllers"),
            cache_dir: None,
            format_modules: false,
        }
    }

    fn file_count(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().filter(|e| e.as_ref().unwrap().path().is_file()).count()
    }

    #[test]
    fn test_distinct_units_keeps_first() {
        let a = ComponentNode::new("index", r#"<div af-el="nav">a</div>"#).unwrap();
        let b = ComponentNode::new("about", r#"<div af-el="nav">b</div>"#).unwrap();
        let roots = vec![a, b];
        let (units, conflicts) = distinct_units(roots.iter().flat_map(ComponentNode::descendants));
        let names: Vec<&str> = units.iter().map(|v| v.class_name()).collect();
        assert_eq!(names, vec!["IndexView", "NavView", "AboutView"]);
        assert_eq!(conflicts, vec!["NavView"]);
    }

    #[test]
    fn test_write_view_rejects_conflicting_nested_class() {
        let root = ComponentNode::new(
            "home",
            r#"<div af-el="aside"><nav af-el="nav">x</nav></div><nav af-el="nav">y</nav>"#,
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();

        let err = ViewWriter::new(&options(dir.path())).write_view(&root).unwrap_err();
        assert!(matches!(err, ViewError::ConflictingView { ref class_name } if class_name == "NavView"));
        assert_eq!(err.code(), crate::error::ERR_CONFLICTING_VIEW);
        assert_eq!(file_count(dir.path()), 0);
    }

    #[test]
    fn test_write_view_shares_identical_nested_class() {
        let root = ComponentNode::new(
            "home",
            r#"<div af-el="aside"><nav af-el="nav">x</nav></div><nav af-el="nav">x</nav>"#,
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();

        let paths = ViewWriter::new(&options(dir.path())).write_view(&root).unwrap();
        assert_eq!(paths.len(), root.node_count());
        assert_eq!(paths[2], paths[3]);
        assert_eq!(file_count(dir.path()), 3);
    }

    struct BrokenLoader;

    impl ControllerLoader for BrokenLoader {
        fn load(&self, name: &str) -> Result<crate::controller::ControllerLookup> {
            Err(ViewError::ControllerLoad {
                path: name.to_string(),
                message: "permission denied".to_string(),
            })
        }
    }

    #[test]
    fn test_controller_lookup_failure_still_writes() {
        let root = ComponentNode::new("index", r#"<div af-el="nav">n</div>"#).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let writer = ViewWriter::with_loader(&options(dir.path()), BrokenLoader);
        let paths = writer.write_view(&root).unwrap();
        assert_eq!(paths.len(), 2);
        for path in &paths {
            let code = fs::read_to_string(path).unwrap();
            assert!(code.contains("Controller"));
        }
    }
}
