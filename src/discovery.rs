//! Discovery Module
//!
//! Scans an exported site for `.html` pages. Each page becomes a root view
//! labelled by its path: `404.html` → `404`, `blog/post.html` → `blog post`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Result, ViewError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub label: String,
    pub path: PathBuf,
}

impl Page {
    pub fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| ViewError::io(&self.path, e))
    }
}

fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("html"))
}

/// Label for a page: its path under `root`, extension dropped, directories
/// joined by spaces.
pub fn page_label(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let words: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Every `.html` page under `root`, sorted by label.
pub fn discover_pages(root: &Path) -> Result<Vec<Page>> {
    let mut pages = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| ViewError::Discovery {
            path: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_html_file(path) {
            continue;
        }
        if let Some(label) = page_label(root, path) {
            pages.push(Page {
                label,
                path: path.to_path_buf(),
            });
        }
    }

    pages.sort_by(|a, b| a.label.cmp(&b.label));
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_label() {
        let root = Path::new("/site");
        assert_eq!(page_label(root, Path::new("/site/404.html")).as_deref(), Some("404"));
        assert_eq!(
            page_label(root, Path::new("/site/blog/post.html")).as_deref(),
            Some("blog post")
        );
        assert_eq!(page_label(root, Path::new("/other/a.html")), None);
    }

    #[test]
    fn test_discover_pages_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blog")).unwrap();
        fs::write(dir.path().join("index.html"), "<p>i</p>").unwrap();
        fs::write(dir.path().join("404.HTML"), "<p>n</p>").unwrap();
        fs::write(dir.path().join("blog/post.html"), "<p>p</p>").unwrap();
        fs::write(dir.path().join("style.css"), "").unwrap();

        let pages = discover_pages(dir.path()).unwrap();
        let labels: Vec<&str> = pages.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["404", "blog post", "index"]);
        assert_eq!(pages[2].read().unwrap(), "<p>i</p>");
    }

    #[test]
    fn test_missing_root_fails() {
        let err = discover_pages(Path::new("/nonexistent/site")).unwrap_err();
        assert_eq!(err.code(), crate::error::ERR_DISCOVERY);
    }
}
